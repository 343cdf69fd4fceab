//! The multicast routing tree.
//!
//! PAICORE addresses physical cores through a 5-level tree with four
//! children per node: one branch choice per level selects a quadrant
//! `(x, y) ∈ {0, 1}²`, and the concatenation of the five choices, root
//! first, is exactly the 10-bit core address, one bit of each axis per
//! level. L0 clusters are the leaves and map 1:1 onto physical cores.

use std::collections::HashSet;
use std::fmt;

use crate::coord::{Coord, ReplicationId};
use crate::error::{ChipError, Result};
use crate::hw;

/// Depth of the routing tree, root (L5) excluded.
pub const MAX_ROUTING_PATH_LENGTH: usize = hw::N_ROUTING_PATH_LENGTH_MAX;

/// Level of a routing cluster. L0 clusters are leaves; a leaf is a physical
/// core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum RoutingLevel {
    /// Leaf: one physical core.
    L0 = 0,
    /// 4 cores.
    L1 = 1,
    /// 16 cores.
    L2 = 2,
    /// 64 cores.
    L3 = 3,
    /// 256 cores.
    L4 = 4,
    /// Whole chip.
    L5 = 5,
}

impl RoutingLevel {
    fn from_depth(depth: usize) -> Self {
        match depth {
            0 => Self::L0,
            1 => Self::L1,
            2 => Self::L2,
            3 => Self::L3,
            4 => Self::L4,
            _ => Self::L5,
        }
    }

    /// Numeric level.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Branch selector at one tree level: four quadrants plus the unspecified
/// wildcard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RoutingDirection {
    /// `(x, y) = (0, 0)`
    X0Y0,
    /// `(x, y) = (0, 1)`
    X0Y1,
    /// `(x, y) = (1, 0)`
    X1Y0,
    /// `(x, y) = (1, 1)`
    X1Y1,
    /// Unspecified: the cluster covers all four children.
    #[default]
    Any,
}

/// Canonical child order used when greedily packing cores into the tree.
/// Under Y-priority the Y bit is the fast axis.
pub const ROUTING_DIRECTIONS_IDX: [RoutingDirection; 4] = if hw::COORD_Y_PRIORITY {
    [
        RoutingDirection::X0Y0,
        RoutingDirection::X0Y1,
        RoutingDirection::X1Y0,
        RoutingDirection::X1Y1,
    ]
} else {
    [
        RoutingDirection::X0Y0,
        RoutingDirection::X1Y0,
        RoutingDirection::X0Y1,
        RoutingDirection::X1Y1,
    ]
};

impl RoutingDirection {
    /// Quadrant bits `(x, y)`. [`RoutingDirection::Any`] has none.
    pub const fn xy(self) -> Option<(u16, u16)> {
        match self {
            Self::X0Y0 => Some((0, 0)),
            Self::X0Y1 => Some((0, 1)),
            Self::X1Y0 => Some((1, 0)),
            Self::X1Y1 => Some((1, 1)),
            Self::Any => None,
        }
    }

    /// Index of this direction in a node's child list, honouring the axis
    /// priority.
    ///
    /// # Errors
    ///
    /// [`ChipError::Unspecified`] for [`RoutingDirection::Any`].
    pub fn to_index(self) -> Result<usize> {
        let Some((x, y)) = self.xy() else {
            return Err(ChipError::Unspecified {
                directions: [Self::Any; MAX_ROUTING_PATH_LENGTH],
            });
        };

        if hw::COORD_Y_PRIORITY {
            Ok(usize::from((x << 1) + y))
        } else {
            Ok(usize::from((y << 1) + x))
        }
    }
}

/// Position of a cluster in the tree, written as one direction per level,
/// root level first.
///
/// A fully specified coordinate (no [`RoutingDirection::Any`]) is a leaf;
/// an internal node at level `k` keeps its outer `k` entries unspecified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoutingCoord(pub [RoutingDirection; MAX_ROUTING_PATH_LENGTH]);

impl RoutingCoord {
    /// Level of the cluster, derived from the first unspecified entry.
    pub fn level(self) -> RoutingLevel {
        for (i, d) in self.0.iter().enumerate() {
            if *d == RoutingDirection::Any {
                return RoutingLevel::from_depth(MAX_ROUTING_PATH_LENGTH - i);
            }
        }

        RoutingLevel::L0
    }

    /// Physical core this leaf addresses. Each level contributes one bit to
    /// each axis, the first entry being the most significant.
    ///
    /// # Errors
    ///
    /// [`ChipError::NotALeaf`] for a cluster above L0,
    /// [`ChipError::Unspecified`] if any entry is
    /// [`RoutingDirection::Any`].
    pub fn to_coord(self) -> Result<Coord> {
        let level = self.level();
        if level > RoutingLevel::L0 {
            return Err(ChipError::NotALeaf {
                level: level.as_u8(),
            });
        }

        let mut x = 0u16;
        let mut y = 0u16;
        for (i, d) in self.0.iter().enumerate() {
            let Some((bx, by)) = d.xy() else {
                return Err(ChipError::Unspecified { directions: self.0 });
            };
            let shift = (MAX_ROUTING_PATH_LENGTH - 1 - i) as u32;
            x |= bx << shift;
            y |= by << shift;
        }

        Coord::new(x, y)
    }
}

impl fmt::Display for RoutingCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}, {:?}, {:?}, {:?}, {:?}]",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4]
        )
    }
}

/// A walk through the tree, stored root-to-leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingPath {
    directions: [RoutingDirection; MAX_ROUTING_PATH_LENGTH],
}

impl RoutingPath {
    /// Build from directions already in root-to-leaf order.
    pub const fn new(directions: [RoutingDirection; MAX_ROUTING_PATH_LENGTH]) -> Self {
        Self { directions }
    }

    /// Build from a leaf-to-root walk, padding the root end with
    /// [`RoutingDirection::Any`] when fewer than 5 steps are given.
    pub fn from_reversed(steps: &[RoutingDirection]) -> Self {
        let mut directions = [RoutingDirection::Any; MAX_ROUTING_PATH_LENGTH];
        for (i, step) in steps.iter().take(MAX_ROUTING_PATH_LENGTH).enumerate() {
            directions[MAX_ROUTING_PATH_LENGTH - 1 - i] = *step;
        }

        Self { directions }
    }

    /// Canonical placement path for the `n_core`-th core: repeated divmod of
    /// the core index by the branching factor, from L0 up.
    pub fn from_core_count(n_core: usize) -> Self {
        let mut n = n_core;
        let mut steps = [RoutingDirection::Any; MAX_ROUTING_PATH_LENGTH];
        for step in &mut steps {
            let rem = n % hw::N_SUB_ROUTING_NODE;
            n /= hw::N_SUB_ROUTING_NODE;
            *step = ROUTING_DIRECTIONS_IDX[rem];
        }

        Self::from_reversed(&steps)
    }

    /// The path as a routing coordinate.
    pub const fn routing_coord(&self) -> RoutingCoord {
        RoutingCoord(self.directions)
    }

    /// Physical core at the end of the path.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`RoutingCoord::to_coord`].
    pub fn to_coord(&self) -> Result<Coord> {
        self.routing_coord().to_coord()
    }

    /// Directions, root level first.
    pub const fn directions(&self) -> &[RoutingDirection; MAX_ROUTING_PATH_LENGTH] {
        &self.directions
    }
}

/// Cluster count needed at each tree level to host a group of cores.
///
/// `n_l0` is always the next power of two above the core count; every level
/// above divides by the branching factor, clamped at one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingCost {
    /// L0 clusters (cores, rounded up to a power of two).
    pub n_l0: usize,
    /// L1 clusters.
    pub n_l1: usize,
    /// L2 clusters.
    pub n_l2: usize,
    /// L3 clusters.
    pub n_l3: usize,
    /// L4 clusters.
    pub n_l4: usize,
    /// L5 clusters. More than one means the chip is exhausted.
    pub n_l5: usize,
}

impl RoutingCost {
    /// The per-level counts as one array, L0 first.
    pub const fn as_array(self) -> [usize; 6] {
        [self.n_l0, self.n_l1, self.n_l2, self.n_l3, self.n_l4, self.n_l5]
    }

    /// Smallest cluster level able to host the whole group: the highest
    /// level still needing more than one node, plus one.
    ///
    /// # Errors
    ///
    /// [`ChipError::TreeExhausted`] when even L5 needs more than one node.
    pub fn routing_level(self) -> Result<RoutingLevel> {
        if self.n_l5 > 1 {
            return Err(ChipError::TreeExhausted { n_l5: self.n_l5 });
        }

        let counts = self.as_array();
        for i in (0..counts.len()).rev() {
            if counts[i] > 1 {
                return Ok(RoutingLevel::from_depth(i + 1));
            }
        }

        Ok(RoutingLevel::L1)
    }
}

/// Minimum tree consumption for `n_core` physical cores.
pub fn get_routing_consumption(n_core: usize) -> RoutingCost {
    let mut n_lx = [0usize; 6];
    n_lx[0] = n_core.next_power_of_two();

    for i in 0..5 {
        n_lx[i + 1] = if n_lx[i] < hw::N_SUB_ROUTING_NODE {
            1
        } else {
            n_lx[i] / hw::N_SUB_ROUTING_NODE
        };
    }

    RoutingCost {
        n_l0: n_lx[0],
        n_l1: n_lx[1],
        n_l2: n_lx[2],
        n_l3: n_lx[3],
        n_l4: n_lx[4],
        n_l5: n_lx[5],
    }
}

/// Replication id covering a group of coordinates: the OR-fold of every
/// XOR difference against the first coordinate.
///
/// # Errors
///
/// [`ChipError::EmptyCoordinates`] when `coords` is empty.
pub fn get_replication_id(coords: &[Coord]) -> Result<ReplicationId> {
    let Some((base, rest)) = coords.split_first() else {
        return Err(ChipError::EmptyCoordinates);
    };

    let mut rid = ReplicationId::default();
    for coord in rest {
        rid = rid.or(base.xor(*coord));
    }

    Ok(rid)
}

/// Every core reached by a multicast from `base` under mask `rid`.
///
/// For each axis the reachable value set starts at the base value and is
/// doubled once per set mask bit (toggling that bit in every member); the
/// result is the Cartesian product of the two axis sets. The cardinality is
/// `2^(popcount(rid.x) + popcount(rid.y))`, worst case `2^10`; bound the
/// mask before calling if that matters.
pub fn get_multicast_cores(base: Coord, rid: ReplicationId) -> HashSet<Coord> {
    let xs = axis_expand(base.x(), rid.x(), hw::N_BIT_CORE_X);
    let ys = axis_expand(base.y(), rid.y(), hw::N_BIT_CORE_Y);

    let mut cores = HashSet::with_capacity(xs.len() * ys.len());
    for &x in &xs {
        for &y in &ys {
            // Toggling in-width bits cannot leave the grid.
            cores.insert(Coord::from_parts(x, y));
        }
    }

    cores
}

fn axis_expand(base: u16, mask: u16, width: u32) -> Vec<u16> {
    let mut values = vec![base];
    for bit in 0..width {
        if (mask >> bit) & 1 == 1 {
            for i in 0..values.len() {
                values.push(values[i] ^ (1 << bit));
            }
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_index_follows_axis_priority() {
        assert_eq!(RoutingDirection::X0Y0.to_index().unwrap(), 0);
        assert_eq!(RoutingDirection::X0Y1.to_index().unwrap(), 1);
        assert_eq!(RoutingDirection::X1Y0.to_index().unwrap(), 2);
        assert_eq!(RoutingDirection::X1Y1.to_index().unwrap(), 3);
        assert!(RoutingDirection::Any.to_index().is_err());
    }

    #[test]
    fn leaf_coordinate() {
        use RoutingDirection::{X0Y0, X0Y1, X1Y1};

        let coord = RoutingCoord([X0Y0; 5]);
        assert_eq!(coord.level(), RoutingLevel::L0);
        assert_eq!(coord.to_coord().unwrap(), Coord::new(0, 0).unwrap());

        let coord = RoutingCoord([X0Y1, X1Y1, X0Y0, X0Y1, X0Y1]);
        assert_eq!(coord.level(), RoutingLevel::L0);
        assert_eq!(
            coord.to_coord().unwrap(),
            Coord::new(0b01000, 0b11011).unwrap()
        );
    }

    #[test]
    fn partial_coordinate_has_no_core() {
        use RoutingDirection::{Any, X0Y0, X0Y1, X1Y1};

        let coord = RoutingCoord([X0Y0, X1Y1, X0Y0, Any, X0Y1]);
        assert_eq!(coord.level(), RoutingLevel::L2);
        assert!(coord.to_coord().is_err());

        let coord = RoutingCoord([Any, X1Y1, X0Y0, Any, X0Y1]);
        assert_eq!(coord.level(), RoutingLevel::L5);
        assert!(coord.to_coord().is_err());
    }

    #[test]
    fn path_from_core_count() {
        // Core 0 sits at the all-X0Y0 leaf.
        assert_eq!(
            RoutingPath::from_core_count(0).to_coord().unwrap(),
            Coord::new(0, 0).unwrap()
        );
        // Core 5 = 11 base 4 -> one step at L1, one at L0, Y fast axis.
        assert_eq!(
            RoutingPath::from_core_count(5).to_coord().unwrap(),
            Coord::new(0, 0b00011).unwrap()
        );
        // The last core of the chip.
        assert_eq!(
            RoutingPath::from_core_count(1023).to_coord().unwrap(),
            Coord::new(31, 31).unwrap()
        );
    }

    #[test]
    fn consumption_table() {
        let cases = [
            (1, [1, 1, 1, 1, 1, 1]),
            (2, [2, 1, 1, 1, 1, 1]),
            (3, [4, 1, 1, 1, 1, 1]),
            (7, [8, 2, 1, 1, 1, 1]),
            (12, [16, 4, 1, 1, 1, 1]),
            (20, [32, 8, 2, 1, 1, 1]),
            (32, [32, 8, 2, 1, 1, 1]),
            (33, [64, 16, 4, 1, 1, 1]),
            (63, [64, 16, 4, 1, 1, 1]),
            (65, [128, 32, 8, 2, 1, 1]),
            (128, [128, 32, 8, 2, 1, 1]),
            (1024, [1024, 256, 64, 16, 4, 1]),
        ];

        for (n_core, expected) in cases {
            let cost = get_routing_consumption(n_core);
            assert_eq!(cost.as_array(), expected, "n_core = {n_core}");
        }
    }

    #[test]
    fn consumption_monotonic() {
        let mut prev = get_routing_consumption(1).as_array();
        for n in 2..=1024 {
            let cur = get_routing_consumption(n).as_array();
            for (p, c) in prev.iter().zip(cur.iter()) {
                assert!(c >= p, "consumption shrank at n_core = {n}");
            }
            prev = cur;
        }
    }

    #[test]
    fn routing_level_of_cost() {
        assert_eq!(
            get_routing_consumption(1).routing_level().unwrap(),
            RoutingLevel::L1
        );
        assert_eq!(
            get_routing_consumption(20).routing_level().unwrap(),
            RoutingLevel::L3
        );
        assert_eq!(
            get_routing_consumption(1024).routing_level().unwrap(),
            RoutingLevel::L5
        );

        let cost = RoutingCost {
            n_l0: 4096,
            n_l1: 1024,
            n_l2: 256,
            n_l3: 64,
            n_l4: 16,
            n_l5: 4,
        };
        assert!(cost.routing_level().is_err());
    }

    fn c(x: u16, y: u16) -> Coord {
        Coord::new(x, y).unwrap()
    }

    fn rid(x: u16, y: u16) -> ReplicationId {
        ReplicationId::new(x, y).unwrap()
    }

    #[test]
    fn replication_id_fold() {
        assert_eq!(get_replication_id(&[c(7, 7)]).unwrap(), rid(0, 0));
        assert_eq!(
            get_replication_id(&[c(0, 0), c(1, 0), c(1, 1)]).unwrap(),
            rid(1, 1)
        );
        assert_eq!(
            get_replication_id(&[c(0b11111, 0b11111), c(0, 0)]).unwrap(),
            rid(0b11111, 0b11111)
        );
        assert_eq!(
            get_replication_id(&[c(0b10000, 0b10000), c(1, 0b10000), c(1, 0b10000)]).unwrap(),
            rid(0b10001, 0)
        );
        assert!(get_replication_id(&[]).is_err());
    }

    #[test]
    fn multicast_expansion() {
        let cores = get_multicast_cores(c(0, 0), rid(0b00001, 0b00010));
        let expected: HashSet<_> = [c(0, 0), c(1, 0), c(0, 2), c(1, 2)].into();
        assert_eq!(cores, expected);

        let cores = get_multicast_cores(c(0b11111, 0), rid(0b10000, 0));
        let expected: HashSet<_> = [c(0b11111, 0), c(0b01111, 0)].into();
        assert_eq!(cores, expected);
    }

    #[test]
    fn multicast_cardinality() {
        let cases = [
            (c(0b00110, 0b01000), rid(0b11100, 0b00000), 8),
            (c(0b00001, 0b00000), rid(0b00011, 0b00001), 8),
            (c(0b11111, 0b00000), rid(0b01001, 0b00011), 16),
            (c(0b00010, 0b00111), rid(0b00000, 0b00000), 1),
            (c(0b10010, 0b10011), rid(0b11111, 0b11111), 1024),
            (c(0b11111, 0b11111), rid(0b00011, 0b11100), 32),
        ];

        for (base, mask, count) in cases {
            let cores = get_multicast_cores(base, mask);
            assert_eq!(cores.len(), count);
            assert!(cores.contains(&base));
            let pops = u32::from(mask.x().count_ones() + mask.y().count_ones());
            assert_eq!(cores.len(), 1 << pops);
        }
    }

    #[test]
    fn multicast_covers_replication_sources() {
        let group = [c(3, 9), c(17, 9), c(3, 12)];
        let mask = get_replication_id(&group).unwrap();
        let cores = get_multicast_cores(group[0], mask);
        for coord in group {
            assert!(cores.contains(&coord));
        }
    }
}
