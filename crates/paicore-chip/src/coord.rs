//! Core coordinates and replication-id multicast masks.
//!
//! A [`Coord`] addresses one physical core on the 32×32 grid: left to right
//! is +X, top to bottom is +Y. The 10-bit hardware address is the
//! concatenation of both axes with X in the high half.
//!
//! Coordinate arithmetic is not modular arithmetic on a flat integer: the
//! chip encodes addresses as two 5-bit digits with carry between them, and
//! which axis absorbs the carry is fixed by [`hw::COORD_Y_PRIORITY`]. See
//! [`Coord::add`].

use std::fmt;

use crate::error::{ChipError, Result};
use crate::hw;

const X_RANGE: i32 = (hw::CORE_X_MAX - hw::CORE_X_MIN + 1) as i32;
const Y_RANGE: i32 = (hw::CORE_Y_MAX - hw::CORE_Y_MIN + 1) as i32;

/// Coordinate of one core on the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    x: u16,
    y: u16,
}

impl Coord {
    /// Create a coordinate, validating both axes against the grid bounds.
    ///
    /// # Errors
    ///
    /// [`ChipError::CoordOutOfRange`] if either axis exceeds `2^5 - 1`.
    pub fn new(x: u16, y: u16) -> Result<Self> {
        Self::checked(i32::from(x), i32::from(y))
    }

    /// Validating constructor over signed intermediates, used by the carry
    /// arithmetic.
    fn checked(x: i32, y: i32) -> Result<Self> {
        if x < i32::from(hw::CORE_X_MIN) || x > i32::from(hw::CORE_X_MAX) {
            return Err(ChipError::CoordOutOfRange {
                axis: "x",
                value: x,
                max: hw::CORE_X_MAX,
            });
        }
        if y < i32::from(hw::CORE_Y_MIN) || y > i32::from(hw::CORE_Y_MAX) {
            return Err(ChipError::CoordOutOfRange {
                axis: "y",
                value: y,
                max: hw::CORE_Y_MAX,
            });
        }

        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        Ok(Self {
            x: x as u16,
            y: y as u16,
        })
    }

    /// Decode a coordinate from its 10-bit hardware address.
    ///
    /// # Errors
    ///
    /// [`ChipError::AddressOutOfRange`] if `addr` exceeds the combined
    /// address space.
    pub fn from_addr(addr: u64) -> Result<Self> {
        let bits = hw::N_BIT_CORE_X + hw::N_BIT_CORE_Y;
        if addr >> bits != 0 {
            return Err(ChipError::AddressOutOfRange { addr, bits });
        }

        #[allow(clippy::cast_possible_truncation)]
        Ok(Self {
            x: (addr >> hw::N_BIT_CORE_Y) as u16,
            y: (addr as u16) & hw::CORE_Y_MAX,
        })
    }

    /// Unchecked constructor for values already proven in range.
    pub(crate) const fn from_parts(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// X component.
    pub const fn x(self) -> u16 {
        self.x
    }

    /// Y component.
    pub const fn y(self) -> u16 {
        self.y
    }

    /// The 10-bit hardware address: X in the high 5 bits, Y in the low 5.
    pub const fn address(self) -> u64 {
        ((self.x as u64) << hw::N_BIT_CORE_Y) | self.y as u64
    }

    /// Add an offset with the hardware two-axis carry.
    ///
    /// Under Y-priority the raw sums `x + dx, y + dy` are computed first; if
    /// X leaves its 5-bit range it wraps through the range and carries ±1
    /// into Y. The carry axis is then checked against its own bound and the
    /// operation fails when it overflows. Under X-priority the roles of the
    /// axes are mirrored. The asymmetry matches the silicon's digit-carry
    /// address encoding.
    ///
    /// # Errors
    ///
    /// [`ChipError::CarryOverflow`] when the carry axis leaves the grid,
    /// [`ChipError::CoordOutOfRange`] when a non-carried axis does.
    pub fn add(self, offset: CoordOffset) -> Result<Self> {
        let (x, y) = sum_carry(
            i32::from(self.x) + i32::from(offset.dx),
            i32::from(self.y) + i32::from(offset.dy),
        )?;
        Self::checked(x, y)
    }

    /// Subtract an offset, borrowing across axes like [`Coord::add`].
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Coord::add`].
    pub fn sub_offset(self, offset: CoordOffset) -> Result<Self> {
        let (x, y) = sum_carry(
            i32::from(self.x) - i32::from(offset.dx),
            i32::from(self.y) - i32::from(offset.dy),
        )?;
        Self::checked(x, y)
    }

    /// Difference of two coordinates. Never carries and never fails: each
    /// axis difference fits the offset range by construction.
    #[allow(clippy::cast_possible_truncation)]
    pub fn sub(self, other: Self) -> CoordOffset {
        CoordOffset {
            dx: (i32::from(self.x) - i32::from(other.x)) as i16,
            dy: (i32::from(self.y) - i32::from(other.y)) as i16,
        }
    }

    /// Per-axis XOR of two coordinates, yielding the replication mask that
    /// covers both.
    pub const fn xor(self, other: Self) -> ReplicationId {
        ReplicationId {
            x: self.x ^ other.x,
            y: self.y ^ other.y,
        }
    }

    /// `(x, y)` tuple.
    pub const fn to_tuple(self) -> (u16, u16) {
        (self.x, self.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Displacement between two coordinates. Not an address: each axis is a
/// signed delta bounded by `±(2^5 - 1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CoordOffset {
    dx: i16,
    dy: i16,
}

impl CoordOffset {
    /// Create an offset, validating both deltas.
    ///
    /// # Errors
    ///
    /// [`ChipError::OffsetOutOfRange`] if either delta exceeds `±(2^5 - 1)`.
    pub fn new(dx: i16, dy: i16) -> Result<Self> {
        Self::checked(i32::from(dx), i32::from(dy))
    }

    fn checked(dx: i32, dy: i32) -> Result<Self> {
        let max_x = i32::from(hw::CORE_X_MAX);
        let max_y = i32::from(hw::CORE_Y_MAX);

        if dx < -max_x || dx > max_x || dy < -max_y || dy > max_y {
            return Err(ChipError::OffsetOutOfRange {
                dx,
                dy,
                max: hw::CORE_X_MAX,
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        Ok(Self {
            dx: dx as i16,
            dy: dy as i16,
        })
    }

    /// Build an offset from a flat core index: `dx = flat / 32`,
    /// `dy = flat % 32`.
    ///
    /// # Errors
    ///
    /// [`ChipError::OffsetOutOfRange`] if the index spills past the grid.
    pub fn from_offset(flat: u32) -> Result<Self> {
        Self::checked((flat / u32::from(hw::CORE_X_MAX + 1)) as i32, (flat % u32::from(hw::CORE_Y_MAX + 1)) as i32)
    }

    /// X delta.
    pub const fn dx(self) -> i16 {
        self.dx
    }

    /// Y delta.
    pub const fn dy(self) -> i16 {
        self.dy
    }

    /// Plain per-axis sum. Offsets never carry; the result is re-validated.
    ///
    /// # Errors
    ///
    /// [`ChipError::OffsetOutOfRange`] when an axis leaves its range.
    pub fn add(self, other: Self) -> Result<Self> {
        Self::checked(
            i32::from(self.dx) + i32::from(other.dx),
            i32::from(self.dy) + i32::from(other.dy),
        )
    }

    /// Plain per-axis difference, re-validated.
    ///
    /// # Errors
    ///
    /// [`ChipError::OffsetOutOfRange`] when an axis leaves its range.
    pub fn sub(self, other: Self) -> Result<Self> {
        Self::checked(
            i32::from(self.dx) - i32::from(other.dx),
            i32::from(self.dy) - i32::from(other.dy),
        )
    }

    /// `(dx, dy)` tuple.
    pub const fn to_tuple(self) -> (i16, i16) {
        (self.dx, self.dy)
    }

    /// Euclidean length of the displacement.
    pub fn euclidean(self) -> f64 {
        f64::from(i32::from(self.dx).pow(2) + i32::from(self.dy).pow(2)).sqrt()
    }

    /// Manhattan length of the displacement.
    pub const fn manhattan(self) -> u16 {
        self.dx.unsigned_abs() + self.dy.unsigned_abs()
    }

    /// Chebyshev length of the displacement.
    pub fn chebyshev(self) -> u16 {
        self.dx.unsigned_abs().max(self.dy.unsigned_abs())
    }
}

impl fmt::Display for CoordOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dx, self.dy)
    }
}

/// Replication id: a coordinate-shaped bitmask, not an address.
///
/// A set bit marks the corresponding address bit as "don't care": the
/// hardware delivers a multicast frame to both the 0 and the 1 value of that
/// bit. The mask for a group of cores is the OR-fold of the XOR differences
/// from a base coordinate; see
/// [`get_replication_id`](crate::routing::get_replication_id).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReplicationId {
    x: u16,
    y: u16,
}

impl ReplicationId {
    /// Create a mask, validating both axes against the 5-bit width.
    ///
    /// # Errors
    ///
    /// [`ChipError::CoordOutOfRange`] if either axis exceeds `2^5 - 1`.
    pub fn new(x: u16, y: u16) -> Result<Self> {
        let Coord { x, y } = Coord::new(x, y)?;
        Ok(Self { x, y })
    }

    /// Decode a mask from its 10-bit address form.
    ///
    /// # Errors
    ///
    /// [`ChipError::AddressOutOfRange`] if `addr` exceeds the combined
    /// address space.
    pub fn from_addr(addr: u64) -> Result<Self> {
        let Coord { x, y } = Coord::from_addr(addr)?;
        Ok(Self { x, y })
    }

    /// X mask bits.
    pub const fn x(self) -> u16 {
        self.x
    }

    /// Y mask bits.
    pub const fn y(self) -> u16 {
        self.y
    }

    /// The mask in 10-bit address form.
    pub const fn address(self) -> u64 {
        ((self.x as u64) << hw::N_BIT_CORE_Y) | self.y as u64
    }

    /// Per-axis AND. Always in range: both operands are.
    pub const fn and(self, other: Self) -> Self {
        Self {
            x: self.x & other.x,
            y: self.y & other.y,
        }
    }

    /// Per-axis OR.
    pub const fn or(self, other: Self) -> Self {
        Self {
            x: self.x | other.x,
            y: self.y | other.y,
        }
    }

    /// Per-axis XOR.
    pub const fn xor(self, other: Self) -> Self {
        Self {
            x: self.x ^ other.x,
            y: self.y ^ other.y,
        }
    }
}

impl fmt::Display for ReplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Two-axis digit carry.
///
/// Only the non-priority axis is wrapped here; the caller validates the
/// final pair, so a priority-axis value that was never carried into still
/// gets range-checked downstream.
fn sum_carry(mut cx: i32, mut cy: i32) -> Result<(i32, i32)> {
    if hw::COORD_Y_PRIORITY {
        if cx > i32::from(hw::CORE_X_MAX) {
            if cy < i32::from(hw::CORE_Y_MAX) {
                cx -= X_RANGE;
                cy += 1;
            } else {
                return Err(ChipError::CarryOverflow {
                    axis: "y",
                    bound: "high",
                    value: cy + 1,
                });
            }
        } else if cx < i32::from(hw::CORE_X_MIN) {
            if cy > i32::from(hw::CORE_Y_MIN) {
                cx += X_RANGE;
                cy -= 1;
            } else {
                return Err(ChipError::CarryOverflow {
                    axis: "y",
                    bound: "low",
                    value: cy - 1,
                });
            }
        }
    } else {
        if cy > i32::from(hw::CORE_Y_MAX) {
            if cx < i32::from(hw::CORE_X_MAX) {
                cx += 1;
                cy -= Y_RANGE;
            } else {
                return Err(ChipError::CarryOverflow {
                    axis: "x",
                    bound: "high",
                    value: cx + 1,
                });
            }
        } else if cy < i32::from(hw::CORE_Y_MIN) {
            if cx > i32::from(hw::CORE_X_MIN) {
                cx -= 1;
                cy += Y_RANGE;
            } else {
                return Err(ChipError::CarryOverflow {
                    axis: "x",
                    bound: "low",
                    value: cx - 1,
                });
            }
        }
    }

    Ok((cx, cy))
}
