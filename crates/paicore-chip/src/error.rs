//! Error types for coordinate and routing operations

use thiserror::Error;

use crate::routing::RoutingDirection;

/// Result type alias for chip-model operations
pub type Result<T> = std::result::Result<T, ChipError>;

/// Errors that can occur while manipulating coordinates or routing paths
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChipError {
    /// A coordinate axis is outside the core grid
    #[error("coordinate axis {axis} out of range: {value} (grid allows 0..={max})")]
    CoordOutOfRange {
        /// Axis name, `"x"` or `"y"`
        axis: &'static str,
        /// Offending value
        value: i32,
        /// Upper bound of the axis
        max: u16,
    },

    /// A coordinate offset axis exceeds its signed range
    #[error("coordinate offset ({dx}, {dy}) out of range (each axis allows -{max}..={max})")]
    OffsetOutOfRange {
        /// X component of the offset
        dx: i32,
        /// Y component of the offset
        dy: i32,
        /// Magnitude bound of each axis
        max: u16,
    },

    /// A flat address exceeds the combined X/Y address space
    #[error("address {addr:#x} exceeds the {bits}-bit coordinate address space")]
    AddressOutOfRange {
        /// Offending address
        addr: u64,
        /// Total address width in bits
        bits: u32,
    },

    /// Carry propagation pushed the priority axis past its bound
    #[error("coordinate of {axis} out of {bound} limit after carry: {value}")]
    CarryOverflow {
        /// Axis that absorbed the carry, `"x"` or `"y"`
        axis: &'static str,
        /// `"high"` or `"low"`
        bound: &'static str,
        /// Value the axis would have taken
        value: i32,
    },

    /// Replication id requested for an empty coordinate set
    #[error("replication id needs at least one coordinate")]
    EmptyCoordinates,

    /// A routing coordinate still contains `ANY` entries
    #[error("routing direction not fully specified: {directions:?}")]
    Unspecified {
        /// The offending direction sequence
        directions: [RoutingDirection; 5],
    },

    /// A routing coordinate above L0 was asked for its physical core
    #[error("only an L0 cluster maps to a physical core, this one is L{level}")]
    NotALeaf {
        /// Actual level of the cluster
        level: u8,
    },

    /// The routing tree cannot host the requested number of cores
    #[error("number of L5 clusters out of range: {n_l5}")]
    TreeExhausted {
        /// Computed L5 node count
        n_l5: usize,
    },
}
