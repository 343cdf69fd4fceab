//! Error types for frame encoding and decoding

use thiserror::Error;

use crate::format::FrameHeader;

/// Result type alias for frame codec operations
pub type Result<T> = std::result::Result<T, FrameError>;

/// Errors that can occur while building or decoding frames
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// A field value exceeds its declared bit-width
    #[error("field `{field}` out of range: {value} does not fit in {width} bits")]
    FieldOutOfRange {
        /// Field name as it appears in the frame layout
        field: &'static str,
        /// Offending value
        value: u64,
        /// Declared width of the field in bits
        width: u32,
    },

    /// Two arrays that must be index-aligned differ in length
    #[error("length mismatch for {what}: {left} != {right}")]
    LengthMismatch {
        /// What is being aligned (e.g. `"axons/timeslots"`)
        what: &'static str,
        /// Left-hand length
        left: usize,
        /// Right-hand length
        right: usize,
    },

    /// More neurons requested than destination entries provided
    #[error("{n_neuron} neurons requested but only {n_dest} destination entries given")]
    NeuronCount {
        /// Requested neuron count
        n_neuron: usize,
        /// Available destination entries
        n_dest: usize,
    },

    /// The 4-bit header value is unassigned
    #[error("unknown frame header bits: {bits:#06b}")]
    UnknownHeader {
        /// Offending header bits
        bits: u8,
    },

    /// A raw frame array starts with the wrong header
    #[error("expected frame header {expected:?}, but got {got:?}")]
    HeaderMismatch {
        /// Header the caller asked for
        expected: FrameHeader,
        /// Header actually found in word 0
        got: FrameHeader,
    },

    /// A raw frame array mixes several headers (or is empty)
    #[error("frame words do not share a single header")]
    MixedHeaders,

    /// A coordinate embedded in a frame failed to decode
    #[error(transparent)]
    Chip(#[from] paicore_chip::ChipError),
}
