//! Wire-format codec for PAICORE 2.0 control and work frames.
//!
//! Every exchange with the chip is a sequence of 64-bit words sharing one
//! skeleton: a 4-bit header, three 10-bit addresses and a 30-bit payload.
//! This crate owns that bit layout, packing typed parameters into frames
//! and splitting raw words back apart, and nothing else; range and
//! cross-field validation of the parameter values happens upstream.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`format`] | Field offset/mask tables, [`FrameHeader`], header checks |
//! | [`frame`] | [`Frame`] and [`FramePackage`] values, word decoding |
//! | [`reg`] | [`ParamsReg`] and its three-word packing |
//! | [`ram`] | Neuron RAM attributes and four-word package packing |
//! | [`offline`] | One constructor per concrete frame, bulk spike path |
//!
//! # Example
//!
//! ```
//! use paicore_chip::{Coord, ReplicationId};
//! use paicore_frame::offline;
//!
//! # fn main() -> Result<(), paicore_frame::FrameError> {
//! let chip = Coord::new(0, 0)?;
//! let core = Coord::new(10, 10)?;
//! let rid = ReplicationId::new(0, 0)?;
//!
//! // A spike for axon 100 in timeslot 3 carrying the byte 0x7F.
//! let spike = offline::work_frame1(chip, core, rid, 3, 100, 0x7F)?;
//! assert_eq!(spike.value().len(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod error;
pub mod format;
pub mod frame;
pub mod offline;
pub mod ram;
pub mod reg;

pub use error::{FrameError, Result};
pub use format::{header_check, header_of, FrameHeader, FrameType};
pub use frame::{common_prefix, decode_word, DecodedWord, Frame, FramePackage};
pub use ram::{LeakV, NeuronAttrs, NeuronDestInfo};
pub use reg::{package_repeat, InputWidth, LcnExtension, ParamsReg, SpikeWidth, WeightWidth};
