//! Silicon model for the PAICORE 2.0 neuromorphic chip.
//!
//! This crate is a pure model of the chip's addressing scheme, with no device
//! access, no I/O. It covers the 32×32 core grid, the two-axis carry
//! arithmetic used by the hardware address encoding, the replication-id
//! multicast masks and the 5-level quad-tree routing hierarchy.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`hw`] | Grid bit-widths, axis priority, per-mode capacity limits |
//! | [`coord`] | [`Coord`], [`CoordOffset`], [`ReplicationId`] arithmetic |
//! | [`routing`] | Routing tree paths, cost computation, multicast expansion |
//!
//! # Example
//!
//! ```
//! use paicore_chip::{Coord, CoordOffset};
//!
//! # fn main() -> Result<(), paicore_chip::ChipError> {
//! let c = Coord::new(12, 13)?;
//! // X overflows to 33, wraps through its 5-bit range and carries into Y.
//! assert_eq!(c.add(CoordOffset::new(21, 2)?)?, Coord::new(1, 16)?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod coord;
mod error;
pub mod hw;
pub mod routing;

pub use coord::{Coord, CoordOffset, ReplicationId};
pub use error::{ChipError, Result};
pub use routing::{
    get_multicast_cores, get_replication_id, get_routing_consumption, RoutingCoord, RoutingCost,
    RoutingDirection, RoutingLevel, RoutingPath,
};
