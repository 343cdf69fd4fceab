//! The two wire shapes every frame family reduces to.
//!
//! A [`Frame`] is the common skeleton repeated over one or more 30-bit
//! payload words; a [`FramePackage`] is one skeleton word followed by a run
//! of opaque 64-bit package words. The per-family constructors in
//! [`offline`](crate::offline) only ever produce these two shapes.

use std::fmt;

use paicore_chip::{Coord, ReplicationId};

use crate::error::Result;
use crate::format::{general, header_of, FrameHeader, FrameType};

/// Build the header + address prefix shared by every frame word 0.
pub fn common_prefix(header: FrameHeader, chip: Coord, core: Coord, rid: ReplicationId) -> u64 {
    ((header.bits() & general::HEADER_MASK) << general::HEADER_OFFSET)
        | ((chip.address() & general::CHIP_ADDR_MASK) << general::CHIP_ADDR_OFFSET)
        | ((core.address() & general::CORE_ADDR_MASK) << general::CORE_ADDR_OFFSET)
        | ((rid.address() & general::RID_ADDR_MASK) << general::RID_ADDR_OFFSET)
}

/// One control frame: the common skeleton over one or more payload words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame header.
    pub header: FrameHeader,
    /// Destination chip.
    pub chip_coord: Coord,
    /// Destination core.
    pub core_coord: Coord,
    /// Multicast replication id.
    pub rid: ReplicationId,
    /// Payload words, each truncated to 30 bits on emission.
    pub payload: Vec<u64>,
}

impl Frame {
    /// Assemble a frame from its parts.
    pub fn new(
        header: FrameHeader,
        chip_coord: Coord,
        core_coord: Coord,
        rid: ReplicationId,
        payload: Vec<u64>,
    ) -> Self {
        Self {
            header,
            chip_coord,
            core_coord,
            rid,
            payload,
        }
    }

    /// Frame class of the header.
    pub const fn frame_type(&self) -> FrameType {
        self.header.frame_type()
    }

    /// Number of 64-bit words the frame emits.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True when the frame carries no payload word at all.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// The wire words: one per payload entry, each combining the common
    /// prefix with the masked payload.
    pub fn value(&self) -> Vec<u64> {
        let prefix = common_prefix(self.header, self.chip_coord, self.core_coord, self.rid);
        self.payload
            .iter()
            .map(|pl| prefix + (pl & general::PAYLOAD_MASK))
            .collect()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frame info:")?;
        writeln!(f, "Header:               {:?}", self.header)?;
        writeln!(f, "Chip address:         {}", self.chip_coord)?;
        writeln!(f, "Core address:         {}", self.core_coord)?;
        writeln!(f, "Replication address:  {}", self.rid)?;
        writeln!(f, "Payload:              {:?}", self.payload)
    }
}

/// A frame package: one skeleton word whose payload describes a run of
/// trailing opaque 64-bit words (neuron RAM entries, weight RAM rows).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePackage {
    /// Frame header.
    pub header: FrameHeader,
    /// Destination chip.
    pub chip_coord: Coord,
    /// Destination core.
    pub core_coord: Coord,
    /// Multicast replication id.
    pub rid: ReplicationId,
    /// The 30-bit package descriptor payload (SRAM base, type, count).
    pub payload: u64,
    /// The package words, emitted verbatim after word 0.
    pub packages: Vec<u64>,
}

impl FramePackage {
    /// Assemble a frame package from its parts.
    pub fn new(
        header: FrameHeader,
        chip_coord: Coord,
        core_coord: Coord,
        rid: ReplicationId,
        payload: u64,
        packages: Vec<u64>,
    ) -> Self {
        Self {
            header,
            chip_coord,
            core_coord,
            rid,
            payload,
            packages,
        }
    }

    /// Number of package words after word 0.
    pub fn n_package(&self) -> usize {
        self.packages.len()
    }

    /// Total number of 64-bit words the package emits.
    pub fn len(&self) -> usize {
        1 + self.n_package()
    }

    /// Never true: a package always emits at least its word 0.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The wire words: the skeleton word followed by the package run.
    pub fn value(&self) -> Vec<u64> {
        let mut words = Vec::with_capacity(self.len());
        words.push(
            common_prefix(self.header, self.chip_coord, self.core_coord, self.rid)
                + (self.payload & general::PAYLOAD_MASK),
        );
        words.extend_from_slice(&self.packages);
        words
    }
}

impl fmt::Display for FramePackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FramePackage info:")?;
        writeln!(f, "Header:               {:?}", self.header)?;
        writeln!(f, "Chip address:         {}", self.chip_coord)?;
        writeln!(f, "Core address:         {}", self.core_coord)?;
        writeln!(f, "Replication address:  {}", self.rid)?;
        writeln!(f, "Payload:              {}", self.payload)?;
        writeln!(f, "Data:")?;
        for (i, package) in self.packages.iter().enumerate() {
            writeln!(f, "#{i}: {package}")?;
        }
        Ok(())
    }
}

/// The common skeleton fields of one raw frame word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedWord {
    /// Frame header.
    pub header: FrameHeader,
    /// Destination chip.
    pub chip_coord: Coord,
    /// Destination core.
    pub core_coord: Coord,
    /// Multicast replication id.
    pub rid: ReplicationId,
    /// The raw 30-bit payload.
    pub payload: u64,
}

/// Split a raw 64-bit frame word into its skeleton fields.
///
/// # Errors
///
/// [`FrameError::UnknownHeader`](crate::FrameError::UnknownHeader) for
/// unassigned header bits; coordinate decode errors cannot occur since the
/// address fields are in range by construction.
pub fn decode_word(word: u64) -> Result<DecodedWord> {
    Ok(DecodedWord {
        header: header_of(word)?,
        chip_coord: Coord::from_addr((word >> general::CHIP_ADDR_OFFSET) & general::CHIP_ADDR_MASK)?,
        core_coord: Coord::from_addr((word >> general::CORE_ADDR_OFFSET) & general::CORE_ADDR_MASK)?,
        rid: ReplicationId::from_addr((word >> general::RID_ADDR_OFFSET) & general::RID_ADDR_MASK)?,
        payload: word & general::PAYLOAD_MASK,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dest() -> (Coord, Coord, ReplicationId) {
        (
            Coord::new(1, 0).unwrap(),
            Coord::new(12, 13).unwrap(),
            ReplicationId::new(3, 0).unwrap(),
        )
    }

    #[test]
    fn value_length_matches_payload() {
        let (chip, core, rid) = dest();
        let frame = Frame::new(FrameHeader::ConfigType1, chip, core, rid, vec![0]);
        assert_eq!(frame.value().len(), 1);

        let frame = Frame::new(FrameHeader::ConfigType2, chip, core, rid, vec![1, 2, 3]);
        assert_eq!(frame.value().len(), 3);

        let pkg = FramePackage::new(FrameHeader::ConfigType4, chip, core, rid, 4, vec![9; 4]);
        assert_eq!(pkg.value().len(), 5);
    }

    #[test]
    fn word_zero_round_trips() {
        let (chip, core, rid) = dest();
        let frame = Frame::new(FrameHeader::WorkType1, chip, core, rid, vec![0x2AAB_CDEF]);
        let word = frame.value()[0];

        let decoded = decode_word(word).unwrap();
        assert_eq!(decoded.header, FrameHeader::WorkType1);
        assert_eq!(decoded.chip_coord, chip);
        assert_eq!(decoded.core_coord, core);
        assert_eq!(decoded.rid, rid);
        assert_eq!(decoded.payload, 0x2AAB_CDEF);
    }

    #[test]
    fn payload_is_masked_to_30_bits() {
        let (chip, core, rid) = dest();
        let frame = Frame::new(FrameHeader::WorkType2, chip, core, rid, vec![u64::MAX]);
        let decoded = decode_word(frame.value()[0]).unwrap();
        assert_eq!(decoded.payload, (1 << 30) - 1);
        assert_eq!(decoded.rid, rid);
    }

    #[test]
    fn package_words_pass_through_verbatim() {
        let (chip, core, rid) = dest();
        let rows = vec![u64::MAX, 0, 0xDEAD_BEEF_DEAD_BEEF];
        let pkg = FramePackage::new(FrameHeader::ConfigType4, chip, core, rid, 3, rows.clone());
        assert_eq!(&pkg.value()[1..], &rows[..]);
    }
}
