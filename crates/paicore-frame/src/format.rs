//! Bit layout of the PAICORE frame families.
//!
//! Every frame is one or more 64-bit words. Word 0 always carries the
//! common skeleton:
//!
//! ```text
//! 63    60 59      50 49      40 39     30 29              0
//! ┌────────┬──────────┬──────────┬─────────┬────────────────┐
//! │ header │ chip(10) │ core(10) │ rid(10) │  payload(30)   │
//! └────────┴──────────┴──────────┴─────────┴────────────────┘
//! ```
//!
//! The offsets and masks below are the wire contract; they must not drift.

use crate::error::{FrameError, Result};

/// Coarse frame class, the high 2 bits of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// Configuration frames (types I–IV).
    Config,
    /// Test frames (types I–IV).
    Test,
    /// Work frames (spike / sync / clear / init).
    Work,
}

/// The 4-bit frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameHeader {
    /// Config type I: random seed.
    ConfigType1 = 0b0000,
    /// Config type II: parameter register.
    ConfigType2 = 0b0001,
    /// Config type III: neuron RAM.
    ConfigType3 = 0b0010,
    /// Config type IV: weight RAM.
    ConfigType4 = 0b0011,
    /// Test type I.
    TestType1 = 0b0100,
    /// Test type II.
    TestType2 = 0b0101,
    /// Test type III.
    TestType3 = 0b0110,
    /// Test type IV.
    TestType4 = 0b0111,
    /// Work type I: spike.
    WorkType1 = 0b1000,
    /// Work type II: sync.
    WorkType2 = 0b1001,
    /// Work type III: clear.
    WorkType3 = 0b1010,
    /// Work type IV: init.
    WorkType4 = 0b1011,
}

impl FrameHeader {
    /// The header's 4-bit wire value.
    pub const fn bits(self) -> u64 {
        self as u64
    }

    /// Decode a header from its 4-bit wire value.
    ///
    /// # Errors
    ///
    /// [`FrameError::UnknownHeader`] for the unassigned values
    /// `0b1100..=0b1111`.
    pub fn from_bits(bits: u8) -> Result<Self> {
        Ok(match bits {
            0b0000 => Self::ConfigType1,
            0b0001 => Self::ConfigType2,
            0b0010 => Self::ConfigType3,
            0b0011 => Self::ConfigType4,
            0b0100 => Self::TestType1,
            0b0101 => Self::TestType2,
            0b0110 => Self::TestType3,
            0b0111 => Self::TestType4,
            0b1000 => Self::WorkType1,
            0b1001 => Self::WorkType2,
            0b1010 => Self::WorkType3,
            0b1011 => Self::WorkType4,
            _ => return Err(FrameError::UnknownHeader { bits }),
        })
    }

    /// Frame class of this header.
    pub const fn frame_type(self) -> FrameType {
        match self {
            Self::ConfigType1 | Self::ConfigType2 | Self::ConfigType3 | Self::ConfigType4 => {
                FrameType::Config
            }
            Self::TestType1 | Self::TestType2 | Self::TestType3 | Self::TestType4 => {
                FrameType::Test
            }
            Self::WorkType1 | Self::WorkType2 | Self::WorkType3 | Self::WorkType4 => {
                FrameType::Work
            }
        }
    }
}

/// Common frame skeleton.
pub mod general {
    #![allow(missing_docs)]
    /// Whole-word mask.
    pub const MASK: u64 = u64::MAX;

    /// 4-bit header at bit 60.
    pub const HEADER_OFFSET: u32 = 60;
    pub const HEADER_MASK: u64 = (1 << 4) - 1;

    /// 10-bit chip address at bit 50.
    pub const CHIP_ADDR_OFFSET: u32 = 50;
    pub const CHIP_ADDR_MASK: u64 = (1 << 10) - 1;

    /// 10-bit core address at bit 40.
    pub const CORE_ADDR_OFFSET: u32 = 40;
    pub const CORE_ADDR_MASK: u64 = (1 << 10) - 1;

    /// 10-bit replication id at bit 30.
    pub const RID_ADDR_OFFSET: u32 = 30;
    pub const RID_ADDR_MASK: u64 = (1 << 10) - 1;

    /// 30-bit payload at bit 0.
    pub const PAYLOAD_OFFSET: u32 = 0;
    pub const PAYLOAD_MASK: u64 = (1 << 30) - 1;
}

/// Package payload sub-fields, shared by config/test frame types III and IV.
pub mod package {
    #![allow(missing_docs)]
    /// 10-bit SRAM base address at payload bit 20.
    pub const SRAM_ADDR_OFFSET: u32 = 20;
    pub const SRAM_ADDR_MASK: u64 = (1 << 10) - 1;

    /// Package type flag at payload bit 19: 0 = config / test-out,
    /// 1 = test-in.
    pub const TYPE_OFFSET: u32 = 19;
    pub const TYPE_MASK: u64 = 1;

    /// 19-bit package count at payload bit 0.
    pub const NUM_OFFSET: u32 = 0;
    pub const NUM_MASK: u64 = (1 << 19) - 1;
}

/// Parameter register frame (config/test type II), packed across three
/// payload words.
pub mod reg {
    #![allow(missing_docs)]
    // Word 1
    pub const WEIGHT_WIDTH_OFFSET: u32 = 28;
    pub const WEIGHT_WIDTH_MASK: u64 = (1 << 2) - 1;
    pub const LCN_OFFSET: u32 = 24;
    pub const LCN_MASK: u64 = (1 << 4) - 1;
    pub const INPUT_WIDTH_OFFSET: u32 = 23;
    pub const INPUT_WIDTH_MASK: u64 = 1;
    pub const SPIKE_WIDTH_OFFSET: u32 = 22;
    pub const SPIKE_WIDTH_MASK: u64 = 1;
    pub const NEURON_NUM_OFFSET: u32 = 9;
    pub const NEURON_NUM_MASK: u64 = (1 << 13) - 1;
    pub const POOL_MAX_OFFSET: u32 = 8;
    pub const POOL_MAX_MASK: u64 = 1;
    /// `tick_wait_start` is 15 bits wide and splits at bit 7: the high 8
    /// bits end word 1, the low 7 bits open word 2. The split position is
    /// part of the wire contract.
    pub const TICK_WAIT_START_SPLIT: u32 = 7;
    pub const TICK_WAIT_START_HIGH8_OFFSET: u32 = 0;
    pub const TICK_WAIT_START_HIGH8_MASK: u64 = (1 << 8) - 1;

    // Word 2
    pub const TICK_WAIT_START_LOW7_OFFSET: u32 = 23;
    pub const TICK_WAIT_START_LOW7_MASK: u64 = (1 << 7) - 1;
    pub const TICK_WAIT_END_OFFSET: u32 = 8;
    pub const TICK_WAIT_END_MASK: u64 = (1 << 15) - 1;
    pub const SNN_EN_OFFSET: u32 = 7;
    pub const SNN_EN_MASK: u64 = 1;
    pub const TARGET_LCN_OFFSET: u32 = 3;
    pub const TARGET_LCN_MASK: u64 = (1 << 4) - 1;
    /// `test_chip_addr` (10 bits) splits at bit 7: high 3 bits end word 2,
    /// low 7 bits open word 3.
    pub const TEST_CHIP_ADDR_SPLIT: u32 = 7;
    pub const TEST_CHIP_ADDR_HIGH3_OFFSET: u32 = 0;
    pub const TEST_CHIP_ADDR_HIGH3_MASK: u64 = (1 << 3) - 1;

    // Word 3
    pub const TEST_CHIP_ADDR_LOW7_OFFSET: u32 = 23;
    pub const TEST_CHIP_ADDR_LOW7_MASK: u64 = (1 << 7) - 1;
}

/// Neuron RAM package words (config/test type III). Four 64-bit words per
/// neuron, least significant word first.
pub mod ram {
    #![allow(missing_docs)]
    // Word 1, bits [63:0]
    pub const VJT_PRE_OFFSET: u32 = 0;
    pub const VJT_PRE_MASK: u64 = (1 << 30) - 1;
    pub const BIT_TRUNCATE_OFFSET: u32 = 30;
    pub const BIT_TRUNCATE_MASK: u64 = (1 << 5) - 1;
    pub const WEIGHT_DET_STOCH_OFFSET: u32 = 35;
    pub const WEIGHT_DET_STOCH_MASK: u64 = 1;
    /// `leak_v` is 30 bits wide and splits at bit 28: the low 28 bits end
    /// word 1, the high 2 bits open word 2.
    pub const LEAK_V_SPLIT: u32 = 28;
    pub const LEAK_V_LOW28_OFFSET: u32 = 36;
    pub const LEAK_V_LOW28_MASK: u64 = (1 << 28) - 1;

    // Word 2, bits [127:64]
    pub const LEAK_V_HIGH2_OFFSET: u32 = 0;
    pub const LEAK_V_HIGH2_MASK: u64 = (1 << 2) - 1;
    pub const LEAK_DET_STOCH_OFFSET: u32 = 2;
    pub const LEAK_DET_STOCH_MASK: u64 = 1;
    pub const LEAK_REVERSAL_FLAG_OFFSET: u32 = 3;
    pub const LEAK_REVERSAL_FLAG_MASK: u64 = 1;
    pub const THRESHOLD_POS_OFFSET: u32 = 4;
    pub const THRESHOLD_POS_MASK: u64 = (1 << 29) - 1;
    pub const THRESHOLD_NEG_OFFSET: u32 = 33;
    pub const THRESHOLD_NEG_MASK: u64 = (1 << 29) - 1;
    pub const THRESHOLD_NEG_MODE_OFFSET: u32 = 62;
    pub const THRESHOLD_NEG_MODE_MASK: u64 = 1;
    /// `threshold_mask_ctrl` is 5 bits wide and splits at bit 1: the low
    /// bit ends word 2, the high 4 bits open word 3.
    pub const THRESHOLD_MASK_CTRL_SPLIT: u32 = 1;
    pub const THRESHOLD_MASK_CTRL_LOW1_OFFSET: u32 = 63;
    pub const THRESHOLD_MASK_CTRL_LOW1_MASK: u64 = 1;

    // Word 3, bits [191:128]
    pub const THRESHOLD_MASK_CTRL_HIGH4_OFFSET: u32 = 0;
    pub const THRESHOLD_MASK_CTRL_HIGH4_MASK: u64 = (1 << 4) - 1;
    pub const LEAK_POST_OFFSET: u32 = 4;
    pub const LEAK_POST_MASK: u64 = 1;
    pub const RESET_V_OFFSET: u32 = 5;
    pub const RESET_V_MASK: u64 = (1 << 30) - 1;
    pub const RESET_MODE_OFFSET: u32 = 35;
    pub const RESET_MODE_MASK: u64 = (1 << 2) - 1;
    pub const ADDR_CHIP_Y_OFFSET: u32 = 37;
    pub const ADDR_CHIP_Y_MASK: u64 = (1 << 5) - 1;
    pub const ADDR_CHIP_X_OFFSET: u32 = 42;
    pub const ADDR_CHIP_X_MASK: u64 = (1 << 5) - 1;
    pub const ADDR_CORE_Y_EX_OFFSET: u32 = 47;
    pub const ADDR_CORE_Y_EX_MASK: u64 = (1 << 5) - 1;
    pub const ADDR_CORE_X_EX_OFFSET: u32 = 52;
    pub const ADDR_CORE_X_EX_MASK: u64 = (1 << 5) - 1;
    pub const ADDR_CORE_Y_OFFSET: u32 = 57;
    pub const ADDR_CORE_Y_MASK: u64 = (1 << 5) - 1;
    /// `addr_core_x` (5 bits) splits at bit 2: the low 2 bits end word 3,
    /// the high 3 bits open word 4.
    pub const ADDR_CORE_X_SPLIT: u32 = 2;
    pub const ADDR_CORE_X_LOW2_OFFSET: u32 = 62;
    pub const ADDR_CORE_X_LOW2_MASK: u64 = (1 << 2) - 1;

    // Word 4, bits [213:192]
    pub const ADDR_CORE_X_HIGH3_OFFSET: u32 = 0;
    pub const ADDR_CORE_X_HIGH3_MASK: u64 = (1 << 3) - 1;
    pub const ADDR_AXON_OFFSET: u32 = 3;
    pub const ADDR_AXON_MASK: u64 = (1 << 11) - 1;
    pub const TICK_RELATIVE_OFFSET: u32 = 14;
    pub const TICK_RELATIVE_MASK: u64 = (1 << 8) - 1;
}

/// Spike work frame (work type I), single payload word.
pub mod work1 {
    #![allow(missing_docs)]
    pub const RESERVED_OFFSET: u32 = 27;
    pub const RESERVED_MASK: u64 = (1 << 3) - 1;
    pub const AXON_OFFSET: u32 = 16;
    pub const AXON_MASK: u64 = (1 << 11) - 1;
    pub const TIMESLOT_OFFSET: u32 = 8;
    pub const TIMESLOT_MASK: u64 = (1 << 8) - 1;
    pub const DATA_OFFSET: u32 = 0;
    pub const DATA_MASK: u64 = (1 << 8) - 1;
}

/// Sync work frame (work type II): a 30-bit counter.
pub mod work2 {
    #![allow(missing_docs)]
    pub const TIME_OFFSET: u32 = 0;
    pub const TIME_MASK: u64 = (1 << 30) - 1;
}

/// Split an integer at bit `pos`, returning `(high, low)`.
pub const fn bin_split(x: u64, pos: u32) -> (u64, u64) {
    (x >> pos, x & ((1 << pos) - 1))
}

/// Header of a raw frame word.
///
/// # Errors
///
/// [`FrameError::UnknownHeader`] if the header bits are unassigned.
pub fn header_of(word: u64) -> Result<FrameHeader> {
    #[allow(clippy::cast_possible_truncation)]
    FrameHeader::from_bits(((word >> general::HEADER_OFFSET) & general::HEADER_MASK) as u8)
}

/// Validate that a raw frame array is non-empty and uniformly carries the
/// expected header.
///
/// # Errors
///
/// [`FrameError::HeaderMismatch`] when the first word's header differs from
/// `expected`, [`FrameError::MixedHeaders`] when the remaining words
/// disagree with the first.
pub fn header_check(frames: &[u64], expected: FrameHeader) -> Result<()> {
    let Some(first) = frames.first() else {
        return Err(FrameError::MixedHeaders);
    };

    let header0 = header_of(*first)?;
    if header0 != expected {
        return Err(FrameError::HeaderMismatch {
            expected,
            got: header0,
        });
    }

    for word in &frames[1..] {
        if header_of(*word)? != header0 {
            return Err(FrameError::MixedHeaders);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        for bits in 0u8..=0b1011 {
            let header = FrameHeader::from_bits(bits).unwrap();
            assert_eq!(header.bits(), u64::from(bits));
        }
        assert!(FrameHeader::from_bits(0b1100).is_err());
        assert!(FrameHeader::from_bits(0b1111).is_err());
    }

    #[test]
    fn header_classes() {
        assert_eq!(FrameHeader::ConfigType3.frame_type(), FrameType::Config);
        assert_eq!(FrameHeader::TestType1.frame_type(), FrameType::Test);
        assert_eq!(FrameHeader::WorkType4.frame_type(), FrameType::Work);
    }

    #[test]
    fn skeleton_fields_tile_the_word() {
        assert_eq!(general::HEADER_OFFSET + 4, 64);
        assert_eq!(general::CHIP_ADDR_OFFSET + 10, general::HEADER_OFFSET);
        assert_eq!(general::CORE_ADDR_OFFSET + 10, general::CHIP_ADDR_OFFSET);
        assert_eq!(general::RID_ADDR_OFFSET + 10, general::CORE_ADDR_OFFSET);
        assert_eq!(general::PAYLOAD_OFFSET + 30, general::RID_ADDR_OFFSET);
    }

    #[test]
    fn package_fields_tile_the_payload() {
        assert_eq!(package::SRAM_ADDR_OFFSET + 10, 30);
        assert_eq!(package::TYPE_OFFSET + 1, package::SRAM_ADDR_OFFSET);
        assert_eq!(package::NUM_OFFSET + 19, package::TYPE_OFFSET);
    }

    #[test]
    fn split_helper() {
        assert_eq!(bin_split(0b110_0001_001, 3), (0b1100001, 0b001));
        assert_eq!(bin_split(0x3FFF, 7), (0x7F, 0x7F));
    }

    #[test]
    fn header_check_rejects_mixtures() {
        let sync = FrameHeader::WorkType2.bits() << general::HEADER_OFFSET;
        let clear = FrameHeader::WorkType3.bits() << general::HEADER_OFFSET;

        assert!(header_check(&[sync, sync], FrameHeader::WorkType2).is_ok());
        assert!(matches!(
            header_check(&[sync], FrameHeader::WorkType3),
            Err(FrameError::HeaderMismatch { .. })
        ));
        assert!(matches!(
            header_check(&[sync, clear], FrameHeader::WorkType2),
            Err(FrameError::MixedHeaders)
        ));
        assert!(header_check(&[], FrameHeader::WorkType2).is_err());
    }
}
