//! Typed core-register parameters (config/test frame type II).
//!
//! The validation layer above this crate hands over plain integers; here
//! they become a strongly-typed [`ParamsReg`] whose packing re-checks only
//! the bit-widths the wire format declares. Cross-field semantics (core
//! mode consistency and the like) stay upstream.
//!
//! Field definitions follow Section 2.4.1 of the V2.1 chip manual.

use paicore_chip::Coord;

use crate::error::{FrameError, Result};
use crate::format::{bin_split, reg};

/// Weight precision of the crossbar. 2 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum WeightWidth {
    /// 1-bit weights.
    Bit1 = 0,
    /// 2-bit weights.
    Bit2 = 1,
    /// 4-bit weights.
    Bit4 = 2,
    /// 8-bit weights (default).
    #[default]
    Bit8 = 3,
}

/// Fan-in extension scale (LCN). 4 bits.
///
/// `Lcn1x` means the base fan-in: 1152 per dendrite in SNN mode, 144 in
/// 8-bit ANN mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LcnExtension {
    /// 1× fan-in (default).
    #[default]
    Lcn1x = 0,
    /// 2× fan-in.
    Lcn2x = 1,
    /// 4× fan-in.
    Lcn4x = 2,
    /// 8× fan-in.
    Lcn8x = 3,
    /// 16× fan-in.
    Lcn16x = 4,
    /// 32× fan-in.
    Lcn32x = 5,
    /// 64× fan-in.
    Lcn64x = 6,
}

/// Input spike format. 1 bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InputWidth {
    /// 1-bit spikes (default).
    #[default]
    Bit1 = 0,
    /// 8-bit activations.
    Bit8 = 1,
}

/// Output spike format. 1 bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SpikeWidth {
    /// 1-bit spikes (default).
    #[default]
    Bit1 = 0,
    /// 8-bit activations.
    Bit8 = 1,
}

/// How many times each neuron's RAM block is written: with 1-bit input the
/// dendrite combination rate `2^(LCN + weight width)` copies are laid out
/// back to back, with 8-bit input a single copy.
pub fn package_repeat(input_width: InputWidth, lcn: LcnExtension, ww: WeightWidth) -> usize {
    match input_width {
        InputWidth::Bit1 => 1 << (lcn as u32 + ww as u32),
        InputWidth::Bit8 => 1,
    }
}

/// Core parameter register image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamsReg {
    /// Crossbar weight precision.
    pub weight_width: WeightWidth,
    /// Fan-in extension of this core.
    pub lcn: LcnExtension,
    /// Input spike format.
    pub input_width: InputWidth,
    /// Output spike format.
    pub spike_width: SpikeWidth,
    /// Number of valid dendrites. 13 bits.
    pub neuron_num: u16,
    /// Max-pooling enable (8-bit input only). 1 bit.
    pub pool_max: bool,
    /// Ticks to wait before the core starts. 15 bits, 0 = forever.
    pub tick_wait_start: u16,
    /// Ticks the core stays active. 15 bits, 0 = forever.
    pub tick_wait_end: u16,
    /// SNN mode enable. 1 bit.
    pub snn_en: bool,
    /// Fan-in extension of the downstream core.
    pub target_lcn: LcnExtension,
    /// Chip that receives test-output frames.
    pub test_chip_addr: Coord,
}

impl ParamsReg {
    /// Pack the register image across three 30-bit payload words.
    ///
    /// `tick_wait_start` splits at bit 7 across words 1–2 and
    /// `test_chip_addr` at bit 7 across words 2–3; both split points are
    /// part of the wire contract.
    ///
    /// # Errors
    ///
    /// [`FrameError::FieldOutOfRange`] when `neuron_num`,
    /// `tick_wait_start` or `tick_wait_end` exceed their declared widths.
    pub fn pack(&self) -> Result<[u64; 3]> {
        let neuron_num = check_width("neuron_num", u64::from(self.neuron_num), 13)?;
        let tws = check_width("tick_wait_start", u64::from(self.tick_wait_start), 15)?;
        let twe = check_width("tick_wait_end", u64::from(self.tick_wait_end), 15)?;

        let (tws_high8, tws_low7) = bin_split(tws, reg::TICK_WAIT_START_SPLIT);
        let (tca_high3, tca_low7) = bin_split(self.test_chip_addr.address(), reg::TEST_CHIP_ADDR_SPLIT);

        let word1 = ((self.weight_width as u64 & reg::WEIGHT_WIDTH_MASK) << reg::WEIGHT_WIDTH_OFFSET)
            | ((self.lcn as u64 & reg::LCN_MASK) << reg::LCN_OFFSET)
            | ((self.input_width as u64 & reg::INPUT_WIDTH_MASK) << reg::INPUT_WIDTH_OFFSET)
            | ((self.spike_width as u64 & reg::SPIKE_WIDTH_MASK) << reg::SPIKE_WIDTH_OFFSET)
            | ((neuron_num & reg::NEURON_NUM_MASK) << reg::NEURON_NUM_OFFSET)
            | ((u64::from(self.pool_max) & reg::POOL_MAX_MASK) << reg::POOL_MAX_OFFSET)
            | ((tws_high8 & reg::TICK_WAIT_START_HIGH8_MASK) << reg::TICK_WAIT_START_HIGH8_OFFSET);

        let word2 = ((tws_low7 & reg::TICK_WAIT_START_LOW7_MASK) << reg::TICK_WAIT_START_LOW7_OFFSET)
            | ((twe & reg::TICK_WAIT_END_MASK) << reg::TICK_WAIT_END_OFFSET)
            | ((u64::from(self.snn_en) & reg::SNN_EN_MASK) << reg::SNN_EN_OFFSET)
            | ((self.target_lcn as u64 & reg::TARGET_LCN_MASK) << reg::TARGET_LCN_OFFSET)
            | ((tca_high3 & reg::TEST_CHIP_ADDR_HIGH3_MASK) << reg::TEST_CHIP_ADDR_HIGH3_OFFSET);

        let word3 =
            (tca_low7 & reg::TEST_CHIP_ADDR_LOW7_MASK) << reg::TEST_CHIP_ADDR_LOW7_OFFSET;

        Ok([word1, word2, word3])
    }
}

/// Re-validate a declared bit-width, the only semantics this codec owns.
pub(crate) fn check_width(field: &'static str, value: u64, width: u32) -> Result<u64> {
    if value >> width != 0 {
        return Err(FrameError::FieldOutOfRange {
            field,
            value,
            width,
        });
    }

    Ok(value)
}
