//! Neuron RAM packing (config/test frame type III).
//!
//! Each neuron occupies four 64-bit package words, least significant word
//! first. Words 1–3 carry the membrane attributes and the destination
//! coordinates; word 4 carries the per-neuron axon address and relative
//! tick. Attribute values are masked to their field widths without
//! complaint so that negative two's-complement values land correctly;
//! addressing fields are hard-checked because truncating them would
//! silently reroute spikes.

use crate::error::{FrameError, Result};
use crate::format::{bin_split, ram};
use crate::reg::check_width;

/// Leak potential: one value for the whole block or one per neuron.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeakV {
    /// Broadcast to every neuron.
    Scalar(i64),
    /// One entry per neuron; length must equal the neuron count.
    PerNeuron(Vec<i64>),
}

/// Membrane and leak attributes of a neuron block.
///
/// Values arrive pre-validated from the layer above; signed fields are
/// stored two's complement and masked to their widths at pack time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeuronAttrs {
    /// Initial membrane potential. 30 bits, signed.
    pub vjt_pre: i64,
    /// Truncation bit count for 8-bit output. 5 bits.
    pub bit_truncate: u8,
    /// Weight deterministic/stochastic select. 1 bit.
    pub weight_det_stoch: u8,
    /// Leak potential. 30 bits, signed.
    pub leak_v: LeakV,
    /// Leak deterministic/stochastic select. 1 bit.
    pub leak_det_stoch: u8,
    /// Leak direction flag. 1 bit.
    pub leak_reversal_flag: u8,
    /// Positive threshold. 29 bits.
    pub threshold_pos: u64,
    /// Negative threshold. 29 bits.
    pub threshold_neg: u64,
    /// Negative threshold mode. 1 bit.
    pub threshold_neg_mode: u8,
    /// Threshold random mask bit count. 5 bits.
    pub threshold_mask_ctrl: u8,
    /// Leak order: after (1) or before (0) threshold comparison. 1 bit.
    pub leak_post: u8,
    /// Reset potential. 30 bits, signed.
    pub reset_v: i64,
    /// Reset mode. 2 bits.
    pub reset_mode: u8,
}

/// Destination routing of a neuron block. All neurons in a block share a
/// destination core; only the axon address and relative tick vary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeuronDestInfo {
    /// Destination chip X. 5 bits.
    pub addr_chip_x: u64,
    /// Destination chip Y. 5 bits.
    pub addr_chip_y: u64,
    /// Destination core X. 5 bits.
    pub addr_core_x: u64,
    /// Destination core Y. 5 bits.
    pub addr_core_y: u64,
    /// Replication id X. 5 bits.
    pub addr_core_x_ex: u64,
    /// Replication id Y. 5 bits.
    pub addr_core_y_ex: u64,
    /// Per-neuron destination timeslot. 8 bits each.
    pub tick_relative: Vec<u64>,
    /// Per-neuron destination axon. 11 bits each.
    pub addr_axon: Vec<u64>,
}

#[allow(clippy::cast_sign_loss)]
const fn mask_signed(value: i64, mask: u64) -> u64 {
    value as u64 & mask
}

fn words_1_2(attrs: &NeuronAttrs, leak_v: i64) -> (u64, u64) {
    let (leak_v_high2, leak_v_low28) = bin_split(mask_signed(leak_v, (1 << 30) - 1), ram::LEAK_V_SPLIT);
    let (_, tmc_low1) = bin_split(u64::from(attrs.threshold_mask_ctrl), ram::THRESHOLD_MASK_CTRL_SPLIT);

    let word1 = ((mask_signed(attrs.vjt_pre, ram::VJT_PRE_MASK)) << ram::VJT_PRE_OFFSET)
        | ((u64::from(attrs.bit_truncate) & ram::BIT_TRUNCATE_MASK) << ram::BIT_TRUNCATE_OFFSET)
        | ((u64::from(attrs.weight_det_stoch) & ram::WEIGHT_DET_STOCH_MASK)
            << ram::WEIGHT_DET_STOCH_OFFSET)
        | ((leak_v_low28 & ram::LEAK_V_LOW28_MASK) << ram::LEAK_V_LOW28_OFFSET);

    let word2 = ((leak_v_high2 & ram::LEAK_V_HIGH2_MASK) << ram::LEAK_V_HIGH2_OFFSET)
        | ((u64::from(attrs.leak_det_stoch) & ram::LEAK_DET_STOCH_MASK)
            << ram::LEAK_DET_STOCH_OFFSET)
        | ((u64::from(attrs.leak_reversal_flag) & ram::LEAK_REVERSAL_FLAG_MASK)
            << ram::LEAK_REVERSAL_FLAG_OFFSET)
        | ((attrs.threshold_pos & ram::THRESHOLD_POS_MASK) << ram::THRESHOLD_POS_OFFSET)
        | ((attrs.threshold_neg & ram::THRESHOLD_NEG_MASK) << ram::THRESHOLD_NEG_OFFSET)
        | ((u64::from(attrs.threshold_neg_mode) & ram::THRESHOLD_NEG_MODE_MASK)
            << ram::THRESHOLD_NEG_MODE_OFFSET)
        | ((tmc_low1 & ram::THRESHOLD_MASK_CTRL_LOW1_MASK) << ram::THRESHOLD_MASK_CTRL_LOW1_OFFSET);

    (word1, word2)
}

fn word_3(attrs: &NeuronAttrs, dest: &NeuronDestInfo) -> u64 {
    let (tmc_high4, _) = bin_split(u64::from(attrs.threshold_mask_ctrl), ram::THRESHOLD_MASK_CTRL_SPLIT);
    let (_, addr_core_x_low2) = bin_split(dest.addr_core_x, ram::ADDR_CORE_X_SPLIT);

    ((tmc_high4 & ram::THRESHOLD_MASK_CTRL_HIGH4_MASK) << ram::THRESHOLD_MASK_CTRL_HIGH4_OFFSET)
        | ((u64::from(attrs.leak_post) & ram::LEAK_POST_MASK) << ram::LEAK_POST_OFFSET)
        | ((mask_signed(attrs.reset_v, ram::RESET_V_MASK)) << ram::RESET_V_OFFSET)
        | ((u64::from(attrs.reset_mode) & ram::RESET_MODE_MASK) << ram::RESET_MODE_OFFSET)
        | ((dest.addr_chip_y & ram::ADDR_CHIP_Y_MASK) << ram::ADDR_CHIP_Y_OFFSET)
        | ((dest.addr_chip_x & ram::ADDR_CHIP_X_MASK) << ram::ADDR_CHIP_X_OFFSET)
        | ((dest.addr_core_y_ex & ram::ADDR_CORE_Y_EX_MASK) << ram::ADDR_CORE_Y_EX_OFFSET)
        | ((dest.addr_core_x_ex & ram::ADDR_CORE_X_EX_MASK) << ram::ADDR_CORE_X_EX_OFFSET)
        | ((dest.addr_core_y & ram::ADDR_CORE_Y_MASK) << ram::ADDR_CORE_Y_OFFSET)
        | ((addr_core_x_low2 & ram::ADDR_CORE_X_LOW2_MASK) << ram::ADDR_CORE_X_LOW2_OFFSET)
}

fn word_4(dest: &NeuronDestInfo, index: usize) -> Result<u64> {
    let (addr_core_x_high3, _) = bin_split(dest.addr_core_x, ram::ADDR_CORE_X_SPLIT);
    let axon = check_width("addr_axon", dest.addr_axon[index], 11)?;
    let tick = check_width("tick_relative", dest.tick_relative[index], 8)?;

    Ok(
        ((addr_core_x_high3 & ram::ADDR_CORE_X_HIGH3_MASK) << ram::ADDR_CORE_X_HIGH3_OFFSET)
            | ((axon & ram::ADDR_AXON_MASK) << ram::ADDR_AXON_OFFSET)
            | ((tick & ram::TICK_RELATIVE_MASK) << ram::TICK_RELATIVE_OFFSET),
    )
}

/// Pack a neuron block into its flattened package-word array.
///
/// Produces `4 * n_neuron * repeat` words: four words per neuron, each
/// word laid out `repeat` times back to back before the next.
///
/// # Errors
///
/// [`FrameError::LengthMismatch`] when `tick_relative` and `addr_axon`
/// differ in length, or when a per-neuron `leak_v` does not cover
/// `n_neuron` entries; [`FrameError::NeuronCount`] when `n_neuron` exceeds
/// the destination entries; [`FrameError::FieldOutOfRange`] on an axon
/// address or relative tick wider than its field.
pub fn neuron_ram_packages(
    attrs: &NeuronAttrs,
    dest: &NeuronDestInfo,
    n_neuron: usize,
    repeat: usize,
) -> Result<Vec<u64>> {
    if dest.tick_relative.len() != dest.addr_axon.len() {
        return Err(FrameError::LengthMismatch {
            what: "tick_relative/addr_axon",
            left: dest.tick_relative.len(),
            right: dest.addr_axon.len(),
        });
    }

    if n_neuron > dest.tick_relative.len() {
        return Err(FrameError::NeuronCount {
            n_neuron,
            n_dest: dest.tick_relative.len(),
        });
    }

    if let LeakV::PerNeuron(values) = &attrs.leak_v {
        if values.len() != n_neuron {
            return Err(FrameError::LengthMismatch {
                what: "leak_v/n_neuron",
                left: values.len(),
                right: n_neuron,
            });
        }
    }

    let word3 = word_3(attrs, dest);

    let mut packages = Vec::with_capacity(4 * n_neuron * repeat);
    for i in 0..n_neuron {
        let leak_v = match &attrs.leak_v {
            LeakV::Scalar(v) => *v,
            LeakV::PerNeuron(values) => values[i],
        };
        let (word1, word2) = words_1_2(attrs, leak_v);
        let word4 = word_4(dest, i)?;

        for word in [word1, word2, word3, word4] {
            packages.extend(std::iter::repeat(word).take(repeat));
        }
    }

    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> NeuronAttrs {
        NeuronAttrs {
            vjt_pre: 0,
            bit_truncate: 8,
            weight_det_stoch: 0,
            leak_v: LeakV::Scalar(-2),
            leak_det_stoch: 0,
            leak_reversal_flag: 0,
            threshold_pos: 100,
            threshold_neg: 100,
            threshold_neg_mode: 1,
            threshold_mask_ctrl: 0b10011,
            leak_post: 1,
            reset_v: -1,
            reset_mode: 0,
        }
    }

    fn dest(n: usize) -> NeuronDestInfo {
        NeuronDestInfo {
            addr_chip_x: 1,
            addr_chip_y: 0,
            addr_core_x: 0b10110,
            addr_core_y: 0b00111,
            addr_core_x_ex: 0,
            addr_core_y_ex: 0b00011,
            tick_relative: (0..n as u64).map(|i| i % 256).collect(),
            addr_axon: (0..n as u64).collect(),
        }
    }

    #[test]
    fn package_count_and_tiling() {
        let words = neuron_ram_packages(&attrs(), &dest(3), 3, 2).unwrap();
        assert_eq!(words.len(), 4 * 3 * 2);

        // Element-wise tiling: consecutive pairs are identical.
        for pair in words.chunks(2) {
            assert_eq!(pair[0], pair[1]);
        }

        // Words 1-3 broadcast across neurons with a scalar leak.
        assert_eq!(words[0], words[8]);
        assert_eq!(words[2], words[10]);
        assert_eq!(words[4], words[12]);
        // Word 4 differs per neuron.
        assert_ne!(words[6], words[14]);
    }

    #[test]
    fn negative_attrs_mask_to_field_width() {
        let words = neuron_ram_packages(&attrs(), &dest(1), 1, 1).unwrap();

        // leak_v = -2 → 30-bit two's complement, split 2 | 28.
        let low28 = (words[0] >> 36) & ((1 << 28) - 1);
        let high2 = words[1] & 0b11;
        assert_eq!((high2 << 28) | low28, (1 << 30) - 2);

        // reset_v = -1 fills its 30-bit field.
        assert_eq!((words[2] >> 5) & ((1 << 30) - 1), (1 << 30) - 1);
    }

    #[test]
    fn split_destination_core_x_recomposes() {
        let words = neuron_ram_packages(&attrs(), &dest(1), 1, 1).unwrap();

        let low2 = (words[2] >> 62) & 0b11;
        let high3 = words[3] & 0b111;
        assert_eq!((high3 << 2) | low2, 0b10110);
    }

    #[test]
    fn word4_layout() {
        let mut d = dest(1);
        d.addr_axon[0] = 0x5A5;
        d.tick_relative[0] = 0xC3;
        let words = neuron_ram_packages(&attrs(), &d, 1, 1).unwrap();

        assert_eq!((words[3] >> 3) & 0x7FF, 0x5A5);
        assert_eq!((words[3] >> 14) & 0xFF, 0xC3);
        // Word 4 occupies 22 bits.
        assert_eq!(words[3] >> 22, 0);
    }

    #[test]
    fn per_neuron_leak_varies_words_1_and_2() {
        let mut a = attrs();
        a.leak_v = LeakV::PerNeuron(vec![1, -7]);
        let words = neuron_ram_packages(&a, &dest(2), 2, 1).unwrap();

        assert_ne!(words[0], words[4]);
        assert_ne!(words[1], words[5]);
        assert_eq!(words[2], words[6]);
    }

    #[test]
    fn validation_failures() {
        let mut d = dest(2);
        d.addr_axon.pop();
        assert!(matches!(
            neuron_ram_packages(&attrs(), &d, 1, 1),
            Err(FrameError::LengthMismatch { .. })
        ));

        assert!(matches!(
            neuron_ram_packages(&attrs(), &dest(2), 3, 1),
            Err(FrameError::NeuronCount { .. })
        ));

        let mut a = attrs();
        a.leak_v = LeakV::PerNeuron(vec![0]);
        assert!(neuron_ram_packages(&a, &dest(2), 2, 1).is_err());

        let mut d = dest(1);
        d.addr_axon[0] = 1 << 11;
        assert!(matches!(
            neuron_ram_packages(&attrs(), &d, 1, 1),
            Err(FrameError::FieldOutOfRange {
                field: "addr_axon",
                ..
            })
        ));
    }
}
