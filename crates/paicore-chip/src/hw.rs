//! Hardware parameters of PAICORE 2.0.
//!
//! Everything the rest of the stack needs to know about the chip geometry,
//! expressed as compile-time constants: grid bit-widths, the carry-axis
//! priority, routing tree shape and per-mode capacity limits.
//!
//! Values follow Section 2 of the V2.1 chip manual.

/// Axis priority of the coordinate carry arithmetic.
///
/// When `true` (the production configuration), X is the fast axis: an X
/// over/underflow wraps through the X range and carries ±1 into Y, and Y is
/// the axis checked against its bound. When `false` the roles are mirrored.
/// Swapping this changes which otherwise-symmetric inputs are rejected, so
/// it must match the silicon.
pub const COORD_Y_PRIORITY: bool = true;

/// Maximum number of chips in a system.
pub const N_CHIP_MAX: usize = 1024;

/// Chip grid bounds (single-chip configuration).
pub const CHIP_X_MIN: u16 = 0;
pub const CHIP_X_MAX: u16 = 0;
pub const CHIP_Y_MIN: u16 = 0;
pub const CHIP_Y_MAX: u16 = 0;

/// Bits per core coordinate axis.
pub const N_BIT_CORE_X: u32 = 5;
pub const N_BIT_CORE_Y: u32 = 5;

/// Core grid bounds, derived from the axis bit-widths.
pub const CORE_X_MIN: u16 = 0;
pub const CORE_X_MAX: u16 = (1 << N_BIT_CORE_X) - 1;
pub const CORE_Y_MIN: u16 = 0;
pub const CORE_Y_MAX: u16 = (1 << N_BIT_CORE_Y) - 1;

/// Cores per chip.
pub const N_CORE_MAX_INCHIP: usize = 1024;
/// Offline (non-learning) cores per chip.
pub const N_CORE_OFFLINE: usize = 1008;
/// Online cores per chip.
pub const N_CORE_ONLINE: usize = N_CORE_MAX_INCHIP - N_CORE_OFFLINE;

/// The online cores occupy the top-right 4×4 corner of the grid.
pub const CORE_X_ONLINE_MIN: u16 = 0b11100; // 28
pub const CORE_Y_ONLINE_MIN: u16 = 0b11100; // 28

/// Fan-in per dendrite.
pub const N_FANIN_PER_DENDRITE_MAX: usize = 1152;
/// Fan-in per dendrite in SNN mode.
pub const N_FANIN_PER_DENDRITE_SNN: usize = N_FANIN_PER_DENDRITE_MAX;
/// Fan-in per dendrite in ANN (8-bit) mode.
pub const N_FANIN_PER_DENDRITE_ANN: usize = 144;

/// Maximum dendrites in one core, per mode.
pub const N_DENDRITE_MAX_SNN: usize = 512;
pub const N_DENDRITE_MAX_ANN: usize = 4096;

/// Maximum neurons in one core, per mode.
pub const N_NEURON_MAX_SNN: usize = 512;
pub const N_NEURON_MAX_ANN: usize = 1888;

/// Maximum neuron RAM address (from 0).
pub const ADDR_RAM_MAX: usize = N_NEURON_MAX_SNN - 1;

/// Maximum axon address (from 0).
pub const ADDR_AXON_MAX: usize = N_FANIN_PER_DENDRITE_MAX - 1;

/// Timeslots per synchronization window.
pub const N_TIMESLOT_MAX: usize = 256;

/// Depth of the multicast routing tree.
pub const N_ROUTING_PATH_LENGTH_MAX: usize = 5;
/// Children per routing node (quad-tree).
pub const N_SUB_ROUTING_NODE: usize = 4;

/// Fan-out of a core with 8-bit input width, indexed by the dendrite
/// combination rate (LCN + weight width).
pub const FANOUT_IW8: [usize; 10] = [N_NEURON_MAX_ANN, 1364, 876, 512, 256, 128, 64, 32, 16, 8];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_bounds_match_bit_widths() {
        assert_eq!(CORE_X_MAX, 31);
        assert_eq!(CORE_Y_MAX, 31);
        assert_eq!(
            usize::from(CORE_X_MAX + 1) * usize::from(CORE_Y_MAX + 1),
            N_CORE_MAX_INCHIP
        );
    }

    #[test]
    fn online_window_is_4x4() {
        let w = usize::from(CORE_X_MAX - CORE_X_ONLINE_MIN + 1);
        let h = usize::from(CORE_Y_MAX - CORE_Y_ONLINE_MIN + 1);
        assert_eq!(w * h, N_CORE_ONLINE);
    }

    #[test]
    fn routing_tree_covers_the_chip() {
        assert_eq!(
            N_SUB_ROUTING_NODE.pow(N_ROUTING_PATH_LENGTH_MAX as u32),
            N_CORE_MAX_INCHIP
        );
    }
}
