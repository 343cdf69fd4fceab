//! Constructors for the offline-core frame set.
//!
//! One free function per concrete frame: config types I–IV, test-in and
//! test-out types I–IV, work types I–IV, plus the bulk spike path and the
//! magic initialization sequence. Each returns a [`Frame`] or
//! [`FramePackage`] value; callers serialize with `.value()`.

use paicore_chip::{Coord, ReplicationId};

use crate::error::{FrameError, Result};
use crate::format::{general, package, work1, work2, FrameHeader};
use crate::frame::{common_prefix, Frame, FramePackage};
use crate::ram::{neuron_ram_packages, NeuronAttrs, NeuronDestInfo};
use crate::reg::{check_width, ParamsReg};

/// Package type flag inside the word-0 payload of a package frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
enum PackageType {
    /// Configuration write or test-frame output.
    ConfigOrTestOut = 0,
    /// Test-frame input (a read request).
    TestIn = 1,
}

fn package_payload(sram_base: u64, kind: PackageType, n_package: usize) -> Result<u64> {
    let sram_base = check_width("sram_base_addr", sram_base, 10)?;
    let n_package = check_width("n_package", n_package as u64, 19)?;

    Ok(((sram_base & package::SRAM_ADDR_MASK) << package::SRAM_ADDR_OFFSET)
        | (((kind as u64) & package::TYPE_MASK) << package::TYPE_OFFSET)
        | ((n_package & package::NUM_MASK) << package::NUM_OFFSET))
}

/// Split a random seed into the three 30-bit payload words of a type-I
/// frame: bits 63..34, 33..4, then the low nibble left-aligned in the
/// last word.
fn random_seed_payload(seed: u64) -> Vec<u64> {
    vec![
        (seed >> 34) & general::PAYLOAD_MASK,
        (seed >> 4) & general::PAYLOAD_MASK,
        (seed & 0xF) << 26,
    ]
}

/// Reassemble a random seed from the three wire words of a type-I frame.
pub fn decode_random_seed(words: &[u64; 3]) -> u64 {
    ((words[0] & general::PAYLOAD_MASK) << 34)
        | ((words[1] & general::PAYLOAD_MASK) << 4)
        | ((words[2] & general::PAYLOAD_MASK) >> 26)
}

/// Config frame type I: the core's random seed.
pub fn config_frame1(chip: Coord, core: Coord, rid: ReplicationId, seed: u64) -> Frame {
    Frame::new(
        FrameHeader::ConfigType1,
        chip,
        core,
        rid,
        random_seed_payload(seed),
    )
}

/// Config frame type II: the core parameter register.
///
/// # Errors
///
/// Propagates the width checks of [`ParamsReg::pack`].
pub fn config_frame2(
    chip: Coord,
    core: Coord,
    rid: ReplicationId,
    params: &ParamsReg,
) -> Result<Frame> {
    Ok(Frame::new(
        FrameHeader::ConfigType2,
        chip,
        core,
        rid,
        params.pack()?.to_vec(),
    ))
}

/// Config frame type III: a neuron RAM write.
///
/// # Errors
///
/// [`FrameError::FieldOutOfRange`] on the SRAM base or total package
/// count, plus everything [`neuron_ram_packages`] rejects.
#[allow(clippy::too_many_arguments)]
pub fn config_frame3(
    chip: Coord,
    core: Coord,
    rid: ReplicationId,
    sram_base: u64,
    n_neuron: usize,
    attrs: &NeuronAttrs,
    dest: &NeuronDestInfo,
    repeat: usize,
) -> Result<FramePackage> {
    let packages = neuron_ram_packages(attrs, dest, n_neuron, repeat)?;
    let payload = package_payload(sram_base, PackageType::ConfigOrTestOut, packages.len())?;

    Ok(FramePackage::new(
        FrameHeader::ConfigType3,
        chip,
        core,
        rid,
        payload,
        packages,
    ))
}

/// Config frame type IV: a weight RAM write. The package words arrive
/// pre-computed; only the descriptor fields are validated.
///
/// # Errors
///
/// [`FrameError::FieldOutOfRange`] on the SRAM base or package count.
pub fn config_frame4(
    chip: Coord,
    core: Coord,
    rid: ReplicationId,
    sram_base: u64,
    weight_ram: Vec<u64>,
) -> Result<FramePackage> {
    let payload = package_payload(sram_base, PackageType::ConfigOrTestOut, weight_ram.len())?;

    Ok(FramePackage::new(
        FrameHeader::ConfigType4,
        chip,
        core,
        rid,
        payload,
        weight_ram,
    ))
}

/// Test-in frame type I: request the random seed.
pub fn test_in_frame1(chip: Coord, core: Coord, rid: ReplicationId) -> Frame {
    Frame::new(FrameHeader::TestType1, chip, core, rid, vec![0])
}

/// Test-out frame type I: the random seed as reported by the core,
/// addressed to the configured test chip.
pub fn test_out_frame1(test_chip: Coord, core: Coord, rid: ReplicationId, seed: u64) -> Frame {
    Frame::new(
        FrameHeader::TestType1,
        test_chip,
        core,
        rid,
        random_seed_payload(seed),
    )
}

/// Test-in frame type II: request the parameter register.
pub fn test_in_frame2(chip: Coord, core: Coord, rid: ReplicationId) -> Frame {
    Frame::new(FrameHeader::TestType2, chip, core, rid, vec![0])
}

/// Test-out frame type II: the parameter register as reported by the core.
///
/// # Errors
///
/// Propagates the width checks of [`ParamsReg::pack`].
pub fn test_out_frame2(
    test_chip: Coord,
    core: Coord,
    rid: ReplicationId,
    params: &ParamsReg,
) -> Result<Frame> {
    Ok(Frame::new(
        FrameHeader::TestType2,
        test_chip,
        core,
        rid,
        params.pack()?.to_vec(),
    ))
}

/// Test-in frame type III: request `n_package` neuron RAM words starting
/// at `sram_base`.
///
/// # Errors
///
/// [`FrameError::FieldOutOfRange`] on the SRAM base or package count.
pub fn test_in_frame3(
    chip: Coord,
    core: Coord,
    rid: ReplicationId,
    sram_base: u64,
    n_package: usize,
) -> Result<Frame> {
    let payload = package_payload(sram_base, PackageType::TestIn, n_package)?;
    Ok(Frame::new(FrameHeader::TestType3, chip, core, rid, vec![payload]))
}

/// Test-out frame type III: neuron RAM content as reported by the core.
///
/// # Errors
///
/// Same as [`config_frame3`].
#[allow(clippy::too_many_arguments)]
pub fn test_out_frame3(
    test_chip: Coord,
    core: Coord,
    rid: ReplicationId,
    sram_base: u64,
    n_neuron: usize,
    attrs: &NeuronAttrs,
    dest: &NeuronDestInfo,
    repeat: usize,
) -> Result<FramePackage> {
    let packages = neuron_ram_packages(attrs, dest, n_neuron, repeat)?;
    let payload = package_payload(sram_base, PackageType::ConfigOrTestOut, packages.len())?;

    Ok(FramePackage::new(
        FrameHeader::TestType3,
        test_chip,
        core,
        rid,
        payload,
        packages,
    ))
}

/// Test-in frame type IV: request `n_package` weight RAM words starting
/// at `sram_base`.
///
/// # Errors
///
/// [`FrameError::FieldOutOfRange`] on the SRAM base or package count.
pub fn test_in_frame4(
    chip: Coord,
    core: Coord,
    rid: ReplicationId,
    sram_base: u64,
    n_package: usize,
) -> Result<Frame> {
    let payload = package_payload(sram_base, PackageType::TestIn, n_package)?;
    Ok(Frame::new(FrameHeader::TestType4, chip, core, rid, vec![payload]))
}

/// Test-out frame type IV: weight RAM content as reported by the core.
///
/// # Errors
///
/// [`FrameError::FieldOutOfRange`] on the SRAM base or package count.
pub fn test_out_frame4(
    test_chip: Coord,
    core: Coord,
    rid: ReplicationId,
    sram_base: u64,
    weight_ram: Vec<u64>,
) -> Result<FramePackage> {
    let payload = package_payload(sram_base, PackageType::ConfigOrTestOut, weight_ram.len())?;

    Ok(FramePackage::new(
        FrameHeader::TestType4,
        test_chip,
        core,
        rid,
        payload,
        weight_ram,
    ))
}

/// Work frame type I: one spike. `axon` and `timeslot` are addressing
/// fields, so exceeding their widths is an error rather than a
/// truncation.
///
/// # Errors
///
/// [`FrameError::FieldOutOfRange`] on an out-of-width axon or timeslot.
pub fn work_frame1(
    chip: Coord,
    core: Coord,
    rid: ReplicationId,
    timeslot: u64,
    axon: u64,
    data: u8,
) -> Result<Frame> {
    let axon = check_width("axon", axon, 11)?;
    let timeslot = check_width("timeslot", timeslot, 8)?;

    let payload = ((axon & work1::AXON_MASK) << work1::AXON_OFFSET)
        | ((timeslot & work1::TIMESLOT_MASK) << work1::TIMESLOT_OFFSET)
        | ((u64::from(data) & work1::DATA_MASK) << work1::DATA_OFFSET);

    Ok(Frame::new(
        FrameHeader::WorkType1,
        chip,
        core,
        rid,
        vec![payload],
    ))
}

/// Precompute complete spike words for a destination, leaving the data
/// byte zero. One word per `(axon, timeslot)` pair; the header and
/// address prefix is computed once and added to every word.
///
/// # Errors
///
/// [`FrameError::LengthMismatch`] when `timeslots` is given with a
/// different length than `axons`; [`FrameError::FieldOutOfRange`] on any
/// out-of-width axon or timeslot.
pub fn concat_frame_dest(
    chip: Coord,
    core: Coord,
    rid: ReplicationId,
    axons: &[u64],
    timeslots: Option<&[u64]>,
) -> Result<Vec<u64>> {
    if let Some(ts) = timeslots {
        if ts.len() != axons.len() {
            return Err(FrameError::LengthMismatch {
                what: "axons/timeslots",
                left: axons.len(),
                right: ts.len(),
            });
        }
    }

    let prefix = common_prefix(FrameHeader::WorkType1, chip, core, rid);

    let mut words = Vec::with_capacity(axons.len());
    for (i, &axon) in axons.iter().enumerate() {
        let axon = check_width("axon", axon, 11)?;
        let timeslot = check_width("timeslot", timeslots.map_or(0, |ts| ts[i]), 8)?;

        words.push(
            prefix
                + ((axon & work1::AXON_MASK) << work1::AXON_OFFSET)
                + ((timeslot & work1::TIMESLOT_MASK) << work1::TIMESLOT_OFFSET),
        );
    }

    Ok(words)
}

/// Sparse spike encoding over a precomputed destination array: events
/// with a zero data byte are dropped, every other word gets its data byte
/// added in place. The output therefore has one word per nonzero input.
///
/// # Errors
///
/// [`FrameError::LengthMismatch`] when `data` and `frame_dest` differ in
/// length.
pub fn gen_frame_fast(frame_dest: &[u64], data: &[u8]) -> Result<Vec<u64>> {
    if frame_dest.len() != data.len() {
        return Err(FrameError::LengthMismatch {
            what: "frame_dest/data",
            left: frame_dest.len(),
            right: data.len(),
        });
    }

    Ok(frame_dest
        .iter()
        .zip(data)
        .filter(|(_, &d)| d != 0)
        .map(|(&word, &d)| word + u64::from(d))
        .collect())
}

/// Work frame type II: sync. Addressed to core `(0, 0)` with no
/// replication; a counter wider than 30 bits is truncated with a warning
/// since it wraps on the chip anyway.
pub fn work_frame2(chip: Coord, n_sync: u64) -> Frame {
    let masked = n_sync & work2::TIME_MASK;
    if masked != n_sync {
        tracing::warn!(n_sync, masked, "sync counter truncated to 30 bits");
    }

    Frame::new(
        FrameHeader::WorkType2,
        chip,
        Coord::default(),
        ReplicationId::default(),
        vec![masked],
    )
}

/// Work frame type III: clear. Addressed to core `(0, 0)`.
pub fn work_frame3(chip: Coord) -> Frame {
    Frame::new(
        FrameHeader::WorkType3,
        chip,
        Coord::default(),
        ReplicationId::default(),
        vec![0],
    )
}

/// Work frame type IV: init. Addressed to core `(0, 0)`.
pub fn work_frame4(chip: Coord) -> Frame {
    Frame::new(
        FrameHeader::WorkType4,
        chip,
        Coord::default(),
        ReplicationId::default(),
        vec![0],
    )
}

/// The fixed power-on initialization sequence. Returns two word arrays to
/// send back to back.
///
/// Part one interleaves each core's first seed word with an init frame
/// when `redundant_init` is set (a single trailing init frame otherwise);
/// part two carries the remaining seed words of every core followed by
/// one zero spike per core. The exact ordering is what the silicon
/// expects; do not reorder.
pub fn magic_init_frames(
    chip: Coord,
    cores: &[Coord],
    redundant_init: bool,
) -> (Vec<u64>, Vec<u64>) {
    let rid = ReplicationId::default();
    let init_word = work_frame4(chip).value()[0];

    let mut part1 = Vec::new();
    let mut part2 = Vec::new();
    let mut spikes = Vec::with_capacity(cores.len());

    for &core in cores {
        let seed_words = config_frame1(chip, core, rid, 0).value();

        part1.push(seed_words[0]);
        if redundant_init {
            part1.push(init_word);
        }

        part2.extend_from_slice(&seed_words[1..]);
        spikes.push(common_prefix(FrameHeader::WorkType1, chip, core, rid));
    }

    if !redundant_init {
        part1.push(init_word);
    }

    part2.extend_from_slice(&spikes);

    (part1, part2)
}
