//! End-to-end frame construction tests
//!
//! Build the full configuration and work sequence for a core the way a
//! compiler backend does, then check the emitted words against the wire
//! contract.

use paicore_chip::{Coord, ReplicationId};
use paicore_frame::{
    decode_word, header_check, offline, FrameHeader, InputWidth, LcnExtension, LeakV, NeuronAttrs,
    NeuronDestInfo, ParamsReg, SpikeWidth, WeightWidth,
};

fn dest_core() -> (Coord, Coord, ReplicationId) {
    (
        Coord::new(1, 0).unwrap(),
        Coord::new(6, 6).unwrap(),
        ReplicationId::new(0, 0).unwrap(),
    )
}

fn params() -> ParamsReg {
    ParamsReg {
        weight_width: WeightWidth::Bit1,
        lcn: LcnExtension::Lcn2x,
        input_width: InputWidth::Bit1,
        spike_width: SpikeWidth::Bit1,
        neuron_num: 256,
        pool_max: false,
        tick_wait_start: 1,
        tick_wait_end: 0,
        snn_en: true,
        target_lcn: LcnExtension::Lcn1x,
        test_chip_addr: Coord::new(0, 0).unwrap(),
    }
}

fn neuron_block(n: usize) -> (NeuronAttrs, NeuronDestInfo) {
    let attrs = NeuronAttrs {
        vjt_pre: 0,
        bit_truncate: 8,
        weight_det_stoch: 0,
        leak_v: LeakV::Scalar(-1),
        leak_det_stoch: 0,
        leak_reversal_flag: 0,
        threshold_pos: 127,
        threshold_neg: 127,
        threshold_neg_mode: 1,
        threshold_mask_ctrl: 0,
        leak_post: 1,
        reset_v: 0,
        reset_mode: 0,
    };
    let dest = NeuronDestInfo {
        addr_chip_x: 1,
        addr_chip_y: 0,
        addr_core_x: 7,
        addr_core_y: 8,
        addr_core_x_ex: 0,
        addr_core_y_ex: 0,
        tick_relative: vec![0; n],
        addr_axon: (0..n as u64).collect(),
    };
    (attrs, dest)
}

#[test]
fn full_config_sequence_for_one_core() {
    let (chip, core, rid) = dest_core();
    let params = params();
    let (attrs, dest) = neuron_block(8);

    let seed = offline::config_frame1(chip, core, rid, 0x0123_4567_89AB_CDEF);
    let reg = offline::config_frame2(chip, core, rid, &params).unwrap();
    let repeat =
        paicore_frame::package_repeat(params.input_width, params.lcn, params.weight_width);
    let neurons = offline::config_frame3(chip, core, rid, 0, 8, &attrs, &dest, repeat).unwrap();
    let weights = offline::config_frame4(chip, core, rid, 0, vec![0u64; 16]).unwrap();

    // Headers are uniform within each frame and increase across the
    // sequence.
    header_check(&seed.value(), FrameHeader::ConfigType1).unwrap();
    header_check(&reg.value(), FrameHeader::ConfigType2).unwrap();
    assert_eq!(
        decode_word(neurons.value()[0]).unwrap().header,
        FrameHeader::ConfigType3
    );
    assert_eq!(
        decode_word(weights.value()[0]).unwrap().header,
        FrameHeader::ConfigType4
    );

    // Word counts: 3 seed words, 3 register words, 1 + packages each.
    assert_eq!(seed.value().len(), 3);
    assert_eq!(reg.value().len(), 3);
    assert_eq!(neurons.value().len(), 1 + 4 * 8 * repeat);
    assert_eq!(weights.value().len(), 1 + 16);

    // Every word 0 addresses the same core.
    for word in [seed.value()[0], reg.value()[0], neurons.value()[0]] {
        let decoded = decode_word(word).unwrap();
        assert_eq!(decoded.chip_coord, chip);
        assert_eq!(decoded.core_coord, core);
    }
}

#[test]
fn package_count_matches_descriptor() {
    let (chip, core, rid) = dest_core();
    let (attrs, dest) = neuron_block(5);

    let pkg = offline::config_frame3(chip, core, rid, 12, 5, &attrs, &dest, 4).unwrap();
    let words = pkg.value();

    let payload = decode_word(words[0]).unwrap().payload;
    let declared = (payload & 0x7FFFF) as usize;
    assert_eq!(declared, 4 * 5 * 4);
    assert_eq!(declared, words.len() - 1);
    assert_eq!((payload >> 20) & 0x3FF, 12);
}

#[test]
fn test_request_and_response_pair_up() {
    let (chip, core, rid) = dest_core();
    let test_chip = Coord::new(2, 0).unwrap();

    let request = offline::test_in_frame3(chip, core, rid, 0, 160).unwrap();
    header_check(&request.value(), FrameHeader::TestType3).unwrap();
    // Requests carry the test-in package type.
    assert_eq!((decode_word(request.value()[0]).unwrap().payload >> 19) & 1, 1);

    let (attrs, dest) = neuron_block(4);
    let response = offline::test_out_frame3(test_chip, core, rid, 0, 4, &attrs, &dest, 1).unwrap();
    let word0 = decode_word(response.value()[0]).unwrap();
    // Responses go to the test chip and carry the output package type.
    assert_eq!(word0.chip_coord, test_chip);
    assert_eq!((word0.payload >> 19) & 1, 0);
}

#[test]
fn spike_batch_over_multicast_destination() {
    let chip = Coord::new(1, 0).unwrap();
    let core = Coord::new(4, 4).unwrap();
    let rid = ReplicationId::new(0, 3).unwrap();

    let axons: Vec<u64> = (0..64).collect();
    let timeslots = vec![0u64; 64];
    let dest = offline::concat_frame_dest(chip, core, rid, &axons, Some(&timeslots)).unwrap();

    let mut data = vec![0u8; 64];
    data[3] = 9;
    data[40] = 200;

    let spikes = offline::gen_frame_fast(&dest, &data).unwrap();
    assert_eq!(spikes.len(), 2);

    for word in &spikes {
        let decoded = decode_word(*word).unwrap();
        assert_eq!(decoded.header, FrameHeader::WorkType1);
        assert_eq!(decoded.rid, rid);
    }
    assert_eq!(spikes[0] & 0xFF, 9);
    assert_eq!((spikes[0] >> 16) & 0x7FF, 3);
    assert_eq!(spikes[1] & 0xFF, 200);
    assert_eq!((spikes[1] >> 16) & 0x7FF, 40);
}

#[test]
fn magic_init_sequence_is_well_formed() {
    let chip = Coord::new(0, 0).unwrap();
    let cores: Vec<Coord> = (0..4).map(|i| Coord::new(i, i).unwrap()).collect();

    let (part1, part2) = offline::magic_init_frames(chip, &cores, true);

    // Part one alternates seed word 0 and init frames.
    for pair in part1.chunks(2) {
        assert_eq!(decode_word(pair[0]).unwrap().header, FrameHeader::ConfigType1);
        assert_eq!(decode_word(pair[1]).unwrap().header, FrameHeader::WorkType4);
    }

    // Part two ends with one spike per core, in core order.
    let tail = &part2[part2.len() - cores.len()..];
    for (word, core) in tail.iter().zip(&cores) {
        let decoded = decode_word(*word).unwrap();
        assert_eq!(decoded.header, FrameHeader::WorkType1);
        assert_eq!(decoded.core_coord, *core);
    }
}
