// End-to-end tests: text -> waveform -> streaming receiver -> text.
//
// Long signals at speed 5 take a few seconds in debug builds; run with
// --release when iterating:
//   cargo test -p mpda-core --test integration_test --release

use mpda_core::charset::CHAR_SET;
use mpda_core::composer::compose;
use mpda_core::framing::build_bits;
use mpda_core::modulator::modulate;
use mpda_core::{
    decode_all, generate_signal, Decoded, Demodulator, ModemConfig, ModemError, Modulator,
    ProtocolMode, Receiver, ReceiverState, Transmitter, PEAK_LEVEL,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Decoded characters, plus whether the stream ended with the EOT marker
fn split_output(units: &[Decoded]) -> (String, bool) {
    let text = units.iter().filter_map(|u| u.as_char()).collect();
    let ended = units.last().map_or(false, |u| u.is_end());
    (text, ended)
}

fn round_trip(text: &str, tracks: usize, speed: u32, chunk_size: usize) -> Vec<Decoded> {
    let config = ModemConfig::new(tracks, speed).expect("valid config");
    let samples = Transmitter::new(config).generate(text);
    decode_all(&samples, chunk_size, config)
}

#[test]
fn test_round_trip_all_layouts_and_speeds() {
    init_logger();
    for tracks in [1, 4, 8] {
        for speed in [5, 10, 15] {
            let units = round_trip("Hi!", tracks, speed, 4096);
            let (text, ended) = split_output(&units);
            assert_eq!(text, "Hi!", "tracks={} speed={}", tracks, speed);
            assert!(ended, "missing EOT for tracks={} speed={}", tracks, speed);
            // Exactly one marker per transmission
            assert_eq!(units.iter().filter(|u| u.is_end()).count(), 1);
        }
    }
}

#[test]
fn test_full_alphabet_round_trip() {
    let units = round_trip(CHAR_SET, 8, 15, 4096);
    let (text, ended) = split_output(&units);
    assert_eq!(text, CHAR_SET);
    assert!(ended);
}

#[test]
fn test_chunk_size_does_not_change_output() {
    let config = ModemConfig::new(8, 15).unwrap();
    let samples = Transmitter::new(config).generate("Hi!");

    let reference = decode_all(&samples, samples.len(), config);
    assert_eq!(split_output(&reference), ("Hi!".to_string(), true));

    for chunk_size in [1, 100, 4096] {
        let units = decode_all(&samples, chunk_size, config);
        assert_eq!(units, reference, "chunk size {}", chunk_size);
    }
}

#[test]
fn test_single_large_chunk() {
    // Whole slow single-track transmission (~20 s) in one call
    let config = ModemConfig::new(1, 5).unwrap();
    let samples = Transmitter::new(config).generate("Hi!");
    assert!(samples.len() > 10 * config.sample_rate() as usize);

    let mut rx = Receiver::with_config(config);
    let first = rx.process_audio(&samples);
    assert_eq!(first, Some(Decoded::Char('H')));

    let rest: Vec<Decoded> = rx.decoded().collect();
    assert_eq!(
        rest,
        vec![
            Decoded::Char('i'),
            Decoded::Char('!'),
            Decoded::EndOfTransmission
        ]
    );
    assert_eq!(rx.state(), ReceiverState::SearchPilot);
}

#[test]
fn test_one_unit_per_call() {
    let config = ModemConfig::new(4, 10).unwrap();
    let samples = Transmitter::new(config).generate("abc");

    let mut rx = Receiver::with_config(config);
    let mut units = Vec::new();
    for chunk in samples.chunks(samples.len() / 2 + 1) {
        units.extend(rx.process_audio(chunk));
    }
    // The rest is queued, not lost
    while let Some(unit) = rx.process_audio(&[]) {
        units.push(unit);
    }
    assert_eq!(split_output(&units), ("abc".to_string(), true));
    assert_eq!(rx.poll(), None);
}

#[test]
fn test_unmapped_characters_decode_as_placeholder() {
    let units = round_trip("a~b", 4, 10, 4096);
    assert_eq!(split_output(&units), ("a b".to_string(), true));
}

#[test]
fn test_empty_text() {
    let config = ModemConfig::default();
    let samples = Transmitter::new(config).generate("");
    assert!(samples.is_empty());
    assert!(decode_all(&samples, 1024, config).is_empty());
}

#[test]
fn test_amplitude_bound() {
    for (tracks, speed) in [(1, 10), (4, 15), (8, 5)] {
        let samples = generate_signal("Level check 123", tracks, speed).unwrap();
        let peak = samples.iter().fold(0.0f32, |m, &x| m.max(x.abs()));
        assert!(peak <= PEAK_LEVEL + 1e-5, "peak {}", peak);
        assert!(peak > PEAK_LEVEL - 1e-3, "peak {}", peak);
    }
}

#[test]
fn test_unsupported_track_count_is_configuration_error() {
    let err = generate_signal("hello", 3, 10).unwrap_err();
    assert_eq!(err, ModemError::UnsupportedTrackCount(3));
    assert!(err.is_configuration_error());
    assert!(Receiver::new(2, 10).is_err());
}

#[test]
fn test_noise_only_produces_nothing() {
    let mut rng = StdRng::seed_from_u64(1234);
    let config = ModemConfig::new(4, 10).unwrap();
    let noise: Vec<f32> = (0..3 * config.sample_rate())
        .map(|_| rng.gen_range(-0.05..0.05))
        .collect();

    let mut rx = Receiver::with_config(config);
    let mut units = Vec::new();
    for chunk in noise.chunks(2048) {
        units.extend(rx.process_audio(chunk));
    }
    assert!(units.is_empty());
    assert_eq!(rx.state(), ReceiverState::SearchPilot);
}

#[test]
fn test_bit_error_in_low_bit_corrupts_one_character() {
    let config = ModemConfig::new(4, 15).unwrap();
    let mut bits = build_bits("HELLO WORLD", 4);
    // LSB of the third character: 'L' (code 12) becomes 'M' (code 13)
    bits[24 + 8 * 2 + 7] ^= true;
    let samples = compose(modulate(&bits, &config), &config);

    let units = decode_all(&samples, 4096, config);
    assert_eq!(split_output(&units), ("HEMLO WORLD".to_string(), true));
}

#[test]
fn test_bit_error_in_high_bit_drops_one_character() {
    let config = ModemConfig::new(4, 15).unwrap();
    let mut bits = build_bits("HELLO WORLD", 4);
    // MSB of the fifth character pushes its code out of the table
    bits[24 + 8 * 4] ^= true;
    let samples = compose(modulate(&bits, &config), &config);

    let units = decode_all(&samples, 4096, config);
    assert_eq!(split_output(&units), ("HELL WORLD".to_string(), true));
}

#[test]
fn test_leading_silence_noise_and_dc_offset() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(7);
    let normal = Normal::new(0.0f32, 0.02).unwrap();
    let config = ModemConfig::new(8, 10).unwrap();

    let mut samples = vec![0.0f32; 3 * config.cycle_samples()];
    samples.extend(Transmitter::new(config).generate("Noise test"));
    samples.extend(vec![0.0f32; 1000]);
    for sample in samples.iter_mut() {
        *sample += 0.2 + normal.sample(&mut rng);
    }

    let units = decode_all(&samples, 1024, config);
    assert_eq!(split_output(&units), ("Noise test".to_string(), true));
}

#[test]
fn test_non_nominal_sample_rate() {
    let config = ModemConfig::new(4, 10)
        .unwrap()
        .with_sample_rate(48_000)
        .unwrap();
    assert_eq!(config.cycle_samples(), 4800);

    let samples = Transmitter::new(config).generate("48k");
    let units = decode_all(&samples, 4096, config);
    assert_eq!(split_output(&units), ("48k".to_string(), true));
}

#[test]
fn test_reset_between_transmissions() {
    let config = ModemConfig::new(8, 15).unwrap();
    let tx = Transmitter::new(config);
    let mut rx = Receiver::with_config(config);

    for text in ["AB", "CD"] {
        let samples = tx.generate(text);
        let mut units = Vec::new();
        for chunk in samples.chunks(4096) {
            units.extend(rx.process_audio(chunk));
            units.extend(rx.decoded());
        }
        assert_eq!(split_output(&units), (text.to_string(), true));
        rx.reset();
    }
}

#[test]
fn test_trait_objects() {
    let config = ModemConfig::new(4, 15).unwrap();
    let modulator: Box<dyn Modulator> = Box::new(Transmitter::new(config));
    let mut demodulator: Box<dyn Demodulator> = Box::new(Receiver::with_config(config));
    assert_eq!(modulator.mode(), ProtocolMode::Mpda);
    assert_eq!(demodulator.mode().name(), "MPDA");

    let samples = modulator.modulate("dyn");
    let mut units = Vec::new();
    for chunk in samples.chunks(4096) {
        units.extend(demodulator.process_audio(chunk));
        while let Some(unit) = demodulator.poll() {
            units.push(unit);
        }
    }
    assert_eq!(split_output(&units), ("dyn".to_string(), true));

    demodulator.reset();
    assert_eq!(demodulator.poll(), None);
}
