use crate::config::ModemConfig;
use crate::framing::split_tracks;
use crate::{MARK_LEVEL, REFERENCE_LEVEL, SPACE_LEVEL};
use std::f64::consts::PI;

// Multi-track differential ASK
//
// Every bit occupies one block of two half-cycles on its track:
//
//   | reference half (0.5)      | data half (1.0 or 0.1)      |
//   |/ 5 ms ramp from prev level|\ 5 ms ramp from 0.5         |
//
// The receiver compares data-half energy with reference-half energy of the
// same block, so slow gain changes along the channel cancel out.

/// Write `len` linearly spaced values from `from` to `to` (both inclusive)
pub(crate) fn linear_ramp(dest: &mut [f32], from: f32, to: f32) {
    let len = dest.len();
    match len {
        0 => {}
        1 => dest[0] = from,
        _ => {
            let step = (to - from) / (len - 1) as f32;
            for (i, value) in dest.iter_mut().enumerate() {
                *value = from + step * i as f32;
            }
            dest[len - 1] = to;
        }
    }
}

/// Amplitude envelope for one track: one reference + data block per bit.
pub fn track_envelope(bits: &[bool], cycle_samples: usize, fade_samples: usize) -> Vec<f32> {
    let total = bits.len() * 2 * cycle_samples;
    let mut envelope = vec![0.0f32; total];
    let mut current = 0.0f32;

    for (i, &bit) in bits.iter().enumerate() {
        let start = i * 2 * cycle_samples;
        let mid = start + cycle_samples;
        let end = mid + cycle_samples;

        envelope[start..mid].fill(REFERENCE_LEVEL);
        let fade_end = (start + fade_samples).min(mid);
        linear_ramp(&mut envelope[start..fade_end], current, REFERENCE_LEVEL);

        let target = if bit { MARK_LEVEL } else { SPACE_LEVEL };
        envelope[mid..end].fill(target);
        let fade_end = (mid + fade_samples).min(end);
        linear_ramp(&mut envelope[mid..fade_end], REFERENCE_LEVEL, target);

        current = target;
    }

    envelope
}

/// Continuous sine carrier starting at phase 0
pub fn carrier(frequency: f32, len: usize, sample_rate: u32) -> Vec<f32> {
    let omega = 2.0 * PI * frequency as f64 / sample_rate as f64;
    (0..len).map(|n| (omega * n as f64).sin() as f32).collect()
}

/// Map a serialized bit stream onto the configured carrier tracks and mix
/// them into one payload waveform.
///
/// The bit count must be a multiple of the track count (see
/// [`build_bits`](crate::framing::build_bits)); the sum is divided by the
/// track count so the mix stays within [-1, 1].
pub fn modulate(bits: &[bool], config: &ModemConfig) -> Vec<f32> {
    if bits.is_empty() {
        return Vec::new();
    }

    let track_count = config.track_count();
    let cycle_samples = config.cycle_samples();
    let fade_samples = config.fade_samples();
    let tracks = split_tracks(bits, track_count);
    let total = tracks[0].len() * 2 * cycle_samples;

    let mut mix = vec![0.0f32; total];
    for (track_bits, &frequency) in tracks.iter().zip(config.carrier_frequencies()) {
        let envelope = track_envelope(track_bits, cycle_samples, fade_samples);
        let tone = carrier(frequency, total, config.sample_rate());
        for ((out, &env), &c) in mix.iter_mut().zip(&envelope).zip(&tone) {
            *out += env * c;
        }
    }

    let scale = 1.0 / track_count as f32;
    for sample in mix.iter_mut() {
        *sample *= scale;
    }

    log::debug!(
        "modulated {} bits on {} tracks into {} samples",
        bits.len(),
        track_count,
        total
    );

    mix
}
