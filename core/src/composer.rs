use crate::config::ModemConfig;
use crate::modulator::linear_ramp;
use crate::{PEAK_LEVEL, PILOT_AMPLITUDE, PILOT_FREQ};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fade {
    In,
    Out,
}

/// Multiply `len` samples starting at `start` by a linear 0→1 (In) or
/// 1→0 (Out) ramp. Clipped to the end of the buffer.
pub fn apply_fade(samples: &mut [f32], start: usize, len: usize, fade: Fade) {
    if start >= samples.len() {
        return;
    }
    let len = len.min(samples.len() - start);
    let mut ramp = vec![0.0f32; len];
    match fade {
        Fade::In => linear_ramp(&mut ramp, 0.0, 1.0),
        Fade::Out => linear_ramp(&mut ramp, 1.0, 0.0),
    }
    for (sample, &gain) in samples[start..start + len].iter_mut().zip(&ramp) {
        *sample *= gain;
    }
}

/// Fixed-amplitude sine burst
pub fn tone(frequency: f32, len: usize, amplitude: f32, sample_rate: u32) -> Vec<f32> {
    let omega = 2.0 * PI * frequency as f64 / sample_rate as f64;
    (0..len)
        .map(|n| amplitude * (omega * n as f64).sin() as f32)
        .collect()
}

/// Pilot tone announcing a transmission, faded out at its tail
pub fn pilot(config: &ModemConfig) -> Vec<f32> {
    let fade = config.fade_samples();
    let mut pilot = tone(PILOT_FREQ, config.pilot_samples(), PILOT_AMPLITUDE, config.sample_rate());
    let tail = pilot.len().saturating_sub(fade);
    apply_fade(&mut pilot, tail, fade, Fade::Out);
    pilot
}

/// Short closing beep, faded at both ends
pub fn beep(config: &ModemConfig) -> Vec<f32> {
    let fade = config.fade_samples();
    let mut beep = tone(PILOT_FREQ, config.beep_samples(), PILOT_AMPLITUDE, config.sample_rate());
    apply_fade(&mut beep, 0, fade, Fade::In);
    let tail = beep.len().saturating_sub(fade);
    apply_fade(&mut beep, tail, fade, Fade::Out);
    beep
}

/// Scale the whole signal so its loudest sample sits at [`PEAK_LEVEL`].
/// Silent input is left untouched.
pub fn normalize_peak(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |m, &x| m.max(x.abs()));
    if peak > 0.0 {
        let gain = PEAK_LEVEL / peak;
        for sample in samples.iter_mut() {
            *sample *= gain;
        }
    }
}

/// Assemble the on-air frame:
/// pilot → gap → payload → gap → beep, then peak-normalize.
///
/// The payload gets its own edge fades when it is at least two fades long.
pub fn compose(mut payload: Vec<f32>, config: &ModemConfig) -> Vec<f32> {
    let fade = config.fade_samples();
    if payload.len() >= 2 * fade {
        apply_fade(&mut payload, 0, fade, Fade::In);
        let tail = payload.len() - fade;
        apply_fade(&mut payload, tail, fade, Fade::Out);
    }

    let pilot = pilot(config);
    let beep = beep(config);
    let gap = config.gap_samples();

    let mut signal = Vec::with_capacity(pilot.len() + 2 * gap + payload.len() + beep.len());
    signal.extend_from_slice(&pilot);
    signal.resize(signal.len() + gap, 0.0);
    signal.extend_from_slice(&payload);
    signal.resize(signal.len() + gap, 0.0);
    signal.extend_from_slice(&beep);

    normalize_peak(&mut signal);
    signal
}

/// Length of the composed frame around a payload of `payload_len` samples
pub fn composed_len(payload_len: usize, config: &ModemConfig) -> usize {
    config.pilot_samples() + 2 * config.gap_samples() + payload_len + config.beep_samples()
}
