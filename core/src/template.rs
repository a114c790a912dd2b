use crate::config::ModemConfig;
use crate::{MIN_CORRELATION_SAMPLES, PILOT_FREQ};
use num_complex::{Complex, Complex32};
use std::f64::consts::PI;

/// Conjugated complex exponential at `frequency`, `cycle_len` samples long.
///
/// Correlating audio against it measures how strongly `frequency` is present,
/// independent of the tone's phase.
pub fn build_template(frequency: f32, cycle_len: usize, sample_rate: u32) -> Vec<Complex32> {
    let omega = 2.0 * PI * frequency as f64 / sample_rate as f64;
    (0..cycle_len)
        .map(|n| {
            let phase = omega * n as f64;
            Complex32::new(phase.cos() as f32, -phase.sin() as f32)
        })
        .collect()
}

/// Normalized correlation magnitude over the overlapping prefix of `chunk`
/// and `template`.
///
/// Windows shorter than [`MIN_CORRELATION_SAMPLES`] score 0 so a handful of
/// samples can never trigger detection.
pub fn score(chunk: &[f32], template: &[Complex32]) -> f32 {
    let n = chunk.len().min(template.len());
    if n < MIN_CORRELATION_SAMPLES {
        return 0.0;
    }

    let sum = chunk[..n]
        .iter()
        .zip(&template[..n])
        .fold(Complex::<f64>::new(0.0, 0.0), |acc, (&x, t)| {
            acc + Complex::new(x as f64 * t.re as f64, x as f64 * t.im as f64)
        });

    (sum.norm() / n as f64) as f32
}

/// Subtract the window mean in place (DC offset removal)
pub fn remove_dc(window: &mut [f32]) {
    if window.is_empty() {
        return;
    }
    let mean = window.iter().map(|&x| x as f64).sum::<f64>() / window.len() as f64;
    for sample in window.iter_mut() {
        *sample -= mean as f32;
    }
}

/// Pilot template plus one template per carrier, in track order.
///
/// Rebuilt whenever the track layout, speed or sample rate changes.
#[derive(Debug, Clone)]
pub struct TemplateBank {
    pilot: Vec<Complex32>,
    carriers: Vec<Vec<Complex32>>,
}

impl TemplateBank {
    pub fn new(config: &ModemConfig) -> Self {
        let cycle_len = config.cycle_samples();
        let sample_rate = config.sample_rate();

        Self {
            pilot: build_template(PILOT_FREQ, cycle_len, sample_rate),
            carriers: config
                .carrier_frequencies()
                .iter()
                .map(|&f| build_template(f, cycle_len, sample_rate))
                .collect(),
        }
    }

    pub fn pilot(&self) -> &[Complex32] {
        &self.pilot
    }

    pub fn carriers(&self) -> &[Vec<Complex32>] {
        &self.carriers
    }

    pub fn pilot_score(&self, window: &[f32]) -> f32 {
        score(window, &self.pilot)
    }
}
