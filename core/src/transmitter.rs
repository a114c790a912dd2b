use crate::composer::{compose, composed_len};
use crate::config::ModemConfig;
use crate::error::Result;
use crate::framing::{build_bits, frame_bit_len};
use crate::modem::{Modulator, ProtocolMode};
use crate::modulator::modulate;

/// Text → waveform encoder for one link configuration.
///
/// Pure and reentrant: the transmitter holds only its configuration, so one
/// instance can be shared across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transmitter {
    config: ModemConfig,
}

impl Transmitter {
    pub fn new(config: ModemConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    /// Serialized frame bits for `text`, padded for this track layout
    pub fn frame_bits(&self, text: &str) -> Vec<bool> {
        build_bits(text, self.config.track_count())
    }

    /// Encode text into the full on-air signal:
    /// pilot, gap, multi-track payload, gap, beep, normalized to 0.95 peak.
    pub fn generate(&self, text: &str) -> Vec<f32> {
        if text.is_empty() {
            return Vec::new();
        }

        let bits = self.frame_bits(text);
        let payload = modulate(&bits, &self.config);
        let signal = compose(payload, &self.config);

        log::debug!(
            "encoded {} chars as {} bits, {} samples ({:.2} s)",
            text.chars().count(),
            bits.len(),
            signal.len(),
            signal.len() as f32 / self.config.sample_rate() as f32
        );

        signal
    }

    /// Exact length `generate` would return, without rendering audio
    pub fn signal_samples(&self, text: &str) -> usize {
        let bits = frame_bit_len(text, self.config.track_count());
        if bits == 0 {
            return 0;
        }
        let blocks = bits / self.config.track_count();
        composed_len(blocks * self.config.block_samples(), &self.config)
    }

    pub fn signal_duration_secs(&self, text: &str) -> f32 {
        self.signal_samples(text) as f32 / self.config.sample_rate() as f32
    }
}

impl Modulator for Transmitter {
    fn mode(&self) -> ProtocolMode {
        ProtocolMode::Mpda
    }

    fn modulate(&self, text: &str) -> Vec<f32> {
        self.generate(text)
    }
}

/// One-shot encoder at the nominal sample rate.
///
/// Fails with a configuration error when `tracks` is not 1, 4 or 8.
pub fn generate_signal(text: &str, tracks: usize, speed: u32) -> Result<Vec<f32>> {
    let config = ModemConfig::new(tracks, speed)?;
    Ok(Transmitter::new(config).generate(text))
}
