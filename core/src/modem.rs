//! Capability traits every protocol mode implements.
//!
//! A mode supplies one transmitter (`Modulator`) and one streaming receiver
//! (`Demodulator`). Audio capture and playback stay outside: an adapter pushes
//! captured blocks into `process_audio` and plays whatever `modulate` returns.

use crate::receiver::Decoded;

/// Protocol modes known to this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolMode {
    /// Multi-parallel differential ASK
    Mpda,
}

impl ProtocolMode {
    pub fn name(self) -> &'static str {
        match self {
            ProtocolMode::Mpda => "MPDA",
        }
    }

    pub fn version(self) -> &'static str {
        match self {
            ProtocolMode::Mpda => "4.1.0",
        }
    }
}

pub trait Modulator {
    fn mode(&self) -> ProtocolMode;

    /// Render text as a complete on-air waveform. Empty text gives no samples.
    fn modulate(&self, text: &str) -> Vec<f32>;
}

pub trait Demodulator {
    fn mode(&self) -> ProtocolMode;

    /// Feed the next block of captured audio; returns at most one unit.
    fn process_audio(&mut self, chunk: &[f32]) -> Option<Decoded>;

    /// Next already-decoded unit, without consuming audio
    fn poll(&mut self) -> Option<Decoded>;

    /// Drop all in-flight state, keeping the configuration
    fn reset(&mut self);
}
