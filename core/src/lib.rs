//! Acoustic text modem (MPDA: multi-parallel differential ASK)
//!
//! Text is framed into a bit stream, spread over 1, 4 or 8 parallel carrier
//! tracks and sent as two-level amplitude blocks between a 2200 Hz pilot tone
//! and a trailing beep. The receiver is an incrementally fed state machine
//! that locks onto the pilot, skips the guard gap and demodulates blocks by
//! correlating each half against per-carrier templates.

pub mod error;
pub mod charset;
pub mod config;
pub mod framing;
pub mod template;
pub mod modulator;
pub mod composer;
pub mod sample_buffer;
pub mod modem;
pub mod transmitter;
pub mod receiver;
pub mod pcm;

pub use config::{ModemConfig, TrackCount};
pub use error::{ModemError, Result};
pub use modem::{Demodulator, Modulator, ProtocolMode};
pub use receiver::{decode_all, Decoded, Receiver, ReceiverState};
pub use transmitter::{generate_signal, Transmitter};

// Timing
pub const SAMPLE_RATE: u32 = 44100;
pub const PILOT_DURATION_MS: u32 = 1000;
pub const GAP_DURATION_MS: u32 = 150;
pub const BEEP_DURATION_MS: u32 = 300;
pub const FADE_DURATION_MS: u32 = 5;

// Pilot and beep share one frequency
pub const PILOT_FREQ: f32 = 2200.0;
pub const PILOT_AMPLITUDE: f32 = 0.5;

// Output is scaled so the loudest sample sits here
pub const PEAK_LEVEL: f32 = 0.95;

// Framing markers, sent MSB first
pub const SYNC_BYTE: u8 = 0xAA;
pub const EOT_BYTE: u8 = 0xFF;
pub const SYNC_REPEAT: usize = 3;
pub const EOT_REPEAT: usize = 3;

// Envelope levels inside one bit block
pub const REFERENCE_LEVEL: f32 = 0.5;
pub const MARK_LEVEL: f32 = 1.0;
pub const SPACE_LEVEL: f32 = 0.1;

// Receiver thresholds
pub const PILOT_ACQUIRE_THRESHOLD: f32 = 0.1;
pub const PILOT_RELEASE_THRESHOLD: f32 = 0.05;
pub const MIN_CORRELATION_SAMPLES: usize = 10;

// Receiver buffer retention (seconds of audio)
pub const MAX_BUFFER_SECS: usize = 10;
pub const IDLE_RETAIN_SECS: usize = 5;
pub const DECODE_RETAIN_SECS: usize = 3;
