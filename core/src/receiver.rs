use crate::charset::decode_code;
use crate::config::ModemConfig;
use crate::error::Result;
use crate::framing::bits_to_byte;
use crate::modem::{Demodulator, ProtocolMode};
use crate::sample_buffer::SampleBuffer;
use crate::template::{remove_dc, score, TemplateBank};
use crate::{
    DECODE_RETAIN_SECS, EOT_BYTE, IDLE_RETAIN_SECS, MAX_BUFFER_SECS, PILOT_ACQUIRE_THRESHOLD,
    PILOT_RELEASE_THRESHOLD, SYNC_BYTE,
};
use std::collections::VecDeque;
use std::fmt;

/// Where the receiver is within a transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    /// Scanning cycle-sized windows for the pilot tone
    SearchPilot,
    /// Pilot acquired; waiting for it to stop so the gap can be skipped
    WaitPilotEnd,
    /// Demodulating reference/data blocks into bits and characters
    Decode,
}

/// One unit of receiver output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Char(char),
    EndOfTransmission,
}

impl Decoded {
    pub fn as_char(self) -> Option<char> {
        match self {
            Decoded::Char(c) => Some(c),
            Decoded::EndOfTransmission => None,
        }
    }

    pub fn is_end(self) -> bool {
        self == Decoded::EndOfTransmission
    }
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decoded::Char(c) => write!(f, "{}", c),
            Decoded::EndOfTransmission => write!(f, "<EOT>"),
        }
    }
}

/// Streaming MPDA receiver.
///
/// Fed successive mono blocks from a single capture stream, in order. Each
/// call processes every complete window currently buffered and returns at
/// most one decoded unit; further units completed by the same audio wait in
/// a FIFO and come out of later calls, [`poll`](Self::poll) or
/// [`decoded`](Self::decoded). Not synchronized: serialize access if more
/// than one thread feeds it.
#[derive(Debug, Clone)]
pub struct Receiver {
    config: ModemConfig,
    templates: TemplateBank,
    state: ReceiverState,
    buffer: SampleBuffer,
    bits: VecDeque<bool>,
    sync_locked: bool,
    pending: VecDeque<Decoded>,
}

impl Receiver {
    /// Receiver at the nominal sample rate
    pub fn new(tracks: usize, speed: u32) -> Result<Self> {
        Ok(Self::with_config(ModemConfig::new(tracks, speed)?))
    }

    pub fn with_config(config: ModemConfig) -> Self {
        Self {
            config,
            templates: TemplateBank::new(&config),
            state: ReceiverState::SearchPilot,
            buffer: SampleBuffer::new(),
            bits: VecDeque::new(),
            sync_locked: false,
            pending: VecDeque::new(),
        }
    }

    /// Re-arm with a new track layout and speed, keeping the sample rate.
    /// Discards all in-flight state, exactly like a fresh receiver.
    pub fn configure(&mut self, tracks: usize, speed: u32) -> Result<()> {
        let config = ModemConfig::new(tracks, speed)?.with_sample_rate(self.config.sample_rate())?;
        self.reconfigure(config);
        Ok(())
    }

    pub fn reconfigure(&mut self, config: ModemConfig) {
        *self = Self::with_config(config);
    }

    /// Clear buffers and return to pilot search, keeping the configuration
    pub fn reset(&mut self) {
        self.state = ReceiverState::SearchPilot;
        self.buffer.clear();
        self.bits.clear();
        self.sync_locked = false;
        self.pending.clear();
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    pub fn state(&self) -> ReceiverState {
        self.state
    }

    pub fn is_sync_locked(&self) -> bool {
        self.sync_locked
    }

    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    pub fn queued_bits(&self) -> usize {
        self.bits.len()
    }

    /// Feed the next block of audio and return the next decoded unit, if any.
    ///
    /// An empty chunk only hands out units that are already decoded.
    pub fn process_audio(&mut self, chunk: &[f32]) -> Option<Decoded> {
        if !chunk.is_empty() {
            let slice_len = self.config.seconds_to_samples(1).max(1);
            for slice in chunk.chunks(slice_len) {
                self.buffer.extend(slice);
                self.enforce_retention();
                self.run();
            }
        }
        self.pending.pop_front()
    }

    /// Next unit decoded by earlier calls, without consuming audio
    pub fn poll(&mut self) -> Option<Decoded> {
        self.pending.pop_front()
    }

    /// Drain every unit decoded so far
    pub fn decoded(&mut self) -> impl Iterator<Item = Decoded> + '_ {
        std::iter::from_fn(move || self.poll())
    }

    fn enforce_retention(&mut self) {
        let limit = self.config.seconds_to_samples(MAX_BUFFER_SECS);
        let retain_secs = match self.state {
            ReceiverState::Decode => DECODE_RETAIN_SECS,
            _ => IDLE_RETAIN_SECS,
        };
        let dropped = self
            .buffer
            .trim(limit, self.config.seconds_to_samples(retain_secs));
        if dropped > 0 {
            log::debug!("receiver buffer over limit, dropped {} samples", dropped);
        }
    }

    /// Step the state machine until it needs more audio
    fn run(&mut self) {
        loop {
            let advanced = match self.state {
                ReceiverState::SearchPilot => self.search_pilot(),
                ReceiverState::WaitPilotEnd => self.wait_pilot_end(),
                ReceiverState::Decode => self.decode_blocks(),
            };
            if !advanced {
                break;
            }
        }
    }

    fn pilot_window_score(&self) -> Option<f32> {
        let mut window = self.buffer.window(0, self.config.cycle_samples())?;
        remove_dc(&mut window);
        Some(self.templates.pilot_score(&window))
    }

    fn search_pilot(&mut self) -> bool {
        let cycle = self.config.cycle_samples();
        while let Some(pilot) = self.pilot_window_score() {
            self.buffer.consume(cycle);
            if pilot > PILOT_ACQUIRE_THRESHOLD {
                log::debug!("pilot acquired (score {:.3})", pilot);
                self.state = ReceiverState::WaitPilotEnd;
                return true;
            }
        }
        false
    }

    fn wait_pilot_end(&mut self) -> bool {
        let cycle = self.config.cycle_samples();
        let gap = self.config.gap_samples();
        while let Some(pilot) = self.pilot_window_score() {
            if pilot >= PILOT_RELEASE_THRESHOLD {
                self.buffer.consume(cycle);
                continue;
            }

            // Pilot is gone: the gap has started. Only skip it once the
            // whole gap plus one cycle is buffered, so partial delivery
            // cannot shift the block grid.
            if self.buffer.len() < gap + cycle {
                return false;
            }
            self.buffer.consume(gap);
            self.sync_locked = false;
            self.bits.clear();
            self.state = ReceiverState::Decode;
            log::debug!("pilot ended, skipped {} gap samples, decoding", gap);
            return true;
        }
        false
    }

    fn decode_blocks(&mut self) -> bool {
        let cycle = self.config.cycle_samples();
        let block = self.config.block_samples();
        let ratio = self.config.threshold_ratio();

        while let Some(mut window) = self.buffer.window(0, block) {
            self.buffer.consume(block);
            let (reference, data) = window.split_at_mut(cycle);
            remove_dc(reference);
            remove_dc(data);

            for template in self.templates.carriers() {
                let reference_score = score(reference, template);
                let data_score = score(data, template);
                let bit = data_score > reference_score * ratio;
                log::trace!(
                    "ref {:.4} data {:.4} -> {}",
                    reference_score,
                    data_score,
                    bit as u8
                );
                self.bits.push_back(bit);
            }

            if self.drain_bits() {
                return true;
            }
        }
        false
    }

    fn front_byte(&self) -> u8 {
        bits_to_byte(self.bits.iter())
    }

    /// Turn queued bits into output. Returns true once EOT ends the frame.
    fn drain_bits(&mut self) -> bool {
        if !self.sync_locked {
            // Slide one bit at a time until the SYNC byte lines up
            while self.bits.len() >= 8 {
                if self.front_byte() == SYNC_BYTE {
                    self.bits.drain(..8);
                    self.sync_locked = true;
                    log::debug!("sync locked");
                    break;
                }
                self.bits.pop_front();
            }
        }

        if self.sync_locked {
            while self.bits.len() >= 8 {
                let byte = self.front_byte();
                self.bits.drain(..8);

                if byte == EOT_BYTE {
                    self.state = ReceiverState::SearchPilot;
                    self.sync_locked = false;
                    self.pending.push_back(Decoded::EndOfTransmission);
                    log::debug!("end of transmission");
                    return true;
                }

                match decode_code(byte) {
                    Some(c) => self.pending.push_back(Decoded::Char(c)),
                    None => log::trace!("dropping unmapped byte 0x{:02X}", byte),
                }
            }
        }

        false
    }
}

impl Demodulator for Receiver {
    fn mode(&self) -> ProtocolMode {
        ProtocolMode::Mpda
    }

    fn process_audio(&mut self, chunk: &[f32]) -> Option<Decoded> {
        Receiver::process_audio(self, chunk)
    }

    fn poll(&mut self) -> Option<Decoded> {
        Receiver::poll(self)
    }

    fn reset(&mut self) {
        Receiver::reset(self)
    }
}

/// Stream `samples` through a fresh receiver in `chunk_size` blocks and
/// collect every decoded unit.
pub fn decode_all(samples: &[f32], chunk_size: usize, config: ModemConfig) -> Vec<Decoded> {
    let mut receiver = Receiver::with_config(config);
    let mut output = Vec::new();
    for chunk in samples.chunks(chunk_size.max(1)) {
        output.extend(receiver.process_audio(chunk));
        output.extend(receiver.decoded());
    }
    output
}
