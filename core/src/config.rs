use crate::error::{ModemError, Result};
use crate::{
    BEEP_DURATION_MS, FADE_DURATION_MS, GAP_DURATION_MS, MIN_CORRELATION_SAMPLES,
    PILOT_DURATION_MS, SAMPLE_RATE,
};

/// Number of parallel carrier tracks. Each layout has its own carrier set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackCount {
    One,
    Four,
    Eight,
}

impl TrackCount {
    pub fn count(self) -> usize {
        match self {
            TrackCount::One => 1,
            TrackCount::Four => 4,
            TrackCount::Eight => 8,
        }
    }

    /// Carrier frequencies in track order (Hz)
    pub fn frequencies(self) -> &'static [f32] {
        match self {
            TrackCount::One => &[1500.0],
            TrackCount::Four => &[800.0, 1200.0, 1600.0, 2000.0],
            TrackCount::Eight => &[600.0, 800.0, 1000.0, 1200.0, 1400.0, 1600.0, 1800.0, 2000.0],
        }
    }
}

impl TryFrom<usize> for TrackCount {
    type Error = ModemError;

    fn try_from(tracks: usize) -> Result<Self> {
        match tracks {
            1 => Ok(TrackCount::One),
            4 => Ok(TrackCount::Four),
            8 => Ok(TrackCount::Eight),
            other => Err(ModemError::UnsupportedTrackCount(other)),
        }
    }
}

/// Link parameters both ends must agree on.
///
/// `sample_rate` is the rate of the audio actually produced or captured;
/// every sample count (cycle, gap, fades, templates) is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModemConfig {
    tracks: TrackCount,
    speed: u32,
    sample_rate: u32,
}

impl ModemConfig {
    /// Configuration at the nominal 44.1 kHz protocol rate
    pub fn new(tracks: usize, speed: u32) -> Result<Self> {
        Self::with_rate(TrackCount::try_from(tracks)?, speed, SAMPLE_RATE)
    }

    /// Same link parameters at a different audio sample rate
    pub fn with_sample_rate(self, sample_rate: u32) -> Result<Self> {
        Self::with_rate(self.tracks, self.speed, sample_rate)
    }

    fn with_rate(tracks: TrackCount, speed: u32, sample_rate: u32) -> Result<Self> {
        if speed == 0 {
            return Err(ModemError::InvalidConfig("speed must be positive".to_string()));
        }
        if sample_rate == 0 {
            return Err(ModemError::InvalidConfig("sample rate must be positive".to_string()));
        }
        if ((sample_rate / speed) as usize) < MIN_CORRELATION_SAMPLES {
            return Err(ModemError::InvalidConfig(format!(
                "speed {} is too fast for {} Hz audio",
                speed, sample_rate
            )));
        }
        Ok(Self { tracks, speed, sample_rate })
    }

    pub fn tracks(&self) -> TrackCount {
        self.tracks
    }

    pub fn track_count(&self) -> usize {
        self.tracks.count()
    }

    /// Symbol speed (bit cycles per second per track)
    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn carrier_frequencies(&self) -> &'static [f32] {
        self.tracks.frequencies()
    }

    /// Samples in one half of a bit block
    pub fn cycle_samples(&self) -> usize {
        (self.sample_rate / self.speed) as usize
    }

    /// Samples in one reference + data block
    pub fn block_samples(&self) -> usize {
        self.cycle_samples() * 2
    }

    pub fn pilot_samples(&self) -> usize {
        self.ms_to_samples(PILOT_DURATION_MS)
    }

    pub fn gap_samples(&self) -> usize {
        self.ms_to_samples(GAP_DURATION_MS)
    }

    pub fn beep_samples(&self) -> usize {
        self.ms_to_samples(BEEP_DURATION_MS)
    }

    pub fn fade_samples(&self) -> usize {
        self.ms_to_samples(FADE_DURATION_MS)
    }

    /// Data/reference correlation ratio above which a block reads as 1.
    /// The slowest speed has the cleanest halves and tolerates a stricter cut.
    pub fn threshold_ratio(&self) -> f32 {
        if self.speed == 5 {
            0.85
        } else {
            0.80
        }
    }

    /// Payload throughput in bits per second
    pub fn bit_rate(&self) -> f32 {
        self.track_count() as f32 * self.sample_rate as f32 / self.block_samples() as f32
    }

    pub fn seconds_to_samples(&self, secs: usize) -> usize {
        secs * self.sample_rate as usize
    }

    fn ms_to_samples(&self, ms: u32) -> usize {
        (self.sample_rate as u64 * ms as u64 / 1000) as usize
    }
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            tracks: TrackCount::Four,
            speed: 10,
            sample_rate: SAMPLE_RATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_count_conversion() {
        assert_eq!(TrackCount::try_from(1).unwrap(), TrackCount::One);
        assert_eq!(TrackCount::try_from(4).unwrap(), TrackCount::Four);
        assert_eq!(TrackCount::try_from(8).unwrap(), TrackCount::Eight);
        for bad in [0, 2, 3, 5, 16] {
            assert_eq!(
                TrackCount::try_from(bad),
                Err(ModemError::UnsupportedTrackCount(bad))
            );
        }
    }

    #[test]
    fn test_carrier_tables() {
        assert_eq!(TrackCount::One.frequencies(), &[1500.0]);
        assert_eq!(TrackCount::Four.frequencies(), &[800.0, 1200.0, 1600.0, 2000.0]);
        let eight = TrackCount::Eight.frequencies();
        assert_eq!(eight.len(), 8);
        for (i, &f) in eight.iter().enumerate() {
            assert_eq!(f, 600.0 + 200.0 * i as f32);
        }
        for tracks in [TrackCount::One, TrackCount::Four, TrackCount::Eight] {
            assert_eq!(tracks.frequencies().len(), tracks.count());
        }
    }

    #[test]
    fn test_derived_timing_at_nominal_rate() {
        let config = ModemConfig::new(4, 10).unwrap();
        assert_eq!(config.cycle_samples(), 4410);
        assert_eq!(config.block_samples(), 8820);
        assert_eq!(config.pilot_samples(), 44100);
        assert_eq!(config.gap_samples(), 6615);
        assert_eq!(config.beep_samples(), 13230);
        assert_eq!(config.fade_samples(), 220);
        assert!((config.bit_rate() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_threshold_ratio_by_speed() {
        assert_eq!(ModemConfig::new(1, 5).unwrap().threshold_ratio(), 0.85);
        assert_eq!(ModemConfig::new(1, 10).unwrap().threshold_ratio(), 0.80);
        assert_eq!(ModemConfig::new(1, 15).unwrap().threshold_ratio(), 0.80);
    }

    #[test]
    fn test_sample_rate_retargets_sample_counts() {
        let config = ModemConfig::new(8, 10).unwrap().with_sample_rate(48000).unwrap();
        assert_eq!(config.cycle_samples(), 4800);
        assert_eq!(config.gap_samples(), 7200);
        assert_eq!(config.fade_samples(), 240);
        assert_eq!(config.track_count(), 8);
    }

    #[test]
    fn test_invalid_speed_and_rate() {
        assert!(matches!(ModemConfig::new(4, 0), Err(ModemError::InvalidConfig(_))));
        assert!(matches!(ModemConfig::new(4, 10_000), Err(ModemError::InvalidConfig(_))));
        let config = ModemConfig::new(4, 10).unwrap();
        assert!(matches!(config.with_sample_rate(0), Err(ModemError::InvalidConfig(_))));
        assert!(ModemConfig::new(3, 10).unwrap_err().is_configuration_error());
    }
}
