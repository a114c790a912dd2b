//! Sample format helpers for adapters that move audio through 16-bit PCM
//! files or multi-channel capture devices.

/// Average interleaved frames down to one channel.
///
/// A trailing partial frame is ignored; `channels` of 0 or 1 returns the
/// input unchanged.
pub fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    let scale = 1.0 / channels as f32;
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}

/// Clamp to [-1, 1] and scale to signed 16-bit
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

pub fn i16_to_f32(sample: i16) -> f32 {
    sample as f32 / 32768.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereo_downmix() {
        let stereo = vec![0.2, 0.8, 0.4, 0.6]; // [L, R, L, R]
        let mono = downmix_to_mono(&stereo, 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.5).abs() < 0.001);
        assert!((mono[1] - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_downmix_drops_partial_frame() {
        let samples = vec![0.3, 0.3, 0.3, -0.6, 0.0, 0.0, 1.0];
        let mono = downmix_to_mono(&samples, 3);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!((mono[1] + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_mono_passthrough() {
        let samples = vec![0.1, -0.2, 0.3];
        assert_eq!(downmix_to_mono(&samples, 1), samples);
        assert_eq!(downmix_to_mono(&samples, 0), samples);
    }

    #[test]
    fn test_i16_conversion() {
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(f32_to_i16(1.0), 32767);
        assert_eq!(f32_to_i16(-1.0), -32767);
        // Out-of-range input is clamped instead of wrapping
        assert_eq!(f32_to_i16(3.5), 32767);
        assert_eq!(f32_to_i16(-7.0), -32767);

        assert_eq!(i16_to_f32(0), 0.0);
        assert_eq!(i16_to_f32(i16::MIN), -1.0);

        let x = 0.95f32;
        assert!((i16_to_f32(f32_to_i16(x)) - x).abs() < 1e-4);
    }
}
