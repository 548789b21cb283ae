//! Noise-shaped dither for bit-depth reduction
//!
//! Dropping the low bits of a sample by plain truncation produces
//! quantization distortion correlated with the signal. [`PcmDither`] adds a
//! small amount of pseudo-random noise before rounding and feeds the
//! quantization error of the last three samples back into the next one,
//! which pushes the remaining noise towards higher frequencies.
//!
//! The filter runs over the flat sample stream. When interleaved channels
//! go through one instance they share one error history; this matches the
//! established sound of the playback chain and is kept on purpose.
//!
//! # Example
//!
//! ```rust
//! use soul_pcm::PcmDither;
//!
//! let mut dither = PcmDither::new();
//! let src: Vec<i32> = vec![0x12_3456, -0x12_3456, 0x7f_ffff];
//! let mut dest = vec![0i16; src.len()];
//!
//! dither.dither_24_to_16(&mut dest, &src);
//! assert_eq!(dest[2], i16::MAX);
//! ```

use crate::format::{IntegerTraits, S16, S24P32, S32};

/// One step of the linear congruential generator that drives the noise
#[inline(always)]
fn prng(state: u32) -> u32 {
    state.wrapping_mul(0x0019_660D).wrapping_add(0x3C6E_F35F)
}

/// Stateful noise-shaping quantizer
///
/// State is three error-history slots and one generator word. It carries
/// over between calls, so feeding one stream through in several blocks
/// gives the same output as feeding it in one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PcmDither {
    error: [i32; 3],
    random: u32,
}

impl PcmDither {
    /// Create a dither unit with a cold (all-zero) filter
    pub const fn new() -> Self {
        Self {
            error: [0; 3],
            random: 0,
        }
    }

    /// Zero the error history and the generator, e.g. on stream restart
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Quantize `sample` (range `min..=max`) to a multiple of `2^scale_bits`
    ///
    /// The result is still in source units; the caller shifts it down.
    #[inline]
    fn dither(&mut self, sample: i64, min: i64, max: i64, scale_bits: u32) -> i64 {
        let round = 1i64 << (scale_bits - 1);
        let mask = (1i64 << scale_bits) - 1;

        let mut sample = sample + i64::from(self.error[0]) - i64::from(self.error[1])
            + i64::from(self.error[2]);

        self.error[2] = self.error[1];
        self.error[1] = self.error[0] / 2;

        let mut output = sample + round;

        let rnd = prng(self.random);
        output += (i64::from(rnd) & mask) - (i64::from(self.random) & mask);
        self.random = rnd;

        // Clip, never wrap
        if output > max {
            output = max;
            if sample > max {
                sample = max;
            }
        } else if output < min {
            output = min;
            if sample < min {
                sample = min;
            }
        }

        output &= !mask;

        self.error[0] = (sample - output) as i32;

        output
    }

    /// Reduce one sample from `source_bits` to `dest_bits` of precision
    ///
    /// `sample` must lie in the signed `source_bits` range, and
    /// `dest_bits < source_bits <= 32` must hold. The result lies in the
    /// signed `dest_bits` range.
    pub fn dither_shift(&mut self, sample: i32, source_bits: u32, dest_bits: u32) -> i32 {
        debug_assert!(source_bits <= 32, "source wider than 32 bits");
        debug_assert!(dest_bits > 0 && dest_bits < source_bits, "nothing to discard");

        let scale_bits = source_bits - dest_bits;
        let min = -(1i64 << (source_bits - 1));
        let max = (1i64 << (source_bits - 1)) - 1;

        (self.dither(i64::from(sample), min, max, scale_bits) >> scale_bits) as i32
    }

    /// Dither a run of `S` samples down into `D` samples, in order
    pub fn dither_convert<S, D>(&mut self, dest: &mut [D::Value], src: &[S::Value])
    where
        S: IntegerTraits,
        D: IntegerTraits,
    {
        debug_assert!(S::BITS > D::BITS, "sample formats cannot be dithered");
        debug_assert_eq!(dest.len(), src.len());

        let scale_bits = S::BITS - D::BITS;

        for (out, &sample) in dest.iter_mut().zip(src) {
            let quantized = self.dither(S::widen(sample), S::MIN, S::MAX, scale_bits);
            *out = D::narrow(quantized >> scale_bits);
        }
    }

    /// Dither 24-bit-in-32 samples down to 16 bits
    pub fn dither_24_to_16(&mut self, dest: &mut [i16], src: &[i32]) {
        self.dither_convert::<S24P32, S16>(dest, src);
    }

    /// Dither 32-bit samples down to 16 bits
    pub fn dither_32_to_16(&mut self, dest: &mut [i16], src: &[i32]) {
        self.dither_convert::<S32, S16>(dest, src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S24_MIN: i32 = -(1 << 23);
    const S24_MAX: i32 = (1 << 23) - 1;

    #[test]
    fn test_silence_from_cold_start() {
        let mut dither = PcmDither::new();
        let src = [0i32; 8];
        let mut dest = [0i16; 8];

        dither.dither_24_to_16(&mut dest, &src);

        // Deterministic noise sequence for a cold filter
        assert_eq!(dest, [0, 0, 1, -2, 1, 0, -1, 2]);
    }

    #[test]
    fn test_silence_stays_near_zero() {
        let mut dither = PcmDither::new();
        let src = vec![0i32; 4096];
        let mut dest = vec![0i16; 4096];

        dither.dither_32_to_16(&mut dest, &src);

        assert!(dest.iter().all(|s| s.abs() <= 2));
    }

    #[test]
    fn test_full_scale_clamps() {
        let mut dither = PcmDither::new();

        let src = [S24_MAX; 64];
        let mut dest = [0i16; 64];
        dither.dither_24_to_16(&mut dest, &src);
        assert!(dest.iter().all(|&s| s == i16::MAX));

        let src = [S24_MIN; 64];
        dither.dither_24_to_16(&mut dest, &src);
        assert!(dest.iter().all(|&s| s <= i16::MIN + 1));

        let src = [i32::MIN, i32::MAX, i32::MIN, i32::MAX];
        let mut dest = [0i16; 4];
        dither.dither_32_to_16(&mut dest, &src);
        assert!(dest[1] == i16::MAX && dest[3] == i16::MAX);
        assert!(dest[0] <= i16::MIN + 1 && dest[2] <= i16::MIN + 1);
    }

    #[test]
    fn test_preserves_dc_level() {
        let mut dither = PcmDither::new();
        let src = vec![0x12_3456i32; 65_536];
        let mut dest = vec![0i16; src.len()];

        dither.dither_24_to_16(&mut dest, &src);

        let mean = dest.iter().map(|&s| f64::from(s)).sum::<f64>() / dest.len() as f64;
        let expected = f64::from(0x12_3456) / 256.0;
        assert!((mean - expected).abs() < 0.05, "mean {} vs {}", mean, expected);
    }

    #[test]
    fn test_stays_close_to_truncation() {
        let mut dither = PcmDither::new();
        let src: Vec<i32> = (0..10_000).map(|i| (i * 7919) % S24_MAX - (1 << 22)).collect();
        let mut dest = vec![0i16; src.len()];

        dither.dither_24_to_16(&mut dest, &src);

        for (&out, &input) in dest.iter().zip(&src) {
            assert!((i32::from(out) - (input >> 8)).abs() <= 8);
        }
    }

    #[test]
    fn test_block_size_does_not_matter() {
        let src: Vec<i32> = (0..1000).map(|i| (i * 104_729) % S24_MAX).collect();

        let mut whole = PcmDither::new();
        let mut expected = vec![0i16; src.len()];
        whole.dither_24_to_16(&mut expected, &src);

        let mut split = PcmDither::new();
        let mut actual = vec![0i16; src.len()];
        for (out, input) in actual.chunks_mut(37).zip(src.chunks(37)) {
            split.dither_24_to_16(out, input);
        }

        assert_eq!(actual, expected);
        assert_eq!(split, whole);
    }

    #[test]
    fn test_reset_restores_cold_state() {
        let mut dither = PcmDither::new();
        let src = [0x40_0000i32; 16];
        let mut first = [0i16; 16];
        dither.dither_24_to_16(&mut first, &src);
        assert_ne!(dither, PcmDither::new());

        dither.reset();
        assert_eq!(dither, PcmDither::new());

        let mut second = [0i16; 16];
        dither.dither_24_to_16(&mut second, &src);
        assert_eq!(first, second);
    }

    #[test]
    fn test_dither_shift_matches_bulk() {
        let src: Vec<i32> = (0..256).map(|i| i * 65_793 - (1 << 23)).collect();

        let mut bulk = PcmDither::new();
        let mut expected = vec![0i16; src.len()];
        bulk.dither_24_to_16(&mut expected, &src);

        let mut single = PcmDither::new();
        for (&input, &out) in src.iter().zip(&expected) {
            assert_eq!(single.dither_shift(input, 24, 16), i32::from(out));
        }
    }

    #[test]
    fn test_dither_shift_arbitrary_widths() {
        let mut dither = PcmDither::new();

        for sample in [-2048, -1, 0, 1, 2047] {
            let out = dither.dither_shift(sample, 12, 8);
            assert!((-128..=127).contains(&out));
        }
    }
}
