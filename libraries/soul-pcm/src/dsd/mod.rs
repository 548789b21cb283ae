//! DSD (Direct Stream Digital) to PCM decoding
//!
//! Turns interleaved, byte-packed 1-bit DSD streams into interleaved 32-bit
//! float PCM. Every channel runs through its own low-pass filter context;
//! the decoder keeps a fixed bank of up to [`MAX_CHANNELS`] of them.
//!
//! # Output rate
//!
//! | Call                   | Samples out per input byte | DSD64 source |
//! |------------------------|----------------------------|--------------|
//! | `to_float`             | 8 (one per DSD bit)        | 2.8224 MHz   |
//! | `to_float_decimated`   | 1                          | 352.8 kHz    |
//!
//! Output is nominally in [-1.0, 1.0] but the filter is not perfectly
//! band-limited, so small excursions beyond that are passed through
//! unclamped.
//!
//! # Example
//!
//! ```rust
//! use soul_pcm::DsdDecoder;
//!
//! let mut decoder = DsdDecoder::new();
//!
//! // Stereo, MSB first: L, R, L, R
//! let dsd = [0x69u8, 0x69, 0x69, 0x69];
//! let pcm = decoder.to_float(2, false, &dsd)?;
//!
//! assert_eq!(pcm.len(), dsd.len() * 8);
//! assert!(pcm.iter().all(|s| s.abs() < 0.01));
//! # Ok::<(), soul_pcm::PcmError>(())
//! ```

mod dsd2pcm;

use arrayvec::ArrayVec;
use tracing::debug;

use crate::buffer::PcmBuffer;
use crate::config::DsdConfig;
use crate::error::{PcmError, Result};
use crate::format::SampleFormat;

pub use dsd2pcm::{Dsd2Pcm, SILENCE};

/// Hard ceiling on the number of DSD channels
pub const MAX_CHANNELS: usize = 32;

/// Bank of per-channel DSD filter contexts plus an output buffer
#[derive(Debug, Default)]
pub struct DsdDecoder {
    buffer: PcmBuffer,
    contexts: ArrayVec<Dsd2Pcm, MAX_CHANNELS>,
}

impl DsdDecoder {
    /// Create a decoder; contexts are set up on the first decode call
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of channels the context bank is currently set up for
    pub fn channels(&self) -> usize {
        self.contexts.len()
    }

    /// Clear the history of every allocated context
    pub fn reset(&mut self) {
        for context in &mut self.contexts {
            context.reset();
        }
    }

    /// Validate a request and (re)build the context bank if needed
    fn prepare(&mut self, channels: usize, src: &[u8]) -> Result<()> {
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(PcmError::InvalidChannelCount(channels));
        }
        if src.len() % channels != 0 {
            return Err(PcmError::MisalignedBuffer {
                format: SampleFormat::Dsd,
                len: src.len(),
            });
        }

        if self.contexts.len() != channels {
            debug!(
                "DSD decoder context bank: {} -> {} channels",
                self.contexts.len(),
                channels
            );
            self.contexts.clear();
            self.contexts
                .extend(std::iter::repeat_with(Dsd2Pcm::new).take(channels));
        }

        Ok(())
    }

    /// Decode `channels` interleaved DSD streams into interleaved float PCM
    ///
    /// Produces one float per DSD bit: `8 * src.len()` samples in total,
    /// in input channel order. A channel count different from the
    /// previous call discards all filter history.
    pub fn to_float(&mut self, channels: usize, lsb_first: bool, src: &[u8]) -> Result<&[f32]> {
        self.prepare(channels, src)?;

        let dest = self.buffer.get::<f32>(src.len() * 8);
        let mut bits = [0.0f32; 8];

        for (frame, out) in src
            .chunks_exact(channels)
            .zip(dest.chunks_exact_mut(channels * 8))
        {
            for (channel, (&byte, context)) in frame.iter().zip(&mut self.contexts).enumerate() {
                context.translate_bits(byte, lsb_first, &mut bits);

                for (slot, &sample) in out.iter_mut().skip(channel).step_by(channels).zip(&bits) {
                    *slot = sample;
                }
            }
        }

        Ok(dest)
    }

    /// Decode with 8:1 decimation: one float per input byte per channel
    pub fn to_float_decimated(
        &mut self,
        channels: usize,
        lsb_first: bool,
        src: &[u8],
    ) -> Result<&[f32]> {
        self.prepare(channels, src)?;

        let dest = self.buffer.get::<f32>(src.len());

        for (frame, out) in src.chunks_exact(channels).zip(dest.chunks_exact_mut(channels)) {
            for ((&byte, slot), context) in frame.iter().zip(out).zip(&mut self.contexts) {
                *slot = context.translate_byte(byte, lsb_first);
            }
        }

        Ok(dest)
    }

    /// [`to_float`](Self::to_float) driven by a configuration
    pub fn decode(&mut self, config: &DsdConfig, src: &[u8]) -> Result<&[f32]> {
        self.to_float(config.channels, config.lsb_first, src)
    }
}
