//! Stateful converter bound to one (source, destination) format pair

use tracing::debug;

use super::format::{convert_to_16, convert_to_24, convert_to_32, convert_to_float};
use crate::buffer::PcmBuffer;
use crate::dither::PcmDither;
use crate::error::{PcmError, Result};
use crate::format::SampleFormat;
use crate::view::SampleView;

/// Converts a stream from one sample format to another
///
/// Lifecycle: [`open`](Self::open) → any number of
/// [`convert`](Self::convert) calls → [`close`](Self::close). The converter
/// owns its output memory; every returned view borrows the converter and is
/// therefore gone before the next call can be made.
///
/// # Example
///
/// ```rust
/// use soul_pcm::{FormatConverter, SampleFormat, SampleView};
///
/// let mut converter = FormatConverter::new();
/// converter.open(SampleFormat::S16, SampleFormat::Float)?;
///
/// let samples: Vec<i16> = vec![0, 16384, -32768];
/// let out = converter.convert(SampleView::S16(&samples))?;
/// assert_eq!(out.as_float(), Some(&[0.0, 0.5, -1.0][..]));
///
/// converter.close();
/// # Ok::<(), soul_pcm::PcmError>(())
/// ```
#[derive(Debug, Default)]
pub struct FormatConverter {
    /// (source, destination) while open
    formats: Option<(SampleFormat, SampleFormat)>,

    buffer: PcmBuffer,

    /// Only used for S24_P32/S32 -> S16
    dither: PcmDither,
}

impl FormatConverter {
    /// Create a closed converter
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the converter to a format pair
    ///
    /// Fails if either format is undefined or the converter is already
    /// open. An unsupported destination (S8, DSD) is accepted here and
    /// reported by [`convert`](Self::convert). The dither history starts
    /// cold for every opened stream.
    pub fn open(&mut self, source: SampleFormat, destination: SampleFormat) -> Result<()> {
        if let Some((from, to)) = self.formats {
            return Err(PcmError::AlreadyOpen { from, to });
        }
        if !source.is_defined() {
            return Err(PcmError::UndefinedFormat { role: "source" });
        }
        if !destination.is_defined() {
            return Err(PcmError::UndefinedFormat {
                role: "destination",
            });
        }

        debug!("Opening PCM format converter {} -> {}", source, destination);

        self.dither.reset();
        self.formats = Some((source, destination));
        Ok(())
    }

    /// Forget the format pair; the scratch buffer is kept for reuse
    pub fn close(&mut self) {
        if let Some((from, to)) = self.formats.take() {
            debug!("Closed PCM format converter {} -> {}", from, to);
        }
    }

    pub fn is_open(&self) -> bool {
        self.formats.is_some()
    }

    /// Source format, `Undefined` while closed
    pub fn source_format(&self) -> SampleFormat {
        self.formats.map_or(SampleFormat::Undefined, |(source, _)| source)
    }

    /// Destination format, `Undefined` while closed
    pub fn destination_format(&self) -> SampleFormat {
        self.formats.map_or(SampleFormat::Undefined, |(_, dest)| dest)
    }

    /// Convert one block of source samples
    ///
    /// The output has exactly as many samples as the input. It may be the
    /// source view itself when no conversion is needed, otherwise it lives
    /// in the converter's scratch buffer.
    pub fn convert<'a>(&'a mut self, src: SampleView<'a>) -> Result<SampleView<'a>> {
        let (source, destination) = self.formats.ok_or(PcmError::NotOpen)?;

        if src.format() != source {
            return Err(PcmError::FormatMismatch {
                expected: source,
                actual: src.format(),
            });
        }

        match destination {
            SampleFormat::Undefined => unreachable!("open() rejects an undefined destination"),
            SampleFormat::S8 | SampleFormat::Dsd => Err(PcmError::Unsupported {
                from: source,
                to: destination,
            }),
            SampleFormat::S16 => convert_to_16(&mut self.buffer, &mut self.dither, src),
            SampleFormat::S24P32 => convert_to_24(&mut self.buffer, src),
            SampleFormat::S32 => convert_to_32(&mut self.buffer, src),
            SampleFormat::Float => convert_to_float(&mut self.buffer, src),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_undefined() {
        let mut converter = FormatConverter::new();

        assert_eq!(
            converter.open(SampleFormat::Undefined, SampleFormat::S16),
            Err(PcmError::UndefinedFormat { role: "source" })
        );
        assert_eq!(
            converter.open(SampleFormat::S16, SampleFormat::Undefined),
            Err(PcmError::UndefinedFormat {
                role: "destination"
            })
        );
        assert!(!converter.is_open());
    }

    #[test]
    fn test_lifecycle() {
        let mut converter = FormatConverter::new();
        assert_eq!(converter.source_format(), SampleFormat::Undefined);

        converter.open(SampleFormat::S24P32, SampleFormat::S16).unwrap();
        assert!(converter.is_open());
        assert_eq!(converter.source_format(), SampleFormat::S24P32);
        assert_eq!(converter.destination_format(), SampleFormat::S16);

        assert_eq!(
            converter.open(SampleFormat::S8, SampleFormat::S16),
            Err(PcmError::AlreadyOpen {
                from: SampleFormat::S24P32,
                to: SampleFormat::S16
            })
        );

        converter.close();
        assert!(!converter.is_open());
        assert_eq!(converter.destination_format(), SampleFormat::Undefined);

        converter.open(SampleFormat::S8, SampleFormat::S16).unwrap();
        assert_eq!(converter.source_format(), SampleFormat::S8);
    }

    #[test]
    fn test_convert_requires_open() {
        let mut converter = FormatConverter::new();
        let samples = [0i16; 4];

        assert_eq!(
            converter.convert(SampleView::S16(&samples)),
            Err(PcmError::NotOpen)
        );

        converter.open(SampleFormat::S16, SampleFormat::S32).unwrap();
        converter.close();
        assert_eq!(
            converter.convert(SampleView::S16(&samples)),
            Err(PcmError::NotOpen)
        );
    }

    #[test]
    fn test_convert_rejects_wrong_source() {
        let mut converter = FormatConverter::new();
        converter.open(SampleFormat::S16, SampleFormat::S32).unwrap();

        let samples = [0.0f32; 4];
        assert_eq!(
            converter.convert(SampleView::Float(&samples)),
            Err(PcmError::FormatMismatch {
                expected: SampleFormat::S16,
                actual: SampleFormat::Float
            })
        );
    }

    #[test]
    fn test_unsupported_destinations() {
        for destination in [SampleFormat::S8, SampleFormat::Dsd] {
            let mut converter = FormatConverter::new();
            converter.open(SampleFormat::S16, destination).unwrap();

            let samples = [1i16, 2, 3];
            let err = converter.convert(SampleView::S16(&samples)).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("PCM conversion from 16 to {} is not implemented", destination)
            );
        }
    }

    #[test]
    fn test_reopen_restarts_dither() {
        let src = vec![0x12_3456i32; 32];
        let mut converter = FormatConverter::new();

        converter.open(SampleFormat::S24P32, SampleFormat::S16).unwrap();
        let first = converter
            .convert(SampleView::S24P32(&src))
            .unwrap()
            .as_s16()
            .unwrap()
            .to_vec();
        converter.close();

        converter.open(SampleFormat::S24P32, SampleFormat::S16).unwrap();
        let second = converter
            .convert(SampleView::S24P32(&src))
            .unwrap()
            .as_s16()
            .unwrap()
            .to_vec();

        assert_eq!(first, second);
    }

    #[test]
    fn test_scratch_buffer_reused() {
        let src = vec![0i16; 4096];
        let mut converter = FormatConverter::new();
        converter.open(SampleFormat::S16, SampleFormat::Float).unwrap();

        converter.convert(SampleView::S16(&src)).unwrap();
        let capacity = converter.buffer.capacity();

        for _ in 0..100 {
            let out = converter.convert(SampleView::S16(&src[..1024])).unwrap();
            assert_eq!(out.len(), 1024);
        }
        assert_eq!(converter.buffer.capacity(), capacity);

        converter.close();
        assert_eq!(converter.buffer.capacity(), capacity);
    }
}
