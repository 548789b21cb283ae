//! Configuration for converters and DSD decoders
//!
//! The source format, destination format, DSD channel count and DSD bit
//! order are the only knobs this crate has. They deserialize from the
//! output section of the player configuration:
//!
//! ```rust
//! use soul_pcm::{ConverterConfig, SampleFormat};
//!
//! let config: ConverterConfig =
//!     serde_json::from_str(r#"{ "source": "s24_p32", "destination": "s16" }"#).unwrap();
//! assert_eq!(config.destination, SampleFormat::S16);
//! ```

use serde::{Deserialize, Serialize};

use crate::convert::FormatConverter;
use crate::dsd::MAX_CHANNELS;
use crate::error::{PcmError, Result};
use crate::format::SampleFormat;

/// Format pair for a [`FormatConverter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConverterConfig {
    pub source: SampleFormat,
    pub destination: SampleFormat,
}

impl ConverterConfig {
    pub fn new(source: SampleFormat, destination: SampleFormat) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Check that both formats are concrete
    pub fn validate(&self) -> Result<()> {
        if !self.source.is_defined() {
            return Err(PcmError::UndefinedFormat { role: "source" });
        }
        if !self.destination.is_defined() {
            return Err(PcmError::UndefinedFormat {
                role: "destination",
            });
        }
        Ok(())
    }

    /// Whether converting this pair goes through the dither unit
    pub fn needs_dither(&self) -> bool {
        self.destination == SampleFormat::S16
            && matches!(self.source, SampleFormat::S24P32 | SampleFormat::S32)
    }

    /// Create a converter opened for this pair
    pub fn open(&self) -> Result<FormatConverter> {
        let mut converter = FormatConverter::new();
        converter.open(self.source, self.destination)?;
        Ok(converter)
    }
}

/// Layout of a raw DSD stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DsdConfig {
    /// Interleaved channels, 1 to 32
    pub channels: usize,

    /// Bit order within each byte; DSF files are LSB first, DFF MSB first
    #[serde(default)]
    pub lsb_first: bool,
}

impl DsdConfig {
    pub fn new(channels: usize, lsb_first: bool) -> Self {
        Self {
            channels,
            lsb_first,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(PcmError::InvalidChannelCount(self.channels));
        }
        Ok(())
    }
}

impl Default for DsdConfig {
    fn default() -> Self {
        Self::new(2, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converter_config_validation() {
        assert!(ConverterConfig::new(SampleFormat::S16, SampleFormat::Float)
            .validate()
            .is_ok());
        assert!(ConverterConfig::default().validate().is_err());
        assert_eq!(
            ConverterConfig::new(SampleFormat::S16, SampleFormat::Undefined).validate(),
            Err(PcmError::UndefinedFormat {
                role: "destination"
            })
        );
    }

    #[test]
    fn test_needs_dither() {
        assert!(ConverterConfig::new(SampleFormat::S24P32, SampleFormat::S16).needs_dither());
        assert!(ConverterConfig::new(SampleFormat::S32, SampleFormat::S16).needs_dither());
        assert!(!ConverterConfig::new(SampleFormat::Float, SampleFormat::S16).needs_dither());
        assert!(!ConverterConfig::new(SampleFormat::S32, SampleFormat::S24P32).needs_dither());
    }

    #[test]
    fn test_open_from_config() {
        let converter = ConverterConfig::new(SampleFormat::S8, SampleFormat::S32)
            .open()
            .unwrap();
        assert!(converter.is_open());
        assert_eq!(converter.destination_format(), SampleFormat::S32);
    }

    #[test]
    fn test_dsd_config_validation() {
        assert!(DsdConfig::default().validate().is_ok());
        assert!(DsdConfig::new(32, true).validate().is_ok());
        assert_eq!(
            DsdConfig::new(33, false).validate(),
            Err(PcmError::InvalidChannelCount(33))
        );
        assert!(DsdConfig::new(0, false).validate().is_err());
    }
}
