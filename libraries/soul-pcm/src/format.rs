//! Sample formats and their numeric traits
//!
//! [`SampleFormat`] is the runtime tag carried next to every buffer. The
//! zero-sized marker types ([`S8`], [`S16`], [`S24P32`], [`S32`], [`Float`],
//! [`Dsd`]) carry the same information at compile time so conversion
//! routines can be written once and monomorphised per format pair.
//!
//! | Format    | Element | Bytes | Range                 |
//! |-----------|---------|-------|-----------------------|
//! | `S8`      | `i8`    | 1     | -128 ..= 127          |
//! | `S16`     | `i16`   | 2     | -32768 ..= 32767      |
//! | `S24_P32` | `i32`   | 4     | -2^23 ..= 2^23-1      |
//! | `S32`     | `i32`   | 4     | i32::MIN ..= i32::MAX |
//! | `FLOAT`   | `f32`   | 4     | -1.0 ..= 1.0          |
//! | `DSD`     | `u8`    | 1     | 8 one-bit samples     |

use std::fmt;
use std::str::FromStr;

use bytemuck::Pod;
use serde::{Deserialize, Serialize};

use crate::error::PcmError;

/// Sample representation of a PCM or DSD stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// Not configured; never a valid conversion operand
    #[default]
    Undefined,
    /// Signed 8-bit integer
    S8,
    /// Signed 16-bit integer
    S16,
    /// Signed 24-bit integer, sign-extended into a 32-bit word
    S24P32,
    /// Signed 32-bit integer
    S32,
    /// 32-bit float, nominally in [-1.0, 1.0]
    Float,
    /// 1-bit Direct Stream Digital, eight samples packed per byte
    Dsd,
}

impl SampleFormat {
    /// Every concrete (non-undefined) format
    pub const ALL: [SampleFormat; 6] = [
        SampleFormat::S8,
        SampleFormat::S16,
        SampleFormat::S24P32,
        SampleFormat::S32,
        SampleFormat::Float,
        SampleFormat::Dsd,
    ];

    /// Whether this is a concrete format
    pub fn is_defined(self) -> bool {
        self != SampleFormat::Undefined
    }

    /// Storage width of one element in bytes
    ///
    /// A DSD element is one byte holding eight 1-bit samples.
    pub fn sample_size(self) -> usize {
        match self {
            SampleFormat::Undefined => 0,
            SampleFormat::S8 | SampleFormat::Dsd => 1,
            SampleFormat::S16 => 2,
            SampleFormat::S24P32 | SampleFormat::S32 | SampleFormat::Float => 4,
        }
    }

    /// Bits of precision per sample
    pub fn bits(self) -> u32 {
        match self {
            SampleFormat::Undefined => 0,
            SampleFormat::Dsd => 1,
            SampleFormat::S8 => 8,
            SampleFormat::S16 => 16,
            SampleFormat::S24P32 => 24,
            SampleFormat::S32 | SampleFormat::Float => 32,
        }
    }

    /// Representable range of an integer format
    pub fn range(self) -> Option<(i64, i64)> {
        match self {
            SampleFormat::S8 => Some((S8::MIN, S8::MAX)),
            SampleFormat::S16 => Some((S16::MIN, S16::MAX)),
            SampleFormat::S24P32 => Some((S24P32::MIN, S24P32::MAX)),
            SampleFormat::S32 => Some((S32::MIN, S32::MAX)),
            SampleFormat::Undefined | SampleFormat::Float | SampleFormat::Dsd => None,
        }
    }

    /// Whether samples are signed integers
    pub fn is_integer(self) -> bool {
        self.range().is_some()
    }

    /// Bytes needed to hold `samples` elements, `None` on overflow
    pub fn byte_len(self, samples: usize) -> Option<usize> {
        samples.checked_mul(self.sample_size())
    }

    /// Bytes in one interleaved frame of `channels` elements
    pub fn frame_size(self, channels: usize) -> Option<usize> {
        self.byte_len(channels)
    }

    /// Short name used in audio format strings (`44100:24:2`)
    pub fn as_str(self) -> &'static str {
        match self {
            SampleFormat::Undefined => "?",
            SampleFormat::S8 => "8",
            SampleFormat::S16 => "16",
            SampleFormat::S24P32 => "24",
            SampleFormat::S32 => "32",
            SampleFormat::Float => "f",
            SampleFormat::Dsd => "dsd",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleFormat {
    type Err = PcmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "8" | "s8" => Ok(SampleFormat::S8),
            "16" | "s16" => Ok(SampleFormat::S16),
            "24" | "s24" | "s24_p32" => Ok(SampleFormat::S24P32),
            "32" | "s32" => Ok(SampleFormat::S32),
            "f" | "float" => Ok(SampleFormat::Float),
            "dsd" => Ok(SampleFormat::Dsd),
            _ => Err(PcmError::InvalidFormat(s.to_string())),
        }
    }
}

/// Compile-time description of one sample format
pub trait SampleTraits {
    /// Element type used to address buffers of this format
    type Value: Pod + Default + PartialEq + fmt::Debug;

    /// Runtime tag
    const FORMAT: SampleFormat;

    /// Bits of precision
    const BITS: u32;
}

/// Signed integer formats
pub trait IntegerTraits: SampleTraits {
    /// Smallest representable value
    const MIN: i64;

    /// Largest representable value
    const MAX: i64;

    /// Lossless widening to the common arithmetic type
    fn widen(value: Self::Value) -> i64;

    /// Narrowing from the common arithmetic type
    ///
    /// The caller guarantees `MIN <= value <= MAX`.
    fn narrow(value: i64) -> Self::Value;
}

macro_rules! integer_traits {
    ($name:ident, $value:ty, $format:expr, $bits:expr) => {
        impl SampleTraits for $name {
            type Value = $value;
            const FORMAT: SampleFormat = $format;
            const BITS: u32 = $bits;
        }

        impl IntegerTraits for $name {
            const MIN: i64 = -(1i64 << ($bits - 1));
            const MAX: i64 = (1i64 << ($bits - 1)) - 1;

            #[inline(always)]
            fn widen(value: $value) -> i64 {
                i64::from(value)
            }

            #[inline(always)]
            fn narrow(value: i64) -> $value {
                debug_assert!(value >= Self::MIN && value <= Self::MAX);
                value as $value
            }
        }
    };
}

/// Signed 8-bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S8;

/// Signed 16-bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S16;

/// Signed 24-bit in a 32-bit word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S24P32;

/// Signed 32-bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S32;

/// 32-bit float
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Float;

/// Packed 1-bit DSD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dsd;

integer_traits!(S8, i8, SampleFormat::S8, 8);
integer_traits!(S16, i16, SampleFormat::S16, 16);
integer_traits!(S24P32, i32, SampleFormat::S24P32, 24);
integer_traits!(S32, i32, SampleFormat::S32, 32);

impl SampleTraits for Float {
    type Value = f32;
    const FORMAT: SampleFormat = SampleFormat::Float;
    const BITS: u32 = 32;
}

impl SampleTraits for Dsd {
    type Value = u8;
    const FORMAT: SampleFormat = SampleFormat::Dsd;
    const BITS: u32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_sizes() {
        assert_eq!(SampleFormat::Undefined.sample_size(), 0);
        assert_eq!(SampleFormat::S8.sample_size(), 1);
        assert_eq!(SampleFormat::S16.sample_size(), 2);
        assert_eq!(SampleFormat::S24P32.sample_size(), 4);
        assert_eq!(SampleFormat::S32.sample_size(), 4);
        assert_eq!(SampleFormat::Float.sample_size(), 4);
        assert_eq!(SampleFormat::Dsd.sample_size(), 1);
    }

    #[test]
    fn test_sizes_match_element_types() {
        assert_eq!(std::mem::size_of::<<S8 as SampleTraits>::Value>(), 1);
        assert_eq!(std::mem::size_of::<<S16 as SampleTraits>::Value>(), 2);
        assert_eq!(std::mem::size_of::<<S24P32 as SampleTraits>::Value>(), 4);
        assert_eq!(std::mem::size_of::<<S32 as SampleTraits>::Value>(), 4);
        assert_eq!(std::mem::size_of::<<Float as SampleTraits>::Value>(), 4);
        assert_eq!(std::mem::size_of::<<Dsd as SampleTraits>::Value>(), 1);
    }

    #[test]
    fn test_integer_ranges() {
        assert_eq!(SampleFormat::S8.range(), Some((-128, 127)));
        assert_eq!(SampleFormat::S16.range(), Some((-32768, 32767)));
        assert_eq!(SampleFormat::S24P32.range(), Some((-8_388_608, 8_388_607)));
        assert_eq!(
            SampleFormat::S32.range(),
            Some((i64::from(i32::MIN), i64::from(i32::MAX)))
        );
        assert!(SampleFormat::Float.range().is_none());
        assert!(!SampleFormat::Dsd.is_integer());
    }

    #[test]
    fn test_byte_len() {
        // 32 channels of a 16k-sample block stays far from overflow
        assert_eq!(SampleFormat::S32.byte_len(32 * 16_384), Some(2_097_152));
        assert_eq!(SampleFormat::S16.frame_size(2), Some(4));
        assert_eq!(SampleFormat::Float.byte_len(usize::MAX), None);
    }

    #[test]
    fn test_display_and_parse() {
        for format in SampleFormat::ALL {
            let parsed: SampleFormat = format.to_string().parse().unwrap();
            assert_eq!(parsed, format);
        }
        assert_eq!("S24_P32".parse::<SampleFormat>().unwrap(), SampleFormat::S24P32);
        assert_eq!("float".parse::<SampleFormat>().unwrap(), SampleFormat::Float);
        assert!(matches!(
            "12".parse::<SampleFormat>(),
            Err(PcmError::InvalidFormat(_))
        ));
        assert!("?".parse::<SampleFormat>().is_err());
    }
}
