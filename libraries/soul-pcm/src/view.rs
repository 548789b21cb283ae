//! Immutable, typed views of sample runs

use crate::error::{PcmError, Result};
use crate::format::SampleFormat;

/// Borrowed run of samples tagged with its format
///
/// Views returned by [`FormatConverter::convert`](crate::FormatConverter::convert)
/// borrow the converter's scratch buffer and stay valid until the next
/// mutating call on that converter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleView<'a> {
    S8(&'a [i8]),
    S16(&'a [i16]),
    S24P32(&'a [i32]),
    S32(&'a [i32]),
    Float(&'a [f32]),
    Dsd(&'a [u8]),
}

impl<'a> SampleView<'a> {
    /// Reinterpret a native-endian byte buffer as samples of `format`
    ///
    /// Fails if the length is not a whole number of elements or if the
    /// buffer is not aligned for the element type.
    pub fn from_bytes(format: SampleFormat, bytes: &'a [u8]) -> Result<Self> {
        let misaligned = |_| PcmError::MisalignedBuffer {
            format,
            len: bytes.len(),
        };

        Ok(match format {
            SampleFormat::Undefined => return Err(PcmError::UndefinedFormat { role: "source" }),
            SampleFormat::S8 => SampleView::S8(bytemuck::cast_slice(bytes)),
            SampleFormat::S16 => SampleView::S16(bytemuck::try_cast_slice(bytes).map_err(misaligned)?),
            SampleFormat::S24P32 => {
                SampleView::S24P32(bytemuck::try_cast_slice(bytes).map_err(misaligned)?)
            }
            SampleFormat::S32 => SampleView::S32(bytemuck::try_cast_slice(bytes).map_err(misaligned)?),
            SampleFormat::Float => {
                SampleView::Float(bytemuck::try_cast_slice(bytes).map_err(misaligned)?)
            }
            SampleFormat::Dsd => SampleView::Dsd(bytes),
        })
    }

    /// Format of the viewed samples
    pub fn format(&self) -> SampleFormat {
        match self {
            SampleView::S8(_) => SampleFormat::S8,
            SampleView::S16(_) => SampleFormat::S16,
            SampleView::S24P32(_) => SampleFormat::S24P32,
            SampleView::S32(_) => SampleFormat::S32,
            SampleView::Float(_) => SampleFormat::Float,
            SampleView::Dsd(_) => SampleFormat::Dsd,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            SampleView::S8(s) => s.len(),
            SampleView::S16(s) => s.len(),
            SampleView::S24P32(s) | SampleView::S32(s) => s.len(),
            SampleView::Float(s) => s.len(),
            SampleView::Dsd(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The same samples as native-endian bytes
    pub fn as_bytes(&self) -> &'a [u8] {
        match *self {
            SampleView::S8(s) => bytemuck::cast_slice(s),
            SampleView::S16(s) => bytemuck::cast_slice(s),
            SampleView::S24P32(s) | SampleView::S32(s) => bytemuck::cast_slice(s),
            SampleView::Float(s) => bytemuck::cast_slice(s),
            SampleView::Dsd(s) => s,
        }
    }

    pub fn as_s8(&self) -> Option<&'a [i8]> {
        match *self {
            SampleView::S8(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_s16(&self) -> Option<&'a [i16]> {
        match *self {
            SampleView::S16(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_s24_p32(&self) -> Option<&'a [i32]> {
        match *self {
            SampleView::S24P32(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_s32(&self) -> Option<&'a [i32]> {
        match *self {
            SampleView::S32(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<&'a [f32]> {
        match *self {
            SampleView::Float(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dsd(&self) -> Option<&'a [u8]> {
        match *self {
            SampleView::Dsd(s) => Some(s),
            _ => None,
        }
    }
}

impl<'a> From<&'a [i8]> for SampleView<'a> {
    fn from(samples: &'a [i8]) -> Self {
        SampleView::S8(samples)
    }
}

impl<'a> From<&'a [i16]> for SampleView<'a> {
    fn from(samples: &'a [i16]) -> Self {
        SampleView::S16(samples)
    }
}

impl<'a> From<&'a [f32]> for SampleView<'a> {
    fn from(samples: &'a [f32]) -> Self {
        SampleView::Float(samples)
    }
}
