//! Per-destination conversion routines
//!
//! Each `convert_to_*` function takes a source view, writes the result into
//! the given scratch buffer and returns a view of it. When the source is
//! already in the destination format the source view is returned as-is.

use crate::buffer::PcmBuffer;
use crate::dither::PcmDither;
use crate::error::{PcmError, Result};
use crate::format::{IntegerTraits, SampleFormat, S16, S24P32, S32, S8};
use crate::view::SampleView;

fn unsupported(from: SampleFormat, to: SampleFormat) -> PcmError {
    PcmError::Unsupported { from, to }
}

/// Lossless widening (left shift) or plain narrowing (arithmetic right shift)
fn shift<'a, S, D>(buffer: &'a mut PcmBuffer, src: &[S::Value]) -> &'a [D::Value]
where
    S: IntegerTraits,
    D: IntegerTraits,
{
    let dest = buffer.get::<D::Value>(src.len());

    for (out, &sample) in dest.iter_mut().zip(src) {
        let value = S::widen(sample);
        *out = D::narrow(if D::BITS >= S::BITS {
            value << (D::BITS - S::BITS)
        } else {
            value >> (S::BITS - D::BITS)
        });
    }

    dest
}

/// Scale into [-1.0, 1.0] by dividing by `2^(BITS-1)`
fn to_float<'a, S: IntegerTraits>(buffer: &'a mut PcmBuffer, src: &[S::Value]) -> &'a [f32] {
    let factor = 1.0 / (1u64 << (S::BITS - 1)) as f32;
    let dest = buffer.get::<f32>(src.len());

    for (out, &sample) in dest.iter_mut().zip(src) {
        *out = S::widen(sample) as f32 * factor;
    }

    dest
}

/// Scale by `2^(BITS-1)`, truncate towards zero and clamp
fn from_float<'a, D: IntegerTraits>(buffer: &'a mut PcmBuffer, src: &[f32]) -> &'a [D::Value] {
    let factor = (1u64 << (D::BITS - 1)) as f64;
    let dest = buffer.get::<D::Value>(src.len());

    for (out, &sample) in dest.iter_mut().zip(src) {
        let value = (f64::from(sample) * factor) as i64;
        *out = D::narrow(value.clamp(D::MIN, D::MAX));
    }

    dest
}

/// Convert to signed 16-bit, dithering sources wider than 16 bits
pub fn convert_to_16<'a>(
    buffer: &'a mut PcmBuffer,
    dither: &mut PcmDither,
    src: SampleView<'a>,
) -> Result<SampleView<'a>> {
    Ok(match src {
        SampleView::S8(s) => SampleView::S16(shift::<S8, S16>(buffer, s)),
        SampleView::S16(_) => src,
        SampleView::S24P32(s) => {
            let dest = buffer.get::<i16>(s.len());
            dither.dither_24_to_16(dest, s);
            SampleView::S16(dest)
        }
        SampleView::S32(s) => {
            let dest = buffer.get::<i16>(s.len());
            dither.dither_32_to_16(dest, s);
            SampleView::S16(dest)
        }
        SampleView::Float(s) => SampleView::S16(from_float::<S16>(buffer, s)),
        SampleView::Dsd(_) => return Err(unsupported(SampleFormat::Dsd, SampleFormat::S16)),
    })
}

/// Convert to signed 24-bit in a 32-bit word
pub fn convert_to_24<'a>(buffer: &'a mut PcmBuffer, src: SampleView<'a>) -> Result<SampleView<'a>> {
    Ok(match src {
        SampleView::S8(s) => SampleView::S24P32(shift::<S8, S24P32>(buffer, s)),
        SampleView::S16(s) => SampleView::S24P32(shift::<S16, S24P32>(buffer, s)),
        SampleView::S24P32(_) => src,
        SampleView::S32(s) => SampleView::S24P32(shift::<S32, S24P32>(buffer, s)),
        SampleView::Float(s) => SampleView::S24P32(from_float::<S24P32>(buffer, s)),
        SampleView::Dsd(_) => return Err(unsupported(SampleFormat::Dsd, SampleFormat::S24P32)),
    })
}

/// Convert to signed 32-bit
pub fn convert_to_32<'a>(buffer: &'a mut PcmBuffer, src: SampleView<'a>) -> Result<SampleView<'a>> {
    Ok(match src {
        SampleView::S8(s) => SampleView::S32(shift::<S8, S32>(buffer, s)),
        SampleView::S16(s) => SampleView::S32(shift::<S16, S32>(buffer, s)),
        SampleView::S24P32(s) => SampleView::S32(shift::<S24P32, S32>(buffer, s)),
        SampleView::S32(_) => src,
        SampleView::Float(s) => SampleView::S32(from_float::<S32>(buffer, s)),
        SampleView::Dsd(_) => return Err(unsupported(SampleFormat::Dsd, SampleFormat::S32)),
    })
}

/// Convert to 32-bit float
pub fn convert_to_float<'a>(
    buffer: &'a mut PcmBuffer,
    src: SampleView<'a>,
) -> Result<SampleView<'a>> {
    Ok(match src {
        SampleView::S8(s) => SampleView::Float(to_float::<S8>(buffer, s)),
        SampleView::S16(s) => SampleView::Float(to_float::<S16>(buffer, s)),
        SampleView::S24P32(s) => SampleView::Float(to_float::<S24P32>(buffer, s)),
        SampleView::S32(s) => SampleView::Float(to_float::<S32>(buffer, s)),
        SampleView::Float(_) => src,
        SampleView::Dsd(_) => return Err(unsupported(SampleFormat::Dsd, SampleFormat::Float)),
    })
}
