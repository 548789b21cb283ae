//! PCM sample format conversion
//!
//! Conversion never changes the number of samples or channels, only the
//! element type:
//!
//! | to \ from | S8    | S16   | S24_P32      | S32          | FLOAT        |
//! |-----------|-------|-------|--------------|--------------|--------------|
//! | S16       | << 8  | =     | dither 24→16 | dither 32→16 | ×2^15, clamp |
//! | S24_P32   | << 16 | << 8  | =            | >> 8         | ×2^23, clamp |
//! | S32       | << 24 | << 16 | << 8         | =            | ×2^31, clamp |
//! | FLOAT     | /2^7  | /2^15 | /2^23        | /2^31        | =            |
//!
//! Only the reduction to 16 bits is dithered. S8 and DSD are not supported
//! as destinations; DSD sources go through [`DsdDecoder`](crate::DsdDecoder)
//! first.

mod converter;
mod format;

pub use converter::FormatConverter;
pub use format::{convert_to_16, convert_to_24, convert_to_32, convert_to_float};
