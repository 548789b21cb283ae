//! PCM format conversion for Soul Player
//!
//! This crate provides:
//! - Sample format model (8/16/24/32-bit integer, float, DSD) with per-format traits
//! - Format converter that turns any decoded stream into the format the output wants
//! - Noise-shaped dither for 24/32 → 16-bit reduction
//! - DSD to float PCM decoding for up to 32 channels
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────────┐     ┌────────┐
//! │ Decoder     │ ──► │ DsdDecoder   │ ──► │ FormatConverter │ ──► │ Output │
//! └─────────────┘     │ (DSD only)   │     │  └ PcmDither    │     └────────┘
//!                     └──────────────┘     └─────────────────┘
//! ```
//!
//! All of it is synchronous and allocation-free once the scratch buffers
//! have grown to the block size of the stream. Instances are owned by one
//! output chain and never shared.
//!
//! # Example
//!
//! ```rust
//! use soul_pcm::{FormatConverter, SampleFormat, SampleView};
//!
//! let mut converter = FormatConverter::new();
//! converter.open(SampleFormat::S24P32, SampleFormat::S16)?;
//!
//! let decoded: Vec<i32> = vec![0x12_3456, -0x12_3456];
//! let out = converter.convert(SampleView::S24P32(&decoded))?;
//! assert_eq!(out.format(), SampleFormat::S16);
//! assert_eq!(out.len(), 2);
//! # Ok::<(), soul_pcm::PcmError>(())
//! ```

#![forbid(unsafe_code)]

mod buffer;
mod config;
pub mod convert;
mod dither;
pub mod dsd;
mod error;
pub mod format;
mod view;

pub use buffer::PcmBuffer;
pub use config::{ConverterConfig, DsdConfig};
pub use convert::FormatConverter;
pub use dither::PcmDither;
pub use dsd::{DsdDecoder, MAX_CHANNELS};
pub use error::{PcmError, Result};
pub use format::SampleFormat;
pub use view::SampleView;
