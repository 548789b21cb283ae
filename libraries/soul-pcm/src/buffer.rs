//! Reusable scratch memory for conversion output

use bytemuck::Pod;
use tracing::trace;

/// Allocation granule in bytes
const GRANULE: usize = 8192;

const WORD: usize = std::mem::size_of::<u64>();

/// Growable scratch buffer owned by exactly one converter or decoder
///
/// The allocation only ever grows. Once it has reached the largest size a
/// stream asks for, later calls reuse it without touching the allocator.
/// Storage is a run of 8-byte words so it can be addressed as any sample
/// element type without alignment issues.
#[derive(Debug, Default)]
pub struct PcmBuffer {
    words: Vec<u64>,
}

impl PcmBuffer {
    /// Create an empty buffer; nothing is allocated until first use
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure at least `size` bytes are available
    fn reserve_bytes(&mut self, size: usize) -> usize {
        let words = size.div_ceil(WORD);

        if words > self.words.len() {
            if words > self.words.capacity() {
                let bytes = ((words * WORD - 1) | (GRANULE - 1)) + 1;
                self.words.reserve_exact(bytes / WORD - self.words.len());
                trace!("PCM scratch buffer grown to {} bytes", bytes);
            }
            self.words.resize(words, 0);
        }

        words
    }

    /// Get at least `size` writable bytes, growing if necessary
    ///
    /// The contents are unspecified; callers overwrite what they use.
    pub fn get_bytes(&mut self, size: usize) -> &mut [u8] {
        let words = self.reserve_bytes(size);
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.words[..words])[..size]
    }

    /// Get room for exactly `count` elements of `T`
    ///
    /// `T` must be a sample element type (1, 2, 4 or 8 bytes wide).
    pub fn get<T: Pod>(&mut self, count: usize) -> &mut [T] {
        debug_assert!(WORD % std::mem::size_of::<T>() == 0);

        let words = self.reserve_bytes(count * std::mem::size_of::<T>());
        &mut bytemuck::cast_slice_mut::<u64, T>(&mut self.words[..words])[..count]
    }

    /// Forget the current contents but keep the allocation
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Allocated size in bytes
    pub fn capacity(&self) -> usize {
        self.words.capacity() * WORD
    }
}
