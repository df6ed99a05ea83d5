#[cfg(target_arch = "spirv")]
use spirv_std::arch::IndexUnchecked;

use glam::Vec4;

use crate::MirrorPixel;

/// Read-only view over the mirror pixel buffer.
///
/// Layout (in `Vec4` words):
///
/// - word 0: header, `x` - (as u32) number of valid entries,
/// - words `1 + 2 * idx` and `2 + 2 * idx`: entry `idx` (see
///   [`MirrorPixel::pack()`]).
#[derive(Clone, Copy)]
pub struct MirrorPixelsView<'a> {
    buffer: &'a [Vec4],
}

impl<'a> MirrorPixelsView<'a> {
    pub const HEADER_SIZE: usize = 1;
    pub const ENTRY_SIZE: usize = 2;

    pub fn new(buffer: &'a [Vec4]) -> Self {
        Self { buffer }
    }

    /// Returns number of `Vec4` words needed to store given number of entries
    /// (header included).
    pub fn buffer_len(capacity: usize) -> usize {
        Self::HEADER_SIZE + Self::ENTRY_SIZE * capacity
    }

    /// Returns number of valid entries, as written by the host.
    pub fn len(&self) -> u32 {
        self.word(0).x.to_bits()
    }

    pub fn contains(&self, idx: u32) -> bool {
        idx < self.len()
    }

    /// Returns entry at given index.
    ///
    /// Caller must make sure the index is in range (see [`Self::contains()`]);
    /// on the host, out-of-range reads panic.
    pub fn get(&self, idx: u32) -> MirrorPixel {
        let idx = Self::HEADER_SIZE + Self::ENTRY_SIZE * (idx as usize);

        MirrorPixel::unpack([self.word(idx), self.word(idx + 1)])
    }

    #[cfg(target_arch = "spirv")]
    fn word(&self, idx: usize) -> Vec4 {
        unsafe { *self.buffer.index_unchecked(idx) }
    }

    #[cfg(not(target_arch = "spirv"))]
    fn word(&self, idx: usize) -> Vec4 {
        self.buffer[idx]
    }
}
