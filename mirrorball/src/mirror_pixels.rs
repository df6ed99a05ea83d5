use std::collections::hash_map::Entry;

use fxhash::FxHashMap;
use spirv_std::glam::{UVec2, Vec4};

use crate::gpu::{MirrorPixel, MirrorPixelsView};
use crate::{Error, Result, StorageBufferable};

/// Host-side mirror pixel buffer, laid out the way [`MirrorPixelsView`]
/// expects it.
#[derive(Clone, Debug)]
pub struct MirrorPixels {
    buffer: Vec<Vec4>,
}

impl MirrorPixels {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buffer =
            Vec::with_capacity(MirrorPixelsView::buffer_len(capacity));

        buffer.push(Vec4::ZERO);

        Self { buffer }
    }

    pub fn push(&mut self, pixel: MirrorPixel) {
        self.buffer.extend(pixel.pack());
        self.sync_header();
    }

    pub fn clear(&mut self) {
        self.buffer.truncate(MirrorPixelsView::HEADER_SIZE);
        self.sync_header();
    }

    pub fn len(&self) -> usize {
        (self.buffer.len() - MirrorPixelsView::HEADER_SIZE)
            / MirrorPixelsView::ENTRY_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: usize) -> Option<MirrorPixel> {
        if idx < self.len() {
            Some(self.view().get(idx as u32))
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = MirrorPixel> + '_ {
        let view = self.view();

        (0..self.len()).map(move |idx| view.get(idx as u32))
    }

    /// Returns the raw buffer, header included.
    pub fn as_words(&self) -> &[Vec4] {
        &self.buffer
    }

    /// Checks whether these pixels can be dispatched into an image of given
    /// size: they must fit the buffer, stay within the image and each of them
    /// must target a different texel.
    pub fn validate(&self, capacity: usize, size: UVec2) -> Result<()> {
        if self.len() > capacity {
            return Err(Error::PixelBufferOverflow {
                len: self.len(),
                capacity,
            });
        }

        let mut seen = FxHashMap::default();

        for (idx, pixel) in self.iter().enumerate() {
            if pixel.x >= size.x || pixel.y >= size.y {
                return Err(Error::PixelOutOfBounds {
                    idx,
                    x: pixel.x,
                    y: pixel.y,
                    width: size.x,
                    height: size.y,
                });
            }

            match seen.entry((pixel.x, pixel.y)) {
                Entry::Occupied(entry) => {
                    return Err(Error::PixelCollision {
                        x: pixel.x,
                        y: pixel.y,
                        first: *entry.get(),
                        second: idx,
                    });
                }

                Entry::Vacant(entry) => {
                    entry.insert(idx);
                }
            }
        }

        Ok(())
    }

    fn view(&self) -> MirrorPixelsView<'_> {
        MirrorPixelsView::new(&self.buffer)
    }

    fn sync_header(&mut self) {
        self.buffer[0].x = f32::from_bits(self.len() as u32);
    }
}

impl Default for MirrorPixels {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl FromIterator<MirrorPixel> for MirrorPixels {
    fn from_iter<T: IntoIterator<Item = MirrorPixel>>(iter: T) -> Self {
        let mut this = Self::default();

        for pixel in iter {
            this.push(pixel);
        }

        this
    }
}

impl StorageBufferable for MirrorPixels {
    fn data(&self) -> &[u8] {
        bytemuck::cast_slice(&self.buffer)
    }
}
