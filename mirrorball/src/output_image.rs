use std::path::Path;

use spirv_std::glam::{UVec2, Vec4};

use crate::{debug, utils, Bindable, Result, StorageTexture};

/// Image the compositor writes mirror pixels into.
///
/// The kernel only ever writes the texels targeted by mirror pixels, so the
/// rest keeps whatever was there before; use [`Self::clear()`] to start from
/// scratch.
#[derive(Debug)]
pub struct OutputImage {
    tex: StorageTexture,
}

impl OutputImage {
    pub fn new(device: &wgpu::Device, size: UVec2) -> Self {
        Self {
            tex: StorageTexture::new(device, "mirrorball_output", size),
        }
    }

    pub fn size(&self) -> UVec2 {
        self.tex.size()
    }

    /// Fills the image with transparent black.
    pub fn clear(&self, queue: &wgpu::Queue) {
        let size = self.size();
        let texels = vec![Vec4::ZERO; (size.x * size.y) as usize];

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: self.tex.tex(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&texels),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(size.x * StorageTexture::TEXEL_SIZE),
                rows_per_image: Some(size.y),
            },
            wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Reads the image back, row by row; blocks until the GPU is done with
    /// all of the work submitted so far.
    pub fn read(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<Vec4>> {
        let bytes = utils::measure("output_image.read", || {
            utils::read_texture(
                device,
                queue,
                self.tex.tex(),
                self.size(),
                StorageTexture::TEXEL_SIZE,
            )
        })?;

        let texels = bytes
            .chunks_exact(StorageTexture::TEXEL_SIZE as usize)
            .map(bytemuck::pod_read_unaligned)
            .collect();

        Ok(texels)
    }

    pub fn save_png(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let texels = self.read(device, queue)?;

        debug::save_texels_png(path, self.size(), &texels)
    }

    pub fn bind_writable(&self) -> impl Bindable + '_ {
        self.tex.bind_writable()
    }
}
