use log::debug;
use spirv_std::glam::Vec4;

use crate::cpu::CpuCubemap;
use crate::gpu::CubeFace;
use crate::{Error, Result, StorageTexture};

/// Environment cubemap, sampled by the compositor.
///
/// Stored as a 2D texture with six layers (in the [`CubeFace`] order) and
/// bound through a cube view.
#[derive(Debug)]
pub struct Cubemap {
    label: String,
    tex: wgpu::Texture,
    tex_view: wgpu::TextureView,
    size: u32,
}

impl Cubemap {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: u32,
    ) -> Self {
        let label = label.as_ref();

        debug!("Allocating cubemap `{label}`; size={size}");

        assert!(size > 0);

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label}_tex")),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let tex_view = tex.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label}_tex_view")),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            array_layer_count: Some(6),
            ..Default::default()
        });

        Self {
            label: label.to_string(),
            tex,
            tex_view,
            size,
        }
    }

    /// Creates a cubemap and uploads faces of given host-side cubemap into
    /// it.
    pub fn from_cpu(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: impl AsRef<str>,
        cubemap: &CpuCubemap,
    ) -> Self {
        let this = Self::new(device, label, cubemap.size());

        for idx in 0..6 {
            let face = CubeFace::from_index(idx);

            this.upload_face(queue, face, cubemap.face(face));
        }

        this
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns width (and height) of each face, in texels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Uploads texels of given face, row by row.
    pub fn write_face(
        &self,
        queue: &wgpu::Queue,
        face: CubeFace,
        texels: &[Vec4],
    ) -> Result<()> {
        assert!(face.is_defined());

        if texels.len() != (self.size * self.size) as usize {
            return Err(Error::CubemapSizeMismatch {
                label: self.label.clone(),
                face,
                size: self.size,
                actual: texels.len(),
            });
        }

        self.upload_face(queue, face, texels);

        Ok(())
    }

    fn upload_face(
        &self,
        queue: &wgpu::Queue,
        face: CubeFace,
        texels: &[Vec4],
    ) {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.tex,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: face.index(),
                },
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(texels),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(self.size * StorageTexture::TEXEL_SIZE),
                rows_per_image: Some(self.size),
            },
            wgpu::Extent3d {
                width: self.size,
                height: self.size,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Returns binding of this cubemap's cube view, as sampled by the
    /// compositor.
    pub(crate) fn bind_entry(
        &self,
        binding: u32,
    ) -> (wgpu::BindGroupLayoutEntry, wgpu::BindingResource<'_>) {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::Cube,
                sample_type: wgpu::TextureSampleType::Float {
                    filterable: false,
                },
            },
            count: None,
        };

        let resource = wgpu::BindingResource::TextureView(&self.tex_view);

        (layout, resource)
    }
}
