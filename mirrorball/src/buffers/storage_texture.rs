use log::debug;
use spirv_std::glam::UVec2;

use crate::Bindable;

/// 2D texture written by compute shaders and read back on the host.
#[derive(Debug)]
pub struct StorageTexture {
    tex: wgpu::Texture,
    tex_view: wgpu::TextureView,
    size: UVec2,
}

impl StorageTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

    /// Size of a single texel, in bytes.
    pub const TEXEL_SIZE: u32 = 16;

    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: UVec2,
    ) -> Self {
        let label = label.as_ref();

        debug!("Allocating texture `{label}`; size={size:?}");

        assert!(size.x > 0);
        assert!(size.y > 0);

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label}_tex")),
            size: wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let tex_view = tex.create_view(&Default::default());

        Self {
            tex,
            tex_view,
            size,
        }
    }

    pub fn tex(&self) -> &wgpu::Texture {
        &self.tex
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn bind_writable(&self) -> impl Bindable + '_ {
        WritableStorageTexture { parent: self }
    }
}

pub struct WritableStorageTexture<'a> {
    parent: &'a StorageTexture,
}

impl Bindable for WritableStorageTexture<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let tex_layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::StorageTexture {
                // TODO should say `WriteOnly`, but rust-gpu doesn't emit the
                //      `NonReadable` decoration, so the shader's image ends up
                //      being read-write from wgpu's point of view
                access: wgpu::StorageTextureAccess::ReadWrite,
                format: StorageTexture::FORMAT,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        };

        let tex_resource =
            wgpu::BindingResource::TextureView(&self.parent.tex_view);

        vec![(tex_layout, tex_resource)]
    }
}
