use log::debug;

use crate::gpu::{CUBEMAP_BANK_CAPACITY, MAX_ACCUMULATION_CUBEMAPS};
use crate::{Bindable, Cubemap, Error, Result};

/// Cubemaps sampled by the compositor: the primary one plus up to
/// [`MAX_ACCUMULATION_CUBEMAPS`] accumulation ones.
///
/// Since the pipeline's layout has a fixed number of slots, the empty ones get
/// filled with a tiny transparent placeholder; the kernel never samples them
/// anyway, because it looks only at the first `accumulation_count` slots.
#[derive(Debug)]
pub struct CubemapBank {
    primary: Cubemap,
    accumulation: Vec<Cubemap>,
    placeholder: Cubemap,
    sampler: wgpu::Sampler,
}

impl CubemapBank {
    pub fn new(device: &wgpu::Device, primary: Cubemap) -> Self {
        debug!("Creating cubemap bank; primary={}", primary.label());

        let placeholder = Cubemap::new(device, "cubemap_placeholder", 1);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mirrorball_cubemap_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            primary,
            accumulation: Vec::new(),
            placeholder,
            sampler,
        }
    }

    pub fn with_accumulation(mut self, cubemap: Cubemap) -> Result<Self> {
        self.push_accumulation(cubemap)?;

        Ok(self)
    }

    pub fn push_accumulation(&mut self, cubemap: Cubemap) -> Result<()> {
        if self.accumulation.len() >= MAX_ACCUMULATION_CUBEMAPS {
            return Err(Error::TooManyAccumulationCubemaps {
                requested: self.accumulation.len() + 1,
                max: MAX_ACCUMULATION_CUBEMAPS,
            });
        }

        debug!(
            "Binding accumulation cubemap #{}: {}",
            self.accumulation.len(),
            cubemap.label()
        );

        self.accumulation.push(cubemap);

        Ok(())
    }

    pub fn primary(&self) -> &Cubemap {
        &self.primary
    }

    pub fn accumulation(&self) -> &[Cubemap] {
        &self.accumulation
    }

    /// Makes sure the kernel has got something to sample for each of the
    /// first `accumulation_count` accumulation slots.
    pub fn check(&self, accumulation_count: usize) -> Result<()> {
        if accumulation_count > MAX_ACCUMULATION_CUBEMAPS {
            return Err(Error::TooManyAccumulationCubemaps {
                requested: accumulation_count,
                max: MAX_ACCUMULATION_CUBEMAPS,
            });
        }

        if self.accumulation.len() < accumulation_count {
            return Err(Error::BindingMismatch {
                expected: accumulation_count,
                actual: self.accumulation.len(),
            });
        }

        Ok(())
    }

    fn slots(&self) -> impl Iterator<Item = &Cubemap> {
        let accumulation = (0..MAX_ACCUMULATION_CUBEMAPS).map(|idx| {
            self.accumulation.get(idx).unwrap_or(&self.placeholder)
        });

        [&self.primary].into_iter().chain(accumulation)
    }
}

impl Bindable for CubemapBank {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let mut entries: Vec<_> = self
            .slots()
            .enumerate()
            .map(|(idx, cubemap)| cubemap.bind_entry(binding + idx as u32))
            .collect();

        let sampler_layout = wgpu::BindGroupLayoutEntry {
            binding: binding + CUBEMAP_BANK_CAPACITY as u32,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Sampler(
                wgpu::SamplerBindingType::NonFiltering,
            ),
            count: None,
        };

        let sampler_resource = wgpu::BindingResource::Sampler(&self.sampler);

        entries.push((sampler_layout, sampler_resource));
        entries
    }
}
