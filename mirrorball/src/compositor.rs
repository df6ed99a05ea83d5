use std::mem;

use log::{debug, info};
use spirv_std::glam::Vec4;

use crate::gpu::{BlendMode, DiagnosticTag, MirrorPixelsView};
use crate::{
    utils, CompositorConfig, ComputePass, CubemapBank, DispatchGrid,
    MappedStorageBuffer, MirrorPixels, OutputImage, Result, Shaders,
    UnmappedStorageBuffer,
};

/// Owns the compositor's resources and records its dispatches.
///
/// Usual frame looks like:
///
/// - fill [`Self::pixels_mut()`],
/// - [`Self::flush()`] them into VRAM,
/// - [`Self::dispatch()`] into an encoder and submit it,
/// - read the image through [`Self::output()`].
#[derive(Debug)]
pub struct MirrorCompositor {
    config: CompositorConfig,
    max_workgroups_per_dim: u32,
    shaders: Shaders,
    pixels: MappedStorageBuffer<MirrorPixels>,
    diagnostics: UnmappedStorageBuffer,
    bank: CubemapBank,
    output: OutputImage,
    pass: ComputePass,
}

impl MirrorCompositor {
    pub fn new(
        device: &wgpu::Device,
        config: CompositorConfig,
        bank: CubemapBank,
    ) -> Result<Self> {
        info!("Initializing compositor: {}", config.describe());

        let limits = device.limits();

        config.validate(&limits)?;
        bank.check(config.accumulation_count)?;

        let shaders = Shaders::new(device, &config.shader)?;

        let pixels = MappedStorageBuffer::new(
            device,
            "mirrorball_pixels",
            MirrorPixelsView::buffer_len(config.pixel_capacity)
                * mem::size_of::<Vec4>(),
            MirrorPixels::with_capacity(config.pixel_capacity),
        );

        let diagnostics = UnmappedStorageBuffer::new(
            device,
            "mirrorball_diagnostics",
            config.pixel_capacity.max(1) * mem::size_of::<u32>(),
        );

        let output = OutputImage::new(device, config.output_size);

        let pass = Self::build_pass(
            device,
            &shaders,
            &pixels,
            &diagnostics,
            &bank,
            &output,
        );

        Ok(Self {
            config,
            max_workgroups_per_dim: limits.max_compute_workgroups_per_dimension,
            shaders,
            pixels,
            diagnostics,
            bank,
            output,
            pass,
        })
    }

    fn build_pass(
        device: &wgpu::Device,
        shaders: &Shaders,
        pixels: &MappedStorageBuffer<MirrorPixels>,
        diagnostics: &UnmappedStorageBuffer,
        bank: &CubemapBank,
        output: &OutputImage,
    ) -> ComputePass {
        ComputePass::builder("mirror_compose")
            .bind([&output.bind_writable(), pixels, bank])
            .bind([&diagnostics.bind_writable()])
            .build(device, &shaders.mirror_compose)
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn bank(&self) -> &CubemapBank {
        &self.bank
    }

    pub fn output(&self) -> &OutputImage {
        &self.output
    }

    pub fn pixels(&self) -> &MirrorPixels {
        &self.pixels
    }

    /// Returns pixels for modification; they have to be flushed afterwards.
    pub fn pixels_mut(&mut self) -> &mut MirrorPixels {
        &mut self.pixels
    }

    /// Validates the pixels and uploads them into VRAM (if they've changed
    /// since the last flush).
    pub fn flush(&mut self, queue: &wgpu::Queue) -> Result<()> {
        if !self.pixels.is_dirty() {
            return Ok(());
        }

        self.pixels
            .validate(self.config.pixel_capacity, self.config.output_size)?;

        utils::measure("flush", || self.pixels.flush(queue));

        Ok(())
    }

    /// Records the compositor's dispatch, one workgroup per mirror pixel.
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder) {
        assert!(
            !self.pixels.is_dirty(),
            "mirror pixels have to be flushed before dispatching"
        );

        let pixels = self.pixels.len() as u32;
        let grid =
            DispatchGrid::for_pixels(pixels, self.max_workgroups_per_dim);

        debug!("Dispatching compositor; pixels={pixels}, grid={grid:?}");

        if self.config.diagnostics {
            self.diagnostics.clear(encoder);
        }

        utils::measure(format_args!("dispatch ({pixels} pixels)"), || {
            self.pass
                .run(encoder, grid, self.config.pass_params(grid.width));
        });
    }

    /// Flushes the pixels, dispatches the compositor and submits the work.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<()> {
        self.flush(queue)?;

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("mirrorball_render"),
            });

        self.dispatch(&mut encoder);
        queue.submit([encoder.finish()]);

        Ok(())
    }

    /// Reads the diagnostic log of the last dispatch, one tag per mirror
    /// pixel; the first few tags get printed into the log as well.
    ///
    /// Without diagnostics enabled, the log is never written.
    pub fn read_diagnostics(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<DiagnosticTag>> {
        let bytes =
            utils::read_buffer(device, queue, self.diagnostics.buffer())?;

        let tags: Vec<_> = bytes
            .chunks_exact(mem::size_of::<u32>())
            .take(self.pixels.len())
            .map(|tag| {
                DiagnosticTag::deserialize(bytemuck::pod_read_unaligned(tag))
            })
            .collect();

        let limit = self.config.diagnostics_print_limit;

        for (idx, tag) in tags.iter().enumerate().take(limit) {
            debug!("Mirror pixel #{idx}: {tag:?}");
        }

        if tags.len() > limit {
            debug!("... and {} more", tags.len() - limit);
        }

        Ok(tags)
    }

    /// Replaces the cubemaps; the pipeline gets rebound to the new ones.
    pub fn set_bank(
        &mut self,
        device: &wgpu::Device,
        bank: CubemapBank,
    ) -> Result<()> {
        bank.check(self.config.accumulation_count)?;

        self.bank = bank;

        self.pass = Self::build_pass(
            device,
            &self.shaders,
            &self.pixels,
            &self.diagnostics,
            &self.bank,
            &self.output,
        );

        Ok(())
    }

    /// Changes how many accumulation cubemaps get sampled, starting with the
    /// next dispatch.
    pub fn set_accumulation_count(
        &mut self,
        device: &wgpu::Device,
        count: usize,
    ) -> Result<()> {
        let config = self.config.clone().with_accumulation_count(count);

        config.validate(&device.limits())?;
        self.bank.check(count)?;
        self.config = config;

        Ok(())
    }

    pub fn set_blend_mode(&mut self, blend_mode: BlendMode) {
        self.config.blend_mode = blend_mode;
    }
}
