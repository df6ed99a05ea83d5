use std::mem;
use std::path::PathBuf;

use derivative::Derivative;
use spirv_std::glam::{vec4, UVec2, Vec3, Vec4};

use crate::gpu::{
    self, BlendMode, MirrorPassParams, MAX_ACCUMULATION_CUBEMAPS,
    MIRROR_LANES,
};
use crate::{Error, Result};

/// Where to take the compositor's SPIR-V from.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub enum ShaderSource {
    /// Module compiled by the build script; available only with the
    /// `embedded-shaders` feature
    Embedded,

    /// Module loaded from a `.spv` file at runtime
    Path(PathBuf),

    /// Module provided by the caller
    Spirv(#[derivative(Debug = "ignore")] Vec<u32>),
}

impl Default for ShaderSource {
    #[cfg(feature = "embedded-shaders")]
    fn default() -> Self {
        Self::Embedded
    }

    #[cfg(not(feature = "embedded-shaders"))]
    fn default() -> Self {
        Self::Path(PathBuf::from("mirror_compose.spv"))
    }
}

#[derive(Clone, Debug)]
pub struct CompositorConfig {
    /// Size of the output image, in pixels
    pub output_size: UVec2,

    /// Maximum number of mirror pixels handled by a single dispatch
    pub pixel_capacity: usize,

    /// Number of accumulation cubemaps sampled next to the primary one
    pub accumulation_count: usize,

    pub blend_mode: BlendMode,
    pub primary_weight: f32,
    pub accumulation_weights: [f32; MAX_ACCUMULATION_CUBEMAPS],

    /// Color written for degenerate rays
    pub sentinel_color: Vec4,

    /// Radius of the spiral sampled around rays crossing a cube's edge; zero
    /// disables smoothing
    pub seam_radius: f32,

    /// Center of the cube the rays are classified against
    pub origin: Vec3,

    /// Number of texture units the pipeline may occupy
    pub texture_unit_budget: u32,

    /// Whether the kernel should tag each mirror pixel with its sampling
    /// strategy
    pub diagnostics: bool,

    /// Maximum number of diagnostic entries printed into the log per readout
    pub diagnostics_print_limit: usize,

    pub shader: ShaderSource,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            output_size: UVec2::new(640, 480),
            pixel_capacity: 640 * 480,
            accumulation_count: 0,
            blend_mode: BlendMode::default(),
            primary_weight: 1.0,
            accumulation_weights: [1.0; MAX_ACCUMULATION_CUBEMAPS],
            sentinel_color: vec4(1.0, 0.0, 1.0, 1.0),
            seam_radius: 0.05,
            origin: Vec3::ZERO,
            texture_unit_budget: 8,
            diagnostics: false,
            diagnostics_print_limit: 20,
            shader: ShaderSource::default(),
        }
    }
}

impl CompositorConfig {
    pub fn with_output_size(mut self, output_size: UVec2) -> Self {
        self.output_size = output_size;
        self
    }

    pub fn with_pixel_capacity(mut self, pixel_capacity: usize) -> Self {
        self.pixel_capacity = pixel_capacity;
        self
    }

    pub fn with_accumulation_count(mut self, count: usize) -> Self {
        self.accumulation_count = count;
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    pub fn with_weights(
        mut self,
        primary_weight: f32,
        accumulation_weights: [f32; MAX_ACCUMULATION_CUBEMAPS],
    ) -> Self {
        self.primary_weight = primary_weight;
        self.accumulation_weights = accumulation_weights;
        self
    }

    pub fn with_sentinel_color(mut self, sentinel_color: Vec4) -> Self {
        self.sentinel_color = sentinel_color;
        self
    }

    pub fn with_seam_radius(mut self, seam_radius: f32) -> Self {
        self.seam_radius = seam_radius;
        self
    }

    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_texture_unit_budget(mut self, budget: u32) -> Self {
        self.texture_unit_budget = budget;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_shader(mut self, shader: ShaderSource) -> Self {
        self.shader = shader;
        self
    }

    /// Returns number of texture units occupied by the pipeline: the output
    /// image plus every cube slot of the bank.
    ///
    /// Slots past `accumulation_count` are still bound (to a placeholder), so
    /// the count doesn't depend on how many layers actually get sampled.
    pub fn texture_units(&self) -> u32 {
        1 + gpu::CUBEMAP_BANK_CAPACITY as u32
    }

    /// Checks whether this configuration can be hosted by a device with given
    /// limits.
    pub fn validate(&self, limits: &wgpu::Limits) -> Result<()> {
        if self.accumulation_count > MAX_ACCUMULATION_CUBEMAPS {
            return Err(Error::TooManyAccumulationCubemaps {
                requested: self.accumulation_count,
                max: MAX_ACCUMULATION_CUBEMAPS,
            });
        }

        if self.texture_units() > self.texture_unit_budget {
            return Err(Error::TextureBudgetExceeded {
                required: self.texture_units(),
                budget: self.texture_unit_budget,
            });
        }

        let pixels_size =
            gpu::MirrorPixelsView::buffer_len(self.pixel_capacity)
                * mem::size_of::<Vec4>();

        let checks = [
            ("max_bind_groups", 2, limits.max_bind_groups),
            (
                "max_push_constant_size",
                mem::size_of::<MirrorPassParams>() as u32,
                limits.max_push_constant_size,
            ),
            (
                "max_sampled_textures_per_shader_stage",
                gpu::CUBEMAP_BANK_CAPACITY as u32,
                limits.max_sampled_textures_per_shader_stage,
            ),
            (
                "max_storage_textures_per_shader_stage",
                1,
                limits.max_storage_textures_per_shader_stage,
            ),
            (
                "max_storage_buffers_per_shader_stage",
                2,
                limits.max_storage_buffers_per_shader_stage,
            ),
            (
                "max_compute_workgroup_size_y",
                MIRROR_LANES as u32,
                limits.max_compute_workgroup_size_y,
            ),
            (
                "max_compute_invocations_per_workgroup",
                MIRROR_LANES as u32,
                limits.max_compute_invocations_per_workgroup,
            ),
            (
                "max_texture_dimension_2d",
                self.output_size.max_element(),
                limits.max_texture_dimension_2d,
            ),
        ];

        for (limit, required, actual) in checks {
            if actual < required {
                return Err(Error::DeviceLimit {
                    limit,
                    required: required as u64,
                    actual: actual as u64,
                });
            }
        }

        if (limits.max_storage_buffer_binding_size as usize) < pixels_size {
            return Err(Error::DeviceLimit {
                limit: "max_storage_buffer_binding_size",
                required: pixels_size as u64,
                actual: limits.max_storage_buffer_binding_size as u64,
            });
        }

        Ok(())
    }

    /// Builds kernel's parameters for a dispatch folded to given width.
    pub fn pass_params(&self, grid_width: u32) -> MirrorPassParams {
        let flags = if self.diagnostics {
            MirrorPassParams::FLAG_DIAGNOSTICS
        } else {
            0
        };

        let [w0, w1, w2, w3] = self.accumulation_weights;

        MirrorPassParams {
            sentinel_color: self.sentinel_color,
            accumulation_weights: vec4(w0, w1, w2, w3),
            origin: self.origin.extend(self.primary_weight),
            payload: MirrorPassParams::encode_payload(
                grid_width,
                self.accumulation_count as u32,
                self.blend_mode,
                flags,
                self.seam_radius,
            ),
        }
    }

    /// Returns a one-line summary of this configuration.
    pub fn describe(&self) -> String {
        format!(
            "output={}x{}, capacity={}, accumulation={}, blend={:?}, \
             seam_radius={}, texture_units={}/{}, diagnostics={}",
            self.output_size.x,
            self.output_size.y,
            self.pixel_capacity,
            self.accumulation_count,
            self.blend_mode,
            self.seam_radius,
            self.texture_units(),
            self.texture_unit_budget,
            if self.diagnostics { "on" } else { "off" },
        )
    }
}
