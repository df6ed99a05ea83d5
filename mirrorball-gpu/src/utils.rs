use glam::{vec3, Vec3, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;
use spirv_std::{Image, Sampler};

use crate::CubemapSampler;

pub type TexRgba32<'a> = &'a Image!(2D, format = rgba32f, sampled = false);
pub type TexCube<'a> = &'a Image!(cube, type = f32, sampled);

/// Cube texture bound to the compositor, together with its sampler.
#[derive(Clone, Copy)]
pub struct EnvironmentMap<'a> {
    tex: TexCube<'a>,
    sampler: &'a Sampler,
}

impl<'a> EnvironmentMap<'a> {
    pub fn new(tex: TexCube<'a>, sampler: &'a Sampler) -> Self {
        Self { tex, sampler }
    }
}

impl CubemapSampler for EnvironmentMap<'_> {
    fn sample(&self, dir: Vec3) -> Vec4 {
        self.tex.sample_by_lod(*self.sampler, dir, 0.0)
    }
}

/// Builds an orthonormal basis around given normal.
///
/// Thanks to Frisvad - "Building an Orthonormal Basis from a 3D Unit Vector
/// Without Normalization".
pub fn orthonormal_basis(normal: Vec3) -> (Vec3, Vec3) {
    if normal.z < -0.9999999 {
        return (vec3(0.0, -1.0, 0.0), vec3(-1.0, 0.0, 0.0));
    }

    let a = 1.0 / (1.0 + normal.z);
    let b = -normal.x * normal.y * a;

    let t = vec3(1.0 - normal.x * normal.x * a, b, -normal.x);
    let bt = vec3(b, 1.0 - normal.y * normal.y * a, -normal.y);

    (t, bt)
}

/// Returns `idx`-th point (out of `count`) of a golden-angle spiral spanning a
/// disk of given radius.
pub fn spiral_offset(idx: u32, count: u32, radius: f32) -> (f32, f32) {
    let r = radius * ((idx as f32 + 0.5) / (count as f32)).sqrt();
    let angle = (idx as f32) * crate::GOLDEN_ANGLE;

    (r * angle.cos(), r * angle.sin())
}
