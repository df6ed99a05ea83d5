use bytemuck::{Pod, Zeroable};
use glam::{vec4, Vec3, Vec4, Vec4Swizzles};

use crate::BlendMode;

/// Per-dispatch parameters of the compositor kernel, passed as push
/// constants.
#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct MirrorPassParams {
    /// Color written for degenerate rays
    pub sentinel_color: Vec4,

    /// x - weight of accumulation cubemap #0
    /// y - weight of accumulation cubemap #1
    /// z - weight of accumulation cubemap #2
    /// w - weight of accumulation cubemap #3
    pub accumulation_weights: Vec4,

    /// xyz - reference origin of the environment
    /// w - weight of the primary cubemap
    pub origin: Vec4,

    /// x - (as u32) grid width, in workgroups
    /// y - (as u32) number of accumulation cubemaps to sample
    /// z - (as u32) blend mode | flags << 8
    /// w - seam radius
    pub payload: Vec4,
}

impl MirrorPassParams {
    /// Writes per-pixel tags into the diagnostic log.
    pub const FLAG_DIAGNOSTICS: u32 = 1;

    pub fn encode_payload(
        grid_width: u32,
        accumulation_count: u32,
        blend_mode: BlendMode,
        flags: u32,
        seam_radius: f32,
    ) -> Vec4 {
        vec4(
            f32::from_bits(grid_width),
            f32::from_bits(accumulation_count),
            f32::from_bits(blend_mode.serialize() | (flags << 8)),
            seam_radius,
        )
    }

    pub fn origin(&self) -> Vec3 {
        self.origin.xyz()
    }

    pub fn primary_weight(&self) -> f32 {
        self.origin.w
    }

    pub fn accumulation_weight(&self, idx: u32) -> f32 {
        match idx {
            0 => self.accumulation_weights.x,
            1 => self.accumulation_weights.y,
            2 => self.accumulation_weights.z,
            3 => self.accumulation_weights.w,
            _ => 0.0,
        }
    }

    pub fn grid_width(&self) -> u32 {
        self.payload.x.to_bits()
    }

    pub fn accumulation_count(&self) -> u32 {
        self.payload.y.to_bits()
    }

    pub fn blend_mode(&self) -> BlendMode {
        BlendMode::deserialize(self.payload.z.to_bits() & 0xff)
    }

    pub fn flags(&self) -> u32 {
        self.payload.z.to_bits() >> 8
    }

    pub fn diagnostics_enabled(&self) -> bool {
        self.flags() & Self::FLAG_DIAGNOSTICS > 0
    }

    pub fn seam_radius(&self) -> f32 {
        self.payload.w
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    #[test]
    fn accessors() {
        let target = MirrorPassParams {
            sentinel_color: vec4(1.0, 0.0, 1.0, 1.0),
            accumulation_weights: vec4(0.1, 0.2, 0.3, 0.4),
            origin: vec3(1.0, 2.0, 3.0).extend(0.5),
            payload: MirrorPassParams::encode_payload(
                65535,
                3,
                BlendMode::AlphaOver,
                MirrorPassParams::FLAG_DIAGNOSTICS,
                0.05,
            ),
        };

        assert_eq!(vec3(1.0, 2.0, 3.0), target.origin());
        assert_eq!(0.5, target.primary_weight());
        assert_eq!(0.3, target.accumulation_weight(2));
        assert_eq!(0.0, target.accumulation_weight(4));
        assert_eq!(65535, target.grid_width());
        assert_eq!(3, target.accumulation_count());
        assert_eq!(BlendMode::AlphaOver, target.blend_mode());
        assert!(target.diagnostics_enabled());
        assert_eq!(0.05, target.seam_radius());
    }

    #[test]
    fn diagnostics_disabled() {
        let target = MirrorPassParams {
            payload: MirrorPassParams::encode_payload(
                1,
                0,
                BlendMode::NearestWins,
                0,
                0.0,
            ),
            ..Default::default()
        };

        assert_eq!(BlendMode::NearestWins, target.blend_mode());
        assert!(!target.diagnostics_enabled());
    }
}
