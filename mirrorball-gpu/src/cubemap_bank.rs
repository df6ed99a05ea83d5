use glam::{Vec3, Vec4};

use crate::{BlendAccumulator, MirrorPassParams, MAX_ACCUMULATION_CUBEMAPS};

/// Something that can be looked up by a direction - a GPU cube texture, or a
/// host-side reference cubemap.
pub trait CubemapSampler {
    fn sample(&self, dir: Vec3) -> Vec4;
}

/// Primary cubemap together with the accumulation ones.
///
/// Slots are kept as separate fields (instead of an array) since each one is
/// bound to a separate descriptor; slots past `accumulation_count` are never
/// sampled.
pub struct CubemapBank<S> {
    pub primary: S,
    pub accumulation0: S,
    pub accumulation1: S,
    pub accumulation2: S,
    pub accumulation3: S,
}

impl<S> CubemapBank<S>
where
    S: CubemapSampler,
{
    pub fn new(
        primary: S,
        accumulation0: S,
        accumulation1: S,
        accumulation2: S,
        accumulation3: S,
    ) -> Self {
        Self {
            primary,
            accumulation0,
            accumulation1,
            accumulation2,
            accumulation3,
        }
    }

    /// Samples accumulation cubemap at given index (`0..4`).
    pub fn sample_accumulation(&self, idx: u32, dir: Vec3) -> Vec4 {
        match idx {
            0 => self.accumulation0.sample(dir),
            1 => self.accumulation1.sample(dir),
            2 => self.accumulation2.sample(dir),
            3 => self.accumulation3.sample(dir),
            _ => Vec4::ZERO,
        }
    }

    /// Samples all active layers along given direction and blends them
    /// according to the pass' blend mode.
    pub fn sample(&self, dir: Vec3, params: &MirrorPassParams) -> Vec4 {
        let mut blend = BlendAccumulator::new(
            params.blend_mode(),
            self.primary.sample(dir),
            params.primary_weight(),
        );

        let count = params
            .accumulation_count()
            .min(MAX_ACCUMULATION_CUBEMAPS as u32);

        let mut idx = 0;

        while idx < count {
            blend.push(
                self.sample_accumulation(idx, dir),
                params.accumulation_weight(idx),
            );

            idx += 1;
        }

        blend.finish()
    }
}
