use glam::Vec3;

use crate::{CubeFace, MirrorPixel};

/// How the kernel should sample the cubemap bank for a given ray.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub enum SamplingStrategy {
    /// Ray has no direction; kernel writes the sentinel color.
    Undefined,

    /// Ray stays within a single face; one sample is enough.
    SingleFace,

    /// Ray leaves the origin's face through a cube's edge or corner; kernel
    /// spreads samples around the direction to hide the seam.
    EdgeCrossing,
}

#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct ResolvedRay {
    /// Dominant face of the ray's origin, relative to the reference origin
    pub origin_face: CubeFace,

    /// Dominant face of the ray's direction
    pub direction_face: CubeFace,

    /// Normalized direction (zero for degenerate rays)
    pub direction: Vec3,

    pub strategy: SamplingStrategy,
}

impl ResolvedRay {
    /// Classifies ray going from `ray_position1` through `ray_position2`
    /// against a unit cube centered at `origin`.
    pub fn resolve(
        origin: Vec3,
        ray_position1: Vec3,
        ray_position2: Vec3,
    ) -> Self {
        let direction = Self::difference(ray_position1, ray_position2);
        let direction_face = CubeFace::dominant(direction);
        let origin_face =
            CubeFace::dominant(Self::difference(origin, ray_position1));

        if direction_face.is_defined() {
            let direction = Self::normalize(direction);

            if direction.is_finite() {
                let strategy = if !origin_face.is_defined()
                    || origin_face == direction_face
                {
                    SamplingStrategy::SingleFace
                } else {
                    SamplingStrategy::EdgeCrossing
                };

                return Self {
                    origin_face,
                    direction_face,
                    direction,
                    strategy,
                };
            }
        }

        Self {
            origin_face,
            direction_face,
            direction: Vec3::ZERO,
            strategy: SamplingStrategy::Undefined,
        }
    }

    /// Returns `to - from`; when the points are far enough apart for the
    /// difference to overflow, returns it scaled down instead (the direction
    /// is preserved).
    fn difference(from: Vec3, to: Vec3) -> Vec3 {
        let diff = to - from;

        if diff.is_finite() {
            return diff;
        }

        let scale = from.abs().max_element().max(to.abs().max_element());

        to / scale - from / scale
    }

    /// Normalizes a vector of any finite, non-zero magnitude.
    ///
    /// Dividing by the dominant component first keeps `length()` from
    /// underflowing (for tiny vectors) or overflowing (for huge ones).
    fn normalize(v: Vec3) -> Vec3 {
        (v / v.abs().max_element()).normalize()
    }

    pub fn for_pixel(origin: Vec3, pixel: MirrorPixel) -> Self {
        Self::resolve(origin, pixel.ray_position1, pixel.ray_position2)
    }

    pub fn is_degenerate(&self) -> bool {
        self.strategy == SamplingStrategy::Undefined
    }
}
