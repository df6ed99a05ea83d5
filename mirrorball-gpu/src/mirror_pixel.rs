use glam::{uvec2, UVec2, Vec3, Vec4, Vec4Swizzles};

/// A single reflected ray, together with the output pixel it contributes to.
#[derive(Clone, Copy, Default, PartialEq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct MirrorPixel {
    /// Destination pixel in the output image
    pub x: u32,

    /// Destination pixel in the output image
    pub y: u32,

    /// Ray's origin, at the mirror's surface
    pub ray_position1: Vec3,

    /// Second point along the ray; determines ray's direction
    pub ray_position2: Vec3,
}

impl MirrorPixel {
    pub fn new(
        x: u32,
        y: u32,
        ray_position1: Vec3,
        ray_position2: Vec3,
    ) -> Self {
        Self {
            x,
            y,
            ray_position1,
            ray_position2,
        }
    }

    pub fn screen_pos(&self) -> UVec2 {
        uvec2(self.x, self.y)
    }

    /// Returns (non-normalized) direction of this ray.
    pub fn direction(&self) -> Vec3 {
        self.ray_position2 - self.ray_position1
    }

    /// Returns whether both points of the ray are the same, in which case the
    /// ray doesn't have any direction.
    pub fn is_degenerate(&self) -> bool {
        self.ray_position1 == self.ray_position2
    }

    /// Encodes this pixel as two Vec4s; we use this to overcome padding issues
    /// when copying data from CPU into GPU (std430 aligns `vec3` to 16 bytes,
    /// while `#[repr(C)]` with [`Vec3`] doesn't).
    ///
    /// - `d0.xyz` - ray position #1, `d0.w` - (as u32) x
    /// - `d1.xyz` - ray position #2, `d1.w` - (as u32) y
    pub fn pack(&self) -> [Vec4; 2] {
        [
            self.ray_position1.extend(f32::from_bits(self.x)),
            self.ray_position2.extend(f32::from_bits(self.y)),
        ]
    }

    /// See: [`Self::pack()`].
    pub fn unpack([d0, d1]: [Vec4; 2]) -> Self {
        Self {
            x: d0.w.to_bits(),
            y: d1.w.to_bits(),
            ray_position1: d0.xyz(),
            ray_position2: d1.xyz(),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    #[test]
    fn serialization() {
        let target = MirrorPixel::new(
            639,
            0xdeadbeef,
            vec3(1.5, -2.0, 0.25),
            vec3(-8.0, 16.0, 32.5),
        );

        assert_eq!(target, MirrorPixel::unpack(target.pack()));
    }

    #[test]
    fn degenerate() {
        let pos = vec3(1.0, 2.0, 3.0);

        assert!(MirrorPixel::new(0, 0, pos, pos).is_degenerate());
        assert!(!MirrorPixel::new(0, 0, pos, pos * 2.0).is_degenerate());
        assert_eq!(pos, MirrorPixel::new(0, 0, pos, pos * 2.0).direction());
    }
}
