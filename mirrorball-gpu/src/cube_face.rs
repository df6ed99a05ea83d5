use glam::{vec2, vec3, Vec2, Vec3};

/// Face of a cubemap, in the order of cubemap layers (+X, -X, +Y, -Y, +Z, -Z).
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, Hash))]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,

    /// Sentinel returned for vectors without a dominant axis (e.g. a zero
    /// vector or a degenerate ray).
    Undefined,
}

impl CubeFace {
    pub const UNDEFINED_INDEX: u32 = 6;

    /// Returns the face pointed at by the axis of maximum absolute coordinate.
    ///
    /// Ties are broken deterministically: the lowest axis index wins (x, then
    /// y, then z) and - when the sign itself is ambiguous (`-0.0`) - positive
    /// wins over negative.
    ///
    /// Returns [`CubeFace::Undefined`] for zero and non-finite vectors.
    pub fn dominant(v: Vec3) -> Self {
        if !v.is_finite() {
            return Self::Undefined;
        }

        let abs = v.abs();
        let mut axis = 0;
        let mut magnitude = abs.x;
        let mut value = v.x;

        if abs.y > magnitude {
            axis = 1;
            magnitude = abs.y;
            value = v.y;
        }

        if abs.z > magnitude {
            axis = 2;
            magnitude = abs.z;
            value = v.z;
        }

        if magnitude <= 0.0 {
            return Self::Undefined;
        }

        Self::from_axis(axis, value >= 0.0)
    }

    pub fn from_axis(axis: u32, positive: bool) -> Self {
        match (axis, positive) {
            (0, true) => Self::PositiveX,
            (0, false) => Self::NegativeX,
            (1, true) => Self::PositiveY,
            (1, false) => Self::NegativeY,
            (2, true) => Self::PositiveZ,
            (2, false) => Self::NegativeZ,
            _ => Self::Undefined,
        }
    }

    pub fn from_index(idx: u32) -> Self {
        match idx {
            0 => Self::PositiveX,
            1 => Self::NegativeX,
            2 => Self::PositiveY,
            3 => Self::NegativeY,
            4 => Self::PositiveZ,
            5 => Self::NegativeZ,
            _ => Self::Undefined,
        }
    }

    /// Returns cubemap layer of this face (or [`Self::UNDEFINED_INDEX`]).
    pub fn index(self) -> u32 {
        match self {
            Self::PositiveX => 0,
            Self::NegativeX => 1,
            Self::PositiveY => 2,
            Self::NegativeY => 3,
            Self::PositiveZ => 4,
            Self::NegativeZ => 5,
            Self::Undefined => Self::UNDEFINED_INDEX,
        }
    }

    /// Returns axis of this face: 0 for x, 1 for y, 2 for z and 3 for
    /// undefined.
    pub fn axis(self) -> u32 {
        self.index() / 2
    }

    pub fn is_positive(self) -> bool {
        self.is_defined() && self.index() % 2 == 0
    }

    pub fn is_defined(self) -> bool {
        self != Self::Undefined
    }

    /// Returns the outward normal of this face.
    pub fn normal(self) -> Vec3 {
        match self {
            Self::PositiveX => vec3(1.0, 0.0, 0.0),
            Self::NegativeX => vec3(-1.0, 0.0, 0.0),
            Self::PositiveY => vec3(0.0, 1.0, 0.0),
            Self::NegativeY => vec3(0.0, -1.0, 0.0),
            Self::PositiveZ => vec3(0.0, 0.0, 1.0),
            Self::NegativeZ => vec3(0.0, 0.0, -1.0),
            Self::Undefined => Vec3::ZERO,
        }
    }

    /// Projects a direction onto the cube, returning the face it goes through
    /// together with texture coordinates (in `<0.0, 1.0>`) on that face.
    ///
    /// Coordinates follow the usual major-axis table of cubemap lookups, so
    /// that face data laid out for the GPU can be sampled on the host the same
    /// way.
    pub fn project(dir: Vec3) -> (Self, Vec2) {
        let face = Self::dominant(dir);

        let (sc, tc, ma) = match face {
            Self::PositiveX => (-dir.z, -dir.y, dir.x),
            Self::NegativeX => (dir.z, -dir.y, -dir.x),
            Self::PositiveY => (dir.x, dir.z, dir.y),
            Self::NegativeY => (dir.x, -dir.z, -dir.y),
            Self::PositiveZ => (dir.x, -dir.y, dir.z),
            Self::NegativeZ => (-dir.x, -dir.y, -dir.z),
            Self::Undefined => return (face, Vec2::ZERO),
        };

        let uv = (vec2(sc, tc) / ma + 1.0) * 0.5;

        (face, uv.clamp(Vec2::ZERO, Vec2::ONE))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn dominant() {
        assert_eq!(
            CubeFace::PositiveX,
            CubeFace::dominant(vec3(5.0, 1.0, 1.0)),
        );
        assert_eq!(
            CubeFace::NegativeX,
            CubeFace::dominant(vec3(-5.0, 4.9, 1.0)),
        );
        assert_eq!(
            CubeFace::PositiveY,
            CubeFace::dominant(vec3(0.1, 2.0, -1.0)),
        );
        assert_eq!(
            CubeFace::NegativeY,
            CubeFace::dominant(vec3(0.1, -2.0, 1.0)),
        );
        assert_eq!(
            CubeFace::PositiveZ,
            CubeFace::dominant(vec3(0.0, 0.0, 0.5)),
        );
        assert_eq!(
            CubeFace::NegativeZ,
            CubeFace::dominant(vec3(0.3, 0.2, -0.5)),
        );
    }

    #[test]
    fn dominant_ignores_magnitude_of_minor_axes() {
        for minor in [0.0, 0.5, 1.0, 4.0, 4.99] {
            assert_eq!(
                CubeFace::PositiveX,
                CubeFace::dominant(vec3(5.0, minor, -minor)),
            );
        }
    }

    #[test]
    fn dominant_tie_breaks() {
        // x and y tied: lowest axis wins
        assert_eq!(
            CubeFace::PositiveX,
            CubeFace::dominant(vec3(3.0, 3.0, 1.0)),
        );
        assert_eq!(
            CubeFace::NegativeX,
            CubeFace::dominant(vec3(-3.0, 3.0, 1.0)),
        );

        // y and z tied
        assert_eq!(
            CubeFace::NegativeY,
            CubeFace::dominant(vec3(1.0, -3.0, 3.0)),
        );

        // all tied
        assert_eq!(CubeFace::PositiveX, CubeFace::dominant(Vec3::splat(2.0)));
    }

    #[test]
    fn dominant_undefined() {
        assert_eq!(CubeFace::Undefined, CubeFace::dominant(Vec3::ZERO));
        assert_eq!(CubeFace::Undefined, CubeFace::dominant(Vec3::splat(-0.0)));
        assert_eq!(
            CubeFace::Undefined,
            CubeFace::dominant(vec3(f32::NAN, 1.0, 0.0)),
        );
        assert_eq!(
            CubeFace::Undefined,
            CubeFace::dominant(vec3(1.0, f32::INFINITY, 0.0)),
        );
    }

    #[test]
    fn index_roundtrip() {
        for idx in 0..=CubeFace::UNDEFINED_INDEX {
            assert_eq!(idx, CubeFace::from_index(idx).index());
        }

        assert_eq!(CubeFace::Undefined, CubeFace::from_index(123));
        assert_eq!(0, CubeFace::NegativeX.axis());
        assert_eq!(2, CubeFace::PositiveZ.axis());
        assert!(CubeFace::PositiveY.is_positive());
        assert!(!CubeFace::NegativeY.is_positive());
        assert!(!CubeFace::Undefined.is_positive());
    }

    #[test]
    fn normal_points_back_at_face() {
        for idx in 0..6 {
            let face = CubeFace::from_index(idx);

            assert_eq!(face, CubeFace::dominant(face.normal()));
        }
    }

    #[test]
    fn project() {
        for idx in 0..6 {
            let face = CubeFace::from_index(idx);
            let (actual_face, uv) = CubeFace::project(face.normal());

            assert_eq!(face, actual_face);
            assert_relative_eq!(uv.x, 0.5);
            assert_relative_eq!(uv.y, 0.5);
        }

        let (face, uv) = CubeFace::project(vec3(1.0, -0.5, -1.0));

        assert_eq!(CubeFace::PositiveX, face);
        assert_relative_eq!(uv.x, 1.0);
        assert_relative_eq!(uv.y, 0.75);

        let (face, uv) = CubeFace::project(vec3(0.5, 1.0, 0.0));

        assert_eq!(CubeFace::PositiveY, face);
        assert_relative_eq!(uv.x, 0.75);
        assert_relative_eq!(uv.y, 0.5);

        assert_eq!(CubeFace::Undefined, CubeFace::project(Vec3::ZERO).0);
    }
}
