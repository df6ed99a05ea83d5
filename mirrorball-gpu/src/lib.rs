//! Common structs, algorithms etc. used by Mirrorball's shaders and host.
//!
//! Everything in here compiles both for `spirv-unknown-*` (where it becomes a
//! part of the compositor kernel) and for the host (where the same code backs
//! the CPU reference dispatcher and the tests).

#![cfg_attr(target_arch = "spirv", no_std)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]

mod blend;
mod cube_face;
mod cubemap_bank;
mod diagnostics;
mod kernel;
mod mirror_pixel;
mod mirror_pixels;
mod passes;
mod ray_resolver;
mod utils;

pub use self::blend::*;
pub use self::cube_face::*;
pub use self::cubemap_bank::*;
pub use self::diagnostics::*;
pub use self::kernel::*;
pub use self::mirror_pixel::*;
pub use self::mirror_pixels::*;
pub use self::passes::*;
pub use self::ray_resolver::*;
pub use self::utils::*;

pub mod prelude {
    pub use spirv_std::glam::*;
    #[cfg(target_arch = "spirv")]
    pub use spirv_std::num_traits::Float;
    pub use spirv_std::{spirv, Image, Sampler};

    pub use crate::*;
}

/// Number of invocations cooperating on a single mirror pixel.
///
/// This is the workgroup's second axis - the first one (the "pixel axis") is
/// always 1, since each workgroup owns exactly one mirror pixel. Must match the
/// `threads(1, 8)` attribute of the compositor's entry point.
pub const MIRROR_LANES: usize = 8;

/// Maximum number of accumulation cubemaps that can be bound next to the
/// primary one.
pub const MAX_ACCUMULATION_CUBEMAPS: usize = 4;

/// Number of cube slots in the bank (primary + accumulation ones).
pub const CUBEMAP_BANK_CAPACITY: usize = 1 + MAX_ACCUMULATION_CUBEMAPS;

/// Golden angle, used to spread lane samples around the ray's direction.
pub const GOLDEN_ANGLE: f32 = 2.39996;
