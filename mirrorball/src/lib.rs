//! Composites mirror reflections out of cubemaps, on the GPU.
//!
//! The caller provides a list of mirror pixels (each being a reflected ray
//! plus the output texel it belongs to) and a bank of environment cubemaps;
//! the compositor then traces each ray against the cubemaps and writes the
//! blended color into the output image.
//!
//! See [`MirrorCompositor`] for the entry point and [`cpu::CpuDispatcher`]
//! for the host-side reference implementation.

mod buffers;
mod compositor;
mod config;
mod cubemap_bank;
mod device;
mod dispatch;
mod error;
mod mirror_pixels;
mod output_image;
mod pass;
mod shaders;
mod utils;

pub mod cpu;
pub mod debug;

pub use mirrorball_gpu as gpu;

pub(crate) use self::buffers::*;
pub use self::buffers::{Cubemap, StorageBufferable};
pub use self::compositor::*;
pub use self::config::*;
pub use self::cubemap_bank::*;
pub use self::device::*;
pub use self::dispatch::*;
pub use self::error::*;
pub use self::mirror_pixels::*;
pub use self::output_image::*;
pub(crate) use self::pass::*;
pub(crate) use self::shaders::*;
