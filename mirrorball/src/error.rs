use std::io;

use thiserror::Error;

use crate::gpu::CubeFace;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "compositor is configured to sample {expected} accumulation \
         cubemap(s), but only {actual} got bound"
    )]
    BindingMismatch { expected: usize, actual: usize },

    #[error(
        "requested {requested} accumulation cubemaps, but at most {max} are \
         supported"
    )]
    TooManyAccumulationCubemaps { requested: usize, max: usize },

    #[error(
        "pipeline needs {required} texture units, but the budget is {budget}"
    )]
    TextureBudgetExceeded { required: u32, budget: u32 },

    #[error(
        "device's `{limit}` is {actual}, but the compositor needs at least \
         {required}"
    )]
    DeviceLimit {
        limit: &'static str,
        required: u64,
        actual: u64,
    },

    #[error(
        "cubemap `{label}` has {size}x{size} faces, but got {actual} texels \
         for face {face:?}"
    )]
    CubemapSizeMismatch {
        label: String,
        face: CubeFace,
        size: u32,
        actual: usize,
    },

    #[error(
        "got {len} mirror pixels, but the buffer has space only for {capacity}"
    )]
    PixelBufferOverflow { len: usize, capacity: usize },

    #[error(
        "mirror pixel #{idx} targets ({x}, {y}), which lies outside of the \
         {width}x{height} output image"
    )]
    PixelOutOfBounds {
        idx: usize,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("mirror pixels #{first} and #{second} both target ({x}, {y})")]
    PixelCollision {
        x: u32,
        y: u32,
        first: usize,
        second: usize,
    },

    #[error("couldn't find any adapter supporting the compositor")]
    NoAdapter,

    #[error("couldn't create device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("couldn't map buffer for reading")]
    BufferAsync(#[from] wgpu::BufferAsyncError),

    #[error("buffer mapping got interrupted")]
    MappingInterrupted,

    #[error("shader is not available: {0}")]
    ShaderUnavailable(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}
