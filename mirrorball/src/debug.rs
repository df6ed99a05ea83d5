//! Helpers for dumping intermediate images to disk.

use std::fs;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use log::{debug, warn};
use spirv_std::glam::{UVec2, Vec4};

use crate::cpu::CpuCubemap;
use crate::gpu::CubeFace;
use crate::Result;

/// Saves given float texels (row by row) as an 8-bit PNG; colors are clamped
/// into `0.0..=1.0`.
pub fn save_texels_png(
    path: impl AsRef<Path>,
    size: UVec2,
    texels: &[Vec4],
) -> Result<()> {
    let path = path.as_ref();

    assert_eq!((size.x * size.y) as usize, texels.len());

    if texels.is_empty() {
        warn!("Not saving `{}`: image is empty", path.display());
        return Ok(());
    }

    debug!("Saving `{}`; size={size:?}", path.display());

    let image = RgbaImage::from_fn(size.x, size.y, |x, y| {
        encode(texels[(y * size.x + x) as usize])
    });

    image.save_with_format(path, ImageFormat::Png)?;

    Ok(())
}

/// Saves each face of given cubemap as `{face:?}.png` inside `dir`.
pub fn save_cubemap_faces(
    dir: impl AsRef<Path>,
    cubemap: &CpuCubemap,
) -> Result<()> {
    let dir = dir.as_ref();

    fs::create_dir_all(dir)?;

    for idx in 0..6 {
        let face = CubeFace::from_index(idx);

        save_texels_png(
            dir.join(format!("{face:?}.png")),
            UVec2::splat(cubemap.size()),
            cubemap.face(face),
        )?;
    }

    Ok(())
}

fn encode(texel: Vec4) -> Rgba<u8> {
    let texel = (texel.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();

    Rgba([texel.x as u8, texel.y as u8, texel.z as u8, texel.w as u8])
}

#[cfg(test)]
mod tests {
    use std::env;

    use spirv_std::glam::vec4;

    use super::*;

    #[test]
    fn encode() {
        assert_eq!(
            Rgba([0, 128, 255, 255]),
            super::encode(vec4(-1.0, 0.5, 1.0, 7.0))
        );
    }

    #[test]
    fn save_cubemap_faces() {
        let dir = env::temp_dir()
            .join(format!("mirrorball-debug-{}", std::process::id()));

        let cubemap = CpuCubemap::from_fn(2, |face, _| {
            vec4(face.index() as f32 / 5.0, 0.0, 0.0, 1.0)
        });

        super::save_cubemap_faces(&dir, &cubemap).unwrap();

        let image = image::open(dir.join("NegativeX.png"))
            .unwrap()
            .into_rgba8();

        assert_eq!((2, 2), image.dimensions());
        assert_eq!(&Rgba([51, 0, 0, 255]), image.get_pixel(1, 1));

        fs::remove_dir_all(dir).unwrap();
    }
}
