//! Host-side reference implementation of the compositor.
//!
//! It runs the very same kernel as the GPU does, just on the CPU and over
//! host-side cubemaps; it's used to test the kernel without a GPU at hand and
//! to cross-check GPU results.

use std::array;

use spirv_std::glam::{uvec3, UVec2, UVec3, Vec3, Vec4};

use crate::gpu::{
    CubeFace, CubemapBank, CubemapSampler, DiagnosticTag, KernelContext,
    MirrorKernel, MirrorPixelsView, MAX_ACCUMULATION_CUBEMAPS, MIRROR_LANES,
};
use crate::{CompositorConfig, DispatchGrid, Error, MirrorPixels, Result};

/// Cubemap stored in RAM, sampled with nearest filtering.
#[derive(Clone, Debug)]
pub struct CpuCubemap {
    size: u32,
    faces: [Vec<Vec4>; 6],
}

impl CpuCubemap {
    pub fn new(size: u32) -> Self {
        Self::solid(size, Vec4::ZERO)
    }

    pub fn solid(size: u32, color: Vec4) -> Self {
        Self::from_fn(size, |_, _| color)
    }

    pub fn from_fn(
        size: u32,
        mut f: impl FnMut(CubeFace, UVec2) -> Vec4,
    ) -> Self {
        assert!(size > 0);

        let faces = array::from_fn(|idx| {
            let face = CubeFace::from_index(idx as u32);

            (0..size)
                .flat_map(|y| (0..size).map(move |x| UVec2::new(x, y)))
                .map(|pos| f(face, pos))
                .collect()
        });

        Self { size, faces }
    }

    /// Creates cubemap out of faces laid out in the [`CubeFace`] order, each
    /// being `size * size` texels, row by row.
    pub fn from_faces(
        label: impl AsRef<str>,
        size: u32,
        faces: [Vec<Vec4>; 6],
    ) -> Result<Self> {
        assert!(size > 0);

        for (idx, texels) in faces.iter().enumerate() {
            if texels.len() != (size * size) as usize {
                return Err(Error::CubemapSizeMismatch {
                    label: label.as_ref().to_string(),
                    face: CubeFace::from_index(idx as u32),
                    size,
                    actual: texels.len(),
                });
            }
        }

        Ok(Self { size, faces })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn face(&self, face: CubeFace) -> &[Vec4] {
        assert!(face.is_defined());

        &self.faces[face.index() as usize]
    }

    pub fn texel(&self, face: CubeFace, pos: UVec2) -> Vec4 {
        self.face(face)[(pos.y * self.size + pos.x) as usize]
    }
}

impl CubemapSampler for CpuCubemap {
    fn sample(&self, dir: Vec3) -> Vec4 {
        let (face, uv) = CubeFace::project(dir);

        if !face.is_defined() {
            return Vec4::ZERO;
        }

        let pos = (uv * self.size as f32)
            .as_uvec2()
            .min(UVec2::splat(self.size - 1));

        self.texel(face, pos)
    }
}

/// Slot of the host-side cubemap bank; unbound slots sample as transparent.
#[derive(Clone, Copy)]
pub struct CpuLayer<'a>(Option<&'a CpuCubemap>);

impl CubemapSampler for CpuLayer<'_> {
    fn sample(&self, dir: Vec3) -> Vec4 {
        match self.0 {
            Some(cubemap) => cubemap.sample(dir),
            None => Vec4::ZERO,
        }
    }
}

/// Image stored in RAM; counterpart of [`crate::OutputImage`].
#[derive(Clone, Debug, PartialEq)]
pub struct CpuImage {
    size: UVec2,
    texels: Vec<Vec4>,
}

impl CpuImage {
    pub fn new(size: UVec2) -> Self {
        Self {
            size,
            texels: vec![Vec4::ZERO; (size.x * size.y) as usize],
        }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn texels(&self) -> &[Vec4] {
        &self.texels
    }

    pub fn get(&self, pos: UVec2) -> Vec4 {
        self.texels[(pos.y * self.size.x + pos.x) as usize]
    }

    /// Writes texel; similarly to storage-image writes on the GPU,
    /// out-of-bounds writes are discarded.
    pub fn write(&mut self, pos: UVec2, color: Vec4) {
        if pos.x < self.size.x && pos.y < self.size.y {
            self.texels[(pos.y * self.size.x + pos.x) as usize] = color;
        }
    }
}

/// Runs the compositor's kernel on the CPU.
pub struct CpuDispatcher<'a> {
    config: &'a CompositorConfig,
    bank: CubemapBank<CpuLayer<'a>>,
}

impl<'a> CpuDispatcher<'a> {
    pub fn new(
        config: &'a CompositorConfig,
        primary: &'a CpuCubemap,
        accumulation: &[&'a CpuCubemap],
    ) -> Result<Self> {
        if accumulation.len() > MAX_ACCUMULATION_CUBEMAPS {
            return Err(Error::TooManyAccumulationCubemaps {
                requested: accumulation.len(),
                max: MAX_ACCUMULATION_CUBEMAPS,
            });
        }

        if accumulation.len() < config.accumulation_count {
            return Err(Error::BindingMismatch {
                expected: config.accumulation_count,
                actual: accumulation.len(),
            });
        }

        let layer = |idx: usize| CpuLayer(accumulation.get(idx).copied());

        let bank = CubemapBank::new(
            CpuLayer(Some(primary)),
            layer(0),
            layer(1),
            layer(2),
            layer(3),
        );

        Ok(Self { config, bank })
    }

    /// Dispatches given grid of workgroups over the pixels and returns the
    /// diagnostic log (all [`DiagnosticTag::Skipped`] when diagnostics are
    /// disabled).
    ///
    /// Workgroups are run one after another in reverse order, which - since
    /// each workgroup owns a separate texel - must yield the same image as
    /// any other order.
    pub fn dispatch(
        &self,
        pixels: &MirrorPixels,
        grid: DispatchGrid,
        output: &mut CpuImage,
    ) -> Vec<DiagnosticTag> {
        let params = self.config.pass_params(grid.width);

        let kernel = MirrorKernel::new(
            &params,
            MirrorPixelsView::new(pixels.as_words()),
            &self.bank,
        );

        let mut diagnostics = vec![DiagnosticTag::Skipped; pixels.len()];

        for y in (0..grid.height).rev() {
            for x in (0..grid.width).rev() {
                let ctx = KernelContext::new(uvec3(x, y, 0), UVec3::ZERO);
                let task = kernel.prepare(ctx);

                if !task.in_range {
                    continue;
                }

                let mut lanes = [Vec4::ZERO; MIRROR_LANES];

                for (lane, sample) in lanes.iter_mut().enumerate() {
                    *sample = kernel.sample_lane(&task, lane as u32);
                }

                output.write(task.screen_pos(), kernel.resolve(&task, &lanes));

                if params.diagnostics_enabled() {
                    diagnostics[task.pixel_idx as usize] = task.tag();
                }
            }
        }

        diagnostics
    }

    /// Dispatches the smallest grid covering all of the pixels.
    pub fn run(
        &self,
        pixels: &MirrorPixels,
        output: &mut CpuImage,
    ) -> Vec<DiagnosticTag> {
        let grid = DispatchGrid::for_pixels(
            pixels.len() as u32,
            DispatchGrid::DEFAULT_MAX_WORKGROUPS,
        );

        self.dispatch(pixels, grid, output)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use spirv_std::glam::{uvec2, vec3, vec4};

    use super::*;
    use crate::gpu::{BlendMode, MirrorPixel};

    /// Cubemap where each face has a different color.
    fn faces() -> CpuCubemap {
        CpuCubemap::from_fn(4, |face, _| {
            let idx = face.index() as f32;

            vec4(idx / 10.0, 1.0 - idx / 10.0, 0.5, 1.0)
        })
    }

    fn face_color(face: CubeFace) -> Vec4 {
        faces().texel(face, UVec2::ZERO)
    }

    fn changed_texels(image: &CpuImage) -> usize {
        image
            .texels()
            .iter()
            .filter(|texel| **texel != Vec4::ZERO)
            .count()
    }

    #[test]
    fn sample() {
        let target = faces();

        for idx in 0..6 {
            let face = CubeFace::from_index(idx);

            assert_eq!(face_color(face), target.sample(face.normal()));
        }

        assert_eq!(Vec4::ZERO, target.sample(Vec3::ZERO));
    }

    #[test]
    fn sample_picks_texels() {
        let target = CpuCubemap::from_fn(2, |face, pos| {
            vec4(face.index() as f32, pos.x as f32, pos.y as f32, 1.0)
        });

        // +Z face: `uv = ((x, -y) / z + 1) / 2`
        assert_eq!(
            vec4(4.0, 1.0, 0.0, 1.0),
            target.sample(vec3(0.5, 0.5, 1.0)),
        );

        assert_eq!(
            vec4(4.0, 0.0, 1.0, 1.0),
            target.sample(vec3(-0.5, -0.5, 1.0)),
        );
    }

    #[test]
    fn from_faces() {
        let face = vec![Vec4::ONE; 4];

        CpuCubemap::from_faces(
            "test",
            2,
            array::from_fn(|_| face.clone()),
        )
        .unwrap();

        let mut faces: [Vec<Vec4>; 6] = array::from_fn(|_| face.clone());

        faces[3].pop();

        let err = CpuCubemap::from_faces("test", 2, faces).unwrap_err();

        assert!(matches!(
            err,
            Error::CubemapSizeMismatch {
                face: CubeFace::NegativeY,
                size: 2,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn degenerate_ray_writes_sentinel() {
        let config = CompositorConfig::default()
            .with_output_size(uvec2(4, 4))
            .with_sentinel_color(vec4(1.0, 0.0, 1.0, 1.0));

        let cubemap = faces();
        let target = CpuDispatcher::new(&config, &cubemap, &[]).unwrap();

        let mut pixels = MirrorPixels::default();

        pixels.push(MirrorPixel::new(2, 1, Vec3::ZERO, Vec3::ZERO));

        let mut image = CpuImage::new(config.output_size);

        target.run(&pixels, &mut image);

        assert_eq!(config.sentinel_color, image.get(uvec2(2, 1)));
        assert_eq!(1, changed_texels(&image));
    }

    #[test]
    fn writes_exactly_one_texel_per_pixel() {
        let config =
            CompositorConfig::default().with_output_size(uvec2(8, 8));

        let cubemap = faces();
        let target = CpuDispatcher::new(&config, &cubemap, &[]).unwrap();

        let mut pixels = MirrorPixels::default();

        pixels.push(MirrorPixel::new(0, 0, Vec3::ZERO, vec3(5.0, 1.0, 1.0)));
        pixels.push(MirrorPixel::new(3, 5, Vec3::ZERO, vec3(0.0, -2.0, 0.0)));
        pixels.push(MirrorPixel::new(7, 7, Vec3::ZERO, vec3(0.1, 0.2, 3.0)));

        let mut image = CpuImage::new(config.output_size);

        target.run(&pixels, &mut image);

        assert_eq!(3, changed_texels(&image));
        assert_eq!(face_color(CubeFace::PositiveX), image.get(uvec2(0, 0)));
        assert_eq!(face_color(CubeFace::NegativeY), image.get(uvec2(3, 5)));
        assert_eq!(face_color(CubeFace::PositiveZ), image.get(uvec2(7, 7)));
    }

    #[test]
    fn oversized_grid() {
        let config =
            CompositorConfig::default().with_output_size(uvec2(8, 8));

        let cubemap = faces();
        let target = CpuDispatcher::new(&config, &cubemap, &[]).unwrap();

        let mut pixels = MirrorPixels::default();

        for x in 0..3 {
            pixels.push(MirrorPixel::new(x, 0, Vec3::ZERO, Vec3::X));
        }

        let mut image = CpuImage::new(config.output_size);

        // Pixel view panics on out-of-range reads, so reaching the end means
        // the extra workgroups didn't touch the buffer
        target.dispatch(
            &pixels,
            DispatchGrid {
                width: 10,
                height: 2,
            },
            &mut image,
        );

        assert_eq!(3, changed_texels(&image));
    }

    #[test]
    fn extreme_ray_magnitudes() {
        let config =
            CompositorConfig::default().with_output_size(uvec2(4, 1));

        let color = vec4(0.2, 0.4, 0.6, 1.0);
        let cubemap = CpuCubemap::solid(2, color);
        let target = CpuDispatcher::new(&config, &cubemap, &[]).unwrap();

        let pixels: MirrorPixels = [
            MirrorPixel::new(0, 0, Vec3::ZERO, Vec3::X),
            MirrorPixel::new(1, 0, Vec3::ZERO, vec3(1e-30, 0.0, 0.0)),
            MirrorPixel::new(2, 0, Vec3::ZERO, vec3(2e19, 2e19, 0.0)),
            MirrorPixel::new(
                3,
                0,
                vec3(-3e38, 0.0, 0.0),
                vec3(3e38, 0.0, 0.0),
            ),
        ]
        .into_iter()
        .collect();

        let mut image = CpuImage::new(config.output_size);

        target.run(&pixels, &mut image);

        for x in 0..4 {
            let actual = image.get(uvec2(x, 0));

            assert_relative_eq!(color.x, actual.x, epsilon = 1e-6);
            assert_relative_eq!(color.y, actual.y, epsilon = 1e-6);
            assert_relative_eq!(color.z, actual.z, epsilon = 1e-6);
            assert_relative_eq!(color.w, actual.w, epsilon = 1e-6);
        }
    }

    #[test]
    fn accumulation() {
        let config = CompositorConfig::default()
            .with_output_size(uvec2(2, 2))
            .with_accumulation_count(1);

        let primary = CpuCubemap::solid(2, vec4(1.0, 0.0, 0.0, 1.0));
        let accumulation = CpuCubemap::solid(2, vec4(0.0, 0.0, 1.0, 1.0));

        let mut pixels = MirrorPixels::default();

        pixels.push(MirrorPixel::new(1, 1, Vec3::ZERO, Vec3::Y));

        let mut image = CpuImage::new(config.output_size);

        CpuDispatcher::new(&config, &primary, &[&accumulation])
            .unwrap()
            .run(&pixels, &mut image);

        assert_eq!(vec4(0.5, 0.0, 0.5, 1.0), image.get(uvec2(1, 1)));

        // Same bank, but with accumulation turned off
        let config = config
            .with_accumulation_count(0)
            .with_blend_mode(BlendMode::NearestWins);

        let mut image = CpuImage::new(config.output_size);

        CpuDispatcher::new(&config, &primary, &[&accumulation])
            .unwrap()
            .run(&pixels, &mut image);

        assert_eq!(vec4(1.0, 0.0, 0.0, 1.0), image.get(uvec2(1, 1)));
    }

    #[test]
    fn binding_mismatch() {
        let config = CompositorConfig::default().with_accumulation_count(2);
        let cubemap = faces();

        let err = CpuDispatcher::new(&config, &cubemap, &[&cubemap])
            .err()
            .unwrap();

        assert!(matches!(
            err,
            Error::BindingMismatch {
                expected: 2,
                actual: 1
            }
        ));

        let err = CpuDispatcher::new(&config, &cubemap, &[&cubemap; 5])
            .err()
            .unwrap();

        assert!(matches!(err, Error::TooManyAccumulationCubemaps { .. }));
    }

    #[test]
    fn diagnostics() {
        let config = CompositorConfig::default()
            .with_output_size(uvec2(4, 4))
            .with_diagnostics(true);

        let cubemap = faces();
        let target = CpuDispatcher::new(&config, &cubemap, &[]).unwrap();

        let mut pixels = MirrorPixels::default();

        pixels.push(MirrorPixel::new(0, 0, Vec3::ZERO, Vec3::X));
        pixels.push(MirrorPixel::new(1, 0, Vec3::Z, Vec3::Z));

        pixels.push(MirrorPixel::new(
            2,
            0,
            vec3(0.0, 0.0, 0.9),
            vec3(1.05, 0.0, 1.9),
        ));

        let mut image = CpuImage::new(config.output_size);
        let tags = target.run(&pixels, &mut image);

        assert_eq!(
            vec![
                DiagnosticTag::SingleFace,
                DiagnosticTag::Degenerate,
                DiagnosticTag::EdgeCrossing,
            ],
            tags,
        );

        // Diagnostics never affect the color
        let config = config.with_diagnostics(false);
        let target = CpuDispatcher::new(&config, &cubemap, &[]).unwrap();
        let mut image2 = CpuImage::new(config.output_size);
        let tags = target.run(&pixels, &mut image2);

        assert_eq!(image, image2);
        assert!(tags.iter().all(|tag| *tag == DiagnosticTag::Skipped));
    }

    #[test]
    fn order_independence() {
        let mut rng = StdRng::seed_from_u64(4321);
        let size = uvec2(16, 16);

        let config = CompositorConfig::default()
            .with_output_size(size)
            .with_seam_radius(0.3);

        let cubemap = faces();
        let target = CpuDispatcher::new(&config, &cubemap, &[]).unwrap();

        let mut entries: Vec<_> = (0..size.y)
            .flat_map(|y| (0..size.x).map(move |x| (x, y)))
            .map(|(x, y)| {
                let p1 = vec3(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                );

                let p2 = vec3(
                    rng.gen_range(-2.0..2.0),
                    rng.gen_range(-2.0..2.0),
                    rng.gen_range(-2.0..2.0),
                );

                MirrorPixel::new(x, y, p1, p2)
            })
            .collect();

        let render = |entries: &[MirrorPixel]| {
            let mut pixels = MirrorPixels::default();

            for entry in entries {
                pixels.push(*entry);
            }

            let mut image = CpuImage::new(size);

            target.dispatch(
                &pixels,
                DispatchGrid::for_pixels(pixels.len() as u32, 7),
                &mut image,
            );

            image
        };

        let expected = render(&entries);

        entries.shuffle(&mut rng);

        let actual = render(&entries);

        for (expected, actual) in
            expected.texels().iter().zip(actual.texels())
        {
            assert_relative_eq!(expected.x, actual.x);
            assert_relative_eq!(expected.y, actual.y);
            assert_relative_eq!(expected.z, actual.z);
            assert_relative_eq!(expected.w, actual.w);
        }
    }
}
