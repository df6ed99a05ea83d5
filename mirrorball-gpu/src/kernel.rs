use glam::{UVec2, UVec3, Vec3, Vec4};

use crate::{
    orthonormal_basis, spiral_offset, CubemapBank, CubemapSampler,
    DiagnosticTag, MirrorPassParams, MirrorPixel, MirrorPixelsView,
    ResolvedRay, SamplingStrategy, MIRROR_LANES,
};

/// Identifiers of the invocation currently being run.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct KernelContext {
    pub workgroup_id: UVec3,
    pub local_invocation_id: UVec3,
}

impl KernelContext {
    pub fn new(workgroup_id: UVec3, local_invocation_id: UVec3) -> Self {
        Self {
            workgroup_id,
            local_invocation_id,
        }
    }

    /// Returns index of the mirror pixel this workgroup is responsible for.
    ///
    /// Large dispatches are folded into two dimensions (see `grid_width`), so
    /// both `x` and `y` of the workgroup's id take part here.
    pub fn pixel_idx(&self, grid_width: u32) -> u32 {
        self.workgroup_id.y * grid_width + self.workgroup_id.x
    }

    pub fn lane(&self) -> u32 {
        self.local_invocation_id.y
    }
}

/// Work fetched by a workgroup: the mirror pixel plus its resolved ray.
#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct MirrorTask {
    /// Whether the workgroup maps into the pixel buffer at all; when `false`,
    /// the workgroup must not touch anything
    pub in_range: bool,
    pub pixel_idx: u32,
    pub pixel: MirrorPixel,
    pub ray: ResolvedRay,
}

impl MirrorTask {
    pub fn screen_pos(&self) -> UVec2 {
        self.pixel.screen_pos()
    }

    pub fn tag(&self) -> DiagnosticTag {
        if self.in_range {
            DiagnosticTag::from_strategy(self.ray.strategy)
        } else {
            DiagnosticTag::Skipped
        }
    }
}

/// Body of the compositor kernel.
///
/// Each workgroup owns a single mirror pixel and goes through three steps:
///
/// - [`Self::prepare()`] - performed by each lane, fetches & resolves the ray,
/// - [`Self::sample_lane()`] - performed by each lane, result is stored in
///   workgroup memory,
/// - [`Self::resolve()`] - performed by lane 0 after a barrier, reduces the
///   lanes into the final color.
pub struct MirrorKernel<'a, S> {
    params: &'a MirrorPassParams,
    pixels: MirrorPixelsView<'a>,
    bank: &'a CubemapBank<S>,
}

impl<'a, S> MirrorKernel<'a, S>
where
    S: CubemapSampler,
{
    pub fn new(
        params: &'a MirrorPassParams,
        pixels: MirrorPixelsView<'a>,
        bank: &'a CubemapBank<S>,
    ) -> Self {
        Self {
            params,
            pixels,
            bank,
        }
    }

    pub fn prepare(&self, ctx: KernelContext) -> MirrorTask {
        let pixel_idx = ctx.pixel_idx(self.params.grid_width());

        if !self.pixels.contains(pixel_idx) {
            return MirrorTask {
                in_range: false,
                pixel_idx,
                pixel: Default::default(),
                ray: ResolvedRay::resolve(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO),
            };
        }

        let pixel = self.pixels.get(pixel_idx);
        let ray = ResolvedRay::for_pixel(self.params.origin(), pixel);

        MirrorTask {
            in_range: true,
            pixel_idx,
            pixel,
            ray,
        }
    }

    pub fn sample_lane(&self, task: &MirrorTask, lane: u32) -> Vec4 {
        if !task.in_range {
            return Vec4::ZERO;
        }

        match task.ray.strategy {
            SamplingStrategy::Undefined => Vec4::ZERO,

            SamplingStrategy::SingleFace => {
                if lane == 0 {
                    self.bank.sample(task.ray.direction, self.params)
                } else {
                    Vec4::ZERO
                }
            }

            SamplingStrategy::EdgeCrossing => self.bank.sample(
                self.lane_direction(task.ray.direction, lane),
                self.params,
            ),
        }
    }

    pub fn resolve(
        &self,
        task: &MirrorTask,
        lanes: &[Vec4; MIRROR_LANES],
    ) -> Vec4 {
        match task.ray.strategy {
            SamplingStrategy::Undefined => self.params.sentinel_color,
            SamplingStrategy::SingleFace => lanes[0],

            SamplingStrategy::EdgeCrossing => {
                let mut sum = Vec4::ZERO;
                let mut lane = 0;

                while lane < MIRROR_LANES {
                    sum += lanes[lane];
                    lane += 1;
                }

                sum / (MIRROR_LANES as f32)
            }
        }
    }

    /// Returns direction sampled by given lane when smoothing a seam - a point
    /// on a golden-angle spiral around `dir`.
    pub fn lane_direction(&self, dir: Vec3, lane: u32) -> Vec3 {
        let (t, b) = orthonormal_basis(dir);

        let (x, y) = spiral_offset(
            lane,
            MIRROR_LANES as u32,
            self.params.seam_radius(),
        );

        (dir + t * x + b * y).normalize()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec3, vec3, vec4};

    use super::*;
    use crate::{BlendMode, CubeFace};

    /// Returns a different color for each face.
    struct FaceCubemap;

    impl CubemapSampler for FaceCubemap {
        fn sample(&self, dir: Vec3) -> Vec4 {
            let face = CubeFace::dominant(dir).index() as f32;

            vec4(face, face * 10.0, 0.0, 1.0)
        }
    }

    fn bank() -> CubemapBank<FaceCubemap> {
        CubemapBank::new(
            FaceCubemap,
            FaceCubemap,
            FaceCubemap,
            FaceCubemap,
            FaceCubemap,
        )
    }

    fn params(grid_width: u32, seam_radius: f32) -> MirrorPassParams {
        MirrorPassParams {
            sentinel_color: vec4(1.0, 0.0, 1.0, 1.0),
            origin: Vec4::W,
            payload: MirrorPassParams::encode_payload(
                grid_width,
                0,
                BlendMode::Average,
                0,
                seam_radius,
            ),
            ..Default::default()
        }
    }

    fn buffer(pixels: &[MirrorPixel]) -> Vec<Vec4> {
        let mut buffer =
            vec![vec4(f32::from_bits(pixels.len() as u32), 0.0, 0.0, 0.0)];

        for pixel in pixels {
            buffer.extend(pixel.pack());
        }

        buffer
    }

    fn run(
        kernel: &MirrorKernel<FaceCubemap>,
        workgroup_id: UVec3,
    ) -> (MirrorTask, Vec4) {
        let task =
            kernel.prepare(KernelContext::new(workgroup_id, UVec3::ZERO));

        let mut lanes = [Vec4::ZERO; MIRROR_LANES];

        for (lane, sample) in lanes.iter_mut().enumerate() {
            *sample = kernel.sample_lane(&task, lane as u32);
        }

        (task, kernel.resolve(&task, &lanes))
    }

    #[test]
    fn pixel_idx() {
        let ctx = KernelContext::new(uvec3(3, 2, 0), uvec3(0, 5, 0));

        assert_eq!(2 * 100 + 3, ctx.pixel_idx(100));
        assert_eq!(5, ctx.lane());
    }

    #[test]
    fn single_face() {
        let pixels = buffer(&[MirrorPixel::new(
            4,
            2,
            Vec3::ZERO,
            vec3(5.0, 1.0, 1.0),
        )]);

        let params = params(1, 0.1);
        let bank = bank();
        let kernel =
            MirrorKernel::new(&params, MirrorPixelsView::new(&pixels), &bank);

        let (task, color) = run(&kernel, UVec3::ZERO);

        assert!(task.in_range);
        assert_eq!(4, task.screen_pos().x);
        assert_eq!(2, task.screen_pos().y);
        assert_eq!(DiagnosticTag::SingleFace, task.tag());
        assert_eq!(vec4(0.0, 0.0, 0.0, 1.0), color);
    }

    #[test]
    fn degenerate_writes_sentinel() {
        let pixels =
            buffer(&[MirrorPixel::new(0, 0, Vec3::ZERO, Vec3::ZERO)]);

        let params = params(1, 0.1);
        let bank = bank();
        let kernel =
            MirrorKernel::new(&params, MirrorPixelsView::new(&pixels), &bank);

        let (task, color) = run(&kernel, UVec3::ZERO);

        assert!(task.in_range);
        assert_eq!(DiagnosticTag::Degenerate, task.tag());
        assert_eq!(params.sentinel_color, color);
    }

    #[test]
    fn out_of_range() {
        let pixels = buffer(&[MirrorPixel::new(
            0,
            0,
            Vec3::ZERO,
            vec3(0.0, 1.0, 0.0),
        )]);

        let params = params(4, 0.1);
        let bank = bank();
        let kernel =
            MirrorKernel::new(&params, MirrorPixelsView::new(&pixels), &bank);

        for workgroup_id in [uvec3(1, 0, 0), uvec3(3, 0, 0), uvec3(0, 1, 0)] {
            let task = kernel
                .prepare(KernelContext::new(workgroup_id, UVec3::ZERO));

            assert!(!task.in_range);
            assert_eq!(DiagnosticTag::Skipped, task.tag());
            assert_eq!(Vec4::ZERO, kernel.sample_lane(&task, 0));
        }
    }

    #[test]
    fn edge_crossing_averages_lanes() {
        // Ray starts on the +Z face and leaves through +X, right next to the
        // seam between +X and +Z
        let pixels = buffer(&[MirrorPixel::new(
            0,
            0,
            vec3(0.0, 0.0, 0.9),
            vec3(1.05, 0.0, 1.9),
        )]);

        let bank = bank();

        // With a zero radius all lanes look at the same direction
        let narrow = params(1, 0.0);
        let kernel =
            MirrorKernel::new(&narrow, MirrorPixelsView::new(&pixels), &bank);

        let (task, color) = run(&kernel, UVec3::ZERO);

        assert_eq!(DiagnosticTag::EdgeCrossing, task.tag());
        assert_relative_eq!(color.x, 0.0);

        // With a non-zero radius, some lanes spill over into +Z
        let wide = params(1, 0.5);
        let kernel =
            MirrorKernel::new(&wide, MirrorPixelsView::new(&pixels), &bank);

        let (_, color) = run(&kernel, UVec3::ZERO);

        assert!(color.x > 0.0 && color.x < 4.0);
        assert_relative_eq!(color.w, 1.0);
    }

    #[test]
    fn lane_direction() {
        let params = params(1, 0.25);
        let pixels = buffer(&[]);
        let bank = bank();
        let kernel =
            MirrorKernel::new(&params, MirrorPixelsView::new(&pixels), &bank);

        let dir = vec3(1.0, 0.2, 0.3).normalize();

        for lane in 0..(MIRROR_LANES as u32) {
            let lane_dir = kernel.lane_direction(dir, lane);

            assert_relative_eq!(lane_dir.length(), 1.0, epsilon = 1e-5);
            assert!(lane_dir.dot(dir) > 0.9);
        }
    }
}
