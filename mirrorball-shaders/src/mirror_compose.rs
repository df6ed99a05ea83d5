use mirrorball_gpu::prelude::*;
use spirv_std::arch::{
    workgroup_memory_barrier_with_group_sync, IndexUnchecked,
};

#[spirv(compute(threads(1, 8)))]
#[allow(clippy::too_many_arguments)]
pub fn main(
    #[spirv(workgroup_id)] workgroup_id: UVec3,
    #[spirv(local_invocation_id)] local_id: UVec3,
    #[spirv(push_constant)] params: &MirrorPassParams,
    #[spirv(workgroup)] lanes: &mut [Vec4; MIRROR_LANES],
    #[spirv(descriptor_set = 0, binding = 0)] output: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 1, storage_buffer)] pixels: &[Vec4],
    #[spirv(descriptor_set = 0, binding = 2)] primary_tex: TexCube,
    #[spirv(descriptor_set = 0, binding = 3)] accumulation0_tex: TexCube,
    #[spirv(descriptor_set = 0, binding = 4)] accumulation1_tex: TexCube,
    #[spirv(descriptor_set = 0, binding = 5)] accumulation2_tex: TexCube,
    #[spirv(descriptor_set = 0, binding = 6)] accumulation3_tex: TexCube,
    #[spirv(descriptor_set = 0, binding = 7)] sampler: &Sampler,
    #[spirv(descriptor_set = 1, binding = 0, storage_buffer)]
    diagnostics: &mut [u32],
) {
    let bank = CubemapBank::new(
        EnvironmentMap::new(primary_tex, sampler),
        EnvironmentMap::new(accumulation0_tex, sampler),
        EnvironmentMap::new(accumulation1_tex, sampler),
        EnvironmentMap::new(accumulation2_tex, sampler),
        EnvironmentMap::new(accumulation3_tex, sampler),
    );

    let kernel =
        MirrorKernel::new(params, MirrorPixelsView::new(pixels), &bank);

    let ctx = KernelContext::new(workgroup_id, local_id);
    let task = kernel.prepare(ctx);

    // Uniform across the workgroup, so it's fine to bail out before the
    // barrier
    if !task.in_range {
        return;
    }

    let lane = ctx.lane();

    unsafe {
        *lanes.index_unchecked_mut(lane as usize) =
            kernel.sample_lane(&task, lane);

        workgroup_memory_barrier_with_group_sync();
    }

    if lane != 0 {
        return;
    }

    let color = kernel.resolve(&task, lanes);

    unsafe {
        output.write(task.screen_pos(), color);
    }

    if params.diagnostics_enabled() {
        unsafe {
            *diagnostics.index_unchecked_mut(task.pixel_idx as usize) =
                task.tag().serialize();
        }
    }
}
