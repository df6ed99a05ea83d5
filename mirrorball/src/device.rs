use std::mem;

use log::info;

use crate::{gpu, Error, Result};

/// Features the compositor needs from the device.
pub fn required_features() -> wgpu::Features {
    // Push constants carry pass' parameters, while adapter-specific format
    // features allow for read-write `Rgba32Float` storage textures
    wgpu::Features::PUSH_CONSTANTS
        | wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES
}

/// Limits the compositor needs from the device, on top of the defaults.
pub fn required_limits(adapter: &wgpu::Adapter) -> wgpu::Limits {
    wgpu::Limits {
        max_push_constant_size: mem::size_of::<gpu::MirrorPassParams>() as u32,
        ..wgpu::Limits::default()
    }
    .using_resolution(adapter.limits())
}

/// Creates a device not attached to any surface.
pub fn request_headless(
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let adapter = pollster::block_on(instance.request_adapter(
        &wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        },
    ))
    .ok_or(Error::NoAdapter)?;

    let adapter_info = adapter.get_info();

    info!(
        "Using adapter: {} ({:?}, {:?})",
        adapter_info.name, adapter_info.device_type, adapter_info.backend
    );

    if !adapter.features().contains(required_features()) {
        return Err(Error::NoAdapter);
    }

    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("mirrorball_device"),
            features: required_features(),
            limits: required_limits(&adapter),
        },
        None,
    ))?;

    Ok((adapter, device, queue))
}
