use futures_intrusive::channel::shared::oneshot_channel;
use spirv_std::glam::UVec2;

use crate::{Error, Result};

/// Copies given buffer back into RAM.
pub fn read_buffer(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    buffer: &wgpu::Buffer,
) -> Result<Vec<u8>> {
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("mirrorball_readback_staging"),
        size: buffer.size(),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder =
        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mirrorball_readback"),
        });

    encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, buffer.size());
    queue.submit([encoder.finish()]);

    let bytes = map(device, &staging)?;

    Ok(bytes)
}

/// Copies given single-layer texture back into RAM, dropping the row padding
/// required by copies.
pub fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    size: UVec2,
    texel_size: u32,
) -> Result<Vec<u8>> {
    let tight_bpr = (size.x * texel_size) as usize;
    let padded_bpr = align_bpr(tight_bpr);

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("mirrorball_readback_staging"),
        size: (padded_bpr * size.y as usize) as _,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder =
        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mirrorball_readback"),
        });

    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &staging,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_bpr as u32),
                rows_per_image: Some(size.y),
            },
        },
        wgpu::Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        },
    );

    queue.submit([encoder.finish()]);

    let padded = map(device, &staging)?;

    Ok(depad(&padded, tight_bpr, padded_bpr))
}

fn map(device: &wgpu::Device, buffer: &wgpu::Buffer) -> Result<Vec<u8>> {
    let slice = buffer.slice(..);
    let (tx, rx) = oneshot_channel();

    slice.map_async(wgpu::MapMode::Read, move |result| {
        _ = tx.send(result);
    });

    device.poll(wgpu::Maintain::Wait);

    pollster::block_on(rx.receive()).ok_or(Error::MappingInterrupted)??;

    let bytes = slice.get_mapped_range().to_vec();

    buffer.unmap();

    Ok(bytes)
}

/// Aligns row's length to the copy alignment (256 bytes).
fn align_bpr(bpr: usize) -> usize {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;

    (bpr + align - 1) / align * align
}

fn depad(padded: &[u8], tight_bpr: usize, padded_bpr: usize) -> Vec<u8> {
    padded
        .chunks(padded_bpr)
        .flat_map(|row| &row[..tight_bpr])
        .copied()
        .collect()
}
