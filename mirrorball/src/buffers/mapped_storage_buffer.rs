use std::ops::{Deref, DerefMut};
use std::{any, mem};

use log::info;

use crate::Bindable;

/// Storage buffer that exists both on the host machine and the GPU.
///
/// The host-side copy is the source of truth: it's modified through
/// [`DerefMut`] (which marks the buffer as dirty) and then uploaded with
/// [`Self::flush()`].
#[derive(Debug)]
pub struct MappedStorageBuffer<T> {
    buffer: wgpu::Buffer,
    data: T,
    dirty: bool,
}

impl<T> MappedStorageBuffer<T>
where
    T: StorageBufferable,
{
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: usize,
        data: T,
    ) -> Self {
        let label = label.as_ref();

        info!(
            "Allocating storage buffer `{label}`; ty={}, size={size}",
            any::type_name::<T>(),
        );

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::STORAGE,
            size: size as _,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            data,
            dirty: true,
        }
    }

    /// Uploads host-side data, if it's been modified since the last flush.
    ///
    /// Returns whether anything got uploaded.
    pub fn flush(&mut self, queue: &wgpu::Queue) -> bool {
        if !mem::take(&mut self.dirty) {
            return false;
        }

        queue.write_buffer(&self.buffer, 0, self.data.data());

        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl<T> Deref for MappedStorageBuffer<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for MappedStorageBuffer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.dirty = true;

        &mut self.data
    }
}

impl<T> Bindable for MappedStorageBuffer<T> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage {
                    // TODO should say `read_only: true`, but rust-gpu is not
                    //      able to emit appropriate attributes yet, causing
                    //      wgpu to reject the shader later
                    read_only: false,
                },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let resource = self.buffer.as_entire_binding();

        vec![(layout, resource)]
    }
}

/// Object that can be uploaded into a storage buffer
pub trait StorageBufferable {
    fn data(&self) -> &[u8];
}
