//! # Buffer State Module
//!
//! A registry of named GPU buffers with per-buffer usage analytics.
//!
//! ## Key Features
//!
//! * Buffers are created, replaced and dropped by name
//! * Writes are bounds-checked against the allocated size before reaching the queue
//! * Allocated bytes, high-water marks and write counts are tracked per buffer
//!
//! ## Architecture
//!
//! Renderers never write to the queue directly. They describe uploads as
//! [`BufferWriteCommand`]s and hand them to [`BufferState::write`]. This keeps the octree
//! synchronisation testable without a device: the commands can be inspected before anything
//! touches the GPU.

use std::{collections::HashMap, fmt::Debug};

use bytemuck::NoUninit;
use log::info;
use wgpu::{util::DeviceExt, Buffer, Device, Queue};

use crate::{
    core::StResource,
    error::{BufferError, BufferResult},
};

/// Usage counters for one buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufferAnalytics {
    /// Bytes allocated for the buffer
    pub allocated_memory: u64,
    /// Highest byte written so far
    pub used_memory: u64,
    /// Number of writes, counting initial contents as one
    pub times_written: u64,
}

impl BufferAnalytics {
    /// Checks a write of `len` bytes at `offset` and records it.
    pub fn record_write(&mut self, buffer_name: &str, offset: u64, len: u64) -> BufferResult<()> {
        let end = offset.checked_add(len).filter(|&end| end <= self.allocated_memory);
        let Some(end) = end else {
            return Err(BufferError::OutOfBounds {
                buffer: buffer_name.to_string(),
                offset,
                len,
                size: self.allocated_memory,
            });
        };
        self.used_memory = self.used_memory.max(end);
        self.times_written += 1;
        Ok(())
    }
}

/// Registry for the engine's GPU buffers.
pub struct BufferState {
    /// The GPU device buffers are created on
    device: Device,
    /// The queue writes are submitted to
    queue: Queue,
    /// Buffers by name
    buffers: HashMap<String, Buffer>,
    /// Analytics for each buffer
    buffer_analytics: StResource<HashMap<String, BufferAnalytics>>,
}

impl BufferState {
    /// Creates an empty registry.
    pub fn new(device: Device, queue: Queue) -> Self {
        Self {
            device,
            queue,
            buffers: HashMap::new(),
            buffer_analytics: StResource::new(HashMap::new()),
        }
    }

    /// Creates an uninitialised buffer, replacing any buffer already under `buffer_name`.
    pub fn create_buffer(
        &mut self,
        buffer_name: impl Into<String>,
        buffer_descriptor: wgpu::BufferDescriptor,
    ) {
        let buffer_name = buffer_name.into();
        let buffer_analytics = BufferAnalytics {
            allocated_memory: buffer_descriptor.size,
            used_memory: 0,
            times_written: 0,
        };
        let buffer = self.device.create_buffer(&buffer_descriptor);

        self.insert(buffer_name, buffer, buffer_analytics);
    }

    /// Creates a buffer holding `init_descriptor.contents`, replacing any buffer already under
    /// `buffer_name`.
    pub fn create_buffer_init(
        &mut self,
        buffer_name: impl Into<String>,
        init_descriptor: wgpu::util::BufferInitDescriptor,
    ) {
        let buffer_name = buffer_name.into();
        let buffer_analytics = BufferAnalytics {
            allocated_memory: init_descriptor.contents.len() as u64,
            used_memory: init_descriptor.contents.len() as u64,
            times_written: 1,
        };
        let buffer = self.device.create_buffer_init(&init_descriptor);

        self.insert(buffer_name, buffer, buffer_analytics);
    }

    fn insert(&mut self, buffer_name: String, buffer: Buffer, analytics: BufferAnalytics) {
        if let Some(old) = self.buffers.insert(buffer_name.clone(), buffer) {
            old.destroy();
        }
        self.buffer_analytics.get_mut().insert(buffer_name, analytics);
    }

    /// Destroys and forgets the buffer under `buffer_name`, if any.
    pub fn remove_buffer(&mut self, buffer_name: &str) -> bool {
        self.buffer_analytics.get_mut().remove(buffer_name);
        match self.buffers.remove(buffer_name) {
            Some(buffer) => {
                buffer.destroy();
                true
            }
            None => false,
        }
    }

    /// Executes a write command.
    ///
    /// # Errors
    /// See [`BufferState::write_buffer`].
    pub fn write(&self, buffer_command: BufferWriteCommand) -> BufferResult<()> {
        self.write_buffer(
            &buffer_command.buffer_name,
            buffer_command.offset,
            buffer_command.data.as_bytes(),
        )
    }

    /// Queues `data` for upload at `offset` bytes into the named buffer.
    ///
    /// # Errors
    /// * [`BufferError::Missing`] when no buffer has that name
    /// * [`BufferError::OutOfBounds`] when the write would pass the allocated size; nothing is
    ///   queued in that case
    pub fn write_buffer(
        &self,
        buffer_name: &str,
        offset: wgpu::BufferAddress,
        data: &[u8],
    ) -> BufferResult<()> {
        let buffer = self
            .buffers
            .get(buffer_name)
            .ok_or_else(|| BufferError::Missing(buffer_name.to_string()))?;
        let mut buffer_dictionary = self.buffer_analytics.get_mut();
        let buffer_analytics = buffer_dictionary
            .get_mut(buffer_name)
            .ok_or_else(|| BufferError::Missing(buffer_name.to_string()))?;

        buffer_analytics.record_write(buffer_name, offset, data.len() as u64)?;
        self.queue.write_buffer(buffer, offset, data);
        Ok(())
    }

    /// The buffer registered under `buffer_name`.
    pub fn get_buffer(&self, buffer_name: &str) -> Option<&Buffer> {
        self.buffers.get(buffer_name)
    }

    /// A binding resource covering the whole named buffer.
    pub fn get_entire_binding(&self, buffer_name: &str) -> Option<wgpu::BindingResource> {
        self.buffers
            .get(buffer_name)
            .map(|buffer| buffer.as_entire_binding())
    }

    /// Analytics for one buffer.
    pub fn analytics(&self, buffer_name: &str) -> Option<BufferAnalytics> {
        self.buffer_analytics.get().get(buffer_name).copied()
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Total allocated bytes across all buffers.
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffer_analytics
            .get()
            .values()
            .map(|buffer_analytics| buffer_analytics.allocated_memory)
            .sum()
    }

    /// Total bytes written across all buffers, by high-water mark.
    pub fn get_total_used_memory(&self) -> u64 {
        self.buffer_analytics
            .get()
            .values()
            .map(|buffer_analytics| buffer_analytics.used_memory)
            .sum()
    }

    /// Total writes across all buffers.
    pub fn get_total_writes(&self) -> u64 {
        self.buffer_analytics
            .get()
            .values()
            .map(|buffer_analytics| buffer_analytics.times_written)
            .sum()
    }

    /// Logs a one-line summary of buffer usage.
    pub fn log_analytics(&self) {
        info!(
            "{} buffers: {} bytes allocated, {} bytes used, {} writes",
            self.buffer_count(),
            self.get_total_allocated_memory(),
            self.get_total_used_memory(),
            self.get_total_writes()
        );
    }
}

/// A pending buffer upload.
pub struct BufferWriteCommand {
    /// Descriptive name for the command (for debugging)
    pub name: String,
    /// Name of the target buffer
    pub buffer_name: String,
    /// Byte offset in the buffer to start writing
    pub offset: u64,
    /// Data to write to the buffer
    pub data: Box<dyn AsBytes + Send + Sync>,
}

impl BufferWriteCommand {
    /// Byte length of the payload.
    pub fn len(&self) -> usize {
        self.data.as_bytes().len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Debug for BufferWriteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferWriteCommand")
            .field("name", &self.name)
            .field("buffer_name", &self.buffer_name)
            .field("offset", &self.offset)
            .field("len", &self.len())
            .finish()
    }
}

/// Types that can be viewed as raw bytes for a buffer upload.
pub trait AsBytes {
    /// The value's bytes.
    fn as_bytes(&self) -> &[u8];
}

impl<T> AsBytes for Vec<T>
where
    T: NoUninit + Send + Sync,
{
    fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self)
    }
}

impl<T, const N: usize> AsBytes for [T; N]
where
    T: NoUninit + Send + Sync,
{
    fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analytics_reject_overruns() {
        let mut analytics = BufferAnalytics {
            allocated_memory: 64,
            ..Default::default()
        };
        assert!(analytics.record_write("voxels", 0, 64).is_ok());
        assert!(analytics.record_write("voxels", 32, 16).is_ok());
        assert!(matches!(
            analytics.record_write("voxels", 60, 8),
            Err(BufferError::OutOfBounds { size: 64, .. })
        ));
        assert!(analytics.record_write("voxels", u64::MAX, 1).is_err());
        assert_eq!(analytics.used_memory, 64);
        assert_eq!(analytics.times_written, 2);
    }

    #[test]
    fn commands_report_payload_length() {
        let command = BufferWriteCommand {
            name: "test".to_string(),
            buffer_name: "voxels".to_string(),
            offset: 8,
            data: Box::new(vec![1u32, 2, 3]),
        };
        assert_eq!(command.len(), 12);
        assert!(!command.is_empty());
    }
}
