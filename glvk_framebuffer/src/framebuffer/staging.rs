/// Host-visible staging rings for readback and blit emulation

use std::sync::Arc;
use crate::device::{Buffer, BufferDesc, BufferUsage, GraphicsDevice};
use crate::error::Result;
use crate::fb_trace;

/// Region of a staging buffer handed out for one transfer
#[derive(Clone)]
pub struct StagingAllocation {
    pub buffer: Arc<dyn Buffer>,
    pub offset: u64,
    pub size: u64,
}

/// Append-only staging buffer
///
/// Allocations advance a write cursor. When a request does not fit, a
/// larger buffer replaces the current one; the old buffer is retired, not
/// destroyed, until the GPU work using it is known to be complete.
pub struct StagingBuffer {
    usage: BufferUsage,
    min_size: u64,
    alignment: u64,
    buffer: Option<Arc<dyn Buffer>>,
    cursor: u64,
    retired: Vec<Arc<dyn Buffer>>,
}

impl StagingBuffer {
    pub fn new(usage: BufferUsage, min_size: u64, alignment: u64) -> Self {
        Self {
            usage,
            min_size,
            alignment: alignment.max(1),
            buffer: None,
            cursor: 0,
            retired: Vec::new(),
        }
    }

    /// Reserve `size` bytes, growing the ring when needed
    pub fn allocate(&mut self, device: &dyn GraphicsDevice, size: u64) -> Result<StagingAllocation> {
        let offset = self.cursor.div_ceil(self.alignment) * self.alignment;
        if let Some(buffer) = &self.buffer {
            if offset + size <= buffer.size() {
                self.cursor = offset + size;
                return Ok(StagingAllocation { buffer: Arc::clone(buffer), offset, size });
            }
        }

        let capacity = self.min_size.max(size.next_power_of_two());
        fb_trace!("glvk::StagingBuffer", "growing {:?} ring to {} bytes", self.usage, capacity);
        let buffer = device.create_buffer(&BufferDesc { size: capacity, usage: self.usage })?;
        if let Some(old) = self.buffer.replace(Arc::clone(&buffer)) {
            self.retired.push(old);
        }
        self.cursor = size;
        Ok(StagingAllocation { buffer, offset: 0, size })
    }

    /// Release every region once the GPU finished with them
    pub fn reset_after_completion(&mut self) {
        self.retired.clear();
        self.cursor = 0;
    }

    pub fn capacity(&self) -> u64 {
        self.buffer.as_ref().map_or(0, |b| b.size())
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    pub fn destroy(&mut self) {
        self.buffer = None;
        self.reset_after_completion();
    }
}

#[cfg(test)]
#[path = "staging_tests.rs"]
mod tests;
