//! Configuration for framebuffers and execution contexts

/// How an execution context records GPU work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingMode {
    /// Nodes are added to the command graph and replayed at flush time
    Deferred,
    /// Commands go straight into the current command list
    Direct,
}

/// Execution context configuration
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub recording_mode: RecordingMode,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            recording_mode: RecordingMode::Deferred,
        }
    }
}

/// Per-framebuffer configuration
#[derive(Debug, Clone)]
pub struct FramebufferConfig {
    /// Initial capacity of the readback staging ring, in bytes
    pub read_pixels_buffer_size: u64,
    /// Initial capacity of the blit staging ring, in bytes
    pub blit_buffer_size: u64,
    /// Alignment of every staging sub-allocation, in bytes
    pub staging_alignment: u64,
}

impl Default for FramebufferConfig {
    fn default() -> Self {
        Self {
            read_pixels_buffer_size: 128 * 1024,
            blit_buffer_size: 64 * 1024,
            staging_alignment: 4,
        }
    }
}
