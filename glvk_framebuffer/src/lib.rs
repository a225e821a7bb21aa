/*!
# glvk framebuffer

Framebuffer translation layer of a GL-on-explicit-GPU implementation.

GL framebuffer objects are mapped onto render passes, native framebuffer
handles, render targets and staging buffers of an explicit GPU API. The
device API is reached only through traits; the Vulkan implementation lives
in the `glvk_framebuffer_vulkan` crate.

## Architecture

- **Framebuffer**: attachment state, completeness, native handle cache
- **Clear engine**: fast, in-pass and draw-based clears
- **Blit engine**: native copy/resolve or CPU resampling through staging
- **Readback**: staged copies packed into client memory
- **ExecutionContext**: GL state plus the command graph work is recorded into
- **GraphicsDevice**: backend factory for render targets, passes and buffers
*/

pub mod log;
pub mod error;
pub mod command_graph;
pub mod config;
pub mod context;
pub mod device;
pub mod framebuffer;
pub mod geometry;
pub mod pixels;

// Main glvk namespace module
pub mod glvk {
    // Error types
    pub use crate::error::{Error, Result};

    pub use crate::config::{ContextConfig, FramebufferConfig, RecordingMode};
    pub use crate::context::{DeviceContext, ExecutionContext, GlState};
    pub use crate::framebuffer::{Framebuffer, FramebufferStatus};
    pub use crate::geometry::Rect;

    // Logging sub-module (types only; the fb_* macros live at the crate root)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Device API sub-module
    pub mod device {
        pub use crate::device::*;
    }

    pub mod pixels {
        pub use crate::pixels::*;
    }
}

// Re-export math library at crate root
pub use glam;
