//! Execution context module
//!
//! The collaborator owning GL state, the command graph and the current
//! command list. The framebuffer engine records all its work through it.

mod device_context;
mod execution_context;
mod state;

pub use device_context::DeviceContext;
pub use execution_context::{ExecutionContext, record_commands};
pub use state::{ColorWriteMask, GlState};
