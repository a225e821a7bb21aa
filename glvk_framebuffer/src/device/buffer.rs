/// Host-visible buffer used for staging copies

use crate::command_graph::CommandGraphResource;
use crate::error::Result;

/// Transfer direction a buffer is allocated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Image-to-buffer copies read back by the host
    Readback,
    /// Host-written data copied into images
    Upload,
    /// Both directions
    Transfer,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    pub usage: BufferUsage,
}

/// Host-visible buffer
///
/// Destroyed when dropped.
pub trait Buffer: CommandGraphResource + Send + Sync {
    fn size(&self) -> u64;

    /// Write `data` at `offset`
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Read `out.len()` bytes starting at `offset`
    ///
    /// Only meaningful once the GPU work writing the range has completed.
    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()>;
}
