/// Resource identity and access declarations for the command graph.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a trackable GPU resource
///
/// Render targets viewing the same image subresource share one id, which
/// is also how aliasing between blit source and destination is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Allocate a new process-unique id
    pub fn allocate() -> Self {
        Self(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

/// One resource access declared by a recorded node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceAccess {
    pub resource: ResourceId,
    pub kind: AccessKind,
}

impl ResourceAccess {
    pub fn read(resource: ResourceId) -> Self {
        Self { resource, kind: AccessKind::Read }
    }

    pub fn write(resource: ResourceId) -> Self {
        Self { resource, kind: AccessKind::Write }
    }
}

/// Anything a recorded command can read or write
///
/// Render targets, staging buffers and framebuffers implement this so that
/// recorded work registers its accesses with the graph.
pub trait CommandGraphResource {
    fn resource_id(&self) -> ResourceId;

    fn read_access(&self) -> ResourceAccess {
        ResourceAccess::read(self.resource_id())
    }

    fn write_access(&self) -> ResourceAccess {
        ResourceAccess::write(self.resource_id())
    }
}
