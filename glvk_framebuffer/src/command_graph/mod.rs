//! Command graph module
//!
//! Deferred recording of GPU work. Every recorded node declares the
//! resources it reads and writes; conflicting accesses between nodes are
//! resolved into barriers when the graph is replayed into a command list.

mod command_graph;
mod resource;

pub use command_graph::{Barrier, CommandGraph, RecordFn};
pub use resource::{AccessKind, CommandGraphResource, ResourceAccess, ResourceId};
