/// Command graph: recorded nodes plus the access tracker that turns
/// conflicting accesses into barriers.

use rustc_hash::FxHashMap;
use crate::device::CommandList;
use crate::error::Result;
use crate::fb_trace;
use super::resource::{AccessKind, ResourceAccess, ResourceId};

/// Deferred command recording callback
pub type RecordFn = Box<dyn FnOnce(&mut dyn CommandList) -> Result<()> + Send>;

/// Memory/execution dependency covering all prior work
///
/// `resources` lists the accesses that required it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barrier {
    pub resources: Vec<ResourceId>,
}

struct CommandNode {
    name: &'static str,
    accesses: Vec<ResourceAccess>,
    record: RecordFn,
}

#[derive(Debug, Default, Clone, Copy)]
struct AccessState {
    read: bool,
    written: bool,
}

/// Ordered list of recorded nodes
///
/// The access tracker outlives individual flushes: a write recorded in one
/// submission still orders a read recorded in the next one.
#[derive(Default)]
pub struct CommandGraph {
    nodes: Vec<CommandNode>,
    states: FxHashMap<ResourceId, AccessState>,
    barrier_count: u64,
}

impl CommandGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node; it runs when the graph is replayed
    pub fn add_node(&mut self, name: &'static str, accesses: Vec<ResourceAccess>, record: RecordFn) {
        fb_trace!("glvk::CommandGraph", "node '{}' ({} accesses)", name, accesses.len());
        self.nodes.push(CommandNode { name, accesses, record });
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of barriers emitted so far
    pub fn barrier_count(&self) -> u64 {
        self.barrier_count
    }

    /// Names of the nodes waiting for replay, in order
    pub fn pending_node_names(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|n| n.name).collect()
    }

    /// Register accesses about to be recorded and return the barrier that
    /// must precede them, if any
    ///
    /// A hazard is a read after a write, or a write after any access. A
    /// barrier orders everything before it, so the tracker restarts empty.
    pub fn barrier_for(&mut self, accesses: &[ResourceAccess]) -> Option<Barrier> {
        let mut hazards: Vec<ResourceId> = accesses
            .iter()
            .filter(|access| {
                let state = self.states.get(&access.resource).copied().unwrap_or_default();
                match access.kind {
                    AccessKind::Read => state.written,
                    AccessKind::Write => state.written || state.read,
                }
            })
            .map(|access| access.resource)
            .collect();
        hazards.sort();
        hazards.dedup();

        let barrier = if hazards.is_empty() {
            None
        } else {
            self.states.clear();
            self.barrier_count += 1;
            Some(Barrier { resources: hazards })
        };

        for access in accesses {
            let state = self.states.entry(access.resource).or_default();
            match access.kind {
                AccessKind::Read => state.read = true,
                AccessKind::Write => state.written = true,
            }
        }

        barrier
    }

    /// Record every pending node into `commands`, inserting barriers
    ///
    /// Returns the number of nodes replayed. On error the remaining nodes
    /// are dropped.
    pub fn replay(&mut self, commands: &mut dyn CommandList) -> Result<usize> {
        let nodes = std::mem::take(&mut self.nodes);
        let count = nodes.len();
        for node in nodes {
            if let Some(barrier) = self.barrier_for(&node.accesses) {
                fb_trace!("glvk::CommandGraph", "barrier before '{}' on {:?}", node.name, barrier.resources);
                commands.pipeline_barrier(&barrier)?;
            }
            (node.record)(commands)?;
        }
        Ok(count)
    }

    /// Drop pending nodes without recording them
    pub fn discard_pending(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
#[path = "command_graph_tests.rs"]
mod tests;
