/// ExecutionContext trait - the owner of command recording

use std::sync::Arc;
use crate::command_graph::{CommandGraph, ResourceAccess};
use crate::config::RecordingMode;
use crate::device::{CommandList, GraphicsDevice};
use crate::error::Result;
use super::state::GlState;

/// Owner of GPU queues, GL state and command recording
pub trait ExecutionContext {
    fn device(&self) -> &Arc<dyn GraphicsDevice>;

    fn state(&self) -> &GlState;

    fn recording_mode(&self) -> RecordingMode;

    /// Command list currently open for direct recording
    fn command_list(&mut self) -> Result<&mut dyn CommandList>;

    fn command_graph(&mut self) -> &mut CommandGraph;

    /// Resolve pending graph nodes and submit them
    fn flush(&mut self) -> Result<()>;

    /// Flush and block until the GPU has finished all submitted work
    fn finish(&mut self) -> Result<()>;
}

/// Record `commands` the way the context's recording mode asks for
///
/// Deferred: added to the command graph with its declared accesses.
/// Direct: recorded now, after any barrier the accesses require. A failing
/// `commands` closes the render pass it left open before the error returns.
pub fn record_commands<F>(
    ctx: &mut dyn ExecutionContext,
    name: &'static str,
    accesses: Vec<ResourceAccess>,
    commands: F,
) -> Result<RecordingMode>
where
    F: FnOnce(&mut dyn CommandList) -> Result<()> + Send + 'static,
{
    let mode = ctx.recording_mode();
    match mode {
        RecordingMode::Deferred => {
            ctx.command_graph().add_node(name, accesses, Box::new(commands));
        }
        RecordingMode::Direct => {
            let barrier = ctx.command_graph().barrier_for(&accesses);
            let list = ctx.command_list()?;
            if let Some(barrier) = barrier {
                list.pipeline_barrier(&barrier)?;
            }
            if let Err(error) = commands(list) {
                // Leave the open list outside any pass so later work still records
                if list.is_inside_render_pass() {
                    list.end_render_pass()?;
                }
                return Err(error);
            }
        }
    }
    Ok(mode)
}
