/// DeviceContext - standard execution context over a GraphicsDevice

use std::sync::Arc;
use crate::command_graph::CommandGraph;
use crate::config::{ContextConfig, RecordingMode};
use crate::device::{CommandList, GraphicsDevice};
use crate::error::Result;
use crate::fb_debug;
use super::execution_context::ExecutionContext;
use super::state::GlState;

/// Execution context owning one command graph and one open command list
pub struct DeviceContext {
    device: Arc<dyn GraphicsDevice>,
    state: GlState,
    recording_mode: RecordingMode,
    graph: CommandGraph,
    commands: Option<Box<dyn CommandList>>,
    submission_count: u64,
}

impl DeviceContext {
    pub fn new(device: Arc<dyn GraphicsDevice>, config: ContextConfig) -> Self {
        Self {
            device,
            state: GlState::default(),
            recording_mode: config.recording_mode,
            graph: CommandGraph::new(),
            commands: None,
            submission_count: 0,
        }
    }

    pub fn state_mut(&mut self) -> &mut GlState {
        &mut self.state
    }

    /// Number of command lists submitted so far
    pub fn submission_count(&self) -> u64 {
        self.submission_count
    }

    /// Current command list, or a newly begun one
    fn take_command_list(&mut self) -> Result<Box<dyn CommandList>> {
        match self.commands.take() {
            Some(commands) => Ok(commands),
            None => {
                let mut commands = self.device.create_command_list()?;
                commands.begin()?;
                Ok(commands)
            }
        }
    }
}

impl ExecutionContext for DeviceContext {
    fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    fn state(&self) -> &GlState {
        &self.state
    }

    fn recording_mode(&self) -> RecordingMode {
        self.recording_mode
    }

    fn command_list(&mut self) -> Result<&mut dyn CommandList> {
        let commands = self.take_command_list()?;
        Ok(self.commands.insert(commands).as_mut())
    }

    fn command_graph(&mut self) -> &mut CommandGraph {
        &mut self.graph
    }

    fn flush(&mut self) -> Result<()> {
        if !self.graph.is_empty() {
            let mut commands = self.take_command_list()?;
            let replayed = self.graph.replay(commands.as_mut())?;
            fb_debug!("glvk::DeviceContext", "replayed {} command graph nodes", replayed);
            self.commands = Some(commands);
        }
        if let Some(mut commands) = self.commands.take() {
            commands.end()?;
            self.device.submit(&[commands.as_ref()])?;
            self.submission_count += 1;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.flush()?;
        self.device.wait_idle()
    }
}

#[cfg(test)]
#[path = "device_context_tests.rs"]
mod tests;
