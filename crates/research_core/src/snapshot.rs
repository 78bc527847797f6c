use crate::stage::Stage;
use crate::state::{ConnectionState, TaskState};

/// The externally observable session state at one instant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub connection: ConnectionState,
    pub task: TaskState,
    pub stages: Vec<Stage>,
    /// Set exactly once per run, by the terminal `complete` event.
    pub response: Option<String>,
    pub error: Option<String>,
    pub current_step: u32,
    pub total_steps: u32,
    /// Whether the remote had partial results at the moment of stopping.
    pub stopped_with_data: bool,
    pub verification_token: String,
}
