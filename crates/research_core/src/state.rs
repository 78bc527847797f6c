use crate::snapshot::SessionSnapshot;
use crate::stage::StageLedger;

/// Transport lifecycle as observed by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Remote task lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    #[default]
    Idle,
    Running,
    Stopped,
    Complete,
    Error,
}

/// The complete session model. Mutated only by [`crate::update`]; the
/// embedder observes it through [`SessionState::snapshot`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    connection: ConnectionState,
    task: TaskState,
    ledger: StageLedger,
    response: Option<String>,
    error: Option<String>,
    current_step: u32,
    total_steps: u32,
    stopped_with_data: bool,
    verification_token: String,
    /// Query parked while the connect-then-send race is in flight.
    pending_query: Option<String>,
    dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn task(&self) -> TaskState {
        self.task
    }

    pub fn verification_token(&self) -> &str {
        &self.verification_token
    }

    pub fn pending_query(&self) -> Option<&str> {
        self.pending_query.as_deref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            connection: self.connection,
            task: self.task,
            stages: self.ledger.stages().to_vec(),
            response: self.response.clone(),
            error: self.error.clone(),
            current_step: self.current_step,
            total_steps: self.total_steps,
            stopped_with_data: self.stopped_with_data,
            verification_token: self.verification_token.clone(),
        }
    }

    /// Returns whether the state changed since the last call and clears
    /// the flag. Embedders use this to throttle rendering.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_connection(&mut self, connection: ConnectionState) {
        if self.connection != connection {
            self.connection = connection;
            self.dirty = true;
        }
    }

    pub(crate) fn set_task(&mut self, task: TaskState) {
        if self.task != task {
            self.task = task;
            self.dirty = true;
        }
    }

    pub(crate) fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.dirty = true;
    }

    pub(crate) fn clear_error(&mut self) {
        if self.error.take().is_some() {
            self.dirty = true;
        }
    }

    pub(crate) fn set_response(&mut self, response: impl Into<String>) {
        self.response = Some(response.into());
        self.dirty = true;
    }

    pub(crate) fn set_progress(&mut self, current_step: u32, total_steps: u32) {
        self.current_step = current_step;
        self.total_steps = total_steps;
        self.dirty = true;
    }

    pub(crate) fn set_stopped_with_data(&mut self, has_data: bool) {
        self.stopped_with_data = has_data;
        self.dirty = true;
    }

    pub(crate) fn set_verification_token(&mut self, token: impl Into<String>) {
        self.verification_token = token.into();
        self.dirty = true;
    }

    pub(crate) fn clear_verification_token(&mut self) {
        if !self.verification_token.is_empty() {
            self.verification_token.clear();
            self.dirty = true;
        }
    }

    pub(crate) fn set_pending_query(&mut self, query: String) {
        self.pending_query = Some(query);
    }

    pub(crate) fn take_pending_query(&mut self) -> Option<String> {
        self.pending_query.take()
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut StageLedger {
        self.dirty = true;
        &mut self.ledger
    }

    /// Resets every run-scoped field. Called immediately before a start
    /// command is transmitted, never earlier, so a still-valid prior
    /// result survives while a reconnect is pending.
    pub(crate) fn begin_run(&mut self) {
        self.ledger = StageLedger::for_new_run();
        self.response = None;
        self.error = None;
        self.current_step = 0;
        self.total_steps = 0;
        self.stopped_with_data = false;
        self.dirty = true;
    }
}
