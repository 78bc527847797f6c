//! Ordered stage ledger for one research run.

/// Id of the synthetic stage shown before the first real stage arrives.
pub const INITIALIZING_STAGE_ID: &str = "initializing";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Initializing,
    Guardrail,
    SearchAndFilter,
    Scrape,
    Extraction,
    Rewriter,
    Writing,
    EarlyStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl StageStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, StageStatus::Completed | StageStatus::Failed)
    }
}

/// One discrete, independently tracked step of the remote task.
///
/// `id` is assigned by the remote and treated as opaque; it stays unique
/// for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub id: String,
    pub kind: StageKind,
    pub status: StageStatus,
    pub title: String,
    pub error: Option<String>,
}

/// Append-or-update collection of stages in arrival order.
///
/// A stage never regresses from a terminal status to a non-terminal one;
/// the only bulk mutation is [`StageLedger::fail_in_progress`], which
/// touches stages still in progress.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StageLedger {
    stages: Vec<Stage>,
}

impl StageLedger {
    /// Fresh ledger for a new run, seeded with the synthetic
    /// `initializing` stage.
    pub fn for_new_run() -> Self {
        Self {
            stages: vec![Stage {
                id: INITIALIZING_STAGE_ID.to_string(),
                kind: StageKind::Initializing,
                status: StageStatus::InProgress,
                title: "Initializing research".to_string(),
                error: None,
            }],
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn get(&self, id: &str) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.id == id)
    }

    /// Records a "started" event: appends a new in-progress stage, or
    /// updates the title of an existing one in place (status is only
    /// rewound to in-progress when the stage is not already terminal).
    pub fn begin(&mut self, id: impl Into<String>, kind: StageKind, title: impl Into<String>) {
        let id = id.into();
        let title = title.into();
        if let Some(stage) = self.stages.iter_mut().find(|stage| stage.id == id) {
            stage.title = title;
            if !stage.status.is_terminal() {
                stage.status = StageStatus::InProgress;
            }
            return;
        }
        self.stages.push(Stage {
            id,
            kind,
            status: StageStatus::InProgress,
            title,
            error: None,
        });
    }

    /// Appends a stage that is born terminal (no prior "started" event).
    pub fn append_completed(
        &mut self,
        id: impl Into<String>,
        kind: StageKind,
        title: impl Into<String>,
    ) {
        let id = id.into();
        if self.stages.iter().any(|stage| stage.id == id) {
            return;
        }
        self.stages.push(Stage {
            id,
            kind,
            status: StageStatus::Completed,
            title: title.into(),
            error: None,
        });
    }

    /// Records a terminal outcome for an existing stage.
    ///
    /// Returns false when the stage is unknown or already terminal; the
    /// caller decides whether that is worth a diagnostic.
    pub fn resolve(&mut self, id: &str, outcome: Result<(), String>) -> bool {
        let Some(stage) = self.stages.iter_mut().find(|stage| stage.id == id) else {
            return false;
        };
        if stage.status.is_terminal() {
            return false;
        }
        match outcome {
            Ok(()) => {
                stage.status = StageStatus::Completed;
                stage.error = None;
            }
            Err(error) => {
                stage.status = StageStatus::Failed;
                stage.error = Some(error);
            }
        }
        true
    }

    /// One-time conversion of the synthetic stage once the first real
    /// stage arrives. Idempotent.
    pub fn complete_initializing(&mut self) {
        if let Some(stage) = self
            .stages
            .iter_mut()
            .find(|stage| stage.id == INITIALIZING_STAGE_ID)
        {
            if stage.status == StageStatus::InProgress {
                stage.status = StageStatus::Completed;
                stage.title = "Research started".to_string();
            }
        }
    }

    /// Bulk sweep used on disconnect and explicit stop: every stage still
    /// in progress becomes failed with the given error. Returns how many
    /// stages were touched.
    pub fn fail_in_progress(&mut self, error: &str) -> usize {
        let mut swept = 0;
        for stage in &mut self.stages {
            if stage.status == StageStatus::InProgress {
                stage.status = StageStatus::Failed;
                stage.error = Some(error.to_string());
                swept += 1;
            }
        }
        swept
    }
}
