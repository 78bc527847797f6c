//! Research core: pure session state machine and event interpretation.
mod effect;
mod event;
mod msg;
mod snapshot;
mod stage;
mod state;
mod update;

pub use effect::Effect;
pub use event::{
    decode_event, ClientCommand, Complete, EarlyStop, ErrorReported, EventParseError,
    ExtractionComplete, ExtractionStarted, GuardrailComplete, GuardrailRejected, GuardrailStarted,
    ProgressUpdate, RewriterAction, RewriterComplete, RewriterStarted, RewrittenQuery,
    ScrapeComplete, ScrapeStarted, SearchCompleted, SearchFailed, SearchResultSummary,
    SearchStarted, ServerEvent, Stopped, WritingComplete, WritingStarted,
};
pub use msg::Msg;
pub use snapshot::SessionSnapshot;
pub use stage::{Stage, StageKind, StageLedger, StageStatus, INITIALIZING_STAGE_ID};
pub use state::{ConnectionState, SessionState, TaskState};
pub use update::{update, CONNECTION_LOST_ERROR, CONNECT_FAILED_ERROR, RESEARCH_STOPPED_ERROR};
