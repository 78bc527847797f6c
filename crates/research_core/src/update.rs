use crate::event::ServerEvent;
use crate::stage::StageKind;
use crate::{ConnectionState, Effect, Msg, SessionState, TaskState};

/// Error surfaced when the transport drops mid-task.
pub const CONNECTION_LOST_ERROR: &str = "Connection lost";
/// Error surfaced when the connect deadline fires with a start parked.
pub const CONNECT_FAILED_ERROR: &str = "Failed to connect to research service";
/// Error attached to in-progress stages swept by an explicit stop.
pub const RESEARCH_STOPPED_ERROR: &str = "Research stopped";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::ConnectRequested => open_if_disconnected(&mut state),
        Msg::DisconnectRequested => {
            if state.connection() == ConnectionState::Disconnected {
                return (state, Vec::new());
            }
            state.set_connection(ConnectionState::Disconnected);
            state.take_pending_query();
            let mut effects = vec![Effect::CancelConnectDeadline, Effect::CloseConnection];
            effects.extend(handle_disconnect(&mut state));
            effects
        }
        Msg::StartRequested { query } => {
            if state.connection() == ConnectionState::Connected {
                state.begin_run();
                state.set_task(TaskState::Running);
                vec![Effect::SendStart { query }]
            } else {
                // No task is in flight yet; the start is parked until the
                // transport reports open or the deadline fires.
                state.set_task(TaskState::Idle);
                state.set_pending_query(query);
                let mut effects = open_if_disconnected(&mut state);
                effects.push(Effect::ArmConnectDeadline);
                effects
            }
        }
        Msg::StopRequested => {
            if state.connection() == ConnectionState::Connected {
                // All visible effects of stopping arrive via the
                // `stopped` event.
                vec![Effect::SendStop]
            } else {
                Vec::new()
            }
        }
        Msg::TokenProvided { token } => {
            state.set_verification_token(token);
            Vec::new()
        }
        Msg::TransportOpened => {
            state.set_connection(ConnectionState::Connected);
            if let Some(query) = state.take_pending_query() {
                state.begin_run();
                state.set_task(TaskState::Running);
                vec![Effect::CancelConnectDeadline, Effect::SendStart { query }]
            } else {
                Vec::new()
            }
        }
        Msg::TransportClosed => {
            if state.connection() == ConnectionState::Disconnected {
                // Late close from a link we already tore down.
                return (state, Vec::new());
            }
            state.set_connection(ConnectionState::Disconnected);
            handle_disconnect(&mut state)
        }
        Msg::TransportFailed { message } => {
            // The task-state transition happens on the Closed that follows.
            if state.task() == TaskState::Running {
                state.set_error(format!("{CONNECTION_LOST_ERROR}. Please try again."));
            } else {
                state.set_error(message);
            }
            Vec::new()
        }
        Msg::ConnectDeadlineElapsed => {
            if state.connection() != ConnectionState::Connected
                && state.take_pending_query().is_some()
            {
                state.set_task(TaskState::Error);
                state.set_error(CONNECT_FAILED_ERROR);
            }
            Vec::new()
        }
        Msg::Server(event) => apply_event(&mut state, event),
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn open_if_disconnected(state: &mut SessionState) -> Vec<Effect> {
    if state.connection() != ConnectionState::Disconnected {
        return Vec::new();
    }
    state.set_connection(ConnectionState::Connecting);
    state.clear_error();
    vec![Effect::OpenConnection]
}

/// Shared disconnect transition: the token is invalidated on every
/// disconnect, and a task that was running at that moment fails along
/// with all of its in-flight stages. Reads the live task state, so a
/// close arriving after the run already ended touches nothing.
fn handle_disconnect(state: &mut SessionState) -> Vec<Effect> {
    state.clear_verification_token();
    if state.task() == TaskState::Running {
        state.set_task(TaskState::Error);
        state.set_error(CONNECTION_LOST_ERROR);
        state.ledger_mut().fail_in_progress(CONNECTION_LOST_ERROR);
    }
    vec![Effect::RefreshVerification]
}

fn apply_event(state: &mut SessionState, event: ServerEvent) -> Vec<Effect> {
    match event {
        ServerEvent::GuardrailStarted(data) => {
            let ledger = state.ledger_mut();
            ledger.begin(data.stage_id, StageKind::Guardrail, "Safety check");
            ledger.complete_initializing();
        }
        ServerEvent::GuardrailComplete(data) => {
            let outcome = if data.is_acceptable {
                Ok(())
            } else {
                Err(data
                    .reason
                    .unwrap_or_else(|| "Query rejected".to_string()))
            };
            state.ledger_mut().resolve(&data.stage_id, outcome);
        }
        ServerEvent::GuardrailRejected(data) => {
            state.set_task(TaskState::Error);
            state.set_error(
                data.reason
                    .unwrap_or_else(|| "Query rejected by safety guardrail".to_string()),
            );
        }
        ServerEvent::SearchStarted(data) => {
            let title = format!("Search & Filter: {}", data.query);
            let ledger = state.ledger_mut();
            ledger.begin(data.stage_id, StageKind::SearchAndFilter, title);
            ledger.complete_initializing();
        }
        ServerEvent::SearchCompleted(data) => {
            state.ledger_mut().resolve(&data.stage_id, Ok(()));
        }
        ServerEvent::SearchFailed(data) => {
            let error = data.error.unwrap_or_else(|| "Search failed".to_string());
            state.ledger_mut().resolve(&data.stage_id, Err(error));
        }
        ServerEvent::ScrapeStarted(data) => {
            let title = match data.title.as_deref() {
                Some(title) if !title.is_empty() => format!("Scraping: {title}"),
                _ => format!("Scraping: {}", data.url),
            };
            state
                .ledger_mut()
                .begin(data.stage_id, StageKind::Scrape, title);
        }
        ServerEvent::ScrapeComplete(data) => {
            // Outcome is the explicit boolean; `error` is informational.
            let outcome = if data.success {
                Ok(())
            } else {
                Err(data.error.unwrap_or_else(|| "Scrape failed".to_string()))
            };
            state.ledger_mut().resolve(&data.stage_id, outcome);
        }
        ServerEvent::ExtractionStarted(data) => {
            let title = format!("Extracting: {}", data.url);
            state
                .ledger_mut()
                .begin(data.stage_id, StageKind::Extraction, title);
        }
        ServerEvent::ExtractionComplete(data) => {
            // Outcome is derived from the presence of `error`.
            let outcome = match data.error {
                Some(error) => Err(error),
                None => Ok(()),
            };
            state.ledger_mut().resolve(&data.stage_id, outcome);
        }
        ServerEvent::RewriterStarted(data) => {
            state
                .ledger_mut()
                .begin(data.stage_id, StageKind::Rewriter, "Rewriting queries");
        }
        ServerEvent::RewriterComplete(data) => {
            state.ledger_mut().resolve(&data.stage_id, Ok(()));
        }
        ServerEvent::WritingStarted(data) => {
            state
                .ledger_mut()
                .begin(data.stage_id, StageKind::Writing, "Writing response");
        }
        ServerEvent::WritingComplete(data) => {
            state.ledger_mut().resolve(&data.stage_id, Ok(()));
        }
        ServerEvent::EarlyStop(data) => {
            let title = data
                .reason
                .unwrap_or_else(|| "Research stopped early".to_string());
            state
                .ledger_mut()
                .append_completed(data.stage_id, StageKind::EarlyStop, title);
        }
        ServerEvent::Progress(data) => {
            state.set_progress(data.current_step, data.total_steps);
        }
        ServerEvent::Complete(data) => {
            state.set_task(TaskState::Complete);
            state.set_response(data.response);
        }
        ServerEvent::ResearchStarted => {
            // Pure acknowledgement.
        }
        ServerEvent::Stopped(data) => {
            state.set_task(TaskState::Stopped);
            state.set_stopped_with_data(data.has_data);
            state
                .ledger_mut()
                .fail_in_progress(RESEARCH_STOPPED_ERROR);
        }
        ServerEvent::Error(data) => {
            state.set_task(TaskState::Error);
            state.set_error(data.message);
        }
    }
    Vec::new()
}
