use std::collections::HashMap;
use std::thread;

use client_logging::client_warn;
use research_app::logging::{self, LogDestination};
use research_app::{ClientConfig, SessionController};
use research_core::{SessionSnapshot, StageStatus, TaskState};

fn main() -> anyhow::Result<()> {
    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.is_empty() {
        eprintln!("usage: research_app <query>");
        std::process::exit(2);
    }

    logging::initialize(LogDestination::File);

    let config = ClientConfig::from_env();
    let poll_interval = config.poll_interval;
    let mut controller = SessionController::new(config)?;
    controller.on_verification_refresh(|| {
        // A CLI has no verification widget; the operator supplies a token
        // via the next invocation.
        client_warn!("verification token invalidated; a fresh token is required");
    });

    println!("Researching: {query}");
    controller.start_research(query);

    let mut printed_stages: HashMap<String, StageStatus> = HashMap::new();
    let mut printed_progress = (0u32, 0u32);
    loop {
        if controller.pump() {
            let snapshot = controller.snapshot();
            print_stage_updates(&snapshot, &mut printed_stages);
            print_progress(&snapshot, &mut printed_progress);

            match snapshot.task {
                TaskState::Complete => {
                    match snapshot.response.as_deref() {
                        Some(response) => println!("\n{response}"),
                        None => println!("\nResearch complete."),
                    }
                    return Ok(());
                }
                TaskState::Stopped => {
                    if snapshot.stopped_with_data {
                        println!("\nResearch stopped; partial results were gathered.");
                    } else {
                        println!("\nResearch stopped.");
                    }
                    return Ok(());
                }
                TaskState::Error => {
                    let error = snapshot.error.as_deref().unwrap_or("unknown error");
                    eprintln!("\nResearch failed: {error}");
                    std::process::exit(1);
                }
                TaskState::Idle | TaskState::Running => {}
            }
        }
        thread::sleep(poll_interval);
    }
}

fn print_stage_updates(snapshot: &SessionSnapshot, printed: &mut HashMap<String, StageStatus>) {
    for stage in &snapshot.stages {
        if printed.get(&stage.id) == Some(&stage.status) {
            continue;
        }
        printed.insert(stage.id.clone(), stage.status);
        match (stage.status, stage.error.as_deref()) {
            (StageStatus::Failed, Some(error)) => {
                println!("[{:?}] {} ({error})", stage.status, stage.title);
            }
            _ => println!("[{:?}] {}", stage.status, stage.title),
        }
    }
}

fn print_progress(snapshot: &SessionSnapshot, printed: &mut (u32, u32)) {
    let progress = (snapshot.current_step, snapshot.total_steps);
    if progress != *printed && progress.1 > 0 {
        *printed = progress;
        println!("  step {}/{}", progress.0, progress.1);
    }
}
