use research_core::{StageKind, StageLedger, StageStatus, INITIALIZING_STAGE_ID};

#[test]
fn new_run_starts_with_initializing_stage() {
    let ledger = StageLedger::for_new_run();

    assert_eq!(ledger.stages().len(), 1);
    let stage = &ledger.stages()[0];
    assert_eq!(stage.id, INITIALIZING_STAGE_ID);
    assert_eq!(stage.kind, StageKind::Initializing);
    assert_eq!(stage.status, StageStatus::InProgress);
}

#[test]
fn begin_appends_new_ids_and_updates_existing_in_place() {
    let mut ledger = StageLedger::for_new_run();

    ledger.begin("s1", StageKind::Scrape, "Scraping: a");
    ledger.begin("s2", StageKind::Scrape, "Scraping: b");
    assert_eq!(ledger.stages().len(), 3);

    // Same id again: no duplicate entry, title refreshed.
    ledger.begin("s1", StageKind::Scrape, "Scraping: a (retry)");
    assert_eq!(ledger.stages().len(), 3);
    assert_eq!(ledger.get("s1").unwrap().title, "Scraping: a (retry)");
    assert_eq!(ledger.get("s1").unwrap().status, StageStatus::InProgress);
}

#[test]
fn begin_preserves_append_order() {
    let mut ledger = StageLedger::for_new_run();
    ledger.begin("b", StageKind::Scrape, "b");
    ledger.begin("a", StageKind::Scrape, "a");

    let ids: Vec<_> = ledger.stages().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec![INITIALIZING_STAGE_ID, "b", "a"]);
}

#[test]
fn resolve_sets_terminal_status_and_error() {
    let mut ledger = StageLedger::for_new_run();
    ledger.begin("s1", StageKind::Extraction, "Extracting");
    ledger.begin("s2", StageKind::Extraction, "Extracting");

    assert!(ledger.resolve("s1", Ok(())));
    assert!(ledger.resolve("s2", Err("boom".to_string())));

    assert_eq!(ledger.get("s1").unwrap().status, StageStatus::Completed);
    assert_eq!(ledger.get("s1").unwrap().error, None);
    assert_eq!(ledger.get("s2").unwrap().status, StageStatus::Failed);
    assert_eq!(ledger.get("s2").unwrap().error.as_deref(), Some("boom"));
}

#[test]
fn resolve_never_regresses_a_terminal_stage() {
    let mut ledger = StageLedger::for_new_run();
    ledger.begin("s1", StageKind::Scrape, "Scraping");
    assert!(ledger.resolve("s1", Ok(())));

    // A second terminal event for the same stage is ignored.
    assert!(!ledger.resolve("s1", Err("late failure".to_string())));
    assert_eq!(ledger.get("s1").unwrap().status, StageStatus::Completed);
    assert_eq!(ledger.get("s1").unwrap().error, None);
}

#[test]
fn begin_on_terminal_stage_keeps_terminal_status() {
    let mut ledger = StageLedger::for_new_run();
    ledger.begin("s1", StageKind::Scrape, "Scraping");
    ledger.resolve("s1", Ok(()));

    ledger.begin("s1", StageKind::Scrape, "Scraping again");
    assert_eq!(ledger.get("s1").unwrap().status, StageStatus::Completed);
    assert_eq!(ledger.get("s1").unwrap().title, "Scraping again");
}

#[test]
fn resolve_unknown_stage_reports_false() {
    let mut ledger = StageLedger::for_new_run();
    assert!(!ledger.resolve("ghost", Ok(())));
}

#[test]
fn complete_initializing_is_one_time_and_idempotent() {
    let mut ledger = StageLedger::for_new_run();

    ledger.complete_initializing();
    let stage = ledger.get(INITIALIZING_STAGE_ID).unwrap();
    assert_eq!(stage.status, StageStatus::Completed);
    assert_eq!(stage.title, "Research started");

    // Second call leaves it untouched.
    ledger.complete_initializing();
    let stage = ledger.get(INITIALIZING_STAGE_ID).unwrap();
    assert_eq!(stage.status, StageStatus::Completed);
    assert_eq!(stage.title, "Research started");
}

#[test]
fn fail_in_progress_only_touches_in_progress_stages() {
    let mut ledger = StageLedger::for_new_run();
    ledger.complete_initializing();
    ledger.begin("done", StageKind::Scrape, "done");
    ledger.resolve("done", Ok(()));
    ledger.begin("running", StageKind::Scrape, "running");

    let swept = ledger.fail_in_progress("Connection lost");
    assert_eq!(swept, 1);

    assert_eq!(ledger.get("done").unwrap().status, StageStatus::Completed);
    assert_eq!(
        ledger.get(INITIALIZING_STAGE_ID).unwrap().status,
        StageStatus::Completed
    );
    let failed = ledger.get("running").unwrap();
    assert_eq!(failed.status, StageStatus::Failed);
    assert_eq!(failed.error.as_deref(), Some("Connection lost"));
}

#[test]
fn append_completed_ignores_duplicate_ids() {
    let mut ledger = StageLedger::for_new_run();
    ledger.append_completed("early", StageKind::EarlyStop, "Stopped early");
    ledger.append_completed("early", StageKind::EarlyStop, "Stopped again");

    assert_eq!(ledger.stages().len(), 2);
    assert_eq!(ledger.get("early").unwrap().title, "Stopped early");
}
