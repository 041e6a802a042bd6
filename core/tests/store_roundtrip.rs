//! SQLite persistence: snapshots, runs, event logs and reports.

use collection_core::{
    config::CollectionConfig,
    error::PipelineError,
    event::EventLogEntry,
    generator::generate_snapshot,
    pipeline::ContactPipeline,
    store::CollectionStore,
};

fn store() -> CollectionStore {
    let store = CollectionStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

#[test]
fn migrations_are_idempotent() {
    let store = store();
    store.migrate().unwrap();
    assert_eq!(store.snapshot_row_count("customers").unwrap(), 0);
}

#[test]
fn snapshot_round_trips_through_sqlite() {
    let config = CollectionConfig::default_test();
    let snapshot = generate_snapshot(11, &config.generator).unwrap();
    let store = store();
    store.replace_snapshot(&snapshot).unwrap();

    assert_eq!(
        store.snapshot_row_count("customers").unwrap(),
        snapshot.customers.len() as i64
    );
    let loaded = store.load_snapshot().unwrap();
    assert_eq!(loaded, snapshot);
}

#[test]
fn replacing_a_snapshot_drops_the_old_rows() {
    let config = CollectionConfig::default_test();
    let store = store();
    store.replace_snapshot(&generate_snapshot(1, &config.generator).unwrap()).unwrap();
    let second = generate_snapshot(2, &config.generator).unwrap();
    store.replace_snapshot(&second).unwrap();
    assert_eq!(store.load_snapshot().unwrap(), second);
}

#[test]
fn sqlite_snapshot_yields_the_same_report() {
    let config = CollectionConfig::default_test();
    let snapshot = generate_snapshot(12, &config.generator).unwrap();
    let store = store();
    store.replace_snapshot(&snapshot).unwrap();

    let pipeline = ContactPipeline::new(&config.pipeline).unwrap();
    let direct = pipeline.run(&snapshot).unwrap().report;
    let via_store = pipeline.run(&store.load_snapshot().unwrap()).unwrap().report;
    assert_eq!(direct.to_csv().unwrap(), via_store.to_csv().unwrap());
}

#[test]
fn recorded_run_can_be_read_back() {
    let config = CollectionConfig::default_test();
    let snapshot = generate_snapshot(13, &config.generator).unwrap();
    let store = store();
    let pipeline = ContactPipeline::new(&config.pipeline).unwrap();

    let (run_id, report) = pipeline.run_and_record(&store, &snapshot, Some(13)).unwrap();

    let run = store.run(&run_id).unwrap();
    assert_eq!(run.seed, Some(13));
    assert_eq!(run.fingerprint, snapshot.fingerprint());
    assert_eq!(run.eligible_customers, Some(report.eligible_customers));
    assert_eq!(store.runs().unwrap().len(), 1);

    let loaded = store.load_report(&run_id).unwrap();
    assert_eq!(loaded.groups.len(), report.groups.len());
    assert_eq!(loaded.audit, report.audit);
    assert_eq!(loaded.to_csv().unwrap(), report.to_csv().unwrap());
}

#[test]
fn event_log_is_sequenced_per_run() {
    let config = CollectionConfig::default_test();
    let snapshot = generate_snapshot(14, &config.generator).unwrap();
    let store = store();
    let pipeline = ContactPipeline::new(&config.pipeline).unwrap();
    let (run_id, _) = pipeline.run_and_record(&store, &snapshot, None).unwrap();

    let events = store.events_for_run(&run_id).unwrap();
    assert_eq!(events.first().map(|e| e.event_type.as_str()), Some("run_started"));
    assert_eq!(events.last().map(|e| e.event_type.as_str()), Some("report_built"));
    for (i, e) in events.iter().enumerate() {
        assert_eq!(e.seq, i as u64);
        let _: serde_json::Value = serde_json::from_str(&e.payload).unwrap();
    }
    let stages = events.iter().filter(|e| e.event_type == "stage_completed").count();
    assert_eq!(stages, 4);
}

#[test]
fn unknown_run_is_reported() {
    let store = store();
    match store.load_report("run-missing") {
        Err(PipelineError::RunNotFound { run_id }) => assert_eq!(run_id, "run-missing"),
        other => panic!("expected RunNotFound, got {other:?}"),
    }
}

#[test]
fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.db");
    let path = path.to_str().unwrap();
    let config = CollectionConfig::default_test();
    let snapshot = generate_snapshot(15, &config.generator).unwrap();

    let store = CollectionStore::open(path).unwrap();
    store.migrate().unwrap();
    store.replace_snapshot(&snapshot).unwrap();
    let pipeline = ContactPipeline::new(&config.pipeline).unwrap();
    let (run_id, _) = pipeline.run_and_record(&store, &snapshot, Some(15)).unwrap();

    let reopened = store.reopen().unwrap();
    reopened.migrate().unwrap();
    assert_eq!(reopened.load_snapshot().unwrap(), snapshot);
    assert_eq!(reopened.run(&run_id).unwrap().seed, Some(15));
}

#[test]
fn failed_report_write_leaves_no_partial_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.db");
    let path = path.to_str().unwrap();
    let config = CollectionConfig::default_test();
    let snapshot = generate_snapshot(21, &config.generator).unwrap();

    let store = CollectionStore::open(path).unwrap();
    store.migrate().unwrap();
    store.replace_snapshot(&snapshot).unwrap();

    // Make the last write of the run fail.
    let side = rusqlite::Connection::open(path).unwrap();
    side.execute_batch(
        "CREATE TRIGGER reject_audit BEFORE INSERT ON exclusion_audit
         BEGIN SELECT RAISE(ABORT, 'audit table is read-only'); END;",
    )
    .unwrap();

    let pipeline = ContactPipeline::new(&config.pipeline).unwrap();
    let result = pipeline.run_and_record(&store, &snapshot, Some(21));
    assert!(matches!(result, Err(PipelineError::Database(_))), "got {result:?}");

    assert!(store.runs().unwrap().is_empty());
    let orphan_events: i64 = side
        .query_row("SELECT COUNT(*) FROM run_event", [], |row| row.get(0))
        .unwrap();
    let orphan_groups: i64 = side
        .query_row("SELECT COUNT(*) FROM contact_plan_group", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphan_events, 0);
    assert_eq!(orphan_groups, 0);
}

#[test]
fn run_can_be_written_step_by_step() {
    let store = store();
    let config = CollectionConfig::default_test();
    let snapshot = generate_snapshot(4, &config.generator).unwrap();
    let run = ContactPipeline::new(&config.pipeline).unwrap().run(&snapshot).unwrap();

    store.insert_run("run-manual", None, "0.0.0", &snapshot.fingerprint()).unwrap();
    assert_eq!(store.run("run-manual").unwrap().eligible_customers, None);
    store
        .append_event(&EventLogEntry {
            id: None,
            run_id: "run-manual".to_string(),
            seq: 0,
            event_type: "report_built".to_string(),
            payload: "{}".to_string(),
        })
        .unwrap();
    store.save_report("run-manual", &run.report).unwrap();

    let loaded = store.load_report("run-manual").unwrap();
    assert_eq!(loaded.eligible_customers, run.report.eligible_customers);
    assert_eq!(loaded.to_csv().unwrap(), run.report.to_csv().unwrap());
    assert_eq!(store.events_for_run("run-manual").unwrap().len(), 1);
}
