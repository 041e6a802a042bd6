//! Loading snapshots from a directory of CSV files.

mod common;

use collection_core::{
    config::CollectionConfig,
    csv_io::{load_snapshot_dir, write_snapshot_dir, INDICATORS_FILE},
    error::PipelineError,
    generator::generate_snapshot,
    pipeline::ContactPipeline,
    store::CollectionStore,
};
use std::fs;

#[test]
fn written_snapshot_loads_back_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = generate_snapshot(21, &CollectionConfig::default_test().generator).unwrap();

    write_snapshot_dir(dir.path(), &snapshot).unwrap();
    let loaded = load_snapshot_dir(dir.path()).unwrap();
    assert_eq!(loaded, snapshot);
}

#[test]
fn missing_indicator_file_means_no_indicators() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = common::geography()
        .customer(1, 10, "Private Employee", 900_000.0)
        .loan(100, 1)
        .default_record(1, 1, 100, 100_000.0)
        .indicator(1, 1, "2024-Q1", Some(6.0))
        .build();
    write_snapshot_dir(dir.path(), &snapshot).unwrap();
    fs::remove_file(dir.path().join(INDICATORS_FILE)).unwrap();

    let loaded = load_snapshot_dir(dir.path()).unwrap();
    assert!(loaded.indicators.is_empty());

    let report = ContactPipeline::new(&CollectionConfig::default().pipeline)
        .unwrap()
        .run(&loaded)
        .unwrap()
        .report;
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].customers_with_indicators, 0);
    assert_eq!(report.groups[0].avg_unemployment_rate, None);
}

#[test]
fn hand_written_files_with_extra_columns_load() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path();
    fs::write(p.join("dim_state.csv"), "state_id,state_name,region\n1,Goa,West\n").unwrap();
    fs::write(
        p.join("dim_city.csv"),
        "city_id,city_name,state_id,tier_classification\n5,Panaji,1,Tier3\n",
    )
    .unwrap();
    fs::write(
        p.join("customers.csv"),
        "customer_id,full_name,phone_number,city_id,annual_income,employment_type,employer_name\n\
         1,Asha Naik,+919812345678,5,350000,Self Employed,Freelance\n\
         2,Ravi Kamat,,5,450000,Private Employee,TCS\n",
    )
    .unwrap();
    fs::write(
        p.join("loans.csv"),
        "loan_id,customer_id,loan_amount,loan_status,interest_rate\n10,1,400000,Defaulted,12.5\n20,2,300000,Overdue,11.0\n",
    )
    .unwrap();
    fs::write(
        p.join("defaults_collections.csv"),
        "default_id,customer_id,loan_id,default_date,default_amount,days_overdue,collection_status,contact_attempts\n\
         1,1,10,2024-06-01,120000.50,200,Active,12\n\
         2,2,20,2024-05-01,90000,231,In Progress,4\n\
         3,1,10,,5000,,Active,1\n",
    )
    .unwrap();

    let snapshot = load_snapshot_dir(p).unwrap();
    assert_eq!(snapshot.customers.len(), 2);
    assert_eq!(snapshot.customers[1].phone_number, None);
    assert_eq!(snapshot.defaults[2].default_date, None);

    let report = ContactPipeline::new(&CollectionConfig::default().pipeline)
        .unwrap()
        .run(&snapshot)
        .unwrap()
        .report;
    assert_eq!(report.eligible_customers, 1);
    assert_eq!(report.audit.missing_phone, 1);
    assert_eq!(report.audit.missing_default_date, 1);
    assert_eq!(report.groups[0].key.calling_zone.label(), "WEST_ZONE_1");
    assert_eq!(report.groups[0].total_default_amount, 120_000.5);
}

#[test]
fn malformed_quarter_names_table_and_row() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = common::geography().build();
    write_snapshot_dir(dir.path(), &snapshot).unwrap();
    fs::write(
        dir.path().join(INDICATORS_FILE),
        "indicator_id,state_id,quarter,gdp_growth_rate,inflation_rate,unemployment_rate,per_capita_income\n\
         1,1,2024-Q1,7.1,5.0,4.2,300000\n\
         2,1,2024-Q9,7.1,5.0,4.2,300000\n",
    )
    .unwrap();

    match load_snapshot_dir(dir.path()) {
        Err(PipelineError::MalformedRecord { table, row, .. }) => {
            assert_eq!(table, "economic_indicators");
            assert_eq!(row, 1);
        }
        other => panic!("expected MalformedRecord, got {other:?}"),
    }
}

#[test]
fn missing_required_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_snapshot_dir(dir.path()).is_err());
}

#[test]
fn collection_activity_columns_survive_import_and_storage() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = common::geography()
        .customer(1, 10, "Private Employee", 900_000.0)
        .loan(100, 1)
        .build();
    write_snapshot_dir(dir.path(), &snapshot).unwrap();
    fs::write(
        dir.path().join("defaults_collections.csv"),
        "default_id,customer_id,loan_id,default_date,default_amount,days_overdue,collection_status,\
         last_contact_date,contact_attempts,legal_notice_sent,recovery_amount,collection_agent_id\n\
         1,1,100,2024-01-10,250000.0,356,Legal Action,2024-11-20,17,True,61000.25,42\n\
         2,1,100,2024-09-01,80000.0,121,Active,2024-12-01,6,False,0.0,7\n\
         3,1,100,2024-10-01,40000.0,91,Active,,,,,\n",
    )
    .unwrap();

    let loaded = load_snapshot_dir(dir.path()).unwrap();
    let first = &loaded.defaults[0];
    assert_eq!(first.last_contact_date, Some(common::date(2024, 11, 20)));
    assert_eq!(first.contact_attempts, Some(17));
    assert_eq!(first.legal_notice_sent, Some(true));
    assert_eq!(first.recovery_amount, Some(61_000.25));
    assert_eq!(first.collection_agent_id, Some(42));
    assert_eq!(loaded.defaults[1].legal_notice_sent, Some(false));
    assert_eq!(loaded.defaults[2].legal_notice_sent, None);
    assert_eq!(loaded.defaults[2].last_contact_date, None);

    let store = CollectionStore::in_memory().unwrap();
    store.migrate().unwrap();
    store.replace_snapshot(&loaded).unwrap();
    assert_eq!(store.load_snapshot().unwrap(), loaded);
}

#[test]
fn unreadable_legal_notice_flag_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = common::geography().customer(1, 10, "Student", 100_000.0).loan(100, 1).build();
    write_snapshot_dir(dir.path(), &snapshot).unwrap();
    fs::write(
        dir.path().join("defaults_collections.csv"),
        "default_id,customer_id,loan_id,default_date,default_amount,collection_status,legal_notice_sent\n\
         1,1,100,2024-01-10,250000.0,Active,maybe\n",
    )
    .unwrap();

    assert!(matches!(
        load_snapshot_dir(dir.path()),
        Err(PipelineError::MalformedRecord { ref table, row: 0, .. }) if table == "defaults_collections"
    ));
}
