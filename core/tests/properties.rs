//! Invariants over a generated snapshot.

use collection_core::{
    aggregation::{daily_call_capacity, BASE_RECOVERY_RATE},
    config::{CollectionConfig, ExtractionConfig, ScoringConfig},
    extraction::ExtractionStage,
    generator::generate_snapshot,
    pipeline::ContactPipeline,
    scoring::{ScoringStage, SUCCESS_MULTIPLIERS},
    snapshot::Snapshot,
    stage::PipelineStage,
    zoning::{ZonedCustomer, ZoningStage},
};
use std::collections::{BTreeMap, HashSet};

const SEED: u64 = 0x5EED_0F_C011;

fn snapshot() -> Snapshot {
    generate_snapshot(SEED, &CollectionConfig::default_test().generator).unwrap()
}

fn zoned(snapshot: &Snapshot) -> Vec<ZonedCustomer> {
    let eligible = ExtractionStage::new(ExtractionConfig::default())
        .apply(snapshot)
        .unwrap()
        .customers;
    let scored = ScoringStage::new(&ScoringConfig::default()).apply(eligible).unwrap();
    ZoningStage::new().apply(scored).unwrap()
}

#[test]
fn generated_snapshot_yields_a_plan() {
    let snapshot = snapshot();
    let report = ContactPipeline::new(&CollectionConfig::default_test().pipeline)
        .unwrap()
        .run(&snapshot)
        .unwrap()
        .report;
    assert!(report.eligible_customers > 0, "no eligible customers");
    assert!(!report.groups.is_empty());
}

#[test]
fn success_multiplier_is_always_one_of_four_values() {
    for c in zoned(&snapshot()) {
        assert!(
            SUCCESS_MULTIPLIERS.contains(&c.scored.success_multiplier),
            "customer {} has multiplier {}",
            c.scored.customer.customer_id,
            c.scored.success_multiplier
        );
    }
}

#[test]
fn only_customers_with_actionable_defaults_are_eligible() {
    let snapshot = snapshot();
    let actionable: HashSet<i64> = snapshot
        .defaults
        .iter()
        .filter(|d| d.default_date.is_some() && d.collection_status.is_actionable())
        .map(|d| d.customer_id)
        .collect();
    for c in zoned(&snapshot) {
        let id = c.scored.customer.customer_id;
        assert!(actionable.contains(&id), "customer {id} has no actionable default");
        assert!(c.scored.customer.total_default_amount > 0.0);
        assert!(c.scored.customer.phone_number.len() >= 10);
    }
}

#[test]
fn group_counts_add_up_to_eligible_customers() {
    let snapshot = snapshot();
    let report = ContactPipeline::new(&CollectionConfig::default_test().pipeline)
        .unwrap()
        .run(&snapshot)
        .unwrap()
        .report;
    let grouped: u64 = report.groups.iter().map(|g| g.customer_count).sum();
    assert_eq!(grouped, report.eligible_customers);
}

#[test]
fn daily_capacity_is_ceiling_of_count_over_rate() {
    let snapshot = snapshot();
    let report = ContactPipeline::new(&CollectionConfig::default_test().pipeline)
        .unwrap()
        .run(&snapshot)
        .unwrap()
        .report;
    for g in &report.groups {
        let expected = (g.customer_count as f64 / g.calls_per_hour).ceil() as u64;
        assert_eq!(g.daily_call_capacity, expected, "group {:?}", g.key);
        assert!(g.daily_call_capacity > 0);
        assert_eq!(daily_call_capacity(g.customer_count, g.calls_per_hour), expected);
    }
}

#[test]
fn expected_collection_is_sum_of_member_contributions() {
    let snapshot = snapshot();
    let mut by_key: BTreeMap<_, f64> = BTreeMap::new();
    for c in zoned(&snapshot) {
        *by_key.entry(collection_core::aggregation::GroupKey::of(&c)).or_default() +=
            c.scored.customer.total_default_amount * c.scored.success_multiplier * BASE_RECOVERY_RATE;
    }

    let report = ContactPipeline::new(&CollectionConfig::default_test().pipeline)
        .unwrap()
        .run(&snapshot)
        .unwrap()
        .report;
    assert_eq!(report.groups.len(), by_key.len());
    for g in &report.groups {
        let expected = by_key[&g.key];
        assert!(
            (g.expected_collection - expected).abs() <= 1e-6 * expected.max(1.0),
            "group {:?}: {} vs {}",
            g.key,
            g.expected_collection,
            expected
        );
    }
}

#[test]
fn groups_are_in_report_order() {
    let report = ContactPipeline::new(&CollectionConfig::default_test().pipeline)
        .unwrap()
        .run(&snapshot())
        .unwrap()
        .report;
    for pair in report.groups.windows(2) {
        assert!(
            pair[0].expected_collection >= pair[1].expected_collection,
            "{} before {}",
            pair[0].expected_collection,
            pair[1].expected_collection
        );
    }
}

#[test]
fn audit_matches_injected_phone_faults() {
    let snapshot = snapshot();
    // Customers that reach the phone check: at least one qualifying record.
    let loans: HashSet<i64> = snapshot.loans.iter().map(|l| l.loan_id).collect();
    let candidates: HashSet<i64> = snapshot
        .defaults
        .iter()
        .filter(|d| d.default_date.is_some() && d.collection_status.is_actionable() && loans.contains(&d.loan_id))
        .map(|d| d.customer_id)
        .collect();
    let missing = snapshot
        .customers
        .iter()
        .filter(|c| candidates.contains(&c.customer_id) && c.phone_number.is_none())
        .count() as u64;
    let short = snapshot
        .customers
        .iter()
        .filter(|c| candidates.contains(&c.customer_id))
        .filter(|c| c.phone_number.as_deref().is_some_and(|p| p.len() < 10))
        .count() as u64;
    let undated = snapshot.defaults.iter().filter(|d| d.default_date.is_none()).count() as u64;

    let audit = ExtractionStage::new(ExtractionConfig::default())
        .apply(&snapshot)
        .unwrap()
        .audit;
    assert_eq!(audit.missing_phone, missing);
    assert_eq!(audit.malformed_phone, short);
    assert_eq!(audit.missing_default_date, undated);
    assert!(undated > 0, "default_test config should inject undated defaults");
}
