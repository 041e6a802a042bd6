//! Stage 1: eligible customer extraction.
//!
//! Joins defaults → loans → customers → cities → states, keeps
//! actionable default records, sums them per customer and drops
//! customers who cannot be contacted or owe nothing.
//!
//! Record-level filters are checked in this order and a record is
//! counted under the first one it fails:
//!   1. default date present
//!   2. collection status actionable
//!   3. referenced loan exists
//!
//! Customer-level filters, same convention:
//!   1. customer exists
//!   2. phone present and long enough
//!   3. summed default amount strictly positive
//!   4. city resolves
//!   5. state resolves

use crate::{
    config::ExtractionConfig,
    domain::{EmploymentClass, Region, Tier},
    error::PipelineResult,
    rules::DecisionTable,
    snapshot::Snapshot,
    stage::PipelineStage,
    types::{CityId, CustomerId, StateId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ── Contact window ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContactWindow {
    #[serde(rename = "Morning 9-11")]
    Morning,
    #[serde(rename = "Office 11-13")]
    Office,
    #[serde(rename = "Afternoon 14-17")]
    Afternoon,
    #[serde(rename = "Evening 18-20")]
    Evening,
}

impl ContactWindow {
    pub fn label(self) -> &'static str {
        match self {
            ContactWindow::Morning => "Morning 9-11",
            ContactWindow::Office => "Office 11-13",
            ContactWindow::Afternoon => "Afternoon 14-17",
            ContactWindow::Evening => "Evening 18-20",
        }
    }
}

impl fmt::Display for ContactWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Optimal contact time from (city tier, employment).
pub fn contact_window_table() -> DecisionTable<(Tier, EmploymentClass), ContactWindow> {
    DecisionTable::new("optimal_contact_time", ContactWindow::Evening)
        .rule(
            "tier1_private_or_corporate",
            |(tier, emp): &(Tier, EmploymentClass)| {
                *tier == Tier::Tier1 && emp.is_private_or_corporate()
            },
            ContactWindow::Morning,
        )
        .rule(
            "government",
            |(_, emp): &(Tier, EmploymentClass)| *emp == EmploymentClass::Government,
            ContactWindow::Office,
        )
        .rule(
            "self_employed",
            |(_, emp): &(Tier, EmploymentClass)| *emp == EmploymentClass::SelfEmployed,
            ContactWindow::Afternoon,
        )
}

// ── Rows and audit ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleCustomer {
    pub customer_id: CustomerId,
    pub full_name: String,
    pub phone_number: String,
    pub employment_type: String,
    pub employment: EmploymentClass,
    pub annual_income: f64,
    pub city_id: CityId,
    pub city_name: String,
    pub state_id: StateId,
    pub state_name: String,
    pub region: Region,
    pub tier: Tier,
    pub total_default_amount: f64,
    pub default_records: u64,
    pub contact_window: ContactWindow,
}

/// Why rows were left out of the pipeline.
///
/// Record-level counters count default rows; customer-level counters
/// count distinct customers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionAudit {
    pub missing_default_date: u64,
    pub non_actionable_status: u64,
    pub orphan_loan: u64,
    pub unknown_customer: u64,
    pub missing_phone: u64,
    pub malformed_phone: u64,
    pub non_positive_total: u64,
    pub unresolved_city: u64,
    pub unresolved_state: u64,
}

impl ExclusionAudit {
    /// Reasons counted per default row; every other reason counts customers.
    pub const RECORD_LEVEL_REASONS: [&'static str; 3] =
        ["missing_default_date", "non_actionable_status", "orphan_loan"];

    /// Reason codes with their counts, in a fixed order.
    pub fn entries(&self) -> [(&'static str, u64); 9] {
        [
            ("missing_default_date", self.missing_default_date),
            ("non_actionable_status", self.non_actionable_status),
            ("orphan_loan", self.orphan_loan),
            ("unknown_customer", self.unknown_customer),
            ("missing_phone", self.missing_phone),
            ("malformed_phone", self.malformed_phone),
            ("non_positive_total", self.non_positive_total),
            ("unresolved_city", self.unresolved_city),
            ("unresolved_state", self.unresolved_state),
        ]
    }

    pub fn set(&mut self, reason: &str, count: u64) {
        match reason {
            "missing_default_date" => self.missing_default_date = count,
            "non_actionable_status" => self.non_actionable_status = count,
            "orphan_loan" => self.orphan_loan = count,
            "unknown_customer" => self.unknown_customer = count,
            "missing_phone" => self.missing_phone = count,
            "malformed_phone" => self.malformed_phone = count,
            "non_positive_total" => self.non_positive_total = count,
            "unresolved_city" => self.unresolved_city = count,
            "unresolved_state" => self.unresolved_state = count,
            other => log::warn!("Unknown exclusion reason: {other}"),
        }
    }

    /// Customers dropped because their geography could not be resolved.
    pub fn flagged_geography(&self) -> u64 {
        self.unresolved_city + self.unresolved_state
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub customers: Vec<EligibleCustomer>,
    pub audit: ExclusionAudit,
}

// ── Stage ──────────────────────────────────────────────────────────

pub struct ExtractionStage {
    config: ExtractionConfig,
    contact_window: DecisionTable<(Tier, EmploymentClass), ContactWindow>,
}

impl ExtractionStage {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            contact_window: contact_window_table(),
        }
    }

    fn phone_is_well_formed(&self, phone: &str) -> bool {
        phone.trim().chars().count() >= self.config.min_phone_length
    }
}

impl<'s> PipelineStage<&'s Snapshot> for ExtractionStage {
    type Output = Extraction;

    fn name(&self) -> &'static str {
        "extraction"
    }

    fn apply(&self, snapshot: &'s Snapshot) -> PipelineResult<Extraction> {
        let index = snapshot.index();
        let mut audit = ExclusionAudit::default();

        // customer_id -> (summed amount, qualifying records)
        let mut totals: BTreeMap<CustomerId, (f64, u64)> = BTreeMap::new();
        // Summed in default_id order so totals do not depend on row order.
        let mut records: Vec<_> = snapshot.defaults.iter().collect();
        records.sort_by_key(|d| d.default_id);
        for d in records {
            if d.default_date.is_none() {
                audit.missing_default_date += 1;
                log::debug!("default {} excluded: missing default date", d.default_id);
                continue;
            }
            if !d.collection_status.is_actionable() {
                audit.non_actionable_status += 1;
                continue;
            }
            if !index.loan_exists(d.loan_id) {
                audit.orphan_loan += 1;
                log::debug!("default {} excluded: loan {} not found", d.default_id, d.loan_id);
                continue;
            }
            let entry = totals.entry(d.customer_id).or_insert((0.0, 0));
            entry.0 += d.default_amount;
            entry.1 += 1;
        }

        let mut customers = Vec::with_capacity(totals.len());
        for (customer_id, (total, records)) in totals {
            let Some(customer) = index.customer(customer_id) else {
                audit.unknown_customer += 1;
                log::debug!("customer {customer_id} excluded: not in customer table");
                continue;
            };
            let phone = match customer.phone_number.as_deref() {
                None => {
                    audit.missing_phone += 1;
                    log::debug!("customer {customer_id} excluded: no phone number");
                    continue;
                }
                Some(p) if !self.phone_is_well_formed(p) => {
                    audit.malformed_phone += 1;
                    log::debug!("customer {customer_id} excluded: malformed phone '{p}'");
                    continue;
                }
                Some(p) => p.trim().to_string(),
            };
            if total <= 0.0 || total.is_nan() {
                audit.non_positive_total += 1;
                continue;
            }
            let Some(city) = index.city(customer.city_id) else {
                audit.unresolved_city += 1;
                log::warn!(
                    "customer {customer_id} flagged: city {} not in dim_city",
                    customer.city_id
                );
                continue;
            };
            let Some(state) = index.state(city.state_id) else {
                audit.unresolved_state += 1;
                log::warn!(
                    "customer {customer_id} flagged: state {} of city {} not in dim_state",
                    city.state_id,
                    city.city_id
                );
                continue;
            };

            let employment = EmploymentClass::classify(&customer.employment_type);
            let tier = city.tier_classification.clone();
            let contact_window = *self.contact_window.evaluate(&(tier.clone(), employment));

            customers.push(EligibleCustomer {
                customer_id,
                full_name: customer.full_name.clone(),
                phone_number: phone,
                employment_type: customer.employment_type.clone(),
                employment,
                annual_income: customer.annual_income,
                city_id: city.city_id,
                city_name: city.city_name.clone(),
                state_id: state.state_id,
                state_name: state.state_name.clone(),
                region: state.region.clone(),
                tier,
                total_default_amount: total,
                default_records: records,
                contact_window,
            });
        }

        log::info!(
            "extraction: {} eligible customers from {} default records",
            customers.len(),
            snapshot.defaults.len()
        );
        for (reason, count) in audit.entries() {
            if count > 0 {
                log::info!("extraction: excluded {count} ({reason})");
            }
        }

        Ok(Extraction { customers, audit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(tier: Tier, label: &str) -> ContactWindow {
        *contact_window_table().evaluate(&(tier, EmploymentClass::classify(label)))
    }

    #[test]
    fn contact_window_ladder() {
        assert_eq!(window(Tier::Tier1, "Private Employee"), ContactWindow::Morning);
        assert_eq!(window(Tier::Tier1, "Corporate Employee"), ContactWindow::Morning);
        // Private outside Tier1 falls through to the catch-all.
        assert_eq!(window(Tier::Tier2, "Private Employee"), ContactWindow::Evening);
        assert_eq!(window(Tier::Tier1, "Government Employee"), ContactWindow::Office);
        assert_eq!(window(Tier::Tier3, "Self Employed"), ContactWindow::Afternoon);
        assert_eq!(window(Tier::Tier1, "Student"), ContactWindow::Evening);
        assert_eq!(window(Tier::Other("Metro".into()), "Business Owner"), ContactWindow::Evening);
    }

    #[test]
    fn audit_entries_round_trip_through_set() {
        let mut audit = ExclusionAudit::default();
        audit.set("orphan_loan", 3);
        audit.set("unresolved_state", 2);
        audit.set("unresolved_city", 1);
        assert_eq!(audit.orphan_loan, 3);
        assert_eq!(audit.flagged_geography(), 3);
        let mut copy = ExclusionAudit::default();
        for (reason, count) in audit.entries() {
            copy.set(reason, count);
        }
        assert_eq!(copy, audit);
    }
}
