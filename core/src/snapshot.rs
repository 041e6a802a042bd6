//! The relational snapshot the pipeline reads.
//!
//! A snapshot is loaded once, in bulk, and never mutated by the
//! pipeline. Lookups go through SnapshotIndex, which borrows it.

use crate::{
    domain::{City, Customer, DefaultCollection, EconomicIndicator, Loan, State},
    types::{CityId, CustomerId, LoanId, StateId},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub states: Vec<State>,
    pub cities: Vec<City>,
    pub customers: Vec<Customer>,
    pub loans: Vec<Loan>,
    pub defaults: Vec<DefaultCollection>,
    pub indicators: Vec<EconomicIndicator>,
}

impl Snapshot {
    /// Row counts per table, in a stable textual form.
    /// Stored on each run record to tie a report to its input.
    pub fn fingerprint(&self) -> String {
        format!(
            "states={} cities={} customers={} loans={} defaults={} indicators={}",
            self.states.len(),
            self.cities.len(),
            self.customers.len(),
            self.loans.len(),
            self.defaults.len(),
            self.indicators.len(),
        )
    }

    pub fn index(&self) -> SnapshotIndex<'_> {
        SnapshotIndex::build(self)
    }
}

/// Primary-key lookups over a snapshot.
pub struct SnapshotIndex<'a> {
    states: HashMap<StateId, &'a State>,
    cities: HashMap<CityId, &'a City>,
    customers: HashMap<CustomerId, &'a Customer>,
    loans: HashSet<LoanId>,
    latest_indicator: HashMap<StateId, &'a EconomicIndicator>,
}

impl<'a> SnapshotIndex<'a> {
    fn build(snapshot: &'a Snapshot) -> Self {
        let mut latest_indicator: HashMap<StateId, &'a EconomicIndicator> = HashMap::new();
        for ind in &snapshot.indicators {
            latest_indicator
                .entry(ind.state_id)
                .and_modify(|cur| {
                    // Latest quarter wins; same quarter resolves to the higher id.
                    if (ind.quarter, ind.indicator_id) > (cur.quarter, cur.indicator_id) {
                        *cur = ind;
                    }
                })
                .or_insert(ind);
        }

        Self {
            states: snapshot.states.iter().map(|s| (s.state_id, s)).collect(),
            cities: snapshot.cities.iter().map(|c| (c.city_id, c)).collect(),
            customers: snapshot.customers.iter().map(|c| (c.customer_id, c)).collect(),
            loans: snapshot.loans.iter().map(|l| l.loan_id).collect(),
            latest_indicator,
        }
    }

    pub fn state(&self, id: StateId) -> Option<&'a State> {
        self.states.get(&id).copied()
    }

    pub fn city(&self, id: CityId) -> Option<&'a City> {
        self.cities.get(&id).copied()
    }

    pub fn customer(&self, id: CustomerId) -> Option<&'a Customer> {
        self.customers.get(&id).copied()
    }

    pub fn loan_exists(&self, id: LoanId) -> bool {
        self.loans.contains(&id)
    }

    /// Most recent indicator row for a state, by reporting quarter.
    pub fn latest_indicator(&self, state_id: StateId) -> Option<&'a EconomicIndicator> {
        self.latest_indicator.get(&state_id).copied()
    }
}
