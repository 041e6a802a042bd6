//! Hand-built snapshot fixtures shared by the integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use collection_core::{
    domain::{City, CollectionStatus, Customer, DefaultCollection, EconomicIndicator, Loan, Region, State, Tier},
    snapshot::Snapshot,
    types::Quarter,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Fluent builder over a Snapshot. Ids are caller-chosen so tests can
/// create dangling references on purpose.
#[derive(Default)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, state_id: i64, name: &str, region: Region) -> Self {
        self.snapshot.states.push(State {
            state_id,
            state_name: name.into(),
            region,
        });
        self
    }

    pub fn city(mut self, city_id: i64, name: &str, state_id: i64, tier: Tier) -> Self {
        self.snapshot.cities.push(City {
            city_id,
            city_name: name.into(),
            state_id,
            tier_classification: tier,
        });
        self
    }

    pub fn customer(self, customer_id: i64, city_id: i64, employment: &str, income: f64) -> Self {
        self.customer_with_phone(customer_id, city_id, employment, income, Some("+919876543210"))
    }

    pub fn customer_with_phone(
        mut self,
        customer_id: i64,
        city_id: i64,
        employment: &str,
        income: f64,
        phone: Option<&str>,
    ) -> Self {
        self.snapshot.customers.push(Customer {
            customer_id,
            full_name: format!("Customer {customer_id}"),
            phone_number: phone.map(str::to_string),
            email_address: Some(format!("customer{customer_id}@example.in")),
            city_id,
            current_address: None,
            annual_income: income,
            cibil_score: Some(700),
            employment_type: employment.into(),
            gender: None,
            date_of_birth: None,
        });
        self
    }

    pub fn loan(mut self, loan_id: i64, customer_id: i64) -> Self {
        self.snapshot.loans.push(Loan {
            loan_id,
            customer_id,
            loan_amount: 500_000.0,
            loan_status: "Defaulted".into(),
            disbursement_date: Some(date(2022, 6, 1)),
        });
        self
    }

    pub fn default_record(self, default_id: i64, customer_id: i64, loan_id: i64, amount: f64) -> Self {
        self.default_full(default_id, customer_id, loan_id, amount, CollectionStatus::Active, true)
    }

    pub fn default_full(
        mut self,
        default_id: i64,
        customer_id: i64,
        loan_id: i64,
        amount: f64,
        status: CollectionStatus,
        dated: bool,
    ) -> Self {
        self.snapshot.defaults.push(DefaultCollection {
            default_id,
            customer_id,
            loan_id,
            default_date: dated.then(|| date(2024, 3, 1)),
            default_amount: amount,
            days_overdue: dated.then_some(300),
            collection_status: status,
            last_contact_date: None,
            contact_attempts: None,
            legal_notice_sent: None,
            recovery_amount: None,
            collection_agent_id: None,
        });
        self
    }

    pub fn indicator(mut self, indicator_id: i64, state_id: i64, quarter: &str, gdp: Option<f64>) -> Self {
        self.snapshot.indicators.push(EconomicIndicator {
            indicator_id,
            state_id,
            quarter: quarter.parse::<Quarter>().unwrap(),
            gdp_growth_rate: gdp,
            inflation_rate: Some(5.0),
            unemployment_rate: Some(4.0),
            per_capita_income: Some(250_000.0),
        });
        self
    }

    pub fn build(self) -> Snapshot {
        self.snapshot
    }
}

/// One state per region shape the scenarios need.
pub fn geography() -> SnapshotBuilder {
    SnapshotBuilder::new()
        .state(1, "Maharashtra", Region::West)
        .state(2, "Nagaland", Region::Northeast)
        .state(3, "Bihar", Region::East)
        .city(10, "Mumbai", 1, Tier::Tier1)
        .city(11, "Nashik", 1, Tier::Tier2)
        .city(20, "Kohima", 2, Tier::Tier3)
        .city(30, "Patna", 3, Tier::Tier2)
}
