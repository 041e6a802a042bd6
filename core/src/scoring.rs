//! Stage 2: success scoring and contact method.
//!
//! Extends each eligible customer with a success multiplier, a contact
//! method and a priority level. Works only on stage 1 rows.

use crate::{
    config::ScoringConfig,
    domain::{EmploymentClass, Tier},
    error::PipelineResult,
    extraction::EligibleCustomer,
    rules::DecisionTable,
    stage::PipelineStage,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContactMethod {
    #[serde(rename = "Email+Phone")]
    EmailPhone,
    #[serde(rename = "Formal Letter+Phone")]
    FormalLetterPhone,
    #[serde(rename = "Phone Only")]
    PhoneOnly,
    #[serde(rename = "Phone+SMS")]
    PhoneSms,
}

impl ContactMethod {
    pub fn label(self) -> &'static str {
        match self {
            ContactMethod::EmailPhone => "Email+Phone",
            ContactMethod::FormalLetterPhone => "Formal Letter+Phone",
            ContactMethod::PhoneOnly => "Phone Only",
            ContactMethod::PhoneSms => "Phone+SMS",
        }
    }
}

impl fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shared by the collection priority and the economic priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityLevel {
    High,
    Medium,
    Standard,
}

impl PriorityLevel {
    pub fn label(self) -> &'static str {
        match self {
            PriorityLevel::High => "High",
            PriorityLevel::Medium => "Medium",
            PriorityLevel::Standard => "Standard",
        }
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const SUCCESS_MULTIPLIERS: [f64; 4] = [1.0, 1.1, 1.2, 1.3];

pub fn success_multiplier_table() -> DecisionTable<(EmploymentClass, Tier), f64> {
    DecisionTable::new("success_multiplier", 1.0)
        .rule(
            "private_or_corporate_tier1",
            |(emp, tier): &(EmploymentClass, Tier)| {
                emp.is_private_or_corporate() && *tier == Tier::Tier1
            },
            1.3,
        )
        .rule(
            "government",
            |(emp, _): &(EmploymentClass, Tier)| *emp == EmploymentClass::Government,
            1.2,
        )
        .rule("tier1", |(_, tier): &(EmploymentClass, Tier)| *tier == Tier::Tier1, 1.1)
}

/// Input is (tier, annual income, employment).
pub fn contact_method_table(
    config: &ScoringConfig,
) -> DecisionTable<(Tier, f64, EmploymentClass), ContactMethod> {
    let email_income = config.email_income_threshold;
    let phone_only_income = config.phone_only_income_threshold;
    DecisionTable::new("contact_method", ContactMethod::PhoneSms)
        .rule(
            "tier1_high_income",
            move |(tier, income, _): &(Tier, f64, EmploymentClass)| {
                *tier == Tier::Tier1 && *income > email_income
            },
            ContactMethod::EmailPhone,
        )
        .rule(
            "government",
            |(_, _, emp): &(Tier, f64, EmploymentClass)| *emp == EmploymentClass::Government,
            ContactMethod::FormalLetterPhone,
        )
        .rule(
            "low_income_or_tier3",
            move |(tier, income, _): &(Tier, f64, EmploymentClass)| {
                *income < phone_only_income || *tier == Tier::Tier3
            },
            ContactMethod::PhoneOnly,
        )
}

/// Input is (total default amount, tier).
pub fn priority_table(config: &ScoringConfig) -> DecisionTable<(f64, Tier), PriorityLevel> {
    let high = config.high_priority_amount;
    let medium = config.medium_priority_amount;
    DecisionTable::new("priority_level", PriorityLevel::Standard)
        .rule(
            "large_tier1_balance",
            move |(amount, tier): &(f64, Tier)| *amount > high && *tier == Tier::Tier1,
            PriorityLevel::High,
        )
        .rule(
            "medium_balance",
            move |(amount, _): &(f64, Tier)| *amount > medium,
            PriorityLevel::Medium,
        )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCustomer {
    #[serde(flatten)]
    pub customer: EligibleCustomer,
    pub success_multiplier: f64,
    pub contact_method: ContactMethod,
    pub priority: PriorityLevel,
}

pub struct ScoringStage {
    multiplier: DecisionTable<(EmploymentClass, Tier), f64>,
    method: DecisionTable<(Tier, f64, EmploymentClass), ContactMethod>,
    priority: DecisionTable<(f64, Tier), PriorityLevel>,
}

impl ScoringStage {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            multiplier: success_multiplier_table(),
            method: contact_method_table(config),
            priority: priority_table(config),
        }
    }

    pub fn score(&self, customer: EligibleCustomer) -> ScoredCustomer {
        let tier = &customer.tier;
        let success_multiplier = *self.multiplier.evaluate(&(customer.employment, tier.clone()));
        let contact_method = *self.method.evaluate(&(
            tier.clone(),
            customer.annual_income,
            customer.employment,
        ));
        let priority = *self
            .priority
            .evaluate(&(customer.total_default_amount, tier.clone()));
        ScoredCustomer {
            customer,
            success_multiplier,
            contact_method,
            priority,
        }
    }
}

impl PipelineStage<Vec<EligibleCustomer>> for ScoringStage {
    type Output = Vec<ScoredCustomer>;

    fn name(&self) -> &'static str {
        "scoring"
    }

    fn apply(&self, input: Vec<EligibleCustomer>) -> PipelineResult<Vec<ScoredCustomer>> {
        Ok(input.into_iter().map(|c| self.score(c)).collect())
    }
}
