//! Snapshot entities and the categorical values the rule ladders read.
//!
//! Every categorical column keeps labels it does not recognise (`Other`)
//! instead of rejecting the row. Unknown values fall through to the
//! catch-all branch of whichever rule reads them.

use crate::types::{CityId, CustomerId, DefaultId, IndicatorId, LoanId, Quarter, StateId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

fn normalise(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

// ── City tier ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
    Other(String),
}

impl Tier {
    pub fn parse(label: &str) -> Self {
        match normalise(label).as_str() {
            "tier1" => Tier::Tier1,
            "tier2" => Tier::Tier2,
            "tier3" => Tier::Tier3,
            _ => Tier::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Tier::Tier1 => "Tier1",
            Tier::Tier2 => "Tier2",
            Tier::Tier3 => "Tier3",
            Tier::Other(s) => s,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Tier {
    fn from(s: String) -> Self {
        Tier::parse(&s)
    }
}

impl From<Tier> for String {
    fn from(t: Tier) -> Self {
        t.label().to_string()
    }
}

// ── Region ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Region {
    West,
    North,
    South,
    East,
    Central,
    Northeast,
    Other(String),
}

impl Region {
    pub fn parse(label: &str) -> Self {
        match normalise(label).as_str() {
            "west" => Region::West,
            "north" => Region::North,
            "south" => Region::South,
            "east" => Region::East,
            "central" => Region::Central,
            "northeast" => Region::Northeast,
            _ => Region::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Region::West => "West",
            Region::North => "North",
            Region::South => "South",
            Region::East => "East",
            Region::Central => "Central",
            Region::Northeast => "Northeast",
            Region::Other(s) => s,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Region {
    fn from(s: String) -> Self {
        Region::parse(&s)
    }
}

impl From<Region> for String {
    fn from(r: Region) -> Self {
        r.label().to_string()
    }
}

// ── Collection status ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CollectionStatus {
    Active,
    InProgress,
    FollowUpRequired,
    LegalAction,
    WrittenOff,
    Settled,
    Other(String),
}

impl CollectionStatus {
    pub fn parse(label: &str) -> Self {
        match normalise(label).as_str() {
            "active" => CollectionStatus::Active,
            "inprogress" => CollectionStatus::InProgress,
            "followuprequired" => CollectionStatus::FollowUpRequired,
            "legalaction" => CollectionStatus::LegalAction,
            "writtenoff" => CollectionStatus::WrittenOff,
            "settled" => CollectionStatus::Settled,
            _ => CollectionStatus::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CollectionStatus::Active => "Active",
            CollectionStatus::InProgress => "In Progress",
            CollectionStatus::FollowUpRequired => "Follow-Up Required",
            CollectionStatus::LegalAction => "Legal Action",
            CollectionStatus::WrittenOff => "Written Off",
            CollectionStatus::Settled => "Settled",
            CollectionStatus::Other(s) => s,
        }
    }

    /// Statuses the contact pipeline works on.
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            CollectionStatus::Active
                | CollectionStatus::InProgress
                | CollectionStatus::FollowUpRequired
        )
    }
}

impl From<String> for CollectionStatus {
    fn from(s: String) -> Self {
        CollectionStatus::parse(&s)
    }
}

impl From<CollectionStatus> for String {
    fn from(s: CollectionStatus) -> Self {
        s.label().to_string()
    }
}

// ── Employment ─────────────────────────────────────────────────────

/// Employment class derived from the free-text employment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentClass {
    Private,
    Corporate,
    Government,
    SelfEmployed,
    BusinessOwner,
    Student,
    Other,
}

impl EmploymentClass {
    /// Case-insensitive substring match, checked in declaration order.
    pub fn classify(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("private") {
            EmploymentClass::Private
        } else if lower.contains("corporate") {
            EmploymentClass::Corporate
        } else if lower.contains("government") {
            EmploymentClass::Government
        } else if lower.contains("self") {
            EmploymentClass::SelfEmployed
        } else if lower.contains("business") {
            EmploymentClass::BusinessOwner
        } else if lower.contains("student") {
            EmploymentClass::Student
        } else {
            EmploymentClass::Other
        }
    }

    pub fn is_private_or_corporate(self) -> bool {
        matches!(self, EmploymentClass::Private | EmploymentClass::Corporate)
    }
}

// ── Entities ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub state_id: StateId,
    pub state_name: String,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub city_id: CityId,
    pub city_name: String,
    pub state_id: StateId,
    pub tier_classification: Tier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub full_name: String,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    pub city_id: CityId,
    #[serde(default)]
    pub current_address: Option<String>,
    pub annual_income: f64,
    #[serde(default)]
    pub cibil_score: Option<i64>,
    pub employment_type: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub customer_id: CustomerId,
    pub loan_amount: f64,
    pub loan_status: String,
    #[serde(default)]
    pub disbursement_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultCollection {
    pub default_id: DefaultId,
    pub customer_id: CustomerId,
    pub loan_id: LoanId,
    pub default_date: Option<NaiveDate>,
    pub default_amount: f64,
    #[serde(default)]
    pub days_overdue: Option<i64>,
    pub collection_status: CollectionStatus,
    // Collection activity. Carried through import, storage and export;
    // the contact pipeline does not read it.
    #[serde(default)]
    pub last_contact_date: Option<NaiveDate>,
    #[serde(default)]
    pub contact_attempts: Option<u32>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub legal_notice_sent: Option<bool>,
    #[serde(default)]
    pub recovery_amount: Option<f64>,
    #[serde(default)]
    pub collection_agent_id: Option<i64>,
}

/// Accepts booleans, `true`/`false` in any case and `1`/`0`, as
/// written by spreadsheet and dataframe exports. Empty is `None`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Bool(b)) => Ok(Some(b)),
        Some(Raw::Int(0)) => Ok(Some(false)),
        Some(Raw::Int(1)) => Ok(Some(true)),
        Some(Raw::Int(n)) => Err(serde::de::Error::custom(format!("expected a boolean, got {n}"))),
        Some(Raw::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "yes" => Ok(Some(true)),
            "false" | "no" => Ok(Some(false)),
            _ => Err(serde::de::Error::custom(format!("expected a boolean, got '{s}'"))),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicIndicator {
    pub indicator_id: IndicatorId,
    pub state_id: StateId,
    pub quarter: Quarter,
    pub gdp_growth_rate: Option<f64>,
    #[serde(default)]
    pub inflation_rate: Option<f64>,
    pub unemployment_rate: Option<f64>,
    pub per_capita_income: Option<f64>,
}
