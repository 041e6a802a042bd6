//! Stage 4: operational aggregation and resource recommendation.
//!
//! Groups zoned customers by
//!   (calling zone, contact window, contact method, economic priority, tier)
//! and left-joins each member to the latest economic indicator of its
//! state. A missing indicator never fails the run; the member simply
//! does not contribute to the economic averages.
//!
//! Groups are reported by descending expected collection, then
//! descending customer count, then ascending group key.

use crate::{
    config::{CapacityConfig, PipelineConfig, ResourcingConfig},
    domain::Tier,
    error::PipelineResult,
    extraction::ContactWindow,
    rules::DecisionTable,
    scoring::{ContactMethod, PriorityLevel},
    snapshot::SnapshotIndex,
    stage::PipelineStage,
    zoning::{CallingZone, ZonedCustomer},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Assumed share of a defaulted balance that is recovered.
pub const BASE_RECOVERY_RATE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceRecommendation {
    #[serde(rename = "assign senior agents, metro morning shift")]
    SeniorAgentsMorningShift,
    #[serde(rename = "senior officer + legal support")]
    SeniorOfficerLegalSupport,
    #[serde(rename = "specialized metro team")]
    SpecializedMetroTeam,
    #[serde(rename = "combine with adjacent zone")]
    CombineWithAdjacentZone,
    #[serde(rename = "standard agent")]
    StandardAgent,
}

impl ResourceRecommendation {
    pub fn label(self) -> &'static str {
        match self {
            ResourceRecommendation::SeniorAgentsMorningShift => {
                "assign senior agents, metro morning shift"
            }
            ResourceRecommendation::SeniorOfficerLegalSupport => "senior officer + legal support",
            ResourceRecommendation::SpecializedMetroTeam => "specialized metro team",
            ResourceRecommendation::CombineWithAdjacentZone => "combine with adjacent zone",
            ResourceRecommendation::StandardAgent => "standard agent",
        }
    }
}

impl fmt::Display for ResourceRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub calling_zone: CallingZone,
    pub contact_window: ContactWindow,
    pub contact_method: ContactMethod,
    pub economic_priority: PriorityLevel,
    pub tier: Tier,
}

impl GroupKey {
    pub fn of(c: &ZonedCustomer) -> Self {
        Self {
            calling_zone: c.calling_zone,
            contact_window: c.scored.customer.contact_window,
            contact_method: c.scored.contact_method,
            economic_priority: c.economic_priority,
            tier: c.scored.customer.tier.clone(),
        }
    }
}

/// What the resource ladder looks at for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupFacts {
    pub customer_count: u64,
    pub contact_window: ContactWindow,
    pub expected_collection: f64,
    pub tier: Tier,
    pub economic_priority: PriorityLevel,
}

/// Hourly call throughput from (contact window, tier).
pub fn call_rate_table(config: &CapacityConfig) -> DecisionTable<(ContactWindow, Tier), f64> {
    DecisionTable::new("calls_per_hour", config.default_calls_per_hour)
        .rule(
            "morning",
            |(window, _): &(ContactWindow, Tier)| *window == ContactWindow::Morning,
            config.morning_calls_per_hour,
        )
        .rule(
            "office_hours",
            |(window, _): &(ContactWindow, Tier)| *window == ContactWindow::Office,
            config.office_calls_per_hour,
        )
        .rule(
            "tier3",
            |(_, tier): &(ContactWindow, Tier)| *tier == Tier::Tier3,
            config.tier3_calls_per_hour,
        )
}

pub fn resource_table(config: &ResourcingConfig) -> DecisionTable<GroupFacts, ResourceRecommendation> {
    let senior_min = config.senior_agent_min_customers;
    let legal_min = config.legal_support_min_expected_collection;
    let combine_max = config.combine_zone_max_customers;
    DecisionTable::new("resource_recommendation", ResourceRecommendation::StandardAgent)
        .rule(
            "large_morning_group",
            move |g: &GroupFacts| {
                g.customer_count > senior_min && g.contact_window == ContactWindow::Morning
            },
            ResourceRecommendation::SeniorAgentsMorningShift,
        )
        .rule(
            "high_value_tier1",
            move |g: &GroupFacts| g.expected_collection > legal_min && g.tier == Tier::Tier1,
            ResourceRecommendation::SeniorOfficerLegalSupport,
        )
        .rule(
            "tier1_high_economic_priority",
            |g: &GroupFacts| g.tier == Tier::Tier1 && g.economic_priority == PriorityLevel::High,
            ResourceRecommendation::SpecializedMetroTeam,
        )
        .rule(
            "small_group",
            move |g: &GroupFacts| g.customer_count < combine_max,
            ResourceRecommendation::CombineWithAdjacentZone,
        )
}

/// ceil(count / rate); at least one slot for a non-empty group.
pub fn daily_call_capacity(customer_count: u64, calls_per_hour: f64) -> u64 {
    if customer_count == 0 {
        return 0;
    }
    ((customer_count as f64 / calls_per_hour).ceil() as u64).max(1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalGroup {
    #[serde(flatten)]
    pub key: GroupKey,
    pub customer_count: u64,
    pub total_default_amount: f64,
    pub avg_success_multiplier: f64,
    pub expected_collection: f64,
    pub calls_per_hour: f64,
    pub daily_call_capacity: u64,
    pub resource_recommendation: ResourceRecommendation,
    pub customers_with_indicators: u64,
    pub avg_gdp_growth_rate: Option<f64>,
    pub avg_unemployment_rate: Option<f64>,
    pub avg_per_capita_income: Option<f64>,
}

/// Running mean that ignores missing values, like SQL AVG.
#[derive(Debug, Clone, Copy, Default)]
struct NullableMean {
    sum: f64,
    n: u64,
}

impl NullableMean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.n += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

#[derive(Debug, Default)]
struct GroupAccumulator {
    customers: u64,
    total_default: f64,
    multiplier_sum: f64,
    expected_collection: f64,
    with_indicators: u64,
    gdp: NullableMean,
    unemployment: NullableMean,
    per_capita: NullableMean,
}

pub struct AggregationStage {
    call_rate: DecisionTable<(ContactWindow, Tier), f64>,
    resources: DecisionTable<GroupFacts, ResourceRecommendation>,
}

impl AggregationStage {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            call_rate: call_rate_table(&config.capacity),
            resources: resource_table(&config.resourcing),
        }
    }

    fn finish(&self, key: GroupKey, acc: GroupAccumulator) -> OperationalGroup {
        let calls_per_hour = *self.call_rate.evaluate(&(key.contact_window, key.tier.clone()));
        let facts = GroupFacts {
            customer_count: acc.customers,
            contact_window: key.contact_window,
            expected_collection: acc.expected_collection,
            tier: key.tier.clone(),
            economic_priority: key.economic_priority,
        };
        let resource_recommendation = *self.resources.evaluate(&facts);

        OperationalGroup {
            customer_count: acc.customers,
            total_default_amount: acc.total_default,
            avg_success_multiplier: acc.multiplier_sum / acc.customers as f64,
            expected_collection: acc.expected_collection,
            calls_per_hour,
            daily_call_capacity: daily_call_capacity(acc.customers, calls_per_hour),
            resource_recommendation,
            customers_with_indicators: acc.with_indicators,
            avg_gdp_growth_rate: acc.gdp.value(),
            avg_unemployment_rate: acc.unemployment.value(),
            avg_per_capita_income: acc.per_capita.value(),
            key,
        }
    }
}

/// Report order: expected collection desc, customer count desc, key asc.
pub fn report_order(a: &OperationalGroup, b: &OperationalGroup) -> Ordering {
    b.expected_collection
        .total_cmp(&a.expected_collection)
        .then_with(|| b.customer_count.cmp(&a.customer_count))
        .then_with(|| a.key.cmp(&b.key))
}

impl<'i, 's> PipelineStage<(Vec<ZonedCustomer>, &'i SnapshotIndex<'s>)> for AggregationStage {
    type Output = Vec<OperationalGroup>;

    fn name(&self) -> &'static str {
        "aggregation"
    }

    fn apply(
        &self,
        (customers, index): (Vec<ZonedCustomer>, &'i SnapshotIndex<'s>),
    ) -> PipelineResult<Vec<OperationalGroup>> {
        let mut groups: BTreeMap<GroupKey, GroupAccumulator> = BTreeMap::new();

        for c in &customers {
            let acc = groups.entry(GroupKey::of(c)).or_default();
            let amount = c.scored.customer.total_default_amount;
            acc.customers += 1;
            acc.total_default += amount;
            acc.multiplier_sum += c.scored.success_multiplier;
            acc.expected_collection += amount * c.scored.success_multiplier * BASE_RECOVERY_RATE;

            match index.latest_indicator(c.scored.customer.state_id) {
                Some(ind) => {
                    acc.with_indicators += 1;
                    acc.gdp.push(ind.gdp_growth_rate);
                    acc.unemployment.push(ind.unemployment_rate);
                    acc.per_capita.push(ind.per_capita_income);
                }
                None => log::debug!(
                    "customer {}: no economic indicator for state {}",
                    c.scored.customer.customer_id,
                    c.scored.customer.state_id
                ),
            }
        }

        let mut out: Vec<OperationalGroup> = groups
            .into_iter()
            .map(|(key, acc)| self.finish(key, acc))
            .collect();
        out.sort_by(report_order);

        log::info!(
            "aggregation: {} customers in {} operational groups",
            customers.len(),
            out.len()
        );
        Ok(out)
    }
}
