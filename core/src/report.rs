//! The contact plan report and its renderings.
//!
//! Rendering is deterministic: the same report always produces the
//! same bytes. Floats are written with fixed precision so the CSV is
//! stable across platforms.

use crate::{
    aggregation::OperationalGroup,
    error::PipelineResult,
    extraction::ExclusionAudit,
};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactPlanReport {
    pub eligible_customers: u64,
    pub groups: Vec<OperationalGroup>,
    pub audit: ExclusionAudit,
}

impl ContactPlanReport {
    pub fn total_expected_collection(&self) -> f64 {
        self.groups.iter().map(|g| g.expected_collection).sum()
    }

    pub fn total_daily_call_capacity(&self) -> u64 {
        self.groups.iter().map(|g| g.daily_call_capacity).sum()
    }

    pub fn to_json(&self) -> PipelineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_csv(&self) -> PipelineResult<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        // csv only ever writes the UTF-8 we hand it.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn write_csv<W: Write>(&self, out: W) -> PipelineResult<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(CSV_HEADER)?;
        for g in &self.groups {
            writer.write_record(csv_row(g))?;
        }
        writer.flush()?;
        Ok(())
    }
}

pub const CSV_HEADER: [&str; 16] = [
    "calling_zone",
    "optimal_contact_time",
    "contact_method",
    "economic_priority",
    "tier_classification",
    "customer_count",
    "total_default_amount",
    "avg_success_multiplier",
    "expected_collection",
    "calls_per_hour",
    "daily_call_capacity",
    "resource_recommendation",
    "customers_with_indicators",
    "avg_gdp_growth_rate",
    "avg_unemployment_rate",
    "avg_per_capita_income",
];

fn opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

fn csv_row(g: &OperationalGroup) -> [String; 16] {
    [
        g.key.calling_zone.label().to_string(),
        g.key.contact_window.label().to_string(),
        g.key.contact_method.label().to_string(),
        g.key.economic_priority.label().to_string(),
        g.key.tier.label().to_string(),
        g.customer_count.to_string(),
        format!("{:.2}", g.total_default_amount),
        format!("{:.4}", g.avg_success_multiplier),
        format!("{:.2}", g.expected_collection),
        format!("{:.1}", g.calls_per_hour),
        g.daily_call_capacity.to_string(),
        g.resource_recommendation.label().to_string(),
        g.customers_with_indicators.to_string(),
        opt(g.avg_gdp_growth_rate),
        opt(g.avg_unemployment_rate),
        opt(g.avg_per_capita_income),
    ]
}
