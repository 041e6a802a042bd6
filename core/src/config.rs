use crate::error::{PipelineError, PipelineResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Stage 1: extraction ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Minimum phone length in characters, after trimming.
    pub min_phone_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { min_phone_length: 10 }
    }
}

// ── Stage 2: scoring ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Tier1 customers earning more than this get Email+Phone.
    pub email_income_threshold: f64,
    /// Customers earning less than this get Phone Only.
    pub phone_only_income_threshold: f64,
    /// Tier1 balances above this are High priority.
    pub high_priority_amount: f64,
    /// Balances above this are Medium priority.
    pub medium_priority_amount: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            email_income_threshold: 800_000.0,
            phone_only_income_threshold: 400_000.0,
            high_priority_amount: 500_000.0,
            medium_priority_amount: 200_000.0,
        }
    }
}

// ── Stage 4: capacity and resourcing ───────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapacityConfig {
    pub morning_calls_per_hour: f64,
    pub office_calls_per_hour: f64,
    pub tier3_calls_per_hour: f64,
    pub default_calls_per_hour: f64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            morning_calls_per_hour: 3.0,
            office_calls_per_hour: 2.5,
            tier3_calls_per_hour: 5.0,
            default_calls_per_hour: 4.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourcingConfig {
    /// Morning groups larger than this get senior agents.
    pub senior_agent_min_customers: u64,
    /// Tier1 groups expecting more than this get legal support (2 crore).
    pub legal_support_min_expected_collection: f64,
    /// Groups smaller than this are merged with an adjacent zone.
    pub combine_zone_max_customers: u64,
}

impl Default for ResourcingConfig {
    fn default() -> Self {
        Self {
            senior_agent_min_customers: 500,
            legal_support_min_expected_collection: 20_000_000.0,
            combine_zone_max_customers: 50,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub extraction: ExtractionConfig,
    pub scoring: ScoringConfig,
    pub capacity: CapacityConfig,
    pub resourcing: ResourcingConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        let rates = [
            ("capacity.morning_calls_per_hour", self.capacity.morning_calls_per_hour),
            ("capacity.office_calls_per_hour", self.capacity.office_calls_per_hour),
            ("capacity.tier3_calls_per_hour", self.capacity.tier3_calls_per_hour),
            ("capacity.default_calls_per_hour", self.capacity.default_calls_per_hour),
        ];
        for (field, rate) in rates {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(invalid(field, format!("must be a positive rate, got {rate}")));
            }
        }
        if self.scoring.medium_priority_amount > self.scoring.high_priority_amount {
            return Err(invalid(
                "scoring.medium_priority_amount",
                "must not exceed scoring.high_priority_amount".into(),
            ));
        }
        if self.extraction.min_phone_length == 0 {
            return Err(invalid("extraction.min_phone_length", "must be at least 1".into()));
        }
        Ok(())
    }
}

// ── Synthetic snapshot generator ───────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub customers: usize,
    pub loans: usize,
    pub defaults: usize,
    pub indicators_per_state: usize,
    /// Date the generated defaults are aged against.
    pub snapshot_date: NaiveDate,
    pub missing_phone_rate: f64,
    pub short_phone_rate: f64,
    pub missing_default_date_rate: f64,
    /// Share of fresh (< 180 days) defaults moved to "In Progress".
    pub in_progress_rate: f64,
    /// Share of fresh (< 180 days) defaults moved to "Follow-Up Required".
    pub follow_up_rate: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            customers: 50_000,
            loans: 40_000,
            defaults: 35_000,
            indicators_per_state: 24,
            snapshot_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            missing_phone_rate: 0.01,
            short_phone_rate: 0.01,
            missing_default_date_rate: 0.005,
            in_progress_rate: 0.15,
            follow_up_rate: 0.10,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        let rates = [
            ("generator.missing_phone_rate", self.missing_phone_rate),
            ("generator.short_phone_rate", self.short_phone_rate),
            ("generator.missing_default_date_rate", self.missing_default_date_rate),
            ("generator.in_progress_rate", self.in_progress_rate),
            ("generator.follow_up_rate", self.follow_up_rate),
        ];
        for (field, rate) in rates {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid(field, format!("must be within [0, 1], got {rate}")));
            }
        }
        if self.in_progress_rate + self.follow_up_rate > 1.0 {
            return Err(invalid(
                "generator.follow_up_rate",
                "in_progress_rate + follow_up_rate must not exceed 1".into(),
            ));
        }
        if self.customers == 0 {
            return Err(invalid("generator.customers", "must be at least 1".into()));
        }
        if self.defaults > 0 && self.loans == 0 {
            return Err(invalid("generator.loans", "defaults need at least one loan".into()));
        }
        Ok(())
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionConfig {
    pub pipeline: PipelineConfig,
    pub generator: GeneratorConfig,
}

impl CollectionConfig {
    /// Load from a JSON file. Missing sections fall back to defaults;
    /// unknown keys are rejected.
    /// In tests, use CollectionConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: CollectionConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        self.pipeline.validate()?;
        self.generator.validate()
    }

    /// Production rule thresholds with a small generated population.
    pub fn default_test() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            generator: GeneratorConfig {
                customers: 400,
                loans: 320,
                defaults: 600,
                indicators_per_state: 6,
                missing_phone_rate: 0.05,
                short_phone_rate: 0.05,
                missing_default_date_rate: 0.02,
                ..GeneratorConfig::default()
            },
        }
    }
}

fn invalid(field: &str, reason: String) -> PipelineError {
    PipelineError::InvalidConfig {
        field: field.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        CollectionConfig::default().validate().unwrap();
        CollectionConfig::default_test().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: CollectionConfig =
            serde_json::from_str(r#"{ "pipeline": { "capacity": { "tier3_calls_per_hour": 6.0 } } }"#)
                .unwrap();
        assert_eq!(config.pipeline.capacity.tier3_calls_per_hour, 6.0);
        assert_eq!(config.pipeline.capacity.morning_calls_per_hour, 3.0);
        assert_eq!(config.pipeline.extraction.min_phone_length, 10);
    }

    #[test]
    fn shipped_config_loads_with_production_thresholds() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/collection_config.json");
        let config = CollectionConfig::load(path).unwrap();
        assert_eq!(config.pipeline.capacity.tier3_calls_per_hour, 5.0);
        assert_eq!(config.pipeline.scoring.email_income_threshold, 800_000.0);
        assert_eq!(config.pipeline.resourcing.combine_zone_max_customers, 50);
        assert_eq!(config.generator.customers, 50_000);
    }

    #[test]
    fn misspelled_key_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.json");
        std::fs::write(&path, r#"{ "pipeline": { "capacity": { "tier3_calls_per_hr": 1.0 } } }"#)
            .unwrap();
        let err = CollectionConfig::load(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("tier3_calls_per_hr"), "unexpected error: {err}");
    }

    #[test]
    fn unknown_section_is_rejected() {
        let parsed: Result<CollectionConfig, _> = serde_json::from_str(r#"{ "pipline": {} }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn zero_rate_is_rejected() {
        let mut config = PipelineConfig::default();
        config.capacity.office_calls_per_hour = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig { ref field, .. }
            if field == "capacity.office_calls_per_hour"));
    }
}
