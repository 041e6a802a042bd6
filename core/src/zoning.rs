//! Stage 3: calling zone and economic priority.

use crate::{
    domain::{Region, Tier},
    error::PipelineResult,
    rules::DecisionTable,
    scoring::{PriorityLevel, ScoredCustomer},
    stage::PipelineStage,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CallingZone {
    #[serde(rename = "WEST_ZONE_1")]
    West,
    #[serde(rename = "NORTH_ZONE_1")]
    North,
    #[serde(rename = "SOUTH_ZONE_1")]
    South,
    #[serde(rename = "EAST_ZONE_1")]
    East,
    #[serde(rename = "CENTRAL_ZONE_1")]
    Central,
    #[serde(rename = "NORTHEAST_ZONE_1")]
    Northeast,
    #[serde(rename = "REMOTE_ZONE")]
    Remote,
}

impl CallingZone {
    pub fn label(self) -> &'static str {
        match self {
            CallingZone::West => "WEST_ZONE_1",
            CallingZone::North => "NORTH_ZONE_1",
            CallingZone::South => "SOUTH_ZONE_1",
            CallingZone::East => "EAST_ZONE_1",
            CallingZone::Central => "CENTRAL_ZONE_1",
            CallingZone::Northeast => "NORTHEAST_ZONE_1",
            CallingZone::Remote => "REMOTE_ZONE",
        }
    }
}

impl fmt::Display for CallingZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn calling_zone_table() -> DecisionTable<Region, CallingZone> {
    DecisionTable::new("calling_zone", CallingZone::Remote)
        .rule("west", |r: &Region| *r == Region::West, CallingZone::West)
        .rule("north", |r: &Region| *r == Region::North, CallingZone::North)
        .rule("south", |r: &Region| *r == Region::South, CallingZone::South)
        .rule("east", |r: &Region| *r == Region::East, CallingZone::East)
        .rule("central", |r: &Region| *r == Region::Central, CallingZone::Central)
        .rule("northeast", |r: &Region| *r == Region::Northeast, CallingZone::Northeast)
}

fn is_growth_region(region: &Region) -> bool {
    matches!(region, Region::West | Region::South | Region::North)
}

pub fn economic_priority_table() -> DecisionTable<(Tier, Region), PriorityLevel> {
    DecisionTable::new("economic_priority", PriorityLevel::Standard)
        .rule(
            "tier1_growth_region",
            |(tier, region): &(Tier, Region)| *tier == Tier::Tier1 && is_growth_region(region),
            PriorityLevel::High,
        )
        .rule(
            "tier2_growth_region",
            |(tier, region): &(Tier, Region)| *tier == Tier::Tier2 && is_growth_region(region),
            PriorityLevel::Medium,
        )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonedCustomer {
    #[serde(flatten)]
    pub scored: ScoredCustomer,
    pub calling_zone: CallingZone,
    pub economic_priority: PriorityLevel,
}

pub struct ZoningStage {
    zone: DecisionTable<Region, CallingZone>,
    economic: DecisionTable<(Tier, Region), PriorityLevel>,
}

impl ZoningStage {
    pub fn new() -> Self {
        Self {
            zone: calling_zone_table(),
            economic: economic_priority_table(),
        }
    }

    pub fn classify(&self, scored: ScoredCustomer) -> ZonedCustomer {
        let c = &scored.customer;
        let calling_zone = *self.zone.evaluate(&c.region);
        let economic_priority = *self.economic.evaluate(&(c.tier.clone(), c.region.clone()));
        ZonedCustomer {
            scored,
            calling_zone,
            economic_priority,
        }
    }
}

impl Default for ZoningStage {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStage<Vec<ScoredCustomer>> for ZoningStage {
    type Output = Vec<ZonedCustomer>;

    fn name(&self) -> &'static str {
        "zoning"
    }

    fn apply(&self, input: Vec<ScoredCustomer>) -> PipelineResult<Vec<ZonedCustomer>> {
        Ok(input.into_iter().map(|s| self.classify(s)).collect())
    }
}
