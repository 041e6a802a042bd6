//! The contact prioritization pipeline.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Extraction: eligible customers with summed defaults
//!   2. Scoring: success multiplier, contact method, priority
//!   3. Zoning: calling zone, economic priority
//!   4. Aggregation: operational groups and resourcing
//!
//! RULES:
//!   - Each stage reads ONLY the previous stage's rows
//!     (aggregation also reads the snapshot's indicator index).
//!   - Stages never touch the store. Persistence happens after the
//!     report is complete, in run_and_record().
//!   - Every stage emits one StageCompleted event.

use crate::{
    aggregation::AggregationStage,
    config::PipelineConfig,
    error::PipelineResult,
    event::{EventLogEntry, ExclusionLevel, PipelineEvent},
    extraction::ExtractionStage,
    report::ContactPlanReport,
    scoring::ScoringStage,
    snapshot::Snapshot,
    stage::PipelineStage,
    store::{CollectionStore, NewRun},
    types::RunId,
    zoning::ZoningStage,
};

/// A completed in-memory run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub report: ContactPlanReport,
    pub events: Vec<PipelineEvent>,
}

pub struct ContactPipeline {
    extraction: ExtractionStage,
    scoring: ScoringStage,
    zoning: ZoningStage,
    aggregation: AggregationStage,
}

impl ContactPipeline {
    pub fn new(config: &PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            extraction: ExtractionStage::new(config.extraction.clone()),
            scoring: ScoringStage::new(&config.scoring),
            zoning: ZoningStage::new(),
            aggregation: AggregationStage::new(config),
        })
    }

    /// Run all four stages over a snapshot. Pure: no I/O.
    pub fn run(&self, snapshot: &Snapshot) -> PipelineResult<PipelineRun> {
        let mut events = Vec::new();

        let extraction = self.extraction.apply(snapshot)?;
        events.push(stage_completed(
            self.extraction.name(),
            snapshot.defaults.len(),
            extraction.customers.len(),
        ));
        for (reason, count) in extraction.audit.entries() {
            if count > 0 {
                events.push(PipelineEvent::RowsExcluded {
                    reason: reason.to_string(),
                    level: ExclusionLevel::of(reason),
                    count,
                });
            }
        }
        let audit = extraction.audit;
        let eligible = extraction.customers.len();

        let scored = self.scoring.apply(extraction.customers)?;
        events.push(stage_completed(self.scoring.name(), eligible, scored.len()));

        let zoned = self.zoning.apply(scored)?;
        events.push(stage_completed(self.zoning.name(), eligible, zoned.len()));

        let index = snapshot.index();
        let groups = self.aggregation.apply((zoned, &index))?;
        events.push(stage_completed(self.aggregation.name(), eligible, groups.len()));

        let report = ContactPlanReport {
            eligible_customers: eligible as u64,
            groups,
            audit,
        };
        events.push(PipelineEvent::ReportBuilt {
            groups: report.groups.len() as u64,
            customers: report.eligible_customers,
            expected_collection: report.total_expected_collection(),
        });

        Ok(PipelineRun { report, events })
    }

    /// Run the pipeline and persist the run record, its event log and
    /// the report rows in one store transaction. Returns the new run id.
    pub fn run_and_record(
        &self,
        store: &CollectionStore,
        snapshot: &Snapshot,
        seed: Option<u64>,
    ) -> PipelineResult<(RunId, ContactPlanReport)> {
        let run_id = format!("run-{}", uuid::Uuid::new_v4());
        let fingerprint = snapshot.fingerprint();

        let started = PipelineEvent::RunStarted {
            run_id: run_id.clone(),
            fingerprint: fingerprint.clone(),
        };
        let run = self.run(snapshot)?;

        let entries = std::iter::once(&started)
            .chain(run.events.iter())
            .enumerate()
            .map(|(seq, event)| -> PipelineResult<EventLogEntry> {
                Ok(EventLogEntry {
                    id: None,
                    run_id: run_id.clone(),
                    seq: seq as u64,
                    event_type: event.type_name().to_string(),
                    payload: serde_json::to_string(event)?,
                })
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        store.record_run(
            &NewRun {
                run_id: &run_id,
                seed,
                version: env!("CARGO_PKG_VERSION"),
                fingerprint: &fingerprint,
            },
            &entries,
            &run.report,
        )?;
        log::info!(
            "run {run_id}: {} groups, {} customers persisted",
            run.report.groups.len(),
            run.report.eligible_customers
        );

        Ok((run_id, run.report))
    }
}

fn stage_completed(stage: &str, rows_in: usize, rows_out: usize) -> PipelineEvent {
    log::debug!("stage {stage}: {rows_in} rows in, {rows_out} rows out");
    PipelineEvent::StageCompleted {
        stage: stage.to_string(),
        rows_in: rows_in as u64,
        rows_out: rows_out as u64,
    }
}
