//! Pipeline stage trait.
//!
//! RULE: Every stage implements PipelineStage.
//! A stage is a pure function of its input: it reads nothing else,
//! writes nothing, and returns a new row set. Execution order is
//! fixed and documented in pipeline.rs.

use crate::error::PipelineResult;

/// The contract every stage must fulfill.
pub trait PipelineStage<I> {
    type Output;

    /// Unique stable name for this stage. Recorded in the run event log.
    fn name(&self) -> &'static str;

    /// Transform the previous stage's rows into this stage's rows.
    fn apply(&self, input: I) -> PipelineResult<Self::Output>;
}
