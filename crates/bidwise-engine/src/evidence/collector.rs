//! Parallel evidence collection.
//!
//! Every `(tool, requirement)` pair runs independently on the rayon pool.
//! Each requirement is aggregated as soon as its own tools have answered,
//! so there is a join per requirement rather than one global barrier.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;

use bidwise_core::errors::{PipelineError, PipelineResult};
use bidwise_core::models::{RawEvidence, RequirementVerdict};
use bidwise_core::traits::{Cancellable, CancellationToken, RequirementSpec, VerificationTool};

use super::StatusMap;
use crate::aggregation::ComplianceAggregator;

pub struct EvidenceCollector {
    tools: HashMap<String, Arc<dyn VerificationTool>>,
    status_map: StatusMap,
}

impl EvidenceCollector {
    pub fn new(status_map: StatusMap) -> Self {
        Self {
            tools: HashMap::new(),
            status_map,
        }
    }

    /// Register a tool under its own name, replacing any previous one.
    pub fn with_tool(mut self, tool: Arc<dyn VerificationTool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Collect and aggregate evidence for every requirement. Verdicts come
    /// back in requirement order; rejected evidence is reported as
    /// non-fatal errors.
    pub fn collect(
        &self,
        requirements: &[RequirementSpec],
        cancel: &CancellationToken,
    ) -> Result<PipelineResult<Vec<RequirementVerdict>>, PipelineError> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let outcomes: Vec<_> = requirements
            .par_iter()
            .map(|req| {
                let raw: Vec<RawEvidence> = req
                    .tools
                    .par_iter()
                    .map(|tool_name| self.run_tool(req, tool_name))
                    .collect();
                ComplianceAggregator::aggregate_raw(
                    &req.requirement_ref,
                    req.is_mandatory,
                    raw,
                    &self.status_map,
                )
            })
            .collect();

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let mut result = PipelineResult::new(Vec::with_capacity(outcomes.len()));
        for outcome in outcomes {
            for rejected in outcome.rejected {
                result.add_error(PipelineError::Evidence(rejected));
            }
            result.data.push(outcome.verdict);
        }
        tracing::info!(
            requirements = requirements.len(),
            rejected = result.error_count(),
            "evidence collected"
        );
        Ok(result)
    }

    /// Run one tool for one requirement. A missing or panicking tool yields
    /// UNKNOWN evidence with zero confidence.
    fn run_tool(&self, req: &RequirementSpec, tool_name: &str) -> RawEvidence {
        let Some(tool) = self.tools.get(tool_name) else {
            tracing::warn!(
                requirement = %req.requirement_ref,
                tool = tool_name,
                "verification tool not registered"
            );
            return unavailable(req, tool_name, "verification tool not registered");
        };

        match panic::catch_unwind(AssertUnwindSafe(|| tool.verify(req))) {
            Ok(mut raw) => {
                // The tool answers for this requirement, whatever it echoes back.
                raw.requirement_ref.clone_from(&req.requirement_ref);
                if raw.source.trim().is_empty() {
                    raw.source = tool_name.to_string();
                }
                raw
            }
            Err(_) => {
                tracing::warn!(
                    requirement = %req.requirement_ref,
                    tool = tool_name,
                    "verification tool panicked"
                );
                unavailable(req, tool_name, "verification tool panicked")
            }
        }
    }
}

fn unavailable(req: &RequirementSpec, tool_name: &str, message: &str) -> RawEvidence {
    RawEvidence {
        source: tool_name.to_string(),
        requirement_ref: req.requirement_ref.clone(),
        raw_status: "TOOL_UNAVAILABLE".to_string(),
        level: Some("UNKNOWN".to_string()),
        confidence: 0.0,
        message: message.to_string(),
        ..RawEvidence::default()
    }
}
