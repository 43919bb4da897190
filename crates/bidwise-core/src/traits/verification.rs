//! Verification tool collaborator.

use serde::{Deserialize, Serialize};

use crate::models::RawEvidence;

/// A requirement routed to a fixed set of verification tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSpec {
    pub requirement_ref: String,
    #[serde(default)]
    pub text: String,
    pub is_mandatory: bool,
    /// Names of the tools that evaluate this requirement.
    pub tools: Vec<String>,
}

/// Produces one piece of raw evidence per requirement. Must not block
/// on shared mutable state; tools run in parallel.
pub trait VerificationTool: Send + Sync {
    fn name(&self) -> &str;

    fn verify(&self, requirement: &RequirementSpec) -> RawEvidence;
}
