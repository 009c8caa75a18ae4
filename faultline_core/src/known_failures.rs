//! # Known Failure Catalog
//!
//! Maps previously cataloged error-output patterns to human-readable
//! explanations, per pipeline stage. The executor uses a descriptor's
//! `known_failures` map to distinguish expected, recoverable errors from
//! novel ones when a step fails; a match upgrades the raw failure text into a
//! diagnosis without suppressing the failure itself.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pipeline stage a catalog entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FailureStage {
    AgentInstallation,
    FaultInjection,
    RemediationRequest,
}

/// Supplies recognized failure signatures per pipeline stage.
pub trait KnownFailureCatalog: Send + Sync {
    fn classify(&self, stage: FailureStage) -> BTreeMap<String, String>;
}

/// Curated signatures observed against real targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKnownFailureCatalog;

impl KnownFailureCatalog for DefaultKnownFailureCatalog {
    fn classify(&self, stage: FailureStage) -> BTreeMap<String, String> {
        let mut failures = BTreeMap::new();
        match stage {
            FailureStage::AgentInstallation => {
                failures.insert(
                    "Unable to open socket file".to_string(),
                    "the target process is not accepting attach requests; confirm the process id \
                     belongs to a running JVM"
                        .to_string(),
                );
                failures.insert(
                    "well-known file is not secure".to_string(),
                    "the attach socket is owned by a different user; set the run-as user to the \
                     owner of the target process"
                        .to_string(),
                );
                failures.insert(
                    "Operation not permitted".to_string(),
                    "insufficient privileges to attach to the target process".to_string(),
                );
                failures.insert(
                    "No such process".to_string(),
                    "the target process exited before the agent could attach".to_string(),
                );
            }
            FailureStage::FaultInjection => {
                failures.insert(
                    "Connection refused".to_string(),
                    "the agent listener is not reachable on the configured port; agent \
                     installation may not have completed"
                        .to_string(),
                );
                failures.insert(
                    "Fault is already running".to_string(),
                    "another fault is active in the target process; remediate it before \
                     injecting a new one"
                        .to_string(),
                );
            }
            FailureStage::RemediationRequest => {
                failures.insert(
                    "Fault is not active".to_string(),
                    "the fault already completed or was remediated earlier".to_string(),
                );
                failures.insert(
                    "Connection refused".to_string(),
                    "the agent listener is gone; the target process may have exited, taking \
                     the fault with it"
                        .to_string(),
                );
            }
        }
        failures
    }
}
