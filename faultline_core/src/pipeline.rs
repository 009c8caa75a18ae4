//! # Fault Command Pipelines
//!
//! Assembles the ordered `CommandDescriptor` sequences that inject a fault
//! into a remote process and later remediate it. Construction is synchronous
//! and side-effect-free; the descriptors are handed one at a time to an
//! executor, which applies each descriptor's own contract.
//!
//! ## Injection ordering
//!
//! Both variants share an installation prefix whose ordering is fixed:
//! extract -> permission-normalize -> install. Extraction must precede
//! permission normalization (the archive does not guarantee execute bits),
//! and both must precede any injection attempt so the agent is present and
//! executable. The variant-specific suffix is (rule-write → submit) for
//! rule-based faults and a single submit for argument-based ones.
//!
//! ## Remediation
//!
//! Rule-based faults uninstall their rule file; argument-based faults send a
//! remove-fault request and then poll the fault status, since the agent
//! remediates out-of-band. Partial injection is a valid intermediate state:
//! remediation descriptors are built from the specification alone, so they
//! can clean up no matter how far injection progressed.

use std::sync::Arc;

use crate::command::CommandDescriptor;
use crate::command_builder;
use crate::constants::{
    AGENT_ARCHIVE_EXTENSION, AGENT_INSTALL_RETRY_MESSAGE, AGENT_INSTALL_SUCCESS_MESSAGE,
    AGENT_NAME, AGENT_NOT_AVAILABLE_MESSAGE, FAULT_COMPLETION_MESSAGE,
    FAULT_CREATION_SUCCESS_MESSAGE, FAULT_ID_PROPERTY, INJECTION_INFO_PREFIX,
    REMEDIATION_REQUEST_SUCCESS_MESSAGE, REMEDIATION_VERIFICATION_INTERVAL_SECS,
    REMEDIATION_VERIFICATION_RETRIES, UUID_PATTERN,
};
use crate::error::FaultError;
use crate::fault_spec::{FaultSpecification, FaultVariant};
use crate::known_failures::{DefaultKnownFailureCatalog, FailureStage, KnownFailureCatalog};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A file that must be staged on the target before a pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SupportScript {
    pub file_name: String,
    pub target_directory: String,
    pub executable: bool,
}

/// The agent archive the injection pipeline expects under the injection
/// home directory.
pub fn support_scripts(spec: &FaultSpecification) -> Vec<SupportScript> {
    vec![SupportScript {
        file_name: format!("{AGENT_NAME}{AGENT_ARCHIVE_EXTENSION}"),
        target_directory: spec.injection_home_dir.clone(),
        executable: false,
    }]
}

/// Builds injection and remediation pipelines against a known-failure
/// catalog.
#[derive(Clone)]
pub struct PipelineBuilder {
    catalog: Arc<dyn KnownFailureCatalog>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new(Arc::new(DefaultKnownFailureCatalog))
    }
}

impl PipelineBuilder {
    pub fn new(catalog: Arc<dyn KnownFailureCatalog>) -> Self {
        Self { catalog }
    }

    /// Ordered descriptors that install the agent and inject the fault.
    ///
    /// Returns exactly 5 descriptors for rule-based faults and exactly 4 for
    /// argument-based ones. Fails fast when a required argument for the
    /// spec's variant is missing.
    pub fn injection_pipeline(
        &self,
        spec: &FaultSpecification,
    ) -> Result<Vec<CommandDescriptor>, FaultError> {
        spec.validate_for_injection()?;

        let mut steps = self.installation_prefix(spec)?;
        match &spec.variant {
            FaultVariant::RuleBased { rule } => {
                let task_id = spec.task_id()?;
                steps.push(CommandDescriptor::new(command_builder::write_rule_command(
                    spec,
                    &rule.render(task_id),
                )?));
                // Rule submission failures are unambiguous; the exit code
                // stays fatal here, unlike the argument-based submit below.
                steps.push(
                    CommandDescriptor::new(command_builder::submit_command(
                        spec,
                        &spec.rule_file_path()?,
                    ))
                    .with_expected_outputs([format!("install rule {task_id}")]),
                );
            }
            FaultVariant::ArgumentBased => {
                steps.push(
                    CommandDescriptor::best_effort(command_builder::submit_command(
                        spec,
                        &format!("-if {}", delimited_args(spec)),
                    ))
                    .with_expected_outputs([FAULT_CREATION_SUCCESS_MESSAGE])
                    .with_extraction(FAULT_ID_PROPERTY, UUID_PATTERN)
                    .with_known_failures(self.catalog.classify(FailureStage::FaultInjection)),
                );
            }
        }

        tracing::debug!(
            steps = steps.len(),
            rule_based = spec.rule().is_some(),
            "built injection pipeline"
        );
        Ok(steps)
    }

    /// Ordered descriptors that remove the fault and verify removal.
    pub fn remediation_pipeline(
        &self,
        spec: &FaultSpecification,
    ) -> Result<Vec<CommandDescriptor>, FaultError> {
        let steps = match &spec.variant {
            FaultVariant::RuleBased { .. } => {
                let task_id = spec.task_id()?;
                vec![
                    CommandDescriptor::best_effort(command_builder::submit_command(
                        spec,
                        &format!("-u {}", spec.rule_file_path()?),
                    ))
                    .with_expected_outputs([format!("uninstall RULE {task_id}")]),
                ]
            }
            FaultVariant::ArgumentBased => {
                let fault_id = fault_id_placeholder();
                vec![
                    // The request must succeed transport-wise; remediation
                    // itself completes asynchronously in the agent.
                    CommandDescriptor::new(command_builder::submit_command(
                        spec,
                        &format!("-rf {fault_id}"),
                    ))
                    .with_expected_outputs([REMEDIATION_REQUEST_SUCCESS_MESSAGE])
                    .with_known_failures(self.catalog.classify(FailureStage::RemediationRequest)),
                    CommandDescriptor::best_effort(command_builder::submit_command(
                        spec,
                        &format!("-gf {fault_id}"),
                    ))
                    .with_expected_outputs([FAULT_COMPLETION_MESSAGE, AGENT_NOT_AVAILABLE_MESSAGE])
                    .with_retries(
                        REMEDIATION_VERIFICATION_RETRIES,
                        REMEDIATION_VERIFICATION_INTERVAL_SECS,
                    ),
                ]
            }
        };

        tracing::debug!(steps = steps.len(), "built remediation pipeline");
        Ok(steps)
    }

    /// Shared installation prefix: extract -> normalize permissions -> install.
    fn installation_prefix(
        &self,
        spec: &FaultSpecification,
    ) -> Result<Vec<CommandDescriptor>, FaultError> {
        Ok(vec![
            // The archive may already be extracted from an earlier injection.
            CommandDescriptor::best_effort(command_builder::extract_agent_command(spec)),
            CommandDescriptor::best_effort(command_builder::normalize_permissions_command(spec)),
            // The agent may already be attached; either message is an
            // acceptable terminal state.
            CommandDescriptor::best_effort(command_builder::install_command(spec)?)
                .with_expected_outputs([AGENT_INSTALL_SUCCESS_MESSAGE, AGENT_INSTALL_RETRY_MESSAGE])
                .with_known_failures(self.catalog.classify(FailureStage::AgentInstallation)),
        ])
    }
}

/// Placeholder token the executor resolves from the `faultId` property
/// extracted during injection.
pub fn fault_id_placeholder() -> String {
    format!("{INJECTION_INFO_PREFIX}{FAULT_ID_PROPERTY}")
}

/// Renders `args` as the space-delimited `key=value` string the agent's
/// `-if` flag expects. Keys are sorted so the composed command is
/// deterministic.
fn delimited_args(spec: &FaultSpecification) -> String {
    let mut pairs: Vec<_> = spec.args.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}
