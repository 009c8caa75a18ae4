//! # Pipeline Execution Engine
//!
//! Drives the descriptors a pipeline builder produced, one at a time and in
//! order, against a pluggable `CommandRunner`. The runner only knows how to
//! run a single command and capture its output; everything the descriptor
//! declares (placeholder resolution, exit-code policy, expected-output
//! matching, the retry loop, known-failure classification, and output
//! extraction) is applied here.
//!
//! ## Execution Flow
//!
//! 1. Placeholders (`$INJECTION_INFO_<name>`) in the command are resolved
//!    from the properties extracted by earlier steps.
//! 2. The command runs; a transport failure aborts the step immediately.
//! 3. Exit code and expected outputs are checked against the descriptor's
//!    contract; a failed check retries after `retry_interval_secs` until the
//!    retry budget is exhausted.
//! 4. On success, extraction rules pull properties out of the captured
//!    output for later steps and for the caller.
//!
//! Steps within one pipeline never run concurrently: later commands depend
//! on the remote state left by earlier ones. Cancellation is the caller's
//! concern; abandoned pipelines leave a partial state the remediation
//! pipeline is built to clean up.

use async_trait::async_trait;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::process::Command;

use crate::command::CommandDescriptor;
use crate::constants::INJECTION_INFO_PREFIX;
use crate::error::{ExecutionError, TransportError};

/// Raw result of running one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub output: String,
}

/// Runs a single command against a target and captures its output.
///
/// Remote transports (SSH or equivalent) implement this in the host
/// platform; the crate ships [`LocalCommandRunner`] for local targets and
/// tests.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str) -> Result<CommandOutput, TransportError>;
}

/// Executes commands on the local host through `bash -c`.
#[derive(Debug, Clone)]
pub struct LocalCommandRunner {
    timeout: Duration,
}

impl LocalCommandRunner {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(300),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for LocalCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for LocalCommandRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput, TransportError> {
        let output = tokio::time::timeout(
            self.timeout,
            Command::new("bash").arg("-c").arg(command).output(),
        )
        .await
        .map_err(|_| TransportError::Timeout(self.timeout))??;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            output: text,
        })
    }
}

/// What one completed step produced.
#[derive(Debug, Clone)]
pub struct StepReport {
    /// The command as actually run, after placeholder resolution.
    pub command: String,
    pub output: String,
    /// Attempts consumed, counting the first try.
    pub attempts: u32,
    pub extracted: HashMap<String, String>,
}

/// Everything a completed pipeline produced.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub steps: Vec<StepReport>,
    /// Union of the properties every step extracted.
    pub properties: HashMap<String, String>,
}

/// Applies each descriptor's contract against a command runner.
#[derive(Debug, Clone)]
pub struct PipelineExecutor<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> PipelineExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs an injection pipeline to completion, aborting the remaining
    /// steps on the first hard failure.
    pub async fn run_pipeline(
        &self,
        steps: &[CommandDescriptor],
    ) -> Result<PipelineReport, ExecutionError> {
        let mut report = PipelineReport::default();
        for step in steps {
            let step_report = self.execute_step(step, &mut report.properties).await?;
            report.steps.push(step_report);
        }
        Ok(report)
    }

    /// Runs a remediation pipeline, seeded with the properties extracted
    /// during injection (the `faultId` in particular).
    ///
    /// The trailing polled verification step is the only retried remediation
    /// step; exhausting its budget means the fault may still be active, which
    /// is surfaced as the distinct `RemediationIncomplete` outcome rather
    /// than a hard failure.
    pub async fn run_remediation(
        &self,
        steps: &[CommandDescriptor],
        injection_properties: HashMap<String, String>,
    ) -> Result<PipelineReport, ExecutionError> {
        let mut report = PipelineReport {
            steps: Vec::new(),
            properties: injection_properties,
        };
        let last = steps.len().saturating_sub(1);
        for (index, step) in steps.iter().enumerate() {
            match self.execute_step(step, &mut report.properties).await {
                Ok(step_report) => report.steps.push(step_report),
                Err(ExecutionError::OutputMismatch { attempts, .. })
                    if index == last && step.retry_count > 0 =>
                {
                    return Err(ExecutionError::RemediationIncomplete { attempts });
                }
                Err(error) => return Err(error),
            }
        }
        Ok(report)
    }

    /// Runs one descriptor under its own retry/validation contract.
    pub async fn execute_step(
        &self,
        step: &CommandDescriptor,
        properties: &mut HashMap<String, String>,
    ) -> Result<StepReport, ExecutionError> {
        let command = resolve_placeholders(&step.command, properties);
        let allowed_attempts = step.retry_count + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = self.runner.run(&command).await?;
            tracing::debug!(
                command = %command,
                exit_code = outcome.exit_code,
                attempt,
                "command completed"
            );

            let exit_ok = step.ignore_exit_code || outcome.exit_code == 0;
            let output_ok = !step.expects_output()
                || step
                    .expected_outputs
                    .iter()
                    .any(|expected| outcome.output.contains(expected.as_str()));

            if exit_ok && output_ok {
                let extracted = extract_properties(step, &outcome.output)?;
                properties.extend(extracted.clone());
                return Ok(StepReport {
                    command,
                    output: outcome.output,
                    attempts: attempt,
                    extracted,
                });
            }

            if attempt < allowed_attempts {
                tracing::debug!(
                    attempt,
                    allowed_attempts,
                    interval_secs = step.retry_interval_secs,
                    "step not yet successful, retrying"
                );
                tokio::time::sleep(Duration::from_secs(step.retry_interval_secs)).await;
                continue;
            }

            let diagnosis = classify_output(&step.known_failures, &outcome.output);
            if let Some(ref diagnosis) = diagnosis {
                tracing::warn!(command = %command, diagnosis = %diagnosis, "known failure");
            }
            return Err(if exit_ok {
                ExecutionError::OutputMismatch {
                    output: outcome.output,
                    attempts: attempt,
                    diagnosis,
                }
            } else {
                ExecutionError::CommandFailed {
                    exit_code: outcome.exit_code,
                    output: outcome.output,
                    diagnosis,
                }
            });
        }
    }
}

/// Substitutes `$INJECTION_INFO_<name>` tokens with extracted property
/// values. Unknown tokens are left in place so failures stay diagnosable.
pub fn resolve_placeholders(command: &str, properties: &HashMap<String, String>) -> String {
    let mut resolved = command.to_string();
    for (name, value) in properties {
        resolved = resolved.replace(&format!("{INJECTION_INFO_PREFIX}{name}"), value);
    }
    resolved
}

fn classify_output(known_failures: &BTreeMap<String, String>, output: &str) -> Option<String> {
    known_failures
        .iter()
        .find(|(pattern, _)| output.contains(pattern.as_str()))
        .map(|(_, diagnosis)| diagnosis.clone())
}

fn extract_properties(
    step: &CommandDescriptor,
    output: &str,
) -> Result<HashMap<String, String>, ExecutionError> {
    let mut extracted = HashMap::new();
    for rule in &step.output_extraction {
        let pattern =
            Regex::new(&rule.pattern).map_err(|source| ExecutionError::InvalidExtractionPattern {
                pattern: rule.pattern.clone(),
                source,
            })?;
        if let Some(found) = pattern.find(output) {
            extracted.insert(rule.property.clone(), found.as_str().to_string());
        }
    }
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_placeholders_and_keeps_unknown_ones() {
        let properties = HashMap::from([("faultId".to_string(), "1234".to_string())]);
        let resolved = resolve_placeholders(
            "bmsubmit.sh -rf $INJECTION_INFO_faultId -x $INJECTION_INFO_other",
            &properties,
        );
        assert_eq!(resolved, "bmsubmit.sh -rf 1234 -x $INJECTION_INFO_other");
    }

    #[test]
    fn classifies_first_matching_known_failure() {
        let known = BTreeMap::from([
            ("Connection refused".to_string(), "agent not reachable".to_string()),
            ("No such process".to_string(), "process exited".to_string()),
        ]);
        assert_eq!(
            classify_output(&known, "ERROR Connection refused by host"),
            Some("agent not reachable".to_string())
        );
        assert_eq!(classify_output(&known, "something novel"), None);
    }

    #[test]
    fn extraction_pulls_whole_match() {
        let step = CommandDescriptor::new("true").with_extraction(
            "faultId",
            crate::constants::UUID_PATTERN,
        );
        let extracted = extract_properties(
            &step,
            "Created fault successfully: 0f6f9d3a-1b2c-4d5e-8f90-a1b2c3d4e5f6 done",
        )
        .expect("extraction");
        assert_eq!(
            extracted.get("faultId").map(String::as_str),
            Some("0f6f9d3a-1b2c-4d5e-8f90-a1b2c3d4e5f6")
        );
    }

    #[test]
    fn invalid_extraction_pattern_is_reported() {
        let step = CommandDescriptor::new("true").with_extraction("broken", "([");
        let error = extract_properties(&step, "output").expect_err("must fail");
        assert_eq!(error.error_category(), "EXTRACTION");
    }
}
