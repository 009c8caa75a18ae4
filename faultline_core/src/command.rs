//! # Command Descriptor Model
//!
//! One pipeline step: the fully composed remote command plus the contract the
//! executor applies to it (exit-code policy, expected-output matching, retry
//! budget, known-failure signatures, and output extraction rules).
//!
//! Descriptors are immutable values: each is built complete in a single
//! builder-chain expression by the pipeline builders and never mutated after
//! creation. They carry no behavior of their own.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pulls one property out of captured output with a regular expression.
/// The whole match becomes the property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OutputExtraction {
    pub property: String,
    pub pattern: String,
}

/// One remote command plus its validation, retry, and extraction metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CommandDescriptor {
    /// Fully composed shell command.
    pub command: String,
    /// When true, success is judged purely by output matching.
    #[serde(default)]
    pub ignore_exit_code: bool,
    /// The step succeeds if captured output contains any one of these.
    /// Empty means best-effort: output is not checked.
    #[serde(default)]
    pub expected_outputs: Vec<String>,
    /// Output-pattern to diagnosis, used to classify failures.
    #[serde(default)]
    pub known_failures: BTreeMap<String, String>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub retry_interval_secs: u64,
    #[serde(default)]
    pub output_extraction: Vec<OutputExtraction>,
}

impl CommandDescriptor {
    /// A step whose nonzero exit status is a hard failure.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ignore_exit_code: false,
            expected_outputs: Vec::new(),
            known_failures: BTreeMap::new(),
            retry_count: 0,
            retry_interval_secs: 0,
            output_extraction: Vec::new(),
        }
    }

    /// A step that tolerates nonzero exit status; success is judged by
    /// output alone (or unconditionally, when no output is expected).
    pub fn best_effort(command: impl Into<String>) -> Self {
        Self {
            ignore_exit_code: true,
            ..Self::new(command)
        }
    }

    pub fn with_expected_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_known_failures(mut self, failures: BTreeMap<String, String>) -> Self {
        self.known_failures = failures;
        self
    }

    pub fn with_retries(mut self, count: u32, interval_secs: u64) -> Self {
        self.retry_count = count;
        self.retry_interval_secs = interval_secs;
        self
    }

    pub fn with_extraction(mut self, property: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.output_extraction.push(OutputExtraction {
            property: property.into(),
            pattern: pattern.into(),
        });
        self
    }

    /// Whether this step checks captured output at all.
    pub fn expects_output(&self) -> bool {
        !self.expected_outputs.is_empty()
    }
}
