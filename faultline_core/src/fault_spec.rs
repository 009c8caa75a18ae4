//! # Fault Specification
//!
//! The immutable input descriptor for one fault-injection request. Host
//! platforms hand these over as JSON documents; the spec is read-only for the
//! rest of the fault's lifecycle.
//!
//! The two supported fault families are carried as an explicit tagged
//! variant, so pipeline assembly branches exhaustively instead of inspecting
//! runtime types:
//!
//! - **`RuleBased`**: a code-level fault expressed as a generated rule script
//!   installed into the agent. Requires a `taskId` argument, which names the
//!   generated rule file and anchors uninstall output matching.
//! - **`ArgumentBased`**: a fault invoked by passing flat key/value arguments
//!   directly to an already-running agent.

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::constants::{
    AGENT_NAME, JAVA_HOME_ARG, PROCESS_ARG, RULE_FILE_EXTENSION, TASK_ID_ARG, USER_ARG,
};
use crate::error::FaultError;
use crate::rule::RuleDefinition;

/// Distinguishes the two structurally different fault families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum FaultVariant {
    /// Code-level fault carrying its rule-generation payload.
    RuleBased { rule: RuleDefinition },
    /// Agent fault driven by the flat `args` key/values.
    ArgumentBased,
}

/// Immutable descriptor of one fault-injection request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FaultSpecification {
    /// Absolute remote directory holding the agent and generated artifacts.
    pub injection_home_dir: String,
    /// Fault parameters. Recognized keys: `taskId`, `process`, optional
    /// `user`, optional `javaHomePath`.
    #[serde(default)]
    pub args: HashMap<String, String>,
    /// Socket port used to attach to the target process.
    pub port: u16,
    pub variant: FaultVariant,
}

impl FaultSpecification {
    /// Loads a specification from a JSON document on disk.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read fault specification {}", path.display()))?;
        let spec: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse fault specification {}", path.display()))?;
        Ok(spec)
    }

    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    /// Task identifier; required for rule-based faults.
    pub fn task_id(&self) -> Result<&str, FaultError> {
        self.arg(TASK_ID_ARG)
            .ok_or(FaultError::MissingArgument { key: TASK_ID_ARG })
    }

    /// Target process identifier; required to attach the agent.
    pub fn process_id(&self) -> Result<&str, FaultError> {
        self.arg(PROCESS_ARG)
            .ok_or(FaultError::MissingArgument { key: PROCESS_ARG })
    }

    pub fn run_as_user(&self) -> Option<&str> {
        self.arg(USER_ARG)
    }

    pub fn java_home(&self) -> Option<&str> {
        self.arg(JAVA_HOME_ARG)
    }

    pub fn rule(&self) -> Option<&RuleDefinition> {
        match &self.variant {
            FaultVariant::RuleBased { rule } => Some(rule),
            FaultVariant::ArgumentBased => None,
        }
    }

    /// Fails fast when an argument the injection pipeline needs for this
    /// spec's variant is missing.
    pub fn validate_for_injection(&self) -> Result<(), FaultError> {
        self.process_id()?;
        if matches!(self.variant, FaultVariant::RuleBased { .. }) {
            self.task_id()?;
        }
        Ok(())
    }

    /// Joins a file name onto the injection home directory, tolerating a
    /// present or absent trailing slash.
    pub fn home_path(&self, file_name: &str) -> String {
        let dir = self.injection_home_dir.trim_end_matches('/');
        format!("{dir}/{file_name}")
    }

    /// Path of the extracted agent directory on the target.
    pub fn agent_path(&self) -> String {
        self.home_path(AGENT_NAME)
    }

    /// Path of the generated rule file for this task.
    pub fn rule_file_path(&self) -> Result<String, FaultError> {
        let task_id = self.task_id()?;
        Ok(self.home_path(&format!("{task_id}{RULE_FILE_EXTENSION}")))
    }
}
