//! # Remote Command Composition
//!
//! Pure functions that format the remote shell commands shared by both fault
//! variants. Nothing here touches the network or mutates the specification;
//! the pipeline builders assemble these strings into descriptors and the
//! executor runs them later.
//!
//! Environment wrapping order is fixed: a runtime-home prefix (when
//! `javaHomePath` is set) is applied first, then privilege elevation (when
//! `user` is set) wraps the whole resulting string, so the elevated shell
//! sees the already-prefixed command.

use crate::constants::{AGENT_ARCHIVE_EXTENSION, AGENT_NAME};
use crate::error::FaultError;
use crate::fault_spec::FaultSpecification;

/// Extracts the agent archive into the injection home directory.
pub fn extract_agent_command(spec: &FaultSpecification) -> String {
    format!(
        "cd {};tar -zxvf {AGENT_NAME}{AGENT_ARCHIVE_EXTENSION}",
        spec.injection_home_dir
    )
}

/// Recursively opens up permissions on the extracted agent directory.
/// Archive extraction does not guarantee execute bits.
pub fn normalize_permissions_command(spec: &FaultSpecification) -> String {
    let agent_path = spec.agent_path();
    format!("chmod -R 777 {agent_path};chmod -R 777 {agent_path}/*")
}

/// Attach-by-pid command installing the agent into the target process.
pub fn install_command(spec: &FaultSpecification) -> Result<String, FaultError> {
    let process_id = spec.process_id()?;
    let command = format!(
        "{}/bin/bminstall.sh -p {} -s -b {}",
        spec.agent_path(),
        spec.port,
        process_id
    );
    Ok(wrap_environment(spec, command))
}

/// Base submission command with the operation-specific suffix passed
/// explicitly: an install-rule path, `-u <path>`, `-if <args>`,
/// `-rf <fault id>`, or `-gf <fault id>`.
pub fn submit_command(spec: &FaultSpecification, operation: &str) -> String {
    let command = format!(
        "{}/bin/bmsubmit.sh -p {} {}",
        spec.agent_path(),
        spec.port,
        operation
    );
    wrap_environment(spec, command)
}

/// Persists rule text to the task's rule file through a remote shell echo.
pub fn write_rule_command(spec: &FaultSpecification, rule_text: &str) -> Result<String, FaultError> {
    let path = spec.rule_file_path()?;
    Ok(format!(
        "echo \"{}\" > {path}",
        escape_double_quotes(rule_text)
    ))
}

fn wrap_environment(spec: &FaultSpecification, command: String) -> String {
    let mut command = command;
    if let Some(java_home) = spec.java_home() {
        command =
            format!("export JAVA_HOME={java_home};export PATH=$JAVA_HOME/bin:$PATH;{command}");
    }
    if let Some(user) = spec.run_as_user() {
        command = format!("sudo -u {user} bash -c \"{command}\"");
    }
    command
}

pub(crate) fn escape_double_quotes(text: &str) -> String {
    text.replace('"', "\\\"")
}
