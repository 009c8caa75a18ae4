//! Shared literals: the agent distribution layout, the `args` keys recognized
//! on a fault specification, and the agent output fragments the pipelines
//! match against.

/// Directory name of the extracted agent distribution on the target host.
pub const AGENT_NAME: &str = "faultline-byteman-agent-1.0";

/// Extension of the agent archive staged next to the extracted directory.
pub const AGENT_ARCHIVE_EXTENSION: &str = ".tar.gz";

/// Extension of generated rule files.
pub const RULE_FILE_EXTENSION: &str = ".btm";

// Recognized keys of `FaultSpecification::args`.
pub const TASK_ID_ARG: &str = "taskId";
pub const PROCESS_ARG: &str = "process";
pub const USER_ARG: &str = "user";
pub const JAVA_HOME_ARG: &str = "javaHomePath";

/// Property name under which the injection submit step extracts the
/// agent-assigned fault identifier.
pub const FAULT_ID_PROPERTY: &str = "faultId";

/// Prefix of placeholder tokens resolved from extracted properties at
/// execution time. `$` keeps the token out of the way of ordinary shell text
/// while staying greppable in captured commands.
pub const INJECTION_INFO_PREFIX: &str = "$INJECTION_INFO_";

/// UUID shape of agent-assigned fault identifiers.
pub const UUID_PATTERN: &str = "[0-9a-f]{8}-([0-9a-f]{4}-){3}[0-9a-f]{12}";

// Agent output fragments. The install step accepts either message: a prior
// attach attempt may have partially succeeded, so "already attached" is an
// acceptable terminal state.
pub const AGENT_INSTALL_SUCCESS_MESSAGE: &str = "Started fault agent listener successfully";
pub const AGENT_INSTALL_RETRY_MESSAGE: &str =
    "Fault agent is already attached to the requested process";
pub const FAULT_CREATION_SUCCESS_MESSAGE: &str = "Created fault successfully";
pub const REMEDIATION_REQUEST_SUCCESS_MESSAGE: &str =
    "Received fault remediation request successfully";
pub const FAULT_COMPLETION_MESSAGE: &str = "faultStatus:COMPLETED";
pub const AGENT_NOT_AVAILABLE_MESSAGE: &str = "Unable to connect to the fault agent";

/// Remediation completes out-of-band in the agent, so the verification step
/// polls instead of assuming synchronous completion.
pub const REMEDIATION_VERIFICATION_RETRIES: u32 = 6;
pub const REMEDIATION_VERIFICATION_INTERVAL_SECS: u64 = 10;
