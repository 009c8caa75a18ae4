//! # Faultline Core
//!
//! This crate builds and drives the ordered sequences of remote shell
//! commands a chaos-engineering platform uses to install an instrumentation
//! agent on a target host, inject a runtime fault into a running process,
//! and later remediate that fault.
//!
//! ## Modules
//!
//! - **`fault_spec`**: The immutable `FaultSpecification` input descriptor
//!   and the tagged `FaultVariant` distinguishing rule-based (code-level)
//!   faults from argument-based agent faults.
//!
//! - **`command`**: The `CommandDescriptor` value: one remote command plus
//!   its success/failure matching rules, retry policy, known-failure
//!   signatures, and output-extraction rules. Pure data.
//!
//! - **`command_builder`**: Pure functions that compose the remote command
//!   strings: archive extraction, permission normalization, attach-by-pid
//!   installation, and operation submission, with runtime-home and
//!   privilege-elevation wrapping.
//!
//! - **`rule`**: Rule text generation for code-level faults; the rendered
//!   script is persisted remotely and submitted to the agent verbatim.
//!
//! - **`pipeline`**: The `PipelineBuilder` assembling the ordered descriptor
//!   sequences for injection and remediation, including the polled
//!   remediation verification step.
//!
//! - **`executor`**: The `CommandRunner` transport seam, a local `bash -c`
//!   runner, and the `PipelineExecutor` that applies each descriptor's
//!   contract one step at a time.
//!
//! - **`known_failures`**: The per-stage catalog mapping recognized failure
//!   output to human-readable diagnoses.
//!
//! - **`error`**: Typed construction-time and execution-time errors.
//!
//! - **`constants`**: Agent layout literals, recognized argument keys, and
//!   the agent output fragments the pipelines match against.
//!
//! - **`logging`**: `tracing` subscriber initialization.

pub mod command;
pub mod command_builder;
pub mod constants;
pub mod error;
pub mod executor;
pub mod fault_spec;
pub mod known_failures;
pub mod logging;
pub mod pipeline;
pub mod rule;

pub use command::CommandDescriptor;
pub use error::{ExecutionError, FaultError};
pub use executor::{CommandRunner, LocalCommandRunner, PipelineExecutor};
pub use fault_spec::{FaultSpecification, FaultVariant};
pub use pipeline::PipelineBuilder;
