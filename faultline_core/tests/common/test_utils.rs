#![allow(dead_code)]
use async_trait::async_trait;
use faultline_core::error::TransportError;
use faultline_core::executor::{CommandOutput, CommandRunner};
use faultline_core::fault_spec::{FaultSpecification, FaultVariant};
use faultline_core::rule::{RuleAction, RuleDefinition, RuleEvent};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub fn init_test_logging() {
    faultline_core::logging::init_test_logging();
}

/// Check if output contains any of the expected patterns
pub fn contains_any(output: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|pattern| output.contains(pattern))
}

/// The argument-based scenario spec used throughout the tests:
/// `/opt/m/`, process 123, task abc, port 9091.
pub fn argument_based_spec() -> FaultSpecification {
    FaultSpecification {
        injection_home_dir: "/opt/m/".to_string(),
        args: HashMap::from([
            ("process".to_string(), "123".to_string()),
            ("taskId".to_string(), "abc".to_string()),
        ]),
        port: 9091,
        variant: FaultVariant::ArgumentBased,
    }
}

/// Same shape, rule-based, with an exception-throwing rule named after the
/// task.
pub fn rule_based_spec() -> FaultSpecification {
    FaultSpecification {
        variant: FaultVariant::RuleBased {
            rule: RuleDefinition {
                class_name: "com.example.OrderService".to_string(),
                method_name: "placeOrder".to_string(),
                event: RuleEvent::Entry,
                condition: None,
                action: RuleAction::ThrowException {
                    class_name: "java.io.IOException".to_string(),
                    message: "injected".to_string(),
                },
            },
        },
        ..argument_based_spec()
    }
}

/// A `CommandRunner` that replays a fixed script of outputs and records the
/// commands it was asked to run. Running past the end of the script is a
/// transport failure.
pub struct ScriptedRunner {
    responses: Mutex<VecDeque<CommandOutput>>,
    commands: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(responses: Vec<CommandOutput>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_commands(&self) -> Vec<String> {
        self.commands.lock().expect("commands lock").clone()
    }
}

pub fn ok_output(output: &str) -> CommandOutput {
    CommandOutput {
        exit_code: 0,
        output: output.to_string(),
    }
}

pub fn failed_output(exit_code: i32, output: &str) -> CommandOutput {
    CommandOutput {
        exit_code,
        output: output.to_string(),
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput, TransportError> {
        self.commands
            .lock()
            .expect("commands lock")
            .push(command.to_string());
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .ok_or_else(|| TransportError::Session("scripted runner exhausted".to_string()))
    }
}
