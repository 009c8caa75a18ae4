//! Rule text generation for code-level faults.
//!
//! A rule-based fault carries a `RuleDefinition` describing where in the
//! target's bytecode the fault fires and what it does there. `render()`
//! produces the literal rule script the injection pipeline persists on the
//! target; the pipeline never interprets the text, it only writes and submits
//! it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One instrumentation rule, rendered into the agent's rule language.
///
/// The rule is named at render time with the fault's task identifier; the
/// agent echoes that name back in install/uninstall output, which is what
/// the pipelines match against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    /// Fully qualified class to instrument.
    pub class_name: String,
    /// Method within the class.
    pub method_name: String,
    #[serde(default)]
    pub event: RuleEvent,
    /// Guard expression; omitted means the rule always fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub action: RuleAction,
}

/// Where in the instrumented method the rule triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum RuleEvent {
    #[default]
    Entry,
    Exit,
    AtLine(u32),
}

/// The fault behavior injected at the trigger point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RuleAction {
    ThrowException { class_name: String, message: String },
    Delay { millis: u64 },
    KillThread,
    ReturnValue { value: String },
}

impl RuleDefinition {
    /// Renders the complete rule script under the given rule name.
    pub fn render(&self, name: &str) -> String {
        let location = match self.event {
            RuleEvent::Entry => "AT ENTRY".to_string(),
            RuleEvent::Exit => "AT EXIT".to_string(),
            RuleEvent::AtLine(line) => format!("AT LINE {line}"),
        };
        let condition = self.condition.as_deref().unwrap_or("TRUE");
        let action = match &self.action {
            RuleAction::ThrowException {
                class_name,
                message,
            } => {
                format!("throw new {class_name}(\"{message}\")")
            }
            RuleAction::Delay { millis } => format!("Thread.sleep({millis}L)"),
            RuleAction::KillThread => "killThread()".to_string(),
            RuleAction::ReturnValue { value } => format!("return {value}"),
        };
        format!(
            "RULE {}\nCLASS {}\nMETHOD {}\n{}\nIF {}\nDO {}\nENDRULE",
            name, self.class_name, self.method_name, location, condition, action
        )
    }
}
