//! Structural tests for the injection pipeline: step counts, ordering,
//! per-step contracts, and the variant asymmetries.

mod common;

use common::test_utils::{argument_based_spec, contains_any, rule_based_spec};
use faultline_core::constants::{
    FAULT_CREATION_SUCCESS_MESSAGE, PROCESS_ARG, TASK_ID_ARG, UUID_PATTERN,
};
use faultline_core::error::FaultError;
use faultline_core::pipeline::{PipelineBuilder, support_scripts};
use regex::Regex;

#[test]
fn argument_based_pipeline_has_exactly_four_ordered_steps() {
    let steps = PipelineBuilder::default()
        .injection_pipeline(&argument_based_spec())
        .expect("pipeline");

    assert_eq!(steps.len(), 4);
    assert!(steps[0].command.contains("tar -zxvf"));
    assert!(steps[1].command.contains("chmod -R 777"));
    assert!(steps[2].command.contains("bminstall.sh"));
    assert!(steps[3].command.contains("bmsubmit.sh"));
}

#[test]
fn rule_based_pipeline_has_exactly_five_steps_with_rule_write_before_submit() {
    let steps = PipelineBuilder::default()
        .injection_pipeline(&rule_based_spec())
        .expect("pipeline");

    assert_eq!(steps.len(), 5);
    assert!(steps[0].command.contains("tar -zxvf"));
    assert!(steps[1].command.contains("chmod -R 777"));
    assert!(steps[2].command.contains("bminstall.sh"));
    assert!(steps[3].command.starts_with("echo \"RULE abc"));
    assert!(steps[3].command.ends_with("> /opt/m/abc.btm"));
    assert!(steps[4].command.contains("bmsubmit.sh"));
    assert!(steps[4].command.ends_with("/opt/m/abc.btm"));
}

#[test]
fn shared_prefix_steps_are_best_effort() {
    let steps = PipelineBuilder::default()
        .injection_pipeline(&argument_based_spec())
        .expect("pipeline");

    for step in &steps[..3] {
        assert!(step.ignore_exit_code, "step `{}` must tolerate exit codes", step.command);
    }
    assert!(steps[0].expected_outputs.is_empty());
    assert!(steps[1].expected_outputs.is_empty());
}

#[test]
fn install_step_accepts_success_or_retry_message_and_knows_failures() {
    let steps = PipelineBuilder::default()
        .injection_pipeline(&argument_based_spec())
        .expect("pipeline");

    let install = &steps[2];
    assert_eq!(install.expected_outputs.len(), 2);
    assert!(!install.known_failures.is_empty());
    assert!(install.command.contains("9091"));
    assert!(install.command.contains("123"));
    assert!(!contains_any(&install.command, &["sudo", "JAVA_HOME"]));
}

#[test]
fn run_as_user_wraps_install_and_submit_commands() {
    let mut spec = argument_based_spec();
    spec.args.insert("user".to_string(), "svc".to_string());

    let steps = PipelineBuilder::default()
        .injection_pipeline(&spec)
        .expect("pipeline");

    for step in [&steps[2], &steps[3]] {
        assert!(
            step.command.starts_with("sudo -u svc bash -c \""),
            "expected elevation wrapping in `{}`",
            step.command
        );
        assert!(step.command.ends_with('"'));
    }
}

#[test]
fn argument_submit_tolerates_exit_code_while_rule_submit_does_not() {
    let argument_steps = PipelineBuilder::default()
        .injection_pipeline(&argument_based_spec())
        .expect("pipeline");
    let rule_steps = PipelineBuilder::default()
        .injection_pipeline(&rule_based_spec())
        .expect("pipeline");

    assert!(argument_steps[3].ignore_exit_code);
    assert!(!rule_steps[4].ignore_exit_code);
}

#[test]
fn argument_submit_passes_args_as_delimited_pairs() {
    let steps = PipelineBuilder::default()
        .injection_pipeline(&argument_based_spec())
        .expect("pipeline");

    let submit = &steps[3];
    assert!(submit.command.contains("-if process=123 taskId=abc"));
    assert_eq!(
        submit.expected_outputs,
        vec![FAULT_CREATION_SUCCESS_MESSAGE.to_string()]
    );
    assert!(!submit.known_failures.is_empty());
}

#[test]
fn argument_submit_declares_exactly_one_uuid_extraction() {
    let steps = PipelineBuilder::default()
        .injection_pipeline(&argument_based_spec())
        .expect("pipeline");

    let extraction = &steps[3].output_extraction;
    assert_eq!(extraction.len(), 1);
    assert_eq!(extraction[0].property, "faultId");
    assert_eq!(extraction[0].pattern, UUID_PATTERN);

    let pattern = Regex::new(&extraction[0].pattern).expect("valid pattern");
    assert!(pattern.is_match("0f6f9d3a-1b2c-4d5e-8f90-a1b2c3d4e5f6"));
    assert!(!pattern.is_match("0f6f9d3a-1b2c-4d5e"));
    assert!(!pattern.is_match("not-a-uuid-at-all"));
}

#[test]
fn rule_submit_expects_install_rule_output() {
    let steps = PipelineBuilder::default()
        .injection_pipeline(&rule_based_spec())
        .expect("pipeline");

    assert_eq!(
        steps[4].expected_outputs,
        vec!["install rule abc".to_string()]
    );
    assert!(steps[3].expected_outputs.is_empty());
    assert!(steps[3].output_extraction.is_empty());
}

#[test]
fn missing_process_argument_fails_before_any_command_is_built() {
    let mut spec = argument_based_spec();
    spec.args.remove(PROCESS_ARG);

    let error = PipelineBuilder::default()
        .injection_pipeline(&spec)
        .expect_err("must fail");
    assert_eq!(error, FaultError::MissingArgument { key: PROCESS_ARG });
}

#[test]
fn missing_task_id_fails_for_rule_based_faults_only() {
    let mut rule_spec = rule_based_spec();
    rule_spec.args.remove(TASK_ID_ARG);
    let error = PipelineBuilder::default()
        .injection_pipeline(&rule_spec)
        .expect_err("must fail");
    assert_eq!(error, FaultError::MissingArgument { key: TASK_ID_ARG });

    let mut argument_spec = argument_based_spec();
    argument_spec.args.remove(TASK_ID_ARG);
    assert!(
        PipelineBuilder::default()
            .injection_pipeline(&argument_spec)
            .is_ok()
    );
}

#[test]
fn support_scripts_name_the_agent_archive() {
    let scripts = support_scripts(&argument_based_spec());
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].file_name.ends_with(".tar.gz"));
    assert_eq!(scripts[0].target_directory, "/opt/m/");
}
