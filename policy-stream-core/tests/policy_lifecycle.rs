// policy-stream-core/tests/policy_lifecycle.rs
// ============================================================================
// Module: Runtime Policy Lifecycle Tests
// Description: Tests for the unbuilt/built state machine and its errors.
// Purpose: Validate build-once semantics and rejection of premature ingest.
// Dependencies: policy-stream-core
// ============================================================================
//! ## Overview
//! Ensures a runtime policy rejects ingest before build, refuses a second
//! build while keeping the first pipeline, and stays rebuildable after a
//! failed build.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod helpers;

use std::sync::atomic::Ordering;

use helpers::pipeline_stub::FailingBuilder;
use helpers::pipeline_stub::ScriptedBuilder;
use helpers::sync::quiesce;
use policy_stream_core::DebugMode;
use policy_stream_core::Event;
use policy_stream_core::PolicyError;
use policy_stream_core::RuntimePolicy;
use serde_json::json;

/// Verifies ingest before build is rejected and render stays empty.
#[test]
fn unbuilt_policy_rejects_ingest() {
    let policy = RuntimePolicy::new("policy/x/0");

    let err = policy.ingest(Event::new(json!({"a": 1}))).unwrap_err();
    assert!(matches!(err, PolicyError::NotBuilt(_)));
    assert_eq!(err.to_string(), "policy 'policy/x/0' is not built");

    let (output, trace) = policy.render(DebugMode::OutputOnly);
    assert_eq!(output, "");
    assert_eq!(trace, "{}");
}

/// Verifies the second build fails while the first pipeline keeps working.
#[test]
fn second_build_is_rejected_and_first_pipeline_survives() {
    let builder = ScriptedBuilder::new(["[decoder/d/0] [condition]:matched"]);
    let processed = builder.processed();
    let mut policy = RuntimePolicy::new("policy/x/0");

    policy.build(&builder).expect("first build");
    let err = policy.build(&builder).unwrap_err();
    assert!(matches!(err, PolicyError::AlreadyBuilt(_)));
    assert_eq!(err.to_string(), "policy 'policy/x/0' is already built");

    policy.ingest(Event::new(json!({"a": 1}))).expect("ingest after rejected rebuild");
    quiesce(&policy, &processed, 2);

    let (output, trace) = policy.render(DebugMode::OutputAndTraces);
    assert_eq!(output, "{\n  \"a\": 1\n}\n");
    let parsed: serde_json::Value = serde_json::from_str(&trace).expect("trace json");
    assert_eq!(parsed, json!({"decoder/d/0": "matched"}));
}

/// Verifies a failed build leaves the instance unbuilt and rebuildable.
#[test]
fn failed_build_leaves_policy_unbuilt() {
    let mut policy = RuntimePolicy::new("policy/x/0");

    let err = policy.build(&FailingBuilder::new("unknown asset decoder/missing/0")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "error building policy [policy/x/0]: policy compilation failed: \
         unknown asset decoder/missing/0"
    );
    assert!(!policy.is_built());

    let err = policy.ingest(Event::new(json!({}))).unwrap_err();
    assert!(matches!(err, PolicyError::NotBuilt(_)));

    let builder = ScriptedBuilder::new(["[decoder/d/0] [condition]:matched"]);
    policy.build(&builder).expect("build after failed build");
    assert!(policy.is_built());
}

/// Verifies the policy identifier is preserved verbatim.
#[test]
fn policy_id_is_immutable_and_visible() {
    let policy = RuntimePolicy::new("policy/wazuh/0");
    assert_eq!(policy.policy_id().as_str(), "policy/wazuh/0");
    assert!(!policy.is_built());
}

/// Verifies dropping a built policy tears the pipeline down cleanly after
/// queued events have drained.
#[test]
fn drop_after_ingest_joins_the_pipeline() {
    let builder = ScriptedBuilder::new(["[decoder/d/0] [condition]:matched"]);
    let processed = builder.processed();
    let mut policy = RuntimePolicy::new("policy/x/0");
    policy.build(&builder).expect("build");

    policy.ingest(Event::new(json!({"a": 1}))).expect("ingest");
    drop(policy);

    // The controller joins its worker on drop, so the queued event was
    // applied before the drop returned.
    assert_eq!(processed.load(Ordering::SeqCst), 1);
}
