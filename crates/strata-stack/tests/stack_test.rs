//! Stack lifecycle tests against in-memory collaborators.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::*;
use serde_json::{Value, json};
use strata_catalog::LabelSelector;
use strata_executor::{RecordingExecutor, SubmissionError};
use strata_schema::{Fallback, Inputs, LookupTemplate, SchemaError, VariableDeclaration};
use strata_stack::{ChannelNotifier, ChildInsert, Phase, Stack, StackError, StackEvent};
use tokio::sync::mpsc;

async fn ready_ec2_stack(executor: Arc<RecordingExecutor>) -> Stack {
  let mut stack = Stack::new("jenkins_on_ec2", services(vec![], executor));
  stack.add_required("hostname", None, None).unwrap();
  stack.add_substack(KEY_GEN).unwrap();
  stack.add_substack(EC2_SERVER).unwrap();
  stack.add_substack(JENKINS_ON_DOCKER).unwrap();

  let inputs = Inputs::from_pairs([("hostname", "h1")]).unwrap();
  stack.init_variables(&inputs).await.unwrap();
  stack.init_substacks().await.unwrap();
  stack
}

fn insert_for(stack: &Stack) -> ChildInsert {
  ChildInsert::new(map(json!({ "hostname": stack.get_str("hostname").unwrap() })))
}

#[tokio::test]
async fn test_submission_order_matches_registration() {
  let executor = Arc::new(RecordingExecutor::new());
  let mut stack = ready_ec2_stack(executor.clone()).await;

  for alias in ["aws_key_gen_and_upload", "aws_ec2_server", "jenkins_on_docker"] {
    let insert = insert_for(&stack);
    stack.insert(alias, insert).await.unwrap();
  }

  assert_eq!(
    executor.aliases(),
    vec!["aws_key_gen_and_upload", "aws_ec2_server", "jenkins_on_docker"]
  );
  let result = stack.get_results();
  assert_eq!(
    result.submitted_aliases(),
    vec!["aws_key_gen_and_upload", "aws_ec2_server", "jenkins_on_docker"]
  );
}

#[tokio::test]
async fn test_children_may_be_skipped_but_not_reordered() {
  let executor = Arc::new(RecordingExecutor::new());
  let mut stack = ready_ec2_stack(executor.clone()).await;

  let insert = insert_for(&stack);
  stack.insert("aws_ec2_server", insert).await.unwrap();

  let insert = insert_for(&stack);
  let err = stack.insert("aws_key_gen_and_upload", insert).await.unwrap_err();
  assert!(matches!(
    err,
    StackError::OutOfOrder { ref alias, ref last }
      if alias == "aws_key_gen_and_upload" && last == "aws_ec2_server"
  ));

  let insert = insert_for(&stack);
  stack.insert("jenkins_on_docker", insert).await.unwrap();
  assert_eq!(executor.aliases(), vec!["aws_ec2_server", "jenkins_on_docker"]);
}

#[tokio::test]
async fn test_failed_submission_aborts_stack() {
  let executor = Arc::new(RecordingExecutor::new().rejecting("aws_ec2_server", "quota exceeded"));
  let mut stack = ready_ec2_stack(executor.clone()).await;

  let insert = insert_for(&stack);
  stack.insert("aws_key_gen_and_upload", insert).await.unwrap();

  let insert = insert_for(&stack);
  let err = stack.insert("aws_ec2_server", insert).await.unwrap_err();
  assert!(matches!(
    err,
    StackError::Submission(SubmissionError::Rejected { .. })
  ));

  let insert = insert_for(&stack);
  let err = stack.insert("jenkins_on_docker", insert).await.unwrap_err();
  assert!(matches!(err, StackError::Aborted { ref alias } if alias == "aws_ec2_server"));

  assert_eq!(executor.aliases(), vec!["aws_key_gen_and_upload"]);
}

#[tokio::test]
async fn test_missing_required_variable_submits_nothing() {
  let executor = Arc::new(RecordingExecutor::new());
  let mut stack = Stack::new("jenkins_on_ec2", services(vec![], executor.clone()));
  stack.add_required("hostname", None, None).unwrap();
  stack.add_substack(EC2_SERVER).unwrap();

  let err = stack.init_variables(&Inputs::new()).await.unwrap_err();
  assert!(matches!(
    err,
    StackError::Schema(SchemaError::MissingRequiredVariable { ref name }) if name == "hostname"
  ));

  let err = stack
    .insert("aws_ec2_server", ChildInsert::default())
    .await
    .unwrap_err();
  assert!(matches!(err, StackError::PhaseOrder { .. }));
  assert!(executor.submissions().is_empty());
}

#[tokio::test]
async fn test_phase_order_is_enforced() {
  let executor = Arc::new(RecordingExecutor::new());
  let mut stack = Stack::new("jenkins_on_docker", services(vec![], executor));
  stack.add_execgroup(JENKINS_WITH_DOCKER).unwrap();
  stack.add_substack(HOST_FILE).unwrap();

  let err = stack.init_execgroups().await.unwrap_err();
  assert!(matches!(
    err,
    StackError::PhaseOrder {
      expected: Phase::VariablesResolved,
      actual: Phase::Declaring,
      ..
    }
  ));

  stack.init_variables(&Inputs::new()).await.unwrap();
  assert!(matches!(
    stack.init_variables(&Inputs::new()).await,
    Err(StackError::PhaseOrder { .. })
  ));
  assert!(matches!(
    stack.add_substack(KEY_GEN),
    Err(StackError::PhaseOrder { .. })
  ));

  let err = stack.init_substacks().await.unwrap_err();
  assert!(matches!(
    err,
    StackError::PhaseOrder {
      expected: Phase::ExecgroupsLocked,
      actual: Phase::VariablesResolved,
      ..
    }
  ));

  stack.init_execgroups().await.unwrap();
  let err = stack
    .insert("get_contents_host_file", ChildInsert::default())
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    StackError::PhaseOrder {
      expected: Phase::SubstacksLocked,
      ..
    }
  ));

  stack.init_substacks().await.unwrap();
  assert_eq!(stack.phase(), Phase::SubstacksLocked);
}

#[tokio::test]
async fn test_child_registration_errors() {
  let executor = Arc::new(RecordingExecutor::new());
  let mut stack = Stack::new("s", services(vec![], executor));

  assert!(matches!(
    stack.add_substack("aws_ec2_server"),
    Err(StackError::InvalidReference { .. })
  ));

  stack.add_substack(EC2_SERVER).unwrap();
  assert!(matches!(
    stack.add_substack("someone-else:::aws_ec2_server"),
    Err(StackError::DuplicateChild { ref alias }) if alias == "aws_ec2_server"
  ));
  assert_eq!(stack.child_aliases(), vec!["aws_ec2_server"]);
}

#[tokio::test]
async fn test_unknown_and_mismatched_children() {
  let executor = Arc::new(RecordingExecutor::new());

  let mut stack = Stack::new("s", services(vec![], executor.clone()));
  stack.add_substack("williaumwu:::aws_rds").unwrap();
  stack.init_variables(&Inputs::new()).await.unwrap();
  assert!(matches!(
    stack.init_substacks().await,
    Err(StackError::ChildNotFound { .. })
  ));

  let mut stack = Stack::new("s", services(vec![], executor));
  stack.add_execgroup(EC2_SERVER).unwrap();
  stack.init_variables(&Inputs::new()).await.unwrap();
  assert!(matches!(
    stack.init_execgroups().await,
    Err(StackError::ChildKind { .. })
  ));
}

#[tokio::test]
async fn test_stateful_ids_are_distinct() {
  let executor = Arc::new(RecordingExecutor::new());
  let mut stack = ready_ec2_stack(executor.clone()).await;

  let drawn = stack.random_id(10).unwrap();
  let insert = insert_for(&stack).with_stateful_id(&drawn);
  stack.insert("aws_key_gen_and_upload", insert).await.unwrap();

  let insert = insert_for(&stack).with_stateful_id(&drawn);
  let err = stack.insert("aws_ec2_server", insert).await.unwrap_err();
  assert!(matches!(
    err,
    StackError::Submission(SubmissionError::DuplicateStatefulId { .. })
  ));

  let insert = insert_for(&stack);
  stack.insert("aws_ec2_server", insert).await.unwrap();
  let insert = insert_for(&stack);
  stack.insert("jenkins_on_docker", insert).await.unwrap();

  let ids: HashSet<String> = executor
    .submissions()
    .iter()
    .map(|s| s.stateful_id().to_string())
    .collect();
  assert_eq!(ids.len(), 3);
  assert!(ids.contains(&drawn));
}

#[tokio::test]
async fn test_set_variable_only_fills_nulls() {
  let executor = Arc::new(RecordingExecutor::new());
  let mut stack = ready_ec2_stack(executor).await;

  stack
    .set_variable("private_key_base64", json!("a2V5"))
    .unwrap();
  assert_eq!(stack.get_str("private_key_base64"), Some("a2V5"));

  assert!(matches!(
    stack.set_variable("hostname", json!("h2")),
    Err(StackError::VariableAlreadyResolved { ref name }) if name == "hostname"
  ));
  assert_eq!(stack.get_str("hostname"), Some("h1"));

  let insert = insert_for(&stack);
  stack.insert("aws_key_gen_and_upload", insert).await.unwrap();
  assert!(matches!(
    stack.set_variable("public_ip", json!("1.2.3.4")),
    Err(StackError::PhaseOrder {
      actual: Phase::Submitting,
      ..
    })
  ));
}

#[tokio::test]
async fn test_outputs_last_write_wins_and_are_forwarded() {
  let (tx, mut rx) = mpsc::unbounded_channel();
  let executor = Arc::new(RecordingExecutor::new());
  let services = services(vec![], executor).with_notifier(Arc::new(ChannelNotifier::new(tx)));

  let mut stack = Stack::new("s", services);
  stack.init_variables(&Inputs::new()).await.unwrap();
  stack.output_to_ui([("a", json!(1))]);
  stack.output_to_ui([("a", json!(2))]);

  let result = stack.get_results();
  assert_eq!(result.outputs, map(json!({ "a": 2 })));

  let mut emitted = Vec::new();
  while let Ok(event) = rx.try_recv() {
    if let StackEvent::OutputEmitted { outputs, .. } = event {
      emitted.push(outputs);
    }
  }
  assert_eq!(emitted, vec![map(json!({ "a": 1 })), map(json!({ "a": 2 }))]);
}

#[tokio::test]
async fn test_reexport_copies_selected_child_outputs() {
  let executor = Arc::new(
    RecordingExecutor::new().with_outputs(
      "aws_ec2_server",
      map(json!({ "public_ip": "1.2.3.4", "instance_id": "i-123" })),
    ),
  );
  let mut stack = Stack::new("jenkins_on_ec2", services(vec![], executor));
  stack.add_substack(EC2_SERVER).unwrap();
  stack.reexport("aws_ec2_server", ["public_ip"]).unwrap();
  assert!(matches!(
    stack.reexport("aws_rds", ["endpoint"]),
    Err(StackError::UnknownChild { .. })
  ));

  stack.init_variables(&Inputs::new()).await.unwrap();
  stack.init_substacks().await.unwrap();
  stack
    .insert("aws_ec2_server", ChildInsert::default())
    .await
    .unwrap();
  stack.output_to_ui([("hostname", json!("h1"))]);

  let result = stack.get_results();
  assert_eq!(
    result.outputs,
    map(json!({ "hostname": "h1", "public_ip": "1.2.3.4" }))
  );
}

#[tokio::test]
async fn test_public_ip_lookup_feeds_install_arguments() {
  let executor = Arc::new(RecordingExecutor::new());
  let records = vec![server("h1", "1.2.3.4"), server("h2", "5.6.7.8")];
  let mut stack = Stack::new("jenkins_on_docker", services(records, executor.clone()));

  stack.add_required("hostname", None, None).unwrap();
  stack
    .declare(
      VariableDeclaration::required("public_ip").with_fallback(Fallback::Lookup(
        LookupTemplate::new("server", LabelSelector::project_default(), "public_ip")
          .named("{{ hostname }}"),
      )),
    )
    .unwrap();
  stack.add_execgroup(JENKINS_WITH_DOCKER).unwrap();

  let inputs = Inputs::from_pairs([("hostname", "h1")]).unwrap();
  stack.init_variables(&inputs).await.unwrap();
  stack.init_execgroups().await.unwrap();
  stack.init_substacks().await.unwrap();

  let arguments = map(json!({
    "hostname": stack.get("hostname").cloned().unwrap(),
    "public_ip": stack.get("public_ip").cloned().unwrap(),
  }));
  stack
    .insert("jenkins_with_docker", ChildInsert::new(arguments))
    .await
    .unwrap();

  let submissions = executor.submissions();
  assert_eq!(submissions.len(), 1);
  assert_eq!(submissions[0].arguments()["public_ip"], json!("1.2.3.4"));
}

#[tokio::test]
async fn test_arguments_are_passed_through_unchanged() {
  let executor = Arc::new(RecordingExecutor::new());
  let records = vec![key_pair("k1", "LS0tLS1CRUdJTiBSU0E=\n")];
  let mut stack = Stack::new("jenkins_on_docker", services(records, executor.clone()));
  stack.add_substack(HOST_FILE).unwrap();
  stack.init_variables(&Inputs::new()).await.unwrap();
  stack.init_substacks().await.unwrap();

  let key = stack
    .lookup_attribute(
      &strata_catalog::ResourceQuery::new(
        strata_catalog::ResourceKind::SshKeyPair,
        LabelSelector::project_default(),
      )
      .named("k1")
      .must_be_one(),
      "private_key_base64",
    )
    .await
    .unwrap();
  stack.set_variable("private_key_base64", key).unwrap();

  let arguments = map(json!({
    "remote_file": "/var/lib/jenkins/secrets/initialAdminPassword",
    "key": "jenkins_password",
    "ipaddress": "1.2.3.4",
    "private_key_hash": stack.get("private_key_base64").cloned().unwrap(),
    "port": 22,
    "sudo": true
  }));
  stack
    .insert(
      "get_contents_host_file",
      ChildInsert::new(arguments.clone()).with_human_description("Publish jenkins admin init password"),
    )
    .await
    .unwrap();

  let submitted = &executor.submissions()[0];
  assert_eq!(submitted.arguments(), &arguments);
  assert_eq!(
    serde_json::to_string(submitted.arguments()).unwrap(),
    serde_json::to_string(&arguments).unwrap()
  );
  assert_eq!(
    submitted.arguments()["private_key_hash"],
    Value::String("LS0tLS1CRUdJTiBSU0E=\n".to_string())
  );
}

#[tokio::test]
async fn test_malformed_stateful_id_is_refused() {
  let executor = Arc::new(RecordingExecutor::new());
  let mut stack = ready_ec2_stack(executor.clone()).await;

  let insert = insert_for(&stack).with_stateful_id("../escaped");
  let err = stack.insert("aws_key_gen_and_upload", insert).await.unwrap_err();
  assert!(matches!(
    err,
    StackError::Submission(SubmissionError::InvalidStatefulId { ref stateful_id, .. })
      if stateful_id == "../escaped"
  ));
  assert!(executor.submissions().is_empty());

  let insert = insert_for(&stack);
  stack.insert("aws_key_gen_and_upload", insert).await.unwrap();
}

#[tokio::test]
async fn test_rejected_arguments_leave_stack_unchanged() {
  let executor = Arc::new(RecordingExecutor::new());
  let mut stack = ready_ec2_stack(executor.clone()).await;

  let drawn = stack.random_id(10).unwrap();
  let insert = ChildInsert::new(map(json!({ "hosts": { "all": ["1.2.3.4"] } })))
    .with_stateful_id(&drawn);
  let err = stack.insert("aws_key_gen_and_upload", insert).await.unwrap_err();
  assert!(matches!(
    err,
    StackError::Submission(SubmissionError::InvalidArgument { ref key, .. }) if key == "hosts"
  ));
  assert_eq!(stack.phase(), Phase::SubstacksLocked);
  assert!(executor.submissions().is_empty());

  stack
    .set_variable("public_ip", json!("1.2.3.4"))
    .unwrap();
  let insert = insert_for(&stack).with_stateful_id(&drawn);
  stack.insert("aws_key_gen_and_upload", insert).await.unwrap();
  assert_eq!(executor.submissions()[0].stateful_id(), drawn);
}

#[tokio::test]
async fn test_stack_completed_is_emitted_once() {
  let (tx, mut rx) = mpsc::unbounded_channel();
  let executor = Arc::new(RecordingExecutor::new());
  let services = services(vec![], executor).with_notifier(Arc::new(ChannelNotifier::new(tx)));

  let mut stack = Stack::new("s", services);
  stack.init_variables(&Inputs::new()).await.unwrap();
  stack.output_to_ui([("a", json!(1))]);

  let first = stack.get_results();
  let second = stack.get_results();
  assert_eq!(first.outputs, second.outputs);

  let mut completed = 0;
  while let Ok(event) = rx.try_recv() {
    if matches!(event, StackEvent::StackCompleted { .. }) {
      completed += 1;
    }
  }
  assert_eq!(completed, 1);
}
