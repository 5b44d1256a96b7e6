use std::collections::BTreeMap;

use serde_json::json;
use strata_schema::Inputs;
use strata_stack::{ChildInsert, Stack, StackError, StackResult, StackServices};
use tracing::instrument;

use crate::jenkins_on_docker::value;
use crate::refs::{AWS_EC2_SERVER, AWS_KEY_GEN_AND_UPLOAD, JENKINS_ON_DOCKER};

pub const NAME: &str = "jenkins_on_ec2";

/// Create an SSH key and an EC2 server, then install Jenkins on it.
#[instrument(name = "jenkins_on_ec2", skip_all)]
pub async fn run(services: StackServices, inputs: &Inputs) -> Result<StackResult, StackError> {
  let mut stack = Stack::new(NAME, services);

  stack.add_required("aws_default_region", Some(json!("us-east-1")), None)?;
  stack.add_required("hostname", None, None)?;
  stack.add_required("ssh_key_name", None, None)?;
  stack.add_optional("public_ip", None, None)?;
  stack.add_optional(
    "ansible_docker_image",
    Some(json!("config0/ansible-run-env")),
    None,
  )?;

  stack.add_substack(AWS_KEY_GEN_AND_UPLOAD)?;
  stack.add_substack(AWS_EC2_SERVER)?;
  stack.add_substack(JENKINS_ON_DOCKER)?;

  stack.init_variables(inputs).await?;
  stack.init_substacks().await?;

  let arguments = BTreeMap::from([
    ("ssh_key_name".to_string(), value(&stack, "ssh_key_name")?),
    (
      "aws_default_region".to_string(),
      value(&stack, "aws_default_region")?,
    ),
  ]);
  stack
    .insert(
      "aws_key_gen_and_upload",
      ChildInsert::new(arguments).with_human_description("Create ssh keys and upload to AWS"),
    )
    .await?;

  let arguments = BTreeMap::from([
    ("hostname".to_string(), value(&stack, "hostname")?),
    ("ssh_key_name".to_string(), value(&stack, "ssh_key_name")?),
    (
      "aws_default_region".to_string(),
      value(&stack, "aws_default_region")?,
    ),
  ]);
  stack
    .insert(
      "aws_ec2_server",
      ChildInsert::new(arguments).with_human_description("Create ec2 server"),
    )
    .await?;

  let mut arguments = BTreeMap::from([
    ("hostname".to_string(), value(&stack, "hostname")?),
    ("ssh_key_name".to_string(), value(&stack, "ssh_key_name")?),
    (
      "ansible_docker_image".to_string(),
      value(&stack, "ansible_docker_image")?,
    ),
  ]);
  if let Some(public_ip) = stack.get("public_ip") {
    arguments.insert("public_ip".to_string(), public_ip.clone());
  }
  stack
    .insert(
      "jenkins_on_docker",
      ChildInsert::new(arguments).with_human_description("Install and configure Jenkins"),
    )
    .await?;

  Ok(stack.get_results())
}
