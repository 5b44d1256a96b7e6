use std::collections::BTreeMap;

use serde_json::{Value, json};
use strata_catalog::{LabelSelector, ResolutionError, ResourceKind, ResourceQuery};
use strata_schema::{
  Fallback, Inputs, LookupTemplate, SchemaError, TypeHint, VariableDeclaration, b64_encode,
};
use strata_stack::{ChildInsert, Stack, StackError, StackResult, StackServices};
use tracing::{debug, instrument};

use crate::refs::{GET_CONTENTS_HOST_FILE, JENKINS_WITH_DOCKER};

pub const NAME: &str = "jenkins_on_docker";

const ANSIBLE_DIR: &str = "var/tmp/ansible";
const PLAYBOOK: &str = "install.yml";
const ADMIN_PASSWORD_FILE: &str = "/var/lib/jenkins/secrets/initialAdminPassword";
const STATEFUL_ID_SIZE: usize = 10;

pub(crate) fn value(stack: &Stack, name: &str) -> Result<Value, StackError> {
  stack.get(name).cloned().ok_or_else(|| {
    SchemaError::MissingRequiredVariable {
      name: name.to_string(),
    }
    .into()
  })
}

fn declare(stack: &mut Stack) -> Result<(), StackError> {
  stack.add_required("hostname", None, None)?;
  stack.add_required("ssh_key_name", None, None)?;
  stack.declare(
    VariableDeclaration::required("public_ip").with_fallback(Fallback::Lookup(
      LookupTemplate::new(
        "{{ resource_type_hostname }}",
        LabelSelector::project_default(),
        "public_ip",
      )
      .named("{{ hostname }}"),
    )),
  )?;

  // Docker image used to run the ansible playbooks
  stack.add_optional(
    "ansible_docker_image",
    Some(json!("config0/ansible-run-env")),
    None,
  )?;
  stack.add_optional(
    "resource_type_ssh_key",
    Some(json!("ssh_key_pair")),
    Some(TypeHint::Str),
  )?;
  stack.add_optional(
    "resource_type_hostname",
    Some(json!("server")),
    Some(TypeHint::Str),
  )?;

  stack.add_execgroup(JENKINS_WITH_DOCKER)?;
  stack.add_substack(GET_CONTENTS_HOST_FILE)?;
  Ok(())
}

async fn private_key(stack: &Stack) -> Result<Value, StackError> {
  let kind = stack
    .get_str("resource_type_ssh_key")
    .unwrap_or("ssh_key_pair")
    .parse::<ResourceKind>()
    .map_err(ResolutionError::from)?;
  let Value::String(key_name) = value(stack, "ssh_key_name")? else {
    return Err(
      SchemaError::InvalidVariableType {
        name: "ssh_key_name".to_string(),
        expected: TypeHint::Str,
        actual: "non-string".to_string(),
      }
      .into(),
    );
  };

  let query = ResourceQuery::new(kind, LabelSelector::project_default())
    .named(key_name)
    .must_be_one();
  stack.lookup_attribute(&query, "private_key_base64").await
}

/// Install Jenkins on a server and publish its admin password.
#[instrument(name = "jenkins_on_docker", skip_all)]
pub async fn run(services: StackServices, inputs: &Inputs) -> Result<StackResult, StackError> {
  let mut stack = Stack::new(NAME, services);
  declare(&mut stack)?;

  stack.init_variables(inputs).await?;
  stack.init_execgroups().await?;
  stack.init_substacks().await?;

  let key = private_key(&stack).await?;
  stack.set_variable("private_key_base64", key)?;

  let public_ip = value(&stack, "public_ip")?;
  let private_key = value(&stack, "private_key_base64")?;
  let hosts = json!({ "all": [public_ip.clone()] }).to_string();
  debug!(hosts_entries = 1, "ansible hosts file prepared");

  let stateful_id = stack.random_id(STATEFUL_ID_SIZE)?;
  let env_vars = BTreeMap::from([
    ("STATEFUL_ID".to_string(), json!(stateful_id)),
    (
      "DOCKER_IMAGE".to_string(),
      value(&stack, "ansible_docker_image")?,
    ),
    ("ANSIBLE_DIR".to_string(), json!(ANSIBLE_DIR)),
    ("ANS_VAR_private_key".to_string(), private_key.clone()),
    ("ANS_VAR_hosts".to_string(), json!(b64_encode(&hosts))),
    ("ANS_VAR_exec_ymls".to_string(), json!(PLAYBOOK)),
  ]);
  let arguments = BTreeMap::from([("hostname".to_string(), value(&stack, "hostname")?)]);

  stack
    .insert(
      "jenkins_with_docker",
      ChildInsert::new(arguments)
        .with_env_vars(env_vars)
        .with_stateful_id(&stateful_id)
        .with_human_description("Install Jenkins for Ansible"),
    )
    .await?;

  let jenkins_url = match &public_ip {
    Value::String(ip) => format!("https://{ip}"),
    other => format!("https://{other}"),
  };
  stack.output_to_ui([
    ("hostname", value(&stack, "hostname")?),
    ("jenkins_ipaddress", public_ip.clone()),
    ("jenkins_url", json!(jenkins_url)),
    ("jenkins_user", json!("admin")),
  ]);

  // Fetch the admin password from the server and publish it
  let arguments = BTreeMap::from([
    ("remote_file".to_string(), json!(ADMIN_PASSWORD_FILE)),
    ("key".to_string(), json!("jenkins_password")),
    ("ipaddress".to_string(), public_ip),
    ("private_key_hash".to_string(), private_key),
  ]);
  stack
    .insert(
      "get_contents_host_file",
      ChildInsert::new(arguments).with_human_description("Publish jenkins admin init password"),
    )
    .await?;

  Ok(stack.get_results())
}
