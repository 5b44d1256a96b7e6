#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use strata_catalog::{InMemoryCatalog, LabelSelector, ResourceKind, ResourceRecord};
use strata_executor::RecordingExecutor;
use strata_registry::{ChildKind, InMemoryRegistry};
use strata_stack::StackServices;

pub const KEY_GEN: &str = "williaumwu:::aws_key_gen_and_upload";
pub const EC2_SERVER: &str = "williaumwu:::aws_ec2_server";
pub const JENKINS_ON_DOCKER: &str = "williaumwu:::jenkins_on_docker";
pub const JENKINS_WITH_DOCKER: &str = "williaumwu:::demo1-jenkins::jenkins_with_docker";
pub const HOST_FILE: &str = "config0-publish:::config0_core::get_contents_host_file";

pub fn registry() -> InMemoryRegistry {
  InMemoryRegistry::default()
    .with_reference(KEY_GEN, ChildKind::Substack)
    .unwrap()
    .with_reference(EC2_SERVER, ChildKind::Substack)
    .unwrap()
    .with_reference(JENKINS_ON_DOCKER, ChildKind::Substack)
    .unwrap()
    .with_reference(JENKINS_WITH_DOCKER, ChildKind::Execgroup)
    .unwrap()
    .with_reference(HOST_FILE, ChildKind::Substack)
    .unwrap()
}

pub fn server(name: &str, ip: &str) -> ResourceRecord {
  ResourceRecord::new(ResourceKind::Server, name)
    .with_label(LabelSelector::project_default())
    .with_attribute("public_ip", ip)
}

pub fn key_pair(name: &str, private_key: &str) -> ResourceRecord {
  ResourceRecord::new(ResourceKind::SshKeyPair, name)
    .with_label(LabelSelector::project_default())
    .with_attribute("private_key_base64", private_key)
}

pub fn services(records: Vec<ResourceRecord>, executor: Arc<RecordingExecutor>) -> StackServices {
  StackServices::new(
    Arc::new(InMemoryCatalog::new(records)),
    executor,
    Arc::new(registry()),
  )
}

pub fn map(value: Value) -> BTreeMap<String, Value> {
  serde_json::from_value(value).unwrap()
}
