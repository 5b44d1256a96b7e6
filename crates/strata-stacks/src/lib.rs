//! Built-in stack compositions.
//!
//! - `jenkins_on_docker`: installs Jenkins with Docker on an existing server
//!   and publishes its admin password.
//! - `jenkins_on_ec2`: creates an SSH key and an EC2 server, then runs
//!   `jenkins_on_docker` against it.
//!
//! Both are written directly against [`strata_stack::Stack`].

mod builtin;
mod jenkins_on_docker;
mod jenkins_on_ec2;
mod refs;

pub use builtin::{Builtin, builtin, builtin_registry, builtins};
pub use refs::{
  AWS_EC2_SERVER, AWS_KEY_GEN_AND_UPLOAD, GET_CONTENTS_HOST_FILE, JENKINS_ON_DOCKER,
  JENKINS_WITH_DOCKER,
};
