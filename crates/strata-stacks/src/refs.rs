/// Execgroup installing Jenkins in Docker through Ansible.
pub const JENKINS_WITH_DOCKER: &str = "williaumwu:::demo1-jenkins::jenkins_with_docker";

/// Substack reading a file from a host over SSH and publishing it.
pub const GET_CONTENTS_HOST_FILE: &str = "config0-publish:::config0_core::get_contents_host_file";

pub const AWS_KEY_GEN_AND_UPLOAD: &str = "williaumwu:::aws_key_gen_and_upload";
pub const AWS_EC2_SERVER: &str = "williaumwu:::aws_ec2_server";
pub const JENKINS_ON_DOCKER: &str = "williaumwu:::jenkins_on_docker";
