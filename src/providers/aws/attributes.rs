//! Attribute names recognized on AWS resources.
//!
//! The names follow the terraform `aws_instance` schema so that tracked
//! attributes read the same on both sides of a comparison.

// Core instance configuration
pub const AMI: &str = "ami";
pub const INSTANCE_TYPE: &str = "instance_type";
pub const INSTANCE_ID: &str = "instance_id";
pub const KEY_NAME: &str = "key_name";
pub const AVAILABILITY_ZONE: &str = "availability_zone";
pub const TENANCY: &str = "tenancy";
pub const MONITORING: &str = "monitoring";
pub const CPU_CORE_COUNT: &str = "cpu_core_count";
pub const CPU_THREADS_PER_CORE: &str = "cpu_thread_per_core";
pub const EBS_OPTIMIZED: &str = "ebs_optimized";

// Networking & security
pub const SECURITY_GROUP_IDS: &str = "security_group_ids";
pub const SUBNET_ID: &str = "subnet_id";
pub const ASSOCIATE_PUBLIC_IP_ADDRESS: &str = "associate_public_ip_address";
pub const PRIVATE_IP: &str = "private_ip";
pub const PRIVATE_DNS_NAME: &str = "private_dns_name";
pub const PUBLIC_IP: &str = "public_ip";
pub const PUBLIC_DNS_NAME: &str = "public_dns_name";
pub const SOURCE_DEST_CHECK: &str = "source_dest_check";
pub const IAM_INSTANCE_ID: &str = "iam_instance_id";
pub const IAM_INSTANCE_ARN: &str = "iam_instance_arn";

// Storage. The top-level block device attributes answer as JSON-encoded
// objects; the sub-keys below are part of the recognized vocabulary for
// callers that track nested fields.
pub const ROOT_BLOCK_DEVICE: &str = "root_block_device";
pub const EBS_BLOCK_DEVICE: &str = "ebs_block_device";
pub const BLOCK_DEVICE_NAME: &str = "block_device_name";
pub const VOLUME_ID: &str = "volume_id";
pub const VOLUME_SIZE: &str = "volume_size";
pub const VOLUME_TYPE: &str = "volume_type";
pub const VOLUME_ENCRYPTED: &str = "encrypted";
pub const DELETE_ON_TERMINATION: &str = "delete_on_termination";

// Metadata & user data
pub const METADATA_OPTIONS: &str = "metadata_options";
pub const USER_DATA: &str = "user_data";
pub const USER_DATA_BASE64: &str = "user_data_base64";

// State
pub const INSTANCE_STATE: &str = "instance_state";

/// Prefix for the `tags.<Key>` pseudo-attribute.
pub const TAG_PREFIX: &str = "tags.";

/// Security-group resource attributes. Recognized as names so that asking
/// for one on an instance resource yields a precise unsupported-attribute
/// error rather than a generic one.
pub const SECURITY_GROUP_ONLY: &[&str] = &["description", "egress", "ingress", "name", "vpc_id"];
