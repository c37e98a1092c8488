//! Live view of an EC2 instance.
//!
//! Every attribute answer is a single canonical string so that the drift
//! engine can compare it against the state-file side: strings as-is,
//! booleans lowercase, integers base-10, enumerations their lowercase member
//! names, composites JSON-encoded. An absent attribute answers with the
//! empty string, which the engine reads as "missing in infrastructure".

use aws_sdk_ec2::types::{EbsInstanceBlockDevice, Instance, InstanceBlockDeviceMapping};

use crate::providers::aws::attributes;
use crate::providers::{LiveResource, ProviderError};

/// Common root device names across Linux AMIs.
const ROOT_DEVICE_NAMES: &[&str] = &["/dev/sda1", "/dev/xvda"];

pub struct Ec2LiveResource {
    instance: Instance,
}

impl Ec2LiveResource {
    pub fn new(instance: Instance) -> Self {
        Self { instance }
    }

    fn tag_value(&self, tag_name: &str) -> String {
        self.instance
            .tags()
            .iter()
            .find(|tag| tag.key() == Some(tag_name))
            .and_then(|tag| tag.value())
            .unwrap_or_default()
            .to_string()
    }

    fn is_root_mapping(mapping: &InstanceBlockDeviceMapping) -> bool {
        mapping
            .device_name()
            .is_some_and(|name| ROOT_DEVICE_NAMES.contains(&name))
    }

    fn root_block_device(&self) -> Result<String, ProviderError> {
        for mapping in self.instance.block_device_mappings() {
            if !Self::is_root_mapping(mapping) {
                continue;
            }
            return match mapping.ebs() {
                Some(ebs) => encode_json(&ebs_device_json(ebs), "failed to encode root_block_device"),
                None => Ok(String::new()),
            };
        }
        Ok(String::new())
    }

    fn ebs_block_devices(&self) -> Result<String, ProviderError> {
        let devices: Vec<serde_json::Value> = self
            .instance
            .block_device_mappings()
            .iter()
            .filter(|mapping| !Self::is_root_mapping(mapping))
            .filter_map(|mapping| {
                mapping.ebs().map(|ebs| {
                    let mut object = ebs_device_json(ebs);
                    if let (Some(name), serde_json::Value::Object(fields)) =
                        (mapping.device_name(), &mut object)
                    {
                        fields.insert("device_name".to_string(), name.into());
                    }
                    object
                })
            })
            .collect();

        if devices.is_empty() {
            return Ok(String::new());
        }
        encode_json(&serde_json::Value::Array(devices), "failed to encode ebs_block_device")
    }

    fn metadata_options(&self) -> Result<String, ProviderError> {
        let Some(options) = self.instance.metadata_options() else {
            return Ok(String::new());
        };

        let mut fields = serde_json::Map::new();
        if let Some(endpoint) = options.http_endpoint() {
            fields.insert("http_endpoint".to_string(), endpoint.as_str().into());
        }
        if let Some(tokens) = options.http_tokens() {
            fields.insert("http_tokens".to_string(), tokens.as_str().into());
        }
        if let Some(hop_limit) = options.http_put_response_hop_limit() {
            fields.insert("http_put_response_hop_limit".to_string(), hop_limit.into());
        }
        encode_json(&serde_json::Value::Object(fields), "failed to encode metadata_options")
    }
}

fn ebs_device_json(ebs: &EbsInstanceBlockDevice) -> serde_json::Value {
    let mut fields = serde_json::Map::new();
    if let Some(flag) = ebs.delete_on_termination() {
        fields.insert("delete_on_termination".to_string(), flag.into());
    }
    if let Some(status) = ebs.status() {
        fields.insert("status".to_string(), status.as_str().into());
    }
    if let Some(volume_id) = ebs.volume_id() {
        fields.insert("volume_id".to_string(), volume_id.into());
    }
    serde_json::Value::Object(fields)
}

fn encode_json(value: &serde_json::Value, context: &'static str) -> Result<String, ProviderError> {
    serde_json::to_string(value)
        .map_err(|err| ProviderError::Api { context, message: err.to_string() })
}

impl LiveResource for Ec2LiveResource {
    fn resource_type(&self) -> &str {
        "aws_instance"
    }

    fn attribute_value(&self, attribute: &str) -> Result<String, ProviderError> {
        let instance = &self.instance;
        match attribute {
            // Core instance configuration
            attributes::AMI => Ok(instance.image_id().unwrap_or_default().to_string()),
            attributes::INSTANCE_TYPE => Ok(instance
                .instance_type()
                .map(|instance_type| instance_type.as_str().to_string())
                .unwrap_or_default()),
            attributes::INSTANCE_ID => Ok(instance.instance_id().unwrap_or_default().to_string()),
            attributes::KEY_NAME => Ok(instance.key_name().unwrap_or_default().to_string()),
            attributes::AVAILABILITY_ZONE => Ok(instance
                .placement()
                .and_then(|placement| placement.availability_zone())
                .unwrap_or_default()
                .to_string()),
            attributes::TENANCY => Ok(instance
                .placement()
                .and_then(|placement| placement.tenancy())
                .map(|tenancy| tenancy.as_str().to_string())
                .unwrap_or_default()),
            attributes::MONITORING => Ok(instance
                .monitoring()
                .and_then(|monitoring| monitoring.state())
                .map(|state| (state.as_str() == "enabled").to_string())
                .unwrap_or_else(|| "false".to_string())),
            attributes::CPU_CORE_COUNT => Ok(instance
                .cpu_options()
                .and_then(|options| options.core_count())
                .unwrap_or(0)
                .to_string()),
            attributes::CPU_THREADS_PER_CORE => Ok(instance
                .cpu_options()
                .and_then(|options| options.threads_per_core())
                .unwrap_or(0)
                .to_string()),
            attributes::EBS_OPTIMIZED => {
                Ok(instance.ebs_optimized().unwrap_or(false).to_string())
            }

            // Networking & security
            attributes::SECURITY_GROUP_IDS => Ok(instance
                .security_groups()
                .iter()
                .filter_map(|group| group.group_id())
                .collect::<Vec<_>>()
                .join(",")),
            attributes::SUBNET_ID => Ok(instance.subnet_id().unwrap_or_default().to_string()),
            attributes::ASSOCIATE_PUBLIC_IP_ADDRESS => {
                // The association lives on the primary network interface.
                let associated = instance
                    .network_interfaces()
                    .first()
                    .and_then(|interface| interface.association())
                    .is_some_and(|association| association.public_ip().is_some());
                Ok(associated.to_string())
            }
            attributes::PRIVATE_IP => {
                Ok(instance.private_ip_address().unwrap_or_default().to_string())
            }
            attributes::PRIVATE_DNS_NAME => {
                Ok(instance.private_dns_name().unwrap_or_default().to_string())
            }
            attributes::PUBLIC_IP => {
                Ok(instance.public_ip_address().unwrap_or_default().to_string())
            }
            attributes::PUBLIC_DNS_NAME => {
                Ok(instance.public_dns_name().unwrap_or_default().to_string())
            }
            attributes::SOURCE_DEST_CHECK => Ok(instance
                .network_interfaces()
                .first()
                .and_then(|interface| interface.source_dest_check())
                // AWS default when unspecified.
                .unwrap_or(true)
                .to_string()),
            attributes::IAM_INSTANCE_ID => Ok(instance
                .iam_instance_profile()
                .and_then(|profile| profile.id())
                .unwrap_or_default()
                .to_string()),
            attributes::IAM_INSTANCE_ARN => Ok(instance
                .iam_instance_profile()
                .and_then(|profile| profile.arn())
                .unwrap_or_default()
                .to_string()),

            // Storage
            attributes::ROOT_BLOCK_DEVICE => self.root_block_device(),
            attributes::EBS_BLOCK_DEVICE => self.ebs_block_devices(),

            // Metadata & user data
            attributes::METADATA_OPTIONS => self.metadata_options(),
            // DescribeInstances does not carry user data; answering with an
            // error makes the engine skip the attribute instead of reporting
            // spurious drift.
            attributes::USER_DATA | attributes::USER_DATA_BASE64 => {
                Err(ProviderError::AttributeNotSupported {
                    attribute: attribute.to_string(),
                    resource_type: "aws_instance",
                })
            }

            // State
            attributes::INSTANCE_STATE => Ok(instance
                .state()
                .and_then(|state| state.name())
                .map(|name| name.as_str().to_string())
                .unwrap_or_default()),

            other => {
                if let Some(tag_name) = other.strip_prefix(attributes::TAG_PREFIX) {
                    return Ok(self.tag_value(tag_name));
                }
                // Covers security-group resource attributes and any name we
                // do not recognize on an instance.
                Err(ProviderError::AttributeNotSupported {
                    attribute: other.to_string(),
                    resource_type: "aws_instance",
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ec2::types::{
        AttachmentStatus, CpuOptions, GroupIdentifier, HttpTokensState, IamInstanceProfile,
        InstanceMetadataEndpointState, InstanceMetadataOptionsResponse, InstanceNetworkInterface,
        InstanceNetworkInterfaceAssociation, InstanceState, InstanceStateName, InstanceType,
        Monitoring, MonitoringState, Placement, Tag, Tenancy,
    };

    fn full_instance() -> Instance {
        Instance::builder()
            .instance_id("i-0123456789abcdef0")
            .image_id("ami-0abcdef1234567890")
            .instance_type(InstanceType::from("t2.micro"))
            .key_name("deploy-key")
            .subnet_id("subnet-0a1b2c3d")
            .private_ip_address("10.0.1.5")
            .private_dns_name("ip-10-0-1-5.ec2.internal")
            .public_ip_address("54.210.1.2")
            .public_dns_name("ec2-54-210-1-2.compute-1.amazonaws.com")
            .ebs_optimized(false)
            .placement(
                Placement::builder()
                    .availability_zone("us-east-1a")
                    .tenancy(Tenancy::from("default"))
                    .build(),
            )
            .cpu_options(CpuOptions::builder().core_count(2).threads_per_core(1).build())
            .monitoring(Monitoring::builder().state(MonitoringState::from("enabled")).build())
            .security_groups(
                GroupIdentifier::builder().group_id("sg-11111111").group_name("web").build(),
            )
            .security_groups(GroupIdentifier::builder().group_id("sg-22222222").build())
            .network_interfaces(
                InstanceNetworkInterface::builder()
                    .source_dest_check(false)
                    .association(
                        InstanceNetworkInterfaceAssociation::builder()
                            .public_ip("54.210.1.2")
                            .build(),
                    )
                    .build(),
            )
            .iam_instance_profile(
                IamInstanceProfile::builder()
                    .id("AIPAJEXAMPLE")
                    .arn("arn:aws:iam::123456789012:instance-profile/web")
                    .build(),
            )
            .block_device_mappings(
                InstanceBlockDeviceMapping::builder()
                    .device_name("/dev/xvda")
                    .ebs(
                        EbsInstanceBlockDevice::builder()
                            .volume_id("vol-root")
                            .delete_on_termination(true)
                            .status(AttachmentStatus::from("attached"))
                            .build(),
                    )
                    .build(),
            )
            .block_device_mappings(
                InstanceBlockDeviceMapping::builder()
                    .device_name("/dev/sdf")
                    .ebs(
                        EbsInstanceBlockDevice::builder()
                            .volume_id("vol-data")
                            .delete_on_termination(false)
                            .build(),
                    )
                    .build(),
            )
            .metadata_options(
                InstanceMetadataOptionsResponse::builder()
                    .http_endpoint(InstanceMetadataEndpointState::from("enabled"))
                    .http_tokens(HttpTokensState::from("required"))
                    .http_put_response_hop_limit(1)
                    .build(),
            )
            .state(InstanceState::builder().name(InstanceStateName::from("running")).build())
            .tags(Tag::builder().key("Name").value("web").build())
            .tags(Tag::builder().key("Environment").value("prod").build())
            .build()
    }

    fn value(live: &Ec2LiveResource, attribute: &str) -> String {
        live.attribute_value(attribute).unwrap()
    }

    #[test]
    fn test_resource_type() {
        let live = Ec2LiveResource::new(full_instance());
        assert_eq!(live.resource_type(), "aws_instance");
    }

    #[test]
    fn test_core_attributes() {
        let live = Ec2LiveResource::new(full_instance());
        assert_eq!(value(&live, "ami"), "ami-0abcdef1234567890");
        assert_eq!(value(&live, "instance_type"), "t2.micro");
        assert_eq!(value(&live, "instance_id"), "i-0123456789abcdef0");
        assert_eq!(value(&live, "key_name"), "deploy-key");
        assert_eq!(value(&live, "availability_zone"), "us-east-1a");
        assert_eq!(value(&live, "tenancy"), "default");
        assert_eq!(value(&live, "monitoring"), "true");
        assert_eq!(value(&live, "cpu_core_count"), "2");
        assert_eq!(value(&live, "cpu_thread_per_core"), "1");
        assert_eq!(value(&live, "ebs_optimized"), "false");
    }

    #[test]
    fn test_networking_attributes() {
        let live = Ec2LiveResource::new(full_instance());
        assert_eq!(value(&live, "security_group_ids"), "sg-11111111,sg-22222222");
        assert_eq!(value(&live, "subnet_id"), "subnet-0a1b2c3d");
        assert_eq!(value(&live, "associate_public_ip_address"), "true");
        assert_eq!(value(&live, "private_ip"), "10.0.1.5");
        assert_eq!(value(&live, "private_dns_name"), "ip-10-0-1-5.ec2.internal");
        assert_eq!(value(&live, "public_ip"), "54.210.1.2");
        assert_eq!(value(&live, "public_dns_name"), "ec2-54-210-1-2.compute-1.amazonaws.com");
        assert_eq!(value(&live, "source_dest_check"), "false");
        assert_eq!(value(&live, "iam_instance_id"), "AIPAJEXAMPLE");
        assert_eq!(
            value(&live, "iam_instance_arn"),
            "arn:aws:iam::123456789012:instance-profile/web"
        );
    }

    #[test]
    fn test_root_block_device_json() {
        let live = Ec2LiveResource::new(full_instance());
        assert_eq!(
            value(&live, "root_block_device"),
            r#"{"delete_on_termination":true,"status":"attached","volume_id":"vol-root"}"#
        );
    }

    #[test]
    fn test_ebs_block_device_excludes_root() {
        let live = Ec2LiveResource::new(full_instance());
        assert_eq!(
            value(&live, "ebs_block_device"),
            r#"[{"delete_on_termination":false,"device_name":"/dev/sdf","volume_id":"vol-data"}]"#
        );
    }

    #[test]
    fn test_metadata_options_json() {
        let live = Ec2LiveResource::new(full_instance());
        assert_eq!(
            value(&live, "metadata_options"),
            r#"{"http_endpoint":"enabled","http_put_response_hop_limit":1,"http_tokens":"required"}"#
        );
    }

    #[test]
    fn test_instance_state_lowercase() {
        let live = Ec2LiveResource::new(full_instance());
        assert_eq!(value(&live, "instance_state"), "running");
    }

    #[test]
    fn test_tag_pseudo_attribute() {
        let live = Ec2LiveResource::new(full_instance());
        assert_eq!(value(&live, "tags.Name"), "web");
        assert_eq!(value(&live, "tags.Environment"), "prod");
        // An absent tag answers empty so the engine can classify it as
        // missing rather than failing the lookup.
        assert_eq!(value(&live, "tags.Team"), "");
    }

    #[test]
    fn test_defaults_on_bare_instance() {
        let live = Ec2LiveResource::new(Instance::builder().build());
        assert_eq!(value(&live, "ami"), "");
        assert_eq!(value(&live, "instance_type"), "");
        assert_eq!(value(&live, "availability_zone"), "");
        assert_eq!(value(&live, "tenancy"), "");
        assert_eq!(value(&live, "monitoring"), "false");
        assert_eq!(value(&live, "cpu_core_count"), "0");
        assert_eq!(value(&live, "cpu_thread_per_core"), "0");
        assert_eq!(value(&live, "ebs_optimized"), "false");
        assert_eq!(value(&live, "security_group_ids"), "");
        assert_eq!(value(&live, "associate_public_ip_address"), "false");
        assert_eq!(value(&live, "source_dest_check"), "true");
        assert_eq!(value(&live, "root_block_device"), "");
        assert_eq!(value(&live, "ebs_block_device"), "");
        assert_eq!(value(&live, "metadata_options"), "");
        assert_eq!(value(&live, "instance_state"), "");
    }

    #[test]
    fn test_root_mapping_without_ebs_is_empty() {
        let instance = Instance::builder()
            .block_device_mappings(
                InstanceBlockDeviceMapping::builder().device_name("/dev/sda1").build(),
            )
            .build();
        let live = Ec2LiveResource::new(instance);
        assert_eq!(value(&live, "root_block_device"), "");
    }

    #[test]
    fn test_security_group_attributes_unsupported_on_instance() {
        let live = Ec2LiveResource::new(full_instance());
        for attribute in attributes::SECURITY_GROUP_ONLY {
            let err = live.attribute_value(attribute).unwrap_err();
            assert!(
                matches!(err, ProviderError::AttributeNotSupported { .. }),
                "expected AttributeNotSupported for {attribute}"
            );
        }
    }

    #[test]
    fn test_user_data_unsupported() {
        let live = Ec2LiveResource::new(full_instance());
        assert!(live.attribute_value("user_data").is_err());
        assert!(live.attribute_value("user_data_base64").is_err());
    }

    #[test]
    fn test_unknown_attribute_unsupported() {
        let live = Ec2LiveResource::new(full_instance());
        let err = live.attribute_value("flux_capacitor").unwrap_err();
        assert!(err.to_string().contains("flux_capacitor"));
    }

    #[test]
    fn test_attribute_values_are_deterministic() {
        let live = Ec2LiveResource::new(full_instance());
        for attribute in [
            "ami",
            "instance_type",
            "security_group_ids",
            "root_block_device",
            "ebs_block_device",
            "metadata_options",
            "tags.Name",
        ] {
            assert_eq!(
                live.attribute_value(attribute).unwrap(),
                live.attribute_value(attribute).unwrap(),
                "two lookups of {attribute} disagreed"
            );
        }
    }
}
