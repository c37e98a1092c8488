//! AWS implementation of the provider interface.
//!
//! The provider wraps one SDK client configured at construction time; the
//! client is safe for concurrent use, so the dispatch pipeline shares a
//! single provider across its worker pool.

pub mod attributes;
pub mod ec2;
pub mod profile;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ec2::Client;
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_ec2::types::{Filter, Instance};

use crate::providers::{LiveResource, Provider, ProviderError};
use crate::state::StateResource;

/// Connection settings resolved once, before the provider is constructed.
///
/// `endpoint_url` and `region` carry the `DRIFT_LOCALSTACK_URL` /
/// `DRIFT_LOCALSTACK_REGION` overrides used to point the SDK at an offline
/// test endpoint. They are read during construction, never at call time.
#[derive(Debug, Clone, Default)]
pub struct AwsSettings {
    pub profile: String,
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

pub struct AwsProvider {
    client: Client,
}

impl AwsProvider {
    pub async fn new(settings: AwsSettings) -> Result<Self, ProviderError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if !settings.profile.is_empty() {
            loader = loader.profile_name(&settings.profile);
        }
        if let Some(endpoint) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }

        let config = loader.load().await;
        if config.credentials_provider().is_none() {
            return Err(ProviderError::Auth(
                "no AWS credentials provider could be resolved".to_string(),
            ));
        }

        Ok(Self { client: Client::new(&config) })
    }

    /// Builds the provider around an already-configured client. Tests use
    /// this to point the SDK at a mock endpoint.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Describes the instance with the given id, expecting exactly one match.
    async fn describe_instance(&self, resource_id: &str) -> Result<Instance, ProviderError> {
        let filter = Filter::builder().name("instance-id").values(resource_id).build();

        let output = self
            .client
            .describe_instances()
            .filters(filter)
            .send()
            .await
            .map_err(|err| match err.meta().code() {
                Some("AuthFailure") | Some("UnauthorizedOperation") => {
                    ProviderError::Auth(DisplayErrorContext(&err).to_string())
                }
                _ => ProviderError::Api {
                    context: "failed to describe ec2 instance",
                    message: DisplayErrorContext(&err).to_string(),
                },
            })?;

        let reservations = output.reservations();
        if reservations.is_empty() {
            return Err(ProviderError::LiveNotFound { resource_id: resource_id.to_string() });
        }
        if reservations.len() > 1 {
            return Err(ProviderError::AmbiguousLiveMatch { resource_id: resource_id.to_string() });
        }

        match reservations[0].instances() {
            [] => Err(ProviderError::LiveNotFound { resource_id: resource_id.to_string() }),
            [instance] => Ok(instance.clone()),
            _ => Err(ProviderError::AmbiguousLiveMatch { resource_id: resource_id.to_string() }),
        }
    }
}

#[async_trait]
impl Provider for AwsProvider {
    fn name(&self) -> &str {
        "aws"
    }

    async fn infrastructure_metadata(
        &self,
        resource_type: &str,
        resource: &StateResource,
    ) -> Result<Box<dyn LiveResource>, ProviderError> {
        match resource_type {
            "aws_instance" => {
                let resource_id = resource.attribute_value("id")?;
                if resource_id.is_empty() {
                    return Err(ProviderError::MissingResourceId {
                        resource_type: resource_type.to_string(),
                        name: resource.name.clone(),
                    });
                }

                let instance = self.describe_instance(&resource_id).await?;
                Ok(Box::new(ec2::Ec2LiveResource::new(instance)))
            }
            other => {
                Err(ProviderError::UnsupportedResource { resource_type: other.to_string() })
            }
        }
    }
}
