//! Provider abstraction over live cloud control planes.
//!
//! A [`Provider`] resolves a state resource to its live counterpart; the
//! returned [`LiveResource`] answers attribute queries in canonical string
//! form so the drift engine can compare the two sides without knowing
//! anything provider-specific.

pub mod aws;

use async_trait::async_trait;
use thiserror::Error;

use crate::state::{StateError, StateResource};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("{resource_type} resource not yet supported")]
    UnsupportedResource { resource_type: String },

    #[error("resource id not parsed from state file for {resource_type}.{name}")]
    MissingResourceId { resource_type: String, name: String },

    #[error("no live resource matches id '{resource_id}'")]
    LiveNotFound { resource_id: String },

    #[error("multiple live resources match id '{resource_id}'")]
    AmbiguousLiveMatch { resource_id: String },

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("{context}: {message}")]
    Api { context: &'static str, message: String },

    #[error("'{attribute}' attribute is not supported for {resource_type} resources or is an invalid attribute name")]
    AttributeNotSupported { attribute: String, resource_type: &'static str },

    #[error(transparent)]
    State(#[from] StateError),
}

/// Live view of one provisioned resource.
///
/// Attribute answers are canonical strings: booleans lowercase, integers
/// base-10, enumerations lowercase member names, composites JSON-encoded. An
/// empty string means the attribute is absent on the live side.
pub trait LiveResource: Send + Sync {
    fn resource_type(&self) -> &str;
    fn attribute_value(&self, attribute: &str) -> Result<String, ProviderError>;
}

impl std::fmt::Debug for dyn LiveResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveResource")
            .field("resource_type", &self.resource_type())
            .finish()
    }
}

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches the live counterpart of a state resource, dispatching on the
    /// resource type.
    async fn infrastructure_metadata(
        &self,
        resource_type: &str,
        resource: &StateResource,
    ) -> Result<Box<dyn LiveResource>, ProviderError>;
}

/// Selects the provider implementation for a provider tag.
pub async fn provider_for(
    name: &str,
    settings: aws::AwsSettings,
) -> Result<Box<dyn Provider>, ProviderError> {
    match name {
        "aws" => Ok(Box::new(aws::AwsProvider::new(settings).await?)),
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}
