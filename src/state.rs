//! Tool-agnostic view of an Infrastructure-as-Code state file.
//!
//! A state manager parses the on-disk format of one IaC tool and normalizes
//! it into [`StateContent`]; the rest of the pipeline only ever sees the
//! normalized form.

pub mod config;
pub mod terraform;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state file does not exist: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read state file {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{extension}' files are not currently supported")]
    UnsupportedFormat { extension: String },

    #[error("state directories are not currently supported: {path}")]
    UnsupportedTarget { path: PathBuf },

    #[error("failed to decode state JSON: {0}")]
    JsonDecode(#[from] serde_json::Error),

    #[error("failed to parse terraform configuration file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("no instance for resource")]
    NoInstance,

    #[error("'{attribute}' attribute value cannot be coerced to a string")]
    NonStringAttribute { attribute: String },

    #[error("unsupported state manager: {0}")]
    UnsupportedTool(String),
}

/// IaC tool that produced a state file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IaCTool {
    Terraform,
}

impl IaCTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            IaCTool::Terraform => "terraform",
        }
    }
}

/// Backend configuration recorded in the tool's configuration file.
///
/// Only `type = "local"` is interpreted by the ingestion path; other backend
/// types are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(rename = "type", default)]
    pub backend_type: String,
    #[serde(default)]
    pub config: ConfigDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDetails {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub encrypt: bool,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub dynamodb_table: String,
}

/// Parsed-once snapshot of an IaC state file, normalized across tools.
#[derive(Debug, Clone)]
pub struct StateContent {
    pub state_version: String,
    pub tool: IaCTool,
    pub tool_version: String,
    pub tool_metadata: serde_json::Map<String, serde_json::Value>,
    pub schema_version: String,
    /// Lineage identifier of the state.
    pub state_id: String,
    pub backend_config: BackendConfig,
    pub resources: Vec<StateResource>,
    /// Original state document, preserved verbatim for audit and replay.
    pub raw_state: Box<RawValue>,
}

/// One managed entity in the desired state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateResource {
    pub mode: String,
    #[serde(default)]
    pub module: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub provider: String,
    // NOTE: instance 0 is authoritative; other instances are carried but not
    // compared in this revision.
    #[serde(default)]
    pub instances: Vec<ResourceInstance>,
    #[serde(default)]
    pub tool_data: serde_json::Map<String, serde_json::Value>,
}

impl StateResource {
    pub fn resource_type(&self) -> &str {
        &self.type_
    }

    /// Canonical string value of an attribute on the authoritative instance.
    ///
    /// A missing attribute is an empty string, which the drift engine reads
    /// as "absent on this side". Scalars are coerced the same way the live
    /// side canonicalizes them; composite values are not coercible here.
    pub fn attribute_value(&self, attribute: &str) -> Result<String, StateError> {
        let instance = self.instances.first().ok_or(StateError::NoInstance)?;
        let Some(value) = instance.attributes.get(attribute) else {
            return Ok(String::new());
        };
        match value {
            serde_json::Value::Null => Ok(String::new()),
            serde_json::Value::String(s) => Ok(s.clone()),
            serde_json::Value::Bool(b) => Ok(b.to_string()),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            _ => Err(StateError::NonStringAttribute {
                attribute: attribute.to_string(),
            }),
        }
    }
}

/// One concrete materialization of a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceInstance {
    #[serde(default)]
    pub schema_version: i64,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Parses one IaC tool's state format into the normalized representation.
pub trait StateManager: Send + Sync {
    fn parse_state_file(&self, state_path: &Path) -> Result<StateContent, StateError>;

    /// Resources of the given type, in state-file order.
    fn resources_by_type(&self, content: &StateContent, resource_type: &str) -> Vec<StateResource>;
}

impl std::fmt::Debug for dyn StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager").finish()
    }
}

/// Selects the state manager implementation for a tool tag.
pub fn state_manager_for(tool: &str) -> Result<Box<dyn StateManager>, StateError> {
    match tool {
        "terraform" => Ok(Box::new(terraform::TerraformStateManager::new())),
        other => Err(StateError::UnsupportedTool(other.to_string())),
    }
}
