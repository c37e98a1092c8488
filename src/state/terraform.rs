//! Terraform implementation of the state manager.
//!
//! Parses `.tfstate` documents (schema v4 is the tested target) and converts
//! them to the normalized [`StateContent`] form. A `.tf` configuration path is
//! first resolved to its backing state file through the backend block.

use std::path::Path;

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::state::{
    BackendConfig, IaCTool, ResourceInstance, StateContent, StateError, StateManager,
    StateResource, config,
};

/// Root structure of a `.tfstate` document. Unknown keys are tolerated; the
/// full document is preserved in [`StateContent::raw_state`] regardless.
#[derive(Debug, Deserialize)]
pub struct TerraformState {
    pub version: i64,
    #[serde(default)]
    pub terraform_version: String,
    #[serde(default)]
    pub serial: i64,
    #[serde(default)]
    pub lineage: String,
    #[serde(default)]
    pub resources: Vec<TerraformResource>,
}

#[derive(Debug, Deserialize)]
pub struct TerraformResource {
    #[serde(default)]
    pub mode: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub instances: Vec<TerraformInstance>,
    #[serde(default)]
    pub each: Option<String>,
    #[serde(default)]
    pub module: String,
}

#[derive(Debug, Deserialize)]
pub struct TerraformInstance {
    #[serde(default)]
    pub schema_version: i64,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Default)]
pub struct TerraformStateManager;

impl TerraformStateManager {
    pub fn new() -> Self {
        Self
    }
}

fn ensure_regular_file(path: &Path) -> Result<(), StateError> {
    let metadata = std::fs::metadata(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            StateError::FileNotFound { path: path.to_path_buf() }
        } else {
            StateError::FileRead { path: path.to_path_buf(), source: err }
        }
    })?;
    if metadata.is_dir() {
        return Err(StateError::UnsupportedTarget { path: path.to_path_buf() });
    }
    Ok(())
}

impl StateManager for TerraformStateManager {
    fn parse_state_file(&self, state_path: &Path) -> Result<StateContent, StateError> {
        ensure_regular_file(state_path)?;

        let extension = state_path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (state_path, backend) = match extension.as_str() {
            "tf" => {
                let resolved = config::state_file_from_config(state_path)?;
                (resolved.path, resolved.backend)
            }
            "tfstate" => (state_path.to_path_buf(), BackendConfig::default()),
            other => {
                return Err(StateError::UnsupportedFormat { extension: other.to_string() });
            }
        };

        ensure_regular_file(&state_path)?;

        let raw = std::fs::read_to_string(&state_path)
            .map_err(|err| StateError::FileRead { path: state_path.clone(), source: err })?;

        let decoded: TerraformState = serde_json::from_str(&raw)?;
        normalize(decoded, raw, backend)
    }

    fn resources_by_type(&self, content: &StateContent, resource_type: &str) -> Vec<StateResource> {
        content
            .resources
            .iter()
            .filter(|resource| resource.type_ == resource_type)
            .cloned()
            .collect()
    }
}

/// Converts the decoded terraform document into the tool-agnostic form.
fn normalize(
    decoded: TerraformState,
    raw: String,
    backend: BackendConfig,
) -> Result<StateContent, StateError> {
    let mut tool_metadata = serde_json::Map::new();
    tool_metadata.insert("serial".to_string(), decoded.serial.into());

    let resources = decoded
        .resources
        .into_iter()
        .map(|resource| {
            let mut tool_data = serde_json::Map::new();
            if let Some(each) = resource.each {
                tool_data.insert("each_mode".to_string(), each.into());
            }
            StateResource {
                mode: resource.mode,
                module: resource.module,
                name: resource.name,
                type_: resource.type_,
                provider: resource.provider,
                instances: resource
                    .instances
                    .into_iter()
                    .map(|instance| ResourceInstance {
                        schema_version: instance.schema_version,
                        attributes: instance.attributes,
                        dependencies: instance.dependencies,
                    })
                    .collect(),
                tool_data,
            }
        })
        .collect();

    Ok(StateContent {
        state_version: decoded.version.to_string(),
        tool: IaCTool::Terraform,
        tool_version: decoded.terraform_version,
        tool_metadata,
        schema_version: decoded.version.to_string(),
        state_id: decoded.lineage,
        backend_config: backend,
        resources,
        raw_state: RawValue::from_string(raw)?,
    })
}
