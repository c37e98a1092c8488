//! Resolution of a terraform configuration file to its backing state file.
//!
//! Only the `terraform { backend "local" { path = ... } }` block is
//! interpreted. Other backend types are recognized syntactically and skipped;
//! when no local backend is present the sibling `terraform.tfstate` is tried.

use std::path::{Path, PathBuf};

use hcl::{Block, Expression};

use crate::state::{BackendConfig, ConfigDetails, StateError};

/// State-file path resolved from a `.tf` configuration, together with the
/// backend block it came from (default when the sibling fallback was used).
#[derive(Debug)]
pub struct ResolvedState {
    pub path: PathBuf,
    pub backend: BackendConfig,
}

pub fn state_file_from_config(config_path: &Path) -> Result<ResolvedState, StateError> {
    let raw = std::fs::read_to_string(config_path).map_err(|err| StateError::FileRead {
        path: config_path.to_path_buf(),
        source: err,
    })?;

    let body = hcl::parse(&raw).map_err(|err| StateError::ConfigParse {
        path: config_path.to_path_buf(),
        message: err.to_string(),
    })?;

    for block in body.blocks() {
        if block.identifier() != "terraform" {
            continue;
        }
        for backend_block in block.body().blocks() {
            if backend_block.identifier() != "backend" {
                continue;
            }
            let backend = parse_backend_block(config_path, backend_block)?;
            if backend.backend_type != "local" {
                tracing::debug!(backend = %backend.backend_type, "skipping non-local backend");
                continue;
            }
            if !backend.config.path.is_empty() {
                let path = resolve_relative(config_path, &backend.config.path);
                return Ok(ResolvedState { path, backend });
            }
        }
    }

    let fallback = config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("terraform.tfstate");
    tracing::warn!(
        path = %fallback.display(),
        "no local backend found in terraform configuration file, checking for default state file in configuration path"
    );
    Ok(ResolvedState { path: fallback, backend: BackendConfig::default() })
}

/// A `path` in a local backend is relative to the configuration directory.
fn resolve_relative(config_path: &Path, state_path: &str) -> PathBuf {
    let state_path = Path::new(state_path);
    if state_path.is_absolute() {
        state_path.to_path_buf()
    } else {
        config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(state_path)
    }
}

fn parse_backend_block(config_path: &Path, block: &Block) -> Result<BackendConfig, StateError> {
    let Some(label) = block.labels().first() else {
        return Err(StateError::ConfigParse {
            path: config_path.to_path_buf(),
            message: "backend block missing type label".to_string(),
        });
    };

    let mut details = ConfigDetails::default();
    for attribute in block.body().attributes() {
        match (attribute.key(), attribute.expr()) {
            ("path", Expression::String(value)) => details.path = value.clone(),
            ("bucket", Expression::String(value)) => details.bucket = value.clone(),
            ("region", Expression::String(value)) => details.region = value.clone(),
            ("key", Expression::String(value)) => details.key = value.clone(),
            ("dynamodb_table", Expression::String(value)) => details.dynamodb_table = value.clone(),
            ("encrypt", Expression::Bool(value)) => details.encrypt = *value,
            _ => {}
        }
    }

    Ok(BackendConfig { backend_type: label.as_str().to_string(), config: details })
}
