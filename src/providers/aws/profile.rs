//! Discovery of AWS shared credential and config files.
//!
//! The SDK performs its own credential resolution; this preflight only
//! verifies that a usable profile setup exists so a misconfigured
//! environment fails before the worker pool starts, not on the first API
//! call.

use std::path::{Path, PathBuf};

use crate::providers::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsProfileFiles {
    pub credential_files: Vec<PathBuf>,
    pub config_files: Vec<PathBuf>,
    pub profile: String,
}

/// Checks `~/.aws/{credentials,config}` plus the `AWS_SHARED_CREDENTIALS_FILE`
/// and `AWS_CONFIG_FILE` overrides. A custom path, when present, takes
/// precedence over the default location.
pub fn discover(home_dir: Option<&Path>, profile: &str) -> Result<AwsProfileFiles, ProviderError> {
    let home = match home_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
            ProviderError::Auth("failed to determine user home directory".to_string())
        })?,
    };

    let default_aws_path = home.join(".aws");
    tracing::debug!(path = %default_aws_path.display(), "checking default AWS configuration directory");

    let mut credential_files = Vec::new();
    let mut config_files = Vec::new();

    let default_credentials = default_aws_path.join("credentials");
    if default_credentials.is_file() {
        credential_files.push(default_credentials);
    } else {
        tracing::warn!(path = %default_credentials.display(), "default AWS credentials file not found");
    }

    let default_config = default_aws_path.join("config");
    if default_config.is_file() {
        config_files.push(default_config);
    } else {
        tracing::warn!(path = %default_config.display(), "default AWS config file not found");
    }

    if let Ok(custom_credentials) = std::env::var("AWS_SHARED_CREDENTIALS_FILE") {
        tracing::debug!(path = %custom_credentials, "checking AWS_SHARED_CREDENTIALS_FILE environment variable");
        let path = PathBuf::from(&custom_credentials);
        if path.is_file() {
            tracing::info!(path = %path.display(), "AWS credentials file found via AWS_SHARED_CREDENTIALS_FILE");
            credential_files.push(path);
        } else {
            tracing::warn!(path = %custom_credentials, "AWS_SHARED_CREDENTIALS_FILE points to a non-existent file");
        }
    }

    if let Ok(custom_config) = std::env::var("AWS_CONFIG_FILE") {
        tracing::debug!(path = %custom_config, "checking AWS_CONFIG_FILE environment variable");
        let path = PathBuf::from(&custom_config);
        if path.is_file() {
            tracing::info!(path = %path.display(), "AWS config file found via AWS_CONFIG_FILE");
            config_files.push(path);
        } else {
            tracing::warn!(path = %custom_config, "AWS_CONFIG_FILE points to a non-existent file");
        }
    }

    if credential_files.is_empty() || config_files.is_empty() {
        return Err(ProviderError::Auth(
            "either AWS configuration or credential path is missing".to_string(),
        ));
    }

    let profile = if profile.is_empty() { "default" } else { profile };

    Ok(AwsProfileFiles {
        credential_files,
        config_files,
        profile: profile.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_file(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn clear_env() -> (Option<String>, Option<String>) {
        let creds = std::env::var("AWS_SHARED_CREDENTIALS_FILE").ok();
        let config = std::env::var("AWS_CONFIG_FILE").ok();
        // SAFETY: test environment, serial execution guaranteed by #[serial]
        unsafe {
            std::env::remove_var("AWS_SHARED_CREDENTIALS_FILE");
            std::env::remove_var("AWS_CONFIG_FILE");
        }
        (creds, config)
    }

    fn restore_env(saved: (Option<String>, Option<String>)) {
        // SAFETY: test environment, serial execution guaranteed by #[serial]
        unsafe {
            match saved.0 {
                Some(value) => std::env::set_var("AWS_SHARED_CREDENTIALS_FILE", value),
                None => std::env::remove_var("AWS_SHARED_CREDENTIALS_FILE"),
            }
            match saved.1 {
                Some(value) => std::env::set_var("AWS_CONFIG_FILE", value),
                None => std::env::remove_var("AWS_CONFIG_FILE"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_discover_default_location() {
        let saved = clear_env();
        let home = tempfile::tempdir().unwrap();
        write_file(&home.path().join(".aws/credentials"), "[default]\n");
        write_file(&home.path().join(".aws/config"), "[default]\n");

        let files = discover(Some(home.path()), "default").unwrap();
        restore_env(saved);

        assert_eq!(files.credential_files, vec![home.path().join(".aws/credentials")]);
        assert_eq!(files.config_files, vec![home.path().join(".aws/config")]);
        assert_eq!(files.profile, "default");
    }

    #[test]
    #[serial]
    fn test_discover_missing_files_is_error() {
        let saved = clear_env();
        let home = tempfile::tempdir().unwrap();

        let result = discover(Some(home.path()), "default");
        restore_env(saved);

        assert!(matches!(result, Err(ProviderError::Auth(_))));
    }

    #[test]
    #[serial]
    fn test_discover_env_override_appended() {
        let saved = clear_env();
        let home = tempfile::tempdir().unwrap();
        write_file(&home.path().join(".aws/credentials"), "[default]\n");
        write_file(&home.path().join(".aws/config"), "[default]\n");

        let custom = tempfile::tempdir().unwrap();
        let custom_credentials = custom.path().join("creds");
        write_file(&custom_credentials, "[ci]\n");
        // SAFETY: test environment, serial execution guaranteed by #[serial]
        unsafe {
            std::env::set_var("AWS_SHARED_CREDENTIALS_FILE", &custom_credentials);
        }

        let files = discover(Some(home.path()), "ci").unwrap();
        restore_env(saved);

        assert_eq!(files.credential_files.len(), 2);
        assert_eq!(files.credential_files[1], custom_credentials);
        assert_eq!(files.profile, "ci");
    }

    #[test]
    #[serial]
    fn test_discover_empty_profile_defaults() {
        let saved = clear_env();
        let home = tempfile::tempdir().unwrap();
        write_file(&home.path().join(".aws/credentials"), "[default]\n");
        write_file(&home.path().join(".aws/config"), "[default]\n");

        let files = discover(Some(home.path()), "").unwrap();
        restore_env(saved);

        assert_eq!(files.profile, "default");
    }
}
