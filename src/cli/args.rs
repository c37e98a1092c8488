use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// driftwatch - detect configuration drift.
///
/// Compares a list of defined attributes between an IaC state file and the
/// live infrastructure behind it.
#[derive(Parser, Debug)]
#[command(name = "driftwatch", author, version, about)]
pub struct Cli {
    /// Log level written to stderr (trace is an alias for debug)
    #[arg(long, global = true, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive handed to the tracing subscriber.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace | LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect drift between a configuration file and live resource metadata
    #[command(alias = "d")]
    Detect(DetectArgs),
}

#[derive(clap::Args, Debug)]
pub struct DetectArgs {
    /// Path to the state file (.tfstate) or terraform configuration (.tf)
    #[arg(long = "configfile")]
    pub config_file: PathBuf,

    /// Attributes to check for drift
    #[arg(long = "attributes", value_delimiter = ',', default_value = "instance_type")]
    pub attributes: Vec<String>,

    /// Name of the infrastructure provider
    #[arg(long, default_value = "aws")]
    pub provider: String,

    /// Resource type to check for drift
    #[arg(long, default_value = "aws_instance")]
    pub resource: String,

    /// Write reports to this file instead of stdout (a .csv extension
    /// selects tabular output)
    #[arg(long = "output-file", default_value = "")]
    pub output_file: String,

    /// State manager that produced the state file
    #[arg(long = "state-manager", default_value = "terraform")]
    pub state_manager: String,

    /// AWS profile used for credential resolution
    #[arg(long = "awsprofile", default_value = "default")]
    pub aws_profile: String,

    /// Override the AWS endpoint, e.g. with a LocalStack URL
    #[arg(long = "localstack-url", env = "DRIFT_LOCALSTACK_URL")]
    pub localstack_url: Option<String>,

    /// Region to use together with the endpoint override
    #[arg(long = "localstackregion", env = "DRIFT_LOCALSTACK_REGION")]
    pub localstack_region: Option<String>,
}
