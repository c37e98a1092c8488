//! Driftwatch - configuration drift detection.
//!
//! Compares the desired state of provisioned resources, as recorded by an
//! Infrastructure-as-Code tool, against the live state observed through the
//! cloud provider's API, and reports every tracked attribute as matching,
//! changed, or missing on one side.

pub mod checker;
pub mod error;
pub mod pipeline;
pub mod providers;
pub mod report;
pub mod reporter;
pub mod state;

pub use checker::{DefaultDriftChecker, DriftChecker};
pub use error::DriftwatchError;
pub use pipeline::{DetectionSummary, run_drift_detection};
pub use providers::{LiveResource, Provider, ProviderError, provider_for};
pub use report::{DriftItem, DriftReport, DriftStatus, DriftType};
pub use reporter::{Reporter, reporter_for};
pub use state::{StateContent, StateManager, StateResource, state_manager_for};
