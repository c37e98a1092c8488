//! Drift comparison engine.
//!
//! Compares one desired resource from the state file against its live
//! counterpart over a caller-chosen attribute set and produces exactly one
//! [`DriftReport`]. The engine depends only on the attribute-query
//! capability of the two sides; it knows nothing about providers or tools.

use chrono::Utc;
use thiserror::Error;

use crate::providers::LiveResource;
use crate::report::{DriftItem, DriftReport, DriftStatus, DriftType};
use crate::state::StateResource;

#[derive(Debug, Error)]
pub enum CheckError {
    /// Programmer error: the pipeline handed the engine mismatched inputs.
    #[error("resource type mismatch: live resource {live} does not match desired type {desired}")]
    ResourceTypeMismatch { live: String, desired: String },
}

pub trait DriftChecker: Send + Sync {
    fn compare_states(
        &self,
        live: Option<&dyn LiveResource>,
        desired: &StateResource,
        attributes_to_track: &[String],
    ) -> Result<DriftReport, CheckError>;
}

#[derive(Debug, Default)]
pub struct DefaultDriftChecker;

impl DefaultDriftChecker {
    pub fn new() -> Self {
        Self
    }
}

impl DriftChecker for DefaultDriftChecker {
    fn compare_states(
        &self,
        live: Option<&dyn LiveResource>,
        desired: &StateResource,
        attributes_to_track: &[String],
    ) -> Result<DriftReport, CheckError> {
        // Identity is best effort; a resource without an id attribute still
        // gets a report.
        let resource_id = desired.attribute_value("id").unwrap_or_default();

        let mut report = DriftReport {
            resource_id,
            resource_type: desired.resource_type().to_string(),
            resource_name: desired.name.clone(),
            has_drift: false,
            status: DriftStatus::Match,
            drift_details: Vec::new(),
            generated_at: Utc::now(),
        };

        // Resource-level shortcut: the live side is known to be absent.
        let Some(live) = live else {
            report.status = DriftStatus::MissingInInfrastructure;
            report.has_drift = true;
            return Ok(report);
        };

        if live.resource_type() != desired.resource_type() {
            return Err(CheckError::ResourceTypeMismatch {
                live: live.resource_type().to_string(),
                desired: desired.resource_type().to_string(),
            });
        }

        let mut overall = DriftStatus::Match;
        for attribute in attributes_to_track {
            // An unobservable attribute is skipped entirely; reporting it
            // would manufacture drift out of a lookup failure.
            let actual_value = match live.attribute_value(attribute) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(
                        attribute = %attribute,
                        error = %err,
                        "failed to retrieve attribute value for live state"
                    );
                    continue;
                }
            };
            let terraform_value = match desired.attribute_value(attribute) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(
                        attribute = %attribute,
                        error = %err,
                        "failed to retrieve attribute value for desired state"
                    );
                    continue;
                }
            };

            let drift_type = match (terraform_value.is_empty(), actual_value.is_empty()) {
                (true, true) => DriftType::Match,
                (true, false) => DriftType::MissingInTerraform,
                (false, true) => DriftType::MissingInInfrastructure,
                (false, false) if terraform_value != actual_value => DriftType::ValueChanged,
                _ => DriftType::Match,
            };
            if drift_type != DriftType::Match {
                overall = DriftStatus::Drift;
            }

            report.drift_details.push(DriftItem {
                field: attribute.clone(),
                terraform_value,
                actual_value,
                drift_type,
            });
        }

        report.status = overall;
        report.has_drift = overall != DriftStatus::Match;
        Ok(report)
    }
}
