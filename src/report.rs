use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall verdict for one resource comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftStatus {
    Match,
    Drift,
    /// The resource exists upstream but has no counterpart in the state file.
    MissingInTerraform,
    /// The resource exists in the state file but could not be found upstream.
    MissingInInfrastructure,
}

impl DriftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftStatus::Match => "MATCH",
            DriftStatus::Drift => "DRIFT",
            DriftStatus::MissingInTerraform => "MISSING_IN_TERRAFORM",
            DriftStatus::MissingInInfrastructure => "MISSING_IN_INFRASTRUCTURE",
        }
    }
}

impl std::fmt::Display for DriftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-attribute verdict. Exactly one classification applies to any item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftType {
    Match,
    ValueChanged,
    MissingInTerraform,
    MissingInInfrastructure,
}

impl DriftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftType::Match => "MATCH",
            DriftType::ValueChanged => "VALUE_CHANGED",
            DriftType::MissingInTerraform => "MISSING_IN_TERRAFORM",
            DriftType::MissingInInfrastructure => "MISSING_IN_INFRASTRUCTURE",
        }
    }
}

impl std::fmt::Display for DriftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked attribute compared across the desired and live views.
///
/// Values are the canonical string forms produced by the two sides; an empty
/// string means the attribute is absent on that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftItem {
    pub field: String,
    pub terraform_value: String,
    pub actual_value: String,
    pub drift_type: DriftType,
}

/// Result of comparing one state resource against its live counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftReport {
    pub resource_id: String,
    pub resource_type: String,
    pub resource_name: String,
    pub has_drift: bool,
    pub status: DriftStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drift_details: Vec<DriftItem>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_report() -> DriftReport {
        DriftReport {
            resource_id: "i-0123456789abcdef0".to_string(),
            resource_type: "aws_instance".to_string(),
            resource_name: "web".to_string(),
            has_drift: true,
            status: DriftStatus::Drift,
            drift_details: vec![DriftItem {
                field: "instance_type".to_string(),
                terraform_value: "t2.micro".to_string(),
                actual_value: "t2.medium".to_string(),
                drift_type: DriftType::ValueChanged,
            }],
            generated_at: Utc.with_ymd_and_hms(2023, 1, 15, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&DriftStatus::MissingInInfrastructure).unwrap();
        assert_eq!(json, "\"MISSING_IN_INFRASTRUCTURE\"");
        let json = serde_json::to_string(&DriftType::ValueChanged).unwrap();
        assert_eq!(json, "\"VALUE_CHANGED\"");
    }

    #[test]
    fn test_report_serialization_field_names() {
        let json = serde_json::to_string(&sample_report()).unwrap();
        assert!(json.contains("\"resource_id\""));
        assert!(json.contains("\"has_drift\":true"));
        assert!(json.contains("\"status\":\"DRIFT\""));
        assert!(json.contains("\"drift_type\":\"VALUE_CHANGED\""));
        assert!(json.contains("\"generated_at\":\"2023-01-15T10:00:00Z\""));
    }

    #[test]
    fn test_report_roundtrip() {
        let report = sample_report();
        let json = serde_json::to_string(&report).unwrap();
        let back: DriftReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, back);
    }

    #[test]
    fn test_empty_details_omitted_and_accepted() {
        let mut report = sample_report();
        report.drift_details.clear();
        report.status = DriftStatus::Match;
        report.has_drift = false;

        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("drift_details"));

        // Consumers must treat an absent array and an empty array identically.
        let back: DriftReport = serde_json::from_str(&json).unwrap();
        assert!(back.drift_details.is_empty());
    }

    #[test]
    fn test_status_display_matches_wire_form() {
        assert_eq!(DriftStatus::Match.to_string(), "MATCH");
        assert_eq!(
            DriftStatus::MissingInTerraform.to_string(),
            "MISSING_IN_TERRAFORM"
        );
        assert_eq!(DriftType::MissingInInfrastructure.to_string(), "MISSING_IN_INFRASTRUCTURE");
    }
}
