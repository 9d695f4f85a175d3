use chrono::{DateTime, Utc};
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const GROUP: &str = "k8s.cloudogu.com";
pub const VERSION: &str = "v1";
pub const KIND: &str = "DebugMode";
pub const PLURAL: &str = "debugmodes";

/// Condition type reporting whether the target log levels were applied
pub const CONDITION_LOG_LEVELS_SET: &str = "LogLevelsSet";

/// Lifecycle phase of a debug mode request
#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Copy, Debug, JsonSchema)]
pub enum StatusPhase {
    SetDebugMode,
    WaitForRollback,
    Rollback,
    Completed,
    Failed,
}
impl StatusPhase {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusPhase::SetDebugMode => "SetDebugMode",
            StatusPhase::WaitForRollback => "WaitForRollback",
            StatusPhase::Rollback => "Rollback",
            StatusPhase::Completed => "Completed",
            StatusPhase::Failed => "Failed",
        }
    }
}
impl fmt::Display for StatusPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describe a cluster-wide debug logging request
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    kind = "DebugMode",
    status = "DebugModeStatus",
    shortname = "dm",
    group = "k8s.cloudogu.com",
    version = "v1",
    plural = "debugmodes",
    derive = "PartialEq",
    namespaced
)]
#[kube(
    doc = "Custom resource representing a temporary raise of the ecosystem log levels",
    printcolumn = r#"
    {"name":"level", "type":"string", "description":"Target log level", "jsonPath":".spec.targetLogLevel"},
    {"name":"until", "type":"date", "description":"Deactivation time", "format": "date-time", "jsonPath":".spec.deactivateTimestamp"},
    {"name":"phase", "type":"string", "description":"Phase", "jsonPath":".status.phase"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct DebugModeSpec {
    /// Time at which the previous log levels are restored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deactivate_timestamp: Option<DateTime<Utc>>,
    /// Log level applied while the debug mode is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_log_level: Option<String>,
}

#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Copy, Debug, JsonSchema, Default)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}
impl From<bool> for ConditionStatus {
    fn from(value: bool) -> Self {
        if value { ConditionStatus::True } else { ConditionStatus::False }
    }
}

/// DebugModeCondition is a named observation about a sub-state of the current phase
#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebugModeCondition {
    /// Type of the condition, unique within the status
    #[serde(rename = "type")]
    pub condition_type: String,
    /// Status ("True", "False" or "Unknown")
    pub status: ConditionStatus,
    /// Machine readable reason for the last transition
    #[serde(default)]
    pub reason: String,
    /// Message contains human-readable message indicating details about condition
    #[serde(default)]
    pub message: String,
    /// LastTransitionTime is the time the status last flipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
    /// Generation observed when the condition was set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// The status object of `DebugMode`
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebugModeStatus {
    /// Current lifecycle phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<StatusPhase>,
    /// Description of the last observed failure
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub errors: String,
    /// Conditions refining the phase
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<DebugModeCondition>,
}

impl DebugMode {
    #[must_use]
    pub fn phase(&self) -> Option<StatusPhase> {
        self.status.as_ref().and_then(|s| s.phase)
    }

    #[must_use]
    pub fn condition(&self, condition_type: &str) -> Option<&DebugModeCondition> {
        self.status
            .as_ref()
            .and_then(|s| s.conditions.iter().find(|c| c.condition_type == condition_type))
    }

    #[must_use]
    pub fn has_finalizer(&self, finalizer: &str) -> bool {
        self.finalizers().iter().any(|f| f == finalizer)
    }

    /// `namespace/name`, used to identify the object in error messages
    #[must_use]
    pub fn key(&self) -> String {
        match self.namespace() {
            Some(ns) => format!("{ns}/{}", self.name_any()),
            None => self.name_any(),
        }
    }
}
