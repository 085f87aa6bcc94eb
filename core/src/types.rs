//! Request payloads for the Hakuna API.
//!
//! # Design
//! The wire format uses underscore keys (`task_id`, `project_id`, ...). Each
//! field keeps its wire key and additionally accepts the compact-case
//! spelling (`taskId`, `projectId`, ...) when deserialized, so JSON written
//! against either naming converts to a body with only the wire keys.
//! Optional fields that are `None` are left out of the body entirely.
//!
//! Responses are not modelled; they come back as `serde_json::Value`.

use serde::{Deserialize, Serialize};

/// Body of `POST /timer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartTimer {
    #[serde(alias = "taskId", skip_serializing_if = "Option::is_none", default)]
    pub task_id: Option<u64>,
    #[serde(alias = "timeTypeId", skip_serializing_if = "Option::is_none", default)]
    pub time_type_id: Option<u64>,
    /// `HH:MM`; the service uses the current time when omitted.
    #[serde(alias = "startTime", skip_serializing_if = "Option::is_none", default)]
    pub start_time: Option<String>,
    #[serde(alias = "projectId", skip_serializing_if = "Option::is_none", default)]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

impl StartTimer {
    pub fn task(task_id: u64) -> Self {
        Self {
            task_id: Some(task_id),
            ..Default::default()
        }
    }
}

/// Body of `PUT /timer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTimer {
    /// `HH:MM`; the service uses the current time when omitted.
    #[serde(alias = "endTime", skip_serializing_if = "Option::is_none", default)]
    pub end_time: Option<String>,
}

/// Body of `POST /time_entries`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTimeEntry {
    /// `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<String>,
    #[serde(alias = "startTime", skip_serializing_if = "Option::is_none", default)]
    pub start_time: Option<String>,
    #[serde(alias = "endTime", skip_serializing_if = "Option::is_none", default)]
    pub end_time: Option<String>,
    #[serde(alias = "taskId", skip_serializing_if = "Option::is_none", default)]
    pub task_id: Option<u64>,
    #[serde(alias = "timeTypeId", skip_serializing_if = "Option::is_none", default)]
    pub time_type_id: Option<u64>,
    #[serde(alias = "projectId", skip_serializing_if = "Option::is_none", default)]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

/// Body of `PATCH /time_entries/{id}`.
///
/// `id` selects the entry and is never written into the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntryUpdate {
    #[serde(skip_serializing)]
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<String>,
    #[serde(alias = "startTime", skip_serializing_if = "Option::is_none", default)]
    pub start_time: Option<String>,
    #[serde(alias = "endTime", skip_serializing_if = "Option::is_none", default)]
    pub end_time: Option<String>,
    #[serde(alias = "taskId", skip_serializing_if = "Option::is_none", default)]
    pub task_id: Option<u64>,
    #[serde(alias = "timeTypeId", skip_serializing_if = "Option::is_none", default)]
    pub time_type_id: Option<u64>,
    #[serde(alias = "projectId", skip_serializing_if = "Option::is_none", default)]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

impl TimeEntryUpdate {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}
