use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status of a project as stored by the tracker service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "On Hold")]
    OnHold,
    Done,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::InProgress,
        ProjectStatus::OnHold,
        ProjectStatus::Done,
    ];

    /// The exact string the tracker service uses on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Done => "Done",
        }
    }

    /// Parse a wire/form value back into a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "In Progress" => Some(ProjectStatus::InProgress),
            "On Hold" => Some(ProjectStatus::OnHold),
            "Done" => Some(ProjectStatus::Done),
            _ => None,
        }
    }
}

/// Status of a task as stored by the tracker service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "To Do" => Some(TaskStatus::ToDo),
            "In Progress" => Some(TaskStatus::InProgress),
            "Done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

/// A project as returned by the tracker service.
///
/// `meetings` maps week keys (`YYYY-WW`) to free-text meeting notes.
/// Older records may lack `status`, `tasks` or `meetings` entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub meetings: BTreeMap<String, String>,
}

impl Project {
    /// A project without a status is never considered done.
    pub fn is_done(&self) -> bool {
        self.status == Some(ProjectStatus::Done)
    }

    /// The owner label, treating the service's empty string as unowned.
    pub fn owner_label(&self) -> Option<&str> {
        self.owner.as_deref().filter(|o| !o.is_empty())
    }
}

/// A task belonging to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// Free-text annotation recording the last status change.
    #[serde(rename = "statusDate", default, skip_serializing_if = "Option::is_none")]
    pub status_date: Option<String>,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

/// Partial update for `PUT /api/projects/{id}`. `None` fields are omitted
/// from the body so the service leaves them untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

/// Partial update for `PUT /api/tasks/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(rename = "statusDate", skip_serializing_if = "Option::is_none")]
    pub status_date: Option<String>,
}

/// Normalize an owner label for storage: trimmed and upper-cased.
/// Blank input means the project is unowned.
pub fn normalize_owner(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Compose the `statusDate` annotation the tracker stores alongside a
/// status change, e.g. "completed on 15.01.2025".
pub fn status_annotation(status: TaskStatus, date: NaiveDate) -> String {
    let day = date.format("%d.%m.%Y");
    match status {
        TaskStatus::Done => format!("completed on {}", day),
        TaskStatus::InProgress => format!("in progress since {}", day),
        TaskStatus::ToDo => format!("added on {}", day),
    }
}
