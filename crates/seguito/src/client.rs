//! Data-fetch adapter for the project tracker service.
//!
//! Thin wrapper over `reqwest`: one attempt per call, JSON in and out, no
//! retry or backoff. Callers decide how to present failures.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::types::{normalize_owner, Project, ProjectStatus, ProjectUpdate, Task, TaskUpdate};

/// Failure of a tracker call: either the service was unreachable (or sent
/// unparseable JSON), or it answered with a non-2xx status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("tracker request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("tracker returned {status} for {path}")]
    Status { status: StatusCode, path: String },
}

/// Client for the tracker's HTTP JSON API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ProjectList {
    projects: Vec<Project>,
}

#[derive(Serialize)]
struct NewProject<'a> {
    name: &'a str,
    owner: String,
    status: ProjectStatus,
}

#[derive(Serialize)]
struct NewTask<'a> {
    title: &'a str,
    #[serde(rename = "statusDate", skip_serializing_if = "Option::is_none")]
    status_date: Option<&'a str>,
}

#[derive(Serialize)]
struct MeetingNote<'a> {
    week: &'a str,
    /// `None` serializes as JSON null, which deletes the week's entry.
    note: Option<&'a str>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn check(resp: reqwest::Response, path: &str) -> Result<reqwest::Response, ApiError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(ApiError::Status {
                status: resp.status(),
                path: path.to_string(),
            })
        }
    }

    /// `GET /api/projects`, unwrapping the `{"projects": [...]}` envelope.
    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        let path = "/api/projects";
        let resp = self.http.get(self.url(path)).send().await?;
        let list: ProjectList = Self::check(resp, path)?.json().await?;
        debug!(count = list.projects.len(), "fetched project list");
        Ok(list.projects)
    }

    /// `GET /api/projects/{id}`.
    pub async fn get_project(&self, id: &str) -> Result<Project, ApiError> {
        let path = format!("/api/projects/{id}");
        let resp = self.http.get(self.url(&path)).send().await?;
        Ok(Self::check(resp, &path)?.json().await?)
    }

    /// `POST /api/projects`. The owner is normalized (trimmed, upper-cased)
    /// before it goes on the wire; the status defaults to In Progress.
    pub async fn create_project(
        &self,
        name: &str,
        owner: &str,
        status: Option<ProjectStatus>,
    ) -> Result<Project, ApiError> {
        let path = "/api/projects";
        let body = NewProject {
            name,
            owner: normalize_owner(owner).unwrap_or_default(),
            status: status.unwrap_or(ProjectStatus::InProgress),
        };
        let resp = self.http.post(self.url(path)).json(&body).send().await?;
        Ok(Self::check(resp, path)?.json().await?)
    }

    /// `PUT /api/projects/{id}` with a subset body. A present owner is
    /// normalized; a blank owner clears the field.
    pub async fn update_project(
        &self,
        id: &str,
        update: &ProjectUpdate,
    ) -> Result<Project, ApiError> {
        let path = format!("/api/projects/{id}");
        let body = ProjectUpdate {
            name: update.name.clone(),
            owner: update
                .owner
                .as_deref()
                .map(|o| normalize_owner(o).unwrap_or_default()),
            status: update.status,
        };
        let resp = self.http.put(self.url(&path)).json(&body).send().await?;
        Ok(Self::check(resp, &path)?.json().await?)
    }

    /// `DELETE /api/projects/{id}`. The service cascades to the project's
    /// tasks.
    pub async fn delete_project(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/api/projects/{id}");
        let resp = self.http.delete(self.url(&path)).send().await?;
        Self::check(resp, &path)?;
        Ok(())
    }

    /// `POST /api/projects/{id}/tasks`.
    pub async fn create_task(
        &self,
        project_id: &str,
        title: &str,
        status_date: Option<&str>,
    ) -> Result<Task, ApiError> {
        let path = format!("/api/projects/{project_id}/tasks");
        let body = NewTask { title, status_date };
        let resp = self.http.post(self.url(&path)).json(&body).send().await?;
        Ok(Self::check(resp, &path)?.json().await?)
    }

    /// `PUT /api/tasks/{id}` with a subset body.
    pub async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, ApiError> {
        let path = format!("/api/tasks/{id}");
        let resp = self.http.put(self.url(&path)).json(update).send().await?;
        Ok(Self::check(resp, &path)?.json().await?)
    }

    /// `DELETE /api/tasks/{id}`.
    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/api/tasks/{id}");
        let resp = self.http.delete(self.url(&path)).send().await?;
        Self::check(resp, &path)?;
        Ok(())
    }

    /// `PUT /api/projects/{id}/meetings`. Passing `None` for the note
    /// deletes that week's entry.
    pub async fn put_meeting_note(
        &self,
        project_id: &str,
        week: &str,
        note: Option<&str>,
    ) -> Result<(), ApiError> {
        let path = format!("/api/projects/{project_id}/meetings");
        let body = MeetingNote { week, note };
        let resp = self.http.put(self.url(&path)).json(&body).send().await?;
        Self::check(resp, &path)?;
        Ok(())
    }
}
