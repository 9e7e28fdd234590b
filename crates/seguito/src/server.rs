//! Event wiring: one route per user action.
//!
//! `GET /` fetches the full project list from the tracker, applies the
//! saved preferences and renders. Every mutation route forwards a single
//! call to the tracker and redirects back to `/` whether it worked or not:
//! the full reload on the following GET is the only consistency mechanism,
//! and a failed mutation simply leaves the previous page for the user to
//! retry. There is no in-flight guard or request de-duplication.

use axum::extract::{Form, Path, State};
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::Router;
use chrono::Local;
use rusqlite::Connection;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::client::ApiClient;
use crate::filter::{self, UiPrefs, ALL_SENTINEL};
use crate::html;
use crate::prefs;
use crate::types::{status_annotation, ProjectStatus, ProjectUpdate, TaskStatus, TaskUpdate};

/// Shared state: the tracker client and the preference store.
pub struct AppState {
    pub client: ApiClient,
    pub prefs: Mutex<Connection>,
}

impl AppState {
    fn prefs_conn(&self) -> MutexGuard<'_, Connection> {
        match self.prefs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn load_prefs(&self) -> UiPrefs {
        prefs::load(&self.prefs_conn())
    }

    fn save_prefs(&self, updated: &UiPrefs) {
        if let Err(e) = prefs::save(&self.prefs_conn(), updated) {
            error!(error = %e, "failed to save preferences");
        }
    }
}

/// Start the front-end server.
pub async fn serve(port: u16, client: ApiClient, prefs: Connection) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        client,
        prefs: Mutex::new(prefs),
    });

    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\nSeguito running at http://{}", addr);
    println!("Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/projects", post(create_project))
        .route("/projects/{id}/update", post(update_project))
        .route("/projects/{id}/delete", post(delete_project))
        .route("/projects/{id}/tasks", post(create_task))
        .route("/projects/{id}/meetings", post(save_meeting))
        .route("/projects/{id}/toggle", post(toggle_expanded))
        .route("/projects/{id}/tasks-visibility", post(toggle_done_tasks))
        .route("/tasks/{id}/update", post(update_task))
        .route("/tasks/{id}/delete", post(delete_task))
        .route("/filter/owner", post(toggle_owner))
        .route("/filter/completed", post(toggle_completed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.client.list_projects().await {
        Ok(projects) => {
            let owners = filter::owner_options(&projects);

            let mut ui = state.load_prefs();
            let before = ui.owner_filter.clone();
            ui.owner_filter.retain_known(&owners);
            if ui.owner_filter != before {
                state.save_prefs(&ui);
            }

            let filtered = filter::filter_projects(&projects, &ui);
            Html(html::render_page(&filtered, &owners, &ui).into_string())
        }
        Err(e) => {
            error!(error = %e, "failed to load projects");
            Html(html::render_error_page(&e.to_string()).into_string())
        }
    }
}

#[derive(Deserialize)]
struct NewProjectForm {
    name: String,
    #[serde(default)]
    owner: String,
}

async fn create_project(
    State(state): State<Arc<AppState>>,
    Form(form): Form<NewProjectForm>,
) -> Redirect {
    let name = form.name.trim();
    if name.is_empty() {
        warn!("ignoring project create with empty name");
        return Redirect::to("/");
    }
    if let Err(e) = state.client.create_project(name, &form.owner, None).await {
        error!(error = %e, "failed to create project");
    }
    Redirect::to("/")
}

#[derive(Deserialize)]
struct ProjectUpdateForm {
    name: Option<String>,
    owner: Option<String>,
    status: Option<String>,
}

async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<ProjectUpdateForm>,
) -> Redirect {
    let update = ProjectUpdate {
        name: form
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        owner: form.owner,
        status: form.status.as_deref().and_then(ProjectStatus::parse),
    };
    if update.name.is_none() && update.owner.is_none() && update.status.is_none() {
        warn!(project = %id, "ignoring empty project update");
        return Redirect::to("/");
    }
    if let Err(e) = state.client.update_project(&id, &update).await {
        error!(project = %id, error = %e, "failed to update project");
    }
    Redirect::to("/")
}

async fn delete_project(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Redirect {
    if let Err(e) = state.client.delete_project(&id).await {
        error!(project = %id, error = %e, "failed to delete project");
    }
    Redirect::to("/")
}

#[derive(Deserialize)]
struct NewTaskForm {
    title: String,
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<NewTaskForm>,
) -> Redirect {
    let title = form.title.trim();
    if title.is_empty() {
        warn!(project = %id, "ignoring task create with empty title");
        return Redirect::to("/");
    }
    let annotation = status_annotation(TaskStatus::ToDo, Local::now().date_naive());
    if let Err(e) = state.client.create_task(&id, title, Some(&annotation)).await {
        error!(project = %id, error = %e, "failed to create task");
    }
    Redirect::to("/")
}

#[derive(Deserialize)]
struct MeetingForm {
    week: String,
    #[serde(default)]
    note: String,
}

async fn save_meeting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<MeetingForm>,
) -> Redirect {
    let week = form.week.trim();
    if week.is_empty() {
        warn!(project = %id, "ignoring meeting note without a week key");
        return Redirect::to("/");
    }
    // A blank note deletes the week's entry
    let note = if form.note.trim().is_empty() {
        None
    } else {
        Some(form.note.as_str())
    };
    if let Err(e) = state.client.put_meeting_note(&id, week, note).await {
        error!(project = %id, week = week, error = %e, "failed to save meeting note");
    }
    Redirect::to("/")
}

async fn toggle_expanded(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Redirect {
    let mut ui = state.load_prefs();
    ui.toggle_expanded(&id);
    state.save_prefs(&ui);
    Redirect::to("/")
}

async fn toggle_done_tasks(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Redirect {
    let mut ui = state.load_prefs();
    ui.toggle_done_tasks(&id);
    state.save_prefs(&ui);
    Redirect::to("/")
}

#[derive(Deserialize)]
struct TaskUpdateForm {
    title: Option<String>,
    status: Option<String>,
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<TaskUpdateForm>,
) -> Redirect {
    let mut update = TaskUpdate {
        title: form
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
        ..Default::default()
    };
    if let Some(status) = form.status.as_deref().and_then(TaskStatus::parse) {
        update.status = Some(status);
        update.status_date = Some(status_annotation(status, Local::now().date_naive()));
    }
    if update.title.is_none() && update.status.is_none() {
        warn!(task = %id, "ignoring empty task update");
        return Redirect::to("/");
    }
    if let Err(e) = state.client.update_task(&id, &update).await {
        error!(task = %id, error = %e, "failed to update task");
    }
    Redirect::to("/")
}

async fn delete_task(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Redirect {
    if let Err(e) = state.client.delete_task(&id).await {
        error!(task = %id, error = %e, "failed to delete task");
    }
    Redirect::to("/")
}

#[derive(Deserialize)]
struct OwnerToggleForm {
    owner: String,
}

async fn toggle_owner(
    State(state): State<Arc<AppState>>,
    Form(form): Form<OwnerToggleForm>,
) -> Redirect {
    let mut ui = state.load_prefs();
    if form.owner == ALL_SENTINEL {
        ui.owner_filter.toggle_all();
    } else {
        ui.owner_filter.toggle_owner(&form.owner);
    }
    state.save_prefs(&ui);
    Redirect::to("/")
}

async fn toggle_completed(State(state): State<Arc<AppState>>) -> Redirect {
    let mut ui = state.load_prefs();
    ui.show_done_projects = !ui.show_done_projects;
    state.save_prefs(&ui);
    Redirect::to("/")
}
