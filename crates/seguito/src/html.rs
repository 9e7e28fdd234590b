//! HTML rendering of the project board.
//!
//! Pure projection from the fetched project list plus `UiPrefs` to markup:
//! the same inputs always produce the same document, and nothing here
//! talks to the network. Every control is a plain form posting to a local
//! route; the only script is the form auto-submit on selects and
//! checkboxes.

use anyhow::Result;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::filter::{self, UiPrefs, WeekGroup, ALL_SENTINEL};
use crate::types::{Project, ProjectStatus, Task, TaskStatus};
use crate::week::WeekKey;

/// Write the rendered board to a file (static snapshot).
pub fn generate_html(
    projects: &[&Project],
    owners: &BTreeSet<String>,
    prefs: &UiPrefs,
    path: &Path,
) -> Result<()> {
    let html = render_page(projects, owners, prefs);
    fs::write(path, html.into_string())?;
    Ok(())
}

pub fn render_page(projects: &[&Project], owners: &BTreeSet<String>, prefs: &UiPrefs) -> Markup {
    page_shell(html! {
        (render_new_project_form())
        (render_filter_bar(owners, prefs))
        div.stats { (projects.len()) " projects" }
        div.project-list {
            @if projects.is_empty() {
                div.empty-state {
                    p { "No projects to show." }
                }
            } @else {
                @for project in projects {
                    (render_project(project, prefs))
                }
            }
        }
    })
}

/// Page shown when the tracker service could not be reached.
pub fn render_error_page(message: &str) -> Markup {
    page_shell(html! {
        div.error-panel {
            p.error-title { "The tracker service is unreachable." }
            p.error-detail { (message) }
            a.retry href="/" { "Retry" }
        }
    })
}

fn page_shell(body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Seguito" }
                style { (PreEscaped(CSS)) }
            }
            body {
                div.container {
                    h1 { "Seguito" }
                    (body)
                }
            }
        }
    }
}

fn render_new_project_form() -> Markup {
    html! {
        form.new-project method="post" action="/projects" {
            input type="text" name="name" placeholder="Project name" required;
            input type="text" name="owner" placeholder="Owner (optional)";
            button type="submit" { "Add project" }
        }
    }
}

fn render_filter_bar(owners: &BTreeSet<String>, prefs: &UiPrefs) -> Markup {
    html! {
        div.filter-bar {
            span.filter-label { "Owners:" }
            form.owner-toggle method="post" action="/filter/owner" {
                input type="hidden" name="owner" value=(ALL_SENTINEL);
                label {
                    input type="checkbox" onchange="this.form.submit()"
                        checked[prefs.owner_filter.is_all()];
                    "all"
                }
            }
            @for owner in owners {
                form.owner-toggle method="post" action="/filter/owner" {
                    input type="hidden" name="owner" value=(owner);
                    label {
                        input type="checkbox" onchange="this.form.submit()"
                            checked[prefs.owner_filter.is_selected(owner)];
                        (owner)
                    }
                }
            }
            form.completed-toggle method="post" action="/filter/completed" {
                label {
                    input type="checkbox" onchange="this.form.submit()"
                        checked[prefs.show_done_projects];
                    "show completed projects"
                }
            }
        }
    }
}

fn render_project(project: &Project, prefs: &UiPrefs) -> Markup {
    let expanded = prefs.is_expanded(&project.id);
    html! {
        div.project-card {
            (render_project_header(project, expanded))
            @if expanded {
                (render_project_body(project, prefs))
            }
        }
    }
}

fn render_project_header(project: &Project, expanded: bool) -> Markup {
    html! {
        div.project-header {
            form.expand-toggle method="post" action={"/projects/" (project.id) "/toggle"} {
                button.header-button type="submit" {
                    span.chevron { @if expanded { "\u{25be}" } @else { "\u{25b8}" } }
                    span.project-title { (project.name) }
                }
            }
            span.project-owner {
                @if let Some(owner) = project.owner_label() {
                    "Owner: " (owner)
                } @else {
                    "Unowned"
                }
            }
            form.status-form method="post" action={"/projects/" (project.id) "/update"} {
                select name="status" onchange="this.form.submit()" {
                    @for status in ProjectStatus::ALL {
                        option value=(status.as_str())
                            selected[project.status == Some(status)] {
                            (status.as_str())
                        }
                    }
                }
            }
        }
    }
}

fn render_project_body(project: &Project, prefs: &UiPrefs) -> Markup {
    let tasks = filter::visible_tasks(project, prefs);
    let (groups, other) = filter::bucket_tasks_by_week(&tasks, &project.meetings);
    html! {
        div.project-body {
            @if tasks.is_empty() && groups.is_empty() {
                div.empty-state {
                    p { "No tasks in this project yet." }
                }
            } @else {
                @for group in &groups {
                    (render_week_group(group, &project.id))
                }
                @if !other.is_empty() {
                    div.week-group.other-group {
                        div.week-header { "other" }
                        @for task in &other {
                            (render_task(task))
                        }
                    }
                }
            }
            form.add-task method="post" action={"/projects/" (project.id) "/tasks"} {
                input type="text" name="title" placeholder="New task" required;
                button type="submit" { "Add task" }
            }
            (render_meeting_editor(project))
            div.project-actions {
                form method="post" action={"/projects/" (project.id) "/tasks-visibility"} {
                    label {
                        input type="checkbox" onchange="this.form.submit()"
                            checked[prefs.shows_done_tasks(&project.id)];
                        "show completed tasks"
                    }
                }
                form.rename-project method="post" action={"/projects/" (project.id) "/update"} {
                    input type="text" name="name" value=(project.name);
                    input type="text" name="owner"
                        value=(project.owner_label().unwrap_or(""))
                        placeholder="Owner";
                    button type="submit" { "Save" }
                }
                form method="post" action={"/projects/" (project.id) "/delete"} {
                    button.danger type="submit" { "Delete project" }
                }
            }
        }
    }
}

fn render_week_group(group: &WeekGroup<'_>, project_id: &str) -> Markup {
    html! {
        div.week-group {
            div.week-header {
                span { "Week " (group.key) }
                form.note-delete method="post" action={"/projects/" (project_id) "/meetings"} {
                    input type="hidden" name="week" value=(group.key);
                    input type="hidden" name="note" value="";
                    button type="submit" { "Delete note" }
                }
            }
            div.note-text { (group.note) }
            @for task in &group.tasks {
                (render_task(task))
            }
        }
    }
}

fn render_task(task: &Task) -> Markup {
    html! {
        div.task-row.task-done[task.is_done()] {
            div.task-info {
                span.task-title { (task.title) }
                @if let Some(note) = &task.status_date {
                    span.task-date { (note) }
                }
            }
            div.task-actions {
                form.status-form method="post" action={"/tasks/" (task.id) "/update"} {
                    select name="status" onchange="this.form.submit()" {
                        @for status in TaskStatus::ALL {
                            option value=(status.as_str()) selected[task.status == status] {
                                (status.as_str())
                            }
                        }
                    }
                }
                form.task-rename method="post" action={"/tasks/" (task.id) "/update"} {
                    input type="text" name="title" value=(task.title);
                    button type="submit" { "Rename" }
                }
                form method="post" action={"/tasks/" (task.id) "/delete"} {
                    button.danger type="submit" { "Delete" }
                }
            }
        }
    }
}

fn render_meeting_editor(project: &Project) -> Markup {
    html! {
        form.meeting-editor method="post" action={"/projects/" (project.id) "/meetings"} {
            div.meeting-fields {
                input type="text" name="week" value=(WeekKey::current()) required;
                textarea name="note" rows="3"
                    placeholder="Meeting note (mention task titles to group them under this week)" {}
            }
            button type="submit" { "Save note" }
        }
    }
}

const CSS: &str = r#"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    background: #f4f5f7;
    color: #1f2430;
    line-height: 1.45;
    padding-bottom: 60px;
}

.container {
    max-width: 960px;
    margin: 0 auto;
    padding: 32px 20px;
}

h1 {
    font-size: 1.8em;
    font-weight: 700;
    letter-spacing: -0.02em;
    margin-bottom: 20px;
}

form {
    display: inline-block;
}

button {
    cursor: pointer;
    border: 1px solid #c6cbd4;
    background: #fff;
    border-radius: 4px;
    padding: 4px 10px;
    font-size: 0.85em;
}

button:hover {
    background: #eef0f4;
}

button.danger {
    border-color: #d98b8b;
    color: #a33;
}

input[type="text"], textarea, select {
    border: 1px solid #c6cbd4;
    border-radius: 4px;
    padding: 5px 8px;
    font-size: 0.9em;
    background: #fff;
}

.new-project {
    display: flex;
    gap: 8px;
    margin-bottom: 16px;
}

.filter-bar {
    display: flex;
    flex-wrap: wrap;
    align-items: center;
    gap: 14px;
    margin-bottom: 8px;
    padding: 10px 12px;
    background: #fff;
    border: 1px solid #e1e4ea;
    border-radius: 6px;
    font-size: 0.9em;
}

.filter-label {
    color: #5b6270;
    font-weight: 600;
}

.completed-toggle {
    margin-left: auto;
}

.stats {
    color: #8a909c;
    font-size: 0.8em;
    margin: 10px 2px 18px;
    text-transform: uppercase;
    letter-spacing: 0.08em;
}

.project-list {
    display: grid;
    gap: 14px;
}

.project-card {
    background: #fff;
    border: 1px solid #e1e4ea;
    border-radius: 6px;
    overflow: hidden;
}

.project-header {
    display: flex;
    align-items: center;
    gap: 14px;
    padding: 12px 16px;
}

.header-button {
    border: none;
    background: none;
    font-size: 1em;
    font-weight: 600;
    display: flex;
    align-items: center;
    gap: 8px;
    padding: 0;
}

.header-button:hover {
    background: none;
    text-decoration: underline;
}

.chevron {
    color: #8a909c;
}

.project-owner {
    color: #5b6270;
    font-size: 0.85em;
}

.status-form {
    margin-left: auto;
}

.project-body {
    border-top: 1px solid #e1e4ea;
    padding: 14px 16px 16px;
    display: grid;
    gap: 12px;
}

.week-group {
    border-left: 3px solid #7a8ff0;
    padding-left: 12px;
}

.other-group {
    border-left-color: #c6cbd4;
}

.week-header {
    display: flex;
    align-items: center;
    justify-content: space-between;
    font-weight: 600;
    font-size: 0.85em;
    text-transform: uppercase;
    letter-spacing: 0.06em;
    color: #5b6270;
    margin-bottom: 4px;
}

.note-text {
    white-space: pre-wrap;
    color: #444b58;
    font-size: 0.9em;
    margin-bottom: 8px;
}

.task-row {
    display: flex;
    align-items: center;
    justify-content: space-between;
    gap: 12px;
    padding: 8px 10px;
    margin-bottom: 6px;
    background: #f8f9fb;
    border: 1px solid #e9ebf0;
    border-radius: 4px;
}

.task-done .task-title {
    text-decoration: line-through;
    color: #8a909c;
}

.task-title {
    font-weight: 500;
}

.task-date {
    display: block;
    color: #8a909c;
    font-size: 0.78em;
}

.task-actions {
    display: flex;
    gap: 6px;
    align-items: center;
}

.add-task {
    display: flex;
    gap: 8px;
}

.meeting-editor {
    display: flex;
    gap: 8px;
    align-items: flex-start;
}

.meeting-fields {
    display: grid;
    gap: 6px;
    flex: 1;
}

.meeting-fields textarea {
    width: 100%;
    resize: vertical;
}

.project-actions {
    display: flex;
    gap: 10px;
    align-items: center;
    border-top: 1px dashed #e1e4ea;
    padding-top: 10px;
    font-size: 0.88em;
}

.rename-project {
    display: flex;
    gap: 6px;
}

.empty-state {
    padding: 28px 16px;
    text-align: center;
    color: #8a909c;
    font-size: 0.9em;
}

.error-panel {
    background: #fff;
    border: 1px solid #d98b8b;
    border-radius: 6px;
    padding: 28px 20px;
    text-align: center;
}

.error-title {
    font-weight: 600;
    color: #a33;
    margin-bottom: 6px;
}

.error-detail {
    color: #5b6270;
    font-size: 0.88em;
    margin-bottom: 14px;
}

a.retry {
    color: #3451c6;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Project, ProjectStatus, Task, TaskStatus};
    use std::collections::BTreeMap;

    fn sample_project() -> Project {
        Project {
            id: "1".to_string(),
            name: "Intranet revamp".to_string(),
            owner: Some("ALICE".to_string()),
            status: Some(ProjectStatus::InProgress),
            tasks: vec![
                Task {
                    id: "1-1".to_string(),
                    title: "Design doc".to_string(),
                    status: TaskStatus::ToDo,
                    status_date: Some("added on 15.01.2025".to_string()),
                },
                Task {
                    id: "1-2".to_string(),
                    title: "Old migration".to_string(),
                    status: TaskStatus::Done,
                    status_date: None,
                },
            ],
            meetings: BTreeMap::from([("2025-04".to_string(), "- Design doc review".to_string())]),
        }
    }

    fn render_to_string(project: &Project, prefs: &UiPrefs) -> String {
        let projects = vec![project];
        let owners = filter::owner_options(std::slice::from_ref(project));
        render_page(&projects, &owners, prefs).into_string()
    }

    #[test]
    fn test_collapsed_project_has_no_task_markup() {
        let project = sample_project();
        let body = render_to_string(&project, &UiPrefs::default());

        assert!(body.contains("Intranet revamp"));
        assert!(!body.contains("Design doc"));
        // Class names also appear in the stylesheet, so check rendered
        // attributes rather than bare names
        assert!(!body.contains(r#"class="task-row"#));
        assert!(!body.contains(r#"class="meeting-editor"#));
    }

    #[test]
    fn test_expanded_project_shows_tasks_and_meetings() {
        let project = sample_project();
        let mut prefs = UiPrefs::default();
        prefs.toggle_expanded("1");
        let body = render_to_string(&project, &prefs);

        assert!(body.contains("Design doc"));
        assert!(body.contains("Week 2025-04"));
        assert!(body.contains("added on 15.01.2025"));
        assert!(body.contains(r#"class="meeting-editor"#));
    }

    #[test]
    fn test_done_tasks_hidden_unless_enabled() {
        let project = sample_project();
        let mut prefs = UiPrefs::default();
        prefs.toggle_expanded("1");
        let body = render_to_string(&project, &prefs);
        assert!(!body.contains("Old migration"));

        prefs.toggle_done_tasks("1");
        let body = render_to_string(&project, &prefs);
        assert!(body.contains("Old migration"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let project = sample_project();
        let mut prefs = UiPrefs::default();
        prefs.toggle_expanded("1");

        let first = render_to_string(&project, &prefs);
        let second = render_to_string(&project, &prefs);
        assert_eq!(first, second);
    }

    #[test]
    fn test_repeated_toggling_leaves_no_duplicates() {
        let project = sample_project();
        let mut prefs = UiPrefs::default();

        prefs.toggle_expanded("1");
        let expanded = render_to_string(&project, &prefs);
        let task_count = expanded.matches(r#"class="task-row"#).count();
        assert!(task_count > 0);

        prefs.toggle_expanded("1");
        let collapsed = render_to_string(&project, &prefs);
        assert_eq!(collapsed.matches(r#"class="task-row"#).count(), 0);

        prefs.toggle_expanded("1");
        let reexpanded = render_to_string(&project, &prefs);
        assert_eq!(reexpanded.matches(r#"class="task-row"#).count(), task_count);
        assert_eq!(reexpanded, expanded);
    }

    #[test]
    fn test_filter_bar_reflects_selection() {
        let project = sample_project();
        let mut prefs = UiPrefs::default();
        prefs.owner_filter.toggle_owner("ALICE");
        let body = render_to_string(&project, &prefs);

        assert!(body.contains("ALICE"));
        // The "all" checkbox renders unchecked once an owner is selected
        assert!(body.contains(r#"value="all""#));
    }

    #[test]
    fn test_empty_list_renders_empty_state() {
        let owners = BTreeSet::new();
        let body = render_page(&[], &owners, &UiPrefs::default()).into_string();
        assert!(body.contains("No projects to show."));
    }

    #[test]
    fn test_error_page_contains_message() {
        let body = render_error_page("connection refused").into_string();
        assert!(body.contains("The tracker service is unreachable."));
        assert!(body.contains("connection refused"));
    }

    #[test]
    fn test_generate_html_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("board.html");
        let project = sample_project();
        let projects = vec![&project];
        let owners = filter::owner_options(std::slice::from_ref(&project));
        let prefs = UiPrefs::everything_visible(std::slice::from_ref(&project));

        generate_html(&projects, &owners, &prefs, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Intranet revamp"));
        assert!(written.contains("Design doc"));
    }
}
