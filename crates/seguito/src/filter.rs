//! Client-side selection and grouping of the fetched project list.
//!
//! Everything here is a pure projection: the handlers load the full list
//! from the tracker, apply these functions with the current `UiPrefs`, and
//! hand the result to the renderer. Nothing is mutated in place.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::types::{Project, Task};
use crate::week::WeekKey;

/// Form value of the "all owners" checkbox.
pub const ALL_SENTINEL: &str = "all";

/// Which owners' projects are shown.
///
/// Either the `All` sentinel or a non-empty set of owner labels. The
/// zero-selection state (empty set without the sentinel) is
/// unrepresentable: every transition that would empty the set is refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerFilter {
    #[default]
    All,
    Selected(BTreeSet<String>),
}

impl OwnerFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, OwnerFilter::All)
    }

    pub fn is_selected(&self, owner: &str) -> bool {
        match self {
            OwnerFilter::All => false,
            OwnerFilter::Selected(set) => set.contains(owner),
        }
    }

    /// Toggle the "all" checkbox. Unchecking it while no specific owner is
    /// selected is refused, so this only ever moves towards `All`.
    pub fn toggle_all(&mut self) {
        *self = OwnerFilter::All;
    }

    /// Toggle a specific owner checkbox. Deselecting the last remaining
    /// owner is refused and leaves the filter unchanged.
    pub fn toggle_owner(&mut self, owner: &str) {
        match self {
            OwnerFilter::All => {
                *self = OwnerFilter::Selected(BTreeSet::from([owner.to_string()]));
            }
            OwnerFilter::Selected(set) => {
                if set.contains(owner) {
                    if set.len() > 1 {
                        set.remove(owner);
                    }
                } else {
                    set.insert(owner.to_string());
                }
            }
        }
    }

    /// Drop selected owners that no longer appear in the project list
    /// (e.g. their last project was deleted). Falls back to `All` rather
    /// than leaving a selection that silently hides everything.
    pub fn retain_known(&mut self, known: &BTreeSet<String>) {
        if let OwnerFilter::Selected(set) = self {
            set.retain(|o| known.contains(o));
            if set.is_empty() {
                *self = OwnerFilter::All;
            }
        }
    }

    fn allows(&self, project: &Project) -> bool {
        match self {
            OwnerFilter::All => true,
            OwnerFilter::Selected(set) => project
                .owner_label()
                .is_some_and(|owner| set.contains(owner)),
        }
    }
}

/// Explicit UI-state record threaded through filtering and rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiPrefs {
    pub owner_filter: OwnerFilter,
    pub show_done_projects: bool,
    /// Ids of projects currently expanded.
    pub expanded: BTreeSet<String>,
    /// Ids of projects whose completed tasks are visible.
    pub show_done_tasks: BTreeSet<String>,
}

impl UiPrefs {
    pub fn is_expanded(&self, project_id: &str) -> bool {
        self.expanded.contains(project_id)
    }

    pub fn shows_done_tasks(&self, project_id: &str) -> bool {
        self.show_done_tasks.contains(project_id)
    }

    pub fn toggle_expanded(&mut self, project_id: &str) {
        if !self.expanded.remove(project_id) {
            self.expanded.insert(project_id.to_string());
        }
    }

    pub fn toggle_done_tasks(&mut self, project_id: &str) {
        if !self.show_done_tasks.remove(project_id) {
            self.show_done_tasks.insert(project_id.to_string());
        }
    }

    /// Prefs for the static snapshot: every project expanded, completed
    /// items visible, no owner filter.
    pub fn everything_visible(projects: &[Project]) -> Self {
        let ids: BTreeSet<String> = projects.iter().map(|p| p.id.clone()).collect();
        Self {
            owner_filter: OwnerFilter::All,
            show_done_projects: true,
            expanded: ids.clone(),
            show_done_tasks: ids,
        }
    }
}

/// Apply the owner filter and the completed-project filter.
pub fn filter_projects<'a>(projects: &'a [Project], prefs: &UiPrefs) -> Vec<&'a Project> {
    projects
        .iter()
        .filter(|p| prefs.owner_filter.allows(p))
        .filter(|p| prefs.show_done_projects || !p.is_done())
        .collect()
}

/// The tasks of a project that are visible under the per-project
/// completed-task setting.
pub fn visible_tasks<'a>(project: &'a Project, prefs: &UiPrefs) -> Vec<&'a Task> {
    project
        .tasks
        .iter()
        .filter(|t| prefs.shows_done_tasks(&project.id) || !t.is_done())
        .collect()
}

/// Distinct owner labels across the full (unfiltered) project list,
/// sorted, for the filter bar.
pub fn owner_options(projects: &[Project]) -> BTreeSet<String> {
    projects
        .iter()
        .filter_map(|p| p.owner_label())
        .map(str::to_string)
        .collect()
}

/// Tasks of one project grouped under one meeting week.
#[derive(Debug, PartialEq)]
pub struct WeekGroup<'a> {
    /// The week key exactly as stored in the meetings map.
    pub key: &'a str,
    pub note: &'a str,
    pub tasks: Vec<&'a Task>,
}

/// Group tasks under the project's meeting weeks.
///
/// Week keys are sorted descending by `(year, week)`; keys that do not
/// parse as `YYYY-WW` sort after all parseable keys, lexically descending.
/// Each task goes to the first week whose note contains the task's title
/// as a literal substring; tasks no note mentions end up in the second
/// return value ("other"). Weeks keep their group even when no task
/// matches, so the note itself still renders.
pub fn bucket_tasks_by_week<'a>(
    tasks: &[&'a Task],
    meetings: &'a BTreeMap<String, String>,
) -> (Vec<WeekGroup<'a>>, Vec<&'a Task>) {
    let mut keys: Vec<&str> = meetings.keys().map(String::as_str).collect();
    keys.sort_by(|a, b| match (WeekKey::parse(a), WeekKey::parse(b)) {
        (Some(wa), Some(wb)) => wb.cmp(&wa),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.cmp(a),
    });

    let mut groups: Vec<WeekGroup<'a>> = keys
        .into_iter()
        .map(|key| WeekGroup {
            key,
            note: meetings[key].as_str(),
            tasks: Vec::new(),
        })
        .collect();

    let mut other: Vec<&Task> = Vec::new();
    for &task in tasks {
        match groups.iter_mut().find(|g| g.note.contains(&task.title)) {
            Some(group) => group.tasks.push(task),
            None => other.push(task),
        }
    }

    (groups, other)
}
