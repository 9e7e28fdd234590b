//! Local persistence of UI preferences.
//!
//! The tracker service owns all project state; the only thing kept on this
//! machine is the `UiPrefs` record (owner filter, expanded projects,
//! completed-item visibility), stored in a small SQLite key/value table so
//! it survives restarts.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

use crate::filter::UiPrefs;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS prefs (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);";

const KEY_OWNER_FILTER: &str = "owner_filter";
const KEY_SHOW_DONE_PROJECTS: &str = "show_done_projects";
const KEY_EXPANDED: &str = "expanded";
const KEY_SHOW_DONE_TASKS: &str = "show_done_tasks";

/// Open (creating if needed) the preference store at the given path.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open preference store at {}", path.display()))?;
    conn.execute_batch(SCHEMA)?;
    debug!(path = %path.display(), "preference store ready");
    Ok(conn)
}

/// Load the saved preferences. Missing or unreadable fields fall back to
/// their defaults (all owners, completed items hidden, everything
/// collapsed) rather than failing the render.
pub fn load(conn: &Connection) -> UiPrefs {
    UiPrefs {
        owner_filter: get_field(conn, KEY_OWNER_FILTER).unwrap_or_default(),
        show_done_projects: get_field(conn, KEY_SHOW_DONE_PROJECTS).unwrap_or_default(),
        expanded: get_field(conn, KEY_EXPANDED).unwrap_or_default(),
        show_done_tasks: get_field(conn, KEY_SHOW_DONE_TASKS).unwrap_or_default(),
    }
}

/// Persist all preference fields.
pub fn save(conn: &Connection, prefs: &UiPrefs) -> Result<()> {
    put_field(conn, KEY_OWNER_FILTER, &prefs.owner_filter)?;
    put_field(conn, KEY_SHOW_DONE_PROJECTS, &prefs.show_done_projects)?;
    put_field(conn, KEY_EXPANDED, &prefs.expanded)?;
    put_field(conn, KEY_SHOW_DONE_TASKS, &prefs.show_done_tasks)?;
    Ok(())
}

fn get_field<T: DeserializeOwned>(conn: &Connection, key: &str) -> Option<T> {
    let raw: String = conn
        .query_row("SELECT value FROM prefs WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()
        .ok()??;

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = key, error = %e, "discarding unreadable preference");
            None
        }
    }
}

fn put_field<T: Serialize>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO prefs (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        rusqlite::params![key, raw],
    )
    .with_context(|| format!("Failed to save preference {key}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::OwnerFilter;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Connection) {
        let dir = TempDir::new().unwrap();
        let conn = open(&dir.path().join("prefs.db")).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_fresh_store_loads_defaults() {
        let (_dir, conn) = open_temp();
        let prefs = load(&conn);
        assert_eq!(prefs, UiPrefs::default());
        assert!(prefs.owner_filter.is_all());
        assert!(!prefs.show_done_projects);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (_dir, conn) = open_temp();

        let prefs = UiPrefs {
            owner_filter: OwnerFilter::Selected(BTreeSet::from(["ALICE".to_string()])),
            show_done_projects: true,
            expanded: BTreeSet::from(["1".to_string(), "3".to_string()]),
            show_done_tasks: BTreeSet::from(["3".to_string()]),
        };
        save(&conn, &prefs).unwrap();

        assert_eq!(load(&conn), prefs);
    }

    #[test]
    fn test_save_overwrites_previous_values() {
        let (_dir, conn) = open_temp();

        let mut prefs = UiPrefs {
            show_done_projects: true,
            ..Default::default()
        };
        save(&conn, &prefs).unwrap();

        prefs.show_done_projects = false;
        prefs.toggle_expanded("2");
        save(&conn, &prefs).unwrap();

        let loaded = load(&conn);
        assert!(!loaded.show_done_projects);
        assert!(loaded.is_expanded("2"));
    }

    #[test]
    fn test_unreadable_field_falls_back_to_default() {
        let (_dir, conn) = open_temp();

        let prefs = UiPrefs {
            show_done_projects: true,
            expanded: BTreeSet::from(["1".to_string()]),
            ..Default::default()
        };
        save(&conn, &prefs).unwrap();

        // Corrupt one field; the others must survive
        conn.execute(
            "UPDATE prefs SET value = 'not json' WHERE key = ?1",
            [KEY_EXPANDED],
        )
        .unwrap();

        let loaded = load(&conn);
        assert!(loaded.expanded.is_empty());
        assert!(loaded.show_done_projects);
    }

    #[test]
    fn test_store_persists_across_connections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.db");

        let prefs = UiPrefs {
            show_done_projects: true,
            ..Default::default()
        };
        {
            let conn = open(&path).unwrap();
            save(&conn, &prefs).unwrap();
        }

        let conn = open(&path).unwrap();
        assert_eq!(load(&conn), prefs);
    }
}
