use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

/// One planner request off the wire: `{id, method, params}`, where
/// `method` is a dotted name like `subjects.add` or `attendance.mark`
/// and `params` carries whatever that method needs.
#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Daemon-lifetime state: the selected workspace directory and the open
/// handle to its planner database. Both stay `None` until the shell
/// sends `workspace.select`; handlers that need the store answer
/// `no_workspace` before then.
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
}
