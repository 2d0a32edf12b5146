//! Workspace CRUD.

use crate::config;
use crate::connection::Connection;
use crate::error::{PriceMonitorError, Result};
use crate::models::{Workspace, WorkspaceName};

/// Query interface for `/api/workspaces`.
pub struct WorkspaceQuery<'a> {
    conn: &'a Connection,
}

impl<'a> WorkspaceQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn list(&self) -> Result<Vec<Workspace>> {
        self.conn.get_json(&config::workspaces_path(), &[])
    }

    pub fn get(&self, id: i64) -> Result<Workspace> {
        self.conn.get_json(&config::workspace_path(id), &[])
    }

    /// Create a workspace. Blank names are rejected before any request.
    pub fn create(&self, name: &str) -> Result<Workspace> {
        let body = WorkspaceName {
            name: required_name(name)?,
        };
        self.conn.post_json(&config::workspaces_path(), &body)
    }

    pub fn rename(&self, id: i64, name: &str) -> Result<()> {
        let body = WorkspaceName {
            name: required_name(name)?,
        };
        self.conn.put(&config::workspace_path(id), &body)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.conn.delete(&config::workspace_path(id))
    }
}

fn required_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PriceMonitorError::Validation(
            "Workspace name is required".into(),
        ));
    }
    Ok(name.to_string())
}
