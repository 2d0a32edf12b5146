use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Workspace: top-level container for seasons and listings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body for `POST /api/workspaces` and `PUT /api/workspaces/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceName {
    pub name: String,
}
