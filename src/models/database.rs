use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PriceMonitorError;

// ---------------------------------------------------------------------------
// Table: tables exposed by the database browser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Prices,
    Listings,
    Jobs,
    Seasons,
    Workspaces,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Prices,
        Table::Listings,
        Table::Jobs,
        Table::Seasons,
        Table::Workspaces,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Prices => "prices",
            Table::Listings => "listings",
            Table::Jobs => "jobs",
            Table::Seasons => "seasons",
            Table::Workspaces => "workspaces",
        }
    }

    /// Paginated list endpoint. Workspaces are served by the regular CRUD route.
    pub fn path(&self) -> String {
        match self {
            Table::Workspaces => "/api/workspaces".to_string(),
            other => format!("/api/database/{}", other.as_str()),
        }
    }

    /// CSV export endpoint, if the table supports export.
    pub fn export_path(&self) -> Option<String> {
        match self {
            Table::Prices | Table::Listings | Table::Jobs => {
                Some(format!("/api/database/{}/export", self.as_str()))
            }
            _ => None,
        }
    }

    /// Bulk-delete endpoint, if the table supports filtered deletion.
    pub fn delete_path(&self) -> Option<String> {
        match self {
            Table::Workspaces => None,
            other => Some(format!("/api/database/{}", other.as_str())),
        }
    }

    /// Whether the listing/date filters apply to this table.
    pub fn has_listing_filters(&self) -> bool {
        matches!(self, Table::Prices | Table::Jobs)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = PriceMonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PriceMonitorError::InvalidArgument(format!("Unknown table: {s}")))
    }
}

// ---------------------------------------------------------------------------
// SortOrder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

// ---------------------------------------------------------------------------
// Page: one page of database rows
// ---------------------------------------------------------------------------

/// A page of rows. The backend answers either `{items, total}` or a bare
/// array; both decode into this shape.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "PageRepr")]
pub struct Page {
    pub items: Vec<Value>,
    /// Total rows across all pages.
    pub total: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr {
    Bare(Vec<Value>),
    Wrapped {
        #[serde(default)]
        items: Vec<Value>,
        #[serde(default)]
        total: Option<u64>,
    },
}

impl From<PageRepr> for Page {
    fn from(repr: PageRepr) -> Self {
        match repr {
            PageRepr::Wrapped { items, total } => {
                let total = total
                    .filter(|t| *t > 0)
                    .unwrap_or(items.len() as u64);
                Page { items, total }
            }
            PageRepr::Bare(items) => Page {
                total: items.len() as u64,
                items,
            },
        }
    }
}

impl Page {
    /// Column names of the first row, in the order the backend sent them.
    pub fn columns(&self) -> Vec<String> {
        self.items
            .first()
            .and_then(Value::as_object)
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Response of a bulk delete: `{"message": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteSummary {
    #[serde(default)]
    pub message: String,
}
