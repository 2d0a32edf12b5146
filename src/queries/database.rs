//! Raw table access for the database browser.

use tracing::info;

use crate::connection::Connection;
use crate::error::{PriceMonitorError, Result};
use crate::models::{DeleteSummary, Page, Table};

pub struct DatabaseQuery<'a> {
    conn: &'a Connection,
}

impl<'a> DatabaseQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// One page of `table`. `params` come from
    /// [`DatabaseBrowser::page_query`](crate::browser::DatabaseBrowser::page_query).
    pub fn page(&self, table: Table, params: &[(String, String)]) -> Result<Page> {
        self.conn.get_json(&table.path(), params)
    }

    /// Server-rendered CSV of every row matching `filters`.
    pub fn export(&self, table: Table, filters: &[(String, String)]) -> Result<Vec<u8>> {
        let path = table.export_path().ok_or_else(|| {
            PriceMonitorError::InvalidArgument(format!("Table '{table}' cannot be exported"))
        })?;
        self.conn.get_bytes(&path, filters)
    }

    /// Delete every row matching `filters` and return the server's summary.
    /// No filters means the whole table.
    pub fn delete(&self, table: Table, filters: &[(String, String)]) -> Result<String> {
        let path = table.delete_path().ok_or_else(|| {
            PriceMonitorError::InvalidArgument(format!(
                "Table '{table}' does not support bulk delete"
            ))
        })?;
        let summary: DeleteSummary = self.conn.delete_json(&path, filters)?;
        info!(table = %table, filters = filters.len(), "bulk delete");
        Ok(summary.message)
    }
}
