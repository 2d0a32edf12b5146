//! Paginated database browser view-model.
//!
//! Holds the table/page/filter/sort state of the raw-data view and turns it
//! into query parameters for [`DatabaseQuery`](crate::queries::DatabaseQuery).
//! Nothing here performs I/O.

use chrono::NaiveDate;
use serde_json::Value;

use crate::config;
use crate::models::{SortOrder, Table};
use crate::query_builder::QueryBuilder;
use crate::state::AppState;

/// Optional filters entered in the browser's filter bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterInput {
    pub listing_id: Option<i64>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct DatabaseBrowser {
    pub table: Table,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    /// Total rows reported by the last fetch.
    pub total: u64,
    filters: Vec<(String, String)>,
    sort: Option<(String, SortOrder)>,
}

impl Default for DatabaseBrowser {
    fn default() -> Self {
        Self {
            table: Table::Prices,
            page: 1,
            page_size: config::DEFAULT_PAGE_SIZE,
            total: 0,
            filters: Vec::new(),
            sort: None,
        }
    }
}

impl DatabaseBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch tables: back to page 1 with no filters.
    pub fn select_table(&mut self, table: Table) {
        self.table = table;
        self.page = 1;
        self.filters.clear();
    }

    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    /// Set a filter, keeping its original position if it already exists.
    pub fn set_filter(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.filters.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.filters.push((key.to_string(), value)),
        }
    }

    pub fn remove_filter(&mut self, key: &str) {
        self.filters.retain(|(k, _)| k != key);
    }

    fn set_or_remove(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(v) => self.set_filter(key, v),
            None => self.remove_filter(key),
        }
    }

    /// Apply the workspace/season context plus the filter bar, back to page 1.
    pub fn apply_filters(&mut self, state: &AppState, input: &FilterInput) {
        self.set_or_remove("workspace_id", state.workspace_id().map(|id| id.to_string()));
        self.set_or_remove("season_id", state.season_id.map(|id| id.to_string()));
        self.set_or_remove("listing_id", input.listing_id.map(|id| id.to_string()));
        self.set_or_remove(
            "date_start",
            input.date_start.map(|d| d.format("%Y-%m-%d").to_string()),
        );
        self.set_or_remove(
            "date_end",
            input.date_end.map(|d| d.format("%Y-%m-%d").to_string()),
        );
        self.page = 1;
    }

    pub fn sort(&self) -> Option<(&str, SortOrder)> {
        self.sort.as_ref().map(|(c, o)| (c.as_str(), *o))
    }

    /// Sort by `column`: the same column flips direction, a new one starts ascending.
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort = match self.sort.take() {
            Some((current, order)) if current == column => Some((current, order.toggled())),
            _ => Some((column.to_string(), SortOrder::Asc)),
        };
    }

    /// Parameters for fetching the current page.
    pub fn page_query(&self) -> Vec<(String, String)> {
        let mut qb = QueryBuilder::new();
        qb.page(self.page, self.page_size).filters(&self.filters);
        if let Some((column, order)) = &self.sort {
            qb.sort(column, *order);
        }
        qb.build()
    }

    /// Filter-only parameters, for exports and bulk deletes.
    pub fn filter_query(&self) -> Vec<(String, String)> {
        QueryBuilder::new().filters(&self.filters).build()
    }

    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size)) as u32
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Step back one page. Returns `false` when already on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Step forward one page. Returns `false` when already on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn go_to(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Page links to show: at most five, centred on the current page.
    pub fn page_numbers(&self) -> Vec<u32> {
        let total = i64::from(self.total_pages());
        let window = i64::from(config::PAGE_WINDOW);
        let current = i64::from(self.page);

        let mut start = (current - window / 2).max(1);
        let end = (start + window - 1).min(total);
        if end - start < window - 1 {
            start = (end - window + 1).max(1);
        }
        (start..=end).map(|p| p as u32).collect()
    }

    /// e.g. `1 record`, `120 records`.
    pub fn record_count_label(&self) -> String {
        let plural = if self.total == 1 { "" } else { "s" };
        format!("{} record{plural}", self.total)
    }

    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages())
    }

    /// Prompt shown before a bulk delete.
    pub fn delete_confirmation(&self) -> String {
        let scope = if self.filters.is_empty() {
            "ALL records in this table"
        } else {
            "the records matching the applied filters"
        };
        format!("⚠️ Delete {scope} from '{}'?\n\nThis cannot be undone.", self.table)
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Human-readable column header.
pub fn header_name(column: &str) -> String {
    let known = match column {
        "id" => "ID",
        "listing_id" => "Listing ID",
        "listing_name" => "Listing",
        "workspace_id" => "Workspace",
        "season_id" => "Season",
        "date" => "Date",
        "available" => "Available",
        "available_for_checkin" => "Check-in",
        "available_for_checkout" => "Check-out",
        "bookable" => "Bookable",
        "min_nights" => "Min Nights",
        "max_nights" => "Max Nights",
        "price_per_night" => "Price/Night",
        "stay_total" => "Total",
        "currency" => "Currency",
        "inserted_at" => "Inserted",
        "name" => "Name",
        "url" => "URL",
        "provider" => "Provider",
        "status" => "Status",
        "start_date" => "Start",
        "end_date" => "End",
        "guests" => "Guests",
        "error" => "Error",
        "completed_at" => "Completed",
        "created_at" => "Created",
        _ => return column.replace('_', " ").to_uppercase(),
    };
    known.to_string()
}

/// Plain-text rendering of one cell.
pub fn format_cell(column: &str, value: &Value) -> String {
    match value {
        Value::Null => "—".to_string(),
        Value::Bool(b) => if *b { "✓" } else { "✗" }.to_string(),
        _ if column.contains("date") || column.contains("_at") => plain(value),
        _ if column.contains("price") || column == "stay_total" => {
            let amount = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            amount
                .map(|a| format!("${a:.2}"))
                .unwrap_or_else(|| plain(value))
        }
        _ => plain(value),
    }
}

/// Badge class for a job status cell.
pub fn status_class(status: &str) -> &'static str {
    match status {
        "completed" => "success",
        "failed" => "danger",
        "running" => "warning",
        _ => "secondary",
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
