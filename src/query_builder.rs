//! Query-string builder for the backend's list, export and bulk-delete endpoints.
//!
//! Parameters are emitted in a fixed order regardless of call order:
//! pagination first, then filters/params in insertion order, then sorting.
//! Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use price_monitor_sdk::QueryBuilder;
//! use price_monitor_sdk::models::SortOrder;
//! let params = QueryBuilder::new()
//!     .page(2, 50)
//!     .param("listing_id", "7")
//!     .sort("date", SortOrder::Desc)
//!     .build();
//! assert_eq!(params[0], ("page".to_string(), "2".to_string()));
//! ```

use url::form_urlencoded;

use crate::models::SortOrder;

/// Builds ordered `(key, value)` query parameters.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    page: Option<(u32, u32)>,
    params: Vec<(String, String)>,
    sort: Option<(String, SortOrder)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `page` (1-based) and `page_size`.
    pub fn page(&mut self, page: u32, page_size: u32) -> &mut Self {
        self.page = Some((page, page_size));
        self
    }

    /// Append a parameter. Empty values are skipped.
    pub fn param(&mut self, key: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.params.push((key.to_string(), value.to_string()));
        }
        self
    }

    /// Append a parameter only when a value is present.
    pub fn param_opt(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            self.param(key, v);
        }
        self
    }

    /// Append every filter in order, skipping empty values.
    pub fn filters(&mut self, filters: &[(String, String)]) -> &mut Self {
        for (k, v) in filters {
            self.param(k, v);
        }
        self
    }

    /// Set the sort column and direction (`sort_by` / `sort_order`).
    pub fn sort(&mut self, column: &str, order: SortOrder) -> &mut Self {
        self.sort = Some((column.to_string(), order));
        self
    }

    /// Build the final parameter list.
    pub fn build(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.params.len() + 4);

        if let Some((page, size)) = self.page {
            out.push(("page".to_string(), page.to_string()));
            out.push(("page_size".to_string(), size.to_string()));
        }

        out.extend(self.params.iter().cloned());

        if let Some((column, order)) = &self.sort {
            out.push(("sort_by".to_string(), column.clone()));
            out.push(("sort_order".to_string(), order.as_str().to_string()));
        }

        out
    }

    /// Build a URL-encoded query string (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.build() {
            serializer.append_pair(&k, &v);
        }
        serializer.finish()
    }
}
