//! Query modules for the Price Monitor SDK.
//!
//! Each module provides a query struct that borrows a
//! [`Connection`](crate::connection::Connection) and exposes one backend
//! resource through typed methods returning `Result<T>`.

pub mod analytics;
pub mod database;
pub mod listings;
pub mod prices;
pub mod scrape;
pub mod seasons;
pub mod workspaces;

pub use analytics::AnalyticsQuery;
pub use database::DatabaseQuery;
pub use listings::ListingQuery;
pub use prices::PriceQuery;
pub use scrape::ScrapeQuery;
pub use seasons::SeasonQuery;
pub use workspaces::WorkspaceQuery;
