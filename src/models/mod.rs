pub mod database;
pub mod job;
pub mod listing;
pub mod price;
pub mod season;
pub mod workspace;

pub use database::*;
pub use job::*;
pub use listing::*;
pub use price::*;
pub use season::*;
pub use workspace::*;
