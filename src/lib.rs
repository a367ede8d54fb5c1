//! Cursor-based pagination for MongoDB
//!
//! Pages through filtered, sorted find queries and aggregation pipelines with
//! opaque, URL-safe tokens instead of skip/offset. Each page carries the
//! tokens for its neighbours, and a token encodes the sort-field values of the
//! boundary record, so a page is fetched with a range predicate on indexed
//! fields no matter how deep it is.
//!
//! # Modules
//!
//! - `cli`: Command-line interface of the `mongo-paginate` binary
//! - `config`: Configuration management
//! - `cursor`: Token encoding and decoding
//! - `error`: Error types and handling
//! - `paginate`: Pagination driver and the store abstraction
//! - `query`: Query planning and range predicates
//! - `record`: Field access on result records
//! - `sort`: Sort specifications
//!
//! # Example
//!
//! ```no_run
//! use mongo_cursor_pagination::{FindParams, Page, PageRequest, SortField, paginate};
//! use mongodb::{Client, bson::{Document, doc}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//!     let items = client.database("shop").collection::<Document>("items");
//!
//!     let request = PageRequest::new(20).sort_by(SortField::desc("createdAt"));
//!     let page: Page<Document> = paginate(&items, &FindParams::new(doc! {}, request)).await?;
//!     println!("{} records, next: {:?}", page.len(), page.cursor.next);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod cursor;
pub mod error;
pub mod paginate;
pub mod query;
pub mod record;
pub mod sort;

// Re-export commonly used types
pub use config::Config;
pub use cursor::CursorToken;
pub use error::{PaginationError, Result};
pub use paginate::{
    AggregateParams, FindParams, Page, PageCursor, PageRequest, PageSource, paginate,
    paginate_aggregate,
};
pub use record::{FieldAccessor, RecordSchema, SchemaField};
pub use sort::{SortDirection, SortField, SortSpec};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
