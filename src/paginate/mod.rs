//! Cursor-based pagination of find and aggregate queries
//!
//! This module provides the public entry points:
//! - [`paginate`]: one page of a find query
//! - [`paginate_aggregate`]: one page of an aggregation pipeline
//!
//! and the types they exchange with callers and stores:
//! - `params`: request parameters
//! - `page`: the returned page and its navigation cursor
//! - `source`: the store abstraction and its MongoDB implementation
//!
//! # Example
//!
//! ```no_run
//! use mongo_cursor_pagination::paginate::{FindParams, Page, PageRequest, paginate};
//! use mongo_cursor_pagination::sort::SortField;
//! use mongodb::bson::{Document, doc};
//!
//! # async fn example(collection: mongodb::Collection<Document>) -> mongo_cursor_pagination::Result<()> {
//! let first: Page<Document> = paginate(
//!     &collection,
//!     &FindParams::new(doc! { "kind": "item" }, PageRequest::new(20).sort_by(SortField::asc("name"))),
//! )
//! .await?;
//!
//! if let Some(token) = first.cursor.next {
//!     let second: Page<Document> = paginate(
//!         &collection,
//!         &FindParams::new(
//!             doc! { "kind": "item" },
//!             PageRequest::new(20).sort_by(SortField::asc("name")).next(token),
//!         ),
//!     )
//!     .await?;
//!     println!("{} more records", second.len());
//! }
//! # Ok(())
//! # }
//! ```

mod driver;
mod page;
mod params;
mod source;

#[cfg(test)]
mod memory;

pub use driver::{paginate, paginate_aggregate};
pub use page::{Page, PageCursor};
pub use params::{AggregateParams, FindParams, PageRequest};
pub use source::{CountSpec, FetchSpec, PageSource};
