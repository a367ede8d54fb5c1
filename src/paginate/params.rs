//! Request parameters for paginated queries

use std::time::Duration;

use mongodb::bson::Document;
use mongodb::options::{Collation, Hint};

use crate::sort::{SortDirection, SortField};

/// Parameters shared by find and aggregate pagination.
///
/// At most one of `next` / `previous` should be set. When both are, `next`
/// is used.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Fields being paginated and sorted on, in priority order.
    ///
    /// Each field should be orderable, indexed and immutable; if its value
    /// changes between page fetches a record can appear twice. The primary
    /// key is appended as a tiebreaker when missing. A field may appear only
    /// once, and fields after the primary key are ignored.
    ///
    /// Sort fields must be present and non-null on every record. A boundary
    /// record lacking one yields a token that is rejected as stale when used.
    pub sort: Vec<SortField>,

    /// Direction of the appended primary key tiebreaker, and of the primary
    /// key alone when `sort` is empty.
    pub default_direction: SortDirection,

    /// Page size, must be at least 1.
    pub limit: i64,

    /// Token of the page to continue after.
    pub next: Option<String>,

    /// Token of the page to continue before.
    pub previous: Option<String>,

    /// Also compute the number of records matching the base filter.
    ///
    /// This costs an extra query.
    pub count_total: bool,

    /// Collation for count and fetch; dropped when sorting on the primary
    /// key only.
    pub collation: Option<Collation>,

    /// Index hint forwarded to the store.
    pub hint: Option<Hint>,

    /// Server-side time limit for count and fetch.
    pub timeout: Option<Duration>,
}

impl PageRequest {
    pub fn new(limit: i64) -> Self {
        Self {
            sort: Vec::new(),
            default_direction: SortDirection::Ascending,
            limit,
            next: None,
            previous: None,
            count_total: false,
            collation: None,
            hint: None,
            timeout: None,
        }
    }

    pub fn sort_by(mut self, field: SortField) -> Self {
        self.sort.push(field);
        self
    }

    pub fn sort_fields(mut self, fields: Vec<SortField>) -> Self {
        self.sort = fields;
        self
    }

    pub fn direction(mut self, direction: SortDirection) -> Self {
        self.default_direction = direction;
        self
    }

    pub fn next(mut self, token: impl Into<String>) -> Self {
        self.next = Some(token.into());
        self
    }

    pub fn previous(mut self, token: impl Into<String>) -> Self {
        self.previous = Some(token.into());
        self
    }

    pub fn count_total(mut self, count: bool) -> Self {
        self.count_total = count;
        self
    }

    pub fn collation(mut self, collation: Collation) -> Self {
        self.collation = Some(collation);
        self
    }

    pub fn hint(mut self, hint: Hint) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A paginated find.
#[derive(Debug, Clone)]
pub struct FindParams {
    /// Base filter, combined with the cursor range predicate.
    pub filter: Document,

    /// Fields to return; all fields when `None`.
    ///
    /// Projected-out sort fields make token generation fail.
    pub projection: Option<Document>,

    pub page: PageRequest,
}

impl FindParams {
    pub fn new(filter: Document, page: PageRequest) -> Self {
        Self {
            filter,
            projection: None,
            page,
        }
    }

    pub fn projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }
}

/// A paginated aggregation.
///
/// The pipeline must not sort or limit; `$match`, `$sort` and `$limit`
/// stages are appended to it.
#[derive(Debug, Clone)]
pub struct AggregateParams {
    pub pipeline: Vec<Document>,
    pub page: PageRequest,
}

impl AggregateParams {
    pub fn new(pipeline: Vec<Document>, page: PageRequest) -> Self {
        Self { pipeline, page }
    }
}
