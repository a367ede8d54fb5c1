//! Query planning for paginated reads
//!
//! This module turns a page request into the exact queries to run, without
//! touching the store:
//! - `predicate`: range predicate for a decoded page token
//! - [`plan_page`]: sort normalization, token decoding, direction selection
//! - [`plan_find`] / [`plan_aggregate`]: the final filter or pipeline
//!
//! Planning is pure, so every validation failure (bad limit, bad or stale
//! token, malformed predicate) surfaces before any I/O.

pub mod predicate;

use std::time::Duration;

use mongodb::bson::{Bson, Document, doc};
use mongodb::options::{Collation, Hint};
use tracing::{debug, warn};

use crate::cursor;
use crate::error::{CursorError, PaginationError, Result, TokenKind};
use crate::paginate::{AggregateParams, FindParams, PageRequest};
use crate::sort::{SortDirection, SortSpec};

pub use predicate::{ComparisonOp, build_cursor_predicate};

/// Server-side time limit applied when the request does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);

/// Which way the store is scanned for this page.
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    /// Token used for this request, `None` on the first page.
    pub token: Option<TokenKind>,

    /// Decoded boundary values, one per sort field.
    pub values: Vec<Bson>,
}

impl Traversal {
    fn first_page() -> Self {
        Self {
            token: None,
            values: Vec::new(),
        }
    }

    /// A `previous` token means scanning backward from the boundary.
    pub fn is_backward(&self) -> bool {
        self.token == Some(TokenKind::Previous)
    }

    pub fn used_next(&self) -> bool {
        self.token == Some(TokenKind::Next)
    }

    pub fn used_previous(&self) -> bool {
        self.is_backward()
    }
}

/// Store-independent part of a paginated query.
#[derive(Debug, Clone)]
pub struct PagePlan {
    pub spec: SortSpec,
    pub traversal: Traversal,

    /// Range predicate, present when a token was supplied.
    pub predicate: Option<Document>,

    /// Sort document using the effective (possibly inverted) directions.
    pub sort: Document,

    /// Records returned to the caller.
    pub limit: usize,

    /// Records fetched: one more than `limit` to detect a further page.
    pub fetch_limit: i64,

    pub collation: Option<Collation>,
    pub hint: Option<Hint>,
    pub max_time: Duration,
}

/// A find ready to execute.
#[derive(Debug, Clone)]
pub struct FindPlan {
    pub page: PagePlan,

    /// Caller's filter, used alone for the total count.
    pub base_filter: Document,

    /// Filter clauses, ANDed together for the fetch.
    pub clauses: Vec<Document>,

    pub projection: Option<Document>,
}

impl FindPlan {
    /// Combined fetch filter.
    pub fn filter(&self) -> Document {
        match self.clauses.as_slice() {
            [only] => only.clone(),
            clauses => doc! { "$and": clauses.to_vec() },
        }
    }
}

/// An aggregation ready to execute.
#[derive(Debug, Clone)]
pub struct AggregatePlan {
    pub page: PagePlan,

    /// Caller's pipeline, used alone for the total count.
    pub base_pipeline: Vec<Document>,

    /// Caller's pipeline with `$match`, `$sort` and `$limit` appended.
    pub pipeline: Vec<Document>,
}

/// Normalize a page request and decode its token.
pub fn plan_page(request: &PageRequest) -> Result<PagePlan> {
    if request.limit <= 0 {
        return Err(PaginationError::InvalidLimit(request.limit));
    }
    let limit =
        usize::try_from(request.limit).map_err(|_| PaginationError::InvalidLimit(request.limit))?;
    let fetch_limit = request
        .limit
        .checked_add(1)
        .ok_or(PaginationError::InvalidLimit(request.limit))?;

    let spec = SortSpec::new(request.sort.clone(), request.default_direction)?;

    // Locale collation on a raw identifier is meaningless.
    let collation = if spec.is_primary_key_only() {
        None
    } else {
        request.collation.clone()
    };

    let traversal = resolve_token(request, &spec.field_names())?;
    let backward = traversal.is_backward();

    let predicate = match traversal.token {
        Some(_) => {
            let ops: Vec<ComparisonOp> = spec
                .effective_directions(backward)
                .into_iter()
                .map(SortDirection::comparison_op)
                .collect();
            debug!(
                "Cursor predicate on {:?} with operators {:?}",
                spec.field_names(),
                ops
            );
            Some(build_cursor_predicate(
                &spec.field_names(),
                &ops,
                &traversal.values,
            )?)
        }
        None => None,
    };

    let sort = spec.to_sort_document(backward);
    debug!("Paginating with sort {:?}, fetch limit {}", sort, fetch_limit);

    Ok(PagePlan {
        spec,
        traversal,
        predicate,
        sort,
        limit,
        fetch_limit,
        collation,
        hint: request.hint.clone(),
        max_time: request.timeout.unwrap_or(DEFAULT_TIMEOUT),
    })
}

/// Build the queries for a paginated find without executing them.
pub fn plan_find(params: &FindParams) -> Result<FindPlan> {
    let page = plan_page(&params.page)?;

    let mut clauses = vec![params.filter.clone()];
    if let Some(predicate) = &page.predicate {
        clauses.push(predicate.clone());
    }

    Ok(FindPlan {
        page,
        base_filter: params.filter.clone(),
        clauses,
        projection: params.projection.clone(),
    })
}

/// Build the pipeline for a paginated aggregation without executing it.
pub fn plan_aggregate(params: &AggregateParams) -> Result<AggregatePlan> {
    let page = plan_page(&params.page)?;

    let mut pipeline = params.pipeline.clone();
    if let Some(predicate) = &page.predicate {
        pipeline.push(doc! { "$match": predicate.clone() });
    }
    pipeline.push(doc! { "$sort": page.sort.clone() });
    pipeline.push(doc! { "$limit": page.fetch_limit });

    Ok(AggregatePlan {
        page,
        base_pipeline: params.pipeline.clone(),
        pipeline,
    })
}

fn resolve_token(request: &PageRequest, fields: &[String]) -> Result<Traversal> {
    let next = request.next.as_deref().filter(|t| !t.is_empty());
    let previous = request.previous.as_deref().filter(|t| !t.is_empty());

    let (kind, raw) = match (next, previous) {
        (Some(next), Some(_)) => {
            warn!("Both next and previous tokens supplied; using next");
            (TokenKind::Next, next)
        }
        (Some(next), None) => (TokenKind::Next, next),
        (None, Some(previous)) => (TokenKind::Previous, previous),
        (None, None) => return Ok(Traversal::first_page()),
    };

    let token = cursor::decode(raw).map_err(|e| CursorError::new(kind, e.into()))?;
    let values = token
        .values_for(fields)
        .map_err(|fault| CursorError::new(kind, fault))?;

    Ok(Traversal {
        token: Some(kind),
        values,
    })
}
