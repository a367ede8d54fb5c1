//! Pagination driver
//!
//! Runs a planned query against a [`PageSource`] and turns the raw rows into
//! a [`Page`]: boundary detection with the extra fetched row, order
//! correction after a backward scan, has-flags and outgoing tokens.

use tracing::{debug, info};

use crate::cursor;
use crate::error::{Boundary, Result};
use crate::query::{PagePlan, plan_aggregate, plan_find};
use crate::record::{FieldAccessor, extract_cursor};

use super::page::{Page, PageCursor};
use super::params::{AggregateParams, FindParams};
use super::source::{CountSpec, FetchSpec, PageSource};

/// Fetch one page of a find query.
///
/// The total count (when requested) and the bounded fetch are independent
/// queries that must both succeed.
pub async fn paginate<T, S>(source: &S, params: &FindParams) -> Result<Page<T>>
where
    T: FieldAccessor + Send,
    S: PageSource<T> + ?Sized,
{
    let plan = plan_find(params)?;
    T::record_schema().validate(&plan.page.spec.field_names())?;

    let total_count = if params.page.count_total {
        Some(
            source
                .count(plan.base_filter.clone(), count_spec(&plan.page))
                .await?,
        )
    } else {
        None
    };

    let fetch_spec = FetchSpec {
        sort: plan.page.sort.clone(),
        limit: plan.page.fetch_limit,
        collation: plan.page.collation.clone(),
        hint: plan.page.hint.clone(),
        projection: plan.projection.clone(),
        max_time: Some(plan.page.max_time),
    };
    let records = source.fetch(plan.filter(), fetch_spec).await?;
    debug!("Fetched {} records (limit {})", records.len(), plan.page.limit);

    assemble_page(records, &plan.page, total_count)
}

/// Fetch one page of an aggregation pipeline.
pub async fn paginate_aggregate<T, S>(source: &S, params: &AggregateParams) -> Result<Page<T>>
where
    T: FieldAccessor + Send,
    S: PageSource<T> + ?Sized,
{
    let plan = plan_aggregate(params)?;
    T::record_schema().validate(&plan.page.spec.field_names())?;

    let total_count = if params.page.count_total {
        Some(
            source
                .aggregate_count(plan.base_pipeline.clone(), count_spec(&plan.page))
                .await?,
        )
    } else {
        None
    };

    let records = source
        .aggregate(plan.pipeline.clone(), count_spec(&plan.page))
        .await?;
    debug!(
        "Aggregated {} records (limit {})",
        records.len(),
        plan.page.limit
    );

    assemble_page(records, &plan.page, total_count)
}

fn count_spec(plan: &PagePlan) -> CountSpec {
    CountSpec {
        collation: plan.collation.clone(),
        hint: plan.hint.clone(),
        max_time: Some(plan.max_time),
    }
}

/// Turn the `limit + 1` fetched rows into a page.
pub(crate) fn assemble_page<T: FieldAccessor>(
    records: Vec<T>,
    plan: &PagePlan,
    total_count: Option<u64>,
) -> Result<Page<T>> {
    let mut records = records;
    let has_more = records.len() > plan.limit;
    records.truncate(plan.limit);

    // A backward scan returns rows nearest the boundary first.
    let records: Vec<T> = if plan.traversal.is_backward() {
        records.into_iter().rev().collect()
    } else {
        records
    };

    let used_next = plan.traversal.used_next();
    let used_previous = plan.traversal.used_previous();
    let mut has_previous = used_next || (used_previous && has_more);
    let mut has_next = used_previous || has_more;

    // No boundary record, no token to hand out.
    if records.is_empty() {
        has_previous = false;
        has_next = false;
    }

    let fields = plan.spec.field_names();
    let previous = match records.first() {
        Some(first) if has_previous => Some(cursor::encode(&extract_cursor(
            first,
            &fields,
            Boundary::First,
        )?)?),
        _ => None,
    };
    let next = match records.last() {
        Some(last) if has_next => Some(cursor::encode(&extract_cursor(
            last,
            &fields,
            Boundary::Last,
        )?)?),
        _ => None,
    };

    info!(
        "Page of {} records (has_previous: {}, has_next: {})",
        records.len(),
        has_previous,
        has_next
    );

    Ok(Page {
        records,
        cursor: PageCursor {
            previous,
            next,
            has_previous,
            has_next,
            total_count,
        },
    })
}
