//! Store abstraction for paginated reads
//!
//! The driver only needs four operations from the store: a bounded sorted
//! fetch, a count, and their aggregation-pipeline counterparts. They are
//! expressed as the [`PageSource`] trait so the algorithm can run against a
//! `mongodb::Collection` or any other executor.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::{AggregateOptions, Collation, CountOptions, FindOptions, Hint};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Result;

/// Options for the bounded fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchSpec {
    pub sort: Document,
    pub limit: i64,
    pub collation: Option<Collation>,
    pub hint: Option<Hint>,
    pub projection: Option<Document>,
    pub max_time: Option<Duration>,
}

/// Options for counts and aggregations.
#[derive(Debug, Clone, Default)]
pub struct CountSpec {
    pub collation: Option<Collation>,
    pub hint: Option<Hint>,
    pub max_time: Option<Duration>,
}

/// Executor of the queries a page needs.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Records matching `filter`, sorted and limited per `spec`.
    async fn fetch(&self, filter: Document, spec: FetchSpec) -> Result<Vec<T>>;

    /// Number of records matching `filter`.
    async fn count(&self, filter: Document, spec: CountSpec) -> Result<u64>;

    /// Output of an aggregation pipeline.
    async fn aggregate(&self, pipeline: Vec<Document>, spec: CountSpec) -> Result<Vec<T>>;

    /// Number of documents an aggregation pipeline outputs.
    async fn aggregate_count(&self, pipeline: Vec<Document>, spec: CountSpec) -> Result<u64>;
}

#[async_trait]
impl<T> PageSource<T> for Collection<T>
where
    T: DeserializeOwned + Send + Sync + Unpin + 'static,
{
    async fn fetch(&self, filter: Document, spec: FetchSpec) -> Result<Vec<T>> {
        debug!(
            "Fetching from '{}' with filter: {:?}",
            self.name(),
            filter
        );

        let mut find_options = FindOptions::default();
        find_options.sort = Some(spec.sort);
        find_options.limit = Some(spec.limit);
        find_options.collation = spec.collation;
        find_options.hint = spec.hint;
        find_options.projection = spec.projection;
        find_options.max_time = spec.max_time;

        let cursor = self.find(filter).with_options(find_options).await?;
        let records: Vec<T> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn count(&self, filter: Document, spec: CountSpec) -> Result<u64> {
        let mut count_options = CountOptions::default();
        count_options.collation = spec.collation;
        count_options.hint = spec.hint;
        count_options.max_time = spec.max_time;

        let count = self
            .count_documents(filter)
            .with_options(count_options)
            .await?;
        debug!("Count on '{}': {}", self.name(), count);
        Ok(count)
    }

    async fn aggregate(&self, pipeline: Vec<Document>, spec: CountSpec) -> Result<Vec<T>> {
        debug!(
            "Aggregating on '{}' with {} pipeline stages",
            self.name(),
            pipeline.len()
        );

        let cursor = Collection::aggregate(self, pipeline)
            .with_options(aggregate_options(spec))
            .with_type::<T>()
            .await?;
        let records: Vec<T> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn aggregate_count(&self, pipeline: Vec<Document>, spec: CountSpec) -> Result<u64> {
        let mut pipeline = pipeline;
        pipeline.push(doc! { "$count": "count" });

        let mut cursor = Collection::aggregate(self, pipeline)
            .with_options(aggregate_options(spec))
            .await?;

        // `$count` emits nothing at all when the pipeline is empty.
        let count = match cursor.try_next().await? {
            Some(result) => count_from(&result),
            None => 0,
        };
        debug!("Aggregate count on '{}': {}", self.name(), count);
        Ok(count)
    }
}

fn aggregate_options(spec: CountSpec) -> AggregateOptions {
    let mut options = AggregateOptions::default();
    options.collation = spec.collation;
    options.hint = spec.hint;
    options.max_time = spec.max_time;
    options
}

/// Read the `count` field of a `$count` stage result.
pub(crate) fn count_from(result: &Document) -> u64 {
    match result.get("count") {
        Some(Bson::Int32(n)) => u64::try_from(*n).unwrap_or(0),
        Some(Bson::Int64(n)) => u64::try_from(*n).unwrap_or(0),
        Some(Bson::Double(n)) if *n >= 0.0 => *n as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_from_stage_result() {
        assert_eq!(count_from(&doc! { "count": 12 }), 12);
        assert_eq!(count_from(&doc! { "count": 12_i64 }), 12);
        assert_eq!(count_from(&doc! { "count": 3.0 }), 3);
        assert_eq!(count_from(&doc! {}), 0);
    }
}
