//! In-memory page source for driver tests
//!
//! Evaluates the filters and pipelines the planner produces over a vector of
//! documents, using MongoDB's cross-type comparison order.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document, doc};
use serde::de::DeserializeOwned;

use crate::error::{PaginationError, Result};
use crate::record::FieldAccessor;

use super::source::{CountSpec, FetchSpec, PageSource};

pub struct MemorySource<T> {
    docs: Vec<Document>,
    fail_count: bool,
    pub queries: AtomicUsize,
    pub last_limit: AtomicUsize,
    /// Options of the most recent fetch.
    pub last_fetch: Mutex<Option<FetchSpec>>,
    /// Options of the most recent aggregation.
    pub last_aggregate: Mutex<Option<CountSpec>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> MemorySource<T> {
    pub fn new(docs: Vec<Document>) -> Self {
        Self {
            docs,
            fail_count: false,
            queries: AtomicUsize::new(0),
            last_limit: AtomicUsize::new(0),
            last_fetch: Mutex::new(None),
            last_aggregate: Mutex::new(None),
            _record: PhantomData,
        }
    }

    /// Make every count query fail.
    pub fn failing_count(mut self) -> Self {
        self.fail_count = true;
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(AtomicOrdering::SeqCst)
    }

    pub fn fetch_options(&self) -> Option<FetchSpec> {
        self.last_fetch.lock().unwrap().clone()
    }

    pub fn aggregate_options(&self) -> Option<CountSpec> {
        self.last_aggregate.lock().unwrap().clone()
    }

    fn run_find(&self, filter: &Document, sort: &Document, limit: i64) -> Vec<Document> {
        let mut matched: Vec<Document> = self
            .docs
            .iter()
            .filter(|d| filter_matches(d, filter))
            .cloned()
            .collect();
        sort_documents(&mut matched, sort);
        matched.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        matched
    }

    fn run_pipeline(&self, pipeline: &[Document]) -> Result<Vec<Document>> {
        let mut docs = self.docs.clone();
        for stage in pipeline {
            let (name, arg) = stage
                .iter()
                .next()
                .ok_or_else(|| PaginationError::InvalidParameters("empty stage".into()))?;
            match (name.as_str(), arg) {
                ("$match", Bson::Document(filter)) => docs.retain(|d| filter_matches(d, filter)),
                ("$sort", Bson::Document(sort)) => sort_documents(&mut docs, sort),
                ("$limit", limit) => {
                    let n = match limit {
                        Bson::Int32(n) => i64::from(*n),
                        Bson::Int64(n) => *n,
                        _ => 0,
                    };
                    docs.truncate(usize::try_from(n).unwrap_or(0));
                }
                ("$count", Bson::String(field)) => {
                    let n = docs.len() as i64;
                    docs = if n == 0 {
                        Vec::new()
                    } else {
                        vec![doc! { field.as_str(): n }]
                    };
                }
                (other, _) => {
                    return Err(PaginationError::InvalidParameters(format!(
                        "unsupported stage {other}"
                    )));
                }
            }
        }
        Ok(docs)
    }
}

fn decode_all<T: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<T>> {
    docs.into_iter()
        .map(|d| {
            bson::from_document(d).map_err(|e| PaginationError::InvalidParameters(e.to_string()))
        })
        .collect()
}

#[async_trait]
impl<T> PageSource<T> for MemorySource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, filter: Document, spec: FetchSpec) -> Result<Vec<T>> {
        self.queries.fetch_add(1, AtomicOrdering::SeqCst);
        self.last_limit
            .store(spec.limit as usize, AtomicOrdering::SeqCst);
        let mut docs = self.run_find(&filter, &spec.sort, spec.limit);
        if let Some(projection) = &spec.projection {
            docs = docs.iter().map(|d| project(d, projection)).collect();
        }
        *self.last_fetch.lock().unwrap() = Some(spec);
        decode_all(docs)
    }

    async fn count(&self, filter: Document, _spec: CountSpec) -> Result<u64> {
        self.queries.fetch_add(1, AtomicOrdering::SeqCst);
        if self.fail_count {
            return Err(PaginationError::InvalidParameters("count failed".into()));
        }
        Ok(self.docs.iter().filter(|d| filter_matches(d, &filter)).count() as u64)
    }

    async fn aggregate(&self, pipeline: Vec<Document>, spec: CountSpec) -> Result<Vec<T>> {
        self.queries.fetch_add(1, AtomicOrdering::SeqCst);
        *self.last_aggregate.lock().unwrap() = Some(spec);
        decode_all(self.run_pipeline(&pipeline)?)
    }

    async fn aggregate_count(&self, pipeline: Vec<Document>, _spec: CountSpec) -> Result<u64> {
        self.queries.fetch_add(1, AtomicOrdering::SeqCst);
        if self.fail_count {
            return Err(PaginationError::InvalidParameters("count failed".into()));
        }
        let mut pipeline = pipeline;
        pipeline.push(doc! { "$count": "count" });
        Ok(self
            .run_pipeline(&pipeline)?
            .first()
            .map(super::source::count_from)
            .unwrap_or(0))
    }
}

/// Inclusion projection; `_id` is kept unless excluded.
fn project(document: &Document, projection: &Document) -> Document {
    let included = |key: &str| match projection.get(key) {
        Some(Bson::Int32(0)) | Some(Bson::Int64(0)) | Some(Bson::Boolean(false)) => false,
        Some(_) => true,
        None => key == "_id",
    };
    document
        .iter()
        .filter(|(key, _)| included(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

pub fn filter_matches(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, condition)| match key.as_str() {
        "$and" => as_documents(condition).iter().all(|f| filter_matches(document, f)),
        "$or" => as_documents(condition).iter().any(|f| filter_matches(document, f)),
        field => {
            let value = document.field_value(field);
            match condition {
                Bson::Document(ops) if ops.keys().all(|k| k.starts_with('$')) => {
                    ops.iter().all(|(op, operand)| apply(op, value.as_ref(), operand))
                }
                other => apply("$eq", value.as_ref(), other),
            }
        }
    })
}

fn as_documents(value: &Bson) -> Vec<Document> {
    match value {
        Bson::Array(items) => items
            .iter()
            .filter_map(|b| b.as_document().cloned())
            .collect(),
        _ => Vec::new(),
    }
}

fn apply(op: &str, value: Option<&Bson>, operand: &Bson) -> bool {
    let Some(value) = value else {
        return op == "$eq" && matches!(operand, Bson::Null);
    };
    // Range operators only match values of the same type class.
    if type_rank(value) != type_rank(operand) {
        return op == "$ne";
    }
    let ordering = compare(value, operand);
    match op {
        "$eq" => ordering == Ordering::Equal,
        "$ne" => ordering != Ordering::Equal,
        "$gt" => ordering == Ordering::Greater,
        "$gte" => ordering != Ordering::Less,
        "$lt" => ordering == Ordering::Less,
        "$lte" => ordering != Ordering::Greater,
        _ => false,
    }
}

fn sort_documents(docs: &mut [Document], sort: &Document) {
    docs.sort_by(|a, b| {
        for (field, direction) in sort {
            let left = a.field_value(field).unwrap_or(Bson::Null);
            let right = b.field_value(field).unwrap_or(Bson::Null);
            let ordering = compare(&left, &right);
            let descending = matches!(direction, Bson::Int32(-1) | Bson::Int64(-1));
            let ordering = if descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::MaxKey => 12,
        _ => 13,
    }
}

fn as_f64(value: &Bson) -> f64 {
    match value {
        Bson::Int32(n) => f64::from(*n),
        Bson::Int64(n) => *n as f64,
        Bson::Double(n) => *n,
        _ => 0.0,
    }
}

fn compare(a: &Bson, b: &Bson) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.timestamp_millis().cmp(&y.timestamp_millis()),
        _ if type_rank(a) == 2 => as_f64(a).partial_cmp(&as_f64(b)).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_operators() {
        let d = doc! { "name": "b", "n": 2, "meta": { "rank": 1 } };
        assert!(filter_matches(&d, &doc! { "name": "b" }));
        assert!(filter_matches(&d, &doc! { "n": { "$gt": 1, "$lte": 2 } }));
        assert!(!filter_matches(&d, &doc! { "n": { "$gt": "a" } }));
        assert!(filter_matches(&d, &doc! { "meta.rank": { "$eq": 1 } }));
        assert!(filter_matches(
            &d,
            &doc! { "$or": [ { "n": { "$lt": 0 } }, { "name": { "$gte": "b" } } ] }
        ));
        assert!(!filter_matches(&d, &doc! { "$and": [ { "n": 2 }, { "name": "c" } ] }));
        assert!(!filter_matches(&d, &doc! { "missing": { "$gt": 0 } }));
    }

    #[test]
    fn test_inclusion_projection_keeps_id() {
        let d = doc! { "_id": 1, "name": "a", "secret": "x" };
        assert_eq!(project(&d, &doc! { "name": 1 }), doc! { "_id": 1, "name": "a" });
        assert_eq!(project(&d, &doc! { "name": true, "_id": 0 }), doc! { "name": "a" });
    }

    #[test]
    fn test_sort_mixed_directions() {
        let mut docs = vec![
            doc! { "a": 1, "b": "x" },
            doc! { "a": 0, "b": "y" },
            doc! { "a": 1, "b": "z" },
        ];
        sort_documents(&mut docs, &doc! { "a": 1, "b": -1 });
        let order: Vec<&str> = docs.iter().map(|d| d.get_str("b").unwrap()).collect();
        assert_eq!(order, vec!["y", "z", "x"]);
    }
}
