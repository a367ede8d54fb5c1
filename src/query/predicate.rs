//! Range predicate construction
//!
//! Given the sort fields, one comparison operator per field and the values of
//! a page boundary, builds the filter selecting every record strictly past
//! that boundary in lexicographic order:
//!
//! ```text
//! (f1 CMP1 v1)
//!   OR (f1 == v1 AND f2 CMP2 v2)
//!   OR ...
//!   OR (f1 == v1 AND ... AND fK-1 == vK-1 AND fK CMPK vK)
//! ```

use std::fmt;
use std::str::FromStr;

use mongodb::bson::{Bson, Document, doc};

use crate::error::{PaginationError, Result};

/// Strict comparison used at one position of the range predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Gt,
    Lt,
}

impl ComparisonOp {
    /// MongoDB query operator.
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Gt => "$gt",
            ComparisonOp::Lt => "$lt",
        }
    }
}

impl FromStr for ComparisonOp {
    type Err = PaginationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "$gt" | ">" => Ok(ComparisonOp::Gt),
            "$lt" | "<" => Ok(ComparisonOp::Lt),
            other => Err(PaginationError::InvalidComparisonOperator(other.to_string())),
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the range predicate for a page boundary.
///
/// `fields`, `ops` and `values` must have the same, non-zero length.
pub fn build_cursor_predicate(
    fields: &[String],
    ops: &[ComparisonOp],
    values: &[Bson],
) -> Result<Document> {
    if fields.len() != values.len() {
        return Err(PaginationError::InvalidCursorShape(format!(
            "wrong number of cursor field values specified: {} fields, {} values",
            fields.len(),
            values.len()
        )));
    }
    if ops.len() != values.len() {
        return Err(PaginationError::InvalidCursorShape(format!(
            "wrong number of comparison operators specified: {} operators, {} values",
            ops.len(),
            values.len()
        )));
    }
    if fields.is_empty() {
        return Err(PaginationError::InvalidCursorShape(
            "at least one paginated field is required".to_string(),
        ));
    }

    if fields.len() == 1 {
        return Ok(strict_clause(&fields[0], ops[0], &values[0]));
    }

    let mut branches = Vec::with_capacity(fields.len());
    for i in 0..fields.len() {
        let branch = if i == 0 {
            strict_clause(&fields[0], ops[0], &values[0])
        } else {
            let mut terms: Vec<Bson> = fields[..i]
                .iter()
                .zip(&values[..i])
                .map(|(field, value)| Bson::Document(doc! { field.as_str(): { "$eq": value.clone() } }))
                .collect();
            terms.push(Bson::Document(strict_clause(&fields[i], ops[i], &values[i])));
            doc! { "$and": terms }
        };
        branches.push(Bson::Document(branch));
    }

    Ok(doc! { "$or": branches })
}

/// Same as [`build_cursor_predicate`] with operators given as strings.
pub fn build_cursor_predicate_from_ops(
    fields: &[String],
    ops: &[&str],
    values: &[Bson],
) -> Result<Document> {
    let ops = ops
        .iter()
        .map(|op| op.parse::<ComparisonOp>())
        .collect::<Result<Vec<_>>>()?;
    build_cursor_predicate(fields, &ops, values)
}

fn strict_clause(field: &str, op: ComparisonOp, value: &Bson) -> Document {
    doc! { field: { op.as_str(): value.clone() } }
}
