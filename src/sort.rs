//! Sort specification for paginated queries
//!
//! A [`SortSpec`] is an ordered list of fields with a direction each. The
//! last entry is always the primary key so that the ordering is total and
//! page boundaries are stable even when other fields carry duplicates.

use std::fmt;
use std::str::FromStr;

use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use crate::error::PaginationError;
use crate::query::predicate::ComparisonOp;

/// Name of the primary key used as the final tiebreaker.
pub const PRIMARY_KEY: &str = "_id";

/// Direction of a single sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Return the opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// The value used in a MongoDB sort document (`1` or `-1`).
    pub fn as_order(self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }

    /// Comparison operator that selects records strictly past a position
    /// when scanning in this direction.
    pub fn comparison_op(self) -> ComparisonOp {
        match self {
            SortDirection::Ascending => ComparisonOp::Gt,
            SortDirection::Descending => ComparisonOp::Lt,
        }
    }
}

impl FromStr for SortDirection {
    type Err = PaginationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Ok(SortDirection::Ascending),
            "desc" | "descending" | "-1" => Ok(SortDirection::Descending),
            other => Err(PaginationError::InvalidParameters(format!(
                "unknown sort direction '{other}'"
            ))),
        }
    }
}

/// One field of a sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub name: String,
    pub direction: SortDirection,
}

impl SortField {
    pub fn new(name: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }

    pub fn asc(name: impl Into<String>) -> Self {
        Self::new(name, SortDirection::Ascending)
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self::new(name, SortDirection::Descending)
    }
}

impl FromStr for SortField {
    type Err = PaginationError;

    /// Parses `name`, `name:asc` or `name:desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, direction) = match s.rsplit_once(':') {
            Some((name, dir)) => (name.trim(), dir.parse()?),
            None => (s.trim(), SortDirection::Ascending),
        };
        if name.is_empty() {
            return Err(PaginationError::InvalidParameters(format!(
                "empty sort field in '{s}'"
            )));
        }
        Ok(SortField::new(name, direction))
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{}:{}", self.name, dir)
    }
}

/// Normalized, ordered sort specification ending with the primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    fields: Vec<SortField>,
}

impl SortSpec {
    /// Build a spec from the caller's fields.
    ///
    /// With no fields the spec is the primary key alone in `default_direction`.
    /// Otherwise the primary key is appended in `default_direction` unless the
    /// caller declared it. Fields after a declared primary key cannot change
    /// the order and are dropped; any other repeated field is rejected.
    pub fn new(
        fields: Vec<SortField>,
        default_direction: SortDirection,
    ) -> Result<Self, PaginationError> {
        let mut normalized: Vec<SortField> = Vec::with_capacity(fields.len() + 1);
        for field in fields {
            if normalized.iter().any(|f| f.name == field.name) {
                return Err(PaginationError::InvalidParameters(format!(
                    "sort field '{}' given more than once",
                    field.name
                )));
            }
            let is_primary_key = field.name == PRIMARY_KEY;
            normalized.push(field);
            if is_primary_key {
                break;
            }
        }

        if normalized.last().is_none_or(|f| f.name != PRIMARY_KEY) {
            normalized.push(SortField::new(PRIMARY_KEY, default_direction));
        }
        Ok(Self { fields: normalized })
    }

    /// Sort on the primary key only.
    pub fn primary_key(direction: SortDirection) -> Self {
        Self {
            fields: vec![SortField::new(PRIMARY_KEY, direction)],
        }
    }

    pub fn fields(&self) -> &[SortField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// True when the spec is just the primary key.
    pub fn is_primary_key_only(&self) -> bool {
        self.fields.len() == 1
    }

    /// Number of fields the caller declared, excluding the appended tiebreaker.
    pub fn declared_len(&self) -> usize {
        self.fields.len().saturating_sub(1)
    }

    /// Per-field directions used for the actual scan.
    ///
    /// A backward scan inverts every field.
    pub fn effective_directions(&self, backward: bool) -> Vec<SortDirection> {
        self.fields
            .iter()
            .map(|f| {
                if backward {
                    f.direction.reversed()
                } else {
                    f.direction
                }
            })
            .collect()
    }

    /// MongoDB sort document for a forward or backward scan.
    pub fn to_sort_document(&self, backward: bool) -> Document {
        self.fields
            .iter()
            .zip(self.effective_directions(backward))
            .map(|(f, dir)| (f.name.clone(), Bson::Int32(dir.as_order())))
            .collect()
    }
}
