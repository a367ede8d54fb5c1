//! Record field access
//!
//! The driver never introspects record types at runtime. Instead a record
//! type implements [`FieldAccessor`]: it resolves a logical field name to a
//! BSON value and may publish a static [`RecordSchema`] so that sort fields
//! can be validated before any query runs.

use mongodb::bson::{self, Bson, Document, RawDocumentBuf};
use serde::Serialize;

use crate::cursor::CursorToken;
use crate::error::{Boundary, PaginationError, Result};
use crate::sort::PRIMARY_KEY;

/// One entry of a static record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaField {
    /// A field stored at the top level of the document.
    Named(&'static str),
    /// A sub-structure whose fields are stored inline at the top level
    /// (`#[serde(flatten)]`).
    Inline(&'static [&'static str]),
}

/// Static description of the fields a record type stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSchema {
    /// Shape unknown at compile time; sort fields are checked lazily.
    Opaque,
    Fields(&'static [SchemaField]),
}

impl RecordSchema {
    /// Whether `name` is declared, either directly or by an inline group.
    pub fn declares(&self, name: &str) -> bool {
        match self {
            RecordSchema::Opaque => true,
            RecordSchema::Fields(fields) => fields.iter().any(|field| match field {
                SchemaField::Named(n) => *n == name,
                SchemaField::Inline(inner) => inner.contains(&name),
            }),
        }
    }

    /// Check every sort field against the schema.
    pub fn validate(&self, sort_fields: &[String]) -> Result<()> {
        match sort_fields.iter().find(|f| !self.declares(f)) {
            Some(missing) => Err(PaginationError::PaginatedFieldNotFound(missing.clone())),
            None => Ok(()),
        }
    }
}

/// Read access to a record's fields by logical name.
pub trait FieldAccessor {
    /// Static schema of the record type.
    fn record_schema() -> RecordSchema
    where
        Self: Sized,
    {
        RecordSchema::Opaque
    }

    /// Value of the named field, or `None` when absent.
    fn field_value(&self, name: &str) -> Option<Bson>;
}

impl FieldAccessor for Document {
    /// Dotted names are resolved through embedded documents.
    fn field_value(&self, name: &str) -> Option<Bson> {
        if let Some(value) = self.get(name) {
            return Some(value.clone());
        }
        let (head, rest) = name.split_once('.')?;
        match self.get(head)? {
            Bson::Document(inner) => inner.field_value(rest),
            _ => None,
        }
    }
}

impl FieldAccessor for RawDocumentBuf {
    fn field_value(&self, name: &str) -> Option<Bson> {
        if let Ok(Some(value)) = self.get(name) {
            return Bson::try_from(value.to_raw_bson()).ok();
        }
        let (head, rest) = name.split_once('.')?;
        let inner = self.get_document(head).ok()?;
        inner.to_raw_document_buf().field_value(rest)
    }
}

impl<T: FieldAccessor> FieldAccessor for Box<T> {
    fn record_schema() -> RecordSchema {
        T::record_schema()
    }

    fn field_value(&self, name: &str) -> Option<Bson> {
        (**self).field_value(name)
    }
}

/// Resolve a field by serializing the record to BSON first.
///
/// Lets serde-derived structs implement [`FieldAccessor::field_value`] in one
/// line; `#[serde(flatten)]` sub-structures land at the top level.
pub fn serialized_field_value<T: Serialize>(record: &T, name: &str) -> Option<Bson> {
    bson::to_document(record).ok()?.field_value(name)
}

/// Build the page token for one boundary record.
///
/// Present, non-null values are taken in sort order. An absent optional
/// field is skipped; an absent primary key, or an absent sole sort field,
/// is an error.
pub fn extract_cursor<T: FieldAccessor>(
    record: &T,
    fields: &[String],
    boundary: Boundary,
) -> Result<CursorToken> {
    let sole_declared = fields.len() <= 2;
    let mut token = CursorToken::new();

    for (i, field) in fields.iter().enumerate() {
        match record.field_value(field) {
            Some(Bson::Null) | None => {
                let required = field == PRIMARY_KEY || (sole_declared && i == 0);
                if required {
                    return Err(PaginationError::MissingPaginatedField {
                        field: field.clone(),
                        boundary,
                    });
                }
            }
            Some(value) => token.push(field.clone(), value),
        }
    }

    Ok(token)
}
