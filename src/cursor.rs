//! Opaque page tokens
//!
//! A token is the ordered list of sort-key values of a page boundary record,
//! serialized as a BSON document and encoded as unpadded base64url. BSON keeps
//! both the field order and the value types (ObjectId, DateTime, Int64, ...),
//! so a decoded token compares exactly like the record it came from.
//!
//! The encoding scheme is part of the public contract: tokens issued by one
//! deployment must decode in the next one.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bson::{Bson, Document};

use crate::error::{CursorFault, PaginationError, Result};

/// Ordered (field, value) pairs describing a page boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorToken {
    pairs: Document,
}

impl CursorToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, keeping insertion order.
    pub fn push(&mut self, field: impl Into<String>, value: impl Into<Bson>) {
        self.pairs.insert(field, value);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Bson)> {
        self.pairs.iter()
    }

    pub fn get(&self, field: &str) -> Option<&Bson> {
        self.pairs.get(field)
    }

    /// Values in order, checked against the sort fields the caller is
    /// paginating with.
    ///
    /// A mismatch means the token was issued for another sort spec.
    pub fn values_for(&self, fields: &[String]) -> std::result::Result<Vec<Bson>, CursorFault> {
        if self.pairs.len() != fields.len() {
            return Err(CursorFault::Arity {
                expected: fields.len(),
                found: self.pairs.len(),
            });
        }
        if !self.pairs.keys().eq(fields.iter()) {
            return Err(CursorFault::FieldMismatch {
                expected: fields.to_vec(),
                found: self.pairs.keys().cloned().collect(),
            });
        }
        Ok(self.pairs.values().cloned().collect())
    }

    pub fn into_document(self) -> Document {
        self.pairs
    }
}

impl From<Document> for CursorToken {
    fn from(pairs: Document) -> Self {
        Self { pairs }
    }
}

impl FromIterator<(String, Bson)> for CursorToken {
    fn from_iter<I: IntoIterator<Item = (String, Bson)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// Why a token string could not be decoded.
#[derive(Debug)]
pub enum DecodeError {
    Base64(base64::DecodeError),
    Bson(bson::de::Error),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Base64(e) => write!(f, "invalid base64 cursor: {e}"),
            DecodeError::Bson(e) => write!(f, "invalid cursor payload: {e}"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<DecodeError> for CursorFault {
    fn from(err: DecodeError) -> Self {
        CursorFault::Malformed(err.to_string())
    }
}

/// Encode a token into a URL-safe string.
pub fn encode(token: &CursorToken) -> Result<String> {
    let bytes =
        bson::to_vec(&token.pairs).map_err(|e| PaginationError::CursorEncode(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Decode a token previously produced by [`encode`].
pub fn decode(token: &str) -> std::result::Result<CursorToken, DecodeError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(DecodeError::Base64)?;
    let pairs: Document = bson::from_slice(&bytes).map_err(DecodeError::Bson)?;
    Ok(CursorToken { pairs })
}
