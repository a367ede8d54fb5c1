use std::{fmt, io};

/// Crate-wide `Result` type using [`PaginationError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, PaginationError>;

/// Top-level error type for pagination operations.
///
/// Every failure aborts the call: there is no partial page.
#[derive(Debug)]
pub enum PaginationError {
    /// A supplied page token could not be used (malformed or stale).
    Cursor(CursorError),

    /// The requested page size is not at least 1.
    InvalidLimit(i64),

    /// Sort fields, operators and cursor values disagree in length.
    InvalidCursorShape(String),

    /// A comparison operator other than `$gt` / `$lt` was supplied.
    InvalidComparisonOperator(String),

    /// A sort field is not declared by the record type's schema.
    PaginatedFieldNotFound(String),

    /// A record returned by the store lacks a required sort field.
    MissingPaginatedField { field: String, boundary: Boundary },

    /// A page token could not be serialized.
    CursorEncode(String),

    /// MongoDB driver errors, propagated unchanged.
    MongoDb(mongodb::error::Error),

    /// Configuration errors.
    Config(ConfigError),

    /// Invalid command-line or request parameters.
    InvalidParameters(String),

    /// I/O errors.
    Io(io::Error),
}

/// Which of the two incoming tokens was being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Next,
    Previous,
}

/// Which page boundary a token was being generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// First record of the page, source of the `previous` token.
    First,
    /// Last record of the page, source of the `next` token.
    Last,
}

/// Error raised for a bad or stale page token.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorError {
    pub token: TokenKind,
    pub fault: CursorFault,
}

/// What is wrong with a page token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorFault {
    /// Not valid base64url, or not a BSON document.
    Malformed(String),

    /// Decoded fine but was issued for a sort spec of a different arity.
    Arity { expected: usize, found: usize },

    /// Right arity, but issued for different sort fields.
    FieldMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

impl PaginationError {
    /// Whether the failure is caused by caller input rather than the store.
    ///
    /// HTTP layers map these to a 4xx response.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PaginationError::Cursor(_)
                | PaginationError::InvalidLimit(_)
                | PaginationError::InvalidCursorShape(_)
                | PaginationError::InvalidComparisonOperator(_)
                | PaginationError::InvalidParameters(_)
        )
    }

    /// Returns the cursor error if this is one.
    pub fn as_cursor_error(&self) -> Option<&CursorError> {
        match self {
            PaginationError::Cursor(e) => Some(e),
            _ => None,
        }
    }
}

impl CursorError {
    pub fn new(token: TokenKind, fault: CursorFault) -> Self {
        Self { token, fault }
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for PaginationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationError::Cursor(e) => write!(f, "{e}"),
            PaginationError::InvalidLimit(limit) => {
                write!(f, "a limit of at least 1 is required, got {limit}")
            }
            PaginationError::InvalidCursorShape(msg) => write!(f, "Invalid cursor shape: {msg}"),
            PaginationError::InvalidComparisonOperator(op) => write!(
                f,
                "invalid comparison operator specified: only $lt and $gt are allowed, got '{op}'"
            ),
            PaginationError::PaginatedFieldNotFound(field) => {
                write!(f, "paginated field {field} not found")
            }
            PaginationError::MissingPaginatedField { field, boundary } => write!(
                f,
                "could not create a {boundary} cursor: record has no value for paginated field {field}"
            ),
            PaginationError::CursorEncode(msg) => write!(f, "failed to encode cursor: {msg}"),
            PaginationError::MongoDb(e) => write!(f, "MongoDB error: {e}"),
            PaginationError::Config(e) => write!(f, "Configuration error: {e}"),
            PaginationError::InvalidParameters(msg) => write!(f, "Invalid parameters: {msg}"),
            PaginationError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Next => write!(f, "next"),
            TokenKind::Previous => write!(f, "previous"),
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::First => write!(f, "previous"),
            Boundary::Last => write!(f, "next"),
        }
    }
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cursor parse failed: {}", self.token, self.fault)
    }
}

impl fmt::Display for CursorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorFault::Malformed(msg) => write!(f, "{msg}"),
            CursorFault::Arity { expected: 1, .. } => {
                write!(f, "expecting a cursor with a single element")
            }
            CursorFault::Arity { expected, .. } => {
                write!(f, "expecting a cursor with {expected} elements")
            }
            CursorFault::FieldMismatch { expected, found } => write!(
                f,
                "cursor was issued for fields ({}), expecting ({})",
                found.join(", "),
                expected.join(", ")
            ),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for PaginationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaginationError::Cursor(e) => Some(e),
            PaginationError::MongoDb(e) => Some(e),
            PaginationError::Config(e) => Some(e),
            PaginationError::Io(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for CursorError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to PaginationError ========================= */

impl From<CursorError> for PaginationError {
    fn from(err: CursorError) -> Self {
        PaginationError::Cursor(err)
    }
}

impl From<mongodb::error::Error> for PaginationError {
    fn from(err: mongodb::error::Error) -> Self {
        PaginationError::MongoDb(err)
    }
}

impl From<ConfigError> for PaginationError {
    fn from(err: ConfigError) -> Self {
        PaginationError::Config(err)
    }
}

impl From<io::Error> for PaginationError {
    fn from(err: io::Error) -> Self {
        PaginationError::Io(err)
    }
}
