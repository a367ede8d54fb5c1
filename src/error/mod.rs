//! Error handling module for pagination operations.
//!
//! This module provides:
//! - A typed error taxonomy that separates bad/stale cursors, parameter
//!   validation failures, schema mismatches and store failures
//! - Structured error information for JSON output
//!
//! # Example
//!
//! ```rust
//! use mongo_cursor_pagination::error::{PaginationError, ErrorInfo};
//!
//! fn status_code(err: &PaginationError) -> u16 {
//!     if err.is_client_error() { 400 } else { 500 }
//! }
//!
//! let err = PaginationError::InvalidLimit(0);
//! assert_eq!(status_code(&err), 400);
//! assert_eq!(ErrorInfo::from_error(&err).error_type(), "pagination.invalid_limit");
//! ```

pub mod kinds;
pub mod response;

// Re-export commonly used types
pub use kinds::{
    Boundary, ConfigError, CursorError, CursorFault, PaginationError, Result, TokenKind,
};
pub use response::ErrorInfo;
