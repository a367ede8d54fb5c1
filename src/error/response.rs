use serde::{Deserialize, Serialize};

use super::kinds::{CursorFault, PaginationError};

/// Structured error information for a failed pagination call.
///
/// Serialized to JSON by the CLI and intended for HTTP layers that want to
/// hand the caller something more useful than a bare message.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(rename = "type")]
    pub(crate) error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    pub(crate) message: String,
    /// True when the caller should fix its request rather than retry.
    pub(crate) client_error: bool,
}

impl ErrorInfo {
    /// Build error info from any pagination error.
    pub fn from_error(error: &PaginationError) -> Self {
        let mut info = ErrorInfo {
            error_type: error_type(error).to_string(),
            message: error.to_string(),
            client_error: error.is_client_error(),
            ..ErrorInfo::default()
        };

        if let PaginationError::MongoDb(err) = error {
            if let mongodb::error::ErrorKind::Command(command_error) = err.kind.as_ref() {
                info.code = Some(command_error.code);
                info.name = get_error_name(command_error.code);
                info.message = command_error.message.clone();
            }
        }

        info
    }

    /// Error type tag, e.g. `pagination.cursor_error`.
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    /// Convert error info to pretty-printed JSON wrapped in an `error` field.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&serde_json::json!({ "error": self }))
    }
}

fn error_type(error: &PaginationError) -> &'static str {
    match error {
        PaginationError::Cursor(e) => match e.fault {
            CursorFault::Malformed(_) => "pagination.cursor_error",
            CursorFault::Arity { .. } | CursorFault::FieldMismatch { .. } => {
                "pagination.stale_cursor"
            }
        },
        PaginationError::InvalidLimit(_) => "pagination.invalid_limit",
        PaginationError::InvalidCursorShape(_) => "pagination.invalid_cursor_shape",
        PaginationError::InvalidComparisonOperator(_) => "pagination.invalid_comparison_operator",
        PaginationError::PaginatedFieldNotFound(_) => "pagination.paginated_field_not_found",
        PaginationError::MissingPaginatedField { .. } => "pagination.missing_paginated_field",
        PaginationError::CursorEncode(_) => "pagination.cursor_encode_error",
        PaginationError::MongoDb(_) => "mongo.error",
        PaginationError::Config(_) => "config.error",
        PaginationError::InvalidParameters(_) => "request.invalid_parameters",
        PaginationError::Io(_) => "io.error",
    }
}

/// Server error codes a paginated find or count can realistically hit.
fn get_error_name(code: i32) -> Option<String> {
    let name = match code {
        2 => "BadValue",
        13 => "Unauthorized",
        26 => "NamespaceNotFound",
        50 => "MaxTimeMSExpired",
        96 => "OperationFailed",
        292 => "QueryExceededMemoryLimitNoDiskUseAllowed",
        _ => return None,
    };

    Some(name.to_string())
}
