//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Structured JSON:** All CLI output is valid JSON
//! 2. **Status first:** Every response has `status` as first field
//! 3. **Deterministic:** Same input -> same output (field order, array ordering)
//! 4. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{DeclscanError, OutputErrorCode};

pub use crate::types::Location;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Success Envelope
// ============================================================================

/// Successful response wrapping a command-specific payload.
///
/// The payload's fields are flattened next to `status` and `schema_version`.
#[derive(Debug, Clone, Serialize)]
pub struct OkResponse<T: Serialize> {
    /// Status: "ok".
    pub status: &'static str,
    /// Schema version for compatibility.
    pub schema_version: &'static str,
    /// Command that produced the response.
    pub command: String,
    /// Command-specific payload.
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> OkResponse<T> {
    /// Wrap a payload.
    pub fn new(command: impl Into<String>, payload: T) -> Self {
        OkResponse {
            status: "ok",
            schema_version: SCHEMA_VERSION,
            command: command.into(),
            payload,
        }
    }
}

// ============================================================================
// Error Envelope
// ============================================================================

/// Error information for JSON output.
///
/// - `code`: Numeric error code (required)
/// - `message`: Human-readable message (required)
/// - `details`: Error-specific structured data (optional)
/// - `location`: Where the error occurred (optional)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Where the error occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ErrorInfo {
    /// Create from a DeclscanError.
    pub fn from_error(err: &DeclscanError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();

        let (details, location) = match err {
            DeclscanError::Scan { location, .. } => (None, Some(location.clone())),
            DeclscanError::AmbiguousPackage { candidates, .. } => (
                Some(serde_json::json!({ "candidates": candidates })),
                None,
            ),
            DeclscanError::NotFound { kind, name } => (
                Some(serde_json::json!({ "kind": kind, "name": name })),
                None,
            ),
            _ => (None, None),
        };

        ErrorInfo {
            code,
            message,
            details,
            location,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a DeclscanError.
    pub fn from_error(err: &DeclscanError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
///
/// This is the single output path for the CLI.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
