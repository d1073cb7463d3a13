//! Error types and error code constants for declscan.
//!
//! This module provides a unified error type (`DeclscanError`) that bridges
//! domain-specific errors from the different subsystems (discovery, config,
//! scanning, the symbol model) into a common format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (entity not found, ambiguous package)
//! - `4`: Configuration errors (module descriptor missing or unusable)
//! - `5`: Structural errors (project layout rules violated)
//! - `6`: Scan errors (unbalanced delimiters, missing function body)
//! - `10`: Internal errors (I/O failures, unexpected state)
//!
//! ## Design
//!
//! - **Unified type**: `DeclscanError` is the single error type for CLI output
//! - **Bridging**: `impl From<X> for DeclscanError` bridges domain errors
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes for JSON

use std::fmt;

use thiserror::Error;

pub use crate::types::Location;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (entity not found, ambiguous package).
    ResolutionError = 3,
    /// Configuration errors (module descriptor missing or invalid).
    ConfigurationError = 4,
    /// Structural errors (layout rules violated).
    StructuralError = 5,
    /// Scan errors (malformed source text).
    ScanError = 6,
    /// Internal errors (I/O, bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
///
/// All subsystem errors are converted to this type before being rendered
/// as JSON output.
#[derive(Debug, Error)]
pub enum DeclscanError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// A named entity does not exist.
    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    /// A bare package name matches more than one directory.
    #[error("ambiguous package '{name}', candidates: {}", candidates.join(", "))]
    AmbiguousPackage {
        name: String,
        candidates: Vec<String>,
    },

    /// The module descriptor is missing or unusable.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The project layout violates a structural rule.
    #[error("structural error: {message}")]
    Structural { message: String },

    /// A source file could not be scanned.
    #[error("scan error at {location}: {message}")]
    Scan { location: Location, message: String },

    /// Reading a file or directory failed.
    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&DeclscanError> for OutputErrorCode {
    fn from(err: &DeclscanError) -> Self {
        match err {
            DeclscanError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            DeclscanError::NotFound { .. } => OutputErrorCode::ResolutionError,
            DeclscanError::AmbiguousPackage { .. } => OutputErrorCode::ResolutionError,
            DeclscanError::Configuration { .. } => OutputErrorCode::ConfigurationError,
            DeclscanError::Structural { .. } => OutputErrorCode::StructuralError,
            DeclscanError::Scan { .. } => OutputErrorCode::ScanError,
            DeclscanError::Io { .. } => OutputErrorCode::InternalError,
            DeclscanError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<DeclscanError> for OutputErrorCode {
    fn from(err: DeclscanError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges: core errors -> DeclscanError
// ============================================================================

impl From<crate::workspace::DiscoveryError> for DeclscanError {
    fn from(err: crate::workspace::DiscoveryError) -> Self {
        use crate::workspace::DiscoveryError;
        match err {
            DiscoveryError::MissingDescriptor { root } => DeclscanError::Configuration {
                message: format!("no go.mod found under {}", root.display()),
            },
            DiscoveryError::MisplacedDescriptor { root, found } => DeclscanError::Structural {
                message: format!(
                    "go.mod found at {} but not at project root {}",
                    found.display(),
                    root.display()
                ),
            },
            DiscoveryError::Filter(filter_err) => DeclscanError::InvalidArguments {
                message: filter_err.to_string(),
            },
            DiscoveryError::Walk { path, message } => DeclscanError::Io {
                path: path.display().to_string(),
                message,
            },
            DiscoveryError::Io { path, source } => DeclscanError::Io {
                path: path.display().to_string(),
                message: source.to_string(),
            },
        }
    }
}

impl From<crate::config::ConfigError> for DeclscanError {
    fn from(err: crate::config::ConfigError) -> Self {
        DeclscanError::Configuration {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl DeclscanError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        DeclscanError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a not-found error for an entity kind and name.
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        DeclscanError::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        DeclscanError::Internal {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }

    /// Whether the caller may recover from this error and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DeclscanError::NotFound { .. } | DeclscanError::AmbiguousPackage { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn not_found_maps_to_resolution_error() {
            let err = DeclscanError::not_found("struct", "Widget");
            assert_eq!(
                OutputErrorCode::from(&err),
                OutputErrorCode::ResolutionError
            );
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn configuration_maps_to_configuration_error() {
            let err = DeclscanError::Configuration {
                message: "no module directive".to_string(),
            };
            assert_eq!(err.error_code().code(), 4);
        }

        #[test]
        fn structural_maps_to_structural_error() {
            let err = DeclscanError::Structural {
                message: "mixed package clauses".to_string(),
            };
            assert_eq!(err.error_code(), OutputErrorCode::StructuralError);
        }

        #[test]
        fn scan_maps_to_scan_error() {
            let err = DeclscanError::Scan {
                location: Location::new("a.go", 3, 7),
                message: "unbalanced '('".to_string(),
            };
            assert_eq!(err.error_code().code(), 6);
        }

        #[test]
        fn io_maps_to_internal_error() {
            let err = DeclscanError::Io {
                path: "a.go".to_string(),
                message: "permission denied".to_string(),
            };
            assert_eq!(err.error_code(), OutputErrorCode::InternalError);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn not_found_display() {
            let err = DeclscanError::not_found("function", "DoesNotExist");
            assert_eq!(err.to_string(), "function not found: DoesNotExist");
        }

        #[test]
        fn ambiguous_package_display() {
            let err = DeclscanError::AmbiguousPackage {
                name: "util".to_string(),
                candidates: vec!["m/a/util".to_string(), "m/b/util".to_string()],
            };
            assert_eq!(
                err.to_string(),
                "ambiguous package 'util', candidates: m/a/util, m/b/util"
            );
        }

        #[test]
        fn scan_display_includes_location() {
            let err = DeclscanError::Scan {
                location: Location::new("pkg/a.go", 12, 4),
                message: "missing body".to_string(),
            };
            assert_eq!(err.to_string(), "scan error at pkg/a.go:12:4: missing body");
        }
    }

    mod recoverability {
        use super::*;

        #[test]
        fn lookups_are_recoverable() {
            assert!(DeclscanError::not_found("struct", "X").is_recoverable());
            assert!(DeclscanError::AmbiguousPackage {
                name: "x".to_string(),
                candidates: vec![],
            }
            .is_recoverable());
        }

        #[test]
        fn fatal_errors_are_not_recoverable() {
            assert!(!DeclscanError::internal("boom").is_recoverable());
            assert!(!DeclscanError::Structural {
                message: "x".to_string()
            }
            .is_recoverable());
        }
    }
}
