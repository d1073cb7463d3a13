//! Error bridge implementations for Go-scanning errors.
//!
//! These live here rather than in `declscan-core` because the source types
//! belong to this crate; core never sees the symbol model.

use declscan_core::error::{DeclscanError, Location};

use crate::model::ModelError;
use crate::module::ModuleError;
use crate::typeexpr::TypeParseError;

// ============================================================================
// Bridge: ModelError -> DeclscanError
// ============================================================================

impl From<ModelError> for DeclscanError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NotFound { kind, name } => DeclscanError::NotFound {
                kind: kind.to_string(),
                name,
            },
            ModelError::AmbiguousPackage { name, candidates } => {
                DeclscanError::AmbiguousPackage { name, candidates }
            }
            ModelError::Scan {
                path,
                line,
                col,
                source,
            } => DeclscanError::Scan {
                location: Location::new(path, line, col),
                message: source.to_string(),
            },
            ModelError::Io { path, source } => DeclscanError::Io {
                path: path.display().to_string(),
                message: source.to_string(),
            },
            ModelError::Structural { message } => DeclscanError::Structural { message },
            ModelError::Configuration { message } => DeclscanError::Configuration { message },
            ModelError::Discovery(e) => DeclscanError::from(e),
            ModelError::Config(e) => DeclscanError::from(e),
            ModelError::Module(e) => DeclscanError::from(e),
        }
    }
}

// ============================================================================
// Bridge: ModuleError -> DeclscanError
// ============================================================================

impl From<ModuleError> for DeclscanError {
    fn from(err: ModuleError) -> Self {
        DeclscanError::Configuration {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Bridge: TypeParseError -> DeclscanError
// ============================================================================

/// Only reachable from user-supplied type text; scanned files wrap type
/// errors in a `ScanError` instead.
impl From<TypeParseError> for DeclscanError {
    fn from(err: TypeParseError) -> Self {
        DeclscanError::InvalidArguments {
            message: format!("invalid type expression: {err}"),
        }
    }
}
