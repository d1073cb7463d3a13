//! Hierarchical, lazily populated symbol model.
//!
//! ```text
//! Project ─┬─ Package ─┬─ File
//!          │           ├─ Struct ─┬─ Member
//!          │           │          └─ Method
//!          │           ├─ Interface
//!          │           └─ Function
//! ```
//!
//! Packages and files are created when the project loads. Everything below a
//! package is created on the first successful `search_*` call and kept for
//! the life of the project. There is no invalidation: if sources change,
//! load a new [`Project`].
//!
//! Each lookup map is a [`Memo`]: a mutex-guarded cache that remembers how
//! many files it has already scanned, so a miss never re-reads a file and a
//! hit returns the same `Arc` every time.

mod cache;
mod entity;
mod file;
mod info;
mod package;
mod project;

use std::fmt;
use std::io;
use std::path::PathBuf;

use declscan_core::config::ConfigError;
use declscan_core::workspace::DiscoveryError;
use serde::Serialize;
use thiserror::Error;

use crate::module::ModuleError;
use crate::scope::ScanError;

pub use cache::Memo;
pub use entity::{Function, Interface, Method, Struct};
pub use file::File;
pub use info::{
    FunctionInfo, Introspect, InterfaceInfo, PackageInfo, ProjectDump, StructInfo, VariableInfo,
};
pub use package::{Package, SourceSet};
pub use project::Project;

// ============================================================================
// Entity Kinds
// ============================================================================

/// Kinds of entity a search can miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Package,
    Struct,
    Interface,
    Function,
    Method,
    Member,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Package => "package",
            EntityKind::Struct => "struct",
            EntityKind::Interface => "interface",
            EntityKind::Function => "function",
            EntityKind::Method => "method",
            EntityKind::Member => "member",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error type for the symbol model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A search found nothing. Recoverable; the cache stays usable.
    #[error("{kind} not found: {name}")]
    NotFound { kind: EntityKind, name: String },

    /// A bare package name matches several directories.
    #[error("ambiguous package '{name}', candidates: {}", candidates.join(", "))]
    AmbiguousPackage {
        name: String,
        candidates: Vec<String>,
    },

    /// A file could not be scanned.
    #[error("{path}:{line}:{col}: {source}")]
    Scan {
        path: String,
        line: u32,
        col: u32,
        #[source]
        source: ScanError,
    },

    /// A source file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The project layout breaks a rule.
    #[error("{message}")]
    Structural { message: String },

    /// The module name is unusable.
    #[error("{message}")]
    Configuration { message: String },

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for symbol model operations.
pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        ModelError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Whether the run can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ModelError::NotFound { .. } | ModelError::AmbiguousPackage { .. }
        )
    }
}
