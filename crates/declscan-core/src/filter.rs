//! File filter specification for restricting the analysed source set.
//!
//! Patterns use glob syntax, matched against project-relative paths with
//! forward slashes. Inclusions narrow the set; exclusions are applied after.
//!
//! ## Usage
//!
//! ```
//! use declscan_core::filter::FileFilterSpec;
//! use std::path::Path;
//!
//! let spec = FileFilterSpec::from_parts(&["internal/**"], &[]).unwrap();
//! assert!(spec.matches(Path::new("internal/store/db.go")));
//! assert!(!spec.matches(Path::new("cmd/main.go")));
//! ```

use std::path::{Component, Path};

use globset::{Glob, GlobSet, GlobSetBuilder};
use thiserror::Error;

/// Directory names that are never part of a project's source set.
pub const DEFAULT_EXCLUSIONS: &[&str] = &["vendor", "testdata", "node_modules", "target"];

/// Error type for filter construction.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A glob pattern failed to compile.
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Compiled inclusion/exclusion glob sets.
#[derive(Debug, Clone)]
pub struct FileFilterSpec {
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl FileFilterSpec {
    /// Build a spec from separate inclusion and exclusion lists.
    ///
    /// An empty inclusion list includes everything.
    pub fn from_parts(include: &[&str], exclude: &[&str]) -> Result<Self, FilterError> {
        let include = if include.is_empty() {
            None
        } else {
            Some(build_set(include)?)
        };
        Ok(FileFilterSpec {
            include,
            exclude: build_set(exclude)?,
        })
    }

    /// Check whether a project-relative path passes the filter.
    ///
    /// Default exclusions always apply.
    pub fn matches(&self, rel_path: &Path) -> bool {
        if is_default_excluded(rel_path) {
            return false;
        }
        if let Some(include) = &self.include {
            if !include.is_match(rel_path) {
                return false;
            }
        }
        !self.exclude.is_match(rel_path)
    }
}

fn build_set(patterns: &[&str]) -> Result<GlobSet, FilterError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| FilterError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| FilterError::InvalidPattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

/// Whether any directory component of `rel_path` is excluded by default.
///
/// Dot-prefixed and underscore-prefixed directories are ignored by the Go
/// toolchain, as are the names in [`DEFAULT_EXCLUSIONS`]. The final component
/// (the file name itself) is not checked.
pub fn is_default_excluded(rel_path: &Path) -> bool {
    let components: Vec<Component> = rel_path.components().collect();
    let dirs = components.len().saturating_sub(1);
    components[..dirs].iter().any(|c| match c {
        Component::Normal(name) => is_excluded_dir_name(&name.to_string_lossy()),
        _ => false,
    })
}

/// Whether a single directory name is excluded by default.
pub fn is_excluded_dir_name(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_') || DEFAULT_EXCLUSIONS.contains(&name)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusion_restricts_scope() {
        let spec = FileFilterSpec::from_parts(&["pkg/**"], &[]).unwrap();
        assert!(spec.matches(Path::new("pkg/a/a.go")));
        assert!(!spec.matches(Path::new("cmd/main.go")));
    }

    #[test]
    fn exclusion_removes_matches() {
        let spec = FileFilterSpec::from_parts(&[], &["**/*_gen.go"]).unwrap();
        assert!(spec.matches(Path::new("pkg/a.go")));
        assert!(!spec.matches(Path::new("pkg/model_gen.go")));
    }

    #[test]
    fn exclusion_wins_over_inclusion() {
        let spec = FileFilterSpec::from_parts(&["pkg/**"], &["pkg/legacy/**"]).unwrap();
        assert!(spec.matches(Path::new("pkg/new/a.go")));
        assert!(!spec.matches(Path::new("pkg/legacy/a.go")));
    }

    #[test]
    fn default_exclusions_always_apply() {
        let spec = FileFilterSpec::from_parts(&[], &[]).unwrap();
        assert!(spec.matches(Path::new("main.go")));
        assert!(!spec.matches(Path::new("vendor/x/y.go")));
        assert!(!spec.matches(Path::new(".git/hooks/x.go")));
        assert!(!spec.matches(Path::new("pkg/testdata/in.go")));
        assert!(!spec.matches(Path::new("_examples/demo.go")));
    }

    #[test]
    fn excluded_dir_names() {
        assert!(is_excluded_dir_name(".git"));
        assert!(is_excluded_dir_name("vendor"));
        assert!(!is_excluded_dir_name("pkg"));
    }

    #[test]
    fn file_name_itself_is_not_default_excluded() {
        assert!(!is_default_excluded(Path::new("_private.go")));
        assert!(!is_default_excluded(Path::new("pkg/.hidden.go")));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = FileFilterSpec::from_parts(&["pkg/["], &[]).unwrap_err();
        assert!(err.to_string().contains("pkg/["));
    }
}
