//! Source inventory: one walk over the project root.
//!
//! This module discovers everything the symbol model needs from disk:
//! - The module descriptor (`go.mod`) at the project root
//! - Every `.go` source file, with its project-relative directory
//! - Deterministic ordering (sorted by relative path)
//!
//! Subdirectories that carry their own `go.mod` are separate modules and are
//! left out of the inventory.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::ProjectConfig;
use crate::filter::{is_excluded_dir_name, FilterError};

/// File name of the module descriptor.
pub const MODULE_DESCRIPTOR: &str = "go.mod";

/// Extension of source files.
pub const SOURCE_EXTENSION: &str = "go";

// ============================================================================
// Error Types
// ============================================================================

/// Error type for source discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No module descriptor anywhere under the root.
    #[error("no {MODULE_DESCRIPTOR} found under {}", root.display())]
    MissingDescriptor { root: PathBuf },

    /// A module descriptor exists, but not at the project root.
    #[error("{MODULE_DESCRIPTOR} at {} is not at the project root {}", found.display(), root.display())]
    MisplacedDescriptor { root: PathBuf, found: PathBuf },

    /// A configured glob pattern does not compile.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Walking the directory tree failed.
    #[error("walk error at {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },

    /// Reading file metadata failed.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

// ============================================================================
// Source File
// ============================================================================

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// Absolute path.
    pub path: PathBuf,
    /// File name (last path component).
    pub file_name: String,
    /// Path relative to the project root, forward slashes.
    pub rel_path: String,
    /// Directory relative to the project root, forward slashes; empty for the root.
    pub rel_dir: String,
    /// File size in bytes.
    pub size_bytes: u64,
}

impl SourceFile {
    /// Whether this is a `_test.go` file.
    pub fn is_test(&self) -> bool {
        is_test_file(&self.file_name)
    }
}

/// Whether a file name denotes a test source.
pub fn is_test_file(file_name: &str) -> bool {
    file_name.ends_with("_test.go")
}

// ============================================================================
// Source Inventory
// ============================================================================

/// The module descriptor plus all source files of one project.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInventory {
    /// Project root (absolute, canonical).
    pub root: PathBuf,
    /// Absolute path of the root module descriptor.
    pub module_file: PathBuf,
    /// Source files sorted by relative path.
    sources: Vec<SourceFile>,
}

impl SourceInventory {
    /// Walk `root` once and collect the module descriptor and source files.
    pub fn discover(root: &Path, config: &ProjectConfig) -> DiscoveryResult<Self> {
        let root = root.canonicalize().map_err(|source| DiscoveryError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let filter = config.filter()?;

        let mut module_file = None;
        let mut nested_modules: Vec<String> = Vec::new();
        let mut sources = Vec::new();

        let walker = WalkDir::new(&root)
            .follow_links(config.follow_symlinks)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !is_excluded_dir_name(&e.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = entry.map_err(|e| DiscoveryError::Walk {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone()),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let full_path = entry.path();
            let Ok(rel_path) = full_path.strip_prefix(&root) else {
                continue;
            };
            let file_name = entry.file_name().to_string_lossy().to_string();
            let rel_str = to_forward_slashes(rel_path);
            let rel_dir = rel_path
                .parent()
                .map(to_forward_slashes)
                .unwrap_or_default();

            if file_name == MODULE_DESCRIPTOR {
                if rel_dir.is_empty() {
                    module_file = Some(full_path.to_path_buf());
                } else {
                    nested_modules.push(rel_dir);
                }
                continue;
            }

            if full_path.extension().is_none_or(|ext| ext != SOURCE_EXTENSION) {
                continue;
            }
            if is_test_file(&file_name) && !config.include_tests {
                continue;
            }
            if !filter.matches(rel_path) {
                continue;
            }

            let metadata = fs::metadata(full_path).map_err(|source| DiscoveryError::Io {
                path: full_path.to_path_buf(),
                source,
            })?;
            if let Some(max_size) = config.max_file_size {
                if metadata.len() > max_size {
                    tracing::warn!(
                        "skipping {} ({} bytes exceeds max_file_size {})",
                        rel_str,
                        metadata.len(),
                        max_size
                    );
                    continue;
                }
            }

            sources.push(SourceFile {
                path: full_path.to_path_buf(),
                file_name,
                rel_path: rel_str,
                rel_dir,
                size_bytes: metadata.len(),
            });
        }

        let module_file = match module_file {
            Some(path) => path,
            None => {
                return Err(match nested_modules.first() {
                    Some(dir) => DiscoveryError::MisplacedDescriptor {
                        found: root.join(dir).join(MODULE_DESCRIPTOR),
                        root,
                    },
                    None => DiscoveryError::MissingDescriptor { root },
                });
            }
        };

        // Nested modules own their subtrees.
        sources.retain(|s| {
            !nested_modules
                .iter()
                .any(|dir| s.rel_dir == *dir || s.rel_dir.starts_with(&format!("{dir}/")))
        });
        if !nested_modules.is_empty() {
            tracing::debug!("skipped nested modules: {}", nested_modules.join(", "));
        }

        sources.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

        tracing::info!(
            "discovered {} source files under {}",
            sources.len(),
            root.display()
        );

        Ok(SourceInventory {
            root,
            module_file,
            sources,
        })
    }

    /// All source files in deterministic order.
    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    /// Source files grouped by relative directory, each group sorted by file name.
    pub fn by_directory(&self) -> BTreeMap<&str, Vec<&SourceFile>> {
        let mut dirs: BTreeMap<&str, Vec<&SourceFile>> = BTreeMap::new();
        for source in &self.sources {
            dirs.entry(source.rel_dir.as_str()).or_default().push(source);
        }
        for files in dirs.values_mut() {
            files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        }
        dirs
    }

    /// Number of discovered source files.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no source files were discovered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn create_test_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "go.mod", "module example.com/m\n");
        write(root, "main.go", "package main\n");
        write(root, "pkg/util/b.go", "package util\n");
        write(root, "pkg/util/a.go", "package util\n");
        write(root, "pkg/util/a_test.go", "package util\n");
        write(root, "vendor/x/x.go", "package x\n");
        write(root, ".hidden/h.go", "package h\n");
        write(root, "README.md", "# readme\n");
        dir
    }

    fn rel_paths(inventory: &SourceInventory) -> Vec<&str> {
        inventory
            .sources()
            .iter()
            .map(|s| s.rel_path.as_str())
            .collect()
    }

    #[test]
    fn discovers_sources_in_sorted_order() {
        let project = create_test_project();
        let inventory =
            SourceInventory::discover(project.path(), &ProjectConfig::default()).unwrap();
        assert_eq!(
            rel_paths(&inventory),
            vec!["main.go", "pkg/util/a.go", "pkg/util/b.go"]
        );
        assert!(inventory.module_file.ends_with("go.mod"));
    }

    #[test]
    fn test_files_are_opt_in() {
        let project = create_test_project();
        let config = ProjectConfig {
            include_tests: true,
            ..Default::default()
        };
        let inventory = SourceInventory::discover(project.path(), &config).unwrap();
        assert!(rel_paths(&inventory).contains(&"pkg/util/a_test.go"));
        assert!(inventory
            .sources()
            .iter()
            .any(|s| s.is_test() && s.file_name == "a_test.go"));
    }

    #[test]
    fn relative_dirs_use_forward_slashes() {
        let project = create_test_project();
        let inventory =
            SourceInventory::discover(project.path(), &ProjectConfig::default()).unwrap();
        let dirs: Vec<&str> = inventory.by_directory().keys().copied().collect();
        assert_eq!(dirs, vec!["", "pkg/util"]);
    }

    #[test]
    fn exclude_patterns_apply() {
        let project = create_test_project();
        let config = ProjectConfig {
            exclude: vec!["pkg/**".to_string()],
            ..Default::default()
        };
        let inventory = SourceInventory::discover(project.path(), &config).unwrap();
        assert_eq!(rel_paths(&inventory), vec!["main.go"]);
    }

    #[test]
    fn max_file_size_skips_large_files() {
        let project = create_test_project();
        write(project.path(), "big.go", &format!("package main\n{}", "//x\n".repeat(100)));
        let config = ProjectConfig {
            max_file_size: Some(64),
            ..Default::default()
        };
        let inventory = SourceInventory::discover(project.path(), &config).unwrap();
        assert!(!rel_paths(&inventory).contains(&"big.go"));
    }

    #[test]
    fn missing_descriptor_is_reported() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "main.go", "package main\n");
        let err = SourceInventory::discover(dir.path(), &ProjectConfig::default()).unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingDescriptor { .. }));
    }

    #[test]
    fn misplaced_descriptor_is_reported() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "sub/go.mod", "module example.com/sub\n");
        write(dir.path(), "sub/a.go", "package sub\n");
        let err = SourceInventory::discover(dir.path(), &ProjectConfig::default()).unwrap_err();
        assert!(matches!(err, DiscoveryError::MisplacedDescriptor { .. }));
    }

    #[test]
    fn nested_modules_are_skipped() {
        let project = create_test_project();
        write(project.path(), "tools/go.mod", "module example.com/tools\n");
        write(project.path(), "tools/gen/gen.go", "package gen\n");
        let inventory =
            SourceInventory::discover(project.path(), &ProjectConfig::default()).unwrap();
        assert!(!rel_paths(&inventory).iter().any(|p| p.starts_with("tools/")));
    }
}
