//! Project loading and package resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use declscan_core::config::ProjectConfig;
use declscan_core::workspace::SourceInventory;

use super::file::File;
use super::package::{Package, SourceSet};
use super::{EntityKind, ModelError, ModelResult};
use crate::extract::package_name;
use crate::module::load_module_name;
use crate::parser::{SourceParser, TextScanParser};
use crate::patterns::PatternRegistry;

/// Package name every executable uses; exempt from the uniqueness rule.
const MAIN_PACKAGE: &str = "main";

/// Suffix of external test packages, which are not modelled.
const EXTERNAL_TEST_SUFFIX: &str = "_test";

/// The root of the symbol model: one module and its packages.
pub struct Project {
    root: PathBuf,
    module_name: String,
    config: ProjectConfig,
    parser: Arc<dyn SourceParser>,
    packages: BTreeMap<String, Arc<Package>>,
}

/// Files of one directory before the package is built.
struct DirSources {
    rel_dir: String,
    dir: PathBuf,
    files: Vec<Arc<File>>,
}

impl Project {
    /// Load a project from disk with its `declscan.json` and the text-scan parser.
    pub fn load(root: &Path) -> ModelResult<Self> {
        let config = ProjectConfig::load(root)?;
        Self::load_with(root, config, Arc::new(TextScanParser::new()))
    }

    /// Load a project from disk with an explicit configuration and parser.
    pub fn load_with(
        root: &Path,
        config: ProjectConfig,
        parser: Arc<dyn SourceParser>,
    ) -> ModelResult<Self> {
        let inventory = SourceInventory::discover(root, &config)?;
        if inventory.is_empty() {
            tracing::warn!("no source files under {}", inventory.root.display());
        }
        let patterns = PatternRegistry::new();
        let module_name = load_module_name(&patterns, &inventory.module_file)?;

        let dirs = inventory
            .by_directory()
            .into_iter()
            .map(|(rel_dir, sources)| DirSources {
                rel_dir: rel_dir.to_string(),
                dir: inventory.root.join(rel_dir),
                files: sources
                    .into_iter()
                    .map(|s| Arc::new(File::new(&s.file_name, &s.path, &s.rel_path)))
                    .collect(),
            })
            .collect();

        let root = inventory.root.clone();
        Self::assemble(root, module_name, config, parser, &patterns, dirs)
    }

    /// Build a project from in-memory `(relative path, text)` pairs.
    pub fn from_sources(
        module_name: &str,
        sources: &[(&str, &str)],
        parser: Arc<dyn SourceParser>,
    ) -> ModelResult<Self> {
        let root = PathBuf::from(".");
        let mut grouped: BTreeMap<String, Vec<Arc<File>>> = BTreeMap::new();
        for (rel_path, text) in sources {
            let rel_dir = rel_path.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
            grouped
                .entry(rel_dir.to_string())
                .or_default()
                .push(Arc::new(File::from_source(rel_path, text)));
        }
        let dirs = grouped
            .into_iter()
            .map(|(rel_dir, files)| DirSources {
                dir: root.join(&rel_dir),
                rel_dir,
                files,
            })
            .collect();

        let patterns = PatternRegistry::new();
        Self::assemble(
            root,
            module_name.to_string(),
            ProjectConfig::default(),
            parser,
            &patterns,
            dirs,
        )
    }

    fn assemble(
        root: PathBuf,
        module_name: String,
        config: ProjectConfig,
        parser: Arc<dyn SourceParser>,
        patterns: &PatternRegistry,
        dirs: Vec<DirSources>,
    ) -> ModelResult<Self> {
        if module_name.trim().is_empty() {
            return Err(ModelError::Configuration {
                message: "module name is empty".to_string(),
            });
        }

        let mut packages = BTreeMap::new();
        for dir in dirs {
            let Some((name, files)) = package_of(patterns, &dir)? else {
                continue;
            };
            let import_path = if dir.rel_dir.is_empty() {
                module_name.clone()
            } else {
                format!("{}/{}", module_name, dir.rel_dir)
            };
            let sources = SourceSet::new(files, Arc::clone(&parser));
            let package = Package::new(name, dir.dir, dir.rel_dir, import_path.clone(), sources);
            packages.insert(import_path, Arc::new(package));
        }

        if config.unique_package_names {
            check_unique_names(&packages)?;
        }

        tracing::info!(
            "loaded module {} with {} packages ({} parser)",
            module_name,
            packages.len(),
            parser.name()
        );

        Ok(Project {
            root,
            module_name,
            config,
            parser,
            packages,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn parser(&self) -> &dyn SourceParser {
        self.parser.as_ref()
    }

    /// Packages in import-path order.
    pub fn packages(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.packages.values()
    }

    /// Resolve a package by import path, relative directory or package name.
    ///
    /// A package name that several directories declare is ambiguous; the
    /// error lists the candidate import paths.
    pub fn resolve_package(&self, query: &str) -> ModelResult<Arc<Package>> {
        if let Some(package) = self.packages.get(query) {
            return Ok(Arc::clone(package));
        }

        let rel = query.trim_start_matches("./").trim_matches('/');
        let import_path = if rel.is_empty() || rel == "." {
            self.module_name.clone()
        } else {
            format!("{}/{}", self.module_name, rel)
        };
        if let Some(package) = self.packages.get(&import_path) {
            return Ok(Arc::clone(package));
        }

        let matches: Vec<&Arc<Package>> =
            self.packages.values().filter(|p| p.name() == query).collect();
        match matches.as_slice() {
            [] => Err(ModelError::not_found(EntityKind::Package, query)),
            [only] => Ok(Arc::clone(only)),
            many => Err(ModelError::AmbiguousPackage {
                name: query.to_string(),
                candidates: many.iter().map(|p| p.import_path().to_string()).collect(),
            }),
        }
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.root)
            .field("module_name", &self.module_name)
            .field("parser", &self.parser.name())
            .field("packages", &self.packages.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The package a directory declares, with its files.
///
/// External test packages are dropped. Two other package names in one
/// directory break the layout rules.
fn package_of(
    patterns: &PatternRegistry,
    dir: &DirSources,
) -> ModelResult<Option<(String, Vec<Arc<File>>)>> {
    let mut by_name: BTreeMap<String, Vec<Arc<File>>> = BTreeMap::new();
    for file in &dir.files {
        let text = file.source()?;
        let name = package_name(patterns, &text).map_err(|e| file.scan_error(&text, e))?;
        by_name.entry(name).or_default().push(Arc::clone(file));
    }

    by_name.retain(|name, files| {
        let external = name.ends_with(EXTERNAL_TEST_SUFFIX);
        if external {
            tracing::debug!("skipping external test package {} ({} files)", name, files.len());
        }
        !external
    });

    if by_name.len() > 1 {
        let names: Vec<&str> = by_name.keys().map(String::as_str).collect();
        return Err(ModelError::Structural {
            message: format!(
                "directory '{}' declares several packages: {}",
                display_dir(&dir.rel_dir),
                names.join(", ")
            ),
        });
    }
    Ok(by_name.into_iter().next())
}

fn check_unique_names(packages: &BTreeMap<String, Arc<Package>>) -> ModelResult<()> {
    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
    for package in packages.values() {
        if package.name() == MAIN_PACKAGE {
            continue;
        }
        if let Some(previous) = seen.insert(package.name(), package.import_path()) {
            return Err(ModelError::Structural {
                message: format!(
                    "package name '{}' is declared by both {} and {}",
                    package.name(),
                    previous,
                    package.import_path()
                ),
            });
        }
    }
    Ok(())
}

fn display_dir(rel_dir: &str) -> &str {
    if rel_dir.is_empty() {
        "."
    } else {
        rel_dir
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScanError;

    fn parser() -> Arc<dyn SourceParser> {
        Arc::new(TextScanParser::new())
    }

    fn project(sources: &[(&str, &str)]) -> Project {
        Project::from_sources("example.com/app", sources, parser()).unwrap()
    }

    mod assembly {
        use super::*;

        #[test]
        fn import_paths_join_module_and_directory() {
            let p = project(&[
                ("main.go", "package main\n"),
                ("internal/store/store.go", "package store\n"),
            ]);
            let paths: Vec<&str> = p.packages().map(|p| p.import_path()).collect();
            assert_eq!(paths, ["example.com/app", "example.com/app/internal/store"]);
        }

        #[test]
        fn external_test_packages_are_skipped() {
            let p = project(&[
                ("kv/kv.go", "package kv\n"),
                ("kv/kv_ext_test.go", "package kv_test\n"),
            ]);
            let kv = p.resolve_package("kv").unwrap();
            assert_eq!(kv.files().len(), 1);
        }

        #[test]
        fn mixed_packages_in_one_directory_are_structural() {
            let err = Project::from_sources(
                "example.com/app",
                &[("a/x.go", "package x\n"), ("a/y.go", "package y\n")],
                parser(),
            )
            .unwrap_err();
            assert!(matches!(err, ModelError::Structural { .. }));
        }

        #[test]
        fn empty_module_name_is_configuration_error() {
            let err = Project::from_sources(" ", &[("a.go", "package a\n")], parser()).unwrap_err();
            assert!(matches!(err, ModelError::Configuration { .. }));
        }

        #[test]
        fn missing_package_clause_is_scan_error() {
            let err = Project::from_sources("m", &[("a.go", "func F() {}\n")], parser())
                .unwrap_err();
            assert!(matches!(
                err,
                ModelError::Scan {
                    source: ScanError::MissingPackageClause,
                    ..
                }
            ));
        }
    }

    mod resolution {
        use super::*;

        fn layout() -> Project {
            project(&[
                ("cmd/tool/main.go", "package main\n"),
                ("api/v1/types.go", "package types\n"),
                ("api/v2/types.go", "package types\n"),
                ("util/strings.go", "package util\n"),
            ])
        }

        #[test]
        fn by_import_path() {
            let p = layout();
            let pkg = p.resolve_package("example.com/app/util").unwrap();
            assert_eq!(pkg.name(), "util");
        }

        #[test]
        fn by_relative_directory() {
            let p = layout();
            let pkg = p.resolve_package("api/v2").unwrap();
            assert_eq!(pkg.import_path(), "example.com/app/api/v2");
            assert!(p.resolve_package("./util").is_ok());
        }

        #[test]
        fn by_unique_name() {
            let p = layout();
            assert_eq!(p.resolve_package("main").unwrap().rel_dir(), "cmd/tool");
        }

        #[test]
        fn ambiguous_name_lists_candidates() {
            let err = layout().resolve_package("types").unwrap_err();
            match err {
                ModelError::AmbiguousPackage { candidates, .. } => {
                    assert_eq!(
                        candidates,
                        ["example.com/app/api/v1", "example.com/app/api/v2"]
                    );
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn unknown_package_is_not_found() {
            let err = layout().resolve_package("nope").unwrap_err();
            assert!(matches!(err, ModelError::NotFound { kind: EntityKind::Package, .. }));
            assert!(err.is_recoverable());
        }
    }
}
