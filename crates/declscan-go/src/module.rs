//! Module descriptor (`go.mod`) reader.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::patterns::PatternRegistry;

/// Error type for reading the module descriptor.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("no module directive in {}", path.display())]
    MissingModuleDirective { path: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for module descriptor operations.
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Module path from the first `module` directive, ignoring `//` comments.
pub fn read_module_name<'a>(patterns: &PatternRegistry, text: &'a str) -> Option<&'a str> {
    text.lines()
        .map(|line| line.split("//").next().unwrap_or(""))
        .find_map(|line| patterns.module_directive().captures(line)?.name("path"))
        .map(|m| m.as_str())
}

/// Read the descriptor at `path` and return its module path.
pub fn load_module_name(patterns: &PatternRegistry, path: &Path) -> ModuleResult<String> {
    let text = fs::read_to_string(path).map_err(|source| ModuleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = read_module_name(patterns, &text).ok_or_else(|| {
        ModuleError::MissingModuleDirective {
            path: path.to_path_buf(),
        }
    })?;
    tracing::debug!("module {} from {}", name, path.display());
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_bare_and_quoted_paths() {
        let patterns = PatternRegistry::new();
        assert_eq!(
            read_module_name(&patterns, "module example.com/app\n\ngo 1.22\n"),
            Some("example.com/app")
        );
        assert_eq!(
            read_module_name(&patterns, "// header\nmodule \"example.com/q\" // trailing\n"),
            Some("example.com/q")
        );
    }

    #[test]
    fn commented_directive_is_ignored() {
        let patterns = PatternRegistry::new();
        assert_eq!(read_module_name(&patterns, "// module fake\ngo 1.21\n"), None);
    }

    #[test]
    fn missing_directive_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("go.mod");
        fs::write(&path, "go 1.22\n").unwrap();
        let err = load_module_name(&PatternRegistry::new(), &path).unwrap_err();
        assert!(matches!(err, ModuleError::MissingModuleDirective { .. }));
    }

    #[test]
    fn unreadable_descriptor_is_io() {
        let dir = TempDir::new().unwrap();
        let err = load_module_name(&PatternRegistry::new(), &dir.path().join("go.mod")).unwrap_err();
        assert!(matches!(err, ModuleError::Io { .. }));
    }
}
