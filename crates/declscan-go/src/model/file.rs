//! Source file handle with cached text and declarations.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use declscan_core::text::byte_offset_to_position;
use declscan_core::types::Location;

use super::{ModelError, ModelResult};
use crate::decl::FileDeclarations;
use crate::parser::SourceParser;
use crate::scope::ScanError;

/// One source file, owned by its package.
///
/// Text is read once on first use. Declarations are parsed once, on the first
/// lookup that needs this file, and shared from then on.
#[derive(Debug)]
pub struct File {
    name: String,
    path: PathBuf,
    rel_path: String,
    source: OnceLock<Arc<str>>,
    decls: Mutex<Option<Arc<FileDeclarations>>>,
}

impl File {
    /// A file on disk.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, rel_path: impl Into<String>) -> Self {
        File {
            name: name.into(),
            path: path.into(),
            rel_path: rel_path.into(),
            source: OnceLock::new(),
            decls: Mutex::new(None),
        }
    }

    /// A file whose text is already in memory.
    pub fn from_source(rel_path: &str, text: &str) -> Self {
        let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
        let file = File::new(name, rel_path, rel_path);
        let _ = file.source.set(Arc::from(text));
        file
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Project-relative path with forward slashes.
    pub fn rel_path(&self) -> &str {
        &self.rel_path
    }

    /// File text, read from disk on first call.
    pub fn source(&self) -> ModelResult<Arc<str>> {
        if let Some(text) = self.source.get() {
            return Ok(Arc::clone(text));
        }
        let text = fs::read_to_string(&self.path).map_err(|source| ModelError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(Arc::clone(self.source.get_or_init(|| Arc::from(text))))
    }

    /// Declarations of this file, parsed on first call.
    pub fn declarations(&self, parser: &dyn SourceParser) -> ModelResult<Arc<FileDeclarations>> {
        let mut slot = self.decls.lock().expect("file declarations mutex poisoned");
        if let Some(decls) = slot.as_ref() {
            return Ok(Arc::clone(decls));
        }
        let text = self.source()?;
        let decls = parser
            .parse(&self.rel_path, &text)
            .map_err(|e| self.scan_error(&text, e))?;
        let decls = Arc::new(decls);
        *slot = Some(Arc::clone(&decls));
        Ok(decls)
    }

    /// Declarations if already parsed; never parses.
    pub fn parsed(&self) -> Option<Arc<FileDeclarations>> {
        self.decls
            .lock()
            .expect("file declarations mutex poisoned")
            .clone()
    }

    /// Whether the declarations have been parsed.
    pub fn is_parsed(&self) -> bool {
        self.parsed().is_some()
    }

    /// Location of a byte offset, if the text has been read.
    pub fn location(&self, offset: usize) -> Location {
        match self.source.get() {
            Some(text) => Location::from_offset(&self.rel_path, text.as_bytes(), offset),
            None => Location::new(&self.rel_path, 0, 0),
        }
    }

    /// Attach this file's path and the line/column of the failing offset.
    pub(crate) fn scan_error(&self, text: &str, source: ScanError) -> ModelError {
        let (line, col) = byte_offset_to_position(text.as_bytes(), source.offset());
        ModelError::Scan {
            path: self.rel_path.clone(),
            line,
            col,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TextScanParser;
    use tempfile::TempDir;

    #[test]
    fn in_memory_file_parses_once() {
        let file = File::from_source("pkg/a.go", "package pkg\nfunc A() {}\n");
        assert_eq!(file.name(), "a.go");
        assert!(!file.is_parsed());
        let parser = TextScanParser::new();
        let first = file.declarations(&parser).unwrap();
        let second = file.declarations(&parser).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(file.is_parsed());
    }

    #[test]
    fn reads_from_disk_lazily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.go");
        fs::write(&path, "package a\n").unwrap();
        let file = File::new("a.go", &path, "a.go");
        assert_eq!(&*file.source().unwrap(), "package a\n");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let file = File::new("gone.go", dir.path().join("gone.go"), "gone.go");
        assert!(matches!(file.source(), Err(ModelError::Io { .. })));
    }

    #[test]
    fn scan_errors_carry_position() {
        let file = File::from_source("b.go", "package b\n\nfunc F() {\n");
        let err = file.declarations(&TextScanParser::new()).unwrap_err();
        match err {
            ModelError::Scan { path, line, col, .. } => {
                assert_eq!(path, "b.go");
                assert_eq!((line, col), (3, 10));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn location_of_offset() {
        let file = File::from_source("c.go", "package c\nfunc C() {}\n");
        let _ = file.source().unwrap();
        let location = file.location(10);
        assert_eq!((location.line, location.col), (2, 1));
        assert_eq!(location.byte_start, Some(10));
    }
}
