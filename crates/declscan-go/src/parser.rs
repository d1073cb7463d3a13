//! Source-parser seam.
//!
//! The symbol model never scans text itself; it asks a [`SourceParser`] for a
//! file's [`FileDeclarations`] and, later, for a struct's members. The
//! built-in [`TextScanParser`] uses the pattern registry, the scope scanner
//! and the type-expression parser. A full-grammar backend implements the
//! same trait and is handed to
//! [`Project::load_with`](crate::model::Project::load_with).

use std::sync::Arc;

use crate::decl::{FileDeclarations, TypeDecl, Variable};
use crate::extract::{parse_struct_members, scan_file};
use crate::patterns::PatternRegistry;
use crate::scope::ScanResult;

/// Turns file text into declarations.
pub trait SourceParser: Send + Sync {
    /// Short backend name for logs and dumps.
    fn name(&self) -> &'static str;

    /// Parse one file. `path` is project-relative and only used for logging.
    fn parse(&self, path: &str, text: &str) -> ScanResult<FileDeclarations>;

    /// Parse the members of a struct declared in `text`.
    fn parse_members(&self, text: &str, decl: &TypeDecl) -> ScanResult<Vec<Variable>>;
}

/// Text-scan backend.
#[derive(Debug, Clone, Default)]
pub struct TextScanParser {
    patterns: Arc<PatternRegistry>,
}

impl TextScanParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing registry.
    pub fn with_patterns(patterns: Arc<PatternRegistry>) -> Self {
        TextScanParser { patterns }
    }

    pub fn patterns(&self) -> &PatternRegistry {
        &self.patterns
    }
}

impl SourceParser for TextScanParser {
    fn name(&self) -> &'static str {
        "text-scan"
    }

    fn parse(&self, path: &str, text: &str) -> ScanResult<FileDeclarations> {
        let decls = scan_file(&self.patterns, text)?;
        tracing::debug!(
            "scanned {}: {} functions, {} types",
            path,
            decls.functions.len(),
            decls.types.len()
        );
        Ok(decls)
    }

    fn parse_members(&self, text: &str, decl: &TypeDecl) -> ScanResult<Vec<Variable>> {
        parse_struct_members(&self.patterns, text, decl.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_scan_parses_a_file() {
        let parser = TextScanParser::new();
        let text = "package kv\n\ntype Store struct {\n\tdata map[string]string\n}\n\nfunc (s *Store) Get(k string) (string, bool) {\n\tv, ok := s.data[k]\n\treturn v, ok\n}\n";
        let decls = parser.parse("kv/store.go", text).unwrap();
        assert_eq!(decls.package, "kv");
        assert!(decls.functions.contains_key("Store.Get"));

        let members = parser.parse_members(text, &decls.types["Store"]).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "data");
    }

    #[test]
    fn parser_is_object_safe() {
        let parser: Arc<dyn SourceParser> = Arc::new(TextScanParser::new());
        assert_eq!(parser.name(), "text-scan");
    }
}
