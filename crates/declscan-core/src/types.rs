//! Common types shared between error and output modules.
//!
//! This module contains types that are used by both the error and output modules,
//! avoiding circular dependencies.

use serde::{Deserialize, Serialize};

// ============================================================================
// Location Type
// ============================================================================

/// Location in a source file.
///
/// - `file`: Project-relative path (required)
/// - `line`: 1-indexed line number (required)
/// - `col`: 1-indexed column, UTF-8 bytes (required)
/// - `byte_start`: Byte offset from file start (optional)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    /// File path (project-relative).
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, UTF-8 bytes).
    pub col: u32,
    /// Byte offset from file start (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_start: Option<u64>,
}

impl Location {
    /// Create a new location without a byte offset.
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location {
            file: file.into(),
            line,
            col,
            byte_start: None,
        }
    }

    /// Create a location from a byte offset into `content`.
    pub fn from_offset(file: impl Into<String>, content: &[u8], offset: usize) -> Self {
        let (line, col) = crate::text::byte_offset_to_position(content, offset);
        Location {
            file: file.into(),
            line,
            col,
            byte_start: Some(offset as u64),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_new_serializes_without_byte_offset() {
        let loc = Location::new("pkg/a.go", 42, 8);
        let json = serde_json::to_string(&loc).unwrap();
        assert!(!json.contains("byte_start"));
        assert!(json.contains("\"file\":\"pkg/a.go\""));
        assert!(json.contains("\"line\":42"));
        assert!(json.contains("\"col\":8"));
    }

    #[test]
    fn location_from_offset_computes_line_and_col() {
        let content = b"package a\n\nfunc F() {}\n";
        let loc = Location::from_offset("a.go", content, 16);
        assert_eq!(loc.line, 3);
        assert_eq!(loc.col, 6);
        assert_eq!(loc.byte_start, Some(16));
    }

    #[test]
    fn location_display() {
        assert_eq!(Location::new("a.go", 3, 4).to_string(), "a.go:3:4");
    }
}
