//! Plain declaration records.
//!
//! These are what a [`SourceParser`](crate::parser::SourceParser) produces
//! for one file. They hold no caches and no back-references; the symbol model
//! wraps them into its lazily populated entities.

use std::collections::BTreeMap;

use declscan_core::text::Span;
use serde::Serialize;

use crate::typeexpr::{collect_qualifiers, merge_qualifiers, Qualifiers, TypeNode};

// ============================================================================
// Variables
// ============================================================================

/// A parameter, return value or struct member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    /// Declared name. Empty for unnamed parameters and returns; the bare type
    /// name for embedded members.
    pub name: String,
    /// Parsed type.
    #[serde(rename = "type")]
    pub ty: TypeNode,
    /// Whether this is an embedded (anonymous) struct member.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub embedded: bool,
    /// Struct tag without its quotes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Doc comment lines above a member.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub doc: Vec<String>,
    /// Trailing `//` comment on a member line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: TypeNode) -> Self {
        Variable {
            name: name.into(),
            ty,
            embedded: false,
            tag: None,
            doc: Vec::new(),
            comment: None,
        }
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

// ============================================================================
// Functions and Methods
// ============================================================================

/// The receiver of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receiver {
    /// Bound variable name; empty when the receiver is unnamed.
    pub name: String,
    /// Owning type name, without type arguments.
    pub type_name: String,
    /// `*T` receiver.
    pub pointer: bool,
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Receiver>,
    /// Type-parameter list text without brackets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_params: Option<String>,
    pub params: Vec<Variable>,
    /// Return types. Names are never bound; see `named_returns`.
    pub returns: Vec<Variable>,
    /// The return list was written with names, which the model does not bind.
    pub named_returns: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub doc: Vec<String>,
    /// From the `func` keyword through the closing brace.
    pub span: Span,
    /// Body content between the braces.
    pub body: Span,
}

impl FunctionDecl {
    /// Map key: `Name` for functions, `Type.Name` for methods.
    pub fn key(&self) -> String {
        match &self.receiver {
            Some(receiver) => method_key(&receiver.type_name, &self.name),
            None => self.name.clone(),
        }
    }

    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }

    /// Package qualifiers referenced by parameter and return types.
    pub fn qualifiers(&self) -> Qualifiers {
        let mut out = Qualifiers::new();
        for var in self.params.iter().chain(&self.returns) {
            merge_qualifiers(&mut out, collect_qualifiers(&var.ty));
        }
        out
    }
}

/// Key of a method in a [`FileDeclarations::functions`] map.
pub fn method_key(type_name: &str, method: &str) -> String {
    format!("{type_name}.{method}")
}

// ============================================================================
// Type Declarations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Struct,
    Interface,
}

/// A `type Name struct {…}` or `type Name interface {…}` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_params: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub doc: Vec<String>,
    /// From the type name through the closing brace.
    pub span: Span,
    /// Body content between the braces.
    pub body: Span,
    /// Interface method names, in source order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    /// Embedded interfaces and constraint terms, in source order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<String>,
}

// ============================================================================
// Imports
// ============================================================================

/// One import spec.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Import {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl Import {
    /// The name the file refers to the package by.
    ///
    /// Without an alias this is the last path element, skipping a trailing
    /// major-version element such as `v2`.
    pub fn name(&self) -> &str {
        if let Some(alias) = &self.alias {
            return alias;
        }
        let mut parts = self.path.rsplit('/');
        let last = parts.next().unwrap_or(&self.path);
        if is_major_version(last) {
            if let Some(prev) = parts.next() {
                return prev;
            }
        }
        last
    }
}

fn is_major_version(element: &str) -> bool {
    element
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

// ============================================================================
// File Declarations
// ============================================================================

/// Everything one parse of a file yields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileDeclarations {
    /// Name from the `package` clause.
    pub package: String,
    pub imports: Vec<Import>,
    /// Functions keyed by name and methods keyed by `Type.Name`.
    pub functions: BTreeMap<String, FunctionDecl>,
    /// Struct and interface declarations keyed by name.
    pub types: BTreeMap<String, TypeDecl>,
}

impl FileDeclarations {
    /// Free functions in name order.
    pub fn free_functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.functions.values().filter(|f| !f.is_method())
    }

    /// Methods whose receiver type is `type_name`.
    pub fn methods_of<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a FunctionDecl> {
        self.functions
            .values()
            .filter(move |f| f.receiver.as_ref().is_some_and(|r| r.type_name == type_name))
    }

    /// Declarations of one kind in name order.
    pub fn types_of(&self, kind: TypeKind) -> impl Iterator<Item = &TypeDecl> {
        self.types.values().filter(move |t| t.kind == kind)
    }

    /// Find the import a qualifier refers to.
    pub fn resolve_alias(&self, alias: &str) -> Option<&Import> {
        self.imports.iter().find(|i| i.name() == alias)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeexpr::parse_type;

    fn function(name: &str, receiver: Option<&str>) -> FunctionDecl {
        FunctionDecl {
            name: name.to_string(),
            receiver: receiver.map(|t| Receiver {
                name: "r".to_string(),
                type_name: t.to_string(),
                pointer: true,
            }),
            type_params: None,
            params: vec![Variable::new("ctx", parse_type("context.Context").unwrap())],
            returns: vec![Variable::new("", parse_type("*http.Response").unwrap())],
            named_returns: false,
            doc: Vec::new(),
            span: Span::default(),
            body: Span::default(),
        }
    }

    #[test]
    fn keys_distinguish_methods() {
        assert_eq!(function("Run", None).key(), "Run");
        assert_eq!(function("Run", Some("Server")).key(), "Server.Run");
    }

    #[test]
    fn function_qualifiers_cover_params_and_returns() {
        let q = function("Fetch", None).qualifiers();
        assert!(q["context"].contains("Context"));
        assert!(q["http"].contains("Response"));
    }

    #[test]
    fn methods_of_filters_by_receiver() {
        let mut decls = FileDeclarations::default();
        for f in [
            function("New", None),
            function("Run", Some("Server")),
            function("Stop", Some("Server")),
            function("Run", Some("Client")),
        ] {
            decls.functions.insert(f.key(), f);
        }
        let names: Vec<&str> = decls.methods_of("Server").map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Run", "Stop"]);
        assert_eq!(decls.free_functions().count(), 1);
    }

    #[test]
    fn import_names() {
        let plain = Import {
            path: "net/http".to_string(),
            alias: None,
        };
        let versioned = Import {
            path: "github.com/org/lib/v2".to_string(),
            alias: None,
        };
        let aliased = Import {
            path: "strings".to_string(),
            alias: Some("str".to_string()),
        };
        assert_eq!(plain.name(), "http");
        assert_eq!(versioned.name(), "lib");
        assert_eq!(aliased.name(), "str");
    }
}
