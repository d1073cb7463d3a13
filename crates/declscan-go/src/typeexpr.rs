//! Type-expression parser.
//!
//! [`parse_type`] turns a type string such as `*map[string][]pkg.Item` into a
//! [`TypeNode`] tree by recursive descent. Categories are tried in a fixed
//! order and the first match wins:
//!
//! 1. variadic `...T`
//! 2. pointer `*T`
//! 3. slice `[]T`, then array `[N]T`
//! 4. map `map[K]V`
//! 5. channel `chan T`, `chan<- T`, `<-chan T`
//! 6. integer, float, complex, then primitive identifiers
//! 7. inline `func(...)`, `struct{...}`, `interface{...}` (kept opaque)
//! 8. parenthesized `(T)`
//! 9. named `Name`, `pkg.Name`, `Name[Args]`
//!
//! [`TypeNode`]'s `Display` writes the canonical form; [`canonical`] is the
//! whitespace-insensitive normalization used to compare it with source text.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::scope::{enclosed_span, is_ident_byte, is_identifier, skip_literal, split_top_level};

// ============================================================================
// Error Types
// ============================================================================

/// Error type for type-expression parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeParseError {
    #[error("empty type expression")]
    Empty,

    #[error("unbalanced brackets in '{text}'")]
    Unbalanced { text: String },

    #[error("malformed type '{text}': {reason}")]
    Malformed { text: String, reason: String },
}

/// Result type for type parsing.
pub type TypeResult<T> = Result<T, TypeParseError>;

fn malformed(text: &str, reason: &str) -> TypeParseError {
    TypeParseError::Malformed {
        text: text.to_string(),
        reason: reason.to_string(),
    }
}

// ============================================================================
// Categories
// ============================================================================

/// Fixed-width and platform integer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntKind {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl IntKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "int" => IntKind::Int,
            "int8" => IntKind::Int8,
            "int16" => IntKind::Int16,
            "int32" => IntKind::Int32,
            "int64" => IntKind::Int64,
            "uint" => IntKind::Uint,
            "uint8" => IntKind::Uint8,
            "uint16" => IntKind::Uint16,
            "uint32" => IntKind::Uint32,
            "uint64" => IntKind::Uint64,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntKind::Int => "int",
            IntKind::Int8 => "int8",
            IntKind::Int16 => "int16",
            IntKind::Int32 => "int32",
            IntKind::Int64 => "int64",
            IntKind::Uint => "uint",
            IntKind::Uint8 => "uint8",
            IntKind::Uint16 => "uint16",
            IntKind::Uint32 => "uint32",
            IntKind::Uint64 => "uint64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatKind {
    Float32,
    Float64,
}

impl FloatKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "float32" => Some(FloatKind::Float32),
            "float64" => Some(FloatKind::Float64),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FloatKind::Float32 => "float32",
            FloatKind::Float64 => "float64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexKind {
    Complex64,
    Complex128,
}

impl ComplexKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "complex64" => Some(ComplexKind::Complex64),
            "complex128" => Some(ComplexKind::Complex128),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComplexKind::Complex64 => "complex64",
            ComplexKind::Complex128 => "complex128",
        }
    }
}

/// Character, byte, address-sized, boolean and string types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Byte,
    Rune,
    Uintptr,
    Bool,
    String,
}

impl PrimitiveKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "byte" => Some(PrimitiveKind::Byte),
            "rune" => Some(PrimitiveKind::Rune),
            "uintptr" => Some(PrimitiveKind::Uintptr),
            "bool" => Some(PrimitiveKind::Bool),
            "string" => Some(PrimitiveKind::String),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Rune => "rune",
            PrimitiveKind::Uintptr => "uintptr",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::String => "string",
        }
    }
}

/// Channel direction as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

// ============================================================================
// Type Tree
// ============================================================================

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeNode {
    Pointer(Box<TypeNode>),
    Slice(Box<TypeNode>),
    Array {
        len: String,
        elem: Box<TypeNode>,
    },
    Map {
        key: Box<TypeNode>,
        value: Box<TypeNode>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeNode>,
    },
    Variadic(Box<TypeNode>),
    Int(IntKind),
    Float(FloatKind),
    Complex(ComplexKind),
    Primitive(PrimitiveKind),
    /// Inline `func`, `struct` or `interface` type, whitespace-collapsed.
    Opaque(String),
    Named {
        #[serde(skip_serializing_if = "Option::is_none")]
        package: Option<String>,
        name: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeNode>,
    },
}

impl TypeNode {
    /// A bare or qualified named type without arguments.
    pub fn named(package: Option<&str>, name: &str) -> Self {
        TypeNode::Named {
            package: package.map(str::to_string),
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    /// Name of the underlying named type, looking through one pointer.
    ///
    /// This is the key an embedded struct member is stored under.
    pub fn base_name(&self) -> Option<&str> {
        match self {
            TypeNode::Pointer(inner) => match inner.as_ref() {
                TypeNode::Named { name, .. } => Some(name),
                _ => None,
            },
            TypeNode::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, TypeNode::Pointer(_))
    }

    /// Category tag used in dumps.
    pub fn category(&self) -> &'static str {
        match self {
            TypeNode::Pointer(_) => "pointer",
            TypeNode::Slice(_) => "slice",
            TypeNode::Array { .. } => "array",
            TypeNode::Map { .. } => "map",
            TypeNode::Chan { .. } => "chan",
            TypeNode::Variadic(_) => "variadic",
            TypeNode::Int(_) => "int",
            TypeNode::Float(_) => "float",
            TypeNode::Complex(_) => "complex",
            TypeNode::Primitive(_) => "primitive",
            TypeNode::Opaque(_) => "opaque",
            TypeNode::Named { .. } => "named",
        }
    }

    fn visit_qualifiers(&self, out: &mut Qualifiers) {
        match self {
            TypeNode::Pointer(elem)
            | TypeNode::Slice(elem)
            | TypeNode::Variadic(elem)
            | TypeNode::Array { elem, .. }
            | TypeNode::Chan { elem, .. } => elem.visit_qualifiers(out),
            TypeNode::Map { key, value } => {
                key.visit_qualifiers(out);
                value.visit_qualifiers(out);
            }
            TypeNode::Named {
                package,
                name,
                args,
            } => {
                if let Some(package) = package {
                    out.entry(package.clone()).or_default().insert(name.clone());
                }
                for arg in args {
                    arg.visit_qualifiers(out);
                }
            }
            TypeNode::Opaque(text) => opaque_qualifiers(text, out),
            TypeNode::Int(_) | TypeNode::Float(_) | TypeNode::Complex(_) | TypeNode::Primitive(_) => {}
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Pointer(elem) => write!(f, "*{elem}"),
            TypeNode::Slice(elem) => write!(f, "[]{elem}"),
            TypeNode::Array { len, elem } => write!(f, "[{len}]{elem}"),
            TypeNode::Map { key, value } => write!(f, "map[{key}]{value}"),
            TypeNode::Chan { dir, elem } => match dir {
                ChanDir::Both => write!(f, "chan {elem}"),
                ChanDir::Send => write!(f, "chan<- {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
            },
            TypeNode::Variadic(elem) => write!(f, "...{elem}"),
            TypeNode::Int(kind) => f.write_str(kind.as_str()),
            TypeNode::Float(kind) => f.write_str(kind.as_str()),
            TypeNode::Complex(kind) => f.write_str(kind.as_str()),
            TypeNode::Primitive(kind) => f.write_str(kind.as_str()),
            TypeNode::Opaque(text) => f.write_str(text),
            TypeNode::Named {
                package,
                name,
                args,
            } => {
                if let Some(package) = package {
                    write!(f, "{package}.")?;
                }
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("[")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str("]")?;
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a type expression.
pub fn parse_type(text: &str) -> TypeResult<TypeNode> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TypeParseError::Empty);
    }

    if let Some(rest) = text.strip_prefix("...") {
        return Ok(TypeNode::Variadic(Box::new(parse_type(rest)?)));
    }
    if let Some(rest) = text.strip_prefix('*') {
        return Ok(TypeNode::Pointer(Box::new(parse_type(rest)?)));
    }
    if let Some(rest) = text.strip_prefix("[]") {
        return Ok(TypeNode::Slice(Box::new(parse_type(rest)?)));
    }
    if text.starts_with('[') {
        let (len, rest) = bracketed(text, 0)?;
        if len.is_empty() {
            return Err(malformed(text, "empty array length"));
        }
        return Ok(TypeNode::Array {
            len: collapse_whitespace(len),
            elem: Box::new(parse_type(rest)?),
        });
    }
    if let Some(rest) = strip_keyword(text, "map") {
        if !rest.starts_with('[') {
            return Err(malformed(text, "map without key"));
        }
        let offset = text.len() - rest.len();
        let (key, value) = bracketed(text, offset)?;
        return Ok(TypeNode::Map {
            key: Box::new(parse_type(key)?),
            value: Box::new(parse_type(value)?),
        });
    }
    if let Some(rest) = text.strip_prefix("<-") {
        let elem = strip_keyword(rest.trim_start(), "chan")
            .ok_or_else(|| malformed(text, "'<-' not followed by chan"))?;
        return Ok(TypeNode::Chan {
            dir: ChanDir::Recv,
            elem: Box::new(parse_type(elem)?),
        });
    }
    if let Some(rest) = strip_keyword(text, "chan") {
        return Ok(match rest.strip_prefix("<-") {
            Some(elem) => TypeNode::Chan {
                dir: ChanDir::Send,
                elem: Box::new(parse_type(elem)?),
            },
            None => TypeNode::Chan {
                dir: ChanDir::Both,
                elem: Box::new(parse_type(rest)?),
            },
        });
    }

    if is_identifier(text) {
        if let Some(kind) = IntKind::from_name(text) {
            return Ok(TypeNode::Int(kind));
        }
        if let Some(kind) = FloatKind::from_name(text) {
            return Ok(TypeNode::Float(kind));
        }
        if let Some(kind) = ComplexKind::from_name(text) {
            return Ok(TypeNode::Complex(kind));
        }
        if let Some(kind) = PrimitiveKind::from_name(text) {
            return Ok(TypeNode::Primitive(kind));
        }
    }

    for (keyword, open) in [("func", '('), ("struct", '{'), ("interface", '{')] {
        if let Some(rest) = strip_keyword(text, keyword) {
            if !rest.starts_with(open) {
                return Err(malformed(text, &format!("'{keyword}' without '{open}'")));
            }
            let offset = text.len() - rest.len();
            check_balanced(text, offset)?;
            return Ok(TypeNode::Opaque(collapse_whitespace(text)));
        }
    }

    if text.starts_with('(') {
        let (inner, rest) = bracketed(text, 0)?;
        if !rest.trim().is_empty() {
            return Err(malformed(text, "trailing text after ')'"));
        }
        return parse_type(inner);
    }

    parse_named(text)
}

fn parse_named(text: &str) -> TypeResult<TypeNode> {
    let (head, args) = match text.find('[') {
        Some(open) => {
            let (inner, rest) = bracketed(text, open)?;
            if !rest.trim().is_empty() {
                return Err(malformed(text, "trailing text after type arguments"));
            }
            let mut args = Vec::new();
            for span in split_top_level(inner.as_bytes(), b",")
                .map_err(|_| unbalanced(text))?
            {
                args.push(parse_type(&inner[span.start..span.end])?);
            }
            (text[..open].trim_end(), args)
        }
        None => (text, Vec::new()),
    };

    let (package, name) = match head.split_once('.') {
        Some((package, name)) => (Some(package), name),
        None => (None, head),
    };
    if package.is_some_and(|p| !is_identifier(p)) || !is_identifier(name) {
        return Err(malformed(text, "not a type name"));
    }
    Ok(TypeNode::Named {
        package: package.map(str::to_string),
        name: name.to_string(),
        args,
    })
}

/// Split `text` at the group opening at `open`: (interior, remainder).
fn bracketed(text: &str, open: usize) -> TypeResult<(&str, &str)> {
    let span = enclosed_span(text.as_bytes(), open, &[]).map_err(|_| unbalanced(text))?;
    Ok((&text[span.start..span.end], &text[span.end + 1..]))
}

fn check_balanced(text: &str, open: usize) -> TypeResult<()> {
    enclosed_span(text.as_bytes(), open, &[])
        .map(|_| ())
        .map_err(|_| unbalanced(text))
}

fn unbalanced(text: &str) -> TypeParseError {
    TypeParseError::Unbalanced {
        text: text.to_string(),
    }
}

/// `text` minus a leading whole-word `keyword`, trimmed.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    match rest.bytes().next() {
        Some(b) if is_ident_byte(b) => None,
        _ => Some(rest.trim_start()),
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Collapse whitespace runs to one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-insensitive canonical form of a type string.
///
/// Whitespace is dropped except a single space between two identifier
/// characters, so `map[string] int` and `map[string]int` compare equal.
pub fn canonical(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.trim().chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let prev_ident = out.bytes().last().is_some_and(is_ident_byte);
            let next_ident = c.is_alphanumeric() || c == '_';
            if prev_ident && next_ident {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(c);
    }
    out
}

// ============================================================================
// Qualifiers
// ============================================================================

/// Package alias -> names referenced through it.
pub type Qualifiers = BTreeMap<String, BTreeSet<String>>;

/// Collect every `alias.Name` use in a type tree.
pub fn collect_qualifiers(node: &TypeNode) -> Qualifiers {
    let mut out = Qualifiers::new();
    node.visit_qualifiers(&mut out);
    out
}

/// Merge `from` into `into`.
pub fn merge_qualifiers(into: &mut Qualifiers, from: Qualifiers) {
    for (alias, names) in from {
        into.entry(alias).or_default().extend(names);
    }
}

fn opaque_qualifiers(text: &str, out: &mut Qualifiers) {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if let Ok(Some(end)) = skip_literal(bytes, i) {
            i = end;
            continue;
        }
        if !is_ident_byte(bytes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && is_ident_byte(bytes[i]) {
            i += 1;
        }
        if bytes[start].is_ascii_digit() || bytes.get(i) != Some(&b'.') {
            continue;
        }
        let name_start = i + 1;
        let mut name_end = name_start;
        while name_end < bytes.len() && is_ident_byte(bytes[name_end]) {
            name_end += 1;
        }
        if name_end > name_start {
            out.entry(text[start..i].to_string())
                .or_default()
                .insert(text[name_start..name_end].to_string());
        }
        i = name_end;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(node: TypeNode) -> Box<TypeNode> {
        Box::new(node)
    }

    mod classification {
        use super::*;

        #[test]
        fn pointer_to_map() {
            assert_eq!(
                parse_type("*map[string]int").unwrap(),
                TypeNode::Pointer(boxed(TypeNode::Map {
                    key: boxed(TypeNode::Primitive(PrimitiveKind::String)),
                    value: boxed(TypeNode::Int(IntKind::Int)),
                }))
            );
        }

        #[test]
        fn numeric_classes_match_whole_identifiers() {
            assert_eq!(parse_type("int8").unwrap(), TypeNode::Int(IntKind::Int8));
            assert_eq!(parse_type("uint64").unwrap(), TypeNode::Int(IntKind::Uint64));
            assert_eq!(parse_type("float32").unwrap(), TypeNode::Float(FloatKind::Float32));
            assert_eq!(
                parse_type("complex128").unwrap(),
                TypeNode::Complex(ComplexKind::Complex128)
            );
            assert_eq!(parse_type("integer").unwrap(), TypeNode::named(None, "integer"));
            assert_eq!(parse_type("int64x").unwrap(), TypeNode::named(None, "int64x"));
            assert_eq!(parse_type("floaty").unwrap(), TypeNode::named(None, "floaty"));
        }

        #[test]
        fn primitives() {
            assert_eq!(parse_type("byte").unwrap(), TypeNode::Primitive(PrimitiveKind::Byte));
            assert_eq!(parse_type("rune").unwrap(), TypeNode::Primitive(PrimitiveKind::Rune));
            assert_eq!(
                parse_type("uintptr").unwrap(),
                TypeNode::Primitive(PrimitiveKind::Uintptr)
            );
            assert_eq!(parse_type("bool").unwrap(), TypeNode::Primitive(PrimitiveKind::Bool));
        }

        #[test]
        fn interface_is_not_an_int() {
            assert_eq!(
                parse_type("interface{}").unwrap(),
                TypeNode::Opaque("interface{}".to_string())
            );
        }

        #[test]
        fn qualified_and_generic_names() {
            assert_eq!(
                parse_type("pkg.Map[K, []V]").unwrap(),
                TypeNode::Named {
                    package: Some("pkg".to_string()),
                    name: "Map".to_string(),
                    args: vec![
                        TypeNode::named(None, "K"),
                        TypeNode::Slice(boxed(TypeNode::named(None, "V"))),
                    ],
                }
            );
        }

        #[test]
        fn arrays_channels_and_variadics() {
            assert_eq!(
                parse_type("[4]byte").unwrap(),
                TypeNode::Array {
                    len: "4".to_string(),
                    elem: boxed(TypeNode::Primitive(PrimitiveKind::Byte)),
                }
            );
            assert_eq!(
                parse_type("<-chan error").unwrap(),
                TypeNode::Chan {
                    dir: ChanDir::Recv,
                    elem: boxed(TypeNode::named(None, "error")),
                }
            );
            assert_eq!(
                parse_type("chan<- int").unwrap(),
                TypeNode::Chan {
                    dir: ChanDir::Send,
                    elem: boxed(TypeNode::Int(IntKind::Int)),
                }
            );
            assert_eq!(
                parse_type("...string").unwrap(),
                TypeNode::Variadic(boxed(TypeNode::Primitive(PrimitiveKind::String)))
            );
        }

        #[test]
        fn inline_func_is_opaque_and_collapsed() {
            assert_eq!(
                parse_type("func(a  int,\n\tb string) error").unwrap(),
                TypeNode::Opaque("func(a int, b string) error".to_string())
            );
        }

        #[test]
        fn parenthesized_type() {
            assert_eq!(
                parse_type("(*T)").unwrap(),
                TypeNode::Pointer(boxed(TypeNode::named(None, "T")))
            );
        }

        #[test]
        fn base_name_looks_through_pointer() {
            assert_eq!(parse_type("*pkg.Base").unwrap().base_name(), Some("Base"));
            assert_eq!(parse_type("List[T]").unwrap().base_name(), Some("List"));
            assert_eq!(parse_type("[]T").unwrap().base_name(), None);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn empty_input() {
            assert_eq!(parse_type("  "), Err(TypeParseError::Empty));
            assert_eq!(parse_type("[]"), Err(TypeParseError::Empty));
        }

        #[test]
        fn unbalanced_brackets() {
            assert!(matches!(
                parse_type("map[string"),
                Err(TypeParseError::Unbalanced { .. })
            ));
        }

        #[test]
        fn malformed_names() {
            assert!(matches!(parse_type("pkg."), Err(TypeParseError::Malformed { .. })));
            assert!(matches!(parse_type("a b"), Err(TypeParseError::Malformed { .. })));
            assert!(matches!(parse_type("map int"), Err(TypeParseError::Malformed { .. })));
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn serialize_normalizes_to_input() {
            for text in [
                "*map[string]int",
                "[]*pkg.Item",
                "map[string] []int",
                "chan  struct{}",
                "<-chan error",
                "chan<- int",
                "...interface{ String() string }",
                "[16]byte",
                "pkg.Map[K,V]",
                "func(ctx context.Context) (int, error)",
                "List[ T ]",
            ] {
                let node = parse_type(text).unwrap();
                assert_eq!(canonical(&node.to_string()), canonical(text), "{text}");
            }
        }

        #[test]
        fn canonical_keeps_word_separation() {
            assert_eq!(canonical("chan   int"), "chan int");
            assert_eq!(canonical("map[ string ] int"), "map[string]int");
        }

        #[test]
        fn tree_serializes_as_json() {
            let node = parse_type("*pkg.T").unwrap();
            let json = serde_json::to_value(&node).unwrap();
            assert_eq!(json["pointer"]["named"]["package"], "pkg");
            assert_eq!(json["pointer"]["named"]["name"], "T");
        }
    }

    mod qualifiers {
        use super::*;

        #[test]
        fn collects_across_tree() {
            let node = parse_type("map[pkg.Key][]*other.Val[pkg.T]").unwrap();
            let q = collect_qualifiers(&node);
            assert_eq!(q.len(), 2);
            assert_eq!(
                q["pkg"].iter().map(String::as_str).collect::<Vec<_>>(),
                vec!["Key", "T"]
            );
            assert!(q["other"].contains("Val"));
        }

        #[test]
        fn opaque_text_is_searched() {
            let node = parse_type("func(ctx context.Context, n float64) *http.Request").unwrap();
            let q = collect_qualifiers(&node);
            assert!(q["context"].contains("Context"));
            assert!(q["http"].contains("Request"));
            assert_eq!(q.len(), 2);
        }

        #[test]
        fn unqualified_types_have_none() {
            assert!(collect_qualifiers(&parse_type("[]map[string]int").unwrap()).is_empty());
        }

        #[test]
        fn merge_unions_name_sets() {
            let mut into = collect_qualifiers(&parse_type("io.Reader").unwrap());
            merge_qualifiers(&mut into, collect_qualifiers(&parse_type("io.Writer").unwrap()));
            assert_eq!(into["io"].len(), 2);
        }
    }
}
