//! Declaration extractor for the text-scan backend.
//!
//! Function and method declarations are carved out of raw source text in one
//! left-to-right pass:
//!
//! 1. A [`PatternRegistry`] pattern finds the head: optional receiver, name
//!    and the mark that opens the type-parameter or parameter list.
//! 2. The scope scanner measures the parameter list, then classifies the
//!    return clause. A `(` right after the parameters is a return list; a
//!    `{` is the body; anything else is a single return type that runs up
//!    to the first `{` opened while only the function keyword is on the
//!    keyword stack (so `struct{}` or `interface{}` in the type is not
//!    mistaken for the body).
//! 3. Parameter and return lists are split on top-level commas. Entries
//!    without a type (`a, b int`) take the type of the next typed entry.
//! 4. The body is the balanced brace content after the body mark; the scan
//!    resumes after it, so heads inside bodies are never seen.
//!
//! Struct and interface declarations, imports and the package clause are
//! extracted here too.
//!
//! Heads are matched against a copy of the text with comments and literal
//! contents blanked ([`mask_literals`]), so a `func` or `type` line inside a
//! raw string or block comment is never a declaration. Offsets are shared
//! between the two copies; names, tags and paths are read from the original.

use std::collections::btree_map::Entry as MapEntry;
use std::collections::BTreeMap;

use declscan_core::text::{line_start_of, Span};

use crate::decl::{
    FileDeclarations, FunctionDecl, Import, Receiver, TypeDecl, TypeKind, Variable,
};
use crate::patterns::PatternRegistry;
use crate::scope::{
    enclosed_span, is_identifier, mask_literals, skip_literal, skip_trivia, split_top_level,
    strip_comments, ScanError, ScanResult, ScanState, ScopeKeyword, Step,
};
use crate::typeexpr::{collapse_whitespace, parse_type, TypeNode, TypeParseError};

// ============================================================================
// File Scan
// ============================================================================

/// Scan one file's text into its declarations.
pub fn scan_file(patterns: &PatternRegistry, text: &str) -> ScanResult<FileDeclarations> {
    let code = mask_literals(text)?;
    Ok(FileDeclarations {
        package: package_in(patterns, &code)?,
        imports: imports_in(patterns, text, &code)?,
        functions: functions_in(patterns, text, &code)?,
        types: types_in(patterns, text, &code)?,
    })
}

/// Name from the `package` clause.
pub fn package_name(patterns: &PatternRegistry, text: &str) -> ScanResult<String> {
    package_in(patterns, &mask_literals(text)?)
}

fn package_in(patterns: &PatternRegistry, code: &str) -> ScanResult<String> {
    patterns
        .package_clause()
        .captures(code)
        .and_then(|caps| caps.name("name"))
        .map(|m| m.as_str().to_string())
        .ok_or(ScanError::MissingPackageClause)
}

// ============================================================================
// Functions
// ============================================================================

/// Extract every function and method declaration.
///
/// Functions are keyed by name, methods by `Type.Name`. When a key repeats
/// within the file the first declaration is kept.
pub fn extract_function_declarations(
    patterns: &PatternRegistry,
    text: &str,
) -> ScanResult<BTreeMap<String, FunctionDecl>> {
    functions_in(patterns, text, &mask_literals(text)?)
}

fn functions_in(
    patterns: &PatternRegistry,
    text: &str,
    code: &str,
) -> ScanResult<BTreeMap<String, FunctionDecl>> {
    let bytes = text.as_bytes();
    let mut decls = BTreeMap::new();
    let mut cursor = 0;

    for caps in patterns.func_head().captures_iter(code) {
        let (Some(head), Some(name), Some(open)) = (caps.get(0), caps.name("name"), caps.name("open"))
        else {
            continue;
        };
        if head.start() < cursor {
            continue;
        }
        let name = name.as_str().to_string();
        let receiver = caps.name("recv_type").map(|ty| Receiver {
            name: caps
                .name("recv_name")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            type_name: ty.as_str().to_string(),
            pointer: caps.name("star").is_some(),
        });

        let mut pos = open.start();
        let mut type_params = None;
        if bytes[pos] == b'[' {
            let span = enclosed_span(bytes, pos, &[])?;
            type_params = Some(collapse_whitespace(&text[span.start..span.end]));
            pos = skip_trivia(bytes, span.end + 1)?;
            if bytes.get(pos) != Some(&b'(') {
                return Err(ScanError::MissingOpen { open: '(', offset: pos });
            }
        }

        let params_span = enclosed_span(bytes, pos, &[])?;
        let params = parse_variable_list(patterns, text, params_span)?;

        let (clause, body) = classify_returns(bytes, &name, head.start(), params_span.end + 1)?;
        let (returns, named_returns) = match clause {
            ReturnClause::None => (Vec::new(), false),
            ReturnClause::Single(span) => {
                let ty = parse_at(&text[span.start..span.end], span.start)?;
                (vec![Variable::new("", ty)], false)
            }
            ReturnClause::List(span) => {
                let mut returns = parse_variable_list(patterns, text, span)?;
                let named = returns.iter().any(Variable::is_named);
                if named {
                    tracing::warn!(
                        "{} uses named return values; names are not bound",
                        name
                    );
                    for ret in &mut returns {
                        ret.name.clear();
                    }
                }
                (returns, named)
            }
        };

        cursor = body.end + 1;
        let decl = FunctionDecl {
            name,
            receiver,
            type_params,
            params,
            returns,
            named_returns,
            doc: leading_doc(text, head.start()),
            span: Span::new(head.start(), body.end + 1),
            body,
        };
        match decls.entry(decl.key()) {
            MapEntry::Vacant(slot) => {
                slot.insert(decl);
            }
            MapEntry::Occupied(slot) => {
                if decl.name != "init" {
                    tracing::warn!("duplicate declaration of {} in one file", slot.key());
                }
            }
        }
    }

    Ok(decls)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReturnClause {
    None,
    Single(Span),
    List(Span),
}

/// Classify what follows a parameter list ending just before `from`.
///
/// Returns the return clause and the body content span.
fn classify_returns(
    bytes: &[u8],
    name: &str,
    head: usize,
    from: usize,
) -> ScanResult<(ReturnClause, Span)> {
    let mut state = ScanState::new(ScopeKeyword::Func, from);
    state.skip_trivia(bytes)?;
    let start = state.pos();

    match bytes.get(start) {
        Some(b'{') => Ok((ReturnClause::None, expect_body(&mut state, bytes, name, head)?)),
        Some(b'(') => {
            let Step::Group { content, .. } = state.step(bytes, &[])? else {
                return Err(missing_body(name, head));
            };
            let body = expect_body(&mut state, bytes, name, head)?;
            Ok((ReturnClause::List(content), body))
        }
        None | Some(b'\n') => Err(missing_body(name, head)),
        Some(_) => loop {
            match state.step(bytes, &[])? {
                Step::Group {
                    open: b'{',
                    depth: 1,
                    content,
                } => {
                    let ret = trim_span(bytes, Span::new(start, content.start - 1));
                    return Ok((ReturnClause::Single(ret), content));
                }
                Step::Newline | Step::End => return Err(missing_body(name, head)),
                Step::Token | Step::Group { .. } => {}
            }
        },
    }
}

fn expect_body(state: &mut ScanState, bytes: &[u8], name: &str, head: usize) -> ScanResult<Span> {
    state.skip_trivia(bytes)?;
    match state.step(bytes, &[])? {
        Step::Group {
            open: b'{',
            depth: 1,
            content,
        } => Ok(content),
        _ => Err(missing_body(name, head)),
    }
}

fn missing_body(name: &str, offset: usize) -> ScanError {
    ScanError::MissingBody {
        name: name.to_string(),
        offset,
    }
}

// ============================================================================
// Parameter Lists
// ============================================================================

/// A comma-separated entry before types are shared out.
enum ListEntry<'a> {
    Typed { name: &'a str, ty: &'a str, ty_offset: usize },
    Bare(&'a str),
}

/// Parse the interior of a parameter or return list.
///
/// Either every entry has a name (`a, b int, s string`), or none does
/// (`int, error`). In the first form a bare entry takes the type of the
/// next typed entry.
pub fn parse_variable_list(
    patterns: &PatternRegistry,
    text: &str,
    span: Span,
) -> ScanResult<Vec<Variable>> {
    let inner = strip_comments(&text[span.start..span.end]).map_err(|e| e.shifted(span.start))?;
    let pieces = split_top_level(inner.as_bytes(), b",").map_err(|e| e.shifted(span.start))?;

    let mut entries = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let raw = &inner[piece.start..piece.end];
        let entry = raw.trim();
        if entry.is_empty() {
            continue;
        }
        let offset = span.start + piece.start + (raw.len() - raw.trim_start().len());
        entries.push((offset, classify_entry(patterns, entry, offset)));
    }

    let any_typed = entries
        .iter()
        .any(|(_, e)| matches!(e, ListEntry::Typed { .. }));
    if !any_typed {
        return entries
            .into_iter()
            .map(|(offset, entry)| match entry {
                ListEntry::Bare(ty) | ListEntry::Typed { ty, .. } => {
                    Ok(Variable::new("", parse_at(ty, offset)?))
                }
            })
            .collect();
    }

    let mut vars = Vec::with_capacity(entries.len());
    let mut shared: Option<TypeNode> = None;
    for (offset, entry) in entries.into_iter().rev() {
        match entry {
            ListEntry::Typed {
                name,
                ty,
                ty_offset,
            } => {
                let node = parse_at(ty, ty_offset)?;
                shared = Some(node.clone());
                vars.push(Variable::new(name, node));
            }
            ListEntry::Bare(name) => match &shared {
                Some(node) if is_identifier(name) => vars.push(Variable::new(name, node.clone())),
                _ => {
                    return Err(ScanError::DanglingParameter {
                        entry: name.to_string(),
                        offset,
                    })
                }
            },
        }
    }
    vars.reverse();
    Ok(vars)
}

fn classify_entry<'a>(patterns: &PatternRegistry, entry: &'a str, offset: usize) -> ListEntry<'a> {
    if let Some(caps) = patterns.name_type().captures(entry) {
        if let (Some(name), Some(ty)) = (caps.name("name"), caps.name("type")) {
            if !is_type_keyword(name.as_str()) {
                return ListEntry::Typed {
                    name: name.as_str(),
                    ty: ty.as_str(),
                    ty_offset: offset + ty.start(),
                };
            }
        }
    }
    ListEntry::Bare(entry)
}

/// Keywords that start a type, so `chan int` is a type and not `name type`.
fn is_type_keyword(word: &str) -> bool {
    matches!(word, "chan" | "func" | "map" | "struct" | "interface")
}

fn parse_at(text: &str, offset: usize) -> ScanResult<TypeNode> {
    parse_type(text).map_err(|source| ScanError::InvalidType {
        text: text.trim().to_string(),
        offset,
        source,
    })
}

fn trim_span(bytes: &[u8], span: Span) -> Span {
    let mut start = span.start;
    let mut end = span.end;
    while start < end && bytes[start].is_ascii_whitespace() {
        start += 1;
    }
    while end > start && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    Span::new(start, end)
}

// ============================================================================
// Doc Comments
// ============================================================================

/// Contiguous `//` comment lines directly above the line containing `start`.
pub fn leading_doc(text: &str, start: usize) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut end = line_start_of(bytes, start);
    while end > 0 {
        let line_start = line_start_of(bytes, end - 1);
        let line = text[line_start..end - 1].trim();
        let Some(comment) = line.strip_prefix("//") else {
            break;
        };
        lines.push(comment.strip_prefix(' ').unwrap_or(comment).to_string());
        end = line_start;
    }
    lines.reverse();
    lines
}

// ============================================================================
// Type Declarations
// ============================================================================

/// Extract struct and interface declarations, including grouped ones.
pub fn extract_type_declarations(
    patterns: &PatternRegistry,
    text: &str,
) -> ScanResult<BTreeMap<String, TypeDecl>> {
    types_in(patterns, text, &mask_literals(text)?)
}

fn types_in(
    patterns: &PatternRegistry,
    text: &str,
    code: &str,
) -> ScanResult<BTreeMap<String, TypeDecl>> {
    let bytes = text.as_bytes();
    let mut decls = BTreeMap::new();

    for caps in patterns.type_head().captures_iter(code) {
        let decl = type_decl(patterns, text, &caps, 0)?;
        insert_type(&mut decls, decl);
    }

    for group in patterns.type_group().find_iter(code) {
        let group_span = enclosed_span(bytes, group.end() - 1, &[])?;
        let inner = &code[group_span.start..group_span.end];
        let mut cursor = 0;
        for caps in patterns.group_type_spec().captures_iter(inner) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() < cursor {
                continue;
            }
            let decl = type_decl(patterns, text, &caps, group_span.start)?;
            cursor = decl.body.end + 1 - group_span.start;
            insert_type(&mut decls, decl);
        }
    }

    Ok(decls)
}

/// Build a declaration from a head match whose offsets are relative to `base`.
fn type_decl(
    patterns: &PatternRegistry,
    text: &str,
    caps: &regex::Captures<'_>,
    base: usize,
) -> ScanResult<TypeDecl> {
    let bytes = text.as_bytes();
    let (line_start, open_brace) = caps
        .get(0)
        .map_or((base, base), |m| (base + m.start(), base + m.end() - 1));
    let body = enclosed_span(bytes, open_brace, &[])?;
    let name = caps.name("name").map_or("", |m| m.as_str()).to_string();
    let kind = match caps.name("kind").map(|m| m.as_str()) {
        Some("interface") => TypeKind::Interface,
        _ => TypeKind::Struct,
    };
    let type_params = caps.name("params").map(|m| {
        let params = &text[base + m.start()..base + m.end()];
        collapse_whitespace(&params[1..params.len() - 1])
    });
    let name_start = caps.name("name").map_or(line_start, |m| base + m.start());

    let (methods, embeds) = match kind {
        TypeKind::Interface => interface_elements(patterns, text, body)?,
        TypeKind::Struct => (Vec::new(), Vec::new()),
    };

    Ok(TypeDecl {
        doc: leading_doc(text, line_start),
        name,
        kind,
        type_params,
        span: Span::new(name_start, body.end + 1),
        body,
        methods,
        embeds,
    })
}

fn insert_type(decls: &mut BTreeMap<String, TypeDecl>, decl: TypeDecl) {
    match decls.entry(decl.name.clone()) {
        MapEntry::Vacant(slot) => {
            slot.insert(decl);
        }
        MapEntry::Occupied(slot) => {
            tracing::warn!("duplicate type {} in one file", slot.key());
        }
    }
}

/// Method names and embedded elements of an interface body.
fn interface_elements(
    patterns: &PatternRegistry,
    text: &str,
    body: Span,
) -> ScanResult<(Vec<String>, Vec<String>)> {
    let stripped = strip_comments(&text[body.start..body.end]).map_err(|e| e.shifted(body.start))?;
    let mut methods = Vec::new();
    let mut embeds = Vec::new();
    for piece in split_top_level(stripped.as_bytes(), b"\n;").map_err(|e| e.shifted(body.start))? {
        let line = stripped[piece.start..piece.end].trim();
        if line.is_empty() {
            continue;
        }
        match patterns.interface_method().captures(line).and_then(|c| c.name("name")) {
            Some(name) => methods.push(name.as_str().to_string()),
            None => embeds.push(collapse_whitespace(line)),
        }
    }
    Ok((methods, embeds))
}

// ============================================================================
// Struct Members
// ============================================================================

/// Parse the members of a struct body.
///
/// `A, B T` yields one member per name. An embedded member is keyed by its
/// bare type name (`*pkg.Base` -> `Base`). Doc comment lines directly above a
/// member, a backquoted tag and a trailing `//` comment are kept.
pub fn parse_struct_members(
    patterns: &PatternRegistry,
    text: &str,
    body: Span,
) -> ScanResult<Vec<Variable>> {
    let body_text = &text[body.start..body.end];
    let mut members = Vec::new();
    let mut doc: Vec<String> = Vec::new();

    for piece in split_top_level(body_text.as_bytes(), b"\n;").map_err(|e| e.shifted(body.start))? {
        let raw = &body_text[piece.start..piece.end];
        let line = raw.trim();
        if line.is_empty() {
            doc.clear();
            continue;
        }
        if let Some(comment) = line.strip_prefix("//") {
            doc.push(comment.strip_prefix(' ').unwrap_or(comment).to_string());
            continue;
        }
        if line.starts_with("/*") {
            continue;
        }

        let offset = body.start + piece.start + (raw.len() - raw.trim_start().len());
        let (field, comment) =
            split_trailing_comment(line).map_err(|e| e.shifted(offset))?;
        let field = strip_comments(field).map_err(|e| e.shifted(offset))?;
        let (field, tag) = split_tag(field.trim_end());
        let doc = std::mem::take(&mut doc);

        for mut member in field_members(patterns, field, offset)? {
            member.tag = tag.clone();
            member.doc = doc.clone();
            member.comment = comment.clone();
            members.push(member);
        }
    }

    Ok(members)
}

fn field_members(patterns: &PatternRegistry, field: &str, offset: usize) -> ScanResult<Vec<Variable>> {
    if let Some(caps) = patterns.field_names().captures(field) {
        if let (Some(names), Some(ty)) = (caps.name("names"), caps.name("type")) {
            let first = names.as_str().split(',').next().unwrap_or("").trim();
            if !is_type_keyword(first) {
                let node = parse_at(ty.as_str(), offset + ty.start())?;
                return Ok(names
                    .as_str()
                    .split(',')
                    .map(|name| Variable::new(name.trim(), node.clone()))
                    .collect());
            }
        }
    }

    let node = parse_at(field, offset)?;
    let Some(name) = node.base_name().map(str::to_string) else {
        return Err(ScanError::InvalidType {
            text: field.to_string(),
            offset,
            source: TypeParseError::Malformed {
                text: field.to_string(),
                reason: "embedded member must be a named type".to_string(),
            },
        });
    };
    let mut member = Variable::new(name, node);
    member.embedded = true;
    Ok(vec![member])
}

/// Split a member line into its code and a trailing comment.
///
/// Groups are stepped over whole; a comment inside an inline
/// `struct { ... }` belongs to that struct's fields.
fn split_trailing_comment(line: &str) -> ScanResult<(&str, Option<String>)> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if matches!(bytes.get(i + 1), Some(b'/') | Some(b'*')) => {
                let comment = line[i + 2..].trim_end_matches("*/").trim();
                return Ok((line[..i].trim_end(), Some(comment.to_string())));
            }
            b'(' | b'[' | b'{' => i = enclosed_span(bytes, i, &[])?.end + 1,
            _ => {
                i = match skip_literal(bytes, i)? {
                    Some(end) => end,
                    None => i + 1,
                };
            }
        }
    }
    Ok((line, None))
}

/// Split a trailing backquoted tag off a member.
fn split_tag(field: &str) -> (&str, Option<String>) {
    let Some(without_close) = field.strip_suffix('`') else {
        return (field, None);
    };
    match without_close.rfind('`') {
        Some(open) => (
            without_close[..open].trim_end(),
            Some(without_close[open + 1..].to_string()),
        ),
        None => (field, None),
    }
}

// ============================================================================
// Imports
// ============================================================================

/// Extract single-line and grouped imports, sorted by path.
pub fn extract_imports(patterns: &PatternRegistry, text: &str) -> ScanResult<Vec<Import>> {
    imports_in(patterns, text, &mask_literals(text)?)
}

fn imports_in(patterns: &PatternRegistry, text: &str, code: &str) -> ScanResult<Vec<Import>> {
    let bytes = text.as_bytes();
    let mut imports = Vec::new();

    for caps in patterns.import_single().captures_iter(code) {
        if let Some(import) = import_from(text, &caps) {
            imports.push(import);
        }
    }

    for group in patterns.import_group().find_iter(code) {
        let span = enclosed_span(bytes, group.end() - 1, &[])?;
        let inner = strip_comments(&text[span.start..span.end]).map_err(|e| e.shifted(span.start))?;
        for line in inner.split(['\n', ';']) {
            let line = line.trim();
            if let Some(caps) = patterns.import_spec().captures(line) {
                if let Some(import) = import_from(line, &caps) {
                    imports.push(import);
                }
            }
        }
    }

    imports.sort();
    Ok(imports)
}

/// Read an import out of `source`, which shares offsets with the haystack
/// `caps` matched.
fn import_from(source: &str, caps: &regex::Captures<'_>) -> Option<Import> {
    let path = caps.name("path")?;
    Some(Import {
        path: source[path.range()].to_string(),
        alias: caps.name("alias").map(|m| source[m.range()].to_string()),
    })
}

// ============================================================================
// Tests
// ============================================================================
