//! Punctuation-scope scanner.
//!
//! Two responsibilities live here:
//!
//! - **Balanced content**: [`balanced_length`] measures the bytes between an
//!   opening mark and its matching close, stepping over nested groups of the
//!   other bracket families and over string, rune and raw-string literals and
//!   comments.
//! - **Keyword scopes**: the same `{` or `(` opens different kinds of scope
//!   depending on the keyword before it (`func(`, `struct {`, `interface {`).
//!   [`ScanState`] carries a keyword stack that [`ScanState::step`] pushes when
//!   it completes a scope keyword and pops when that keyword's group closes.
//!
//! Skipped groups are measured with a fresh recursion that never touches the
//! caller's [`ScanState`], so an inner scan cannot corrupt an outer stack.

use declscan_core::text::Span;
use thiserror::Error;

use crate::typeexpr::TypeParseError;

// ============================================================================
// Delimiter Pairs
// ============================================================================

/// An opening and closing mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelimPair {
    pub open: u8,
    pub close: u8,
}

impl DelimPair {
    pub const PAREN: DelimPair = DelimPair::new(b'(', b')');
    pub const BRACKET: DelimPair = DelimPair::new(b'[', b']');
    pub const BRACE: DelimPair = DelimPair::new(b'{', b'}');

    pub const fn new(open: u8, close: u8) -> Self {
        DelimPair { open, close }
    }
}

/// Bracket families tracked by default.
pub const BRACKET_FAMILIES: [DelimPair; 3] = [DelimPair::PAREN, DelimPair::BRACKET, DelimPair::BRACE];

// ============================================================================
// Error Types
// ============================================================================

/// Error type for scanning and extraction.
///
/// Every variant carries the byte offset it was raised at so callers can
/// turn it into a `file:line:col` location.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The opening mark does not occur in the text.
    #[error("no '{open}' found")]
    MissingOpen { open: char, offset: usize },

    /// An opening mark has no matching close.
    #[error("unbalanced '{open}'")]
    Unbalanced { open: char, offset: usize },

    /// A string, rune, raw string or block comment never ends.
    #[error("unterminated literal or comment")]
    UnterminatedLiteral { offset: usize },

    /// A function head is not followed by a body.
    #[error("function '{name}' has no body")]
    MissingBody { name: String, offset: usize },

    /// A bare parameter name with no typed entry after it.
    #[error("parameter '{entry}' has no type")]
    DanglingParameter { entry: String, offset: usize },

    /// The file has no `package` clause.
    #[error("missing package clause")]
    MissingPackageClause,

    /// A parameter, return or member type could not be parsed.
    #[error("invalid type '{text}': {source}")]
    InvalidType {
        text: String,
        offset: usize,
        #[source]
        source: TypeParseError,
    },
}

/// Result type for scanning operations.
pub type ScanResult<T> = Result<T, ScanError>;

impl ScanError {
    /// Byte offset the error refers to.
    pub fn offset(&self) -> usize {
        match self {
            ScanError::MissingOpen { offset, .. }
            | ScanError::Unbalanced { offset, .. }
            | ScanError::UnterminatedLiteral { offset }
            | ScanError::MissingBody { offset, .. }
            | ScanError::DanglingParameter { offset, .. }
            | ScanError::InvalidType { offset, .. } => *offset,
            ScanError::MissingPackageClause => 0,
        }
    }

    /// Move the offset by `base`, for errors raised while scanning a slice
    /// that starts at `base` in the enclosing text.
    pub fn shifted(mut self, base: usize) -> Self {
        match &mut self {
            ScanError::MissingOpen { offset, .. }
            | ScanError::Unbalanced { offset, .. }
            | ScanError::UnterminatedLiteral { offset }
            | ScanError::MissingBody { offset, .. }
            | ScanError::DanglingParameter { offset, .. }
            | ScanError::InvalidType { offset, .. } => *offset += base,
            ScanError::MissingPackageClause => {}
        }
        self
    }
}

// ============================================================================
// Balanced Content
// ============================================================================

/// Length of the balanced content after the first `open` in `text`.
///
/// Counts bytes from just after the first `open` up to, not including, its
/// matching `close`. Nested `open`/`close` pairs change depth; groups of the
/// other bracket families are measured recursively and stepped over, unless
/// they are listed in `invalid`, in which case their marks are plain bytes.
///
/// ```
/// use declscan_go::scope::balanced_length;
///
/// let len = balanced_length(b"map[string]map[int]int", b'[', b']', &[]).unwrap();
/// assert_eq!(len, "string".len());
/// ```
pub fn balanced_length(
    text: &[u8],
    open: u8,
    close: u8,
    invalid: &[DelimPair],
) -> ScanResult<usize> {
    let start = find_open(text, open)?;
    content_length(text, start + 1, DelimPair::new(open, close), invalid)
}

/// Content span of the group whose opening mark sits at `open_pos`.
pub fn enclosed_span(text: &[u8], open_pos: usize, invalid: &[DelimPair]) -> ScanResult<Span> {
    let open = text[open_pos];
    let pair = BRACKET_FAMILIES
        .into_iter()
        .find(|p| p.open == open)
        .unwrap_or(DelimPair::new(open, open));
    let len = content_length(text, open_pos + 1, pair, invalid)?;
    Ok(Span::new(open_pos + 1, open_pos + 1 + len))
}

fn find_open(text: &[u8], open: u8) -> ScanResult<usize> {
    let mut i = 0;
    while i < text.len() {
        if text[i] == open {
            return Ok(i);
        }
        i = match skip_literal(text, i)? {
            Some(end) => end,
            None => i + 1,
        };
    }
    Err(ScanError::MissingOpen {
        open: open as char,
        offset: text.len(),
    })
}

/// Bytes from `start` to the close that balances an already-consumed open.
fn content_length(
    text: &[u8],
    start: usize,
    pair: DelimPair,
    invalid: &[DelimPair],
) -> ScanResult<usize> {
    let mut depth = 1usize;
    let mut i = start;
    while i < text.len() {
        let b = text[i];
        if b == pair.close {
            depth -= 1;
            if depth == 0 {
                return Ok(i - start);
            }
            i += 1;
            continue;
        }
        if b == pair.open {
            depth += 1;
            i += 1;
            continue;
        }
        if let Some(end) = skip_literal(text, i)? {
            i = end;
            continue;
        }
        if let Some(other) = tracked_family(b, invalid) {
            let inner = content_length(text, i + 1, other, invalid)?;
            i += inner + 2;
            continue;
        }
        i += 1;
    }
    Err(ScanError::Unbalanced {
        open: pair.open as char,
        offset: start.saturating_sub(1),
    })
}

fn tracked_family(b: u8, invalid: &[DelimPair]) -> Option<DelimPair> {
    BRACKET_FAMILIES
        .into_iter()
        .find(|p| p.open == b && !invalid.contains(p))
}

// ============================================================================
// Literals and Comments
// ============================================================================

/// If a literal or comment starts at `pos`, the offset just past it.
///
/// Handles interpreted strings, runes, raw strings, line comments and block
/// comments. A line comment ends before its newline.
pub fn skip_literal(text: &[u8], pos: usize) -> ScanResult<Option<usize>> {
    let Some(&b) = text.get(pos) else {
        return Ok(None);
    };
    match b {
        b'"' | b'\'' => {
            let mut i = pos + 1;
            while i < text.len() {
                match text[i] {
                    b'\\' => i += 2,
                    b'\n' => break,
                    c if c == b => return Ok(Some(i + 1)),
                    _ => i += 1,
                }
            }
            Err(ScanError::UnterminatedLiteral { offset: pos })
        }
        b'`' => match text[pos + 1..].iter().position(|&c| c == b'`') {
            Some(p) => Ok(Some(pos + 1 + p + 1)),
            None => Err(ScanError::UnterminatedLiteral { offset: pos }),
        },
        b'/' => match text.get(pos + 1) {
            Some(b'/') => Ok(Some(
                text[pos..]
                    .iter()
                    .position(|&c| c == b'\n')
                    .map(|p| pos + p)
                    .unwrap_or(text.len()),
            )),
            Some(b'*') => match text[pos + 2..].windows(2).position(|w| w == b"*/") {
                Some(p) => Ok(Some(pos + 2 + p + 2)),
                None => Err(ScanError::UnterminatedLiteral { offset: pos }),
            },
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

/// Skip spaces, tabs, carriage returns and block comments from `pos`.
///
/// Newlines and line comments are significant and stop the skip.
pub fn skip_trivia(text: &[u8], mut pos: usize) -> ScanResult<usize> {
    loop {
        match text.get(pos) {
            Some(b' ' | b'\t' | b'\r') => pos += 1,
            Some(b'/') if text.get(pos + 1) == Some(&b'*') => {
                pos = skip_literal(text, pos)?.unwrap_or(pos + 1);
            }
            _ => return Ok(pos),
        }
    }
}

/// Replace every comment byte with a space, keeping newlines and offsets.
pub fn strip_comments(text: &str) -> ScanResult<String> {
    blank_literals(text, false)
}

/// Blank comments and the contents of string and rune literals.
///
/// Quotes and newlines are kept, so offsets into the result are offsets into
/// `text`. Line-anchored patterns run over the result never match inside a
/// literal or comment.
pub fn mask_literals(text: &str) -> ScanResult<String> {
    blank_literals(text, true)
}

fn blank_literals(text: &str, strings: bool) -> ScanResult<String> {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;
    while i < bytes.len() {
        match skip_literal(bytes, i)? {
            Some(end) => {
                let blanked = if bytes[i] == b'/' {
                    Some(i..end)
                } else if strings {
                    Some(i + 1..end - 1)
                } else {
                    None
                };
                if let Some(range) = blanked {
                    for byte in &mut out[range] {
                        if *byte != b'\n' {
                            *byte = b' ';
                        }
                    }
                }
                i = end;
            }
            None => i += 1,
        }
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Split `text` on any of `separators` that sit outside every group,
/// literal and comment.
///
/// Returns the spans between separators, including empty ones.
pub fn split_top_level(text: &[u8], separators: &[u8]) -> ScanResult<Vec<Span>> {
    let mut spans = Vec::new();
    let mut piece_start = 0;
    let mut i = 0;
    while i < text.len() {
        let b = text[i];
        if separators.contains(&b) {
            spans.push(Span::new(piece_start, i));
            piece_start = i + 1;
            i += 1;
            continue;
        }
        if let Some(end) = skip_literal(text, i)? {
            i = end;
            continue;
        }
        if tracked_family(b, &[]).is_some() {
            i = enclosed_span(text, i, &[])?.end + 1;
            continue;
        }
        i += 1;
    }
    spans.push(Span::new(piece_start, text.len()));
    Ok(spans)
}

// ============================================================================
// Keyword-Scope State
// ============================================================================

/// Keywords that introduce a delimited scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKeyword {
    Func,
    Struct,
    Interface,
}

impl ScopeKeyword {
    pub fn from_token(token: &[u8]) -> Option<Self> {
        match token {
            b"func" => Some(ScopeKeyword::Func),
            b"struct" => Some(ScopeKeyword::Struct),
            b"interface" => Some(ScopeKeyword::Interface),
            _ => None,
        }
    }

    /// The mark that opens this keyword's scope.
    pub fn scope_open(self) -> u8 {
        match self {
            ScopeKeyword::Func => b'(',
            ScopeKeyword::Struct | ScopeKeyword::Interface => b'{',
        }
    }
}

/// What one [`ScanState::step`] consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// An identifier byte, punctuation, literal or comment.
    Token,
    /// A newline outside any group.
    Newline,
    /// A whole bracket group. `depth` is the keyword-stack depth at the
    /// moment the group opened.
    Group { open: u8, content: Span, depth: usize },
    /// End of text.
    End,
}

/// Explicit scanner state: keyword stack, position and pending token.
#[derive(Debug, Clone)]
pub struct ScanState {
    stack: Vec<ScopeKeyword>,
    pos: usize,
    token: Vec<u8>,
}

impl ScanState {
    /// Start scanning at `pos` inside the scope of `root`.
    ///
    /// The root keyword is never popped.
    pub fn new(root: ScopeKeyword, pos: usize) -> Self {
        ScanState {
            stack: vec![root],
            pos,
            token: Vec::new(),
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn top(&self) -> Option<ScopeKeyword> {
        self.stack.last().copied()
    }

    /// Advance past one token, group, literal or newline.
    pub fn step(&mut self, text: &[u8], invalid: &[DelimPair]) -> ScanResult<Step> {
        let Some(&b) = text.get(self.pos) else {
            self.flush_token();
            return Ok(Step::End);
        };

        if is_ident_byte(b) {
            self.token.push(b);
            self.pos += 1;
            return Ok(Step::Token);
        }
        self.flush_token();

        if let Some(end) = skip_literal(text, self.pos)? {
            self.pos = end;
            return Ok(Step::Token);
        }
        if b == b'\n' {
            self.pos += 1;
            return Ok(Step::Newline);
        }
        if tracked_family(b, invalid).is_some() {
            let depth = self.stack.len();
            let content = enclosed_span(text, self.pos, invalid)?;
            self.pos = content.end + 1;
            if self.stack.len() > 1 && self.top().map(ScopeKeyword::scope_open) == Some(b) {
                self.stack.pop();
            }
            return Ok(Step::Group {
                open: b,
                content,
                depth,
            });
        }

        self.pos += 1;
        Ok(Step::Token)
    }

    /// Skip trivia at the current position.
    pub fn skip_trivia(&mut self, text: &[u8]) -> ScanResult<()> {
        self.flush_token();
        self.pos = skip_trivia(text, self.pos)?;
        Ok(())
    }

    fn flush_token(&mut self) {
        if let Some(keyword) = ScopeKeyword::from_token(&self.token) {
            self.stack.push(keyword);
        }
        self.token.clear();
    }
}

/// Whether `b` can be part of an identifier. Non-ASCII bytes count.
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Whether `text` is a single identifier.
pub fn is_identifier(text: &str) -> bool {
    let bytes = text.as_bytes();
    !bytes.is_empty() && !bytes[0].is_ascii_digit() && bytes.iter().all(|&b| is_ident_byte(b))
}

// ============================================================================
// Tests
// ============================================================================
