//! Declaration entities: structs, interfaces, functions and methods.

use std::sync::Arc;

use super::cache::Memo;
use super::file::File;
use super::package::SourceSet;
use super::{EntityKind, ModelError, ModelResult};
use crate::decl::{method_key, FunctionDecl, Receiver, TypeDecl, Variable};
use crate::typeexpr::Qualifiers;

// ============================================================================
// Function / Method
// ============================================================================

/// A function or method. Methods carry a receiver.
#[derive(Debug)]
pub struct Function {
    decl: FunctionDecl,
    file: Arc<File>,
}

/// Methods share the function representation.
pub type Method = Function;

impl Function {
    pub(crate) fn new(decl: FunctionDecl, file: Arc<File>) -> Self {
        Function { decl, file }
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn receiver(&self) -> Option<&Receiver> {
        self.decl.receiver.as_ref()
    }

    pub fn params(&self) -> &[Variable] {
        &self.decl.params
    }

    /// Return types, never named.
    pub fn returns(&self) -> &[Variable] {
        &self.decl.returns
    }

    /// The source named its return values. Names are not bound.
    pub fn has_named_returns(&self) -> bool {
        self.decl.named_returns
    }

    pub fn doc(&self) -> &[String] {
        &self.decl.doc
    }

    pub fn qualifiers(&self) -> Qualifiers {
        self.decl.qualifiers()
    }

    pub fn decl(&self) -> &FunctionDecl {
        &self.decl
    }

    pub fn file(&self) -> &File {
        &self.file
    }
}

// ============================================================================
// Interface
// ============================================================================

#[derive(Debug)]
pub struct Interface {
    decl: TypeDecl,
    file: Arc<File>,
}

impl Interface {
    pub(crate) fn new(decl: TypeDecl, file: Arc<File>) -> Self {
        Interface { decl, file }
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn doc(&self) -> &[String] {
        &self.decl.doc
    }

    /// Method names in source order.
    pub fn methods(&self) -> &[String] {
        &self.decl.methods
    }

    /// Embedded interfaces and constraint terms.
    pub fn embeds(&self) -> &[String] {
        &self.decl.embeds
    }

    pub fn decl(&self) -> &TypeDecl {
        &self.decl
    }

    pub fn file(&self) -> &File {
        &self.file
    }
}

// ============================================================================
// Struct
// ============================================================================

/// A struct with lazily populated member and method maps.
///
/// Members come from the struct body, parsed on the first member search.
/// Methods may live in any file of the package and are found by scanning
/// the package's files in order.
#[derive(Debug)]
pub struct Struct {
    decl: TypeDecl,
    file: Arc<File>,
    sources: Arc<SourceSet>,
    members: Memo<Variable>,
    methods: Memo<Method>,
}

impl Struct {
    pub(crate) fn new(decl: TypeDecl, file: Arc<File>, sources: Arc<SourceSet>) -> Self {
        Struct {
            decl,
            file,
            sources,
            members: Memo::new("member"),
            methods: Memo::new("method"),
        }
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn doc(&self) -> &[String] {
        &self.decl.doc
    }

    pub fn type_params(&self) -> Option<&str> {
        self.decl.type_params.as_deref()
    }

    pub fn decl(&self) -> &TypeDecl {
        &self.decl
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    /// Find a member by name. Embedded members are found by type name.
    pub fn search_member(&self, name: &str) -> ModelResult<Arc<Variable>> {
        self.members
            .get_or_scan(name, 1, |_| self.scan_members())?
            .ok_or_else(|| ModelError::not_found(EntityKind::Member, method_key(self.name(), name)))
    }

    /// Find a method declared on this struct in any file of the package.
    pub fn search_method(&self, name: &str) -> ModelResult<Arc<Method>> {
        self.methods
            .get_or_scan(name, self.sources.files().len(), |i| self.scan_methods(i))?
            .ok_or_else(|| ModelError::not_found(EntityKind::Method, method_key(self.name(), name)))
    }

    /// All members, parsing the body if needed.
    pub fn members(&self) -> ModelResult<Vec<Arc<Variable>>> {
        self.members.scan_all(1, |_| self.scan_members())
    }

    /// All methods, scanning every file if needed.
    pub fn methods(&self) -> ModelResult<Vec<Arc<Method>>> {
        self.methods
            .scan_all(self.sources.files().len(), |i| self.scan_methods(i))
    }

    /// Members found so far, without scanning.
    pub fn cached_members(&self) -> Vec<Arc<Variable>> {
        self.members.cached()
    }

    /// Methods found so far, without scanning.
    pub fn cached_methods(&self) -> Vec<Arc<Method>> {
        self.methods.cached()
    }

    fn scan_members(&self) -> ModelResult<Vec<(String, Variable)>> {
        let text = self.file.source()?;
        let members = self
            .sources
            .parser()
            .parse_members(&text, &self.decl)
            .map_err(|e| self.file.scan_error(&text, e))?;
        Ok(members.into_iter().map(|m| (m.name.clone(), m)).collect())
    }

    fn scan_methods(&self, unit: usize) -> ModelResult<Vec<(String, Method)>> {
        let file = &self.sources.files()[unit];
        let decls = file.declarations(self.sources.parser())?;
        Ok(decls
            .methods_of(self.name())
            .map(|f| (f.name.clone(), Function::new(f.clone(), Arc::clone(file))))
            .collect())
    }
}
