//! Serializable snapshots of model entities.
//!
//! Snapshots only show what is already cached; taking one never scans a
//! file. Call [`Package::populate`] first for a complete picture.

use std::collections::BTreeMap;

use declscan_core::types::Location;
use serde::Serialize;

use super::entity::{Function, Interface, Struct};
use super::package::Package;
use super::project::Project;
use crate::decl::{Receiver, Variable};
use crate::typeexpr::{Qualifiers, TypeNode};

// ============================================================================
// Snapshot Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VariableInfo {
    pub name: String,
    /// Canonical type text.
    #[serde(rename = "type")]
    pub ty: String,
    pub tree: TypeNode,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub embedded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub doc: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Receiver>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_params: Option<String>,
    pub params: Vec<VariableInfo>,
    pub returns: Vec<VariableInfo>,
    pub named_returns: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub doc: Vec<String>,
    pub location: Location,
    #[serde(skip_serializing_if = "Qualifiers::is_empty")]
    pub qualifiers: Qualifiers,
    /// Import path of each qualifier, from the declaring file's imports.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub imports: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_params: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub doc: Vec<String>,
    pub location: Location,
    /// Cached members only.
    pub members: Vec<VariableInfo>,
    /// Cached methods only.
    pub methods: Vec<FunctionInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_params: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub doc: Vec<String>,
    pub location: Location,
    pub methods: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub import_path: String,
    /// Directory relative to the project root.
    pub dir: String,
    pub files: Vec<String>,
    pub structs: Vec<StructInfo>,
    pub interfaces: Vec<InterfaceInfo>,
    pub functions: Vec<FunctionInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDump {
    pub root: String,
    pub module: String,
    pub parser: &'static str,
    pub packages: Vec<PackageInfo>,
}

// ============================================================================
// Introspect
// ============================================================================

/// Entities that can describe their cached state.
pub trait Introspect {
    type Info: Serialize;

    fn info(&self) -> Self::Info;

    /// Write the snapshot as JSON to the trace log.
    fn trace_dump(&self) {
        match serde_json::to_string(&self.info()) {
            Ok(json) => tracing::trace!("{}", json),
            Err(e) => tracing::warn!("cannot serialize dump: {}", e),
        }
    }
}

impl Introspect for Variable {
    type Info = VariableInfo;

    fn info(&self) -> VariableInfo {
        VariableInfo {
            name: self.name.clone(),
            ty: self.ty.to_string(),
            tree: self.ty.clone(),
            embedded: self.embedded,
            tag: self.tag.clone(),
            doc: self.doc.clone(),
            comment: self.comment.clone(),
        }
    }
}

impl Introspect for Function {
    type Info = FunctionInfo;

    fn info(&self) -> FunctionInfo {
        let decl = self.decl();
        let qualifiers = decl.qualifiers();
        let imports = match self.file().parsed() {
            Some(file_decls) => qualifiers
                .keys()
                .filter_map(|alias| {
                    let import = file_decls.resolve_alias(alias)?;
                    Some((alias.clone(), import.path.clone()))
                })
                .collect(),
            None => BTreeMap::new(),
        };
        FunctionInfo {
            name: decl.name.clone(),
            receiver: decl.receiver.clone(),
            type_params: decl.type_params.clone(),
            params: decl.params.iter().map(Introspect::info).collect(),
            returns: decl.returns.iter().map(Introspect::info).collect(),
            named_returns: decl.named_returns,
            doc: decl.doc.clone(),
            location: self.file().location(decl.span.start),
            qualifiers,
            imports,
        }
    }
}

impl Introspect for Struct {
    type Info = StructInfo;

    fn info(&self) -> StructInfo {
        let decl = self.decl();
        StructInfo {
            name: decl.name.clone(),
            type_params: decl.type_params.clone(),
            doc: decl.doc.clone(),
            location: self.file().location(decl.span.start),
            members: self.cached_members().iter().map(|m| m.info()).collect(),
            methods: self.cached_methods().iter().map(|m| m.info()).collect(),
        }
    }
}

impl Introspect for Interface {
    type Info = InterfaceInfo;

    fn info(&self) -> InterfaceInfo {
        let decl = self.decl();
        InterfaceInfo {
            name: decl.name.clone(),
            type_params: decl.type_params.clone(),
            doc: decl.doc.clone(),
            location: self.file().location(decl.span.start),
            methods: decl.methods.clone(),
            embeds: decl.embeds.clone(),
        }
    }
}

impl Introspect for Package {
    type Info = PackageInfo;

    fn info(&self) -> PackageInfo {
        PackageInfo {
            name: self.name().to_string(),
            import_path: self.import_path().to_string(),
            dir: self.rel_dir().to_string(),
            files: self.files().iter().map(|f| f.rel_path().to_string()).collect(),
            structs: self.cached_structs().iter().map(|s| s.info()).collect(),
            interfaces: self.cached_interfaces().iter().map(|i| i.info()).collect(),
            functions: self.cached_functions().iter().map(|f| f.info()).collect(),
        }
    }
}

impl Introspect for Project {
    type Info = ProjectDump;

    fn info(&self) -> ProjectDump {
        ProjectDump {
            root: self.root().display().to_string(),
            module: self.module_name().to_string(),
            parser: self.parser().name(),
            packages: self.packages().map(|p| p.info()).collect(),
        }
    }
}

impl Project {
    /// JSON-ready tree of everything cached so far.
    pub fn dump(&self) -> ProjectDump {
        self.info()
    }
}
