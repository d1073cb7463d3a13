//! CLI front door.
//!
//! Each `run_*` function takes an open [`Project`] (or plain input) and
//! returns a serializable payload. The binary wraps payloads in the JSON
//! envelope from [`declscan_core::output`]; tests call these directly.
//!
//! All functions return `Result<T, DeclscanError>` so the binary can map
//! failures to stable exit codes.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use declscan_core::config::ProjectConfig;
use declscan_core::error::DeclscanError;
use declscan_go::model::{
    FunctionInfo, InterfaceInfo, Introspect, PackageInfo, Project, StructInfo, VariableInfo,
};
use declscan_go::parser::TextScanParser;
use declscan_go::typeexpr::{collect_qualifiers, parse_type, Qualifiers, TypeNode};

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PackageSummary {
    pub name: String,
    pub import_path: String,
    pub dir: String,
    pub files: usize,
}

#[derive(Debug, Serialize)]
pub struct PackagesPayload {
    pub module: String,
    pub packages: Vec<PackageSummary>,
}

#[derive(Debug, Serialize)]
pub struct StructPayload {
    pub package: String,
    #[serde(rename = "struct")]
    pub info: StructInfo,
}

#[derive(Debug, Serialize)]
pub struct InterfacePayload {
    pub package: String,
    pub interface: InterfaceInfo,
}

#[derive(Debug, Serialize)]
pub struct FunctionPayload {
    pub package: String,
    pub function: FunctionInfo,
}

#[derive(Debug, Serialize)]
pub struct MethodPayload {
    pub package: String,
    pub method: FunctionInfo,
}

#[derive(Debug, Serialize)]
pub struct MemberPayload {
    pub package: String,
    #[serde(rename = "struct")]
    pub struct_name: String,
    pub member: VariableInfo,
}

#[derive(Debug, Serialize)]
pub struct TypePayload {
    pub input: String,
    pub canonical: String,
    pub category: &'static str,
    pub tree: TypeNode,
    pub qualifiers: Qualifiers,
}

#[derive(Debug, Serialize)]
pub struct DumpPayload {
    pub module: String,
    pub package: PackageInfo,
}

// ============================================================================
// Project
// ============================================================================

/// Load the project at `root` with `declscan.json` plus CLI overrides.
pub fn open_project(
    root: &Path,
    include: &[String],
    exclude: &[String],
    tests: bool,
) -> Result<Project, DeclscanError> {
    let config = ProjectConfig::load(root)?.merge_cli(include, exclude, tests);
    let project = Project::load_with(root, config, Arc::new(TextScanParser::new()))?;
    Ok(project)
}

// ============================================================================
// Commands
// ============================================================================

pub fn run_packages(project: &Project) -> PackagesPayload {
    PackagesPayload {
        module: project.module_name().to_string(),
        packages: project
            .packages()
            .map(|p| PackageSummary {
                name: p.name().to_string(),
                import_path: p.import_path().to_string(),
                dir: p.rel_dir().to_string(),
                files: p.files().len(),
            })
            .collect(),
    }
}

/// Struct with all of its members and methods.
pub fn run_struct(project: &Project, package: &str, name: &str) -> Result<StructPayload, DeclscanError> {
    let pkg = project.resolve_package(package)?;
    let st = pkg.search_struct(name)?;
    st.members()?;
    st.methods()?;
    Ok(StructPayload {
        package: pkg.import_path().to_string(),
        info: st.info(),
    })
}

pub fn run_interface(
    project: &Project,
    package: &str,
    name: &str,
) -> Result<InterfacePayload, DeclscanError> {
    let pkg = project.resolve_package(package)?;
    let iface = pkg.search_interface(name)?;
    Ok(InterfacePayload {
        package: pkg.import_path().to_string(),
        interface: iface.info(),
    })
}

pub fn run_function(
    project: &Project,
    package: &str,
    name: &str,
) -> Result<FunctionPayload, DeclscanError> {
    let pkg = project.resolve_package(package)?;
    let function = pkg.search_function(name)?;
    Ok(FunctionPayload {
        package: pkg.import_path().to_string(),
        function: function.info(),
    })
}

pub fn run_method(
    project: &Project,
    package: &str,
    type_name: &str,
    name: &str,
) -> Result<MethodPayload, DeclscanError> {
    let pkg = project.resolve_package(package)?;
    let method = pkg.search_method(type_name, name)?;
    Ok(MethodPayload {
        package: pkg.import_path().to_string(),
        method: method.info(),
    })
}

pub fn run_member(
    project: &Project,
    package: &str,
    struct_name: &str,
    name: &str,
) -> Result<MemberPayload, DeclscanError> {
    let pkg = project.resolve_package(package)?;
    let member = pkg.search_struct(struct_name)?.search_member(name)?;
    Ok(MemberPayload {
        package: pkg.import_path().to_string(),
        struct_name: struct_name.to_string(),
        member: member.info(),
    })
}

/// Parse a type expression given on the command line.
pub fn run_type(text: &str) -> Result<TypePayload, DeclscanError> {
    let tree = parse_type(text)?;
    Ok(TypePayload {
        input: text.to_string(),
        canonical: tree.to_string(),
        category: tree.category(),
        qualifiers: collect_qualifiers(&tree),
        tree,
    })
}

/// Populate a package completely and dump it.
pub fn run_dump(project: &Project, package: &str) -> Result<DumpPayload, DeclscanError> {
    let pkg = project.resolve_package(package)?;
    pkg.populate()?;
    pkg.trace_dump();
    Ok(DumpPayload {
        module: project.module_name().to_string(),
        package: pkg.info(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project::from_sources(
            "example.com/shop",
            &[
                (
                    "cart/cart.go",
                    "package cart\n\ntype Cart struct {\n\tItems []Item\n}\n\nfunc (c *Cart) Total() (int, error) {\n\treturn 0, nil\n}\n",
                ),
                ("cart/item.go", "package cart\n\ntype Item struct {\n\tSKU string\n}\n"),
            ],
            Arc::new(TextScanParser::new()),
        )
        .unwrap()
    }

    #[test]
    fn struct_payload_includes_methods() {
        let payload = run_struct(&project(), "cart", "Cart").unwrap();
        assert_eq!(payload.package, "example.com/shop/cart");
        assert_eq!(payload.info.members[0].ty, "[]Item");
        assert_eq!(payload.info.methods[0].returns.len(), 2);
    }

    #[test]
    fn missing_member_maps_to_resolution_code() {
        let err = run_member(&project(), "cart", "Item", "Price").unwrap_err();
        assert_eq!(err.error_code().code(), 3);
    }

    #[test]
    fn type_payload() {
        let payload = run_type("*map[string]pkg.Value").unwrap();
        assert_eq!(payload.category, "pointer");
        assert_eq!(payload.canonical, "*map[string]pkg.Value");
        assert!(payload.qualifiers["pkg"].contains("Value"));
    }

    #[test]
    fn bad_type_text_is_invalid_arguments() {
        let err = run_type("   ").unwrap_err();
        assert_eq!(err.error_code().code(), 2);
    }

    #[test]
    fn dump_populates_the_package() {
        let payload = run_dump(&project(), "cart").unwrap();
        assert_eq!(payload.package.structs.len(), 2);
        assert_eq!(payload.package.files, ["cart/cart.go", "cart/item.go"]);
    }
}
