//! Packages and their shared source sets.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::cache::Memo;
use super::entity::{Function, Interface, Method, Struct};
use super::file::File;
use super::{EntityKind, ModelError, ModelResult};
use crate::decl::{method_key, TypeKind};
use crate::parser::SourceParser;

// ============================================================================
// Source Set
// ============================================================================

/// A package's files, in lexical order, plus the parser that reads them.
///
/// Shared by the package and every struct in it, so method lookups can scan
/// the whole package without a back-reference to it.
pub struct SourceSet {
    files: Vec<Arc<File>>,
    parser: Arc<dyn SourceParser>,
}

impl SourceSet {
    pub fn new(mut files: Vec<Arc<File>>, parser: Arc<dyn SourceParser>) -> Self {
        files.sort_by(|a, b| a.name().cmp(b.name()));
        SourceSet { files, parser }
    }

    pub fn files(&self) -> &[Arc<File>] {
        &self.files
    }

    pub fn parser(&self) -> &dyn SourceParser {
        self.parser.as_ref()
    }
}

impl fmt::Debug for SourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceSet")
            .field("files", &self.files.iter().map(|x| x.rel_path()).collect::<Vec<_>>())
            .field("parser", &self.parser.name())
            .finish()
    }
}

// ============================================================================
// Package
// ============================================================================

/// One directory's package with lazily populated declaration maps.
#[derive(Debug)]
pub struct Package {
    name: String,
    dir: PathBuf,
    rel_dir: String,
    import_path: String,
    sources: Arc<SourceSet>,
    structs: Memo<Struct>,
    interfaces: Memo<Interface>,
    functions: Memo<Function>,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        dir: impl Into<PathBuf>,
        rel_dir: impl Into<String>,
        import_path: impl Into<String>,
        sources: SourceSet,
    ) -> Self {
        Package {
            name: name.into(),
            dir: dir.into(),
            rel_dir: rel_dir.into(),
            import_path: import_path.into(),
            sources: Arc::new(sources),
            structs: Memo::new("struct"),
            interfaces: Memo::new("interface"),
            functions: Memo::new("function"),
        }
    }

    /// Name from the `package` clause.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory relative to the project root; empty for the root package.
    pub fn rel_dir(&self) -> &str {
        &self.rel_dir
    }

    /// Module path plus the relative directory.
    pub fn import_path(&self) -> &str {
        &self.import_path
    }

    pub fn files(&self) -> &[Arc<File>] {
        self.sources.files()
    }

    // ------------------------------------------------------------------------
    // Searches
    // ------------------------------------------------------------------------

    pub fn search_struct(&self, name: &str) -> ModelResult<Arc<Struct>> {
        self.structs
            .get_or_scan(name, self.file_count(), |i| self.scan_structs(i))?
            .ok_or_else(|| ModelError::not_found(EntityKind::Struct, name))
    }

    pub fn search_interface(&self, name: &str) -> ModelResult<Arc<Interface>> {
        self.interfaces
            .get_or_scan(name, self.file_count(), |i| self.scan_interfaces(i))?
            .ok_or_else(|| ModelError::not_found(EntityKind::Interface, name))
    }

    pub fn search_function(&self, name: &str) -> ModelResult<Arc<Function>> {
        self.functions
            .get_or_scan(name, self.file_count(), |i| self.scan_functions(i))?
            .ok_or_else(|| ModelError::not_found(EntityKind::Function, name))
    }

    /// Resolve the struct, then the method on it.
    pub fn search_method(&self, struct_name: &str, method: &str) -> ModelResult<Arc<Method>> {
        let owner = self.search_struct(struct_name).map_err(|e| match e {
            ModelError::NotFound { .. } => {
                ModelError::not_found(EntityKind::Method, method_key(struct_name, method))
            }
            other => other,
        })?;
        owner.search_method(method)
    }

    /// Scan every file and every struct body, filling all maps.
    pub fn populate(&self) -> ModelResult<()> {
        let n = self.file_count();
        let structs = self.structs.scan_all(n, |i| self.scan_structs(i))?;
        self.interfaces.scan_all(n, |i| self.scan_interfaces(i))?;
        self.functions.scan_all(n, |i| self.scan_functions(i))?;
        for st in structs {
            st.members()?;
            st.methods()?;
        }
        Ok(())
    }

    pub fn cached_structs(&self) -> Vec<Arc<Struct>> {
        self.structs.cached()
    }

    pub fn cached_interfaces(&self) -> Vec<Arc<Interface>> {
        self.interfaces.cached()
    }

    pub fn cached_functions(&self) -> Vec<Arc<Function>> {
        self.functions.cached()
    }

    fn file_count(&self) -> usize {
        self.sources.files().len()
    }

    fn scan_structs(&self, unit: usize) -> ModelResult<Vec<(String, Struct)>> {
        let file = &self.sources.files()[unit];
        let decls = file.declarations(self.sources.parser())?;
        Ok(decls
            .types_of(TypeKind::Struct)
            .map(|d| {
                let st = Struct::new(d.clone(), Arc::clone(file), Arc::clone(&self.sources));
                (d.name.clone(), st)
            })
            .collect())
    }

    fn scan_interfaces(&self, unit: usize) -> ModelResult<Vec<(String, Interface)>> {
        let file = &self.sources.files()[unit];
        let decls = file.declarations(self.sources.parser())?;
        Ok(decls
            .types_of(TypeKind::Interface)
            .map(|d| (d.name.clone(), Interface::new(d.clone(), Arc::clone(file))))
            .collect())
    }

    fn scan_functions(&self, unit: usize) -> ModelResult<Vec<(String, Function)>> {
        let file = &self.sources.files()[unit];
        let decls = file.declarations(self.sources.parser())?;
        Ok(decls
            .free_functions()
            .map(|f| (f.name.clone(), Function::new(f.clone(), Arc::clone(file))))
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TextScanParser;
    use crate::typeexpr::{IntKind, TypeNode};

    const SHAPES: &str = "package geo\n\n// Circle is round.\ntype Circle struct {\n\tRadius float64\n\t*Base\n}\n\nfunc NewCircle(r float64) *Circle {\n\treturn &Circle{Radius: r}\n}\n";
    const METHODS: &str = "package geo\n\nfunc (c *Circle) Area() float64 {\n\treturn 3 * c.Radius * c.Radius\n}\n\nfunc (c Circle) Scale(k int) Circle {\n\treturn c\n}\n\ntype Shape interface {\n\tArea() float64\n}\n";

    fn package() -> Package {
        let files = vec![
            Arc::new(File::from_source("geo/shapes.go", SHAPES)),
            Arc::new(File::from_source("geo/methods.go", METHODS)),
        ];
        let sources = SourceSet::new(files, Arc::new(TextScanParser::new()));
        Package::new("geo", "/tmp/geo", "geo", "example.com/m/geo", sources)
    }

    mod structs {
        use super::*;

        #[test]
        fn search_struct_is_memoized() {
            let pkg = package();
            let first = pkg.search_struct("Circle").unwrap();
            let second = pkg.search_struct("Circle").unwrap();
            assert!(Arc::ptr_eq(&first, &second));
            assert_eq!(first.doc(), ["Circle is round."]);
            assert_eq!(first.file().name(), "shapes.go");
        }

        #[test]
        fn files_are_scanned_in_name_order() {
            let pkg = package();
            pkg.search_struct("Circle").unwrap();
            // methods.go sorts first and is scanned before shapes.go.
            assert!(pkg.files()[0].is_parsed());
            assert_eq!(pkg.files()[0].name(), "methods.go");
        }

        #[test]
        fn members_include_embedded_by_type_name() {
            let pkg = package();
            let circle = pkg.search_struct("Circle").unwrap();
            let radius = circle.search_member("Radius").unwrap();
            assert_eq!(radius.ty.to_string(), "float64");
            let base = circle.search_member("Base").unwrap();
            assert!(base.embedded);
            let again = circle.search_member("Radius").unwrap();
            assert!(Arc::ptr_eq(&radius, &again));
        }

        #[test]
        fn missing_member_is_not_found() {
            let pkg = package();
            let circle = pkg.search_struct("Circle").unwrap();
            let err = circle.search_member("Diameter").unwrap_err();
            assert!(matches!(err, ModelError::NotFound { kind: EntityKind::Member, .. }));
            assert!(err.to_string().contains("Circle.Diameter"));
        }
    }

    mod methods {
        use super::*;

        #[test]
        fn methods_are_found_across_files() {
            let pkg = package();
            let area = pkg.search_method("Circle", "Area").unwrap();
            assert!(area.receiver().unwrap().pointer);
            assert_eq!(area.file().name(), "methods.go");
            let scale = pkg.search_method("Circle", "Scale").unwrap();
            assert!(!scale.receiver().unwrap().pointer);
            assert_eq!(scale.params()[0].ty, TypeNode::Int(IntKind::Int));
        }

        #[test]
        fn method_search_resolves_struct_first() {
            let pkg = package();
            assert!(pkg.cached_structs().is_empty());
            pkg.search_method("Circle", "Area").unwrap();
            assert_eq!(pkg.cached_structs().len(), 1);
        }

        #[test]
        fn method_on_missing_struct_is_not_found() {
            let err = package().search_method("Square", "Area").unwrap_err();
            assert!(matches!(err, ModelError::NotFound { kind: EntityKind::Method, .. }));
        }
    }

    mod functions {
        use super::*;

        #[test]
        fn functions_exclude_methods() {
            let pkg = package();
            let ctor = pkg.search_function("NewCircle").unwrap();
            assert_eq!(ctor.returns()[0].ty.to_string(), "*Circle");
            assert!(pkg.search_function("Area").is_err());
        }

        #[test]
        fn not_found_does_not_poison_other_names() {
            let pkg = package();
            let err = pkg.search_function("DoesNotExist").unwrap_err();
            assert!(err.is_recoverable());
            assert!(pkg.search_function("NewCircle").is_ok());
        }

        #[test]
        fn interfaces() {
            let shape = package().search_interface("Shape").unwrap();
            assert_eq!(shape.methods(), ["Area"]);
        }

        #[test]
        fn populate_fills_everything() {
            let pkg = package();
            pkg.populate().unwrap();
            assert_eq!(pkg.cached_structs().len(), 1);
            assert_eq!(pkg.cached_interfaces().len(), 1);
            assert_eq!(pkg.cached_functions().len(), 1);
            let circle = &pkg.cached_structs()[0];
            assert_eq!(circle.cached_members().len(), 2);
            assert_eq!(circle.cached_methods().len(), 2);
        }
    }
}
