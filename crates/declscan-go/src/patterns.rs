//! Precompiled pattern registry.
//!
//! Every regular expression the text-scan backend uses is compiled once in
//! [`PatternRegistry::new`] and handed to extractor functions by reference.
//! Patterns only locate declaration heads; delimiter matching is done by the
//! scope scanner.

use regex::Regex;

/// Function or method head. The `open` group is the `(` of the parameter
/// list or the `[` of a type-parameter list.
const FUNC_HEAD: &str = r"(?m)^func[ \t]*(?:\([ \t]*(?:(?P<recv_name>\w+)[ \t]+)?(?P<star>\*)?[ \t]*(?P<recv_type>\w+)[ \t]*(?:\[[^\]\n]*\])?[ \t]*\)[ \t]*)?(?P<name>\w+)[ \t]*(?P<open>[\[(])";

/// Type-parameter list: identifiers followed by a constraint.
const TYPE_PARAMS: &str = r"\[\w+(?:[ \t]*,[ \t]*\w+)*[ \t]+[^\n]*?\]";

const PACKAGE_CLAUSE: &str = r"(?m)^package[ \t]+(?P<name>\w+)";
const TYPE_GROUP: &str = r"(?m)^type[ \t]*\(";
const IMPORT_SINGLE: &str = r#"(?m)^import[ \t]+(?:(?P<alias>[\w.]+)[ \t]+)?"(?P<path>[^"]+)""#;
const IMPORT_GROUP: &str = r"(?m)^import[ \t]*\(";
const IMPORT_SPEC: &str = r#"^(?:(?P<alias>[\w.]+)[ \t]+)?"(?P<path>[^"]+)""#;
const NAME_TYPE: &str = r"(?s)^(?P<name>\w+)\s+(?P<type>\S.*)$";
const FIELD_NAMES: &str = r"(?s)^(?P<names>\w+(?:\s*,\s*\w+)*)\s+(?P<type>\S.*)$";
const INTERFACE_METHOD: &str = r"^(?P<name>\w+)[ \t]*\(";
const MODULE_DIRECTIVE: &str = r#"(?m)^[ \t]*module[ \t]+"?(?P<path>[^"\s]+)"?"#;

/// Compiled patterns shared by the scanner entry points.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    func_head: Regex,
    type_head: Regex,
    type_group: Regex,
    group_type_spec: Regex,
    package_clause: Regex,
    import_single: Regex,
    import_group: Regex,
    import_spec: Regex,
    name_type: Regex,
    field_names: Regex,
    interface_method: Regex,
    module_directive: Regex,
}

impl PatternRegistry {
    pub fn new() -> Self {
        PatternRegistry {
            func_head: compile(FUNC_HEAD),
            type_head: compile(&format!(
                r"(?m)^type[ \t]+(?P<name>\w+)[ \t]*(?P<params>{TYPE_PARAMS})?[ \t]*(?P<kind>struct|interface)[ \t]*\{{"
            )),
            type_group: compile(TYPE_GROUP),
            group_type_spec: compile(&format!(
                r"(?m)^[ \t]*(?P<name>\w+)[ \t]*(?P<params>{TYPE_PARAMS})?[ \t]*(?P<kind>struct|interface)[ \t]*\{{"
            )),
            package_clause: compile(PACKAGE_CLAUSE),
            import_single: compile(IMPORT_SINGLE),
            import_group: compile(IMPORT_GROUP),
            import_spec: compile(IMPORT_SPEC),
            name_type: compile(NAME_TYPE),
            field_names: compile(FIELD_NAMES),
            interface_method: compile(INTERFACE_METHOD),
            module_directive: compile(MODULE_DIRECTIVE),
        }
    }

    /// `func (r *T) Name(` or `func Name[`.
    pub fn func_head(&self) -> &Regex {
        &self.func_head
    }

    /// Top-level `type Name[...] struct {` or `interface {`.
    pub fn type_head(&self) -> &Regex {
        &self.type_head
    }

    /// Opening of a grouped `type (` block.
    pub fn type_group(&self) -> &Regex {
        &self.type_group
    }

    /// A struct or interface spec line inside a `type (` block.
    pub fn group_type_spec(&self) -> &Regex {
        &self.group_type_spec
    }

    pub fn package_clause(&self) -> &Regex {
        &self.package_clause
    }

    pub fn import_single(&self) -> &Regex {
        &self.import_single
    }

    pub fn import_group(&self) -> &Regex {
        &self.import_group
    }

    /// One `alias "path"` line inside an import block.
    pub fn import_spec(&self) -> &Regex {
        &self.import_spec
    }

    /// A single `name type` parameter entry.
    pub fn name_type(&self) -> &Regex {
        &self.name_type
    }

    /// A struct field line `A, B type`.
    pub fn field_names(&self) -> &Regex {
        &self.field_names
    }

    pub fn interface_method(&self) -> &Regex {
        &self.interface_method
    }

    pub fn module_directive(&self) -> &Regex {
        &self.module_directive
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

// ============================================================================
// Tests
// ============================================================================
