//! Data model shared by the analyzer, renderer and writer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Type used whenever nothing better can be inferred.
pub const FALLBACK_TYPE: &str = "any";

/// One declared or inferred function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: String,
}

impl Param {
    pub fn new(name: impl Into<String>, type_expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_expr: type_expr.into(),
        }
    }
}

/// Whether a field holds a plain value or a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Value,
    Function,
}

/// A member discovered on the module table (`M.name = ...` or `function M.name()`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    /// For functions the synthesized `fun(...): R` signature, optionally
    /// followed by the captured doc line.
    #[serde(rename = "type")]
    pub type_expr: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overloads: Vec<String>,
    /// 1-based line where the field was first observed
    pub source_line: Option<usize>,
    pub has_explicit_doc: bool,
}

impl Field {
    /// Creates a value field of the given type.
    pub fn value(name: impl Into<String>, type_expr: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Value,
            type_expr: type_expr.into(),
            params: Vec::new(),
            return_type: None,
            overloads: Vec::new(),
            source_line: Some(line),
            has_explicit_doc: false,
        }
    }

    pub fn is_function(&self) -> bool {
        self.kind == FieldKind::Function
    }
}

/// The single class describing a module table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub class_name: String,
    pub extends: String,
    pub fields: Vec<Field>,
}

impl ClassInfo {
    /// Name of the conventional definition class, `<ClassName>Def`.
    pub fn definition_name(&self) -> String {
        definition_name(&self.class_name)
    }

    /// True when the class extends its own definition class.
    pub fn extends_definition(&self) -> bool {
        self.extends == self.definition_name()
    }
}

pub fn definition_name(class_name: &str) -> String {
    format!("{}Def", class_name)
}

/// Top-of-file annotations: `@module`, `@brief`, `@desc` and the class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleHeader {
    pub module_path: String,
    pub brief: String,
    pub description: String,
    pub class: Option<ClassInfo>,
}

/// Everything known about one scanned file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAnnotations {
    pub path: PathBuf,
    pub header: ModuleHeader,
    #[serde(skip)]
    pub original_lines: Vec<String>,
    #[serde(skip)]
    pub rendered_lines: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered_global_class_names: Option<BTreeSet<String>>,
}

impl FileAnnotations {
    pub fn fields(&self) -> &[Field] {
        self.header
            .class
            .as_ref()
            .map(|class| class.fields.as_slice())
            .unwrap_or_default()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.name == name)
    }
}
