//! Renders the scanned model back into LuaLS annotation lines.

use crate::analyzer::ScanOptions;
use crate::model::{ClassInfo, Field, ModuleHeader, FALLBACK_TYPE};

/// Written for an empty `@brief` or `@desc`.
pub const PLACEHOLDER: &str = "LEER";

/// Declaration of the module table, emitted after the class block.
pub const MODULE_TABLE_LINE: &str = "local M = {}";

/// How the module class is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// One `---@class` carrying every field
    Inline,
    /// A `<Name>Def` class with the fields, and `Name` extending it
    Split,
}

impl From<&ScanOptions> for RenderMode {
    fn from(options: &ScanOptions) -> Self {
        if options.split_definition_class {
            RenderMode::Split
        } else {
            RenderMode::Inline
        }
    }
}

fn field_lines(field: &Field, out: &mut Vec<String>) {
    let type_expr = if !field.type_expr.is_empty() {
        field.type_expr.as_str()
    } else if field.is_function() {
        "fun(...)"
    } else {
        FALLBACK_TYPE
    };
    out.push(format!("---@field {} {}", field.name, type_expr));

    for overload in &field.overloads {
        out.push(format!("---@field {} {}", field.name, overload));
    }
}

/// Builds a single `---@class` block listing every field.
///
/// The conventional `<Name>Def` parent is omitted since no such class is
/// emitted in this mode.
pub fn render_class_inline(class: &ClassInfo) -> Vec<String> {
    let mut lines = Vec::with_capacity(class.fields.len() + 1);

    if class.extends.is_empty() || class.extends_definition() {
        lines.push(format!("---@class {}", class.class_name));
    } else {
        lines.push(format!("---@class {} : {}", class.class_name, class.extends));
    }

    for field in &class.fields {
        field_lines(field, &mut lines);
    }
    lines
}

/// Builds the definition class with all fields, and the instance class line
/// extending it.
pub fn render_class_split(class: &ClassInfo) -> (Vec<String>, String) {
    let def_name = class.definition_name();
    let mut def_lines = Vec::with_capacity(class.fields.len() + 1);

    if class.extends.is_empty() || class.extends_definition() {
        def_lines.push(format!("---@class {}", def_name));
    } else {
        def_lines.push(format!("---@class {} : {}", def_name, class.extends));
    }

    for field in &class.fields {
        field_lines(field, &mut def_lines);
    }

    let instance = format!("---@class {} : {}", class.class_name, def_name);
    (def_lines, instance)
}

/// Builds the full annotation header placed at the top of a file.
pub fn build_header_block(header: &ModuleHeader, mode: RenderMode) -> Vec<String> {
    let mut lines = vec![format!("---@module '{}'", header.module_path)];

    let brief = non_empty_or_placeholder(&header.brief);
    lines.push(format!("---@brief {}", brief));
    let description = non_empty_or_placeholder(&header.description);
    lines.push(format!("---@desc {}", description));

    if let Some(class) = &header.class {
        match mode {
            RenderMode::Inline => lines.extend(render_class_inline(class)),
            RenderMode::Split => {
                let (def_lines, instance) = render_class_split(class);
                lines.extend(def_lines);
                lines.push(String::new());
                lines.push(instance);
            }
        }
        lines.push(MODULE_TABLE_LINE.to_string());
    }

    lines
}

fn non_empty_or_placeholder(text: &str) -> &str {
    if text.trim().is_empty() {
        PLACEHOLDER
    } else {
        text
    }
}
