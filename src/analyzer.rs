//! Line-oriented annotation inference.
//!
//! The analyzer walks a file's lines once with a small state machine,
//! collecting doc tags into pending buffers until a declaration consumes
//! them. A second pass over the same lines picks up every plain module-table
//! assignment that was not claimed by the first pass.

use crate::error::{Error, Result};
use crate::model::{
    definition_name, ClassInfo, Field, FieldKind, FileAnnotations, ModuleHeader, Param,
    FALLBACK_TYPE,
};
use crate::naming::{camelize, infer_class_name, infer_module_path};
use crate::type_registry::TypeRegistry;
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

static RE_MODULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^---@module\s+['"]?([^'"\s]+)['"]?"#).unwrap());

static RE_BRIEF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^---@brief\b\s*(.*)").unwrap());

static RE_DESC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---@desc(?:ription)?\b\s*(.*)").unwrap());

static RE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---@class\s+([^\s:]+)(?:\s*:\s*(\S+))?").unwrap());

static RE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---@param\s+([\w.]+\??)\s+(.+)").unwrap());

static RE_RETURN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^---@return\s+(.+)").unwrap());

static RE_OVERLOAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---@overload\s+(.+)").unwrap());

static RE_TYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^---@type\s+(.+)").unwrap());

// `function M.name(a, b)` and `function M:name(a, b)`
static RE_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^function\s+M[.:](\w+)\s*\(([^)]*)\)").unwrap());

// `M.name = function(a, b)`
static RE_FUNCTION_ASSIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^M\.(\w+)\s*=\s*function\s*\(([^)]*)\)").unwrap());

static RE_ASSIGN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^M\.(\w+)\s*=(.*)$").unwrap());

static RE_MODULE_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^local\s+M\s*=\s*\{").unwrap());

// -- Options ------------------------------------------------------------------

/// Switches unifying the scanner variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Collect `---@overload` signatures onto function fields
    pub emit_overloads: bool,
    /// Render a `<Name>Def` definition class plus an instance class
    pub split_definition_class: bool,
    /// Validate camelized field names against declared class names
    pub resolve_global_types: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            emit_overloads: true,
            split_definition_class: true,
            resolve_global_types: false,
        }
    }
}

// -- Line classification ------------------------------------------------------

/// A `---@class Name [: Parent]` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    pub parent: Option<String>,
}

/// What a single trimmed line was recognized as.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Module(String),
    Brief(String),
    Description(String),
    Class(ClassDecl),
    Param(Param),
    Return(String),
    Overload(String),
    Type(String),
    DocText(String),
    Function { name: String, params: String },
    Assignment { name: String, table: bool },
    ModuleTable,
    Comment,
    Blank,
    Code,
}

/// Matches a class declaration line.
pub fn parse_class_declaration(line: &str) -> Option<ClassDecl> {
    RE_CLASS.captures(line.trim()).map(|caps| ClassDecl {
        name: caps[1].to_string(),
        parent: caps.get(2).map(|m| m.as_str().to_string()),
    })
}

/// Keeps the type part of a tag payload: a leading `{...}` group, or the
/// token before the first space.
fn type_token(payload: &str) -> String {
    let payload = payload.trim();
    if payload.starts_with('{') {
        if let Some(end) = payload.find('}') {
            return payload[..=end].to_string();
        }
    }
    match payload.find(char::is_whitespace) {
        Some(i) if i > 0 => payload[..i].to_string(),
        _ => payload.to_string(),
    }
}

/// Type part of a `@param` or `@type` payload: everything up to the first
/// space outside `()`, `{}` and `<>`. A space after `:`, `,` or `|` continues
/// the type, so `fun(a: string): boolean` stays whole.
fn balanced_type_token(payload: &str) -> String {
    let payload = payload.trim();
    let mut depth = 0usize;
    let mut prev = None;
    for (i, c) in payload.char_indices() {
        match c {
            '(' | '{' | '<' => depth += 1,
            ')' | '}' | '>' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 && !matches!(prev, Some(':' | ',' | '|')) => {
                return payload[..i].to_string();
            }
            _ => {}
        }
        if !c.is_whitespace() {
            prev = Some(c);
        }
    }
    payload.to_string()
}

/// Matches `M.name = rhs`, rejecting comparisons (`M.name == x`).
fn parse_assignment(line: &str) -> Option<(String, bool)> {
    let caps = RE_ASSIGN.captures(line)?;
    let rhs = &caps[2];
    if rhs.starts_with('=') {
        return None;
    }
    Some((caps[1].to_string(), rhs.trim_start().starts_with('{')))
}

fn classify(line: &str) -> Line {
    if line.is_empty() {
        return Line::Blank;
    }
    if let Some(caps) = RE_MODULE.captures(line) {
        return Line::Module(caps[1].to_string());
    }
    if let Some(caps) = RE_BRIEF.captures(line) {
        return Line::Brief(caps[1].trim().to_string());
    }
    if let Some(caps) = RE_DESC.captures(line) {
        return Line::Description(caps[1].trim().to_string());
    }
    if let Some(decl) = parse_class_declaration(line) {
        return Line::Class(decl);
    }
    if let Some(caps) = RE_PARAM.captures(line) {
        return Line::Param(Param::new(&caps[1], balanced_type_token(&caps[2])));
    }
    if let Some(caps) = RE_RETURN.captures(line) {
        return Line::Return(type_token(&caps[1]));
    }
    if let Some(caps) = RE_OVERLOAD.captures(line) {
        return Line::Overload(caps[1].trim().to_string());
    }
    if let Some(caps) = RE_TYPE.captures(line) {
        return Line::Type(balanced_type_token(&caps[1]));
    }
    if let Some(text) = line.strip_prefix("---") {
        if !text.starts_with('@') {
            return Line::DocText(text.trim().to_string());
        }
    }
    if let Some(caps) = RE_FUNCTION
        .captures(line)
        .or_else(|| RE_FUNCTION_ASSIGN.captures(line))
    {
        return Line::Function {
            name: caps[1].to_string(),
            params: caps[2].trim().to_string(),
        };
    }
    if let Some((name, table)) = parse_assignment(line) {
        return Line::Assignment { name, table };
    }
    if RE_MODULE_TABLE.is_match(line) {
        return Line::ModuleTable;
    }
    if line.starts_with("--") {
        return Line::Comment;
    }
    Line::Code
}

// -- Scanner state ------------------------------------------------------------

/// Doc context waiting for the next declaration.
#[derive(Debug, Default)]
struct PendingDoc {
    doc_line: Option<String>,
    params: Vec<Param>,
    return_type: Option<String>,
    overloads: Vec<String>,
    explicit_type: Option<String>,
    /// A structured tag was seen since the last reset
    tagged: bool,
    /// Survives resets; consumed by the next assignment or module table
    class: Option<ClassDecl>,
}

impl PendingDoc {
    fn reset_declaration(&mut self) {
        self.doc_line = None;
        self.params.clear();
        self.return_type = None;
        self.overloads.clear();
        self.explicit_type = None;
        self.tagged = false;
    }
}

#[derive(Debug, Default)]
struct ScanState {
    pending: PendingDoc,
    module_path: Option<String>,
    brief: String,
    description: String,
    /// Class names declared in this file, with their explicit parents
    declared: HashMap<String, Option<String>>,
    class_by_field: HashMap<String, String>,
    module_class: Option<ClassDecl>,
    fields: IndexMap<String, Field>,
}

// -- Analyzer -----------------------------------------------------------------

/// Turns a file's lines into a [`ModuleHeader`] with its class and fields.
///
/// # Example
///
/// ```
/// use lua_annotgen::analyzer::{Analyzer, ScanOptions};
/// use std::path::Path;
///
/// let lines = vec![
///     "local M = {}".to_string(),
///     "function M.greet(name) end".to_string(),
/// ];
/// let analyzer = Analyzer::new(ScanOptions::default(), None);
/// let annotations = analyzer.analyze_lines(Path::new("lua/demo/hello.lua"), lines);
/// assert_eq!(annotations.header.module_path, "demo.hello");
/// assert_eq!(annotations.fields()[0].type_expr, "fun(name: any): any");
/// ```
pub struct Analyzer<'a> {
    options: ScanOptions,
    registry: Option<&'a TypeRegistry>,
}

impl<'a> Analyzer<'a> {
    pub fn new(options: ScanOptions, registry: Option<&'a TypeRegistry>) -> Self {
        Self { options, registry }
    }

    /// Reads `path` and analyzes its lines.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read.
    pub fn analyze_file(&self, path: &Path) -> Result<FileAnnotations> {
        debug!("Analyzing file: {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let lines = content.lines().map(String::from).collect();
        Ok(self.analyze_lines(path, lines))
    }

    /// Analyzes already-read lines. `path` is only used for the default
    /// module path and class name.
    pub fn analyze_lines(&self, path: &Path, lines: Vec<String>) -> FileAnnotations {
        let mut state = ScanState::default();

        for (idx, raw) in lines.iter().enumerate() {
            self.process_line(&mut state, idx + 1, raw);
        }

        let mut global_matches = BTreeSet::new();
        self.collect_plain_assignments(&mut state, &lines, &mut global_matches);

        debug!(
            "{}: {} fields, {} declared classes",
            path.display(),
            state.fields.len(),
            state.declared.len()
        );

        let class = Self::resolve_class(path, &state);
        let header = ModuleHeader {
            module_path: state
                .module_path
                .take()
                .unwrap_or_else(|| infer_module_path(path)),
            brief: std::mem::take(&mut state.brief),
            description: std::mem::take(&mut state.description),
            class: Some(ClassInfo {
                fields: state.fields.into_values().collect(),
                ..class
            }),
        };

        FileAnnotations {
            path: path.to_path_buf(),
            header,
            original_lines: lines,
            rendered_lines: None,
            discovered_global_class_names: self.resolves_global_types().then_some(global_matches),
        }
    }

    fn resolves_global_types(&self) -> bool {
        self.options.resolve_global_types
    }

    fn process_line(&self, s: &mut ScanState, line_no: usize, raw: &str) {
        match classify(raw.trim()) {
            Line::Module(path) => s.module_path = Some(path),
            Line::Brief(brief) => s.brief = brief,
            Line::Description(desc) => s.description = desc,
            Line::Class(decl) => {
                s.declared.insert(decl.name.clone(), decl.parent.clone());
                s.pending.class = Some(decl);
            }
            Line::Param(param) => {
                s.pending.params.push(param);
                s.pending.tagged = true;
            }
            Line::Return(ret) => {
                s.pending.return_type = Some(ret);
                s.pending.tagged = true;
            }
            Line::Overload(signature) => {
                if self.options.emit_overloads {
                    s.pending.overloads.push(signature);
                }
                s.pending.tagged = true;
            }
            Line::Type(type_expr) => {
                s.pending.explicit_type = Some(type_expr);
                s.pending.tagged = true;
            }
            Line::DocText(text) => {
                if s.pending.doc_line.is_none() && !s.pending.tagged && !text.is_empty() {
                    s.pending.doc_line = Some(text);
                }
            }
            Line::Function { name, params } => Self::record_function(s, name, &params, line_no),
            Line::Assignment { name, table } => {
                let top_level = !raw.starts_with(char::is_whitespace);
                Self::record_assignment(s, name, table, top_level, line_no);
            }
            Line::ModuleTable => {
                if let Some(decl) = s.pending.class.take() {
                    s.module_class = Some(decl);
                }
                s.pending.reset_declaration();
            }
            Line::Comment | Line::Blank => {}
            Line::Code => s.pending.reset_declaration(),
        }
    }

    fn record_function(s: &mut ScanState, name: String, raw_params: &str, line_no: usize) {
        // later declarations of a claimed name are no-ops, buffers included
        if s.fields.contains_key(&name) {
            return;
        }

        let params: Vec<Param> = if s.pending.params.is_empty() {
            raw_params
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(|n| Param::new(n, FALLBACK_TYPE))
                .collect()
        } else {
            std::mem::take(&mut s.pending.params)
        };

        let return_type = s
            .pending
            .return_type
            .take()
            .unwrap_or_else(|| FALLBACK_TYPE.to_string());

        let signature = params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.type_expr))
            .collect::<Vec<_>>()
            .join(", ");
        let mut type_expr = format!("fun({}): {}", signature, return_type);
        if let Some(doc) = &s.pending.doc_line {
            type_expr.push(' ');
            type_expr.push_str(doc.trim());
        }

        let field = Field {
            name: name.clone(),
            kind: FieldKind::Function,
            type_expr,
            params,
            return_type: Some(return_type),
            overloads: std::mem::take(&mut s.pending.overloads),
            source_line: Some(line_no),
            has_explicit_doc: s.pending.tagged,
        };
        s.fields.insert(name, field);
        s.pending.reset_declaration();
    }

    fn record_assignment(
        s: &mut ScanState,
        name: String,
        table: bool,
        top_level: bool,
        line_no: usize,
    ) {
        // a class tag applies to at most the very next assignment
        if let Some(decl) = s.pending.class.take() {
            if table {
                s.class_by_field.entry(name.clone()).or_insert(decl.name);
            }
        }

        // without a `@type`, pending function tags survive the assignment
        if let Some(type_expr) = s.pending.explicit_type.take() {
            if top_level && !s.fields.contains_key(&name) {
                let mut field = Field::value(name.clone(), type_expr, line_no);
                field.has_explicit_doc = true;
                s.fields.insert(name, field);
            }
            s.pending.reset_declaration();
        }
    }

    /// Second pass: unclaimed top-level assignments, in line order.
    fn collect_plain_assignments(
        &self,
        s: &mut ScanState,
        lines: &[String],
        global_matches: &mut BTreeSet<String>,
    ) {
        for (idx, line) in lines.iter().enumerate() {
            let Some((name, _)) = parse_assignment(line) else {
                continue;
            };
            if s.fields.contains_key(&name) {
                continue;
            }

            let mapped = s.class_by_field.get(&name).cloned();
            let has_explicit_doc = mapped.is_some();
            let type_expr = mapped
                .or_else(|| self.guess_type(s, &name, global_matches))
                .unwrap_or_else(|| FALLBACK_TYPE.to_string());

            let mut field = Field::value(name.clone(), type_expr, idx + 1);
            field.has_explicit_doc = has_explicit_doc;
            s.fields.insert(name, field);
        }
    }

    /// `rate_limits` is typed `RateLimits` if a class of that name is known.
    fn guess_type(
        &self,
        s: &ScanState,
        field_name: &str,
        global_matches: &mut BTreeSet<String>,
    ) -> Option<String> {
        if !self.resolves_global_types() {
            return None;
        }
        let guess = camelize(field_name);
        if guess.is_empty() {
            return None;
        }
        if s.declared.contains_key(&guess) {
            return Some(guess);
        }
        if self.registry.is_some_and(|r| r.contains(&guess)) {
            global_matches.insert(guess.clone());
            return Some(guess);
        }
        None
    }

    fn resolve_class(path: &Path, s: &ScanState) -> ClassInfo {
        let (class_name, extends) = match &s.module_class {
            Some(decl) => {
                let def = definition_name(&decl.name);
                let mut extends = decl.parent.clone().unwrap_or_else(|| def.clone());
                // `Name : NameDef` where `NameDef : P` was declared here too
                if extends == def {
                    if let Some(Some(grand)) = s.declared.get(&def) {
                        extends = grand.clone();
                    }
                }
                (decl.name.clone(), extends)
            }
            None => {
                let name = infer_class_name(path);
                let extends = definition_name(&name);
                (name, extends)
            }
        };

        ClassInfo {
            class_name,
            extends,
            fields: Vec::new(),
        }
    }
}
