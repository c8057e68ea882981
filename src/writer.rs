//! Merging rendered headers into file content and writing the result.

use crate::analyzer::parse_class_declaration;
use crate::model::{FileAnnotations, ModuleHeader};
use crate::naming::strip_source_extension;
use crate::renderer::{build_header_block, RenderMode};
use anyhow::{Context, Result};
use log::debug;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Suffix replacing `.lua` for annotation-only output.
pub const ANNOT_EXTENSION: &str = ".annot.lua";

static RE_EMPTY_MODULE_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^local\s+M\s*=\s*\{\s*\}\s*;?$").unwrap());

static RE_MODULE_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^local\s+M\s*=\s*\{").unwrap());

static RE_HEADER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---@(?:module|brief|desc(?:ription)?)\b").unwrap());

static RE_FIELD_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^---@field\b").unwrap());

/// Where and how output is written.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Return the output without touching the filesystem
    pub dry_run: bool,
    /// Write into this directory, keeping the base file name
    pub out_dir: Option<PathBuf>,
    /// Write only the header, to `<name>.annot.lua`
    pub annot_only: bool,
}

/// Lines of the leading comment block, before any code.
fn is_preamble_line(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.starts_with("--") || RE_EMPTY_MODULE_TABLE.is_match(trimmed)
}

/// Header lines re-emitted on every run, class blocks aside.
fn is_generated_line(trimmed: &str) -> bool {
    RE_HEADER_TAG.is_match(trimmed)
        || trimmed.starts_with("--@")
        || RE_EMPTY_MODULE_TABLE.is_match(trimmed)
}

/// Splits `lines` into the leading comments worth keeping and the index
/// where the code body starts.
///
/// Inside the leading block, the lines `header` renders are dropped: the
/// `---@module`, `---@brief` and `---@desc` tags, legacy `--@` tags, the
/// `---@class` blocks of the module class and its definition class, and the
/// empty module table. Every other comment is kept in order. Comments right
/// above a populated `local M = { ... }` stay attached to it untouched.
pub fn split_preamble(lines: &[String], header: &ModuleHeader) -> (Vec<String>, usize) {
    let body = lines
        .iter()
        .position(|l| !is_preamble_line(l.trim()))
        .unwrap_or(lines.len());

    let mut attached = body;
    if lines.get(body).is_some_and(|l| RE_MODULE_TABLE.is_match(l.trim())) {
        while attached > 0 && lines[attached - 1].trim().starts_with("--") {
            attached -= 1;
        }
    }

    let own_classes = header
        .class
        .as_ref()
        .map(|c| [c.class_name.clone(), c.definition_name()]);
    let is_own_class = |name: &str| {
        own_classes
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n == name))
    };

    let mut kept: Vec<String> = Vec::new();
    let mut in_own_class = false;
    for line in &lines[..attached] {
        let trimmed = line.trim();
        if let Some(decl) = parse_class_declaration(trimmed) {
            in_own_class = is_own_class(&decl.name);
            if in_own_class {
                continue;
            }
        } else if in_own_class && RE_FIELD_TAG.is_match(trimmed) {
            continue;
        } else {
            in_own_class = false;
        }

        if is_generated_line(trimmed) {
            continue;
        }
        // no leading or doubled blanks
        if trimmed.is_empty() && kept.last().map_or(true, |l| l.trim().is_empty()) {
            continue;
        }
        kept.push(line.clone());
    }
    kept.extend(lines[attached..body].iter().cloned());

    if body == lines.len() {
        while kept.last().is_some_and(|l| l.trim().is_empty()) {
            kept.pop();
        }
    }
    (kept, body)
}

/// Combines the rendered header with the original content and stores the
/// result on `annotations`.
pub fn merge_with_file_content(annotations: &mut FileAnnotations, mode: RenderMode) -> &[String] {
    let original = &annotations.original_lines;
    let (preamble, body) = split_preamble(original, &annotations.header);

    let mut merged = build_header_block(&annotations.header, mode);
    merged.push(String::new());
    merged.extend(preamble);
    merged.extend(original[body..].iter().cloned());

    annotations.rendered_lines.insert(merged)
}

/// Resolves the file `annotations` for `source` are written to.
pub fn output_path(source: &Path, options: &WriteOptions) -> PathBuf {
    let target = match &options.out_dir {
        Some(dir) => match source.file_name() {
            Some(name) => dir.join(name),
            None => dir.join(source),
        },
        None => source.to_path_buf(),
    };

    if !options.annot_only {
        return target;
    }

    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!("{}{}", strip_source_extension(&name), ANNOT_EXTENSION))
}

/// Produces the final lines for a file and writes them unless in dry-run
/// mode.
///
/// The content is the bare header when `annot_only` is set, the merged lines
/// when a merge ran, and the untouched original otherwise.
///
/// # Errors
///
/// Returns an error if the output directory or file cannot be written.
pub fn write_file(
    annotations: &FileAnnotations,
    options: &WriteOptions,
    mode: RenderMode,
) -> Result<Vec<String>> {
    let lines = if options.annot_only {
        build_header_block(&annotations.header, mode)
    } else if let Some(rendered) = &annotations.rendered_lines {
        rendered.clone()
    } else {
        annotations.original_lines.clone()
    };

    if options.dry_run {
        return Ok(lines);
    }

    let path = output_path(&annotations.path, options);
    write_lines(&lines, &path)?;
    Ok(lines)
}

/// Writes each line followed by a newline, creating parent directories.
pub fn write_lines(lines: &[String], path: &Path) -> Result<()> {
    debug!("Writing {} lines to {}", lines.len(), path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut content = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }

    fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))
}
