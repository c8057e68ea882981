//! Default module paths and class names derived from a file's location.
//!
//! Lua projects conventionally keep their modules below a `lua/` directory,
//! e.g. `plugin/lua/myplugin/util/str.lua` is required as `myplugin.util.str`.

use std::path::{Component, Path};

/// Directory segment marking the root of the Lua module tree.
pub const ROOT_MARKER: &str = "lua";

/// Extension of the scanned source files (without the dot).
pub const SOURCE_EXTENSION: &str = "lua";

const PROJECT_FALLBACK: &str = "Project";
const FILE_FALLBACK: &str = "Unknown";

/// Derives the dotted module path from the file location.
///
/// Uses the segments after the last `lua` directory; without one, the bare
/// file name is used.
pub fn infer_module_path(path: &Path) -> String {
    let segments = path_segments(path);

    if let Some(marker) = segments.iter().rposition(|s| s == ROOT_MARKER) {
        if marker + 1 < segments.len() {
            let mut parts: Vec<&str> = segments[marker + 1..].iter().map(String::as_str).collect();
            if let Some(last) = parts.last_mut() {
                *last = strip_source_extension(last);
            }
            return parts.join(".");
        }
    }

    segments
        .last()
        .map(|name| strip_source_extension(name).to_string())
        .unwrap_or_default()
}

/// Synthesizes a class name from the file location.
///
/// Every segment after the first `lua` directory is camelized and the
/// results are concatenated: `lua/my_plugin/str_utils.lua` gives
/// `MyPluginStrUtils`.
pub fn infer_class_name(path: &Path) -> String {
    let segments = path_segments(path);

    let relative = segments
        .iter()
        .position(|s| s == ROOT_MARKER)
        .filter(|&marker| marker + 1 < segments.len())
        .map(|marker| &segments[marker + 1..])
        .unwrap_or_default();

    let project = relative
        .first()
        .map(|s| camelize(s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| PROJECT_FALLBACK.to_string());

    let rest: String = relative.iter().skip(1).map(|s| camelize(s)).collect();
    let rest = if rest.is_empty() {
        FILE_FALLBACK.to_string()
    } else {
        rest
    };

    format!("{}{}", project, rest)
}

/// Title-cases each `_`/`-` separated word of a name and joins them.
///
/// A trailing `.lua` is dropped first, so file names can be passed directly.
pub fn camelize(name: &str) -> String {
    strip_source_extension(name)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(title_case)
        .collect()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn strip_source_extension(name: &str) -> &str {
    name.strip_suffix(".lua").unwrap_or(name)
}

/// Returns true when the path carries the `.lua` extension.
pub fn has_source_extension(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(SOURCE_EXTENSION)
}

fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}
