use crate::analyzer::parse_class_declaration;
use crate::naming::has_source_extension;
use log::debug;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Directory names whose files are treated as shared type declarations.
const TYPE_DIRS: [&str; 2] = ["types", "@types"];

/// Project-wide set of class names declared in `types/` directories.
///
/// Built once per run and read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    names: BTreeSet<String>,
}

impl TypeRegistry {
    /// Walks `root` and collects every `---@class` name found in `.lua`
    /// files below a `types` or `@types` directory.
    ///
    /// Unreadable entries are skipped.
    pub fn scan(root: &Path) -> Self {
        debug!("Collecting global types below {}", root.display());
        let mut names = BTreeSet::new();

        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping inaccessible path: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !has_source_extension(path) || !is_type_path(path) {
                continue;
            }

            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    debug!("Skipping unreadable type file {}: {}", path.display(), e);
                    continue;
                }
            };

            names.extend(
                content
                    .lines()
                    .filter_map(parse_class_declaration)
                    .map(|decl| decl.name),
            );
        }

        debug!("Found {} global types", names.len());
        Self { names }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn is_type_path(path: &Path) -> bool {
    path.parent()
        .map(|dir| {
            dir.components()
                .any(|c| TYPE_DIRS.iter().any(|t| c.as_os_str() == *t))
        })
        .unwrap_or(false)
}
