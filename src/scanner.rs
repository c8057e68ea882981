use crate::error::{Error, Result};
use crate::naming::has_source_extension;
use log::debug;
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

/// File scanner for collecting the Lua files to annotate.
///
/// The `FileScanner` accepts either a single `.lua` file or a directory, which is
/// walked recursively. Entries are visited in file-name order so runs are
/// reproducible.
///
/// # Example
///
/// ```no_run
/// use lua_annotgen::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./lua"));
/// let files = scanner.scan().unwrap();
/// println!("Found {} Lua files", files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

impl FileScanner {
    /// Creates a new `FileScanner` for a file or directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Collects every `.lua` file below the root.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The root cannot be accessed
    /// - The root is a file without the `.lua` extension
    /// - Any entry of the directory walk cannot be accessed (the whole scan is aborted)
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let metadata =
            fs::metadata(&self.root_path).map_err(|e| Error::io(&self.root_path, e))?;

        if !metadata.is_dir() {
            if has_source_extension(&self.root_path) {
                return Ok(vec![self.root_path.clone()]);
            }
            return Err(Error::NotSourceFile(self.root_path.clone()));
        }

        let mut lua_files = Vec::new();
        for entry in WalkDir::new(&self.root_path).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && has_source_extension(entry.path()) {
                lua_files.push(entry.into_path());
            }
        }

        debug!(
            "Found {} Lua files below {}",
            lua_files.len(),
            self.root_path.display()
        );
        Ok(lua_files)
    }
}
