use std::path::PathBuf;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for file discovery and reading
#[derive(Debug)]
pub enum Error {
    Io { path: PathBuf, source: std::io::Error },
    NotSourceFile(PathBuf),
    Walk(walkdir::Error),
    InvalidArgument(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Io { path, source } => write!(f, "IO error on {}: {}", path.display(), source),
            Error::NotSourceFile(path) => {
                write!(f, "given file is not a .lua file: {}", path.display())
            }
            Error::Walk(e) => write!(f, "failed to walk directory: {}", e),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Walk(e) => Some(e),
            _ => None,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Walk(err)
    }
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
