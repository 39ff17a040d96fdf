use std::path::PathBuf;

/// Errors that can occur while loading documents for comparison.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid UTF-8 content in {}", path.display())]
    Utf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl CompareError {
    /// The file the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            CompareError::Io { path, .. } | CompareError::Utf8 { path, .. } => path,
        }
    }
}
