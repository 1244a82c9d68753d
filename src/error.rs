use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElectrosError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("http error: {0}")]
    Http(String),
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("launch error: {0}")]
    Launch(String),
}

/// Failure reading or writing one of the on-disk artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} not found", .0.display())]
    NotFound(PathBuf),
    #[error("invalid content in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("i/o error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

impl StoreError {
    pub fn path(&self) -> &PathBuf {
        match self {
            StoreError::NotFound(path) => path,
            StoreError::Parse { path, .. } => path,
            StoreError::Io { path, .. } => path,
        }
    }

    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound(path.to_path_buf())
        } else {
            StoreError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ElectrosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_display_and_classify() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = StoreError::io(std::path::Path::new("/tmp/settings"), missing);
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(format!("{err}").contains("/tmp/settings not found"));

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StoreError::io(std::path::Path::new("/tmp/hosts"), denied);
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(err.path(), &PathBuf::from("/tmp/hosts"));

        let wrapped: ElectrosError = err.into();
        assert!(format!("{wrapped}").starts_with("store error"));
    }
}
