//! Error and Result definitions

use std::fmt::Display;
use std::io;

use thiserror::Error;

/// The error type of this crate
#[derive(Debug)]
pub struct VfsError {
    /// The path this error was encountered in
    path: String,
    /// The kind of error
    kind: VfsErrorKind,
    /// An optional human-readable string describing the context for this error
    ///
    /// If not provided, a generic context message is used
    context: String,
    /// The underlying error
    cause: Option<Box<VfsError>>,
}

/// The only way to create a VfsError is via a VfsErrorKind
///
/// This conversion implements certain normalizations
impl From<VfsErrorKind> for VfsError {
    fn from(kind: VfsErrorKind) -> Self {
        // Normalize the error here before we return it
        let kind = match kind {
            VfsErrorKind::IoError(io) => match io.kind() {
                io::ErrorKind::NotFound => VfsErrorKind::FileNotFound,
                io::ErrorKind::Unsupported => VfsErrorKind::NotSupported,
                _ => VfsErrorKind::IoError(io),
            },
            // Remaining kinds are passed through as-is
            other => other,
        };

        Self {
            path: String::new(),
            kind,
            context: "An error occured".into(),
            cause: None,
        }
    }
}

impl From<io::Error> for VfsError {
    fn from(err: io::Error) -> Self {
        Self::from(VfsErrorKind::IoError(err))
    }
}

impl VfsError {
    /// Attaches the path the error was encountered in
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Adds a context message, wrapping the current error as the cause
    pub fn with_context<C, F>(mut self, context: F) -> Self
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        // Move the inner error into a new error so the existing one becomes the cause
        let mut new_err = VfsError {
            path: self.path.clone(),
            kind: VfsErrorKind::Other(String::new()),
            context: context().to_string(),
            cause: None,
        };
        std::mem::swap(&mut self, &mut new_err);
        self.kind = match &new_err.kind {
            VfsErrorKind::FileNotFound => VfsErrorKind::FileNotFound,
            VfsErrorKind::InvalidPath => VfsErrorKind::InvalidPath,
            VfsErrorKind::NotSupported => VfsErrorKind::NotSupported,
            _ => VfsErrorKind::Other(new_err.kind.to_string()),
        };
        self.cause = Some(Box::new(new_err));
        self
    }

    /// The kind of this error
    pub fn kind(&self) -> &VfsErrorKind {
        &self.kind
    }

    /// The path this error was encountered in
    pub fn path(&self) -> &String {
        &self.path
    }

    /// The wrapped error, if any
    pub fn cause(&self) -> Option<&VfsError> {
        self.cause.as_deref()
    }
}

impl Display for VfsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} for '{}': {}", self.context, self.path, self.kind())
    }
}

impl std::error::Error for VfsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Some(cause) = &self.cause {
            Some(cause)
        } else {
            None
        }
    }
}

/// The kinds of errors that can occur
#[derive(Debug, Error)]
pub enum VfsErrorKind {
    /// A generic I/O error
    ///
    /// Certain standard I/O errors are normalized to their VfsErrorKind counterparts
    #[error("IO error: {0}")]
    IoError(#[source] io::Error),

    /// The archive member at the given path could not be found
    #[error("The file or directory could not be found")]
    FileNotFound,

    /// The given path is invalid, e.g. because it escapes the archive root
    #[error("The path is invalid")]
    InvalidPath,

    /// Generic error variant
    #[error("FileSystem error: {0}")]
    Other(String),

    /// Functionality not supported by this archive
    #[error("Functionality not supported by this archive")]
    NotSupported,
}

/// The result type of this crate
pub type VfsResult<T> = std::result::Result<T, VfsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_is_normalized() {
        let error = VfsError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(matches!(error.kind(), VfsErrorKind::FileNotFound));
    }

    #[test]
    fn display_includes_path_and_context() {
        let error = VfsError::from(VfsErrorKind::FileNotFound)
            .with_path("/data/a.bin")
            .with_context(|| "Could not open member");
        assert_eq!(
            error.to_string(),
            "Could not open member for '/data/a.bin': The file or directory could not be found"
        );
        assert!(error.cause().is_some());
        assert!(matches!(error.kind(), VfsErrorKind::FileNotFound));
    }

    #[test]
    fn context_keeps_other_message() {
        let error = VfsError::from(VfsErrorKind::Other("broken".into()))
            .with_path("x")
            .with_context(|| "Outer");
        assert!(matches!(error.kind(), VfsErrorKind::Other(message) if message == "FileSystem error: broken"));
    }
}
