use miette::Diagnostic;
use thiserror::Error;

/// Main error type for shipdex operations.
///
/// Parsing itself is total and never produces an error; these variants
/// cover IO, manifest loading, and output writing.
#[derive(Error, Diagnostic, Debug)]
pub enum ShipdexError {
    #[error("IO error: {0}")]
    #[diagnostic(code(shipdex::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(shipdex::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Manifest error: {message}")]
    #[diagnostic(code(shipdex::manifest))]
    Manifest {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Output error: {message}")]
    #[diagnostic(code(shipdex::output))]
    Output {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Validation failed: {message}")]
    #[diagnostic(code(shipdex::validate))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, ShipdexError>;
