//src/error.rs

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CogError>;

#[derive(Error, Debug)]
pub enum CogError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed reference or alignment data. `line` is 1-based.
    #[error("Parse error in '{}' line {line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Key '{key}' not found in {table}")]
    KeyNotFound { table: &'static str, key: String },

    #[error("No query sequence found in '{}'", .0.display())]
    EmptyInput(PathBuf),

    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("{0} is not installed (not found in PATH)")]
    ToolNotFound(String),

    #[error("Command failed ({status}): {cmd}\n{stderr}")]
    Command {
        cmd: String,
        status: String,
        stderr: String,
    },
}

impl CogError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CogError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        CogError::Parse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}
