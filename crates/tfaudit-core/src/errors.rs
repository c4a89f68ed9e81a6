use std::path::PathBuf;

/// Audit errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("`{command}` failed in {}: {output}", .dir.display())]
    Toolchain {
        dir: PathBuf,
        command: String,
        status: Option<i32>,
        output: String,
    },

    #[error("unreadable provider schema from {}: {source}", .dir.display())]
    SchemaDecode {
        dir: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("issue tracker request failed: {0}")]
    Reporter(String),
}

impl Error {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io { context: context.into(), source }
    }
}
