use std::io;
use std::path::PathBuf;

use go_decl_parser::ParseFailure;
use thiserror::Error;

use crate::render::RenderError;
use crate::writer::WriteError;

/// Fatal errors of one generation run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}:\n{details}", path.display())]
    Parse {
        path: PathBuf,
        /// One `line:col: message` per diagnostic.
        details: String,
        #[source]
        source: ParseFailure,
    },

    #[error("failed to render mocks")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl Error {
    pub(crate) fn parse(path: PathBuf, src: &str, source: ParseFailure) -> Self {
        let details = source
            .diags
            .iter()
            .map(|d| format!("  {}", d.render(src)))
            .collect::<Vec<_>>()
            .join("\n");
        Error::Parse {
            path,
            details,
            source,
        }
    }
}
