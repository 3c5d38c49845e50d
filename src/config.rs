use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::Error;

const MOCK_SUFFIX: &str = "_mock.go";

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Emit the generated-code banner.
    pub banner: bool,
}

impl Config {
    pub fn new(source: PathBuf, destination: Option<PathBuf>, banner: bool) -> Result<Self, Error> {
        if source.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("the --in path is empty".into()));
        }
        let destination = match destination {
            Some(d) if !d.as_os_str().is_empty() => d,
            _ => default_destination(&source)?,
        };
        if destination == source {
            return Err(Error::InvalidConfig(format!(
                "destination {} would overwrite the source",
                destination.display()
            )));
        }
        Ok(Self {
            source,
            destination,
            banner,
        })
    }

    pub fn from_cli(cli: Cli) -> Result<Self, Error> {
        Self::new(cli.input, cli.output, !cli.no_banner)
    }

    /// File name of the source, for banners and messages.
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// `dir/store.go` becomes `dir/store_mock.go`.
pub fn default_destination(source: &Path) -> Result<PathBuf, Error> {
    let Some(name) = source.file_name().and_then(|n| n.to_str()) else {
        return Err(Error::InvalidConfig(format!(
            "cannot derive an output name from {}",
            source.display()
        )));
    };
    let stem = name.strip_suffix(".go").unwrap_or(name);
    Ok(source.with_file_name(format!("{stem}{MOCK_SUFFIX}")))
}
