//! Mock generator for Go interfaces.
//!
//! Pipeline: parse (`go_decl_parser`) → [`extract`] → [`synth`] →
//! [`render`] → [`normalize`] → [`writer`].
//!
//! - The resolver ([`resolve`]) turns type expressions into canonical Go text.
//! - The synthesizer builds a code model ([`codegen`]) that the renderer prints.
//! - Only [`run`] touches the filesystem; [`generate`] is pure.

pub mod cli;
pub mod codegen;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod render;
pub mod resolve;
pub mod synth;
pub mod writer;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub use config::Config;
pub use error::Error;
pub use model::{Contract, Warning};
pub use synth::SynthOptions;

/// Output of [`generate`].
#[derive(Debug, Clone)]
pub struct Generated {
    pub text: String,
    pub contract: Contract,
    /// False when import normalization failed and `text` is the raw render.
    pub normalized: bool,
}

/// Summary of a successful [`run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub destination: PathBuf,
    pub interfaces: usize,
    pub methods: usize,
    pub warnings: Vec<Warning>,
    pub normalized: bool,
}

/// Generates mock source for `source` without touching the filesystem.
///
/// `origin` names the source in diagnostics.
pub fn generate(source: &str, origin: &Path, options: &SynthOptions) -> Result<Generated, Error> {
    let parsed = go_decl_parser::parse_source(source)
        .map_err(|failure| Error::parse(origin.to_path_buf(), source, failure))?;
    let contract = extract::extract(&parsed);

    let file = synth::synthesize(&contract, options);
    let raw = render::render(&file)?;

    let hint = origin
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (text, normalized) = match normalize::normalize(&raw, &hint) {
        Ok(text) => (text, true),
        Err(err) => {
            warn!(error = %err, "import normalization failed; keeping raw output");
            (raw, false)
        }
    };

    Ok(Generated {
        text,
        contract,
        normalized,
    })
}

/// Reads the configured source, generates its mocks and writes them.
pub fn run(config: &Config) -> Result<RunReport, Error> {
    let source = fs::read_to_string(&config.source).map_err(|source| Error::Read {
        path: config.source.clone(),
        source,
    })?;

    let options = if config.banner {
        SynthOptions::with_banner(synth::default_banner(&config.source_name()))
    } else {
        SynthOptions::default()
    };
    let generated = generate(&source, &config.source, &options)?;
    writer::write_artifact(&config.destination, generated.text.as_bytes())?;

    let contract = generated.contract;
    let report = RunReport {
        destination: config.destination.clone(),
        interfaces: contract.interfaces.len(),
        methods: contract.interfaces.iter().map(|i| i.methods.len()).sum(),
        warnings: contract.warnings,
        normalized: generated.normalized,
    };
    info!(
        source = %config.source.display(),
        destination = %report.destination.display(),
        interfaces = report.interfaces,
        methods = report.methods,
        warnings = report.warnings.len(),
        "generated mocks"
    );
    Ok(report)
}
