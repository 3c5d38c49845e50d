use std::path::PathBuf;

use clap::Parser;

/// Generate testify mocks for the interfaces declared in a Go file.
#[derive(Debug, Clone, Parser)]
#[command(name = "ridicule", version, about)]
pub struct Cli {
    /// Go source file to read interfaces from.
    #[arg(long = "in", value_name = "PATH")]
    pub input: PathBuf,

    /// Destination file (default: `<name>_mock.go` next to the input).
    #[arg(long = "out", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Omit the "Code generated ... DO NOT EDIT." banner.
    #[arg(long)]
    pub no_banner: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from(["ridicule", "--in", "store.go", "--no-banner"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("store.go"));
        assert!(cli.output.is_none());
        assert!(cli.no_banner);

        assert!(Cli::try_parse_from(["ridicule", "--out", "x.go"]).is_err());
    }
}
