//! docset CLI - turns a tree of Markdown command pages into a Dash docset.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod build;

#[derive(Parser)]
#[command(name = "docset")]
#[command(about = "Generate a Dash docset from Markdown command pages")]
#[command(version)]
pub struct Cli {
    /// Pages directory under the source root (e.g. "pages" or "pages.de")
    #[arg(default_value = "pages")]
    pages: String,

    /// Path to docset.toml config file
    #[arg(short, long, default_value = "docset.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; a successful run prints nothing unless verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(cli.verbose)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    build::run(&cli.pages, &cli.config).await
}

fn default_log_level(verbose: bool) -> &'static str {
    if verbose {
        "info"
    } else {
        "warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_defaults_to_pages() {
        let cli = Cli::try_parse_from(["docset"]).unwrap();

        assert_eq!(cli.pages, "pages");
        assert_eq!(cli.config, PathBuf::from("docset.toml"));
        assert!(!cli.verbose);
    }

    #[test]
    fn accepts_pages_and_flags() {
        let cli = Cli::try_parse_from(["docset", "pages.de", "-c", "alt.toml", "-v"]).unwrap();

        assert_eq!(cli.pages, "pages.de");
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        assert!(cli.verbose);
    }

    #[test]
    fn quiet_unless_verbose() {
        assert_eq!(default_log_level(false), "warn");
        assert_eq!(default_log_level(true), "info");
    }
}
