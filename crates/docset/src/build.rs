//! Docset build: config loading and the build run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use docset_static::{BuildConfig, DocsetBuilder};
use serde::Deserialize;

/// Configuration file structure (docset.toml).
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    docset: DocsetSettings,
    #[serde(default)]
    assets: AssetSettings,
    #[serde(default)]
    build: BuildSettings,
}

#[derive(Debug, Deserialize)]
struct DocsetSettings {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_source_root")]
    source_root: String,
    #[serde(default = "default_output")]
    output: String,
}

impl Default for DocsetSettings {
    fn default() -> Self {
        Self {
            name: default_name(),
            source_root: default_source_root(),
            output: default_output(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct AssetSettings {
    /// Stylesheet copied into every category directory
    stylesheet: Option<String>,
    /// PNG copied to the bundle root as icon.png (defaults to
    /// `<source_root>/images/logo.png`)
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BuildSettings {
    #[serde(default = "default_minify")]
    minify: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
        }
    }
}

fn default_name() -> String {
    "tldr".to_string()
}
fn default_source_root() -> String {
    "tldr".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_minify() -> bool {
    true
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

fn resolve(file_config: ConfigFile, pages: &str) -> BuildConfig {
    let source_root = PathBuf::from(&file_config.docset.source_root);

    BuildConfig {
        pages_dir: source_root.join(pages),
        output_dir: PathBuf::from(&file_config.docset.output),
        name: file_config.docset.name,
        stylesheet: file_config.assets.stylesheet.map(PathBuf::from),
        icon: file_config
            .assets
            .icon
            .map(PathBuf::from)
            .unwrap_or_else(|| source_root.join("images").join("logo.png")),
        minify: file_config.build.minify,
    }
}

/// Run the build.
pub async fn run(pages: &str, config_path: &Path) -> Result<()> {
    let config = resolve(load_config(config_path)?, pages);

    tracing::info!("Building {} docset...", config.name);

    let result = DocsetBuilder::new(config).build().await?;

    tracing::info!(
        "Built {} pages in {} categories in {}ms",
        result.pages,
        result.categories,
        result.duration_ms
    );
    tracing::info!(
        "Indexed {} entries ({} already present, {} failed)",
        result.index.inserted,
        result.index.duplicates,
        result.index.failed
    );
    tracing::info!("Output: {}", result.output_dir.display());

    if !result.failures.is_empty() {
        for failure in &result.failures {
            tracing::error!("{}", failure);
        }
        anyhow::bail!("{} pages failed to build", result.failures.len());
    }

    Ok(())
}
