//! Static assets shipped inside the bundle.

use std::path::Path;

use docset_md::STYLESHEET_FILE;
use tokio::fs;

use crate::builder::BuildError;

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Load the stylesheet that every category directory receives.
    ///
    /// A configured stylesheet is copied byte for byte. Without one, the
    /// built-in stylesheet is used, minified when `minify` is set.
    pub async fn load_stylesheet(
        configured: Option<&Path>,
        minify: bool,
    ) -> Result<Vec<u8>, BuildError> {
        if let Some(path) = configured {
            let bytes = fs::read(path).await.map_err(|e| {
                BuildError::ReadError(format!("Failed to read stylesheet {}: {}", path.display(), e))
            })?;
            tracing::info!("Using stylesheet from {}", path.display());
            return Ok(bytes);
        }

        let css = Self::generate_css();
        let css = if minify {
            Self::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Falling back to unminified stylesheet: {}", e);
                css
            })
        } else {
            css
        };

        Ok(css.into_bytes())
    }

    /// Write the stylesheet into a category output directory.
    ///
    /// Overwrites any previous copy.
    pub async fn provision(category_dir: &Path, stylesheet: &[u8]) -> Result<(), BuildError> {
        let target = category_dir.join(STYLESHEET_FILE);
        fs::write(&target, stylesheet)
            .await
            .map_err(|e| BuildError::WriteError(format!("{}: {}", target.display(), e)))
    }

    /// Copy the bundle icon.
    pub async fn copy_icon(source: &Path, target: &Path) -> Result<(), BuildError> {
        fs::copy(source, target).await.map_err(|e| {
            BuildError::WriteError(format!(
                "Failed to copy icon {} to {}: {}",
                source.display(),
                target.display(),
                e
            ))
        })?;
        Ok(())
    }

    /// Generate the built-in stylesheet.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* Command page stylesheet */

body {
  font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
  line-height: 1.5;
  color: #212529;
  background: #fff;
  margin: 0;
  padding: 1rem 1.5rem;
  max-width: 56rem;
}

h1 {
  font-size: 2rem;
  font-weight: 500;
  margin: 0 0 1rem;
}

blockquote {
  margin: 0 0 1rem;
  padding-left: 1rem;
  border-left: 4px solid #dee2e6;
  color: #6c757d;
}

ul {
  padding-left: 1.25rem;
  margin: 1rem 0 0.5rem;
}

code {
  font-family: SFMono-Regular, Menlo, Monaco, Consolas, monospace;
  font-size: 0.875em;
  color: #d63384;
  word-wrap: break-word;
}

p > code {
  display: block;
  padding: 0.5rem 0.75rem;
  background: #f8f9fa;
  border-radius: 0.25rem;
  color: #212529;
}

a {
  color: #0d6efd;
}
"#;
