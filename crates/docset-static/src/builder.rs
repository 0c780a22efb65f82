//! Docset bundle builder.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use docset_md::{PageRenderer, RenderError};
use futures::future::{join_all, try_join_all};
use tokio::fs;

use crate::assets::AssetPipeline;
use crate::descriptor::write_info_plist;
use crate::index::{build_index, IndexReport};
use crate::walker::{discover_categories, discover_pages, Category, SourcePage};

/// Configuration for building a docset.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory holding one subdirectory per category
    pub pages_dir: PathBuf,

    /// Directory the `<name>.docset` bundle is written into
    pub output_dir: PathBuf,

    /// Docset name, used for the bundle directory and the descriptor
    pub name: String,

    /// Stylesheet copied next to every page (built-in one when unset)
    pub stylesheet: Option<PathBuf>,

    /// PNG copied to `icon.png` at the bundle root
    pub icon: PathBuf,

    /// Minify the built-in stylesheet
    pub minify: bool,
}

impl BuildConfig {
    /// Root directory of the bundle.
    pub fn bundle_dir(&self) -> PathBuf {
        self.output_dir.join(format!("{}.docset", self.name))
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            pages_dir: PathBuf::from("tldr/pages"),
            output_dir: PathBuf::from("dist"),
            name: "tldr".to_string(),
            stylesheet: None,
            icon: PathBuf::from("tldr/images/logo.png"),
            minify: true,
        }
    }
}

/// Fixed paths inside a docset bundle.
#[derive(Debug, Clone)]
pub struct BundleLayout {
    /// `<name>.docset`
    pub root: PathBuf,

    /// `Contents/Info.plist`
    pub info_plist: PathBuf,

    /// `Contents/Resources/docSet.dsidx`
    pub index: PathBuf,

    /// `Contents/Resources/Documents`
    pub documents: PathBuf,

    /// `icon.png`
    pub icon: PathBuf,
}

impl BundleLayout {
    pub fn new(root: PathBuf) -> Self {
        let contents = root.join("Contents");
        let resources = contents.join("Resources");

        Self {
            info_plist: contents.join("Info.plist"),
            index: resources.join("docSet.dsidx"),
            documents: resources.join("Documents"),
            icon: root.join("icon.png"),
            root,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of categories found
    pub categories: usize,

    /// Number of pages written
    pub pages: usize,

    /// Search index counters
    pub index: IndexReport,

    /// Pages that could not be built
    pub failures: Vec<PageFailure>,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Bundle directory
    pub output_dir: PathBuf,
}

/// A page that was skipped because reading, rendering or writing it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub category: String,
    pub name: String,
    pub message: String,
}

impl fmt::Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.category, self.name, self.message)
    }
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read: {0}")]
    ReadError(String),

    #[error("Failed to render page: {0}")]
    RenderError(#[from] RenderError),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Search index error: {0}")]
    IndexError(String),

    #[error("Background task failed: {0}")]
    TaskError(String),
}

#[derive(Debug, Default)]
struct CategoryOutcome {
    pages: usize,
    failures: Vec<PageFailure>,
}

/// Docset builder.
pub struct DocsetBuilder {
    config: BuildConfig,
    renderer: PageRenderer,
}

impl DocsetBuilder {
    /// Create a new docset builder.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            renderer: PageRenderer::new(),
        }
    }

    /// Build the docset.
    ///
    /// Every page is written before the index scan starts. Page-level failures
    /// are collected in the result; setup and index failures abort the build.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let layout = BundleLayout::new(self.config.bundle_dir());

        fs::create_dir_all(&layout.documents)
            .await
            .map_err(|e| BuildError::WriteError(format!("{}: {}", layout.documents.display(), e)))?;

        let stylesheet =
            AssetPipeline::load_stylesheet(self.config.stylesheet.as_deref(), self.config.minify)
                .await?;

        let categories = discover_categories(&self.config.pages_dir).await?;
        tracing::info!(
            "Rendering {} categories from {}",
            categories.len(),
            self.config.pages_dir.display()
        );

        let outcomes = try_join_all(
            categories
                .iter()
                .map(|category| self.build_category(category, &layout.documents, &stylesheet)),
        )
        .await?;

        let mut pages = 0;
        let mut failures = Vec::new();
        for outcome in outcomes {
            pages += outcome.pages;
            failures.extend(outcome.failures);
        }

        tracing::info!("Rendered {} pages, building search index", pages);

        let ((), index) = tokio::try_join!(
            self.write_resources(&layout),
            build_index(layout.index.clone(), layout.documents.clone())
        )?;

        Ok(BuildResult {
            categories: categories.len(),
            pages,
            index,
            failures,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            output_dir: layout.root,
        })
    }

    /// Render one category: stylesheet and pages are written concurrently.
    async fn build_category(
        &self,
        category: &Category,
        documents_dir: &Path,
        stylesheet: &[u8],
    ) -> Result<CategoryOutcome, BuildError> {
        let out_dir = documents_dir.join(&category.name);
        fs::create_dir_all(&out_dir)
            .await
            .map_err(|e| BuildError::WriteError(format!("{}: {}", out_dir.display(), e)))?;

        let render_pages = async {
            let mut outcome = CategoryOutcome::default();

            let (pages, collisions) = split_collisions(discover_pages(category).await?);
            for page in collisions {
                outcome.failures.push(PageFailure {
                    message: format!(
                        "{} maps to an output file that another page already uses",
                        page.path.display()
                    ),
                    category: page.category,
                    name: page.name,
                });
            }

            let results = join_all(pages.iter().map(|page| self.build_page(page, &out_dir))).await;

            for (page, result) in pages.into_iter().zip(results) {
                match result {
                    Ok(()) => outcome.pages += 1,
                    Err(e) => {
                        tracing::warn!("Skipping {}/{}: {}", page.category, page.name, e);
                        outcome.failures.push(PageFailure {
                            category: page.category,
                            name: page.name,
                            message: e.to_string(),
                        });
                    }
                }
            }

            Ok::<_, BuildError>(outcome)
        };

        let ((), outcome) = tokio::try_join!(
            AssetPipeline::provision(&out_dir, stylesheet),
            render_pages
        )?;

        tracing::debug!(
            "Category {}: {} pages, {} failures",
            category.name,
            outcome.pages,
            outcome.failures.len()
        );

        Ok(outcome)
    }

    /// Read, render and write a single page.
    async fn build_page(&self, page: &SourcePage, out_dir: &Path) -> Result<(), BuildError> {
        let markdown = fs::read_to_string(&page.path)
            .await
            .map_err(|e| BuildError::ReadError(format!("{}: {}", page.path.display(), e)))?;

        let html = self.renderer.render_page(&page.name, &markdown)?;

        let target = out_dir.join(page.output_file_name());
        fs::write(&target, html)
            .await
            .map_err(|e| BuildError::WriteError(format!("{}: {}", target.display(), e)))?;

        tracing::debug!("Wrote {}", target.display());

        Ok(())
    }

    /// Write the descriptor and copy the icon.
    async fn write_resources(&self, layout: &BundleLayout) -> Result<(), BuildError> {
        tokio::try_join!(
            write_info_plist(&layout.info_plist, &self.config.name),
            AssetPipeline::copy_icon(&self.config.icon, &layout.icon)
        )?;

        Ok(())
    }
}

/// Split off pages whose output file name is already taken by another page.
///
/// `foo.md` and `foo.1.md` both render to `foo.html`. The page named exactly
/// `foo.md` wins; among the others the first in file name order is kept.
fn split_collisions(mut pages: Vec<SourcePage>) -> (Vec<SourcePage>, Vec<SourcePage>) {
    pages.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| b.is_canonical().cmp(&a.is_canonical()))
            .then_with(|| a.path.cmp(&b.path))
    });

    let mut seen = HashSet::new();
    pages
        .into_iter()
        .partition(|page| seen.insert(page.output_file_name()))
}
