//! Source tree discovery.
//!
//! The source tree is exactly two levels deep: `<root>/<category>/<page>.md`.

use std::path::{Path, PathBuf};

use docset_md::entry_name;
use tokio::fs;

use crate::builder::BuildError;

/// Extension of source pages.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// A category directory in the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Directory name, used as the index entry type
    pub name: String,

    /// Source directory path
    pub path: PathBuf,
}

/// A Markdown page inside a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage {
    /// Owning category name
    pub category: String,

    /// Entry name (file name up to the first dot)
    pub name: String,

    /// Source file path
    pub path: PathBuf,
}

impl SourcePage {
    /// Output file name, relative to the category directory.
    pub fn output_file_name(&self) -> String {
        format!("{}.html", self.name)
    }

    /// Whether the source file is named exactly `<name>.md`.
    pub fn is_canonical(&self) -> bool {
        self.path
            .file_name()
            .is_some_and(|f| f.to_string_lossy() == format!("{}{}", self.name, MARKDOWN_EXTENSION))
    }
}

/// List the immediate subdirectories of `root`.
///
/// Files at the root are ignored. Failure to read `root` is fatal.
pub async fn discover_categories(root: &Path) -> Result<Vec<Category>, BuildError> {
    let mut categories = Vec::new();

    let mut entries = fs::read_dir(root)
        .await
        .map_err(|e| BuildError::ReadError(format!("{}: {}", root.display(), e)))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| BuildError::ReadError(format!("{}: {}", root.display(), e)))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| BuildError::ReadError(format!("{}: {}", entry.path().display(), e)))?;

        if !file_type.is_dir() {
            continue;
        }

        categories.push(Category {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        });
    }

    categories.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(categories)
}

/// List the Markdown pages directly inside a category directory.
///
/// Subdirectories and files without the `.md` suffix are skipped.
pub async fn discover_pages(category: &Category) -> Result<Vec<SourcePage>, BuildError> {
    let mut pages = Vec::new();

    let mut entries = fs::read_dir(&category.path)
        .await
        .map_err(|e| BuildError::ReadError(format!("{}: {}", category.path.display(), e)))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| BuildError::ReadError(format!("{}: {}", category.path.display(), e)))?
    {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.ends_with(MARKDOWN_EXTENSION) {
            continue;
        }

        let file_type = entry
            .file_type()
            .await
            .map_err(|e| BuildError::ReadError(format!("{}: {}", entry.path().display(), e)))?;

        if file_type.is_dir() {
            continue;
        }

        pages.push(SourcePage {
            category: category.name.clone(),
            name: entry_name(&file_name).to_string(),
            path: entry.path(),
        });
    }

    pages.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));

    Ok(pages)
}
