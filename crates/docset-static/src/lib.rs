//! Docset bundle builder.
//!
//! Builds a Dash-compatible docset from a tree of Markdown command pages:
//! rendered HTML under `Contents/Resources/Documents`, the `Info.plist`
//! descriptor, the icon and the `docSet.dsidx` search index.

pub mod assets;
pub mod builder;
pub mod descriptor;
pub mod index;
pub mod walker;

pub use builder::{BuildConfig, BuildError, BuildResult, DocsetBuilder, PageFailure};
pub use index::{IndexEntry, IndexReport, InsertOutcome, SearchIndex};
