//! Markdown page renderer for docset bundles.
//!
//! This crate turns a single Markdown command page into a self-contained HTML
//! document that links the stylesheet sitting next to it in the bundle.

pub mod renderer;

pub use renderer::{entry_name, PageRenderer, RenderError, STYLESHEET_FILE};
