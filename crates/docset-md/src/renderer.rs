//! Markdown to HTML page rendering.

use minijinja::{context, AutoEscape, Environment};
use pulldown_cmark::{html, Options, Parser};

/// File name of the stylesheet every page links to.
pub const STYLESHEET_FILE: &str = "bootstrap.min.css";

const PAGE_TEMPLATE_NAME: &str = "page.html";

const PAGE_TEMPLATE: &str = r##"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{{ title }}</title>
    <link href="./{{ stylesheet }}" rel="stylesheet">
  </head>
  <body>
    {{ body | safe }}
  </body>
</html>
"##;

/// Errors that can occur when rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to render page template: {0}")]
    Template(#[from] minijinja::Error),
}

/// Renders Markdown pages into complete HTML documents.
///
/// Holds the Markdown options and the compiled page template. Construct one per
/// run and share it by reference; rendering keeps no state between pages.
pub struct PageRenderer {
    options: Options,
    env: Environment<'static>,
}

impl PageRenderer {
    /// Create a renderer with the built-in page template.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template(PAGE_TEMPLATE_NAME, PAGE_TEMPLATE)
            .expect("Failed to add page template");

        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;

        Self { options, env }
    }

    /// Render Markdown text to an HTML fragment.
    pub fn render_markdown(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, parser);

        html_output
    }

    /// Render a full HTML document for one page.
    ///
    /// `title` ends up HTML-escaped inside `<title>`; the Markdown body is
    /// inserted as-is.
    pub fn render_page(&self, title: &str, markdown: &str) -> Result<String, RenderError> {
        let body = self.render_markdown(markdown);
        let tmpl = self.env.get_template(PAGE_TEMPLATE_NAME)?;

        let html = tmpl.render(context! {
            title => title,
            stylesheet => STYLESHEET_FILE,
            body => body,
        })?;

        Ok(html)
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry name for a file: everything before the first `.`.
///
/// `git-status.md` becomes `git-status`, `x.y.html` becomes `x`.
pub fn entry_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}
