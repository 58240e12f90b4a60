//! Markdown rendering for article and translation bodies.

use pulldown_cmark::{html, Options, Parser};

/// Converts Markdown source into the HTML body sent to the remote.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// CommonMark renderer with tables, strikethrough and footnotes enabled.
#[derive(Debug, Clone, Default)]
pub struct CommonMarkRenderer;

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_FOOTNOTES);

        let parser = Parser::new_ext(markdown, options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_header() {
        assert_eq!(CommonMarkRenderer.render("# Header"), "<h1>Header</h1>\n");
    }

    #[test]
    fn test_renders_table() {
        let html = CommonMarkRenderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }
}
