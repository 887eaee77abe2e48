//! Markdown rendering
//!
//! Article bodies are stored as markdown and rendered to HTML once, at
//! write time, so reads stay cheap.

use pulldown_cmark::{html, Options, Parser};

/// Render markdown to HTML with tables and strikethrough enabled.
pub fn render(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let html = render("# Heading\n\nSome **bold** text.");
        assert!(html.contains("<h1>Heading</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_render_table() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_render_empty() {
        assert!(render("").is_empty());
    }
}
