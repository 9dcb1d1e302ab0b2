//! Markdown to HTML rendering for page prose.
//!
//! The assembler hands the renderer one line (or one grouped code fence) at a
//! time and concatenates the fragments; renderers keep no state between calls.

use markdown::mdast::Node;
use thiserror::Error;

use crate::slug::heading_slug;

/// Error raised when a fragment cannot be rendered.
#[derive(Debug, Error)]
#[error("Render error: {message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    /// Create a render error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Renders a markdown fragment to HTML.
pub trait Render {
    /// Render `markdown` into an HTML fragment.
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

impl<F> Render for F
where
    F: Fn(&str) -> String,
{
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        Ok((self)(markdown))
    }
}

/// Rendering options for [`MarkdownRenderer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Pass raw HTML through instead of escaping it.
    pub raw_html: bool,
    /// Add `id` anchors to headings.
    pub heading_ids: bool,
}

impl RenderOptions {
    /// Convert to markdown-rs `Options`.
    pub fn to_markdown(self) -> markdown::Options {
        let mut constructs = markdown::Constructs {
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        markdown::Options {
            parse: markdown::ParseOptions {
                constructs,
                ..markdown::ParseOptions::default()
            },
            compile: markdown::CompileOptions {
                allow_dangerous_html: self.raw_html,
                gfm_tagfilter: self.gfm,
                ..markdown::CompileOptions::default()
            },
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            raw_html: true,
            heading_ids: true,
        }
    }
}

/// Default renderer backed by markdown-rs.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl Render for MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let options = self.options.to_markdown();
        let html = markdown::to_html_with_options(markdown, &options)
            .map_err(|message| RenderError::new(message.to_string()))?;

        if !self.options.heading_ids {
            return Ok(html);
        }

        let tree = markdown::to_mdast(markdown, &options.parse)
            .map_err(|message| RenderError::new(message.to_string()))?;
        Ok(anchor_heading(html, &tree))
    }
}

/// Adds `id="<slug>"` to the opening tag when the fragment is a single heading.
fn anchor_heading(html: String, tree: &Node) -> String {
    let Some(Node::Heading(heading)) = tree.children().and_then(|children| children.first())
    else {
        return html;
    };

    let mut text = String::new();
    for child in &heading.children {
        collect_text(child, &mut text);
    }
    let slug = heading_slug(&text);
    if slug.is_empty() {
        return html;
    }

    let open = format!("<h{}>", heading.depth);
    if !html.starts_with(&open) {
        return html;
    }
    let anchored = format!(
        "<h{} id=\"{}\">",
        heading.depth,
        html_escape::encode_double_quoted_attribute(&slug)
    );
    html.replacen(&open, &anchored, 1)
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&text.value),
        Node::InlineCode(code) => out.push_str(&code.value),
        Node::InlineMath(math) => out.push_str(&math.value),
        other => {
            if let Some(children) = other.children() {
                for child in children {
                    collect_text(child, out);
                }
            }
        }
    }
}
