#![deny(missing_docs)]
//! folio HTML backend: default components, heading anchors and link checks.
//!
//! ```
//! use folio_core::Document;
//! use folio_html::{HtmlOptions, to_html};
//!
//! let doc = Document::from_json(r#"[
//!     {"_type": "block", "children": [{"_type": "span", "text": "Hi & bye", "marks": ["em"]}]}
//! ]"#).unwrap().unwrap();
//! let out = to_html(&doc.nodes, &HtmlOptions::default()).unwrap();
//! assert_eq!(out.html, "<p><em>Hi &amp; bye</em></p>");
//! ```

mod components;
/// Rendering options.
pub mod options;
/// Heading slug generation.
pub mod slug;
/// Link target safety checks.
pub mod uri;

pub use options::HtmlOptions;
pub use slug::{Slugger, slugify};
pub use uri::is_safe_uri;

use components::{HeadingSlugs, html_table};
use folio_core::{
    AssetResolver, Document, Node, RenderDiagnostics, RenderError, RendererTable, render,
    render_document,
};
use serde::Serialize;
use std::sync::Arc;

/// Heading metadata collected for a table of contents.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    /// Heading depth (1-6).
    pub depth: u8,
    /// Slugified identifier.
    pub slug: String,
    /// Visible heading text.
    pub text: String,
}

/// Result of rendering a document to HTML.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlOutput {
    /// The rendered markup.
    pub html: String,
    /// Top-level headings in document order.
    pub headings: Vec<HeadingEntry>,
    /// Skips and fallbacks from the render pass.
    pub diagnostics: RenderDiagnostics,
}

/// Renders documents to HTML with the default components.
pub struct HtmlRenderer {
    options: HtmlOptions,
    resolver: Option<Arc<dyn AssetResolver>>,
}

impl HtmlRenderer {
    /// Creates a renderer without an asset resolver.
    ///
    /// Images whose asset is a direct URL still render; stored assets fail.
    pub fn new(options: HtmlOptions) -> Self {
        Self {
            options,
            resolver: None,
        }
    }

    /// Sets the resolver used for image URLs.
    pub fn with_resolver(mut self, resolver: impl AssetResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Returns the options.
    pub fn options(&self) -> &HtmlOptions {
        &self.options
    }

    /// Renders a sequence of nodes.
    pub fn render(&self, nodes: &[Node]) -> Result<HtmlOutput, RenderError> {
        let (headings, slugs) = collect_headings(nodes);
        let table = self.table(slugs);
        let rendered = render(nodes, &table)?;
        Ok(HtmlOutput {
            html: rendered.nodes.concat(),
            headings,
            diagnostics: rendered.diagnostics,
        })
    }

    /// Renders a decoded document, keeping its decode warnings.
    pub fn render_document(&self, document: &Document) -> Result<HtmlOutput, RenderError> {
        let (headings, slugs) = collect_headings(&document.nodes);
        let table = self.table(slugs);
        let rendered = render_document(document, &table)?;
        Ok(HtmlOutput {
            html: rendered.nodes.concat(),
            headings,
            diagnostics: rendered.diagnostics,
        })
    }

    /// Renders a document that may be absent; `None` renders to nothing.
    pub fn render_optional(&self, nodes: Option<&[Node]>) -> Result<Option<HtmlOutput>, RenderError> {
        nodes.map(|nodes| self.render(nodes)).transpose()
    }

    fn table(&self, slugs: HeadingSlugs) -> RendererTable<String> {
        html_table(&self.options, self.resolver.clone(), Arc::new(slugs))
    }
}

/// Renders nodes to HTML with the given options and no asset resolver.
pub fn to_html(nodes: &[Node], options: &HtmlOptions) -> Result<HtmlOutput, RenderError> {
    HtmlRenderer::new(options.clone()).render(nodes)
}

/// Assigns slugs to top-level heading blocks; list items are not headings.
fn collect_headings(nodes: &[Node]) -> (Vec<HeadingEntry>, HeadingSlugs) {
    let mut slugger = Slugger::new();
    let mut headings = Vec::new();
    let mut slugs = HeadingSlugs::new();

    for (index, node) in nodes.iter().enumerate() {
        let Node::Block(block) = node else {
            continue;
        };
        if block.list_item.is_some() {
            continue;
        }
        let Some(depth) = block.style.heading_depth() else {
            continue;
        };
        let text = block.plain_text().trim().to_string();
        let slug = slugger.slug(&text);
        slugs.insert(index, slug.clone());
        headings.push(HeadingEntry { depth, slug, text });
    }
    (headings, slugs)
}
