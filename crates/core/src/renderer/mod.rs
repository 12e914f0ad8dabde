//! Generic structured-document renderer.
//!
//! The engine does not know what it renders to. A backend supplies a
//! [`RendererTable`] whose functions build presentation nodes of type `N`;
//! the engine groups list items, orders marks, applies fallbacks, drops
//! malformed nodes and hands everything else to the table.
//!
//! # Module Structure
//!
//! - `table` - Render function types, props and the dispatch table
//! - `context` - Per-pass traversal state

mod context;
mod table;

pub use context::Context;
pub use table::{
    BlockFn, BlockProps, BreakFn, Fallbacks, ListFn, ListItemFn, ListItemProps, ListProps, MarkFn,
    MarkProps, RenderResult, RendererTable, TextFn, TypeFn, TypeProps, TypeValue,
};

use crate::error::{RenderDiagnostics, RenderError};
use crate::group::group_nodes;
use crate::model::{Document, Node};

/// Output of a render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered<N> {
    /// Top-level presentation nodes.
    pub nodes: Vec<N>,
    /// Skips and fallbacks that happened along the way.
    pub diagnostics: RenderDiagnostics,
}

/// Renders a sequence of nodes through `table`.
///
/// Errors from table functions are returned as-is; malformed nodes are
/// dropped and reported in [`Rendered::diagnostics`].
///
/// ```
/// use folio_core::{Block, Fallbacks, Node, RendererTable, Span, render};
///
/// let table: RendererTable<String> = RendererTable::new(Fallbacks::new(
///     |text| text.to_string(),
///     |p| Ok(format!("<p>{}</p>", p.children.concat())),
///     |p| Ok(format!("<ul>{}</ul>", p.children.concat())),
///     |p| Ok(format!("<li>{}</li>", p.children.concat())),
///     |p| Ok(p.children.concat()),
/// ));
/// let doc = vec![Node::Block(Block::new("normal", vec![Span::new("hi", &[])]))];
/// let out = render(&doc, &table).unwrap();
/// assert_eq!(out.nodes, vec!["<p>hi</p>".to_string()]);
/// ```
pub fn render<N>(document: &[Node], table: &RendererTable<N>) -> Result<Rendered<N>, RenderError> {
    let grouped = group_nodes(document);
    let mut ctx = Context::new(table);
    let mut nodes = Vec::with_capacity(grouped.len());
    for entry in &grouped {
        if let Some(node) = ctx.render_grouped(entry)? {
            nodes.push(node);
        }
    }
    Ok(Rendered {
        nodes,
        diagnostics: ctx.diagnostics,
    })
}

/// Renders a document that may be absent; `None` renders to nothing.
pub fn render_optional<N>(
    document: Option<&[Node]>,
    table: &RendererTable<N>,
) -> Result<Option<Rendered<N>>, RenderError> {
    document.map(|nodes| render(nodes, table)).transpose()
}

/// Renders a decoded document, carrying over its decode warnings.
pub fn render_document<N>(
    document: &Document,
    table: &RendererTable<N>,
) -> Result<Rendered<N>, RenderError> {
    let mut rendered = render(&document.nodes, table)?;
    if document.diagnostics.has_warnings() {
        let mut diagnostics = document.diagnostics.clone();
        diagnostics.extend(&rendered.diagnostics);
        rendered.diagnostics = diagnostics;
    }
    Ok(rendered)
}
