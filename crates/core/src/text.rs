//! Plain-text extraction.

use crate::model::Node;

/// Joins the text of every block with blank lines; non-text nodes are ignored.
///
/// ```
/// use folio_core::{Block, Node, Span, to_plain_text};
///
/// let doc = vec![
///     Node::Block(Block::new("h2", vec![Span::new("Title", &[])])),
///     Node::Block(Block::new("normal", vec![Span::new("Body ", &[]), Span::new("text", &["em"])])),
/// ];
/// assert_eq!(to_plain_text(&doc), "Title\n\nBody text");
/// ```
pub fn to_plain_text(document: &[Node]) -> String {
    document
        .iter()
        .filter_map(|node| match node {
            Node::Block(block) => Some(block.plain_text()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
