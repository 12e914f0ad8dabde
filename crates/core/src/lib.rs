#![deny(missing_docs)]
//! folio core: document model, list grouping, mark ordering and the generic renderer.

/// Asset references and URL resolution.
pub mod asset;
/// Core error and diagnostic types.
pub mod error;
/// List-item grouping.
pub mod group;
/// Mark ordering and inline trees.
pub mod marks;
/// Document model and JSON decoding.
pub mod model;
/// Generic renderer engine.
pub mod renderer;
/// Plain-text extraction.
pub mod text;

pub use asset::{AssetRef, AssetResolver, ImageSize, ImageUrlBuilder, StoreConfig};
pub use error::{AssetError, NodePath, RenderDiagnostics, RenderError, RenderWarning};
pub use group::{Grouped, ListEntry, ListGroup, flatten, group_indexed, group_nodes};
pub use marks::{DECORATOR_ORDER, MarkNode, MarkTree, ResolvedMark, build_mark_tree, resolve_marks};
pub use model::{
    AssetSource, Block, BlockStyle, Document, Image, Inline, ListKind, MarkDef, Node, ObjectNode,
    Span,
};
pub use renderer::{
    BlockProps, Fallbacks, ListItemProps, ListProps, MarkProps, RenderResult, Rendered,
    RendererTable, TypeProps, TypeValue, render, render_document, render_optional,
};
pub use text::to_plain_text;
