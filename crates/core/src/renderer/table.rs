//! Renderer table: the per-tag render functions a presentation backend supplies.

use crate::asset::AssetRef;
use crate::error::RenderError;
use crate::model::{Block, BlockStyle, Image, ListKind, MarkDef, ObjectNode};
use std::collections::HashMap;

/// Result type returned by table entries.
pub type RenderResult<N> = Result<N, RenderError>;

/// Turns a text run into a node.
pub type TextFn<N> = Box<dyn Fn(&str) -> N + Send + Sync>;
/// Renders a block from its rendered inline children.
pub type BlockFn<N> = Box<dyn Fn(BlockProps<'_, N>) -> RenderResult<N> + Send + Sync>;
/// Renders a list container from its rendered items.
pub type ListFn<N> = Box<dyn Fn(ListProps<'_, N>) -> RenderResult<N> + Send + Sync>;
/// Renders a list item from its rendered content.
pub type ListItemFn<N> = Box<dyn Fn(ListItemProps<'_, N>) -> RenderResult<N> + Send + Sync>;
/// Wraps rendered children in a decorator or annotation.
pub type MarkFn<N> = Box<dyn Fn(MarkProps<'_, N>) -> RenderResult<N> + Send + Sync>;
/// Renders an embedded object.
pub type TypeFn<N> = Box<dyn Fn(TypeProps<'_>) -> RenderResult<N> + Send + Sync>;
/// Produces a hard line break.
pub type BreakFn<N> = Box<dyn Fn() -> N + Send + Sync>;

/// Input to a block renderer.
#[derive(Debug)]
pub struct BlockProps<'a, N> {
    /// The block being rendered.
    pub block: &'a Block,
    /// Position in the document.
    pub index: usize,
    /// Rendered inline content.
    pub children: Vec<N>,
}

/// Input to a list renderer.
#[derive(Debug)]
pub struct ListProps<'a, N> {
    /// The list type.
    pub kind: &'a ListKind,
    /// Nesting depth, starting at 1.
    pub level: u32,
    /// Rendered items.
    pub children: Vec<N>,
}

/// Input to a list item renderer.
#[derive(Debug)]
pub struct ListItemProps<'a, N> {
    /// The item's block.
    pub block: &'a Block,
    /// The enclosing list's type.
    pub kind: &'a ListKind,
    /// Position in the document.
    pub index: usize,
    /// Position within the enclosing list.
    pub position: usize,
    /// Rendered inline content followed by any nested lists.
    pub children: Vec<N>,
}

/// Input to a mark renderer.
#[derive(Debug)]
pub struct MarkProps<'a, N> {
    /// Decorator name or annotation type.
    pub name: &'a str,
    /// Annotation payload; `None` for decorators.
    pub annotation: Option<&'a MarkDef>,
    /// Rendered wrapped content.
    pub children: Vec<N>,
}

/// The value handed to a type renderer.
#[derive(Debug, Clone, Copy)]
pub enum TypeValue<'a> {
    /// A validated image with its parsed asset reference.
    Image {
        /// The raw image node.
        image: &'a Image,
        /// The parsed reference.
        asset: &'a AssetRef,
    },
    /// Any other object.
    Object(&'a ObjectNode),
}

/// Input to a type renderer.
#[derive(Debug, Clone, Copy)]
pub struct TypeProps<'a> {
    /// The node's `_type`.
    pub kind: &'a str,
    /// The node.
    pub value: TypeValue<'a>,
    /// Whether the node sits inside a block's children.
    pub is_inline: bool,
    /// Position of the enclosing top-level node.
    pub index: usize,
}

/// Renderers used when the table has no entry for a tag.
pub struct Fallbacks<N> {
    /// Text leaves. Always used; there is no per-tag text renderer.
    pub text: TextFn<N>,
    /// The plain paragraph; also used for unknown styles when `normal` is not registered.
    pub block: BlockFn<N>,
    /// Lists of an unknown type.
    pub list: ListFn<N>,
    /// Items of a list of an unknown type.
    pub list_item: ListItemFn<N>,
    /// Unknown decorators and annotation types.
    pub mark: MarkFn<N>,
    /// Unknown object types; `None` drops them.
    pub unknown_type: Option<TypeFn<N>>,
}

impl<N> Fallbacks<N> {
    /// Creates fallbacks with no unknown-type renderer.
    pub fn new(
        text: impl Fn(&str) -> N + Send + Sync + 'static,
        block: impl Fn(BlockProps<'_, N>) -> RenderResult<N> + Send + Sync + 'static,
        list: impl Fn(ListProps<'_, N>) -> RenderResult<N> + Send + Sync + 'static,
        list_item: impl Fn(ListItemProps<'_, N>) -> RenderResult<N> + Send + Sync + 'static,
        mark: impl Fn(MarkProps<'_, N>) -> RenderResult<N> + Send + Sync + 'static,
    ) -> Self {
        Self {
            text: Box::new(text),
            block: Box::new(block),
            list: Box::new(list),
            list_item: Box::new(list_item),
            mark: Box::new(mark),
            unknown_type: None,
        }
    }

    /// Renders unknown object types instead of dropping them.
    pub fn with_unknown_type(
        mut self,
        render: impl Fn(TypeProps<'_>) -> RenderResult<N> + Send + Sync + 'static,
    ) -> Self {
        self.unknown_type = Some(Box::new(render));
        self
    }
}

/// Mapping from tags to render functions, with required fallbacks.
///
/// ```
/// use folio_core::{Fallbacks, RendererTable, BlockStyle};
///
/// let table: RendererTable<String> = RendererTable::new(Fallbacks::new(
///     |text| text.to_string(),
///     |p| Ok(format!("<p>{}</p>", p.children.concat())),
///     |p| Ok(format!("<ul>{}</ul>", p.children.concat())),
///     |p| Ok(format!("<li>{}</li>", p.children.concat())),
///     |p| Ok(p.children.concat()),
/// ))
/// .block(BlockStyle::H2, |p| Ok(format!("<h2>{}</h2>", p.children.concat())));
/// assert!(table.has_block(&BlockStyle::H2));
/// ```
pub struct RendererTable<N> {
    fallbacks: Fallbacks<N>,
    block: HashMap<BlockStyle, BlockFn<N>>,
    list: HashMap<ListKind, ListFn<N>>,
    list_item: HashMap<ListKind, ListItemFn<N>>,
    marks: HashMap<String, MarkFn<N>>,
    types: HashMap<String, TypeFn<N>>,
    hard_break: Option<BreakFn<N>>,
}

impl<N> RendererTable<N> {
    /// Creates a table that routes everything through `fallbacks`.
    pub fn new(fallbacks: Fallbacks<N>) -> Self {
        Self {
            fallbacks,
            block: HashMap::new(),
            list: HashMap::new(),
            list_item: HashMap::new(),
            marks: HashMap::new(),
            types: HashMap::new(),
            hard_break: None,
        }
    }

    /// Registers a block style renderer.
    pub fn block(
        mut self,
        style: impl Into<BlockStyle>,
        render: impl Fn(BlockProps<'_, N>) -> RenderResult<N> + Send + Sync + 'static,
    ) -> Self {
        self.block.insert(style.into(), Box::new(render));
        self
    }

    /// Registers a list container renderer.
    pub fn list(
        mut self,
        kind: impl Into<ListKind>,
        render: impl Fn(ListProps<'_, N>) -> RenderResult<N> + Send + Sync + 'static,
    ) -> Self {
        self.list.insert(kind.into(), Box::new(render));
        self
    }

    /// Registers a list item renderer.
    pub fn list_item(
        mut self,
        kind: impl Into<ListKind>,
        render: impl Fn(ListItemProps<'_, N>) -> RenderResult<N> + Send + Sync + 'static,
    ) -> Self {
        self.list_item.insert(kind.into(), Box::new(render));
        self
    }

    /// Registers a decorator or annotation renderer.
    pub fn mark(
        mut self,
        name: impl Into<String>,
        render: impl Fn(MarkProps<'_, N>) -> RenderResult<N> + Send + Sync + 'static,
    ) -> Self {
        self.marks.insert(name.into(), Box::new(render));
        self
    }

    /// Registers an object type renderer.
    pub fn object(
        mut self,
        kind: impl Into<String>,
        render: impl Fn(TypeProps<'_>) -> RenderResult<N> + Send + Sync + 'static,
    ) -> Self {
        self.types.insert(kind.into(), Box::new(render));
        self
    }

    /// Splits text on `\n` and inserts this node between the pieces.
    pub fn hard_break(mut self, render: impl Fn() -> N + Send + Sync + 'static) -> Self {
        self.hard_break = Some(Box::new(render));
        self
    }

    /// Returns true if a renderer is registered for `style`.
    pub fn has_block(&self, style: &BlockStyle) -> bool {
        self.block.contains_key(style)
    }

    pub(crate) fn text(&self) -> &TextFn<N> {
        &self.fallbacks.text
    }

    pub(crate) fn break_renderer(&self) -> Option<&BreakFn<N>> {
        self.hard_break.as_ref()
    }

    /// Resolves a style renderer; the flag is true when a fallback was used.
    pub(crate) fn block_renderer(&self, style: &BlockStyle) -> (&BlockFn<N>, bool) {
        if let Some(render) = self.block.get(style) {
            return (render, false);
        }
        let normal = self
            .block
            .get(&BlockStyle::Normal)
            .unwrap_or(&self.fallbacks.block);
        (normal, *style != BlockStyle::Normal)
    }

    pub(crate) fn list_renderer(&self, kind: &ListKind) -> Option<&ListFn<N>> {
        self.list.get(kind)
    }

    pub(crate) fn fallback_list(&self) -> &ListFn<N> {
        &self.fallbacks.list
    }

    pub(crate) fn list_item_renderer(&self, kind: &ListKind) -> &ListItemFn<N> {
        self.list_item
            .get(kind)
            .unwrap_or(&self.fallbacks.list_item)
    }

    pub(crate) fn mark_renderer(&self, name: &str) -> Option<&MarkFn<N>> {
        self.marks.get(name)
    }

    pub(crate) fn fallback_mark(&self) -> &MarkFn<N> {
        &self.fallbacks.mark
    }

    pub(crate) fn type_renderer(&self, kind: &str) -> Option<&TypeFn<N>> {
        self.types.get(kind).or(self.fallbacks.unknown_type.as_ref())
    }

    pub(crate) fn has_type(&self, kind: &str) -> bool {
        self.types.contains_key(kind)
    }
}
