//! State for a single render pass.

use super::table::{
    BlockProps, ListItemProps, ListProps, MarkProps, RendererTable, TypeProps, TypeValue,
};
use crate::error::{NodePath, RenderDiagnostics, RenderError, RenderWarning};
use crate::group::{Grouped, ListEntry, ListGroup};
use crate::marks::{MarkNode, build_mark_tree};
use crate::model::{Block, BlockStyle, Image, Node, ObjectNode};

/// Walks grouped nodes and dispatches them through the table.
///
/// Holds nothing but the table reference and the warnings of this pass.
pub struct Context<'t, N> {
    table: &'t RendererTable<N>,
    /// Warnings collected so far.
    pub diagnostics: RenderDiagnostics,
}

impl<'t, N> Context<'t, N> {
    /// Creates a context for one pass over a document.
    pub fn new(table: &'t RendererTable<N>) -> Self {
        Self {
            table,
            diagnostics: RenderDiagnostics::new(),
        }
    }

    /// Renders one top-level entry; `None` means the entry was dropped.
    pub fn render_grouped(&mut self, entry: &Grouped<'_>) -> Result<Option<N>, RenderError> {
        match entry {
            Grouped::List(list) => self.render_list(list).map(Some),
            Grouped::Node { index, node } => match node {
                Node::Block(block) => self.render_block(*index, block).map(Some),
                Node::Image(image) => {
                    let location = NodePath::block(*index, image.key.as_deref());
                    self.render_image(*index, location, image, false)
                }
                Node::Object(object) => {
                    let location = NodePath::block(*index, object.key.as_deref());
                    self.render_object(*index, location, object, false)
                }
            },
        }
    }

    fn render_block(&mut self, index: usize, block: &Block) -> Result<N, RenderError> {
        let children = self.render_inline(index, block)?;
        self.apply_style(index, block, children)
    }

    /// Wraps rendered inline content with the block's style renderer.
    fn apply_style(
        &mut self,
        index: usize,
        block: &Block,
        children: Vec<N>,
    ) -> Result<N, RenderError> {
        let table = self.table;
        let (render, fell_back) = table.block_renderer(&block.style);
        if fell_back {
            self.diagnostics.add(RenderWarning::FallbackStyle {
                location: NodePath::block(index, block.key.as_deref()),
                style: block.style.to_string(),
            });
        }
        render(BlockProps {
            block,
            index,
            children,
        })
    }

    fn render_list(&mut self, list: &ListGroup<'_>) -> Result<N, RenderError> {
        let table = self.table;
        let mut children = Vec::with_capacity(list.items.len());
        for (position, item) in list.items.iter().enumerate() {
            children.push(self.render_list_item(list, item, position)?);
        }

        let render = match table.list_renderer(list.kind) {
            Some(render) => render,
            None => {
                let first = list.items.first();
                self.diagnostics.add(RenderWarning::UnknownListKind {
                    location: NodePath::block(
                        list.first_index().unwrap_or_default(),
                        first.and_then(|item| item.block.key.as_deref()),
                    ),
                    kind: list.kind.to_string(),
                });
                table.fallback_list()
            }
        };
        render(ListProps {
            kind: list.kind,
            level: list.level,
            children,
        })
    }

    fn render_list_item(
        &mut self,
        list: &ListGroup<'_>,
        item: &ListEntry<'_>,
        position: usize,
    ) -> Result<N, RenderError> {
        let table = self.table;
        let block = item.block;
        let inline = self.render_inline(item.index, block)?;

        let mut children = if block.style == BlockStyle::Normal {
            inline
        } else {
            vec![self.apply_style(item.index, block, inline)?]
        };
        for sub in &item.sublists {
            children.push(self.render_list(sub)?);
        }

        let render = table.list_item_renderer(list.kind);
        render(ListItemProps {
            block,
            kind: list.kind,
            index: item.index,
            position,
            children,
        })
    }

    fn render_inline(&mut self, index: usize, block: &Block) -> Result<Vec<N>, RenderError> {
        let location = NodePath::block(index, block.key.as_deref());
        let tree = build_mark_tree(block);
        for child in &tree.skipped {
            self.diagnostics.add(RenderWarning::SkippedNode {
                location: location.child(*child),
                reason: "span has no text".to_string(),
            });
        }

        let mut out = Vec::with_capacity(tree.roots.len());
        for node in &tree.roots {
            self.render_mark_node(index, &location, node, &mut out)?;
        }
        Ok(out)
    }

    fn render_mark_node(
        &mut self,
        index: usize,
        location: &NodePath,
        node: &MarkNode<'_>,
        out: &mut Vec<N>,
    ) -> Result<(), RenderError> {
        let table = self.table;
        match node {
            MarkNode::Text { text, .. } => self.push_text(text, out),
            MarkNode::Object { child, node } => {
                if let Some(rendered) =
                    self.render_object(index, location.child(*child), node, true)?
                {
                    out.push(rendered);
                }
            }
            MarkNode::Mark {
                child,
                mark,
                children,
            } => {
                let mut inner = Vec::with_capacity(children.len());
                for child_node in children {
                    self.render_mark_node(index, location, child_node, &mut inner)?;
                }
                let name = mark.name();
                let render = match table.mark_renderer(name) {
                    Some(render) => render,
                    None => {
                        self.diagnostics.add(RenderWarning::UnknownMark {
                            location: location.child(*child),
                            mark: name.to_string(),
                        });
                        table.fallback_mark()
                    }
                };
                out.push(render(MarkProps {
                    name,
                    annotation: mark.annotation(),
                    children: inner,
                })?);
            }
        }
        Ok(())
    }

    fn push_text(&self, text: &str, out: &mut Vec<N>) {
        let render_text = self.table.text();
        let Some(render_break) = self.table.break_renderer() else {
            out.push(render_text(text));
            return;
        };
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                out.push(render_break());
            }
            if !line.is_empty() {
                out.push(render_text(line));
            }
        }
    }

    fn render_image(
        &mut self,
        index: usize,
        location: NodePath,
        image: &Image,
        is_inline: bool,
    ) -> Result<Option<N>, RenderError> {
        let asset = match image.asset_ref() {
            Ok(asset) => asset,
            Err(err) => {
                self.diagnostics.add(RenderWarning::SkippedNode {
                    location,
                    reason: err.to_string(),
                });
                return Ok(None);
            }
        };
        let props = TypeProps {
            kind: "image",
            value: TypeValue::Image {
                image,
                asset: &asset,
            },
            is_inline,
            index,
        };
        self.dispatch_type(location, props)
    }

    fn render_object(
        &mut self,
        index: usize,
        location: NodePath,
        object: &ObjectNode,
        is_inline: bool,
    ) -> Result<Option<N>, RenderError> {
        if object.kind == "image" {
            return match object.to_image() {
                Ok(image) => self.render_image(index, location, &image, is_inline),
                Err(err) => {
                    self.diagnostics.add(RenderWarning::SkippedNode {
                        location,
                        reason: err.to_string(),
                    });
                    Ok(None)
                }
            };
        }
        let props = TypeProps {
            kind: &object.kind,
            value: TypeValue::Object(object),
            is_inline,
            index,
        };
        self.dispatch_type(location, props)
    }

    fn dispatch_type(
        &mut self,
        location: NodePath,
        props: TypeProps<'_>,
    ) -> Result<Option<N>, RenderError> {
        let table = self.table;
        if !table.has_type(props.kind) {
            self.diagnostics.add(RenderWarning::UnknownType {
                location,
                kind: props.kind.to_string(),
            });
        }
        match table.type_renderer(props.kind) {
            Some(render) => render(props).map(Some),
            None => Ok(None),
        }
    }
}
