//! Canonical mark ordering and the inline mark tree.
//!
//! Marks on a span are applied in one fixed order, regardless of the order
//! they were stored in: annotations first (outermost, in `markDefs` order),
//! then the known decorators in [`DECORATOR_ORDER`], then unknown decorators
//! alphabetically. A link on bold text therefore always renders as the link
//! wrapping the bold element.
//!
//! Adjacent spans that share a leading run of marks share the wrapper nodes,
//! so a link spanning plain and bold text becomes a single link.

use crate::model::{Block, Inline, MarkDef, ObjectNode, Span};

/// Known decorators, outermost first.
pub const DECORATOR_ORDER: [&str; 5] = ["strong", "em", "code", "underline", "strike-through"];

/// A span mark resolved against the block's annotation table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedMark<'a> {
    /// A mark key that matches a `markDefs` entry.
    Annotation {
        /// The definition.
        def: &'a MarkDef,
        /// Position of the definition in `markDefs`.
        position: usize,
    },
    /// A plain decorator name.
    Decorator(&'a str),
}

impl<'a> ResolvedMark<'a> {
    /// Name used to look up the renderer: the annotation type or decorator name.
    pub fn name(&self) -> &'a str {
        match *self {
            ResolvedMark::Annotation { def, .. } => def.kind.as_str(),
            ResolvedMark::Decorator(name) => name,
        }
    }

    /// Annotation payload, if any.
    pub fn annotation(&self) -> Option<&'a MarkDef> {
        match *self {
            ResolvedMark::Annotation { def, .. } => Some(def),
            ResolvedMark::Decorator(_) => None,
        }
    }

    fn rank(&self) -> (u8, usize, &'a str) {
        match *self {
            ResolvedMark::Annotation { position, .. } => (0, position, ""),
            ResolvedMark::Decorator(name) => match DECORATOR_ORDER.iter().position(|d| *d == name) {
                Some(pos) => (1, pos, ""),
                None => (2, 0, name),
            },
        }
    }
}

/// Resolves and sorts a span's marks into canonical order, dropping duplicates.
pub fn resolve_marks<'a>(marks: &'a [String], defs: &'a [MarkDef]) -> Vec<ResolvedMark<'a>> {
    let mut resolved: Vec<ResolvedMark<'a>> = marks
        .iter()
        .map(|mark| match defs.iter().position(|def| def.key == *mark) {
            Some(position) => ResolvedMark::Annotation {
                def: &defs[position],
                position,
            },
            None => ResolvedMark::Decorator(mark.as_str()),
        })
        .collect();
    resolved.sort_by_key(ResolvedMark::rank);
    resolved.dedup();
    resolved
}

/// A node of the inline tree built for one block.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkNode<'a> {
    /// A text leaf.
    Text {
        /// Position of the span in the block's children.
        child: usize,
        /// The span.
        span: &'a Span,
        /// The span's text.
        text: &'a str,
    },
    /// An inline object leaf.
    Object {
        /// Position of the object in the block's children.
        child: usize,
        /// The object.
        node: &'a ObjectNode,
    },
    /// A mark wrapping its children.
    Mark {
        /// Position of the first span the mark covers.
        child: usize,
        /// The mark.
        mark: ResolvedMark<'a>,
        /// Wrapped content.
        children: Vec<MarkNode<'a>>,
    },
}

/// Inline tree of a block, plus the children that could not be used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkTree<'a> {
    /// Top-level inline nodes.
    pub roots: Vec<MarkNode<'a>>,
    /// Positions of malformed spans that were dropped.
    pub skipped: Vec<usize>,
}

struct OpenMark<'a> {
    child: usize,
    mark: ResolvedMark<'a>,
    children: Vec<MarkNode<'a>>,
}

/// Builds the inline tree for a block.
pub fn build_mark_tree(block: &Block) -> MarkTree<'_> {
    let mut tree = MarkTree::default();
    let mut open: Vec<OpenMark<'_>> = Vec::new();

    for (child, inline) in block.children.iter().enumerate() {
        match inline {
            Inline::Span(span) => {
                let Some(text) = span.text.as_deref() else {
                    tree.skipped.push(child);
                    continue;
                };
                let marks = resolve_marks(&span.marks, &block.mark_defs);
                let shared = open
                    .iter()
                    .zip(&marks)
                    .take_while(|(o, m)| o.mark == **m)
                    .count();
                while open.len() > shared {
                    close_mark(&mut open, &mut tree.roots);
                }
                for mark in marks.into_iter().skip(shared) {
                    open.push(OpenMark {
                        child,
                        mark,
                        children: Vec::new(),
                    });
                }
                push_leaf(&mut open, &mut tree.roots, MarkNode::Text { child, span, text });
            }
            Inline::Object(node) => {
                while !open.is_empty() {
                    close_mark(&mut open, &mut tree.roots);
                }
                tree.roots.push(MarkNode::Object { child, node });
            }
        }
    }

    while !open.is_empty() {
        close_mark(&mut open, &mut tree.roots);
    }
    tree
}

fn push_leaf<'a>(open: &mut [OpenMark<'a>], roots: &mut Vec<MarkNode<'a>>, node: MarkNode<'a>) {
    match open.last_mut() {
        Some(top) => top.children.push(node),
        None => roots.push(node),
    }
}

fn close_mark<'a>(open: &mut Vec<OpenMark<'a>>, roots: &mut Vec<MarkNode<'a>>) {
    if let Some(done) = open.pop() {
        let node = MarkNode::Mark {
            child: done.child,
            mark: done.mark,
            children: done.children,
        };
        push_leaf(open, roots, node);
    }
}
