//! Grouping of flat list-item blocks into list containers.
//!
//! The content store keeps list items as ordinary blocks in the document
//! sequence. Before dispatch, consecutive items are collected into lists:
//! same type and level continue the open list, a deeper level opens a list
//! nested under the previous item, and anything else closes it.

use crate::model::{Block, ListKind, Node};

/// A top-level entry after grouping.
#[derive(Debug, Clone, PartialEq)]
pub enum Grouped<'a> {
    /// A node that is not a list item.
    Node {
        /// Position in the source document.
        index: usize,
        /// The node itself.
        node: &'a Node,
    },
    /// A run of list items.
    List(ListGroup<'a>),
}

/// A list container and its items.
#[derive(Debug, Clone, PartialEq)]
pub struct ListGroup<'a> {
    /// List type shared by every item.
    pub kind: &'a ListKind,
    /// Nesting depth shared by every item.
    pub level: u32,
    /// Items in order.
    pub items: Vec<ListEntry<'a>>,
}

/// One list item plus any lists nested under it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry<'a> {
    /// Position in the source document.
    pub index: usize,
    /// The item node.
    pub node: &'a Node,
    /// The item's block.
    pub block: &'a Block,
    /// Deeper lists that follow this item.
    pub sublists: Vec<ListGroup<'a>>,
}

impl ListGroup<'_> {
    /// Location of the first item, for diagnostics.
    pub fn first_index(&self) -> Option<usize> {
        self.items.first().map(|item| item.index)
    }
}

/// Groups a document's nodes.
pub fn group_nodes(nodes: &[Node]) -> Vec<Grouped<'_>> {
    group_indexed(nodes.iter().enumerate())
}

/// Groups `(index, node)` pairs, preserving the given indices.
pub fn group_indexed<'a, I>(nodes: I) -> Vec<Grouped<'a>>
where
    I: IntoIterator<Item = (usize, &'a Node)>,
{
    let mut out = Vec::new();
    let mut open: Vec<ListGroup<'a>> = Vec::new();

    for (index, node) in nodes {
        let Some((block, kind)) = node.as_list_item() else {
            close_all(&mut open, &mut out);
            out.push(Grouped::Node { index, node });
            continue;
        };
        let level = block.list_level();

        while open.last().is_some_and(|top| top.level > level) {
            close_top(&mut open, &mut out);
        }

        let continues = open
            .last()
            .is_some_and(|top| top.level == level && top.kind == kind);
        if !continues {
            // Same depth, different type: the old list ends here.
            if open.last().is_some_and(|top| top.level == level) {
                close_top(&mut open, &mut out);
            }
            open.push(ListGroup {
                kind,
                level,
                items: Vec::new(),
            });
        }

        if let Some(top) = open.last_mut() {
            top.items.push(ListEntry {
                index,
                node,
                block,
                sublists: Vec::new(),
            });
        }
    }

    close_all(&mut open, &mut out);
    out
}

fn close_top<'a>(open: &mut Vec<ListGroup<'a>>, out: &mut Vec<Grouped<'a>>) {
    let Some(done) = open.pop() else {
        return;
    };
    match open.last_mut().and_then(|parent| parent.items.last_mut()) {
        Some(parent_item) => parent_item.sublists.push(done),
        None => out.push(Grouped::List(done)),
    }
}

fn close_all<'a>(open: &mut Vec<ListGroup<'a>>, out: &mut Vec<Grouped<'a>>) {
    while !open.is_empty() {
        close_top(open, out);
    }
}

/// Flattens grouped output back into document order.
pub fn flatten<'a>(grouped: &[Grouped<'a>]) -> Vec<(usize, &'a Node)> {
    let mut out = Vec::new();
    for entry in grouped {
        match entry {
            Grouped::Node { index, node } => out.push((*index, *node)),
            Grouped::List(list) => flatten_list(list, &mut out),
        }
    }
    out
}

fn flatten_list<'a>(list: &ListGroup<'a>, out: &mut Vec<(usize, &'a Node)>) {
    for item in &list.items {
        out.push((item.index, item.node));
        for sub in &item.sublists {
            flatten_list(sub, out);
        }
    }
}
