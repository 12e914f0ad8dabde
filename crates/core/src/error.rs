use thiserror::Error;

/// Location of a node inside a document, used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath {
    /// Position of the top-level node in the document.
    pub block: usize,
    /// The node's `_key`, when it has one.
    pub key: Option<String>,
    /// Position of an inline child within the block.
    pub child: Option<usize>,
}

impl NodePath {
    /// Create a path pointing at a top-level node
    pub fn block(block: usize, key: Option<&str>) -> Self {
        Self {
            block,
            key: key.map(str::to_string),
            child: None,
        }
    }

    /// Create a path pointing at an inline child of this node
    pub fn child(&self, child: usize) -> Self {
        Self {
            block: self.block,
            key: self.key.clone(),
            child: Some(child),
        }
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "blocks[{}]", self.block)?;
        if let Some(child) = self.child {
            write!(f, ".children[{}]", child)?;
        }
        if let Some(key) = &self.key {
            write!(f, " ({})", key)?;
        }
        Ok(())
    }
}

/// Errors that abort a render pass.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A caller-supplied render function failed.
    #[error("{context} renderer failed: {message}")]
    Component {
        /// Which table entry failed (e.g. "types.image").
        context: String,
        /// Error message
        message: String,
    },
    /// An asset could not be resolved to a URL.
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),
    /// The document itself has the wrong shape.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// The document is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    /// Create a component error for a named table entry
    pub fn component(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Component {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an invalid document error
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument(message.into())
    }
}

/// Errors raised while turning an asset reference into a URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// The `_ref` does not follow `image-<id>-<W>x<H>-<format>`.
    #[error("malformed asset reference `{0}`")]
    MalformedReference(String),
    /// The asset carries neither `_ref` nor `url`.
    #[error("asset has neither a reference nor a url")]
    MissingSource,
}

/// Non-fatal events recorded during a render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderWarning {
    /// A malformed node was dropped; its siblings were rendered.
    SkippedNode {
        /// Where the node was
        location: NodePath,
        /// Why it was dropped
        reason: String,
    },
    /// A block style had no renderer and fell back to `normal`.
    FallbackStyle {
        /// Where the block was
        location: NodePath,
        /// The unrecognized style tag
        style: String,
    },
    /// A list type had no renderer and used the fallback list.
    UnknownListKind {
        /// Location of the first item of the list
        location: NodePath,
        /// The unrecognized list tag
        kind: String,
    },
    /// A mark had no renderer and used the fallback mark.
    UnknownMark {
        /// Where the span was
        location: NodePath,
        /// The decorator name or annotation type
        mark: String,
    },
    /// An object type had no renderer.
    UnknownType {
        /// Where the object was
        location: NodePath,
        /// The object's `_type`
        kind: String,
    },
}

impl RenderWarning {
    /// Get the location of this warning
    pub fn location(&self) -> &NodePath {
        match self {
            RenderWarning::SkippedNode { location, .. }
            | RenderWarning::FallbackStyle { location, .. }
            | RenderWarning::UnknownListKind { location, .. }
            | RenderWarning::UnknownMark { location, .. }
            | RenderWarning::UnknownType { location, .. } => location,
        }
    }

    /// Returns true if this warning records a dropped node.
    pub fn is_skip(&self) -> bool {
        matches!(self, RenderWarning::SkippedNode { .. })
    }
}

impl std::fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderWarning::SkippedNode { location, reason } => {
                write!(f, "{}: skipped malformed node: {}", location, reason)
            }
            RenderWarning::FallbackStyle { location, style } => {
                write!(f, "{}: unknown block style '{}', rendered as normal", location, style)
            }
            RenderWarning::UnknownListKind { location, kind } => {
                write!(f, "{}: unknown list type '{}'", location, kind)
            }
            RenderWarning::UnknownMark { location, mark } => {
                write!(f, "{}: unknown mark '{}'", location, mark)
            }
            RenderWarning::UnknownType { location, kind } => {
                write!(f, "{}: no renderer for type '{}'", location, kind)
            }
        }
    }
}

/// Collection of warnings produced by a render pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderDiagnostics {
    /// Warnings in document order
    pub warnings: Vec<RenderWarning>,
}

impl RenderDiagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning, logging it at the matching level
    pub fn add(&mut self, warning: RenderWarning) {
        if warning.is_skip() {
            log::warn!("{}", warning);
        } else {
            log::debug!("{}", warning);
        }
        self.warnings.push(warning);
    }

    /// Append every warning from `other`
    pub fn extend(&mut self, other: &RenderDiagnostics) {
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Iterate over the nodes that were dropped
    pub fn skipped(&self) -> impl Iterator<Item = &RenderWarning> {
        self.warnings.iter().filter(|w| w.is_skip())
    }

    /// Get total count of all warnings
    pub fn count(&self) -> usize {
        self.warnings.len()
    }
}
