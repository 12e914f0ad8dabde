//! Asset references and URL resolution.
//!
//! The renderer never builds URLs itself. Image renderers receive the parsed
//! [`AssetRef`] and call an [`AssetResolver`] with the size they need.

use crate::error::AssetError;
use serde::{Deserialize, Serialize};

const DEFAULT_CDN_BASE: &str = "https://cdn.sanity.io";

/// A parsed image asset reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRef {
    /// A stored asset: `image-<id>-<W>x<H>-<format>`.
    Stored {
        /// Asset id.
        id: String,
        /// Original width in pixels.
        width: u32,
        /// Original height in pixels.
        height: u32,
        /// File extension (e.g. "jpg").
        format: String,
    },
    /// A direct URL.
    Url(String),
}

impl AssetRef {
    /// Parses a stored asset reference.
    ///
    /// ```
    /// use folio_core::AssetRef;
    ///
    /// let asset = AssetRef::parse_reference("image-Tb9Ew8CX-2000x3000-jpg").unwrap();
    /// assert_eq!(asset.dimensions(), Some((2000, 3000)));
    /// ```
    pub fn parse_reference(reference: &str) -> Result<Self, AssetError> {
        let malformed = || AssetError::MalformedReference(reference.to_string());

        let rest = reference.strip_prefix("image-").ok_or_else(malformed)?;
        let mut parts = rest.rsplitn(3, '-');
        let format = parts.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
        let dims = parts.next().ok_or_else(malformed)?;
        let id = parts.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;

        let (width, height) = dims.split_once('x').ok_or_else(malformed)?;
        let width = width.parse::<u32>().map_err(|_| malformed())?;
        let height = height.parse::<u32>().map_err(|_| malformed())?;

        Ok(Self::Stored {
            id: id.to_string(),
            width,
            height,
            format: format.to_string(),
        })
    }

    /// Original dimensions, when known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Self::Stored { width, height, .. } => Some((*width, *height)),
            Self::Url(_) => None,
        }
    }
}

/// Requested output size; unset sides keep the aspect ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageSize {
    /// Target width in pixels.
    pub width: Option<u32>,
    /// Target height in pixels.
    pub height: Option<u32>,
}

impl ImageSize {
    /// Requests a width only.
    pub fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            height: None,
        }
    }

    /// Adds a height.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    fn query(&self) -> String {
        let mut params = Vec::new();
        if let Some(w) = self.width {
            params.push(format!("w={}", w));
        }
        if let Some(h) = self.height {
            params.push(format!("h={}", h));
        }
        params.join("&")
    }
}

/// Turns asset references into fetchable URLs.
pub trait AssetResolver: Send + Sync {
    /// Returns a URL for `asset` scaled to `size`.
    fn resolve(&self, asset: &AssetRef, size: ImageSize) -> Result<String, AssetError>;
}

/// Identifies the content store project whose assets are resolved.
///
/// Client-only settings in the same JSON (API version, CDN flag) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Project identifier.
    pub project_id: String,
    /// Dataset name (e.g. "production").
    pub dataset: String,
}

impl StoreConfig {
    /// Creates a config for a project and dataset.
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }
}

/// Resolves stored assets against the image CDN.
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    base_url: String,
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    /// Creates a builder for the given store.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            base_url: DEFAULT_CDN_BASE.to_string(),
            project_id: config.project_id.clone(),
            dataset: config.dataset.clone(),
        }
    }

    /// Overrides the CDN origin.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl AssetResolver for ImageUrlBuilder {
    fn resolve(&self, asset: &AssetRef, size: ImageSize) -> Result<String, AssetError> {
        let mut url = match asset {
            AssetRef::Stored {
                id,
                width,
                height,
                format,
            } => format!(
                "{}/images/{}/{}/{}-{}x{}.{}",
                self.base_url, self.project_id, self.dataset, id, width, height, format
            ),
            AssetRef::Url(url) => url.clone(),
        };

        let query = size.query();
        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }
        Ok(url)
    }
}
