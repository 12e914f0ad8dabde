//! HTML rendering options.

use folio_core::RenderError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_true() -> bool {
    true
}

fn default_image_width() -> u32 {
    800
}

/// Options for the HTML backend, usually loaded from JSON.
///
/// Class names are keyed by slot: `block.<style>`, `list.<type>`,
/// `listItem.<type>`, `mark.<name>`, `image` and `caption`.
///
/// ```
/// use folio_html::HtmlOptions;
///
/// let options = HtmlOptions::from_json(
///     r#"{"classNames": {"block.normal": "mb-4"}, "lazyImages": true}"#,
/// ).unwrap();
/// assert_eq!(options.class_for("block.normal"), Some("mb-4"));
/// assert_eq!(options.image_width, 800);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlOptions {
    /// CSS classes per slot.
    #[serde(default)]
    pub class_names: HashMap<String, String>,
    /// Whether links open in a new tab.
    #[serde(default = "default_true")]
    pub link_target_blank: bool,
    /// Requested image width in pixels.
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    /// Fixed image height; derived from the asset's aspect ratio when unset.
    #[serde(default)]
    pub image_height: Option<u32>,
    /// Whether to add loading="lazy" to images.
    #[serde(default)]
    pub lazy_images: bool,
    /// Whether headings get slug `id` attributes.
    #[serde(default)]
    pub heading_ids: bool,
    /// Whether `\n` inside text becomes `<br />`.
    #[serde(default = "default_true")]
    pub hard_breaks: bool,
    /// Alt text for images that have none.
    #[serde(default)]
    pub default_alt: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            class_names: HashMap::new(),
            link_target_blank: default_true(),
            image_width: default_image_width(),
            image_height: None,
            lazy_images: false,
            heading_ids: false,
            hard_breaks: default_true(),
            default_alt: String::new(),
        }
    }
}

impl HtmlOptions {
    /// Parses options from JSON.
    pub fn from_json(input: &str) -> Result<Self, RenderError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Sets the class for a slot.
    pub fn with_class(mut self, slot: impl Into<String>, class: impl Into<String>) -> Self {
        self.class_names.insert(slot.into(), class.into());
        self
    }

    /// Returns the class configured for a slot.
    pub fn class_for(&self, slot: &str) -> Option<&str> {
        self.class_names
            .get(slot)
            .map(String::as_str)
            .filter(|class| !class.is_empty())
    }

    /// Returns ` class="..."` for a slot, or an empty string.
    pub(crate) fn class_attr(&self, slot: &str) -> String {
        match self.class_for(slot) {
            Some(class) => format!(
                " class=\"{}\"",
                html_escape::encode_double_quoted_attribute(class)
            ),
            None => String::new(),
        }
    }
}
