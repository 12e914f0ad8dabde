//! Default HTML components.
//!
//! Each entry renders to an HTML string. Text is escaped at the leaves, so
//! container renderers only concatenate their already-safe children.

use crate::options::HtmlOptions;
use crate::uri::is_safe_uri;
use folio_core::{
    AssetRef, AssetResolver, BlockStyle, Fallbacks, ImageSize, ListKind, MarkDef, RenderError,
    RendererTable, TypeProps, TypeValue,
};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::collections::HashMap;
use std::sync::Arc;

const BLOCK_TAGS: [(BlockStyle, &str); 8] = [
    (BlockStyle::Normal, "p"),
    (BlockStyle::H1, "h1"),
    (BlockStyle::H2, "h2"),
    (BlockStyle::H3, "h3"),
    (BlockStyle::H4, "h4"),
    (BlockStyle::H5, "h5"),
    (BlockStyle::H6, "h6"),
    (BlockStyle::Blockquote, "blockquote"),
];

const DECORATOR_TAGS: [(&str, &str); 5] = [
    ("strong", "strong"),
    ("em", "em"),
    ("code", "code"),
    ("underline", "u"),
    ("strike-through", "del"),
];

/// Heading slugs for one document, keyed by node position.
pub(crate) type HeadingSlugs = HashMap<usize, String>;

/// Builds the default HTML renderer table.
pub(crate) fn html_table(
    options: &HtmlOptions,
    resolver: Option<Arc<dyn AssetResolver>>,
    slugs: Arc<HeadingSlugs>,
) -> RendererTable<String> {
    let paragraph_class = options.class_attr("block.normal");
    let list_class = options.class_attr("list.bullet");
    let item_class = options.class_attr("listItem.bullet");

    let fallbacks = Fallbacks::new(
        |text| encode_text(text).into_owned(),
        move |p| Ok(format!("<p{paragraph_class}>{}</p>", p.children.concat())),
        move |p| Ok(format!("<ul{list_class}>{}</ul>", p.children.concat())),
        move |p| Ok(format!("<li{item_class}>{}</li>", p.children.concat())),
        |p| {
            Ok(format!(
                "<span data-mark=\"{}\">{}</span>",
                encode_double_quoted_attribute(p.name),
                p.children.concat()
            ))
        },
    );
    let mut table = RendererTable::new(fallbacks);

    for (style, tag) in BLOCK_TAGS {
        let class = options.class_attr(&format!("block.{}", style));
        let with_id = options.heading_ids && style.heading_depth().is_some();
        let slugs = Arc::clone(&slugs);
        table = table.block(style, move |p| {
            let id = match slugs.get(&p.index) {
                Some(slug) if with_id => {
                    format!(" id=\"{}\"", encode_double_quoted_attribute(slug))
                }
                _ => String::new(),
            };
            Ok(format!("<{tag}{id}{class}>{}</{tag}>", p.children.concat()))
        });
    }

    for (kind, tag) in [(ListKind::Bullet, "ul"), (ListKind::Number, "ol")] {
        let class = options.class_attr(&format!("list.{}", kind));
        let item_class = options.class_attr(&format!("listItem.{}", kind));
        table = table
            .list(kind.clone(), move |p| {
                Ok(format!("<{tag}{class}>{}</{tag}>", p.children.concat()))
            })
            .list_item(kind, move |p| {
                Ok(format!("<li{item_class}>{}</li>", p.children.concat()))
            });
    }

    for (name, tag) in DECORATOR_TAGS {
        let class = options.class_attr(&format!("mark.{}", name));
        table = table.mark(name, move |p| {
            Ok(format!("<{tag}{class}>{}</{tag}>", p.children.concat()))
        });
    }

    let link_class = options.class_attr("mark.link");
    let target = if options.link_target_blank {
        " target=\"_blank\" rel=\"noopener noreferrer\""
    } else {
        ""
    };
    table = table.mark("link", move |p| {
        let children = p.children.concat();
        match p.annotation.and_then(MarkDef::href) {
            Some(href) if is_safe_uri(href) => Ok(format!(
                "<a href=\"{}\"{target}{link_class}>{children}</a>",
                encode_double_quoted_attribute(href.trim())
            )),
            Some(href) => {
                log::warn!("Dropping link with unsafe target: {}", href);
                Ok(children)
            }
            None => {
                log::debug!("Link annotation without href, rendering text only");
                Ok(children)
            }
        }
    });

    let image = ImageComponent {
        resolver,
        width: options.image_width,
        height: options.image_height,
        lazy: options.lazy_images,
        default_alt: options.default_alt.clone(),
        figure_class: options.class_attr("image"),
        caption_class: options.class_attr("caption"),
    };
    table = table
        .object("image", move |p| image.render(p))
        .object("break", |_| Ok("<br />".to_string()));

    if options.hard_breaks {
        table = table.hard_break(|| "<br />".to_string());
    }
    table
}

struct ImageComponent {
    resolver: Option<Arc<dyn AssetResolver>>,
    width: u32,
    height: Option<u32>,
    lazy: bool,
    default_alt: String,
    figure_class: String,
    caption_class: String,
}

impl ImageComponent {
    fn render(&self, props: TypeProps<'_>) -> Result<String, RenderError> {
        let TypeValue::Image { image, asset } = props.value else {
            return Err(RenderError::component(
                "types.image",
                "expected an image node",
            ));
        };

        let size = match self.height {
            Some(height) => ImageSize::width(self.width).with_height(height),
            None => ImageSize::width(self.width),
        };
        let src = match (&self.resolver, asset) {
            (Some(resolver), asset) => resolver.resolve(asset, size)?,
            (None, AssetRef::Url(url)) => url.clone(),
            (None, AssetRef::Stored { .. }) => {
                return Err(RenderError::component(
                    "types.image",
                    "stored asset needs an asset resolver",
                ));
            }
        };
        let height = self.height.or_else(|| self.scaled_height(asset));
        let alt = image
            .alt
            .as_deref()
            .filter(|alt| !alt.is_empty())
            .unwrap_or(self.default_alt.as_str());

        let mut img = format!(
            "<img src=\"{}\" alt=\"{}\" width=\"{}\"",
            encode_double_quoted_attribute(&src),
            encode_double_quoted_attribute(alt),
            self.width
        );
        if let Some(height) = height {
            img.push_str(&format!(" height=\"{}\"", height));
        }
        if self.lazy {
            img.push_str(" loading=\"lazy\"");
        }
        img.push_str(" />");

        // Inside a paragraph only phrasing content is allowed.
        if props.is_inline {
            return Ok(img);
        }
        let mut html = format!("<figure{}>{}", self.figure_class, img);
        if let Some(caption) = image.caption.as_deref().filter(|c| !c.is_empty()) {
            html.push_str(&format!(
                "<figcaption{}>{}</figcaption>",
                self.caption_class,
                encode_text(caption)
            ));
        }
        html.push_str("</figure>");
        Ok(html)
    }

    /// Height matching the asset's aspect ratio at the configured width.
    fn scaled_height(&self, asset: &AssetRef) -> Option<u32> {
        let (w, h) = asset.dimensions().filter(|(w, _)| *w > 0)?;
        let scaled = (u64::from(h) * u64::from(self.width) + u64::from(w) / 2) / u64::from(w);
        u32::try_from(scaled).ok()
    }
}
