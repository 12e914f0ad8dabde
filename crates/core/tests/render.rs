use folio_core::{
    AssetRef, Block, Document, Fallbacks, Image, Inline, MarkDef, Node, ObjectNode, RenderError,
    RenderWarning, RendererTable, Span, TypeValue, render, render_document, render_optional,
};
use serde_json::{Map, json};

/// Structural output so tests can assert on shape rather than markup.
#[derive(Debug, Clone, PartialEq)]
enum Out {
    Text(String),
    Block(String, Vec<Out>),
    List(String, u32, Vec<Out>),
    Item(usize, Vec<Out>),
    Mark(String, Option<String>, Vec<Out>),
    Image(String),
    Unknown(String),
    Break,
}

fn table() -> RendererTable<Out> {
    RendererTable::new(Fallbacks::new(
        |text| Out::Text(text.to_string()),
        |p| Ok(Out::Block("normal".to_string(), p.children)),
        |p| Ok(Out::List(format!("fallback:{}", p.kind), p.level, p.children)),
        |p| Ok(Out::Item(p.position, p.children)),
        |p| Ok(Out::Mark(format!("fallback:{}", p.name), None, p.children)),
    ))
    .block("h2", |p| Ok(Out::Block("h2".to_string(), p.children)))
    .block("blockquote", |p| {
        Ok(Out::Block("blockquote".to_string(), p.children))
    })
    .list("bullet", |p| Ok(Out::List("bullet".to_string(), p.level, p.children)))
    .list("number", |p| Ok(Out::List("number".to_string(), p.level, p.children)))
    .mark("strong", |p| Ok(Out::Mark("strong".to_string(), None, p.children)))
    .mark("em", |p| Ok(Out::Mark("em".to_string(), None, p.children)))
    .mark("link", |p| {
        let href = p.annotation.and_then(|def| def.href()).map(str::to_string);
        Ok(Out::Mark("link".to_string(), href, p.children))
    })
    .object("image", |p| match p.value {
        TypeValue::Image { asset, .. } => Ok(Out::Image(match asset {
            AssetRef::Stored { id, .. } => id.clone(),
            AssetRef::Url(url) => url.clone(),
        })),
        TypeValue::Object(_) => Err(RenderError::component("types.image", "not an image")),
    })
}

fn text(t: &str) -> Out {
    Out::Text(t.to_string())
}

fn para(t: &str) -> Node {
    Node::Block(Block::new("normal", vec![Span::new(t, &[])]))
}

fn item(kind: &str, t: &str) -> Node {
    Node::Block(Block::list_item(kind, 1, vec![Span::new(t, &[])]))
}

fn link_def(key: &str, href: &str) -> MarkDef {
    let mut fields = Map::new();
    fields.insert("href".to_string(), href.into());
    MarkDef {
        key: key.to_string(),
        kind: "link".to_string(),
        fields,
    }
}

#[test]
fn test_paragraphs_around_bullet_list() {
    let doc = vec![para("a"), item("bullet", "b"), item("bullet", "c"), para("d")];
    let out = render(&doc, &table()).unwrap();

    assert_eq!(
        out.nodes,
        vec![
            Out::Block("normal".to_string(), vec![text("a")]),
            Out::List(
                "bullet".to_string(),
                1,
                vec![Out::Item(0, vec![text("b")]), Out::Item(1, vec![text("c")])]
            ),
            Out::Block("normal".to_string(), vec![text("d")]),
        ]
    );
    assert!(!out.diagnostics.has_warnings());
}

#[test]
fn test_list_type_change_starts_new_list() {
    let doc = vec![item("bullet", "a"), item("number", "b")];
    let out = render(&doc, &table()).unwrap();

    assert_eq!(
        out.nodes,
        vec![
            Out::List("bullet".to_string(), 1, vec![Out::Item(0, vec![text("a")])]),
            Out::List("number".to_string(), 1, vec![Out::Item(0, vec![text("b")])]),
        ]
    );
}

#[test]
fn test_link_always_wraps_strong() {
    let expected = vec![Out::Block(
        "normal".to_string(),
        vec![Out::Mark(
            "link".to_string(),
            Some("https://x".to_string()),
            vec![Out::Mark("strong".to_string(), None, vec![text("go")])],
        )],
    )];

    for marks in [["strong", "k"], ["k", "strong"]] {
        let block = Block::new("normal", vec![Span::new("go", &marks)])
            .with_mark_def(link_def("k", "https://x"));
        let doc = vec![Node::Block(block)];
        let t = table();
        let first = render(&doc, &t).unwrap();
        let second = render(&doc, &t).unwrap();
        assert_eq!(first.nodes, expected);
        assert_eq!(first, second);
    }
}

#[test]
fn test_unknown_style_falls_back_to_normal() {
    let doc = vec![Node::Block(Block::new(
        "callout",
        vec![Span::new("careful", &[])],
    ))];
    let out = render(&doc, &table()).unwrap();

    assert_eq!(
        out.nodes,
        vec![Out::Block("normal".to_string(), vec![text("careful")])]
    );
    assert!(matches!(
        &out.diagnostics.warnings[..],
        [RenderWarning::FallbackStyle { style, .. }] if style == "callout"
    ));
}

#[test]
fn test_registered_normal_wins_over_fallback() {
    let t = table().block("normal", |p| Ok(Out::Block("custom".to_string(), p.children)));
    let doc = vec![Node::Block(Block::new("callout", vec![Span::new("x", &[])]))];
    let out = render(&doc, &t).unwrap();
    assert_eq!(
        out.nodes,
        vec![Out::Block("custom".to_string(), vec![text("x")])]
    );
}

#[test]
fn test_image_without_asset_is_skipped() {
    let doc = vec![
        para("before"),
        Node::Image(Image::default()),
        Node::Image(Image::from_reference("image-abc-10x10-png")),
        para("after"),
    ];
    let out = render(&doc, &table()).unwrap();

    assert_eq!(
        out.nodes,
        vec![
            Out::Block("normal".to_string(), vec![text("before")]),
            Out::Image("abc".to_string()),
            Out::Block("normal".to_string(), vec![text("after")]),
        ]
    );
    let skipped: Vec<_> = out.diagnostics.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].location().block, 1);
}

#[test]
fn test_image_with_bad_reference_is_skipped() {
    let doc = vec![Node::Image(Image::from_reference("not-a-ref")), para("x")];
    let out = render(&doc, &table()).unwrap();
    assert_eq!(out.nodes.len(), 1);
    assert_eq!(out.diagnostics.skipped().count(), 1);
}

#[test]
fn test_inline_image_is_validated_like_top_level() {
    let doc = vec![
        Node::from_value(json!({
            "_type": "block",
            "children": [
                {"_type": "span", "text": "see "},
                {"_type": "image", "asset": {"url": "https://x/a.png"}},
                {"_type": "image", "_key": "bare", "alt": "no asset"}
            ]
        }))
        .unwrap(),
        para("sibling"),
    ];
    let out = render(&doc, &table()).unwrap();

    assert_eq!(
        out.nodes,
        vec![
            Out::Block(
                "normal".to_string(),
                vec![text("see "), Out::Image("https://x/a.png".to_string())]
            ),
            Out::Block("normal".to_string(), vec![text("sibling")]),
        ]
    );
    let skipped: Vec<_> = out.diagnostics.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].location().block, 0);
    assert_eq!(skipped[0].location().child, Some(2));

    let t = table().object("image", |p| match p.value {
        TypeValue::Image { .. } => Ok(Out::Unknown(format!("inline={}", p.is_inline))),
        TypeValue::Object(_) => Err(RenderError::component("types.image", "not an image")),
    });
    let out = render(&doc[..1], &t).unwrap();
    assert_eq!(
        out.nodes,
        vec![Out::Block(
            "normal".to_string(),
            vec![text("see "), Out::Unknown("inline=true".to_string())]
        )]
    );
}

#[test]
fn test_span_without_text_is_skipped() {
    let mut block = Block::new("normal", vec![Span::new("a", &[]), Span::new("b", &[])]);
    block.children.insert(1, Inline::Span(Span::default()));
    let out = render(&[Node::Block(block)], &table()).unwrap();

    assert_eq!(
        out.nodes,
        vec![Out::Block("normal".to_string(), vec![text("a"), text("b")])]
    );
    assert_eq!(
        out.diagnostics.warnings[0].location().child,
        Some(1)
    );
}

#[test]
fn test_empty_and_absent_documents() {
    let out = render(&[], &table()).unwrap();
    assert!(out.nodes.is_empty());
    assert!(render_optional(None, &table()).unwrap().is_none());
}

#[test]
fn test_unknown_mark_uses_fallback() {
    let doc = vec![Node::Block(Block::new(
        "normal",
        vec![Span::new("hi", &["highlight"])],
    ))];
    let out = render(&doc, &table()).unwrap();
    assert_eq!(
        out.nodes,
        vec![Out::Block(
            "normal".to_string(),
            vec![Out::Mark("fallback:highlight".to_string(), None, vec![text("hi")])]
        )]
    );
    assert!(matches!(
        out.diagnostics.warnings[0],
        RenderWarning::UnknownMark { .. }
    ));
}

#[test]
fn test_unknown_list_kind_uses_fallback() {
    let doc = vec![item("check", "a")];
    let out = render(&doc, &table()).unwrap();
    assert_eq!(
        out.nodes,
        vec![Out::List(
            "fallback:check".to_string(),
            1,
            vec![Out::Item(0, vec![text("a")])]
        )]
    );
}

#[test]
fn test_unknown_type_skipped_unless_fallback() {
    let doc = vec![Node::Object(ObjectNode::new("codeBlock")), para("x")];

    let out = render(&doc, &table()).unwrap();
    assert_eq!(out.nodes.len(), 1);
    assert!(matches!(
        out.diagnostics.warnings[0],
        RenderWarning::UnknownType { .. }
    ));

    let t = RendererTable::new(
        Fallbacks::new(
            |text| Out::Text(text.to_string()),
            |p| Ok(Out::Block("normal".to_string(), p.children)),
            |p| Ok(Out::List(p.kind.to_string(), p.level, p.children)),
            |p| Ok(Out::Item(p.position, p.children)),
            |p| Ok(Out::Mark(p.name.to_string(), None, p.children)),
        )
        .with_unknown_type(|p| Ok(Out::Unknown(p.kind.to_string()))),
    );
    let out = render(&doc, &t).unwrap();
    assert_eq!(out.nodes[0], Out::Unknown("codeBlock".to_string()));
}

#[test]
fn test_nested_list_inside_item() {
    let doc = vec![
        item("bullet", "a"),
        Node::Block(Block::list_item("number", 2, vec![Span::new("a.1", &[])])),
        item("bullet", "b"),
    ];
    let out = render(&doc, &table()).unwrap();

    assert_eq!(
        out.nodes,
        vec![Out::List(
            "bullet".to_string(),
            1,
            vec![
                Out::Item(
                    0,
                    vec![
                        text("a"),
                        Out::List("number".to_string(), 2, vec![Out::Item(0, vec![text("a.1")])]),
                    ]
                ),
                Out::Item(1, vec![text("b")]),
            ]
        )]
    );
}

#[test]
fn test_styled_list_item_wraps_content() {
    let mut block = Block::list_item("bullet", 1, vec![Span::new("Title", &[])]);
    block.style = "h2".into();
    let out = render(&[Node::Block(block)], &table()).unwrap();

    assert_eq!(
        out.nodes,
        vec![Out::List(
            "bullet".to_string(),
            1,
            vec![Out::Item(
                0,
                vec![Out::Block("h2".to_string(), vec![text("Title")])]
            )]
        )]
    );
}

#[test]
fn test_hard_breaks() {
    let t = table().hard_break(|| Out::Break);
    let doc = vec![para("one\ntwo")];
    let out = render(&doc, &t).unwrap();
    assert_eq!(
        out.nodes,
        vec![Out::Block(
            "normal".to_string(),
            vec![text("one"), Out::Break, text("two")]
        )]
    );

    let out = render(&doc, &table()).unwrap();
    assert_eq!(
        out.nodes,
        vec![Out::Block("normal".to_string(), vec![text("one\ntwo")])]
    );
}

#[test]
fn test_inline_object_dispatch() {
    let t = table().object("break", |p| {
        assert!(p.is_inline);
        Ok(Out::Break)
    });
    let mut block = Block::new("normal", vec![Span::new("a", &[]), Span::new("b", &[])]);
    block.children.insert(1, Inline::Object(ObjectNode::new("break")));
    let out = render(&[Node::Block(block)], &t).unwrap();
    assert_eq!(
        out.nodes,
        vec![Out::Block(
            "normal".to_string(),
            vec![text("a"), Out::Break, text("b")]
        )]
    );
}

#[test]
fn test_component_errors_propagate() {
    let t = table().block("h2", |_| Err(RenderError::component("block.h2", "boom")));
    let doc = vec![para("ok"), Node::Block(Block::new("h2", vec![Span::new("x", &[])]))];
    let err = render(&doc, &t).unwrap_err();
    assert!(matches!(err, RenderError::Component { .. }));
}

#[test]
fn test_render_document_from_json() {
    let value = json!([
        {"_type": "block", "_key": "1", "style": "h2", "children": [{"_type": "span", "text": "About"}]},
        {"_type": "image", "_key": "2"},
        {"text": "untyped"},
        {"_type": "block", "_key": "3", "listItem": "bullet", "level": 1,
         "children": [{"_type": "span", "text": "Rust"}]},
        {"_type": "block", "_key": "4", "listItem": "bullet", "level": 1,
         "children": [{"_type": "span", "text": "Go"}]}
    ]);
    let doc = Document::from_value(value).unwrap().unwrap();
    let out = render_document(&doc, &table()).unwrap();

    assert_eq!(
        out.nodes,
        vec![
            Out::Block("h2".to_string(), vec![text("About")]),
            Out::List(
                "bullet".to_string(),
                1,
                vec![Out::Item(0, vec![text("Rust")]), Out::Item(1, vec![text("Go")])]
            ),
        ]
    );
    // One entry rejected while decoding, one image skipped while rendering.
    assert_eq!(out.diagnostics.skipped().count(), 2);
}

#[test]
fn test_table_is_shareable_across_threads() {
    let t = std::sync::Arc::new(table());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let t = std::sync::Arc::clone(&t);
            std::thread::spawn(move || {
                let doc = vec![para(&i.to_string())];
                render(&doc, &t).map(|out| out.nodes.len())
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 1);
    }
}
