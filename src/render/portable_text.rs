//! Rich-text renderer
//!
//! Walks a list of blocks and maps each one through a fixed dispatch table:
//! text styles, list kinds and marks on the text axis, images and code on
//! the object axis. Unknown kinds are logged and skipped.

use super::highlight::Highlighter;
use super::image::ImageUrlBuilder;
use super::markup::{self, Element, Node};
use crate::content::{Block, BlockStyle, CodeBlock, ImageRef, Inline, ListKind, Mark, TextBlock};

/// Layout variant; only spacing differs between modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    Default,
    Compact,
}

/// Class names applied per element kind
struct Spacing {
    paragraph: &'static str,
    headings: [&'static str; 6],
    quote: &'static str,
    list: &'static str,
    list_item: &'static str,
    figure: &'static str,
    code: &'static str,
}

const DEFAULT_SPACING: Spacing = Spacing {
    paragraph: "mb-10 leading-relaxed text-lg",
    headings: [
        "text-4xl font-bold mb-6",
        "text-3xl font-bold mb-5 mt-10",
        "text-2xl font-bold mb-6 mt-12",
        "text-xl font-bold mb-4 mt-6",
        "text-lg font-bold mb-4 mt-6",
        "text-base font-bold mb-4 mt-6",
    ],
    quote: "border-l-4 pl-6 py-2 my-10 italic",
    list: "mb-10 space-y-3 ml-4",
    list_item: "mb-2",
    figure: "my-8",
    code: "my-6",
};

const COMPACT_SPACING: Spacing = Spacing {
    paragraph: "mb-4 leading-normal",
    headings: [
        "text-2xl font-bold mb-3",
        "text-xl font-bold mb-3 mt-6",
        "text-lg font-bold mb-2 mt-4",
        "text-base font-bold mb-2 mt-4",
        "text-base font-semibold mb-2 mt-3",
        "text-sm font-semibold mb-2 mt-3",
    ],
    quote: "border-l-4 pl-4 py-1 my-4 italic",
    list: "mb-4 space-y-1 ml-4",
    list_item: "mb-1",
    figure: "my-4",
    code: "my-3",
};

impl DisplayMode {
    fn spacing(self) -> &'static Spacing {
        match self {
            DisplayMode::Default => &DEFAULT_SPACING,
            DisplayMode::Compact => &COMPACT_SPACING,
        }
    }
}

/// Renders rich-text bodies to markup
#[derive(Debug, Clone)]
pub struct PortableTextRenderer {
    highlighter: Highlighter,
    images: ImageUrlBuilder,
}

impl PortableTextRenderer {
    pub fn new(highlighter: Highlighter, images: ImageUrlBuilder) -> Self {
        Self {
            highlighter,
            images,
        }
    }

    /// Render a body to HTML
    pub fn render_html(&self, blocks: &[Block], mode: DisplayMode) -> String {
        markup::to_html(&self.render(blocks, mode))
    }

    /// Render a body to a markup tree
    pub fn render(&self, blocks: &[Block], mode: DisplayMode) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut i = 0;

        while i < blocks.len() {
            match &blocks[i] {
                Block::Text(text) if text.list_item.is_some() => {
                    // Gather the run of consecutive list items
                    let mut items = Vec::new();
                    while let Some(Block::Text(item)) = blocks.get(i) {
                        if item.list_item.is_none() {
                            break;
                        }
                        items.push(item);
                        i += 1;
                    }
                    nodes.extend(self.render_list(&items, mode));
                    continue;
                }
                Block::Text(text) => nodes.push(self.render_text_block(text, mode)),
                Block::Image(image) => nodes.extend(self.render_image(image, mode)),
                Block::Code(code) => nodes.extend(self.render_code(code, mode)),
                Block::Unknown { kind } => {
                    tracing::warn!("Skipping block with unknown type {:?}", kind);
                }
                Block::Invalid { kind, error } => {
                    tracing::warn!("Skipping malformed {:?} block: {}", kind, error);
                }
            }
            i += 1;
        }

        nodes
    }

    fn render_text_block(&self, block: &TextBlock, mode: DisplayMode) -> Node {
        let spacing = mode.spacing();
        let children = self.render_spans(block);

        let element = match &block.style {
            BlockStyle::Normal => Element::new("p").class(spacing.paragraph),
            BlockStyle::Heading(level) => {
                let idx = usize::from((*level).clamp(1, 6) - 1);
                Element::new(HEADING_TAGS[idx])
                    .attr("id", slug::slugify(block.plain_text()))
                    .class(spacing.headings[idx])
            }
            BlockStyle::Blockquote => Element::new("blockquote").class(spacing.quote),
            BlockStyle::Other(style) => {
                tracing::warn!("Unknown block style {:?}, rendering as paragraph", style);
                Element::new("p").class(spacing.paragraph)
            }
        };

        element.children(children).into()
    }

    /// Render a run of list items, nesting deeper levels under the previous item
    fn render_list(&self, items: &[&TextBlock], mode: DisplayMode) -> Vec<Node> {
        let spacing = mode.spacing();
        let mut lists = Vec::new();
        let mut i = 0;

        while i < items.len() {
            let level = items[i].list_level();
            let kind = list_kind(items[i]);
            let mut list = Element::new(list_tag(&kind)).class(spacing.list);

            while i < items.len()
                && items[i].list_level() == level
                && list_kind(items[i]) == kind
            {
                let mut li = Element::new("li")
                    .class(spacing.list_item)
                    .children(self.render_spans(items[i]));
                i += 1;

                let start = i;
                while i < items.len() && items[i].list_level() > level {
                    i += 1;
                }
                if start < i {
                    li = li.children(self.render_list(&items[start..i], mode));
                }
                list.push(li);
            }

            lists.push(list.into());
        }

        lists
    }

    fn render_spans(&self, block: &TextBlock) -> Vec<Node> {
        let mut nodes = Vec::new();

        for child in &block.children {
            let span = match child {
                Inline::Span(span) => span,
                Inline::Other { kind } => {
                    tracing::debug!("Skipping inline object {:?}", kind);
                    continue;
                }
            };

            let mut content = text_with_breaks(&span.text);
            // First mark wraps outermost
            for name in span.marks.iter().rev() {
                match Mark::resolve(name, &block.mark_defs) {
                    Some(mark) => content = vec![wrap_mark(&mark, content)],
                    None => tracing::debug!("Unresolved mark {:?}", name),
                }
            }
            nodes.extend(content);
        }

        nodes
    }

    fn render_image(&self, image: &ImageRef, mode: DisplayMode) -> Option<Node> {
        // Images without an uploaded asset are dropped silently
        let src = self.images.url_for(image)?;
        let size = self.images.default_size();

        let img = Element::new("img")
            .attr("src", src)
            .attr("alt", image.alt().unwrap_or("Blog post image"))
            .attr("width", size.width.to_string())
            .attr("height", size.height.to_string())
            .attr("loading", "lazy")
            .class("w-full h-auto");

        let mut figure = Element::new("figure")
            .class(mode.spacing().figure)
            .child(img);
        if let Some(caption) = image.caption() {
            figure.push(
                Element::new("figcaption")
                    .class("text-center text-sm mt-2 italic")
                    .child(Node::text(caption)),
            );
        }
        Some(figure.into())
    }

    fn render_code(&self, block: &CodeBlock, mode: DisplayMode) -> Option<Node> {
        let Some(code) = block.source() else {
            tracing::warn!("Skipping code block without code");
            return None;
        };
        let language = block.language();

        let mut wrapper = Element::new("div")
            .class(mode.spacing().code)
            .attr("data-language", language);
        if let Some(filename) = block.filename() {
            wrapper.push(
                Element::new("div")
                    .class("code-filename")
                    .child(Node::text(filename)),
            );
        }
        wrapper.push(Node::Highlighted {
            language: language.to_string(),
            code: code.to_string(),
            html: self.highlighter.highlight(code, language),
        });
        Some(wrapper.into())
    }
}

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

fn list_kind(block: &TextBlock) -> ListKind {
    block.list_item.clone().unwrap_or(ListKind::Bullet)
}

fn list_tag(kind: &ListKind) -> &'static str {
    match kind {
        ListKind::Number => "ol",
        ListKind::Bullet => "ul",
        ListKind::Other(other) => {
            tracing::debug!("Unknown list kind {:?}, rendering as bullets", other);
            "ul"
        }
    }
}

fn wrap_mark(mark: &Mark, children: Vec<Node>) -> Node {
    let element = match mark {
        Mark::Strong => Element::new("strong").class("font-bold"),
        Mark::Em => Element::new("em"),
        Mark::Code => Element::new("code").class("px-2 py-1 rounded text-sm font-mono"),
        Mark::Underline => Element::new("u"),
        Mark::StrikeThrough => Element::new("s"),
        Mark::Link { href } => Element::new("a")
            .attr("href", href.as_str())
            .attr("target", "_blank")
            .attr("rel", "noopener noreferrer")
            .class("font-medium hover:underline"),
    };
    element.children(children).into()
}

/// Split span text on newlines into text nodes separated by `<br>`
fn text_with_breaks(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            nodes.push(Element::new("br").into());
        }
        if !line.is_empty() {
            nodes.push(Node::text(line));
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContentStoreConfig, RenderConfig};
    use serde_json::{json, Value};

    fn renderer() -> PortableTextRenderer {
        let store = ContentStoreConfig {
            project_id: "pq1".to_string(),
            ..Default::default()
        };
        PortableTextRenderer::new(
            Highlighter::default(),
            ImageUrlBuilder::new(&store, &RenderConfig::default()),
        )
    }

    fn blocks(value: Value) -> Vec<Block> {
        serde_json::from_value(value).unwrap()
    }

    fn paragraph(text: &str) -> Value {
        json!({"_type": "block", "style": "normal", "children": [{"_type": "span", "text": text, "marks": []}]})
    }

    fn item(text: &str, kind: &str, level: u32) -> Value {
        json!({"_type": "block", "style": "normal", "listItem": kind, "level": level,
               "children": [{"_type": "span", "text": text}]})
    }

    #[test]
    fn test_empty_body() {
        let r = renderer();
        assert!(r.render(&[], DisplayMode::Default).is_empty());
        assert_eq!(r.render_html(&[], DisplayMode::Compact), "");
    }

    #[test]
    fn test_single_paragraph() {
        let nodes = renderer().render(&blocks(json!([paragraph("Hello")])), DisplayMode::Default);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag(), Some("p"));
        assert_eq!(nodes[0].text_content(), "Hello");
    }

    #[test]
    fn test_image_without_asset_is_dropped() {
        let body = blocks(json!([
            paragraph("before"),
            {"_type": "image", "alt": "missing"},
            paragraph("after")
        ]));
        let nodes = renderer().render(&body, DisplayMode::Default);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text_content(), "before");
        assert_eq!(nodes[1].text_content(), "after");
    }

    #[test]
    fn test_image_with_caption() {
        let body = blocks(json!([{
            "_type": "image",
            "asset": {"_ref": "image-abc-1600x1000-png"},
            "caption": "Architecture"
        }]));
        let html = renderer().render_html(&body, DisplayMode::Default);
        assert!(html.contains(r#"src="https://cdn.sanity.io/images/pq1/production/abc-1600x1000.png?w=800&amp;h=500"#));
        assert!(html.contains(r#"alt="Blog post image""#));
        assert!(html.contains("<figcaption"));
        assert!(html.contains("Architecture"));
    }

    #[test]
    fn test_code_block() {
        let body = blocks(json!([{"_type": "code", "code": "print(1)", "language": "python"}]));
        let nodes = renderer().render(&body, DisplayMode::Default);
        assert_eq!(nodes.len(), 1);

        let Node::Element(wrapper) = &nodes[0] else {
            panic!("expected wrapper element");
        };
        assert_eq!(wrapper.attrs.get("data-language").map(String::as_str), Some("python"));
        match &wrapper.children[0] {
            Node::Highlighted { language, code, html } => {
                assert_eq!(language, "python");
                assert_eq!(code, "print(1)");
                assert!(html.contains("print"));
            }
            other => panic!("expected highlighted node, got {:?}", other),
        }
        assert!(nodes[0].text_content().contains("print(1)"));
    }

    #[test]
    fn test_code_block_with_filename_and_default_language() {
        let body = blocks(json!([{"_type": "code", "code": "hello", "filename": "notes.txt"}]));
        let html = renderer().render_html(&body, DisplayMode::Default);
        assert!(html.contains(r#"data-language="text""#));
        assert!(html.contains(r#"<div class="code-filename">notes.txt</div>"#));
    }

    #[test]
    fn test_code_block_without_code_is_dropped() {
        let body = blocks(json!([{"_type": "code", "language": "rust"}, paragraph("next")]));
        let nodes = renderer().render(&body, DisplayMode::Default);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag(), Some("p"));
    }

    #[test]
    fn test_unknown_block_is_skipped() {
        let body = blocks(json!([{"_type": "youtube", "url": "x"}, paragraph("kept")]));
        let nodes = renderer().render(&body, DisplayMode::Default);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text_content(), "kept");
    }

    #[test]
    fn test_headings_and_quotes() {
        let body = blocks(json!([
            {"_type": "block", "style": "h2", "children": [{"_type": "span", "text": "Key Considerations"}]},
            {"_type": "block", "style": "blockquote", "children": [{"_type": "span", "text": "Quoted"}]},
            {"_type": "block", "style": "fancy", "children": [{"_type": "span", "text": "Fallback"}]}
        ]));
        let nodes = renderer().render(&body, DisplayMode::Default);
        let tags: Vec<_> = nodes.iter().filter_map(Node::tag).collect();
        assert_eq!(tags, vec!["h2", "blockquote", "p"]);
        assert!(nodes[0].to_html().contains(r#"id="key-considerations""#));
    }

    #[test]
    fn test_marks() {
        let body = blocks(json!([{
            "_type": "block",
            "style": "normal",
            "markDefs": [{"_key": "l1", "_type": "link", "href": "https://example.com"}],
            "children": [
                {"_type": "span", "text": "bold", "marks": ["strong", "em"]},
                {"_type": "span", "text": " and "},
                {"_type": "span", "text": "link", "marks": ["l1"]},
                {"_type": "span", "text": " gone", "marks": ["missing"]}
            ]
        }]));
        let html = renderer().render_html(&body, DisplayMode::Default);
        assert!(html.contains(r#"<strong class="font-bold"><em>bold</em></strong>"#));
        assert!(html.contains(r#"<a href="https://example.com" target="_blank" rel="noopener noreferrer""#));
        assert!(html.contains(" gone</p>"));
    }

    #[test]
    fn test_line_breaks() {
        let body = blocks(json!([paragraph("one\ntwo")]));
        let html = renderer().render_html(&body, DisplayMode::Compact);
        assert!(html.contains("one<br>two"));
    }

    #[test]
    fn test_lists_group_and_nest() {
        let body = blocks(json!([
            item("a", "bullet", 1),
            item("a.1", "bullet", 2),
            item("b", "bullet", 1),
            item("one", "number", 1),
            paragraph("after")
        ]));
        let nodes = renderer().render(&body, DisplayMode::Default);
        let tags: Vec<_> = nodes.iter().filter_map(Node::tag).collect();
        assert_eq!(tags, vec!["ul", "ol", "p"]);

        let Node::Element(ul) = &nodes[0] else {
            panic!("expected list");
        };
        assert_eq!(ul.children.len(), 2);
        let Node::Element(first) = &ul.children[0] else {
            panic!("expected item");
        };
        assert_eq!(first.children.last().and_then(Node::tag), Some("ul"));
    }

    #[test]
    fn test_compact_mode_changes_spacing_only() {
        let body = blocks(json!([paragraph("Hello")]));
        let r = renderer();
        let default = r.render(&body, DisplayMode::Default);
        let compact = r.render(&body, DisplayMode::Compact);
        assert_eq!(default[0].tag(), compact[0].tag());
        assert_eq!(default[0].text_content(), compact[0].text_content());
        assert_ne!(default[0].to_html(), compact[0].to_html());
    }
}
