//! Rich-text fragments: the block/span AST, its parser, and the span-overlap
//! resolver that turns flat `[start, end)` style ranges into properly nested
//! HTML.
//!
//! Compatibility notes:
//! - Span positions are counted in Unicode scalar values; a multi-byte code
//!   point is one position and is escaped as a whole.
//! - Crossing span ranges are neither rejected nor repaired. The upstream
//!   kits run the same stack-based walk, which silently misnests in that
//!   case; the CMS never emits crossing ranges.

use std::collections::HashMap;

use serde_json::Value;

use super::link::{parse_link, Link};
use super::{DecodeOptions, Embed, View};
use crate::html::{anchor, escape_html, push_escaped, Element, HtmlSerializer, LinkResolver};

/// A rich-text field: an ordered sequence of block elements.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredText {
    pub blocks: Vec<Block>,
}

/// One block element. Text-bearing blocks carry a plain-text run plus the
/// style spans annotating it.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        text: String,
        spans: Vec<Span>,
        level: u8,
        label: Option<String>,
    },
    Paragraph {
        text: String,
        spans: Vec<Span>,
        label: Option<String>,
    },
    Preformatted {
        text: String,
        spans: Vec<Span>,
        label: Option<String>,
    },
    ListItem {
        text: String,
        spans: Vec<Span>,
        ordered: bool,
        label: Option<String>,
    },
    Image {
        view: View,
        label: Option<String>,
    },
    Embed {
        embed: Embed,
        label: Option<String>,
    },
}

impl Block {
    /// The plain-text run of a text-bearing block.
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Heading { text, .. }
            | Block::Paragraph { text, .. }
            | Block::Preformatted { text, .. }
            | Block::ListItem { text, .. } => Some(text),
            Block::Image { .. } | Block::Embed { .. } => None,
        }
    }

    pub fn spans(&self) -> &[Span] {
        match self {
            Block::Heading { spans, .. }
            | Block::Paragraph { spans, .. }
            | Block::Preformatted { spans, .. }
            | Block::ListItem { spans, .. } => spans,
            Block::Image { .. } | Block::Embed { .. } => &[],
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Block::Heading { label, .. }
            | Block::Paragraph { label, .. }
            | Block::Preformatted { label, .. }
            | Block::ListItem { label, .. }
            | Block::Image { label, .. }
            | Block::Embed { label, .. } => label.as_deref(),
        }
    }

    fn parse(json: &Value, opts: &DecodeOptions) -> Option<Block> {
        let block_type = json.get("type")?.as_str()?;
        let label = json.get("label").and_then(Value::as_str).map(str::to_owned);

        if let Some(level) = block_type.strip_prefix("heading") {
            let level: u8 = level.parse().ok()?;
            if !(1..=6).contains(&level) {
                return None;
            }
            let (text, spans) = parse_text(json, opts)?;
            return Some(Block::Heading {
                text,
                spans,
                level,
                label,
            });
        }

        match block_type {
            "paragraph" => {
                let (text, spans) = parse_text(json, opts)?;
                Some(Block::Paragraph { text, spans, label })
            }
            "preformatted" => {
                let (text, spans) = parse_text(json, opts)?;
                Some(Block::Preformatted { text, spans, label })
            }
            "list-item" => {
                let (text, spans) = parse_text(json, opts)?;
                Some(Block::ListItem {
                    text,
                    spans,
                    ordered: false,
                    label,
                })
            }
            "o-list-item" => {
                let (text, spans) = parse_text(json, opts)?;
                Some(Block::ListItem {
                    text,
                    spans,
                    ordered: true,
                    label,
                })
            }
            "image" => View::parse(json, opts).map(|view| Block::Image { view, label }),
            "embed" => Embed::parse(json).map(|embed| Block::Embed { embed, label }),
            _ => None,
        }
    }
}

/// A style span over a half-open `[start, end)` range of a block's text,
/// measured in Unicode scalar values.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink(Link),
    Label(String),
}

impl Span {
    /// Zero- and negative-width spans are dropped, as are hyperlinks whose
    /// link data cannot be decoded and labels without a label value.
    fn parse(json: &Value, opts: &DecodeOptions) -> Option<Span> {
        let start = json.get("start")?.as_u64()? as usize;
        let end = json.get("end")?.as_u64()? as usize;
        if end <= start {
            return None;
        }
        let kind = match json.get("type")?.as_str()? {
            "strong" => SpanKind::Strong,
            "em" => SpanKind::Em,
            "hyperlink" => match parse_link(json.get("data")?, opts) {
                Ok(Some(link)) => SpanKind::Hyperlink(link),
                _ => return None,
            },
            "label" => SpanKind::Label(
                json.get("data")?
                    .get("label")?
                    .as_str()?
                    .to_owned(),
            ),
            _ => return None,
        };
        Some(Span { start, end, kind })
    }
}

fn parse_text(json: &Value, opts: &DecodeOptions) -> Option<(String, Vec<Span>)> {
    let text = json.get("text")?.as_str()?.to_owned();
    let spans = match json.get("spans") {
        Some(Value::Array(raw)) => raw.iter().filter_map(|s| Span::parse(s, opts)).collect(),
        _ => Vec::new(),
    };
    Some((text, spans))
}

impl StructuredText {
    /// Parses a raw block array. Blocks with unrecognized types are dropped;
    /// the rest of the field still renders.
    pub fn parse(json: &Value, opts: &DecodeOptions) -> Option<StructuredText> {
        let raw = json.as_array()?;
        Some(StructuredText {
            blocks: raw.iter().filter_map(|b| Block::parse(b, opts)).collect(),
        })
    }

    /// Assembler probe for untagged arrays: an array is a rich-text field
    /// only if at least one element parses as a block. Arrays of repeated
    /// fragments (multi-link fields) fail this and decode element-wise.
    pub(crate) fn parse_if_blocks(json: &Value, opts: &DecodeOptions) -> Option<StructuredText> {
        let text = StructuredText::parse(json, opts)?;
        if text.blocks.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// First heading block, if any.
    pub fn title(&self) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|b| matches!(b, Block::Heading { .. }))
    }

    pub fn first_paragraph(&self) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|b| matches!(b, Block::Paragraph { .. }))
    }

    pub fn first_preformatted(&self) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|b| matches!(b, Block::Preformatted { .. }))
    }

    pub fn first_image(&self) -> Option<&View> {
        self.blocks.iter().find_map(|b| match b {
            Block::Image { view, .. } => Some(view),
            _ => None,
        })
    }

    /// Concatenated plain text of every text-bearing block.
    pub fn text(&self) -> String {
        self.blocks.iter().filter_map(Block::text).collect()
    }

    /// Renders all blocks, coalescing consecutive list items of the same
    /// orderedness under a single `<ul>`/`<ol>` wrapper.
    pub fn as_html(
        &self,
        resolver: &dyn LinkResolver,
        serializer: Option<&dyn HtmlSerializer>,
    ) -> String {
        let mut groups: Vec<(Option<&str>, Vec<&Block>)> = Vec::new();
        for block in &self.blocks {
            let tag = match block {
                Block::ListItem { ordered: false, .. } => Some("ul"),
                Block::ListItem { ordered: true, .. } => Some("ol"),
                _ => None,
            };
            match groups.last_mut() {
                Some((last_tag, members)) if tag.is_some() && *last_tag == tag => {
                    members.push(block);
                }
                _ => groups.push((tag, vec![block])),
            }
        }

        let mut html = String::new();
        for (tag, members) in groups {
            if let Some(tag) = tag {
                html.push('<');
                html.push_str(tag);
                html.push('>');
                for block in members {
                    html.push_str(&block_html(block, resolver, serializer));
                }
                html.push_str("</");
                html.push_str(tag);
                html.push('>');
            } else {
                for block in members {
                    html.push_str(&block_html(block, resolver, serializer));
                }
            }
        }
        html
    }
}

/// Renders one block: spans resolved first, then the custom serializer
/// consulted, then the fixed per-type rules.
pub fn block_html(
    block: &Block,
    resolver: &dyn LinkResolver,
    serializer: Option<&dyn HtmlSerializer>,
) -> String {
    let content = match block.text() {
        Some(text) => insert_spans(text, block.spans(), resolver, serializer),
        None => String::new(),
    };

    if let Some(custom) = serializer.and_then(|s| s.serialize(Element::Block(block), &content)) {
        return custom;
    }

    let class_attr = match block.label() {
        Some(label) => format!(" class=\"{}\"", label),
        None => String::new(),
    };
    match block {
        Block::Heading { level, .. } => {
            format!("<h{level}{class_attr}>{content}</h{level}>")
        }
        Block::Paragraph { .. } => format!("<p{class_attr}>{content}</p>"),
        Block::Preformatted { .. } => format!("<pre{class_attr}>{content}</pre>"),
        Block::ListItem { .. } => format!("<li{class_attr}>{content}</li>"),
        Block::Image { view, label } => {
            let label_code = match label {
                Some(label) => format!(" {}", label),
                None => String::new(),
            };
            format!(
                "<p class=\"block-img{}\">{}</p>",
                label_code,
                view.as_html(resolver)
            )
        }
        Block::Embed { embed, .. } => embed.as_html(),
    }
}

fn serialize_span(
    span: &Span,
    content: &str,
    resolver: &dyn LinkResolver,
    serializer: Option<&dyn HtmlSerializer>,
) -> String {
    if let Some(custom) = serializer.and_then(|s| s.serialize(Element::Span(span), content)) {
        return custom;
    }
    match &span.kind {
        SpanKind::Strong => format!("<strong>{content}</strong>"),
        SpanKind::Em => format!("<em>{content}</em>"),
        SpanKind::Label(label) => format!("<span class=\"{label}\">{content}</span>"),
        SpanKind::Hyperlink(link) => {
            let (target, title) = match link {
                Link::Web(web) => (web.target.as_deref(), None),
                Link::Document(doc) if !doc.is_broken => (None, resolver.title(doc)),
                _ => (None, None),
            };
            anchor(&link.url(resolver), content, target, title.as_deref())
        }
    }
}

/// Resolves a flat text run plus independent `[start, end)` span ranges into
/// correctly nested HTML.
///
/// The walk visits each code point once: spans closing at the position are
/// popped off a nesting stack in LIFO order (spans closing together close in
/// reverse of their opening order), each serialized with its accumulated
/// inner content and appended to its parent's accumulator (or the output when
/// top-level); spans opening at the position push fresh accumulators; the
/// escaped code point then goes to the innermost open accumulator. Spans
/// still open past the end of the text are closed the same way.
pub fn insert_spans(
    text: &str,
    spans: &[Span],
    resolver: &dyn LinkResolver,
    serializer: Option<&dyn HtmlSerializer>,
) -> String {
    if spans.is_empty() {
        return escape_html(text);
    }

    let mut opens_at: HashMap<usize, Vec<&Span>> = HashMap::new();
    let mut closes_at: HashMap<usize, usize> = HashMap::new();
    for span in spans {
        opens_at.entry(span.start).or_default().push(span);
        *closes_at.entry(span.end).or_default() += 1;
    }

    let mut html = String::new();
    let mut stack: Vec<(&Span, String)> = Vec::new();

    for (pos, ch) in text.chars().enumerate() {
        if let Some(&closing) = closes_at.get(&pos) {
            for _ in 0..closing {
                close_top(&mut stack, &mut html, resolver, serializer);
            }
        }
        if let Some(opening) = opens_at.get(&pos) {
            for &span in opening {
                stack.push((span, String::new()));
            }
        }
        match stack.last_mut() {
            Some((_, inner)) => push_escaped(inner, ch),
            None => push_escaped(&mut html, ch),
        }
    }

    // Spans ending at (or past) the end of the text.
    while !stack.is_empty() {
        close_top(&mut stack, &mut html, resolver, serializer);
    }
    html
}

fn close_top(
    stack: &mut Vec<(&Span, String)>,
    html: &mut String,
    resolver: &dyn LinkResolver,
    serializer: Option<&dyn HtmlSerializer>,
) {
    if let Some((span, content)) = stack.pop() {
        let rendered = serialize_span(span, &content, resolver, serializer);
        match stack.last_mut() {
            Some((_, parent)) => parent.push_str(&rendered),
            None => html.push_str(&rendered),
        }
    }
}
