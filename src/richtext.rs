//! Prismic structured text: data model and HTML rendering.
//!
//! A rich text field is a flat list of blocks (`paragraph`, `heading2`,
//! `list-item`, ...). Inline formatting is carried as spans over the block
//! text, each with a `start`/`end` offset and a type.
//!
//! ## Offsets
//!
//! Span offsets come from the editor's JavaScript strings, so they count
//! UTF-16 code units, not bytes or chars. [`byte_offset`] converts them.
//!
//! ## Rendering
//!
//! The block text is cut at every span boundary; each segment is wrapped in
//! the spans that cover it, outermost first. Overlapping spans therefore
//! produce properly nested (if sometimes repeated) tags.
//!
//! Consecutive `list-item` blocks are grouped into one `<ul>`, consecutive
//! `o-list-item` blocks into one `<ol>`.

use maud::{Markup, PreEscaped, html};
use serde::{Deserialize, Serialize};

/// One block of a rich text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RichTextBlock {
    #[serde(rename = "paragraph")]
    Paragraph(TextBlock),
    #[serde(rename = "heading1")]
    Heading1(TextBlock),
    #[serde(rename = "heading2")]
    Heading2(TextBlock),
    #[serde(rename = "heading3")]
    Heading3(TextBlock),
    #[serde(rename = "heading4")]
    Heading4(TextBlock),
    #[serde(rename = "heading5")]
    Heading5(TextBlock),
    #[serde(rename = "heading6")]
    Heading6(TextBlock),
    #[serde(rename = "preformatted")]
    Preformatted(TextBlock),
    #[serde(rename = "list-item")]
    ListItem(TextBlock),
    #[serde(rename = "o-list-item")]
    OListItem(TextBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(rename = "embed")]
    Embed(EmbedBlock),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(flatten)]
    pub kind: SpanKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SpanKind {
    #[serde(rename = "strong")]
    Strong,
    #[serde(rename = "em")]
    Em,
    #[serde(rename = "hyperlink")]
    Hyperlink { data: LinkData },
    #[serde(rename = "label")]
    Label { data: LabelData },
    #[serde(other)]
    Other,
}

/// Link target. Document links carry no `url` and render as plain text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelData {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedBlock {
    pub oembed: Oembed,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Oembed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl RichTextBlock {
    fn text_block(&self) -> Option<&TextBlock> {
        match self {
            RichTextBlock::Paragraph(b)
            | RichTextBlock::Heading1(b)
            | RichTextBlock::Heading2(b)
            | RichTextBlock::Heading3(b)
            | RichTextBlock::Heading4(b)
            | RichTextBlock::Heading5(b)
            | RichTextBlock::Heading6(b)
            | RichTextBlock::Preformatted(b)
            | RichTextBlock::ListItem(b)
            | RichTextBlock::OListItem(b) => Some(b),
            RichTextBlock::Image(_) | RichTextBlock::Embed(_) | RichTextBlock::Unknown => None,
        }
    }

    /// Raw text of the block; empty for images, embeds and unknown blocks.
    pub fn text(&self) -> &str {
        self.text_block().map(|b| b.text.as_str()).unwrap_or("")
    }
}

/// Plain text of a rich text field, blocks joined by a space.
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .map(RichTextBlock::text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a rich text field to HTML.
pub fn as_html(blocks: &[RichTextBlock]) -> Markup {
    let mut parts: Vec<Markup> = Vec::new();
    let mut i = 0;
    while i < blocks.len() {
        match &blocks[i] {
            RichTextBlock::ListItem(_) | RichTextBlock::OListItem(_) => {
                let ordered = matches!(blocks[i], RichTextBlock::OListItem(_));
                let start = i;
                while i < blocks.len() && is_list_item(&blocks[i], ordered) {
                    i += 1;
                }
                let items = &blocks[start..i];
                parts.push(render_list(items, ordered));
            }
            block => {
                parts.push(render_block(block));
                i += 1;
            }
        }
    }
    html! {
        @for part in parts {
            (part)
        }
    }
}

fn is_list_item(block: &RichTextBlock, ordered: bool) -> bool {
    match block {
        RichTextBlock::ListItem(_) => !ordered,
        RichTextBlock::OListItem(_) => ordered,
        _ => false,
    }
}

fn render_list(items: &[RichTextBlock], ordered: bool) -> Markup {
    let rendered = html! {
        @for item in items {
            @if let Some(block) = item.text_block() {
                li { (render_spans(block)) }
            }
        }
    };
    if ordered {
        html! { ol { (rendered) } }
    } else {
        html! { ul { (rendered) } }
    }
}

fn render_block(block: &RichTextBlock) -> Markup {
    match block {
        RichTextBlock::Paragraph(b) => html! { p { (render_spans(b)) } },
        RichTextBlock::Heading1(b) => html! { h1 { (render_spans(b)) } },
        RichTextBlock::Heading2(b) => html! { h2 { (render_spans(b)) } },
        RichTextBlock::Heading3(b) => html! { h3 { (render_spans(b)) } },
        RichTextBlock::Heading4(b) => html! { h4 { (render_spans(b)) } },
        RichTextBlock::Heading5(b) => html! { h5 { (render_spans(b)) } },
        RichTextBlock::Heading6(b) => html! { h6 { (render_spans(b)) } },
        RichTextBlock::Preformatted(b) => html! { pre { (render_spans(b)) } },
        RichTextBlock::ListItem(b) => html! { ul { li { (render_spans(b)) } } },
        RichTextBlock::OListItem(b) => html! { ol { li { (render_spans(b)) } } },
        RichTextBlock::Image(img) => {
            let (width, height) = match img.dimensions {
                Some(d) => (Some(d.width), Some(d.height)),
                None => (None, None),
            };
            html! {
                p.block-img {
                    img src=(img.url) alt=(img.alt.as_deref().unwrap_or("")) width=[width] height=[height] loading="lazy";
                }
            }
        }
        RichTextBlock::Embed(embed) => {
            let oembed = &embed.oembed;
            html! {
                div.embed data-oembed=[oembed.embed_url.as_deref()] data-oembed-type=[oembed.kind.as_deref()] {
                    @if let Some(markup) = &oembed.html {
                        (PreEscaped(markup))
                    }
                }
            }
        }
        RichTextBlock::Unknown => html! {},
    }
}

/// Convert a UTF-16 offset into a byte index into `text`.
///
/// Offsets past the end clamp to `text.len()`; an offset that lands inside
/// a surrogate pair snaps forward to the next char boundary.
pub fn byte_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        if units >= utf16_offset {
            return idx;
        }
        units += ch.len_utf16();
    }
    text.len()
}

fn render_spans(block: &TextBlock) -> Markup {
    let text = block.text.as_str();
    let len16: usize = text.encode_utf16().count();

    let spans: Vec<&Span> = {
        let mut s: Vec<&Span> = block
            .spans
            .iter()
            .filter(|s| s.kind != SpanKind::Other && s.start < s.end && s.start < len16)
            .collect();
        s.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        s
    };

    let mut cuts: Vec<usize> = vec![0, len16];
    for span in &spans {
        cuts.push(span.start);
        cuts.push(span.end.min(len16));
    }
    cuts.sort_unstable();
    cuts.dedup();

    let mut segments: Vec<Markup> = Vec::with_capacity(cuts.len());
    for window in cuts.windows(2) {
        let (from, to) = (window[0], window[1]);
        let segment = &text[byte_offset(text, from)..byte_offset(text, to)];
        let active: Vec<&Span> = spans
            .iter()
            .copied()
            .filter(|s| s.start <= from && s.end >= to)
            .collect();
        segments.push(wrap(&active, segment));
    }

    html! {
        @for segment in segments {
            (segment)
        }
    }
}

fn wrap(spans: &[&Span], segment: &str) -> Markup {
    let Some((outer, rest)) = spans.split_first() else {
        return text_with_breaks(segment);
    };
    let inner = wrap(rest, segment);
    match &outer.kind {
        SpanKind::Strong => html! { strong { (inner) } },
        SpanKind::Em => html! { em { (inner) } },
        SpanKind::Hyperlink { data } => match &data.url {
            Some(url) => {
                let rel = data.target.as_ref().map(|_| "noopener noreferrer");
                html! { a href=(url) target=[data.target.as_deref()] rel=[rel] { (inner) } }
            }
            None => inner,
        },
        SpanKind::Label { data } => html! { span class=(data.label) { (inner) } },
        SpanKind::Other => inner,
    }
}

fn text_with_breaks(text: &str) -> Markup {
    html! {
        @for (i, line) in text.split('\n').enumerate() {
            @if i > 0 {
                br;
            }
            (line)
        }
    }
}
