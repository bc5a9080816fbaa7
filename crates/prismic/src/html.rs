//! HTML rendering seams: link resolution, custom serialization, escaping.
//!
//! Rendering never mutates the model and never fails: fragments the
//! renderer does not know how to print degrade to an empty string, and
//! broken document links degrade to a `#broken` href.

use crate::fragments::structured_text::{Block, Span};
use crate::fragments::{Fragment, Link};

/// A rich-text element handed to a custom [`HtmlSerializer`].
#[derive(Debug, Clone, Copy)]
pub enum Element<'a> {
    Block(&'a Block),
    Span(&'a Span),
}

/// Resolves document links to URLs. Supplied by the caller: only the
/// application knows its routing scheme.
pub trait LinkResolver {
    fn resolve(&self, link: &crate::fragments::link::DocumentLink) -> String;

    /// Optional `title` attribute for rendered links.
    fn title(&self, _link: &crate::fragments::link::DocumentLink) -> Option<String> {
        None
    }
}

struct FnLinkResolver<F>(F);

impl<F> LinkResolver for FnLinkResolver<F>
where
    F: Fn(&crate::fragments::link::DocumentLink) -> String,
{
    fn resolve(&self, link: &crate::fragments::link::DocumentLink) -> String {
        (self.0)(link)
    }
}

/// Builds a [`LinkResolver`] from a closure.
pub fn resolver_fn<F>(f: F) -> impl LinkResolver
where
    F: Fn(&crate::fragments::link::DocumentLink) -> String,
{
    FnLinkResolver(f)
}

/// Per-element override hook consulted before the built-in HTML rules.
///
/// Returning `None` falls through to the default serialization for that
/// element; returning `Some` replaces it entirely.
pub trait HtmlSerializer {
    fn serialize(&self, element: Element<'_>, content: &str) -> Option<String>;
}

struct FnHtmlSerializer<F>(F);

impl<F> HtmlSerializer for FnHtmlSerializer<F>
where
    F: Fn(Element<'_>, &str) -> Option<String>,
{
    fn serialize(&self, element: Element<'_>, content: &str) -> Option<String> {
        (self.0)(element, content)
    }
}

/// Builds an [`HtmlSerializer`] from a closure.
pub fn serializer_fn<F>(f: F) -> impl HtmlSerializer
where
    F: Fn(Element<'_>, &str) -> Option<String>,
{
    FnHtmlSerializer(f)
}

/// HTML-entity escaping for text content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        push_escaped(&mut out, ch);
    }
    out
}

pub(crate) fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(ch),
    }
}

/// `<a>` tag builder shared by every link-producing rule.
pub(crate) fn anchor(
    url: &str,
    content: &str,
    target: Option<&str>,
    title: Option<&str>,
) -> String {
    let mut out = String::new();
    out.push_str("<a href=\"");
    out.push_str(url);
    out.push('"');
    if let Some(target) = target {
        out.push_str(" target=\"");
        out.push_str(&escape_html(target));
        out.push_str("\" rel=\"noopener\"");
    }
    if let Some(title) = title {
        out.push_str(" title=\"");
        out.push_str(&escape_html(title));
        out.push('"');
    }
    out.push('>');
    out.push_str(content);
    out.push_str("</a>");
    out
}

/// Renders one fragment, dispatching on its variant.
///
/// Variants without an HTML form (`GeoPoint`, `Raw`, file and image links
/// in field position) render as an empty string rather than failing.
pub fn fragment_html(
    fragment: &Fragment,
    resolver: &dyn LinkResolver,
    serializer: Option<&dyn HtmlSerializer>,
) -> String {
    match fragment {
        Fragment::Text(value) => format!("<span class=\"text\">{}</span>", escape_html(value)),
        Fragment::Number(value) => format!("<span class=\"number\">{}</span>", value),
        Fragment::Color(color) => format!("<span class=\"color\">{}</span>", color.hex()),
        Fragment::Boolean(value) => format!("<span class=\"boolean\">{}</span>", value),
        Fragment::Date(date) => format!("<time>{}</time>", date.format("%Y-%m-%d")),
        Fragment::Timestamp(ts) => format!("<time>{}</time>", ts.to_rfc3339()),
        Fragment::Embed(embed) => embed.as_html(),
        Fragment::Image(image) => image.as_html(resolver),
        Fragment::Link(Link::Web(web)) => {
            anchor(&web.url, &escape_html(&web.url), web.target.as_deref(), None)
        }
        Fragment::Link(Link::Document(link)) => link.as_html(resolver),
        Fragment::Link(Link::File(_)) | Fragment::Link(Link::Image(_)) => String::new(),
        Fragment::StructuredText(text) => text.as_html(resolver, serializer),
        Fragment::Group(group) => group.as_html(resolver, serializer),
        Fragment::SliceZone(zone) => zone.as_html(resolver, serializer),
        Fragment::GeoPoint(_) | Fragment::Raw(_) => String::new(),
    }
}
