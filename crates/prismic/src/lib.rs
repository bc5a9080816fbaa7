//! prismic — a typed content model for Prismic-style headless CMS payloads.
//!
//! Decodes a raw JSON document into a closed union of content fragments
//! (text, rich text, links, images, groups, slices, ...) and renders any
//! rich-text field back into well-formed nested HTML, with pluggable link
//! resolution and per-element serializer overrides.
//!
//! Everything in this crate is an immutable value object: decode a
//! [`Document`] once, then read and render it from any number of threads
//! without synchronization. Network transport, caching, and the query DSL
//! are the caller's concern.

pub mod document;
pub mod error;
pub mod fragments;
pub mod html;

pub use document::{AlternateLanguage, Document, WithFragments};
pub use error::DecodeError;
pub use fragments::structured_text::{Block, Span, SpanKind};
pub use fragments::{
    decode_fragment, Color, DecodeOptions, DocumentLink, Embed, FileLink, Fragment, FragmentMap,
    GeoPoint, Group, GroupItem, Image, ImageLink, Link, NumberFormat, Slice, SliceZone,
    StructuredText, View, WebLink,
};
pub use html::{
    escape_html, fragment_html, resolver_fn, serializer_fn, Element, HtmlSerializer, LinkResolver,
};

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
