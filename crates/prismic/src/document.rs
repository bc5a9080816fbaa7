//! Document assembly and the shared fragment-access surface.
//!
//! A document is decoded once, atomically, from a single JSON payload, and
//! is immutable afterwards: a pure value object safe to cache and render
//! concurrently.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate};
use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::error::DecodeError;
use crate::fragments::link::DocumentLink;
use crate::fragments::structured_text::SpanKind;
use crate::fragments::{
    decode_fragment, Color, DecodeOptions, Embed, Fragment, FragmentMap, GeoPoint, Group, Image,
    Link, SliceZone, StructuredText, View,
};
use crate::html::{fragment_html, HtmlSerializer, LinkResolver};

/// The fragment-access surface shared by documents, group items, and
/// expanded document links.
pub trait WithFragments {
    /// The path-keyed fragment map, in source order.
    fn fragments(&self) -> &FragmentMap;

    fn get(&self, field: &str) -> Option<&Fragment> {
        self.fragments().get(field)
    }

    /// Every indexed match (`field[0]`, `field[1]`, ...) for a repeatable
    /// field, in original order.
    fn get_all(&self, field: &str) -> Vec<&Fragment> {
        self.fragments()
            .iter()
            .filter(|(key, _)| is_indexed_key(key, field))
            .map(|(_, fragment)| fragment)
            .collect()
    }

    /// Plain-text view of a field, for the kinds that have one.
    fn get_text(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Fragment::Text(value) => Some(value.clone()),
            Fragment::Number(value) => Some(value.to_string()),
            Fragment::Color(color) => Some(color.hex().to_owned()),
            Fragment::Boolean(value) => Some(value.to_string()),
            Fragment::StructuredText(text) => Some(text.text()),
            _ => None,
        }
    }

    fn get_number(&self, field: &str) -> Option<f64> {
        match self.get(field)? {
            Fragment::Number(value) => Some(*value),
            _ => None,
        }
    }

    fn get_boolean(&self, field: &str) -> Option<bool> {
        match self.get(field)? {
            Fragment::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    fn get_color(&self, field: &str) -> Option<&Color> {
        match self.get(field)? {
            Fragment::Color(color) => Some(color),
            _ => None,
        }
    }

    fn get_date(&self, field: &str) -> Option<NaiveDate> {
        match self.get(field)? {
            Fragment::Date(date) => Some(*date),
            _ => None,
        }
    }

    fn get_timestamp(&self, field: &str) -> Option<DateTime<FixedOffset>> {
        match self.get(field)? {
            Fragment::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    fn get_geo_point(&self, field: &str) -> Option<&GeoPoint> {
        match self.get(field)? {
            Fragment::GeoPoint(point) => Some(point),
            _ => None,
        }
    }

    fn get_embed(&self, field: &str) -> Option<&Embed> {
        match self.get(field)? {
            Fragment::Embed(embed) => Some(embed),
            _ => None,
        }
    }

    fn get_image(&self, field: &str) -> Option<&Image> {
        match self.get(field)? {
            Fragment::Image(image) => Some(image),
            _ => None,
        }
    }

    fn get_image_view(&self, field: &str, view: &str) -> Option<&View> {
        self.get_image(field)?.get_view(view)
    }

    fn get_link(&self, field: &str) -> Option<&Link> {
        match self.get(field)? {
            Fragment::Link(link) => Some(link),
            _ => None,
        }
    }

    fn get_group(&self, field: &str) -> Option<&Group> {
        match self.get(field)? {
            Fragment::Group(group) => Some(group),
            _ => None,
        }
    }

    fn get_slice_zone(&self, field: &str) -> Option<&SliceZone> {
        match self.get(field)? {
            Fragment::SliceZone(zone) => Some(zone),
            _ => None,
        }
    }

    fn get_structured_text(&self, field: &str) -> Option<&StructuredText> {
        match self.get(field)? {
            Fragment::StructuredText(text) => Some(text),
            _ => None,
        }
    }

    fn get_raw(&self, field: &str) -> Option<&Value> {
        match self.get(field)? {
            Fragment::Raw(value) => Some(value),
            _ => None,
        }
    }

    /// Renders one field; absent fields render as an empty string.
    fn get_html(
        &self,
        field: &str,
        resolver: &dyn LinkResolver,
        serializer: Option<&dyn HtmlSerializer>,
    ) -> String {
        match self.get(field) {
            Some(fragment) => fragment_html(fragment, resolver, serializer),
            None => String::new(),
        }
    }

    /// Renders every field, each wrapped in
    /// `<section data-field="{path}">...</section>`, in fragment-map order.
    fn as_html(
        &self,
        resolver: &dyn LinkResolver,
        serializer: Option<&dyn HtmlSerializer>,
    ) -> String {
        let mut html = String::new();
        for (path, fragment) in self.fragments() {
            html.push_str("<section data-field=\"");
            html.push_str(path);
            html.push_str("\">");
            html.push_str(&fragment_html(fragment, resolver, serializer));
            html.push_str("</section>");
        }
        html.trim().to_owned()
    }

    /// Every document link reachable from these fragments: direct link
    /// fields, hyperlink spans inside rich text, and group items,
    /// recursively.
    fn linked_documents(&self) -> Vec<&DocumentLink> {
        let mut found = Vec::new();
        collect_linked(self.fragments(), &mut found);
        found
    }
}

fn is_indexed_key(key: &str, field: &str) -> bool {
    key.strip_prefix(field)
        .and_then(|rest| rest.strip_prefix('['))
        .and_then(|rest| rest.strip_suffix(']'))
        .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

fn collect_linked<'a>(fragments: &'a FragmentMap, found: &mut Vec<&'a DocumentLink>) {
    for fragment in fragments.values() {
        match fragment {
            Fragment::Link(Link::Document(link)) => found.push(link),
            Fragment::StructuredText(text) => {
                for block in &text.blocks {
                    for span in block.spans() {
                        if let SpanKind::Hyperlink(Link::Document(link)) = &span.kind {
                            found.push(link);
                        }
                    }
                }
            }
            Fragment::Group(group) => {
                for item in &group.items {
                    collect_linked(&item.fragments, found);
                }
            }
            _ => {}
        }
    }
}

/// A language alternate of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateLanguage {
    pub id: String,
    pub uid: Option<String>,
    pub doc_type: String,
    pub lang: String,
}

impl AlternateLanguage {
    fn parse(json: &Value) -> Option<AlternateLanguage> {
        Some(AlternateLanguage {
            id: json.get("id")?.as_str()?.to_owned(),
            uid: json.get("uid").and_then(Value::as_str).map(str::to_owned),
            doc_type: json
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            lang: json
                .get("lang")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        })
    }
}

/// A fully decoded document: metadata plus the path-keyed fragment map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub uid: Option<String>,
    pub doc_type: String,
    pub href: String,
    pub tags: BTreeSet<String>,
    pub slugs: Vec<String>,
    pub lang: String,
    pub alternate_languages: Vec<AlternateLanguage>,
    pub first_publication_date: Option<DateTime<FixedOffset>>,
    pub last_publication_date: Option<DateTime<FixedOffset>>,
    pub fragments: FragmentMap,
}

impl WithFragments for Document {
    fn fragments(&self) -> &FragmentMap {
        &self.fragments
    }
}

impl Document {
    pub fn from_json(json: &Value) -> Result<Document, DecodeError> {
        Document::from_json_with(json, &DecodeOptions::default())
    }

    pub fn from_json_with(json: &Value, opts: &DecodeOptions) -> Result<Document, DecodeError> {
        let id = json
            .get("id")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingField("id"))?
            .to_owned();
        let doc_type = json
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingField("type"))?
            .to_owned();

        let tags = match json.get("tags") {
            Some(Value::Array(tags)) => tags
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            _ => BTreeSet::new(),
        };
        let slugs = match json.get("slugs") {
            Some(Value::Array(slugs)) => slugs
                .iter()
                .filter_map(Value::as_str)
                .map(url_decode)
                .collect(),
            _ => Vec::new(),
        };
        let alternate_languages = match json.get("alternate_languages") {
            Some(Value::Array(langs)) => langs.iter().filter_map(AlternateLanguage::parse).collect(),
            _ => Vec::new(),
        };

        let fragments = match json.get("data") {
            Some(data) => parse_fragment_fields(&doc_type, data, opts)?,
            None => FragmentMap::new(),
        };

        Ok(Document {
            id,
            uid: json.get("uid").and_then(Value::as_str).map(str::to_owned),
            href: json
                .get("href")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            tags,
            slugs,
            lang: json
                .get("lang")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            alternate_languages,
            first_publication_date: json
                .get("first_publication_date")
                .and_then(Value::as_str)
                .and_then(crate::fragments::parse_timestamp),
            last_publication_date: json
                .get("last_publication_date")
                .and_then(Value::as_str)
                .and_then(crate::fragments::parse_timestamp),
            fragments,
            doc_type,
        })
    }

    /// The canonical slug: the first of the slug history, `"-"` when the
    /// document carries none.
    pub fn slug(&self) -> &str {
        self.slugs.first().map(String::as_str).unwrap_or("-")
    }

    pub fn as_document_link(&self) -> DocumentLink {
        DocumentLink {
            id: self.id.clone(),
            uid: self.uid.clone(),
            doc_type: self.doc_type.clone(),
            tags: self.tags.iter().cloned().collect(),
            slug: self.slug().to_owned(),
            lang: self.lang.clone(),
            is_broken: false,
            fragments: self.fragments.clone(),
        }
    }
}

/// Assembles the path-keyed fragment map from the type-scoped `data` object.
///
/// Array-valued fields are probed as rich text first (a `StructuredText`
/// array decodes as one fragment under the singular key); otherwise each
/// element decodes on its own under an `[i]`-indexed key, keeping source
/// indexes even when some elements are absent.
pub(crate) fn parse_fragment_fields(
    doc_type: &str,
    data: &Value,
    opts: &DecodeOptions,
) -> Result<FragmentMap, DecodeError> {
    let mut fragments = FragmentMap::new();
    let fields = match data.get(doc_type).and_then(Value::as_object) {
        Some(fields) => fields,
        None => return Ok(fragments),
    };

    for (name, raw) in fields {
        let base = format!("{}.{}", doc_type, name);
        match raw {
            Value::Array(elements) => {
                if let Some(text) = StructuredText::parse_if_blocks(raw, opts) {
                    fragments.insert(base, Fragment::StructuredText(text));
                    continue;
                }
                for (i, element) in elements.iter().enumerate() {
                    if let Some(fragment) = decode_field(element, opts)? {
                        fragments.insert(format!("{}[{}]", base, i), fragment);
                    }
                }
            }
            _ => {
                if let Some(fragment) = decode_field(raw, opts)? {
                    fragments.insert(base, fragment);
                }
            }
        }
    }
    Ok(fragments)
}

fn decode_field(raw: &Value, opts: &DecodeOptions) -> Result<Option<Fragment>, DecodeError> {
    let kind = match raw.get("type").and_then(Value::as_str) {
        Some(kind) => kind,
        None => return Ok(None),
    };
    decode_fragment(kind, raw.get("value").unwrap_or(&Value::Null), opts)
}

fn url_decode(text: &str) -> String {
    let plus_decoded = text.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .unwrap_or(plus_decoded)
}

impl WithFragments for DocumentLink {
    fn fragments(&self) -> &FragmentMap {
        &self.fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_key_matching_is_exact() {
        assert!(is_indexed_key("article.items[0]", "article.items"));
        assert!(is_indexed_key("article.items[12]", "article.items"));
        assert!(!is_indexed_key("article.items", "article.items"));
        assert!(!is_indexed_key("article.items[]", "article.items"));
        assert!(!is_indexed_key("article.itemsx[0]", "article.items"));
        assert!(!is_indexed_key("article.items[0]x", "article.items"));
    }

    #[test]
    fn slugs_are_url_decoded() {
        assert_eq!(url_decode("chocolate%20eclair"), "chocolate eclair");
        assert_eq!(url_decode("plain-slug"), "plain-slug");
        assert_eq!(url_decode("a+b"), "a b");
    }
}
