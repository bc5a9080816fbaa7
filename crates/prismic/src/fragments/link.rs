//! Link fragments: web, file, image, and document links.

use serde_json::Value;

use super::{DecodeOptions, FragmentMap};
use crate::error::DecodeError;
use crate::html::{anchor, escape_html, LinkResolver};

/// A link target. Web, file, and image links carry their URL directly;
/// document links go through the caller's [`LinkResolver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    Web(WebLink),
    File(FileLink),
    Image(ImageLink),
    Document(DocumentLink),
}

impl Link {
    /// The URL this link points at, resolving document links through the
    /// supplied resolver. Broken document links yield `#broken` without
    /// consulting the resolver.
    pub fn url(&self, resolver: &dyn LinkResolver) -> String {
        match self {
            Link::Web(web) => web.url.clone(),
            Link::File(file) => file.url.clone(),
            Link::Image(image) => image.url.clone(),
            Link::Document(doc) => doc.resolve_url(resolver),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebLink {
    pub url: String,
    pub target: Option<String>,
}

impl WebLink {
    pub fn parse(json: &Value) -> Option<WebLink> {
        Some(WebLink {
            url: json.get("url")?.as_str()?.to_owned(),
            target: json.get("target").and_then(Value::as_str).map(str::to_owned),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLink {
    pub url: String,
    pub kind: String,
    pub size: u64,
    pub filename: String,
}

impl FileLink {
    pub fn parse(json: &Value) -> Option<FileLink> {
        let file = json.get("file")?;
        let size = match file.get("size") {
            Some(Value::String(s)) => s.parse().unwrap_or(0),
            Some(v) => v.as_u64().unwrap_or(0),
            None => 0,
        };
        Some(FileLink {
            url: file.get("url")?.as_str()?.to_owned(),
            kind: file
                .get("kind")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            size,
            filename: file.get("name")?.as_str()?.to_owned(),
        })
    }

    pub fn as_html(&self) -> String {
        anchor(&self.url, &escape_html(&self.filename), None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLink {
    pub url: String,
}

impl ImageLink {
    pub fn parse(json: &Value) -> Option<ImageLink> {
        Some(ImageLink {
            url: json.get("image")?.get("url")?.as_str()?.to_owned(),
        })
    }
}

/// A link to another document in the repository.
///
/// When the caller requested link expansion, `fragments` carries the linked
/// document's own fields, and the link exposes the same fragment-access
/// surface as a full document (see [`crate::document::WithFragments`]).
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLink {
    pub id: String,
    pub uid: Option<String>,
    pub doc_type: String,
    pub tags: Vec<String>,
    pub slug: String,
    pub lang: String,
    pub is_broken: bool,
    pub fragments: FragmentMap,
}

impl DocumentLink {
    /// The target id is structurally required: a link payload without one
    /// violates the schema contract and is an error, not an absence.
    pub fn parse(json: &Value, opts: &DecodeOptions) -> Result<DocumentLink, DecodeError> {
        let document = json
            .get("document")
            .filter(|d| d.is_object())
            .ok_or(DecodeError::MissingField("document"))?;
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingField("document.id"))?
            .to_owned();
        let doc_type = document
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let tags = match json.get("tags").or_else(|| document.get("tags")) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        };
        let fragments = match document.get("data") {
            Some(data) => crate::document::parse_fragment_fields(&doc_type, data, opts)?,
            None => FragmentMap::new(),
        };
        Ok(DocumentLink {
            id,
            uid: document.get("uid").and_then(Value::as_str).map(str::to_owned),
            doc_type,
            tags,
            slug: document
                .get("slug")
                .and_then(Value::as_str)
                .unwrap_or("-")
                .to_owned(),
            lang: document
                .get("lang")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            is_broken: json.get("isBroken").and_then(Value::as_bool).unwrap_or(false),
            fragments,
        })
    }

    /// `#broken` for broken links; the resolver is never consulted for them.
    pub fn resolve_url(&self, resolver: &dyn LinkResolver) -> String {
        if self.is_broken {
            "#broken".to_owned()
        } else {
            resolver.resolve(self)
        }
    }

    pub fn as_html(&self, resolver: &dyn LinkResolver) -> String {
        let title = if self.is_broken {
            None
        } else {
            resolver.title(self)
        };
        anchor(
            &self.resolve_url(resolver),
            &escape_html(&self.slug),
            None,
            title.as_deref(),
        )
    }
}

/// Decodes a kind-tagged link object (`{"type": "Link.web", "value": ...}`),
/// as found in hyperlink span data and image `linkTo` fields.
pub(crate) fn parse_link(
    json: &Value,
    opts: &DecodeOptions,
) -> Result<Option<Link>, DecodeError> {
    let link_type = match json.get("type").and_then(Value::as_str) {
        Some(t) => t,
        None => return Ok(None),
    };
    let value = json.get("value").unwrap_or(&Value::Null);
    match link_type {
        "Link.web" => Ok(WebLink::parse(value).map(Link::Web)),
        "Link.file" => Ok(FileLink::parse(value).map(Link::File)),
        "Link.image" => Ok(ImageLink::parse(value).map(Link::Image)),
        "Link.document" => DocumentLink::parse(value, opts).map(|l| Some(Link::Document(l))),
        _ => Ok(None),
    }
}
