//! The fragment content model: a closed union of every field kind the CMS
//! can emit, plus the kind-tag decoder that builds it from raw JSON.
//!
//! Decoding is deliberately forgiving: content that does not match its
//! declared kind (a malformed color, an unparsable date) is dropped rather
//! than rejected, so forward-incompatible payloads still produce a usable
//! document. Only structurally required data — a document link without a
//! target id — raises a [`DecodeError`].

pub mod group;
pub mod image;
pub mod link;
pub mod structured_text;

use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::error::DecodeError;
pub use group::{Group, GroupItem, Slice, SliceZone};
pub use image::{Image, View};
pub use link::{DocumentLink, FileLink, ImageLink, Link, WebLink};
pub use structured_text::StructuredText;

/// Ordered map from fragment path (`"{type}.{field}"`, optionally
/// `"[{index}]"`-suffixed) to decoded fragment. Insertion order follows the
/// source payload and drives whole-document rendering order.
pub type FragmentMap = IndexMap<String, Fragment>;

/// One decoded content fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text(String),
    Number(f64),
    Color(Color),
    Date(NaiveDate),
    Timestamp(DateTime<FixedOffset>),
    GeoPoint(GeoPoint),
    Embed(Embed),
    Image(Image),
    Link(Link),
    Group(Group),
    SliceZone(SliceZone),
    StructuredText(StructuredText),
    Boolean(bool),
    /// Unrecognized kind tag with a non-null payload; preserves the
    /// original value for round-trip access.
    Raw(Value),
}

/// Number parsing format, kept explicit so decoding never depends on the
/// host's ambient locale. Only consulted when a `Number` payload arrives
/// as a JSON string; JSON numbers decode directly.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub group_separator: Option<char>,
}

impl Default for NumberFormat {
    /// Invariant format: `.` decimal point, `,` grouping.
    fn default() -> Self {
        NumberFormat {
            decimal_separator: '.',
            group_separator: Some(','),
        }
    }
}

impl NumberFormat {
    pub fn parse(&self, text: &str) -> Option<f64> {
        let mut normalized = String::with_capacity(text.len());
        for ch in text.trim().chars() {
            if Some(ch) == self.group_separator {
                continue;
            }
            normalized.push(if ch == self.decimal_separator { '.' } else { ch });
        }
        f64::from_str(&normalized).ok()
    }
}

/// Options threaded through the decoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeOptions {
    pub number_format: NumberFormat,
}

/// An RGB color in `#RRGGBB` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color {
    hex: String,
}

impl Color {
    pub fn parse(json: &Value) -> Option<Color> {
        static HEX: OnceLock<Regex> = OnceLock::new();
        let re = HEX.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());
        let hex = json.as_str()?;
        if re.is_match(hex) {
            Some(Color {
                hex: hex.to_owned(),
            })
        } else {
            None
        }
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn parse(json: &Value) -> Option<GeoPoint> {
        Some(GeoPoint {
            latitude: json.get("latitude")?.as_f64()?,
            longitude: json.get("longitude")?.as_f64()?,
        })
    }
}

/// An oembed fragment. `width`/`height` are present only when the source
/// value is an integer; the full oembed payload is kept for callers that
/// need provider-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub kind: String,
    pub provider: Option<String>,
    pub url: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub html: String,
    pub oembed: Value,
}

impl Embed {
    pub fn parse(json: &Value) -> Option<Embed> {
        let oembed = json.get("oembed")?;
        Some(Embed {
            kind: oembed.get("type")?.as_str()?.to_owned(),
            provider: oembed
                .get("provider_name")
                .and_then(Value::as_str)
                .map(str::to_owned),
            url: oembed.get("embed_url")?.as_str()?.to_owned(),
            width: oembed.get("width").and_then(Value::as_i64),
            height: oembed.get("height").and_then(Value::as_i64),
            html: oembed.get("html")?.as_str()?.to_owned(),
            oembed: oembed.clone(),
        })
    }

    pub fn as_html(&self) -> String {
        let provider_attr = match &self.provider {
            Some(provider) => format!(
                " data-oembed-provider=\"{}\"",
                provider.to_lowercase()
            ),
            None => String::new(),
        };
        format!(
            "<div data-oembed=\"{}\" data-oembed-type=\"{}\"{}>{}</div>",
            self.url,
            self.kind.to_lowercase(),
            provider_attr,
            self.html
        )
    }
}

/// Decodes one fragment from its CMS kind tag and raw value.
///
/// `Ok(None)` means the field is absent from the model (unknown null
/// payload, or content that does not match its declared kind). Unknown
/// tags with a non-null payload decode to [`Fragment::Raw`].
pub fn decode_fragment(
    kind: &str,
    value: &Value,
    opts: &DecodeOptions,
) -> Result<Option<Fragment>, DecodeError> {
    let fragment = match kind {
        "Text" | "Select" => value.as_str().map(|s| Fragment::Text(s.to_owned())),
        "Number" => decode_number(value, &opts.number_format),
        "Color" => Color::parse(value).map(Fragment::Color),
        "Date" => decode_date(value),
        "Timestamp" => decode_timestamp(value),
        "GeoPoint" => GeoPoint::parse(value).map(Fragment::GeoPoint),
        "Embed" => Embed::parse(value).map(Fragment::Embed),
        "Image" => Image::parse(value, opts).map(Fragment::Image),
        "Link.web" => WebLink::parse(value).map(|l| Fragment::Link(Link::Web(l))),
        "Link.file" => FileLink::parse(value).map(|l| Fragment::Link(Link::File(l))),
        "Link.image" => ImageLink::parse(value).map(|l| Fragment::Link(Link::Image(l))),
        "Link.document" => Some(Fragment::Link(Link::Document(DocumentLink::parse(
            value, opts,
        )?))),
        "StructuredText" => StructuredText::parse(value, opts).map(Fragment::StructuredText),
        "Group" => Group::parse(value, opts)?.map(Fragment::Group),
        "SliceZone" => SliceZone::parse(value, opts)?.map(Fragment::SliceZone),
        "Boolean" => value.as_bool().map(Fragment::Boolean),
        _ => {
            if value.is_null() {
                None
            } else {
                Some(Fragment::Raw(value.clone()))
            }
        }
    };
    Ok(fragment)
}

fn decode_number(value: &Value, format: &NumberFormat) -> Option<Fragment> {
    if let Some(n) = value.as_f64() {
        return Some(Fragment::Number(n));
    }
    value
        .as_str()
        .and_then(|s| format.parse(s))
        .map(Fragment::Number)
}

fn decode_date(value: &Value) -> Option<Fragment> {
    let text = value.as_str()?;
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(Fragment::Date)
}

fn decode_timestamp(value: &Value) -> Option<Fragment> {
    let text = value.as_str()?;
    parse_timestamp(text).map(Fragment::Timestamp)
}

pub(crate) fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text).ok()
}
