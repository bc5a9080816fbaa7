//! Image fragments: a main view plus named alternate views.

use indexmap::IndexMap;
use serde_json::Value;

use super::link::{parse_link, Link};
use super::DecodeOptions;
use crate::html::{anchor, escape_html, LinkResolver};

/// One rendition of an image: URL, pixel dimensions, and optional alt
/// text, copyright, and link target.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub url: String,
    pub width: u64,
    pub height: u64,
    pub alt: Option<String>,
    pub copyright: Option<String>,
    pub link_to: Option<Link>,
}

impl View {
    pub fn parse(json: &Value, opts: &DecodeOptions) -> Option<View> {
        let dimensions = json.get("dimensions")?;
        let link_to = json
            .get("linkTo")
            .map(|l| parse_link(l, opts))
            .and_then(Result::ok)
            .flatten();
        Some(View {
            url: json.get("url")?.as_str()?.to_owned(),
            width: dimensions.get("width")?.as_u64()?,
            height: dimensions.get("height")?.as_u64()?,
            alt: json.get("alt").and_then(Value::as_str).map(str::to_owned),
            copyright: json
                .get("copyright")
                .and_then(Value::as_str)
                .map(str::to_owned),
            link_to,
        })
    }

    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// `<img>` tag, wrapped in `<a>` when the view carries a link target.
    /// A broken document-link target degrades to `href="#broken"`.
    pub fn as_html(&self, resolver: &dyn LinkResolver) -> String {
        let img = format!(
            "<img alt=\"{}\" src=\"{}\" width=\"{}\" height=\"{}\" />",
            escape_html(self.alt.as_deref().unwrap_or_default()),
            self.url,
            self.width,
            self.height
        );
        match &self.link_to {
            Some(link) => anchor(&link.url(resolver), &img, None, None),
            None => img,
        }
    }
}

/// An image field: the `main` view plus any named views defined by the
/// content type (thumbnails, crops).
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    main: View,
    views: IndexMap<String, View>,
}

impl Image {
    pub fn new(main: View, views: IndexMap<String, View>) -> Image {
        Image { main, views }
    }

    pub fn parse(json: &Value, opts: &DecodeOptions) -> Option<Image> {
        let main = View::parse(json.get("main")?, opts)?;
        let mut views = IndexMap::new();
        if let Some(Value::Object(raw_views)) = json.get("views") {
            for (name, raw) in raw_views {
                if let Some(view) = View::parse(raw, opts) {
                    views.insert(name.clone(), view);
                }
            }
        }
        Some(Image { main, views })
    }

    pub fn main(&self) -> &View {
        &self.main
    }

    /// `"main"` names the main view; any other name looks up the named
    /// alternate views.
    pub fn get_view(&self, name: &str) -> Option<&View> {
        if name == "main" {
            Some(&self.main)
        } else {
            self.views.get(name)
        }
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.get_view(name).is_some()
    }

    pub fn as_html(&self, resolver: &dyn LinkResolver) -> String {
        self.main.as_html(resolver)
    }
}
