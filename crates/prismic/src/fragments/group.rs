//! Repeatable containers: groups of sub-documents and polymorphic slices.

use serde_json::Value;

use super::{decode_fragment, DecodeOptions, Fragment, FragmentMap};
use crate::document::WithFragments;
use crate::error::DecodeError;
use crate::html::{fragment_html, HtmlSerializer, LinkResolver};

/// One repetition of a group field: a fragment map without document
/// metadata, wholly owned by its containing group or slice.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupItem {
    pub fragments: FragmentMap,
}

impl GroupItem {
    /// Each field is a kind-tagged object: `{"type": ..., "value": ...}`.
    /// Fields whose decode result is absent are skipped.
    pub fn parse(json: &Value, opts: &DecodeOptions) -> Result<GroupItem, DecodeError> {
        let mut fragments = FragmentMap::new();
        if let Value::Object(fields) = json {
            for (name, raw) in fields {
                let kind = match raw.get("type").and_then(Value::as_str) {
                    Some(kind) => kind,
                    None => continue,
                };
                let value = raw.get("value").unwrap_or(&Value::Null);
                if let Some(fragment) = decode_fragment(kind, value, opts)? {
                    fragments.insert(name.clone(), fragment);
                }
            }
        }
        Ok(GroupItem { fragments })
    }
}

impl WithFragments for GroupItem {
    fn fragments(&self) -> &FragmentMap {
        &self.fragments
    }
}

/// An ordered sequence of group items.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub items: Vec<GroupItem>,
}

impl Group {
    pub fn parse(json: &Value, opts: &DecodeOptions) -> Result<Option<Group>, DecodeError> {
        let raw = match json.as_array() {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let mut items = Vec::with_capacity(raw.len());
        for item in raw {
            items.push(GroupItem::parse(item, opts)?);
        }
        Ok(Some(Group { items }))
    }

    pub fn as_html(
        &self,
        resolver: &dyn LinkResolver,
        serializer: Option<&dyn HtmlSerializer>,
    ) -> String {
        self.items
            .iter()
            .map(|item| item.as_html(resolver, serializer))
            .collect()
    }
}

/// A content section of a slice zone. The simple shape (deprecated) wraps a
/// single fragment; the composite shape carries repeatable items plus a
/// non-repeating primary item.
#[derive(Debug, Clone, PartialEq)]
pub enum Slice {
    Simple {
        slice_type: String,
        label: Option<String>,
        value: Fragment,
    },
    Composite {
        slice_type: String,
        label: Option<String>,
        items: Group,
        primary: GroupItem,
    },
}

impl Slice {
    pub fn slice_type(&self) -> &str {
        match self {
            Slice::Simple { slice_type, .. } | Slice::Composite { slice_type, .. } => slice_type,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Slice::Simple { label, .. } | Slice::Composite { label, .. } => label.as_deref(),
        }
    }

    fn parse(json: &Value, opts: &DecodeOptions) -> Result<Option<Slice>, DecodeError> {
        let slice_type = match json.get("slice_type").and_then(Value::as_str) {
            Some(t) => t.to_owned(),
            None => return Ok(None),
        };
        let label = json
            .get("slice_label")
            .and_then(Value::as_str)
            .map(str::to_owned);

        // Deprecated simple shape: a single kind-tagged value.
        if let Some(value) = json.get("value").filter(|v| !v.is_null()) {
            let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
            let fragment = decode_fragment(kind, value.get("value").unwrap_or(&Value::Null), opts)?;
            return Ok(fragment.map(|value| Slice::Simple {
                slice_type,
                label,
                value,
            }));
        }

        let items = match json.get("repeat") {
            Some(repeat) => Group::parse(repeat, opts)?.unwrap_or(Group { items: Vec::new() }),
            None => Group { items: Vec::new() },
        };
        let primary = match json.get("non-repeat") {
            Some(primary) => GroupItem::parse(primary, opts)?,
            None => GroupItem {
                fragments: FragmentMap::new(),
            },
        };
        Ok(Some(Slice::Composite {
            slice_type,
            label,
            items,
            primary,
        }))
    }

    pub fn as_html(
        &self,
        resolver: &dyn LinkResolver,
        serializer: Option<&dyn HtmlSerializer>,
    ) -> String {
        let label_code = match self.label() {
            Some(label) => format!(" {}", label),
            None => String::new(),
        };
        let body = match self {
            Slice::Simple { value, .. } => fragment_html(value, resolver, serializer),
            Slice::Composite { items, primary, .. } => {
                let mut body = primary.as_html(resolver, serializer);
                body.push_str(&items.as_html(resolver, serializer));
                body
            }
        };
        format!(
            "<div data-slicetype=\"{}\" class=\"slice{}\">{}</div>",
            self.slice_type(),
            label_code,
            body
        )
    }
}

/// An ordered sequence of slices.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceZone {
    pub slices: Vec<Slice>,
}

impl SliceZone {
    pub fn parse(json: &Value, opts: &DecodeOptions) -> Result<Option<SliceZone>, DecodeError> {
        let raw = match json.as_array() {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let mut slices = Vec::with_capacity(raw.len());
        for slice in raw {
            if let Some(slice) = Slice::parse(slice, opts)? {
                slices.push(slice);
            }
        }
        Ok(Some(SliceZone { slices }))
    }

    pub fn as_html(
        &self,
        resolver: &dyn LinkResolver,
        serializer: Option<&dyn HtmlSerializer>,
    ) -> String {
        self.slices
            .iter()
            .map(|slice| slice.as_html(resolver, serializer))
            .collect()
    }
}
