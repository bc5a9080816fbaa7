//! Slice-zone decoding and rendering for both the deprecated single-value
//! slice shape and the composite repeat/non-repeat shape.

use std::fs;
use std::path::Path;

use prismic::{resolver_fn, Document, LinkResolver, Slice, WithFragments};
use serde_json::Value;

fn fixture(name: &str) -> Value {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&text).unwrap()
}

fn resolver() -> impl LinkResolver {
    resolver_fn(|link| format!("http://localhost/{}/{}", link.doc_type, link.id))
}

#[test]
fn simple_slices_decode_with_their_types() {
    let doc = Document::from_json(&fixture("simple_slices.json")).unwrap();
    let zone = doc.get_slice_zone("article.blocks").unwrap();
    let types: Vec<&str> = zone.slices.iter().map(Slice::slice_type).collect();
    assert_eq!(types, ["features", "text"]);
    assert!(zone
        .slices
        .iter()
        .all(|slice| matches!(slice, Slice::Simple { .. })));
}

#[test]
fn simple_slices_render_their_wrapped_fragments() {
    let doc = Document::from_json(&fixture("simple_slices.json")).unwrap();
    let html = doc.get_html("article.blocks", &resolver(), None);
    assert_eq!(
        html,
        "<div data-slicetype=\"features\" class=\"slice\">\
         <section data-field=\"illustration\">\
         <img alt=\"\" src=\"https://wroomdev.s3.amazonaws.com/toto/db3775edb44f9818c54baa72bbfc8d3d6394b6ef_hsf_evilsquall.jpg\" width=\"4285\" height=\"709\" />\
         </section>\
         <section data-field=\"title\">\
         <span class=\"text\">c&#39;est un bloc features</span>\
         </section>\
         </div>\
         <div data-slicetype=\"text\" class=\"slice\">\
         <p>C&#39;est un bloc content</p>\
         </div>"
    );
}

#[test]
fn composite_slices_split_primary_and_repeated_items() {
    let doc = Document::from_json(&fixture("composite_slices.json")).unwrap();
    let zone = doc.get_slice_zone("page.page_content").unwrap();
    assert_eq!(zone.slices.len(), 2);

    match &zone.slices[0] {
        Slice::Composite {
            label,
            items,
            primary,
            ..
        } => {
            assert_eq!(label.as_deref(), Some("levi-label"));
            assert!(items.items.is_empty());
            assert!(primary.get_structured_text("rich_text").is_some());
        }
        other => panic!("unexpected slice shape: {:?}", other),
    }

    match &zone.slices[1] {
        Slice::Composite { items, primary, .. } => {
            assert_eq!(items.items.len(), 2);
            assert!(primary.get_structured_text("gallery_title").is_some());
            assert_eq!(items.items[0].get_image("image").unwrap().main().width, 267);
        }
        other => panic!("unexpected slice shape: {:?}", other),
    }
}

#[test]
fn composite_slices_render_label_primary_then_items() {
    let doc = Document::from_json(&fixture("composite_slices.json")).unwrap();
    let html = doc.get_html("page.page_content", &resolver(), None);
    assert_eq!(
        html,
        "<div data-slicetype=\"text\" class=\"slice levi-label\">\
         <section data-field=\"rich_text\">\
         <p>Here is paragraph 1.</p><p>Here is paragraph 2.</p>\
         </section>\
         </div>\
         <div data-slicetype=\"image_gallery\" class=\"slice\">\
         <section data-field=\"gallery_title\"><h2>Image Gallery</h2></section>\
         <section data-field=\"image\">\
         <img alt=\"\" src=\"https://prismic-io.s3.amazonaws.com/levi-templeting%2Fdc0bfab3-d222-44a6-82b8-c74f8cdc6a6b_200_s.gif\" width=\"267\" height=\"200\" />\
         </section>\
         <section data-field=\"image\">\
         <img alt=\"\" src=\"https://prismic-io.s3.amazonaws.com/levi-templeting/83c03dac4a604ac2e97e285e60034c641abd73b6_image2.jpg\" width=\"400\" height=\"369\" />\
         </section>\
         </div>"
    );
}
