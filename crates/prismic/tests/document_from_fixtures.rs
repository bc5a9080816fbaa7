//! Document assembly and access-surface tests driven by a full payload
//! fixture.

use std::fs;
use std::path::Path;

use prismic::{resolver_fn, Document, Fragment, Link, LinkResolver, WithFragments};
use serde_json::{json, Value};

fn fixture(name: &str) -> Value {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&text).unwrap()
}

fn article() -> Document {
    Document::from_json(&fixture("document.json")).unwrap()
}

fn resolver() -> impl LinkResolver {
    resolver_fn(|link| format!("http://localhost/{}/{}", link.doc_type, link.id))
}

#[test]
fn metadata_is_decoded() {
    let doc = article();
    assert_eq!(doc.id, "UlfoxUnM0wkXYXbX");
    assert_eq!(doc.uid.as_deref(), Some("chocolate-eclair"));
    assert_eq!(doc.doc_type, "article");
    assert_eq!(doc.lang, "en-us");
    assert!(doc.tags.contains("Featured"));
    assert!(doc.tags.contains("Macaron"));
    assert_eq!(
        doc.first_publication_date.unwrap().to_rfc3339(),
        "2017-01-13T11:45:21+00:00"
    );
    assert_eq!(
        doc.last_publication_date.unwrap().to_rfc3339(),
        "2017-02-21T16:05:19+00:00"
    );

    let alt = &doc.alternate_languages[0];
    assert_eq!(alt.id, "WPeD2SoAACsABzOC");
    assert_eq!(alt.uid.as_deref(), Some("eclair-au-chocolat"));
    assert_eq!(alt.lang, "fr-fr");
}

#[test]
fn slugs_are_url_decoded_and_first_is_canonical() {
    let doc = article();
    assert_eq!(doc.slug(), "chocolate eclair");
    assert_eq!(doc.slugs[1], "old-slug");
}

#[test]
fn slug_falls_back_to_dash_without_slug_history() {
    let doc = Document::from_json(&json!({
        "id": "X", "type": "article", "tags": [], "slugs": []
    }))
    .unwrap();
    assert_eq!(doc.slug(), "-");
}

#[test]
fn scalar_fields_decode_under_their_singular_keys() {
    let doc = article();
    assert_eq!(
        doc.get_text("article.author").as_deref(),
        Some("John M. Martelle, Fine Pastry Magazine")
    );
    assert_eq!(doc.get_number("article.price"), Some(2.5));
    assert_eq!(doc.get_color("article.background").unwrap().hex(), "#1a2b3c");
    assert_eq!(doc.get_boolean("article.online"), Some(true));
    assert_eq!(doc.get_text("article.flavour").as_deref(), Some("Chocolate"));
    assert_eq!(
        doc.get_date("article.birthdate").unwrap().to_string(),
        "2013-10-20"
    );
    assert_eq!(
        doc.get_timestamp("article.updated").unwrap().to_rfc3339(),
        "2014-06-18T15:30:00+00:00"
    );
    let point = doc.get_geo_point("article.location").unwrap();
    assert_eq!(point.latitude, 48.877108);
    assert_eq!(point.longitude, 2.333879);
}

#[test]
fn malformed_color_is_absent_not_an_error() {
    let doc = article();
    assert!(doc.get("article.badcolor").is_none());
}

#[test]
fn unknown_kind_keeps_raw_payload_round_trippable() {
    let doc = article();
    let raw = doc.get_raw("article.gallery").unwrap();
    assert_eq!(raw, &json!({"slides": [1, 2, 3]}));
}

#[test]
fn repeatable_field_decodes_under_indexed_keys() {
    let doc = article();
    assert!(matches!(
        doc.get("article.related[0]"),
        Some(Fragment::Link(Link::Document(_)))
    ));
    assert!(matches!(
        doc.get("article.related[2]"),
        Some(Fragment::Link(Link::Web(_)))
    ));

    let all = doc.get_all("article.related");
    assert_eq!(all.len(), 3);
    match all[1] {
        Fragment::Link(Link::Document(link)) => assert_eq!(link.slug, "champs-elysees"),
        other => panic!("unexpected fragment: {:?}", other),
    }
}

#[test]
fn structured_text_array_decodes_as_one_fragment() {
    let doc = article();
    let title = doc.get_structured_text("article.title").unwrap();
    assert_eq!(title.blocks.len(), 1);
    assert_eq!(doc.get_text("article.title").as_deref(), Some("Chocolate Eclair"));
    assert!(doc.get("article.title[0]").is_none());
}

#[test]
fn body_renders_with_nested_spans_and_resolved_links() {
    let doc = article();
    let html = doc.get_html("article.body", &resolver(), None);
    assert_eq!(
        html,
        "<p>A <strong>classic</strong>, made with \
         <a href=\"http://localhost/job-offer/UlfoxUnM0wkXYXba\">love</a>.</p>"
    );
}

#[test]
fn group_renders_items_as_field_sections() {
    let doc = article();
    let html = doc.get_html("article.chapters", &resolver(), None);
    assert_eq!(
        html,
        "<section data-field=\"linktodoc\"><a href=\"http://localhost/doc/UrDejAEAAFwMyrW9\">installing-meta-micro</a></section>\
         <section data-field=\"desc\"><p>Just testing.</p></section>\
         <section data-field=\"linktodoc\"><a href=\"http://localhost/doc/UrDmKgEAALwMyrXA\">using-meta-micro</a></section>"
    );
}

#[test]
fn whole_document_renders_sections_in_source_order() {
    let doc = article();
    let html = doc.as_html(&resolver(), None);
    assert!(html.starts_with(
        "<section data-field=\"article.title\"><h1>Chocolate Eclair</h1></section>"
    ));
    assert!(html.contains(
        "<section data-field=\"article.price\"><span class=\"number\">2.5</span></section>"
    ));
    assert!(html.contains("<section data-field=\"article.birthdate\"><time>2013-10-20</time></section>"));
    assert!(html.contains("<section data-field=\"article.online\"><span class=\"boolean\">true</span></section>"));
    // Kinds without an HTML form render empty sections rather than failing.
    assert!(html.contains("<section data-field=\"article.location\"></section>"));
    assert!(html.contains("<section data-field=\"article.gallery\"></section>"));
    // Source order is preserved across sections.
    let author = html.find("article.author").unwrap();
    let price = html.find("article.price").unwrap();
    let body = html.find("article.body").unwrap();
    assert!(author < price && price < body);
}

#[test]
fn linked_documents_walks_fields_spans_and_groups() {
    let doc = article();
    let ids: Vec<&str> = doc
        .linked_documents()
        .iter()
        .map(|link| link.id.as_str())
        .collect();
    assert_eq!(
        ids,
        [
            "UlfoxUnM0wkXYXbb",
            "UlfoxUnM0wkXYXbP",
            "UlfoxUnM0wkXYXba",
            "UrDejAEAAFwMyrW9",
            "UrDmKgEAALwMyrXA",
        ]
    );
}

#[test]
fn document_converts_to_a_document_link() {
    let doc = article();
    let link = doc.as_document_link();
    assert_eq!(link.id, doc.id);
    assert_eq!(link.slug, "chocolate eclair");
    assert!(!link.is_broken);
    assert_eq!(
        link.get_text("article.author"),
        doc.get_text("article.author")
    );
}
