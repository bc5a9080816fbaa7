//! Decode a document payload and render every field to HTML.
//!
//! Run:  cargo run --example render -p prismic-content

use prismic::{resolver_fn, Document, WithFragments};
use serde_json::json;

fn main() {
    let payload = json!({
        "id": "UlfoxUnM0wkXYXbX",
        "uid": "chocolate-eclair",
        "type": "article",
        "tags": ["Featured"],
        "slugs": ["chocolate-eclair"],
        "lang": "en-us",
        "data": {
            "article": {
                "title": {
                    "type": "StructuredText",
                    "value": [
                        {"type": "heading1", "text": "Chocolate Eclair", "spans": []}
                    ]
                },
                "price": {"type": "Number", "value": 2.5},
                "body": {
                    "type": "StructuredText",
                    "value": [
                        {
                            "type": "paragraph",
                            "text": "A classic, made with love.",
                            "spans": [
                                {"type": "strong", "start": 2, "end": 9}
                            ]
                        }
                    ]
                }
            }
        }
    });

    let doc = match Document::from_json(&payload) {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("decode failed: {err}");
            std::process::exit(1);
        }
    };

    let resolver = resolver_fn(|link| format!("/{}/{}", link.doc_type, link.id));

    println!("document {} ({})", doc.id, doc.slug());
    for (path, _) in &doc.fragments {
        println!("  {:<16} {}", path, doc.get_html(path, &resolver, None));
    }
}
