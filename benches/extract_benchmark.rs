use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scraper::Html;

use scrape_rendered::{extract, RuleSet};

fn generate_sample_html(rows: usize) -> String {
    let mut html = String::from(
        r#"
        <html>
        <head><title>Product Listing</title></head>
        <body>
            <h1>Catalog</h1>
    "#,
    );

    for i in 0..rows {
        html.push_str(&format!(
            r#"<div class="item"><span class="name">Item {i}</span><span class="price">{i},99 €</span><a href="/item/{i}">view</a></div>"#,
        ));
        html.push('\n');
    }

    html.push_str("</body></html>");
    html
}

fn rules() -> RuleSet {
    serde_json::from_str(
        r#"{
            "fields": {
                "title": { "selector": "h1" }
            },
            "lists": {
                "items": {
                    "selector": ".item",
                    "fields": {
                        "name": { "selector": ".name" },
                        "price": { "selector": ".price", "type": "number" },
                        "link": { "selector": "a", "attr": "href" }
                    }
                }
            }
        }"#,
    )
    .unwrap()
}

fn benchmark_extract(c: &mut Criterion) {
    let rules = rules();

    for rows in [10, 100, 1000] {
        let html = generate_sample_html(rows);
        c.bench_function(&format!("extract_{rows}_rows"), |b| {
            b.iter(|| {
                let document = Html::parse_document(black_box(&html));
                black_box(extract(&document, &rules))
            })
        });
    }
}

criterion_group!(benches, benchmark_extract);
criterion_main!(benches);
