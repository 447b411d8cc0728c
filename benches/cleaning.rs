// Benchmarks for fragment cleaning and serialization.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use gfm_fixtures::clean;

fn heading(text: &str) -> String {
    format!(
        r##"<div class="markdown-heading" dir="auto"><h2 class="heading-element" dir="auto">{text}</h2><a id="user-content-{text}" class="anchor" aria-label="Permalink: {text}" href="#{text}"><svg class="octicon octicon-link" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="m7.775 3.275"></path></svg></a></div>"##
    )
}

fn bench_simple(c: &mut Criterion) {
    let html = r#"<p dir="auto">This is a <strong>simple</strong> paragraph.</p>"#;
    c.bench_function("simple_fragment", |b| {
        b.iter(|| clean(black_box(html)));
    });
}

fn bench_decorated(c: &mut Criterion) {
    let mut html = String::new();
    for index in 0..50 {
        html.push_str(&heading(&format!("section-{index}")));
        html.push('\n');
        html.push_str(concat!(
            r#"<p dir="auto"><a target="_blank" rel="noopener noreferrer nofollow" href="https://camo.githubusercontent.com/1">"#,
            r#"<img src="https://camo.githubusercontent.com/1" data-canonical-src="https://example.com/1.png" style="max-width: 100%;"></a> "#,
            r#"<a class="user-mention notranslate" data-hovercard-type="user" href="https://github.com/wooorm">@wooorm</a></p>"#,
            "\n",
            r#"<ul class="contains-task-list"><li class="task-list-item"><input type="checkbox" id="" disabled="" class="task-list-item-checkbox" checked=""> done</li></ul>"#,
            "\n",
        ));
    }
    c.bench_function("decorated_fragment", |b| {
        b.iter(|| clean(black_box(&html)));
    });
}

criterion_group!(benches, bench_simple, bench_decorated);
criterion_main!(benches);
