use criterion::{Criterion, criterion_group, criterion_main};
use rumdown_lib::{Markdown, Options, SafeMode};
use std::hint::black_box;

fn generate_document(sections: usize) -> String {
    let mut doc = String::new();
    for i in 0..sections {
        doc.push_str(&format!("## Section {i}\n\n"));
        doc.push_str("Some *emphasis*, some **strong** text and a [link](http://example.com/page \"Title\").\n");
        doc.push_str("Inline `code`, an escaped \\* star and AT&amp;T.\n\n");
        doc.push_str("* first item\n* second item\n    * nested item\n\n");
        doc.push_str("> quoted text\n> continues\n\n");
        doc.push_str("    fn main() {}\n\n");
        doc.push_str("<div>\nraw block\n</div>\n\n");
        doc.push_str("| a | b |\n|---|--:|\n| 1 | 2 |\n\n");
    }
    doc
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    group.sample_size(20);

    let content = generate_document(100);
    for mode in [SafeMode::Default, SafeMode::Escape] {
        let markdown = Markdown::new(Options {
            safe_mode: mode,
            extensions: vec!["tables".to_string()],
            ..Default::default()
        })
        .unwrap();
        group.bench_function(format!("document_{mode}"), |b| {
            b.iter(|| {
                let html = markdown.convert(black_box(&content)).unwrap();
                black_box(html);
            });
        });
    }

    group.finish();
}

fn bench_inline_heavy(c: &mut Criterion) {
    let markdown = Markdown::new(Options::default()).unwrap();
    let paragraph = "*a* **b** `c` [d](e) <f> &g; _h_ ".repeat(200);
    c.bench_function("inline_heavy_paragraph", |b| {
        b.iter(|| black_box(markdown.convert(black_box(&paragraph)).unwrap()));
    });
}

criterion_group!(benches, bench_convert, bench_inline_heavy);
criterion_main!(benches);
