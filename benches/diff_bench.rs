//! Performance benchmarks for palimpsest
//!
//! Tracks end-to-end comparison time over synthetic pages of increasing
//! size, with a realistic mix of unchanged, reworded, and removed
//! paragraphs.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use palimpsest::{compare_documents, CompareOptions};
use std::hint::black_box;

/// Build a synthetic article; when `reword_every` is non-zero, every n-th
/// paragraph gets one word swapped and every (3n)-th paragraph is dropped
fn generate_page(paragraphs: usize, reword_every: usize) -> String {
    let mut body = String::from("<h1>Synthetic article</h1>");
    for i in 0..paragraphs {
        if reword_every != 0 && i % (reword_every * 3) == reword_every {
            continue;
        }
        let verb = if reword_every != 0 && i % reword_every == 0 {
            "revises"
        } else {
            "discusses"
        };
        body.push_str(&format!(
            "<p>Paragraph {i} {verb} topic {i} using a handful of ordinary words \
             so the aligner has realistic sentences to work with</p>"
        ));
    }
    format!("<html><head><title>bench</title></head><body>{body}</body></html>")
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_documents");
    for paragraphs in [10usize, 50, 200] {
        let archived = generate_page(paragraphs, 0);
        let current = generate_page(paragraphs, 7);
        group.bench_with_input(
            BenchmarkId::from_parameter(paragraphs),
            &paragraphs,
            |b, _| {
                b.iter(|| {
                    let report = compare_documents(
                        black_box(&archived),
                        black_box(&current),
                        &CompareOptions::default(),
                    )
                    .unwrap();
                    black_box(report);
                })
            },
        );
    }
    group.finish();
}

fn bench_identity(c: &mut Criterion) {
    let page = generate_page(100, 0);
    c.bench_function("compare_identical_100p", |b| {
        b.iter(|| {
            let report =
                compare_documents(black_box(&page), black_box(&page), &CompareOptions::default())
                    .unwrap();
            black_box(report);
        })
    });
}

criterion_group!(benches, bench_compare, bench_identity);
criterion_main!(benches);
