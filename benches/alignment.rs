//! Performance benchmarks for corpus alignment.
//!
//! Run with: `cargo bench --bench alignment`
//!
//! The fuzzy benchmarks exercise the Levenshtein threshold test on every
//! token pair, which dominates once exact matching stops short-circuiting.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use variant_graph_kernel::{align_corpus, AlignerOptions, SourceRecord};

/// Build a corpus of `n` sentence variants over a small shared vocabulary.
///
/// Every variant shares most of its tokens with its neighbors while rotating
/// a few substitutions in, which keeps the merge machinery busy.
fn make_corpus(n: usize) -> Vec<SourceRecord> {
    const SUBJECTS: [&str; 4] = ["cat", "kat", "dog", "fox"];
    const VERBS: [&str; 3] = ["sat", "sate", "stood"];
    const PLACES: [&str; 3] = ["mat", "chair", "floor"];

    (0..n)
        .map(|i| {
            let text = format!(
                "the {} {} quietly on the {}",
                SUBJECTS[i % SUBJECTS.len()],
                VERBS[i % VERBS.len()],
                PLACES[i % PLACES.len()],
            );
            SourceRecord::new(format!("edition_{i}"), text)
        })
        .collect()
}

fn bench_exact_alignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("align_exact");
    for n in [4usize, 8, 16] {
        let corpus = make_corpus(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &corpus, |b, corpus| {
            b.iter(|| {
                let alignment =
                    align_corpus(black_box(corpus), AlignerOptions::default()).unwrap();
                black_box(alignment.graph().vertex_count())
            });
        });
    }
    group.finish();
}

fn bench_fuzzy_alignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("align_fuzzy");
    for n in [4usize, 8, 16] {
        let corpus = make_corpus(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &corpus, |b, corpus| {
            b.iter(|| {
                let alignment =
                    align_corpus(black_box(corpus), AlignerOptions::fuzzy(0.4)).unwrap();
                black_box(alignment.graph().vertex_count())
            });
        });
    }
    group.finish();
}

fn bench_decomposition(c: &mut Criterion) {
    let corpus = make_corpus(16);
    let alignment = align_corpus(&corpus, AlignerOptions::default()).unwrap();
    c.bench_function("decompose_16", |b| {
        b.iter(|| black_box(alignment.decompose("edition_0").unwrap()));
    });
}

criterion_group!(
    benches,
    bench_exact_alignment,
    bench_fuzzy_alignment,
    bench_decomposition
);
criterion_main!(benches);
