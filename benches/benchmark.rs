use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use related_tfidf::{get_related, Document, RelatedConfig, TFIDFVectorizer};

// Deterministic blog-like collection: tags drawn from a skewed pool
fn synthetic_posts(num: usize) -> Vec<Document> {
    let pool: Vec<String> = (0..200).map(|i| format!("tag{i}")).collect();
    let mut state: u32 = 0x9E37_79B9;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };
    (0..num)
        .map(|i| {
            let len = 1 + (next() % 8) as usize;
            let tags = (0..len).map(|_| {
                // 低い番号ほど頻出
                let a = next() as usize % pool.len();
                let b = next() as usize % pool.len();
                pool[a.min(b)].clone()
            });
            Document::new(format!("post-{i}"), tags)
        })
        .collect()
}

fn related_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_related");
    for num in [50, 500, 2000] {
        let posts = synthetic_posts(num);
        group.bench_with_input(BenchmarkId::from_parameter(num), &posts, |b, posts| {
            b.iter(|| get_related(black_box("post-0"), posts, 3));
        });
    }
    group.finish();

    let posts = synthetic_posts(2000);
    c.bench_function("vectorize_2000", |b| {
        b.iter(|| TFIDFVectorizer::<Document>::new(black_box(&posts)));
    });

    let vectorizer: TFIDFVectorizer<Document> = TFIDFVectorizer::new(&posts);
    let sequential = RelatedConfig::default().with_count(10);
    let parallel = RelatedConfig {
        parallel: true,
        ..sequential.clone()
    };
    c.bench_function("related_sequential_2000", |b| {
        b.iter(|| vectorizer.related_with(black_box("post-1"), &sequential));
    });
    c.bench_function("related_parallel_2000", |b| {
        b.iter(|| vectorizer.related_with(black_box("post-1"), &parallel));
    });
}

criterion_group!(benches, related_benchmark);
criterion_main!(benches);
