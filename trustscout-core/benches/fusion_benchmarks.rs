use criterion::{Criterion, black_box, criterion_group, criterion_main};
use trustscout_core::Evidence;
use trustscout_core::research::fusion::{RrfConfig, fuse_ranked_lists, rrf_score};
use trustscout_core::research::report::render;
use trustscout_core::research::{OutputFormat, PipelineSettings, ResearchPipeline};

fn bench_rrf_score(c: &mut Criterion) {
    let three: Vec<Evidence> = (1..=3)
        .map(|rank| Evidence::new("source", "finding", rank))
        .collect();
    c.bench_function("rrf_score_three_evidence", |b| {
        b.iter(|| rrf_score(black_box(&three), black_box(60)))
    });

    let many: Vec<Evidence> = (1..=1000)
        .map(|rank| Evidence::new(format!("source-{rank}"), "finding", rank))
        .collect();
    c.bench_function("rrf_score_1000_evidence", |b| {
        b.iter(|| rrf_score(black_box(&many), black_box(60)))
    });
}

fn bench_fuse_ranked_lists(c: &mut Criterion) {
    let lists: Vec<Vec<String>> = (0..5)
        .map(|offset| (0..200).map(|i| format!("doc-{}", (i + offset * 17) % 300)).collect())
        .collect();

    c.bench_function("fuse_5_lists_of_200", |b| {
        b.iter(|| fuse_ranked_lists(black_box(&lists), RrfConfig::default()))
    });

    c.bench_function("fuse_5_lists_top_10", |b| {
        b.iter(|| fuse_ranked_lists(black_box(&lists), RrfConfig::default().with_top_k(10)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let pipeline = ResearchPipeline::new(None, PipelineSettings::default());

    c.bench_function("pipeline_run_fallback", |b| {
        b.iter(|| runtime.block_on(pipeline.run(black_box("Breast Cancer BRCA1"))))
    });

    let state = runtime.block_on(pipeline.run("Breast Cancer BRCA1"));
    c.bench_function("render_markdown_report", |b| {
        b.iter(|| render(black_box(&state), OutputFormat::Markdown))
    });
}

criterion_group!(
    benches,
    bench_rrf_score,
    bench_fuse_ranked_lists,
    bench_pipeline,
);
criterion_main!(benches);
