use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lessonforge_core::repair::JsonRepairPipeline;

fn flashcards(count: usize) -> String {
    let cards: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"front_content": "Term {i}", "back_content": "Definition of term {i}, with a comma and \"quotes\""}}"#
            )
        })
        .collect();
    format!(r#"{{"flashcards": [{}]}}"#, cards.join(", "))
}

fn bench_repair(c: &mut Criterion) {
    let pipeline = JsonRepairPipeline::new();
    let valid = flashcards(50);
    let fenced = format!("Here you go:\n```json\n{}\n```", valid);
    let truncated = valid[..valid.len() * 2 / 3].to_string();
    let quoted = valid.replace("\\\"", "\"");

    let mut group = c.benchmark_group("repair");
    group.bench_function("valid", |b| b.iter(|| pipeline.repair(black_box(&valid))));
    group.bench_function("fenced", |b| b.iter(|| pipeline.repair(black_box(&fenced))));
    group.bench_function("truncated", |b| b.iter(|| pipeline.repair(black_box(&truncated))));
    group.bench_function("unescaped_quotes", |b| b.iter(|| pipeline.repair(black_box(&quoted))));
    group.bench_function("garbage", |b| {
        b.iter(|| pipeline.repair(black_box("I'm sorry, I can't help with that request.")))
    });
    group.finish();
}

criterion_group!(benches, bench_repair);
criterion_main!(benches);
