use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use mathchamp::engine::level::{LEVELS, level_config};
use mathchamp::generator::arithmetic::generate_problem;
use mathchamp::generator::distractors::pick_distractors;

fn bench_generate_per_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_problem");
    for config in &LEVELS {
        let mut rng = SmallRng::seed_from_u64(7);
        group.bench_function(format!("level {}", config.level), |b| {
            b.iter(|| generate_problem(black_box(config), &mut rng))
        });
    }
    group.finish();
}

fn bench_full_level(c: &mut Criterion) {
    let config = level_config(10);
    let mut rng = SmallRng::seed_from_u64(11);

    c.bench_function("master level question set (20 problems)", |b| {
        b.iter(|| {
            for _ in 0..config.question_count {
                black_box(generate_problem(config, &mut rng));
            }
        })
    });
}

fn bench_distractors(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(3);

    c.bench_function("pick_distractors (answer 0)", |b| {
        b.iter(|| pick_distractors(black_box(0), 3, &mut rng))
    });
    c.bench_function("pick_distractors (answer 250)", |b| {
        b.iter(|| pick_distractors(black_box(250), 3, &mut rng))
    });
}

criterion_group!(
    benches,
    bench_generate_per_level,
    bench_full_level,
    bench_distractors
);
criterion_main!(benches);
