use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use open_bracket::bracket::{BracketBuilder, ByePlacement, MatchStatus, ProgressionEngine};
use open_bracket::draw::{Competitor, SeedPolicy, Seeder};

fn field(n: usize) -> Vec<Competitor> {
    (1..=n as i64)
        .map(|id| Competitor {
            id,
            display_name: format!("competitor {id}"),
            club_name: None,
            is_team: false,
            members: Vec::new(),
        })
        .collect()
}

/// Benchmark seed assignment for growing field sizes
fn bench_seeding(c: &mut Criterion) {
    let mut group = c.benchmark_group("seed_random");
    for n in [16usize, 64, 256] {
        let pool = field(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &pool, |b, pool| {
            b.iter(|| Seeder::seed(pool, &SeedPolicy::Random, 42).unwrap());
        });
    }
    group.finish();
}

/// Benchmark bracket construction including bye resolution
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("bracket_build");
    for n in [16usize, 100, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                BracketBuilder::build(1, field(n), ByePlacement::Distributed, 42).unwrap()
            });
        });
    }
    group.finish();
}

/// Benchmark playing a 128-competitor bracket to completion
fn bench_full_progression(c: &mut Criterion) {
    c.bench_function("full_progression_128", |b| {
        b.iter(|| {
            let mut bracket =
                BracketBuilder::build(1, field(128), ByePlacement::TopSeeds, 42).unwrap();
            for round in 1..=bracket.total_rounds {
                for position in 1..=bracket.matches_in_round(round) as u32 {
                    let m = bracket.match_at(round, position).unwrap();
                    if m.is_resolved() {
                        continue;
                    }
                    let m = bracket.match_at_mut(round, position).unwrap();
                    m.score_a = 1;
                    m.score_b = 0;
                    m.status = MatchStatus::Completed;
                    ProgressionEngine::propagate(&mut bracket, round, position).unwrap();
                }
            }
            bracket
        });
    });
}

criterion_group!(benches, bench_seeding, bench_build, bench_full_progression);
criterion_main!(benches);
