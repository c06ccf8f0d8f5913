use criterion::{black_box, criterion_group, criterion_main, Criterion};

use confscore_core::aggregate::{score_participant, Aggregation};
use confscore_core::model::{Group, Participant, Response, DEFAULT_QUESTIONS};
use confscore_core::scoring::ScoringScheme;

fn make_participant(seed: usize) -> Participant {
    let responses = (0..DEFAULT_QUESTIONS)
        .map(|i| {
            let correct = u8::from((i + seed) % 3 != 0);
            let confidence = ((i * 7 + seed) % 7) as u8 + 1;
            Response::new(correct, confidence).unwrap()
        })
        .collect();
    Participant::new(format!("p{seed}"), Group::Control, responses)
}

fn bench_item_scores(c: &mut Criterion) {
    let mut group = c.benchmark_group("item_score");
    let response = Response::new(1, 5).unwrap();

    for scheme in [ScoringScheme::Signed, ScoringScheme::Brier] {
        group.bench_function(format!("{scheme}"), |b| {
            b.iter(|| {
                (
                    scheme.abs_score(black_box(&response)),
                    scheme.cws_score(black_box(&response)),
                )
            })
        });
    }

    group.finish();
}

fn bench_score_participant(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_participant");
    let participant = make_participant(3);

    group.bench_function("signed_mean", |b| {
        b.iter(|| {
            score_participant(
                black_box(&participant),
                DEFAULT_QUESTIONS,
                ScoringScheme::Signed,
                Aggregation::Mean,
            )
        })
    });

    group.bench_function("brier_sum", |b| {
        b.iter(|| {
            score_participant(
                black_box(&participant),
                DEFAULT_QUESTIONS,
                ScoringScheme::Brier,
                Aggregation::Sum,
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_item_scores, bench_score_participant);
criterion_main!(benches);
