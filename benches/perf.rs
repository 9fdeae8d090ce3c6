use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use coach_terminal::chat;
use coach_terminal::demo::canned_response;
use coach_terminal::game_mode::GameMode;
use coach_terminal::model::{Capability, parse_envelope, parse_result};
use coach_terminal::narrative;

fn bench_parse_prediction(c: &mut Criterion) {
    let raw = canned_response(Capability::Prediction, &GameMode::league_of_legends()).to_string();
    let mode = GameMode::league_of_legends();
    c.bench_function("prediction_parse", |b| {
        b.iter(|| {
            let result = parse_result(Capability::Prediction, &mode, black_box(&raw)).unwrap();
            black_box(result.capability());
        })
    });
}

fn bench_render_all(c: &mut Criterion) {
    let mode = GameMode::valorant();
    let results: Vec<_> = Capability::ALL
        .iter()
        .map(|cap| {
            let raw = canned_response(*cap, &mode).to_string();
            parse_result(*cap, &mode, &raw).unwrap()
        })
        .collect();

    c.bench_function("render_chat_all_capabilities", |b| {
        b.iter(|| {
            for result in &results {
                let rendered = narrative::render(black_box(result));
                black_box(chat::message(&rendered).len());
            }
        })
    });
}

fn bench_envelope_pipeline(c: &mut Criterion) {
    let raw = serde_json::json!({
        "capability": "macro-review",
        "gameMode": "lol",
        "payload": canned_response(Capability::MacroReview, &GameMode::league_of_legends()),
    })
    .to_string();

    c.bench_function("envelope_parse_render", |b| {
        b.iter(|| {
            let result = parse_envelope(black_box(&raw)).unwrap();
            black_box(narrative::render(&result).sections.len());
        })
    });
}

criterion_group!(
    benches,
    bench_parse_prediction,
    bench_render_all,
    bench_envelope_pipeline
);
criterion_main!(benches);
