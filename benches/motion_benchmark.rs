//! Motion benchmark: word and paragraph motions, and keyed edits through
//! the engine.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use vedit::editor::Position;
use vedit::engine::{next_paragraph, repeat_word_motion, WordMotion};
use vedit::{EditorState, KeyEvent, ModeEngine, Registry, TextBuffer};

fn prose(lines: usize) -> TextBuffer {
    TextBuffer::from_lines((0..lines).map(|i| {
        if i % 8 == 7 {
            String::new()
        } else {
            format!("fn item_{i}(a: usize, b: &str) -> Option<(usize, char)> {{ a.max(b.len()) }}")
        }
    }))
}

fn word_motions(c: &mut Criterion) {
    let buffer = prose(1_000);
    let mut group = c.benchmark_group("word_motion");
    for (name, motion, big) in [
        ("w", WordMotion::NextStart, false),
        ("W", WordMotion::NextStart, true),
        ("e", WordMotion::End, false),
    ] {
        group.bench_with_input(BenchmarkId::new(name, 1_000), &motion, |b, motion| {
            b.iter(|| {
                repeat_word_motion(
                    black_box(&buffer),
                    Position::new(0, 0),
                    *motion,
                    big,
                    1_000,
                )
            })
        });
    }
    group.bench_function("b_from_end", |b| {
        let end = Position::new(buffer.last_line() - 1, 0);
        b.iter(|| repeat_word_motion(black_box(&buffer), end, WordMotion::PreviousStart, false, 1_000))
    });
    group.finish();
}

fn paragraph_motion(c: &mut Criterion) {
    let buffer = prose(5_000);
    c.bench_function("paragraph_forward_100", |b| {
        b.iter(|| next_paragraph(black_box(&buffer), Position::new(0, 0), 100))
    });
}

fn keyed_edits(c: &mut Criterion) {
    let keys = KeyEvent::from_keys("3dwuggyyp5jd}0fadta");
    c.bench_function("engine_keyed_edits", |b| {
        b.iter_batched(
            || {
                let state = EditorState::new(prose(200));
                let engine = ModeEngine::new(Arc::new(Registry::new()));
                (state, engine)
            },
            |(mut state, mut engine)| {
                for key in &keys {
                    engine.handle_event(&mut state, *key);
                }
                state
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, word_motions, paragraph_motion, keyed_edits);
criterion_main!(benches);
