//! Criterion benchmarks for gamepad-to-command mapping.
//!
//! Run with:
//! ```bash
//! cargo bench --package tello-core --bench mapping_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tello_core::{Button, CommandMapper, GamepadState, Message};

fn busy_state() -> GamepadState {
    let mut state = GamepadState::neutral();
    state.set_button(Button::A, true);
    state.set_button(Button::B, true);
    state.axes = vec![0.37, -0.81, 1.0, -1.0, -1.0, 0.2];
    state
}

fn bench_map(c: &mut Criterion) {
    let mapper = CommandMapper::default();
    let neutral = GamepadState::neutral();
    let busy = busy_state();

    c.bench_function("map_neutral", |b| b.iter(|| mapper.map(black_box(&neutral))));
    c.bench_function("map_busy", |b| b.iter(|| mapper.map(black_box(&busy))));

    // Mapping plus message construction: the full per-tick cost before the queue.
    c.bench_function("map_busy_to_messages", |b| {
        b.iter(|| {
            mapper
                .map(black_box(&busy))
                .into_iter()
                .map(Message::from)
                .collect::<Vec<_>>()
        })
    });
}

criterion_group!(benches, bench_map);
criterion_main!(benches);
