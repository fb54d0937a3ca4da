//! Frame diff benchmark: grid diffing and whole editor frames.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::io;
use vedit::render::diff::{render_diff, render_full, DiffState};
use vedit::render::{Grid, Renderer, Rgb, Style};
use vedit::{EditorState, TextBuffer};

/// A grid filled with shifting letters and colors.
fn create_test_grid(width: u16, height: u16, seed: u16) -> Grid {
    let mut grid = Grid::new(width, height);
    let mut line = String::with_capacity(usize::from(width));
    for y in 0..height {
        line.clear();
        line.extend((0..width).map(|x| char::from(b'A' + ((x + y + seed) % 26) as u8)));
        let style = Style::new(
            Rgb::new((y * 7 + seed) as u8, (y * 3) as u8, 200),
            Rgb::new(20, 20, 30),
        );
        grid.put_str(0, y, &line, style);
    }
    grid
}

fn diff(a: &Grid, b: &Grid) -> usize {
    let mut output = Vec::with_capacity(65536);
    let mut state = DiffState::new();
    render_diff(a, b, &mut output, &mut state);
    output.len()
}

fn diff_identical(c: &mut Criterion) {
    let grid = create_test_grid(200, 50, 0);
    let copy = grid.clone();
    c.bench_function("diff_200x50_identical", |b| {
        b.iter(|| diff(black_box(&grid), black_box(&copy)))
    });
}

fn diff_line_change(c: &mut Criterion) {
    let a = create_test_grid(200, 50, 0);
    let mut b = a.clone();
    b.put_str(0, 25, &"*".repeat(200), Style::new(Rgb::new(255, 255, 0), Rgb::BLACK));
    c.bench_function("diff_200x50_line_change", |bench| {
        bench.iter(|| diff(black_box(&a), black_box(&b)))
    });
}

fn diff_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_full_change");
    for (width, height) in [(80, 24), (200, 50), (300, 80)] {
        let grids = (
            create_test_grid(width, height, 0),
            create_test_grid(width, height, 1),
        );
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &grids,
            |bench, (a, b)| bench.iter(|| diff(black_box(a), black_box(b))),
        );
    }
    group.finish();
}

fn full_redraw(c: &mut Criterion) {
    let grid = create_test_grid(200, 50, 0);
    c.bench_function("render_full_200x50", |b| {
        b.iter(|| {
            let mut output = Vec::with_capacity(65536);
            render_full(black_box(&grid), &mut output);
            output.len()
        })
    });
}

fn editor_frame(c: &mut Criterion) {
    let lines = (0..2_000).map(|i| format!("{i:>5} the quick brown fox jumps over the lazy dog"));
    let mut state = EditorState::new(TextBuffer::from_lines(lines));
    let mut renderer = Renderer::new(io::sink(), 120, 40);
    let mut line = 0;

    c.bench_function("editor_frame_scrolling", |b| {
        b.iter(|| {
            line = (line + 1) % 2_000;
            state.set_cursor(line, 10);
            renderer.render(black_box(&state), "", ':')
        })
    });
}

criterion_group!(
    benches,
    diff_identical,
    diff_line_change,
    diff_by_size,
    full_redraw,
    editor_frame,
);
criterion_main!(benches);
