use criterion::{black_box, criterion_group, criterion_main, Criterion};
use match3::core::cascade::step;
use match3::core::matcher::find_clearable_lines;
use match3::core::{Board, Game, GameConfig, SimpleRng};

fn settled_game() -> Game {
    Game::initialize(GameConfig::default().with_seed(12345)).unwrap()
}

fn bench_find_lines(c: &mut Criterion) {
    let game = settled_game();

    c.bench_function("find_clearable_lines_8x8", |b| {
        b.iter(|| find_clearable_lines(black_box(game.board())))
    });
}

fn bench_step(c: &mut Criterion) {
    // Stripes of three: every column clears at once.
    let flavors: Vec<u32> = (0..64).map(|i| ((i % 8) / 3) as u32).collect();
    let board = Board::from_flavors(8, 8, &flavors).unwrap();

    c.bench_function("step_full_clear", |b| {
        b.iter(|| {
            let mut board = board.clone();
            let mut rng = SimpleRng::new(7);
            step(&mut board, &mut rng, 5)
        })
    });
}

fn bench_request_swap(c: &mut Criterion) {
    let game = settled_game();
    let m = game.legal_moves().first().copied();

    c.bench_function("request_swap_with_cascade", |b| {
        b.iter(|| {
            let mut game = game.clone();
            if let Some(m) = m {
                black_box(game.request_swap(m.source, m.target));
            }
        })
    });
}

fn bench_rejected_swap(c: &mut Criterion) {
    let mut game = settled_game();

    c.bench_function("request_swap_not_adjacent", |b| {
        b.iter(|| game.request_swap(black_box(0), black_box(10)))
    });
}

fn bench_initialize(c: &mut Criterion) {
    let mut seed = 0u32;

    c.bench_function("initialize_8x8", |b| {
        b.iter(|| {
            seed = seed.wrapping_add(1);
            Game::initialize(GameConfig::default().with_seed(seed)).unwrap()
        })
    });
}

fn bench_legal_moves(c: &mut Criterion) {
    let game = settled_game();

    c.bench_function("legal_moves_8x8", |b| b.iter(|| game.legal_moves()));
}

criterion_group!(
    benches,
    bench_find_lines,
    bench_step,
    bench_request_swap,
    bench_rejected_swap,
    bench_initialize,
    bench_legal_moves
);
criterion_main!(benches);
