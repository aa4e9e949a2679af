use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tetris_session::core::{Board, GameSession, Piece, ScriptedChooser, SimpleRng};
use tetris_session::types::{Direction, PieceKind};

fn bench_apply_move(c: &mut Criterion) {
    let mut rng = SimpleRng::new(12345);
    let session = GameSession::start(&mut rng);

    c.bench_function("apply_move_left", |b| {
        b.iter(|| {
            let step = session.apply_move(black_box(Some(Direction::Left)), &mut rng);
            black_box(step.reply);
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut board = Board::new();
            // Fill bottom 4 rows
            for y in 16..20 {
                board.fill_row(y);
            }
            black_box(board.clear_lines());
        })
    });
}

fn bench_validity_check(c: &mut Criterion) {
    let mut board = Board::new();
    for y in 10..20 {
        for x in 0..9 {
            board.set(x, y, true);
        }
    }
    let piece = Piece::new(PieceKind::T);

    c.bench_function("is_valid_at", |b| {
        b.iter(|| piece.is_valid_at(black_box(&board), black_box(0), black_box(1)))
    });
}

fn bench_rotate(c: &mut Criterion) {
    let mut chooser = ScriptedChooser::repeat(PieceKind::L);
    let session = GameSession::start(&mut chooser);

    c.bench_function("apply_move_rotate", |b| {
        b.iter(|| {
            let step = session.apply_move(black_box(Some(Direction::Rotate)), &mut chooser);
            black_box(step.reply);
        })
    });
}

fn bench_drop_to_lock(c: &mut Criterion) {
    c.bench_function("drop_to_lock", |b| {
        b.iter(|| {
            let mut chooser = ScriptedChooser::repeat(PieceKind::I);
            let mut session = GameSession::start(&mut chooser);
            for _ in 0..20 {
                session = session.apply_move(Some(Direction::Down), &mut chooser).session;
            }
            black_box(session);
        })
    });
}

criterion_group!(
    benches,
    bench_apply_move,
    bench_line_clear,
    bench_validity_check,
    bench_rotate,
    bench_drop_to_lock
);
criterion_main!(benches);
