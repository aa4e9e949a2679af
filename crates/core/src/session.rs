//! Session module - one player's game as a pure state machine
//!
//! A [`GameSession`] is a value: operations take the current state and return
//! the next one, leaving storage to the caller. Every move works on a scratch
//! copy of the active piece that is committed only if it lands in a legal
//! position, so a rejected move never leaves a half-applied state behind.
//!
//! Lifecycle: `NotStarted` -> `Active` (via [`GameSession::start`]) -> `GameOver`
//! (a freshly spawned piece collides). `GameOver` is absorbing.

use crate::board::Board;
use crate::pieces::Piece;
use crate::rng::ShapeChooser;
use crate::types::{Direction, PieceKind};

/// Coarse lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    NotStarted,
    Active,
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::NotStarted => "not_started",
            Phase::Active => "active",
            Phase::GameOver => "game_over",
        }
    }
}

/// Complete state of one player's game
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GameSession {
    #[default]
    NotStarted,
    Active {
        board: Board,
        piece: Piece,
    },
    /// Terminal. The board is kept for display; the piece that failed to spawn is not.
    GameOver {
        board: Board,
    },
}

/// Emitted whenever a resting piece is committed to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub kind: PieceKind,
    pub lines_cleared: u32,
    /// The piece spawned after this lock collided immediately.
    pub topped_out: bool,
}

/// What the caller should report after a move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveReply {
    /// Game continues; full board and active piece.
    Continue { board: Board, piece: Piece },
    /// This move ended the game.
    ToppedOut { board: Board },
    /// The game had already ended; nothing changed.
    AlreadyOver,
}

/// Result of [`GameSession::apply_move`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveStep {
    /// State to persist
    pub session: GameSession,
    pub reply: MoveReply,
    pub lock: Option<LockEvent>,
}

impl GameSession {
    /// Begin a fresh game: empty board, newly chosen piece.
    ///
    /// Always succeeds; whatever the caller held before is simply replaced.
    pub fn start(chooser: &mut dyn ShapeChooser) -> Self {
        GameSession::Active {
            board: Board::new(),
            piece: Piece::spawn(chooser),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            GameSession::NotStarted => Phase::NotStarted,
            GameSession::Active { .. } => Phase::Active,
            GameSession::GameOver { .. } => Phase::GameOver,
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, GameSession::GameOver { .. })
    }

    pub fn board(&self) -> Option<&Board> {
        match self {
            GameSession::NotStarted => None,
            GameSession::Active { board, .. } | GameSession::GameOver { board } => Some(board),
        }
    }

    pub fn piece(&self) -> Option<&Piece> {
        match self {
            GameSession::Active { piece, .. } => Some(piece),
            _ => None,
        }
    }

    /// Apply one move command.
    ///
    /// `None` stands for a direction the caller could not recognise; it is a
    /// no-op that still reports the current state. A session that was never
    /// started is seeded with an empty board and a fresh piece first.
    pub fn apply_move(
        &self,
        direction: Option<Direction>,
        chooser: &mut dyn ShapeChooser,
    ) -> MoveStep {
        let (board, piece) = match self {
            GameSession::GameOver { .. } => {
                return MoveStep {
                    session: self.clone(),
                    reply: MoveReply::AlreadyOver,
                    lock: None,
                };
            }
            GameSession::NotStarted => (Board::new(), Piece::spawn(chooser)),
            GameSession::Active { board, piece } => (board.clone(), *piece),
        };

        let moved = match direction {
            Some(Direction::Left) => keep_if_valid(&board, piece.translated(-1, 0)),
            Some(Direction::Right) => keep_if_valid(&board, piece.translated(1, 0)),
            Some(Direction::Rotate) => keep_if_valid(&board, piece.rotated()),
            Some(Direction::Down) => match keep_if_valid(&board, piece.translated(0, 1)) {
                Some(dropped) => Some(dropped),
                None => return lock_and_respawn(board, &piece, chooser),
            },
            None => None,
        };

        let piece = moved.unwrap_or(piece);
        MoveStep {
            session: GameSession::Active {
                board: board.clone(),
                piece,
            },
            reply: MoveReply::Continue { board, piece },
            lock: None,
        }
    }
}

/// `candidate` is a scratch copy of the current piece; keep it only if it is legal.
fn keep_if_valid(board: &Board, candidate: Piece) -> Option<Piece> {
    candidate.is_valid(board).then_some(candidate)
}

/// Commit a resting piece, clear lines, and spawn its successor.
fn lock_and_respawn(mut board: Board, piece: &Piece, chooser: &mut dyn ShapeChooser) -> MoveStep {
    board.place_piece(piece);
    let lines_cleared = board.clear_lines() as u32;

    let next = Piece::spawn(chooser);
    let topped_out = !next.is_valid(&board);
    let lock = Some(LockEvent {
        kind: piece.kind,
        lines_cleared,
        topped_out,
    });

    if topped_out {
        return MoveStep {
            session: GameSession::GameOver {
                board: board.clone(),
            },
            reply: MoveReply::ToppedOut { board },
            lock,
        };
    }

    MoveStep {
        session: GameSession::Active {
            board: board.clone(),
            piece: next,
        },
        reply: MoveReply::Continue { board, piece: next },
        lock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedChooser;
    use crate::types::{SPAWN_X, SPAWN_Y};

    fn active(session: &GameSession) -> (Board, Piece) {
        match session {
            GameSession::Active { board, piece } => (board.clone(), *piece),
            other => panic!("expected active session, got {:?}", other.phase()),
        }
    }

    #[test]
    fn test_start_is_active_with_empty_board() {
        let mut chooser = ScriptedChooser::repeat(PieceKind::T);
        let session = GameSession::start(&mut chooser);

        assert_eq!(session.phase(), Phase::Active);
        let (board, piece) = active(&session);
        assert_eq!(board, Board::new());
        assert_eq!((piece.x, piece.y), (SPAWN_X, SPAWN_Y));
        assert_eq!(piece.kind, PieceKind::T);
    }

    #[test]
    fn test_move_right_commits_shift() {
        let mut chooser = ScriptedChooser::repeat(PieceKind::O);
        let session = GameSession::start(&mut chooser);

        let step = session.apply_move(Some(Direction::Right), &mut chooser);
        let (_, piece) = active(&step.session);
        assert_eq!(piece.x, SPAWN_X + 1);
        assert!(step.lock.is_none());
    }

    #[test]
    fn test_unknown_direction_is_noop() {
        let mut chooser = ScriptedChooser::repeat(PieceKind::S);
        let session = GameSession::start(&mut chooser);

        let step = session.apply_move(None, &mut chooser);
        assert_eq!(step.session, session);
        assert_eq!(chooser.drawn(), 1);
    }

    #[test]
    fn test_not_started_is_seeded_before_move() {
        let mut chooser = ScriptedChooser::repeat(PieceKind::J);
        let step = GameSession::NotStarted.apply_move(Some(Direction::Down), &mut chooser);

        let (board, piece) = active(&step.session);
        assert_eq!(board, Board::new());
        assert_eq!(piece.y, SPAWN_Y + 1);
    }

    #[test]
    fn test_game_over_absorbs_moves() {
        let mut chooser = ScriptedChooser::repeat(PieceKind::L);
        let over = GameSession::GameOver {
            board: Board::new(),
        };

        for dir in [Direction::Left, Direction::Down, Direction::Rotate] {
            let step = over.apply_move(Some(dir), &mut chooser);
            assert_eq!(step.reply, MoveReply::AlreadyOver);
            assert_eq!(step.session, over);
        }
        assert_eq!(chooser.drawn(), 0);
    }

    #[test]
    fn test_lock_reports_cleared_lines() {
        let mut chooser = ScriptedChooser::repeat(PieceKind::I);
        let mut board = Board::new();
        for x in 0..10 {
            if !(3..7).contains(&x) {
                board.set(x, 19, true);
            }
        }
        let mut piece = Piece::new(PieceKind::I);
        piece.y = 19;

        let session = GameSession::Active { board, piece };
        let step = session.apply_move(Some(Direction::Down), &mut chooser);

        let lock = step.lock.expect("piece should lock");
        assert_eq!(lock.lines_cleared, 1);
        assert!(!lock.topped_out);
        let (board, piece) = active(&step.session);
        assert_eq!(board.filled_count(), 0);
        assert_eq!(piece.y, SPAWN_Y);
    }
}
