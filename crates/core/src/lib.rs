//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds the whole simulation of a server-authoritative Tetris game.
//! It has **no I/O**: no networking, no storage, no clocks, and no ambient
//! randomness. That makes it:
//!
//! - **Deterministic**: the same [`ShapeChooser`] sequence yields identical games
//! - **Testable**: every rule is exercised without a web context
//! - **Portable**: the web adapter is just one possible caller
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 binary grid with piece placement and line clearing
//! - [`pieces`]: shape matrices, the falling piece, collision test, rotation
//! - [`rng`]: injectable shape choosers (thread RNG, seeded LCG, scripted)
//! - [`session`]: per-player state machine driven by move commands
//! - [`snapshot`]: plain-data views for serialization boundaries
//!
//! # Game Rules
//!
//! - Pieces spawn at anchor (3, 0) in their rotation-0 orientation
//! - `left` / `right` / `rotate` are silently ignored when illegal
//! - Rotation is a plain 90° clockwise matrix rotation, no wall kicks
//! - `down` on a resting piece locks it, clears full rows, and spawns the next piece
//! - The game ends only when a freshly spawned piece collides
//!
//! # Example
//!
//! ```
//! use tetris_session_core::{GameSession, MoveReply, ScriptedChooser};
//! use tetris_session_types::{Direction, PieceKind};
//!
//! let mut chooser = ScriptedChooser::repeat(PieceKind::O);
//! let game = GameSession::start(&mut chooser);
//!
//! let step = game.apply_move(Some(Direction::Left), &mut chooser);
//! match step.reply {
//!     MoveReply::Continue { piece, .. } => assert_eq!(piece.x, 2),
//!     other => panic!("unexpected reply: {:?}", other),
//! }
//! ```

pub mod board;
pub mod pieces;
pub mod rng;
pub mod session;
pub mod snapshot;

pub use tetris_session_types as types;

pub use board::Board;
pub use pieces::{get_shape, Piece, Shape};
pub use rng::{ScriptedChooser, ShapeChooser, SimpleRng, ThreadRngChooser};
pub use session::{GameSession, LockEvent, MoveReply, MoveStep, Phase};
pub use snapshot::{board_grid, BoardGrid, PieceSnapshot};
