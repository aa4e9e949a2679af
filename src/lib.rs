//! Server-authoritative Tetris (workspace facade crate).
//!
//! Re-exports the workspace crates under short names so the binary, tests, and
//! benches can write `tetris_session::{adapter, core, types}`.

pub use tetris_session_adapter as adapter;
pub use tetris_session_core as core;
pub use tetris_session_types as types;
