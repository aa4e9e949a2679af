//! Adapter module - HTTP boundary for server-authoritative Tetris sessions
//!
//! This crate exposes the pure session core over HTTP with JSON bodies. It
//! owns everything the core deliberately avoids: sockets, per-player storage,
//! the shared piece chooser, and the wire log.
//!
//! # Endpoints
//!
//! - `POST /start`: begin (or restart) the caller's game
//! - `POST /move`: apply one of `left`, `right`, `down`, `rotate`
//! - `DELETE /session`: forget the caller's game
//! - `GET /health`: liveness probe
//!
//! The caller is identified by the `x-session-token` header. `POST /start`
//! mints a token when none is sent; every reply echoes it back.
//!
//! # Environment Variables
//!
//! - `TETRIS_HOST`: Bind address (default: "127.0.0.1")
//! - `TETRIS_PORT`: Port number (default: 5000)
//! - `TETRIS_SEED`: Use a seeded, reproducible piece sequence
//! - `TETRIS_LOG_PATH`: Append every response to this file as JSON lines
//! - `TETRIS_SESSION_TTL`: Seconds a session may sit idle before it is evicted (default: 1800)
//! - `TETRIS_MAX_SESSIONS`: Most sessions held at once; new tokens get 503 beyond it (default: 10000)
//!
//! # Example Flow
//!
//! ```text
//! POST /start                          -> {"board":[[0,...],...],"piece":{"shape":[[1,1,1,1]],"x":3,"y":0}}
//! POST /move {"direction":"left"}      -> {"board":[...],"piece":{"shape":[[1,1,1,1]],"x":2,"y":0}}
//! POST /move {"direction":"down"}      -> {"status":"game_over","board":[...]}
//! POST /move {"direction":"down"}      -> {"status":"game_over"}
//! ```
//!
//! # Testing
//!
//! ```bash
//! curl -si -X POST http://127.0.0.1:5000/start
//! curl -s -X POST -H 'x-session-token: <token>' -d '{"direction":"rotate"}' http://127.0.0.1:5000/move
//! ```

pub mod protocol;
pub mod server;
pub mod store;

pub use tetris_session_core as core;
pub use tetris_session_types as types;

pub use protocol::*;
pub use server::{
    check_tcp_listen_available, router, run_server, spawn_session_sweeper, AppState, ServerConfig,
    WireRecord, SESSION_HEADER,
};
pub use store::{mint_token, SessionGuard, SessionStore, StoreFull, StoreLimits};
