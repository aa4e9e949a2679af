//! HTTP server for the session adapter
//!
//! Maps the start/move endpoints onto the pure session core, keeps state in a
//! [`SessionStore`], and optionally records every response to a wire log.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::core::{GameSession, ShapeChooser, SimpleRng, ThreadRngChooser};
use crate::protocol::{MoveRequest, MoveResponse, StartResponse};
use crate::store::{is_valid_token, mint_token, SessionGuard, SessionStore, StoreFull, StoreLimits};

/// Header carrying the opaque per-player session token
pub const SESSION_HEADER: &str = "x-session-token";

/// Shared chooser used for every spawn on this server
pub type SharedChooser = Arc<Mutex<Box<dyn ShapeChooser + Send>>>;

type Rejection = (StatusCode, String);

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seed for a deterministic piece sequence; OS randomness when None.
    pub seed: Option<u32>,
    pub log_path: Option<String>,
    /// Idle time after which a session is evicted
    pub session_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let limits = StoreLimits::default();
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            seed: None,
            log_path: None,
            session_ttl: limits.ttl,
            max_sessions: limits.max_sessions,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an explicit variable source.
    /// Unparseable values fall back to the defaults.
    pub fn from_lookup<F>(mut get_env: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = get_env("TETRIS_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = get_env("TETRIS_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let seed = get_env("TETRIS_SEED").and_then(|s| s.trim().parse().ok());
        let log_path = get_env("TETRIS_LOG_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let session_ttl = get_env("TETRIS_SESSION_TTL")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_ttl);
        let max_sessions = get_env("TETRIS_MAX_SESSIONS")
            .and_then(|s| s.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.max_sessions);

        Self {
            host,
            port,
            seed,
            log_path,
            session_ttl,
            max_sessions,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    pub fn store_limits(&self) -> StoreLimits {
        StoreLimits {
            ttl: self.session_ttl,
            max_sessions: self.max_sessions,
        }
    }

    /// Chooser matching this configuration
    pub fn chooser(&self) -> Box<dyn ShapeChooser + Send> {
        match self.seed {
            Some(seed) => Box::new(SimpleRng::new(seed)),
            None => Box::new(ThreadRngChooser),
        }
    }
}

/// Fail fast if the port cannot be bound (e.g. another server already runs).
pub fn check_tcp_listen_available(host: &str, port: u16) -> std::io::Result<()> {
    let listener = std::net::TcpListener::bind((host, port))?;
    drop(listener);
    Ok(())
}

/// One line of the wire log
#[derive(Debug, Clone, Serialize)]
pub struct WireRecord {
    pub route: &'static str,
    pub token: String,
    pub body: serde_json::Value,
}

/// Append wire records to `path`, one JSON object per line.
///
/// Runs on a background task; the first write error stops recording.
pub fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<WireRecord> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WireRecord>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;
        use tokio::io::AsyncWriteExt;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                eprintln!("[Server] wire log {} unavailable: {}", path, e);
                return;
            }
        };

        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(rec) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &rec).is_err() {
                continue;
            }
            buf.push(b'\n');
            if file.write_all(&buf).await.is_err() {
                break;
            }
        }

        let _ = file.flush().await;
    });
    tx
}

/// State shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    chooser: SharedChooser,
    wire_log: Option<mpsc::UnboundedSender<WireRecord>>,
}

impl AppState {
    pub fn new(chooser: Box<dyn ShapeChooser + Send>) -> Self {
        Self {
            store: Arc::new(SessionStore::new()),
            chooser: Arc::new(Mutex::new(chooser)),
            wire_log: None,
        }
    }

    /// Replace the store with an empty one bounded by `limits`
    pub fn with_limits(mut self, limits: StoreLimits) -> Self {
        self.store = Arc::new(SessionStore::with_limits(limits));
        self
    }

    pub fn with_wire_log(mut self, tx: mpsc::UnboundedSender<WireRecord>) -> Self {
        self.wire_log = Some(tx);
        self
    }

    fn record<T: Serialize>(&self, route: &'static str, token: &str, body: &T) {
        let Some(tx) = self.wire_log.as_ref() else {
            return;
        };
        if let Ok(body) = serde_json::to_value(body) {
            let _ = tx.send(WireRecord {
                route,
                token: token.to_string(),
                body,
            });
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/start", post(start))
        .route("/move", post(move_piece))
        .route("/session", delete(end_session))
        .with_state(state)
}

/// Bind, serve, and signal the bound address on `ready_tx`.
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;

    let mut state = AppState::new(config.chooser()).with_limits(config.store_limits());
    if let Some(path) = config.log_path.clone() {
        state = state.with_wire_log(spawn_wire_log(path));
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let bound = listener.local_addr()?;
    println!("[Server] listening on {}", bound);
    if config.seed.is_some() {
        println!("[Server] deterministic pieces (seed {:?})", config.seed);
    }
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    spawn_session_sweeper(Arc::clone(&state.store));

    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Periodically evict idle sessions for as long as the store is alive.
pub fn spawn_session_sweeper(store: Arc<SessionStore>) -> tokio::task::JoinHandle<()> {
    let period = store.limits().ttl.clamp(Duration::from_secs(1), Duration::from_secs(60));
    let store = Arc::downgrade(&store);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(store) = store.upgrade() else {
                break;
            };
            let evicted = store.evict_expired().await;
            if evicted > 0 {
                println!("[Server] evicted {} idle session(s)", evicted);
            }
        }
    })
}

async fn health() -> &'static str {
    "ok"
}

/// Token from the request, if present. A present-but-malformed token is rejected.
fn session_token(headers: &HeaderMap) -> Result<Option<String>, Rejection> {
    let Some(value) = headers.get(SESSION_HEADER) else {
        return Ok(None);
    };
    match value.to_str() {
        Ok(token) if is_valid_token(token) => Ok(Some(token.to_string())),
        _ => Err((
            StatusCode::BAD_REQUEST,
            format!("invalid {} header", SESSION_HEADER),
        )),
    }
}

fn require_token(headers: &HeaderMap) -> Result<String, Rejection> {
    session_token(headers)?.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("missing {} header", SESSION_HEADER),
        )
    })
}

async fn lock_session(store: &SessionStore, token: &str) -> Result<SessionGuard, Rejection> {
    store.acquire(token).await.map_err(|e: StoreFull| {
        eprintln!("[Server] rejecting session {}: {}", short(token), e);
        (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
    })
}

/// Log-friendly prefix of a token
fn short(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

async fn start(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<([(&'static str, String); 1], Json<StartResponse>), Rejection> {
    let token = session_token(&headers)?.unwrap_or_else(mint_token);
    let mut session = lock_session(&state.store, &token).await?;

    let fresh = {
        let mut chooser = state.chooser.lock().await;
        GameSession::start(&mut **chooser)
    };
    let GameSession::Active { board, piece } = &fresh else {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "session failed to start".to_string(),
        ));
    };
    let body = StartResponse::new(board, piece);
    println!(
        "[Server] session {} started with {}",
        short(&token),
        piece.kind.as_str()
    );
    *session = fresh;
    drop(session);

    state.record("start", &token, &body);
    Ok(([(SESSION_HEADER, token)], Json(body)))
}

async fn move_piece(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<([(&'static str, String); 1], Json<MoveResponse>), Rejection> {
    let token = require_token(&headers)?;
    let mut session = lock_session(&state.store, &token).await?;

    // A finished game answers before the body is even looked at.
    let direction = if session.is_game_over() {
        None
    } else {
        let request: MoveRequest = serde_json::from_slice(&body).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("invalid move body: {}", e),
            )
        })?;
        request.direction()
    };

    let step = {
        let mut chooser = state.chooser.lock().await;
        session.apply_move(direction, &mut **chooser)
    };

    if let Some(lock) = step.lock {
        if lock.lines_cleared > 0 {
            println!(
                "[Server] session {} cleared {} line(s)",
                short(&token),
                lock.lines_cleared
            );
        }
        if lock.topped_out {
            println!("[Server] session {} game over", short(&token));
        }
    }

    let response = MoveResponse::from(&step.reply);
    *session = step.session;
    drop(session);

    state.record("move", &token, &response);
    Ok(([(SESSION_HEADER, token)], Json(response)))
}

async fn end_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, Rejection> {
    let token = require_token(&headers)?;
    if state.store.remove(&token).await {
        println!("[Server] session {} closed", short(&token));
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "unknown session".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_from_lookup() {
        let config = ServerConfig::from_lookup(|key| match key {
            "TETRIS_HOST" => Some("0.0.0.0".to_string()),
            "TETRIS_PORT" => Some("8080".to_string()),
            "TETRIS_SEED" => Some("42".to_string()),
            "TETRIS_LOG_PATH" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.log_path, None);
        assert_eq!(config.session_ttl, StoreLimits::default().ttl);
    }

    #[test]
    fn test_server_config_session_limits() {
        let config = ServerConfig::from_lookup(|key| match key {
            "TETRIS_SESSION_TTL" => Some("90".to_string()),
            "TETRIS_MAX_SESSIONS" => Some("25".to_string()),
            _ => None,
        });
        assert_eq!(
            config.store_limits(),
            StoreLimits {
                ttl: Duration::from_secs(90),
                max_sessions: 25,
            }
        );

        let zeroed = ServerConfig::from_lookup(|key| match key {
            "TETRIS_SESSION_TTL" | "TETRIS_MAX_SESSIONS" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(zeroed, ServerConfig::default());
    }

    #[tokio::test]
    async fn test_sweeper_evicts_idle_sessions() {
        let store = Arc::new(SessionStore::with_limits(StoreLimits {
            ttl: Duration::from_millis(10),
            max_sessions: 100,
        }));
        store.save("idle", GameSession::NotStarted).await.unwrap();

        let sweeper = spawn_session_sweeper(Arc::clone(&store));
        // Sweep period is clamped to at least one second.
        tokio::time::sleep(Duration::from_millis(1300)).await;
        assert!(store.is_empty().await);

        drop(store);
        tokio::time::timeout(Duration::from_secs(3), sweeper)
            .await
            .expect("sweeper should stop once the store is gone")
            .unwrap();
    }

    #[test]
    fn test_server_config_falls_back_on_garbage() {
        let config = ServerConfig::from_lookup(|key| match key {
            "TETRIS_PORT" => Some("not-a-port".to_string()),
            "TETRIS_SEED" => Some("-1".to_string()),
            _ => None,
        });
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_socket_addr_rejects_bad_host() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
        assert!(ServerConfig::default().socket_addr().is_ok());
    }

    #[test]
    fn test_session_token_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers).unwrap(), None);
        assert!(require_token(&headers).is_err());

        headers.insert(SESSION_HEADER, "abc123".parse().unwrap());
        assert_eq!(session_token(&headers).unwrap(), Some("abc123".to_string()));
    }

    #[test]
    fn test_short_token() {
        assert_eq!(short("0123456789abcdef"), "01234567");
        assert_eq!(short("abc"), "abc");
    }
}
