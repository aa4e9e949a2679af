//! Tetris session server (default binary).
//!
//! Reads its configuration from the environment and serves the start/move
//! endpoints until the process is stopped.

use anyhow::{Context, Result};

use tetris_session::adapter::{check_tcp_listen_available, run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env();

    if config.port != 0 {
        check_tcp_listen_available(&config.host, config.port).with_context(|| {
            format!(
                "{}:{} is not available (set TETRIS_PORT to another port)",
                config.host, config.port
            )
        })?;
    }

    let result = run_server(config, None).await;
    if let Err(e) = &result {
        eprintln!("[Server] stopped: {:#}", e);
    }
    result
}
