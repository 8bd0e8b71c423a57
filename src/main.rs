//! Line-protocol runner (default binary).
//!
//! Reads JSON requests from stdin, plays them against a board loaded from
//! `BLAST_LEVELS_DIR`, and prints every session event as one JSON line on
//! stdout. Animations are simulated: each blocking event completes after
//! `BLAST_ANIMATION_MS`. Logs go to stderr (`RUST_LOG` filters them).

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use blast_board::adapter::{
    parse_request, spawn_session, ErrorCode, SessionConfig, SessionEvent, SessionHandle,
};
use blast_board::core::{BoardConfig, DirLevelSource};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = SessionConfig::from_env();
    let board_config = BoardConfig::from_env();
    let animation = Duration::from_millis(config.animation_ms);
    tracing::info!(
        levels_dir = %config.levels_dir.display(),
        seed = board_config.seed,
        combo = board_config.combo_shape.as_str(),
        "starting"
    );

    let source = DirLevelSource::new(&config.levels_dir);
    let SessionHandle {
        commands,
        mut events,
        task,
    } = spawn_session(config, board_config, source);

    let printer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(mut emitted) = events.recv().await {
            emitted.complete_after(animation);
            let line = emitted.event.to_line()?;
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        anyhow::Ok(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_request(&line) {
            Ok(request) => {
                if commands.send(request).await.is_err() {
                    break;
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "bad request");
                let event = SessionEvent::Error {
                    seq: 0,
                    code: ErrorCode::BadRequest,
                    message: err.to_string(),
                };
                println!("{}", event.to_line()?);
            }
        }
    }

    drop(commands);
    task.await.context("session task panicked")??;
    printer.await.context("printer task panicked")??;
    Ok(())
}
