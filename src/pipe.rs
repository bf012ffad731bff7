use std::io::BufRead;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use log::{error, info, warn};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};

use crate::state::{ClientMessage, SharedSimState};

/// Blocking stdin reader on its own thread, so a pending read never holds the
/// runtime open at shutdown.
pub fn spawn_stdin_reader(state: Arc<Mutex<SharedSimState>>) -> Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            read_messages(stdin.lock(), &state);
            info!("⌨️  stdin closed, keeping last input");
        })
        .context("spawn stdin reader thread")
}

pub fn read_messages<R: BufRead>(reader: R, state: &Mutex<SharedSimState>) {
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("stdin read failed: {}", e);
                break;
            }
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let parsed = match ClientMessage::from_json(text) {
            Ok(m) => m,
            Err(e) => {
                warn!("skipping input {:?}: {}", text, e);
                continue;
            }
        };

        state.blocking_lock().handle_message(parsed);
    }
}

/// Send-loop: one JSON message per line, flushed so the renderer sees every tick.
/// A failed write is logged and ends the task, which closes the channel.
pub async fn start_stdout_writer(rx: mpsc::Receiver<String>) -> Result<()> {
    write_messages(tokio::io::stdout(), rx).await
}

pub async fn write_messages<W: AsyncWrite + Unpin>(mut out: W, mut rx: mpsc::Receiver<String>) -> Result<()> {
    while let Some(msg) = rx.recv().await {
        if let Err(e) = write_line(&mut out, &msg).await {
            error!("📤 frame output failed: {:#}", e);
            return Err(e);
        }
    }

    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, msg: &str) -> Result<()> {
    out.write_all(msg.as_bytes()).await.context("write frame")?;
    out.write_all(b"\n").await.context("write frame")?;
    out.flush().await.context("flush stdout")?;
    Ok(())
}
