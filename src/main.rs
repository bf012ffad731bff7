mod config;
mod drift;
mod pipe;
mod skid;
mod state;

use crate::config::Config;
use crate::pipe::{spawn_stdin_reader, start_stdout_writer};
use crate::state::{encode, ServerMessage, SharedSimState, OUTBOUND_CAPACITY};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::interval;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Config::parse().validate()?;
    info!(
        "🚀 Starting drift sim: dt = {}, tick = {:?}, start = ({}, {})",
        settings.dt, settings.tick, settings.start.x, settings.start.y
    );

    let (tx, rx) = mpsc::channel::<String>(OUTBOUND_CAPACITY);
    // unpaced ticks wait on this for queue space
    let frames = tx.clone();
    let state = Arc::new(Mutex::new(SharedSimState::new(&settings, tx)));

    let writer = tokio::spawn(start_stdout_writer(rx));
    spawn_stdin_reader(Arc::clone(&state))?;

    // Fixed timestep, reference 50 Hz
    let mut ticker = interval(settings.tick);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut output_lost = false;

    loop {
        if settings.paced {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut ctrl_c => { info!("interrupted"); break; }
            }

            let mut sim = state.lock().await;
            sim.tick_once();
            if sim.outbound_closed() {
                output_lost = true;
                break;
            }
            if settings.max_ticks.is_some_and(|max| sim.tick >= max) {
                info!("reached {} ticks", sim.tick);
                break;
            }
        } else {
            let permit = tokio::select! {
                biased;
                _ = &mut ctrl_c => { info!("interrupted"); break; }
                permit = frames.reserve() => permit,
            };
            let Ok(permit) = permit else {
                output_lost = true;
                break;
            };

            let mut sim = state.lock().await;
            let (_, frame) = sim.step_frame();
            if let Some(json) = encode(&ServerMessage::Frame(frame)) {
                permit.send(json);
            }
            if settings.max_ticks.is_some_and(|max| sim.tick >= max) {
                info!("reached {} ticks", sim.tick);
                break;
            }
        }
    }

    let ticks = {
        let mut sim = state.lock().await;
        sim.close_outbound();
        sim.tick
    };
    drop(frames);

    writer.await.context("stdout writer task")??;
    if output_lost {
        error!("frame output closed after {} ticks", ticks);
        return Err(anyhow!("frame output closed"));
    }
    info!("🛑 Stopped after {} ticks", ticks);
    Ok(())
}
