use std::time::Duration;
use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser};

use crate::drift::{ControlGains, Vec2};

#[derive(Parser, Debug, Clone)]
#[command(name = "drift-sim", version, about = "Fixed-tick top-down drift integrator; JSON input on stdin, JSON frames on stdout")]
pub struct Config {
    /// Integration step (time units per tick)
    #[arg(long, default_value_t = 0.02, allow_negative_numbers = true)]
    pub dt: f64,

    /// Wall-clock milliseconds between ticks
    #[arg(long, default_value_t = 20)]
    pub tick_ms: u64,

    #[arg(long, default_value_t = 400.0, allow_negative_numbers = true)]
    pub start_x: f64,

    #[arg(long, default_value_t = 300.0, allow_negative_numbers = true)]
    pub start_y: f64,

    /// Throttle magnitude of a held forward/back key
    #[arg(long, default_value_t = 400.0)]
    pub accel: f64,

    /// Turn rate of a held left/right key (rad per time unit)
    #[arg(long, default_value_t = 4.0)]
    pub turn: f64,

    /// Stop after this many ticks
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Tick as fast as possible instead of on the wall clock
    #[arg(long, action = ArgAction::SetTrue)]
    pub unpaced: bool,
}

/// Validated run parameters handed to the host loop.
#[derive(Debug, Clone)]
pub struct SimSettings {
    pub dt: f64,
    pub tick: Duration,
    pub start: Vec2,
    pub gains: ControlGains,
    pub max_ticks: Option<u64>,
    pub paced: bool,
}

impl Config {
    pub fn validate(&self) -> Result<SimSettings> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(anyhow!("--dt must be finite and > 0 (got {})", self.dt));
        }
        if self.tick_ms == 0 {
            return Err(anyhow!("--tick-ms must be > 0"));
        }
        if !(self.start_x.is_finite() && self.start_y.is_finite()) {
            return Err(anyhow!("start position must be finite"));
        }
        if !(self.accel.is_finite() && self.turn.is_finite()) {
            return Err(anyhow!("--accel and --turn must be finite"));
        }

        Ok(SimSettings {
            dt: self.dt,
            tick: Duration::from_millis(self.tick_ms),
            start: Vec2::new(self.start_x, self.start_y),
            gains: ControlGains { accel: self.accel, turn: self.turn },
            max_ticks: self.max_ticks,
            paced: !self.unpaced,
        })
    }
}
