use log::{debug, error, trace};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;

use crate::config::SimSettings;
use crate::drift::{advance, ControlGains, KeyState, StepReport, VehicleState};
use crate::skid::{SkidFrame, SkidMarks};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Input(KeyState),
    Key { code: u32, down: bool },
    Ping,
}

impl ClientMessage {
    pub fn from_json(txt: &str) -> serde_json::Result<Self> {
        serde_json::from_str(txt)
    }
}

#[derive(Debug, Serialize)]
pub struct VehicleSnapshot {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub heading: f64,
    pub sliding: f64,
}

#[derive(Debug, Serialize)]
pub struct PoseSnapshot {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

#[derive(Debug, Serialize)]
pub struct Frame {
    pub tick: u64,
    pub vehicle: VehicleSnapshot,
    pub previous: PoseSnapshot,
    pub skid: SkidFrame,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Frame(Frame),
    Pong,
}

/// Frames waiting for the stdout writer. Paced ticks drop frames past this.
pub const OUTBOUND_CAPACITY: usize = 64;

pub struct SharedSimState {
    pub tick: u64,
    pub dt: f64,
    pub vehicle: VehicleState,
    pub previous: VehicleState, // last tick, copied before `advance`
    pub keys: KeyState,
    pub gains: ControlGains,
    pub skid: SkidMarks,
    pub outbound: Option<Sender<String>>,
}

impl SharedSimState {
    pub fn new(settings: &SimSettings, outbound: Sender<String>) -> Self {
        let vehicle = VehicleState::at(settings.start.x, settings.start.y);
        Self {
            tick: 0,
            dt: settings.dt,
            vehicle,
            previous: vehicle,
            keys: KeyState::default(),
            gains: settings.gains,
            skid: SkidMarks::default(),
            outbound: Some(outbound),
        }
    }

    /// One fixed tick: snapshot, step, publish, then latch the keys as the
    /// controls for the next tick.
    pub fn tick_once(&mut self) -> StepReport {
        let (report, frame) = self.step_frame();
        self.send(&ServerMessage::Frame(frame));
        report
    }

    /// Same as `tick_once` but hands the frame back instead of queueing it.
    pub fn step_frame(&mut self) -> (StepReport, Frame) {
        self.previous = self.vehicle;
        let report = advance(&mut self.vehicle, self.dt);
        self.tick += 1;

        trace!("tick {} {:?}", self.tick, report);

        let skid = self.skid.emit(&self.previous, &self.vehicle, self.dt);
        let frame = self.frame(skid);

        self.vehicle.controls = self.keys.to_controls(&self.gains);
        (report, frame)
    }

    pub fn handle_message(&mut self, msg: ClientMessage) {
        match msg {
            ClientMessage::Input(keys) => {
                if keys != self.keys {
                    debug!("keys -> {:?}", keys);
                }
                self.keys = keys;
            }
            ClientMessage::Key { code, down } => {
                if !self.keys.set_key(code, down) {
                    debug!("ignoring key code {}", code);
                }
            }
            ClientMessage::Ping => self.send(&ServerMessage::Pong),
        }
    }

    /// Drop the outbound sender so the writer can drain and finish.
    pub fn close_outbound(&mut self) {
        self.outbound = None;
    }

    /// True once the writer has gone away (or the sender was closed here).
    pub fn outbound_closed(&self) -> bool {
        self.outbound.as_ref().is_none_or(|tx| tx.is_closed())
    }

    fn frame(&self, skid: SkidFrame) -> Frame {
        let v = &self.vehicle;
        let p = &self.previous;
        Frame {
            tick: self.tick,
            vehicle: VehicleSnapshot {
                x: v.position.x,
                y: v.position.y,
                vx: v.velocity.x,
                vy: v.velocity.y,
                heading: v.heading,
                sliding: v.sliding,
            },
            previous: PoseSnapshot {
                x: p.position.x,
                y: p.position.y,
                heading: p.heading,
            },
            skid,
        }
    }

    fn send(&self, msg: &ServerMessage) {
        let Some(tx) = &self.outbound else {
            return;
        };
        let Some(json) = encode(msg) else {
            return;
        };
        match tx.try_send(json) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("writer behind, dropping message"),
            Err(TrySendError::Closed(_)) => debug!("outbound closed, dropping message"),
        }
    }
}

pub fn encode(msg: &ServerMessage) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(json),
        Err(e) => {
            error!("failed to encode message: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::Vec2;
    use std::time::Duration;
    use tokio::sync::mpsc::{channel, Receiver};

    fn settings() -> SimSettings {
        SimSettings {
            dt: 0.02,
            tick: Duration::from_millis(20),
            start: Vec2::new(400.0, 300.0),
            gains: ControlGains::default(),
            max_ticks: None,
            paced: false,
        }
    }

    fn sim() -> (SharedSimState, Receiver<String>) {
        let (tx, rx) = channel(OUTBOUND_CAPACITY);
        (SharedSimState::new(&settings(), tx), rx)
    }

    fn next_json(rx: &mut Receiver<String>) -> serde_json::Value {
        let txt = rx.try_recv().unwrap();
        serde_json::from_str(&txt).unwrap()
    }

    #[test]
    fn test_parse_client_messages() {
        assert_eq!(
            ClientMessage::from_json(r#"{"type":"input","forward":true,"left":true}"#).unwrap(),
            ClientMessage::Input(KeyState { forward: true, left: true, ..Default::default() })
        );
        assert_eq!(
            ClientMessage::from_json(r#"{"type":"key","code":40,"down":false}"#).unwrap(),
            ClientMessage::Key { code: 40, down: false }
        );
        assert_eq!(ClientMessage::from_json(r#"{"type":"ping"}"#).unwrap(), ClientMessage::Ping);

        assert!(ClientMessage::from_json(r#"{"type":"warp"}"#).is_err());
        assert!(ClientMessage::from_json("not json").is_err());
    }

    #[test]
    fn test_previous_is_captured_before_step() {
        let (mut sim, mut rx) = sim();
        sim.vehicle.velocity = Vec2::new(10.0, 0.0);
        let before = sim.vehicle;

        sim.tick_once();

        assert_eq!(sim.previous.position, before.position);
        assert_eq!(sim.previous.velocity, before.velocity);
        assert!(sim.vehicle.position.x > before.position.x);

        let frame = next_json(&mut rx);
        assert_eq!(frame["type"], "frame");
        assert_eq!(frame["tick"], 1);
        assert_eq!(frame["previous"]["x"], 400.0);
        assert!(frame["vehicle"]["x"].as_f64().unwrap() > 400.0);
        assert_eq!(frame["skid"]["segments"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_keys_become_controls_for_next_tick() {
        let (mut sim, _rx) = sim();
        sim.handle_message(ClientMessage::Input(KeyState { forward: true, ..Default::default() }));

        // controls are latched after the step, so the first tick rolls nothing
        sim.tick_once();
        assert_eq!(sim.vehicle.velocity, Vec2::zeros());
        assert_eq!(sim.vehicle.controls.throttle, 400.0);

        sim.tick_once();
        assert!((sim.vehicle.velocity.x - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_sliding_frame_carries_segments() {
        let (mut sim, mut rx) = sim();
        sim.vehicle.velocity = Vec2::new(-50.0, 0.0);
        sim.vehicle.controls.throttle = 100.0;

        sim.tick_once();

        let frame = next_json(&mut rx);
        assert_eq!(frame["vehicle"]["sliding"], 50.0);
        assert_eq!(frame["skid"]["segments"].as_array().unwrap().len(), 4);
        assert_eq!(frame["skid"]["width"], 5.0);
    }

    #[test]
    fn test_key_codes_and_ping() {
        let (mut sim, mut rx) = sim();
        sim.handle_message(ClientMessage::Key { code: 37, down: true });
        sim.handle_message(ClientMessage::Key { code: 13, down: true });
        assert_eq!(sim.keys, KeyState { left: true, ..Default::default() });

        sim.handle_message(ClientMessage::Ping);
        assert_eq!(next_json(&mut rx)["type"], "pong");
    }

    #[test]
    fn test_closed_outbound_is_silent() {
        let (mut sim, mut rx) = sim();
        sim.close_outbound();
        sim.tick_once();
        assert!(rx.try_recv().is_err());
        assert_eq!(sim.tick, 1);
    }

    #[test]
    fn test_dropped_writer_is_reported_as_closed() {
        let (mut sim, rx) = sim();
        assert!(!sim.outbound_closed());

        drop(rx);
        sim.tick_once();
        assert!(sim.outbound_closed());
    }

    #[test]
    fn test_full_queue_drops_frames_instead_of_growing() {
        let (tx, mut rx) = channel(1);
        let mut sim = SharedSimState::new(&settings(), tx);

        sim.tick_once();
        sim.tick_once();
        sim.tick_once();

        assert_eq!(sim.tick, 3);
        assert_eq!(next_json(&mut rx)["tick"], 1);
        assert!(rx.try_recv().is_err());
        assert!(!sim.outbound_closed());
    }

    #[test]
    fn test_step_frame_does_not_queue() {
        let (mut sim, mut rx) = sim();
        let (_, frame) = sim.step_frame();

        assert_eq!(frame.tick, 1);
        assert!(rx.try_recv().is_err());
        let json = encode(&ServerMessage::Frame(frame)).unwrap();
        assert!(json.starts_with(r#"{"type":"frame""#));
    }
}
