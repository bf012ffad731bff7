// drift/controls.rs
use serde::Deserialize;
use crate::drift::types::Controls;

/// Scale of a fully pressed key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlGains {
    pub accel: f64, // dist / t^2
    pub turn: f64,  // rad / t
}

impl Default for ControlGains {
    fn default() -> Self {
        Self { accel: 400.0, turn: 4.0 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct KeyState {
    #[serde(default)]
    pub forward: bool,
    #[serde(default)]
    pub back: bool,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
}

#[inline]
fn axis(pos: bool, neg: bool) -> f64 {
    pos as i8 as f64 - neg as i8 as f64
}

impl KeyState {
    pub fn to_controls(&self, gains: &ControlGains) -> Controls {
        Controls {
            throttle: axis(self.forward, self.back) * gains.accel,
            turn_rate: axis(self.right, self.left) * gains.turn,
        }
    }

    /// Browser arrow-key codes. Returns false for codes that map to nothing.
    pub fn set_key(&mut self, code: u32, down: bool) -> bool {
        let slot = match code {
            37 => &mut self.left,
            38 => &mut self.forward,
            39 => &mut self.right,
            40 => &mut self.back,
            _ => return false,
        };
        *slot = down;
        true
    }
}
