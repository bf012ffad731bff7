// ==============================================================================
// traction.rs — THROTTLE / GRIP DECISION (stateless)
// ==============================================================================
// Decides, from the post-friction forward speed and the commanded throttle,
// how much longitudinal acceleration is actually applied this step:
//
//   throttle against the direction of travel -> wheels lose grip, the body is
//     pushed at the sliding-friction rate and slide intensity is pinned at max
//   throttle with travel, below the speed bound -> full commanded acceleration
//   at/over the bound -> no acceleration (the cap is enforced by omission)
//   |throttle| inside the dead-zone -> coasting
//
// Grip is recomputed from scratch every step. Nothing here remembers the
// previous decision.
// ==============================================================================

use serde::Serialize;
use crate::drift::types::DriftModel;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Traction {
    Coast,
    Drive,
    Slip,
    Capped,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TractionResult {
    pub acc: f64,
    pub traction: Traction,
}

impl TractionResult {
    pub fn slipping(&self) -> bool {
        self.traction == Traction::Slip
    }
}

pub fn solve_traction(model: &DriftModel, throttle: f64, fore_speed: f64) -> TractionResult {
    let (acc, traction) = if throttle > model.eps {
        if fore_speed < 0.0 {
            (model.sliding_friction, Traction::Slip)
        } else if fore_speed < model.max_fore_speed {
            (throttle, Traction::Drive)
        } else {
            (0.0, Traction::Capped)
        }
    } else if throttle < -model.eps {
        if fore_speed > 0.0 {
            (-model.sliding_friction, Traction::Slip)
        } else if fore_speed > model.max_back_speed {
            (throttle, Traction::Drive)
        } else {
            (0.0, Traction::Capped)
        }
    } else {
        (0.0, Traction::Coast)
    };

    TractionResult { acc, traction }
}
