// ==============================================================================
// step.rs — FIXED-STEP INTEGRATOR (HEADING -> BODY FRAME -> FRICTION -> TRACTION)
// ==============================================================================
// One call advances a VehicleState by `dt`:
//
//   1) heading += dt * turn_rate
//   2) body frame from the *updated* heading: d = (cos, sin)
//   3) fore = d . v, diag = d x v
//   4) linear friction toward zero (rolling on fore, sliding on diag)
//   5) slide intensity = min(|diag|, max_sliding)
//   6) traction decides acc (traction.rs), may pin slide intensity to max
//   7) back to world frame, acc applied along d
//   8) position += (v_old + v_new) * dt / 2
//
// The order above is observable in the resulting motion and must not change.
// Non-finite inputs propagate as NaN/inf, nothing is clamped or rejected.
// ==============================================================================

use serde::Serialize;
use crate::drift::types::{DriftModel, Vec2, VehicleState};
use crate::drift::friction::towards_zero;
use crate::drift::traction::{solve_traction, Traction};

/// Per-step by-product for logs and tests. Never read back by the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepReport {
    pub fore_speed: f64, // after friction, before acceleration
    pub diag_speed: f64, // after friction
    pub acc: f64,
    pub traction: Traction,
    pub sliding: f64,
}

pub fn advance(state: &mut VehicleState, dt: f64) -> StepReport {
    advance_with(&DriftModel::REFERENCE, state, dt)
}

pub fn advance_with(model: &DriftModel, state: &mut VehicleState, dt: f64) -> StepReport {
    let hdt = dt * 0.5;
    state.heading += dt * state.controls.turn_rate;

    let d = state.direction();
    let old_v = state.velocity;

    let fore_speed = state.fore_speed();
    let diag_speed = state.diag_speed();

    let new_fore = towards_zero(fore_speed, model.rolling_friction * dt);
    let new_diag = towards_zero(diag_speed, model.sliding_friction * dt);

    let mut sliding = new_diag.abs().min(model.max_sliding);

    let traction = solve_traction(model, state.controls.throttle, new_fore);
    if traction.slipping() {
        sliding = model.max_sliding;
    }
    let acc = traction.acc;

    let new_v = Vec2::new(
        new_fore * d.x - new_diag * d.y + d.x * acc * dt,
        new_fore * d.y + new_diag * d.x + d.y * acc * dt,
    );

    state.position += (old_v + new_v) * hdt;
    state.velocity = new_v;
    state.sliding = sliding;

    StepReport {
        fore_speed: new_fore,
        diag_speed: new_diag,
        acc,
        traction: traction.traction,
        sliding,
    }
}
