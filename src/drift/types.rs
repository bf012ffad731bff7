//! Core shared types for `drift` (engine-agnostic).
// drift/types.rs
use nalgebra::Vector2;

pub type Vec2 = Vector2<f64>;

// ============================================
// ----- model constants ----------------------
// ============================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftModel {
    pub sliding_friction: f64, // lateral decay + slip acceleration (dist/t^2)
    pub rolling_friction: f64, // longitudinal decay (dist/t^2)
    pub max_fore_speed: f64,   // dist/t
    pub max_back_speed: f64,   // dist/t, negative
    pub max_sliding: f64,      // upper bound of slide intensity
    pub eps: f64,              // throttle dead-zone
}

impl DriftModel {
    pub const REFERENCE: DriftModel = DriftModel {
        sliding_friction: 500.0,
        rolling_friction: 100.0,
        max_fore_speed: 500.0,
        max_back_speed: -300.0,
        max_sliding: 50.0,
        eps: 1e-6,
    };
}

impl Default for DriftModel {
    fn default() -> Self {
        Self::REFERENCE
    }
}

// ============================================
// ----- controls / state ---------------------
// ============================================
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    pub throttle: f64,  // signed acceleration (+ forward, - brake/reverse)
    pub turn_rate: f64, // rad / t, added straight to heading
}

/// Full kinematic state of one vehicle.
///
/// `Copy` is the snapshot contract: the host keeps last tick's state by value
/// so the renderer can see both poses after `advance` mutates the live one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub heading: f64, // radians, never wrapped
    pub controls: Controls,
    pub sliding: f64, // derived each step, kept for the renderer
}

impl VehicleState {
    /// At rest, facing +x, no input.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Vec2::new(x, y),
            velocity: Vec2::zeros(),
            heading: 0.0,
            controls: Controls::default(),
            sliding: 0.0,
        }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.heading.cos(), self.heading.sin())
    }

    /// Velocity component along the facing direction.
    pub fn fore_speed(&self) -> f64 {
        self.direction().dot(&self.velocity)
    }

    /// Velocity component perpendicular to the facing direction.
    pub fn diag_speed(&self) -> f64 {
        let d = self.direction();
        d.x * self.velocity.y - d.y * self.velocity.x
    }

    pub fn pose(&self) -> Pose {
        Pose { position: self.position, heading: self.heading }
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::at(0.0, 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec2,
    pub heading: f64,
}
