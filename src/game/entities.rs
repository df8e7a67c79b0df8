//! Entity state: player, hazards, platforms, coins and narrative triggers

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

use super::power::PowerKind;

/// Maximum number of jumps available before landing again
pub const MAX_JUMPS: u8 = 2;

/// Axis-aligned rectangle, `(x, y)` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap, touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Horizontal extents overlap
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.x < other.right() && self.right() > other.x
    }
}

/// Dash sub-state of the player
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashState {
    #[default]
    Idle,
    Dashing { time_left: f32 },
}

/// Coarse motion state exposed to presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    Grounded,
    Airborne,
    Dashing,
}

/// Player character (authoritative)
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    // Position and movement
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub width: f32,
    pub height: f32,
    /// -1 facing left, 1 facing right
    pub facing: i8,

    // Ground contact and abilities
    pub grounded: bool,
    pub jumps_remaining: u8,
    pub dash: DashState,
    pub dash_cooldown: f32,
}

impl Player {
    /// Fresh player resting on the ground at the spawn point
    pub fn spawn(config: &SimConfig) -> Self {
        Self {
            x: config.spawn_x,
            y: config.spawn_y(),
            vel_x: 0.0,
            vel_y: 0.0,
            width: config.player_width,
            height: config.player_height,
            facing: 1,
            grounded: true,
            jumps_remaining: MAX_JUMPS,
            dash: DashState::Idle,
            dash_cooldown: 0.0,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.dash, DashState::Dashing { .. })
    }

    pub fn motion_state(&self) -> MotionState {
        if self.is_dashing() {
            MotionState::Dashing
        } else if self.grounded {
            MotionState::Grounded
        } else {
            MotionState::Airborne
        }
    }

    /// Land on a surface whose top is at `surface_y`.
    ///
    /// `was_airborne` is the grounded state before this frame's collision
    /// pass; jumps only refill on a real airborne to grounded transition.
    pub fn land(&mut self, surface_y: f32, was_airborne: bool) {
        if was_airborne {
            self.jumps_remaining = MAX_JUMPS;
        }
        self.y = surface_y - self.height;
        self.vel_y = 0.0;
        self.grounded = true;
    }
}

/// Patrolling hazard (monster)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// -1 or 1
    pub direction: i8,
    pub patrol_min: f32,
    pub patrol_max: f32,
    pub speed: f32,
}

impl Hazard {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Advance along the patrol, reflecting at either bound
    pub fn patrol(&mut self, dt: f32) {
        self.x += self.direction as f32 * self.speed * dt;
        if self.x >= self.patrol_max {
            self.x = self.patrol_max;
            self.direction = -1;
        } else if self.x <= self.patrol_min {
            self.x = self.patrol_min;
            self.direction = 1;
        }
    }
}

/// Static one-way platform
pub type Platform = Rect;

/// Collectible coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub taken: bool,
}

impl Coin {
    pub fn bounds(&self, size: f32) -> Rect {
        Rect::new(self.x, self.y, size, size)
    }
}

/// One selectable entry of a choice prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub kind: PowerKind,
}

/// Position-gated, fire-once power-up choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeTrigger {
    pub x: f32,
    pub prompt: String,
    pub options: Vec<ChoiceOption>,
    #[serde(default)]
    pub used: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hazard(x: f32) -> Hazard {
        Hazard {
            x,
            y: 400.0,
            width: 40.0,
            height: 40.0,
            direction: 1,
            patrol_min: 100.0,
            patrol_max: 200.0,
            speed: 60.0,
        }
    }

    #[test]
    fn rect_overlap_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(0.0, 10.0, 10.0, 10.0)));
        assert!(a.overlaps_x(&Rect::new(9.0, 100.0, 10.0, 10.0)));
    }

    #[test]
    fn hazard_reflects_at_patrol_bounds() {
        let mut h = hazard(195.0);
        h.patrol(0.5);
        assert_eq!(h.x, 200.0);
        assert_eq!(h.direction, -1);

        h.x = 105.0;
        h.patrol(0.5);
        assert_eq!(h.x, 100.0);
        assert_eq!(h.direction, 1);
    }

    #[test]
    fn hazard_stays_within_bounds() {
        let mut h = hazard(150.0);
        for _ in 0..1000 {
            h.patrol(1.0 / 60.0);
            assert!(h.x >= h.patrol_min && h.x <= h.patrol_max);
        }
    }

    #[test]
    fn landing_refills_only_from_airborne() {
        let config = SimConfig::default();
        let mut player = Player::spawn(&config);
        player.jumps_remaining = 0;

        player.land(config.ground_y, false);
        assert_eq!(player.jumps_remaining, 0);

        player.land(config.ground_y, true);
        assert_eq!(player.jumps_remaining, MAX_JUMPS);
        assert_eq!(player.y, config.spawn_y());
        assert_eq!(player.motion_state(), MotionState::Grounded);
    }
}
