//! Power-up system - timed modifiers to player movement

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::GameError;

/// Power-up kinds that can be offered and applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerKind {
    /// Higher jumps
    Spring,
    /// Faster running
    Fish,
    /// Slower falling
    Balloon,
    /// Instant effect, never stays active
    Horn,
    /// Dash eligibility when dashing is gated
    Dash,
}

impl PowerKind {
    pub const ALL: [PowerKind; 5] = [
        PowerKind::Spring,
        PowerKind::Fish,
        PowerKind::Balloon,
        PowerKind::Horn,
        PowerKind::Dash,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PowerKind::Spring => "spring",
            PowerKind::Fish => "fish",
            PowerKind::Balloon => "balloon",
            PowerKind::Horn => "horn",
            PowerKind::Dash => "dash",
        }
    }

    /// The persistent effect for this kind, `None` for instant kinds
    pub fn timed_effect(self) -> Option<TimedEffect> {
        match self {
            PowerKind::Spring => Some(TimedEffect::Spring),
            PowerKind::Fish => Some(TimedEffect::Fish),
            PowerKind::Balloon => Some(TimedEffect::Balloon),
            PowerKind::Dash => Some(TimedEffect::Dash),
            PowerKind::Horn => None,
        }
    }

    /// Message shown to the player when the power is applied
    pub fn description(self) -> &'static str {
        match self {
            PowerKind::Spring => "You equipped a little spring! Your jumps go higher for a while.",
            PowerKind::Fish => "You ate a dried fish! You run faster for a while.",
            PowerKind::Balloon => "You grabbed a colorful balloon! You fall more slowly for a while.",
            PowerKind::Horn => "You blew the little horn! The path ahead is cleared.",
            PowerKind::Dash => "Purr power! Hold dash for an extra burst for a while.",
        }
    }
}

impl fmt::Display for PowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PowerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GameError::UnknownPower(s.to_string()))
    }
}

/// Effects that persist until expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimedEffect {
    Spring,
    Fish,
    Balloon,
    Dash,
}

impl TimedEffect {
    pub fn kind(self) -> PowerKind {
        match self {
            TimedEffect::Spring => PowerKind::Spring,
            TimedEffect::Fish => PowerKind::Fish,
            TimedEffect::Balloon => PowerKind::Balloon,
            TimedEffect::Dash => PowerKind::Dash,
        }
    }
}

/// The single active power-up and its expiry on the session clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivePower {
    pub effect: TimedEffect,
    pub expires_at: f64,
}

/// Movement parameters that power-ups modify
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementParams {
    pub move_speed: f32,
    pub jump_impulse: f32,
}

impl MovementParams {
    pub fn base(config: &SimConfig) -> Self {
        Self {
            move_speed: config.base_move_speed,
            jump_impulse: config.base_jump_impulse,
        }
    }
}

/// Power-up state machine: at most one active power, with expiry
#[derive(Debug, Clone)]
pub struct PowerSystem {
    active: Option<ActivePower>,
    params: MovementParams,
    base: MovementParams,
}

impl PowerSystem {
    pub fn new(config: &SimConfig) -> Self {
        let base = MovementParams::base(config);
        Self {
            active: None,
            params: base,
            base,
        }
    }

    pub fn params(&self) -> MovementParams {
        self.params
    }

    pub fn active(&self) -> Option<ActivePower> {
        self.active
    }

    pub fn is_active(&self, effect: TimedEffect) -> bool {
        self.active.map(|a| a.effect) == Some(effect)
    }

    /// Apply `kind` at time `now`, replacing any current power
    pub fn apply(&mut self, kind: PowerKind, now: f64, config: &SimConfig) {
        self.params = self.base;

        match kind.timed_effect() {
            Some(effect) => {
                self.active = Some(ActivePower {
                    effect,
                    expires_at: now + config.power_duration_secs(),
                });
            }
            // Horn acts instantly and leaves nothing active behind
            None => self.active = None,
        }

        match kind {
            PowerKind::Spring => {
                self.params.jump_impulse = self.base.jump_impulse * config.spring_jump_multiplier;
            }
            PowerKind::Fish => {
                self.params.move_speed = self.base.move_speed * config.fish_speed_multiplier;
            }
            PowerKind::Balloon | PowerKind::Horn | PowerKind::Dash => {}
        }
    }

    /// Clear the active power if `now` is past its expiry.
    /// Returns the expired effect.
    pub fn clear_if_expired(&mut self, now: f64) -> Option<TimedEffect> {
        let active = self.active?;
        if now > active.expires_at {
            self.clear();
            Some(active.effect)
        } else {
            None
        }
    }

    /// Drop any active power and restore base parameters
    pub fn clear(&mut self) {
        self.active = None;
        self.params = self.base;
    }

    /// Seconds until the active power expires
    pub fn remaining_secs(&self, now: f64) -> Option<f64> {
        self.active.map(|a| (a.expires_at - now).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spring_and_fish_scale_from_base() {
        let config = SimConfig::default();
        let mut powers = PowerSystem::new(&config);

        powers.apply(PowerKind::Spring, 0.0, &config);
        assert!((powers.params().jump_impulse - 1008.0).abs() < 1e-3);
        assert_eq!(powers.params().move_speed, 220.0);

        // Replacing resets the spring boost before applying fish
        powers.apply(PowerKind::Fish, 1.0, &config);
        assert_eq!(powers.params().jump_impulse, 560.0);
        assert_eq!(powers.params().move_speed, 330.0);
        assert!(powers.is_active(TimedEffect::Fish));
        assert_eq!(powers.active().unwrap().expires_at, 6.0);
    }

    #[test]
    fn horn_never_stays_active() {
        let config = SimConfig::default();
        let mut powers = PowerSystem::new(&config);

        powers.apply(PowerKind::Spring, 0.0, &config);
        powers.apply(PowerKind::Horn, 0.5, &config);
        assert!(powers.active().is_none());
        assert_eq!(powers.params(), MovementParams::base(&config));
    }

    #[test]
    fn expiry_is_strictly_after_deadline() {
        let config = SimConfig::default();
        let mut powers = PowerSystem::new(&config);
        powers.apply(PowerKind::Balloon, 2.0, &config);

        assert_eq!(powers.clear_if_expired(7.0), None);
        assert_eq!(powers.clear_if_expired(7.001), Some(TimedEffect::Balloon));
        assert!(powers.active().is_none());
        assert_eq!(powers.clear_if_expired(8.0), None);
    }

    #[test]
    fn parse_kind_names() {
        assert_eq!("dash".parse::<PowerKind>().unwrap(), PowerKind::Dash);
        assert!(matches!(
            "rocket".parse::<PowerKind>(),
            Err(GameError::UnknownPower(name)) if name == "rocket"
        ));
    }
}
