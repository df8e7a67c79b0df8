//! Session state and the per-frame simulation step

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SimConfig;
use crate::error::GameError;
use crate::util::time::clamp_delta;

use super::entities::{Coin, DashState, Hazard, NarrativeTrigger, Platform, Player};
use super::events::GameEvent;
use super::level::Level;
use super::physics::PhysicsSystem;
use super::power::{PowerKind, PowerSystem, TimedEffect};
use super::snapshot::{HazardSnapshot, PlayerSnapshot, PowerSnapshot, SessionSnapshot};
use super::InputState;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for the first step to start the timer
    Ready,
    /// Timer running
    Running,
    /// Terminal until reset
    Ended { victory: bool },
}

/// One play session (owned by a single controller)
#[derive(Debug, Clone)]
pub struct GameSession {
    id: Uuid,
    config: SimConfig,
    /// Pristine layout, restored on reset
    level: Level,
    phase: SessionPhase,

    // Session clock (seconds of simulated time)
    clock: f64,
    started_at: Option<f64>,
    frame: u64,

    // Entities
    player: Player,
    powers: PowerSystem,
    hazards: Vec<Hazard>,
    platforms: Vec<Platform>,
    coins: Vec<Coin>,
    triggers: Vec<NarrativeTrigger>,
    collected: u32,
    camera_x: f32,

    // Input edge tracking
    jump_was_held: bool,

    /// Kinds offered by the latest choice prompt
    pending_choice: Option<Vec<PowerKind>>,
    end_zone_notified: bool,
}

impl GameSession {
    pub fn new(config: SimConfig, level: Level) -> Self {
        Self::with_id(Uuid::new_v4(), config, level)
    }

    pub fn with_id(id: Uuid, config: SimConfig, level: Level) -> Self {
        let player = Player::spawn(&config);
        let camera_x = PhysicsSystem::camera_x(player.x, &config);

        Self {
            id,
            powers: PowerSystem::new(&config),
            hazards: level.hazards.clone(),
            platforms: level.platforms.clone(),
            coins: level.coins.clone(),
            triggers: level.triggers.clone(),
            level,
            phase: SessionPhase::Ready,
            clock: 0.0,
            started_at: None,
            frame: 0,
            player,
            collected: 0,
            camera_x,
            jump_was_held: false,
            pending_choice: None,
            end_zone_notified: false,
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, SessionPhase::Ended { .. })
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn powers(&self) -> &PowerSystem {
        &self.powers
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn collected(&self) -> u32 {
        self.collected
    }

    pub fn camera_x(&self) -> f32 {
        self.camera_x
    }

    pub fn pending_choice(&self) -> Option<&[PowerKind]> {
        self.pending_choice.as_deref()
    }

    /// Simulated seconds since the first step
    pub fn elapsed(&self) -> f64 {
        self.started_at.map(|start| self.clock - start).unwrap_or(0.0)
    }

    /// Exact time left on the session timer
    pub fn remaining_time(&self) -> f64 {
        self.config.session_duration_secs - self.elapsed()
    }

    /// Time left in whole seconds, as shown on the HUD
    pub fn remaining_secs(&self) -> u32 {
        (self.config.session_duration_secs - self.elapsed().floor()).max(0.0) as u32
    }

    /// Advance the simulation by one frame.
    ///
    /// `dt` is clamped to the configured maximum. A zero, negative or
    /// non-finite `dt` still runs the timer and power expiry but moves
    /// nothing. Once the session has ended every call is a no-op.
    pub fn step(&mut self, dt: f32, input: InputState) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.is_ended() {
            return events;
        }

        let dt = clamp_delta(dt, self.config.max_frame_delta);
        if self.started_at.is_none() {
            self.started_at = Some(self.clock);
            self.phase = SessionPhase::Running;
            info!(session_id = %self.id, "Session started");
        }
        if dt > 0.0 {
            self.clock += dt as f64;
        }
        self.frame += 1;

        if self.remaining_time() <= 0.0 {
            self.end(false, &mut events);
            return events;
        }

        if let Some(effect) = self.powers.clear_if_expired(self.clock) {
            info!(session_id = %self.id, power = %effect.kind(), "Power-up expired");
            events.push(self.message("The power-up wore off."));
        }

        if dt <= 0.0 {
            return events;
        }

        self.update_dash(dt, input);
        self.update_jump(input);

        let gravity = if self.powers.is_active(TimedEffect::Balloon) {
            self.config.gravity * self.config.balloon_gravity_scale
        } else {
            self.config.gravity
        };
        let prev_bottom = self.player.bottom();
        PhysicsSystem::apply_gravity(&mut self.player, gravity, dt);
        PhysicsSystem::integrate(&mut self.player, dt);
        for hazard in &mut self.hazards {
            hazard.patrol(dt);
        }

        self.resolve_collisions(prev_bottom, &mut events);
        events
    }

    /// Dash cooldown, activation, and horizontal control
    fn update_dash(&mut self, dt: f32, input: InputState) {
        let player = &mut self.player;
        let move_speed = self.powers.params().move_speed;

        player.dash_cooldown = (player.dash_cooldown - dt).max(0.0);

        let dash_granted =
            !self.config.dash_requires_power || self.powers.is_active(TimedEffect::Dash);
        if dash_granted && input.dash && player.dash_cooldown == 0.0 {
            let direction = if input.left {
                -1.0
            } else if input.right {
                1.0
            } else {
                player.facing as f32
            };
            player.dash = DashState::Dashing {
                time_left: self.config.dash_duration,
            };
            player.dash_cooldown = self.config.dash_cooldown + self.config.dash_duration;
            player.vel_x = direction * self.config.dash_speed;
            player.vel_y = -self.config.dash_lift;
            debug!(session_id = %self.id, direction, "Dash started");
        }

        match player.dash {
            DashState::Dashing { time_left } => {
                let time_left = time_left - dt;
                if time_left <= 0.0 {
                    player.dash = DashState::Idle;
                    player.vel_x = input.horizontal() * move_speed;
                } else {
                    player.dash = DashState::Dashing { time_left };
                }
            }
            DashState::Idle => {
                if input.left {
                    player.vel_x = -move_speed;
                    player.facing = -1;
                } else if input.right {
                    player.vel_x = move_speed;
                    player.facing = 1;
                } else {
                    player.vel_x = 0.0;
                }
            }
        }
    }

    /// Edge-triggered jump with a double-jump budget
    fn update_jump(&mut self, input: InputState) {
        if input.jump && !self.jump_was_held && self.player.jumps_remaining > 0 {
            self.player.vel_y = -self.powers.params().jump_impulse;
            self.player.jumps_remaining -= 1;
            self.player.grounded = false;
        }
        self.jump_was_held = input.jump;
    }

    /// Ground, platforms, hazards, clamp, camera, coins, triggers, end zone
    fn resolve_collisions(&mut self, prev_bottom: f32, events: &mut Vec<GameEvent>) {
        let was_airborne = !self.player.grounded;
        PhysicsSystem::resolve_ground(&mut self.player, self.config.ground_y, was_airborne);
        PhysicsSystem::resolve_platforms(
            &mut self.player,
            &self.platforms,
            self.config.platform_tolerance,
            prev_bottom,
            was_airborne,
        );

        let body = self.player.bounds();
        if self.hazards.iter().any(|h| h.bounds().intersects(&body)) {
            debug!(session_id = %self.id, x = body.x, "Player hit a hazard");
            self.reset_player();
            events.push(GameEvent::PlayerReset);
            return;
        }

        PhysicsSystem::clamp_to_world(&mut self.player, self.config.world_width);
        self.camera_x = PhysicsSystem::camera_x(self.player.x, &self.config);

        self.collect_coins();
        self.check_triggers(events);
        self.check_end_zone(events);
    }

    fn collect_coins(&mut self) {
        let body = self.player.bounds();
        let size = self.config.coin_size;
        for coin in self.coins.iter_mut().filter(|c| !c.taken) {
            if coin.bounds(size).intersects(&body) {
                coin.taken = true;
                self.collected += 1;
                debug!(session_id = %self.id, collected = self.collected, "Coin collected");
            }
        }
    }

    fn check_triggers(&mut self, events: &mut Vec<GameEvent>) {
        let x = self.player.x;
        let tolerance = self.config.trigger_tolerance;
        for trigger in self.triggers.iter_mut().filter(|t| !t.used) {
            if x >= trigger.x - tolerance {
                trigger.used = true;
                self.pending_choice = Some(trigger.options.iter().map(|o| o.kind).collect());
                events.push(GameEvent::ShowChoice {
                    prompt: trigger.prompt.clone(),
                    options: trigger.options.clone(),
                });
            }
        }
    }

    fn check_end_zone(&mut self, events: &mut Vec<GameEvent>) {
        if !PhysicsSystem::in_end_zone(&self.player, &self.config) {
            self.end_zone_notified = false;
            return;
        }

        let required = self.config.min_coins_to_win;
        if self.collected < required {
            if !self.end_zone_notified {
                self.end_zone_notified = true;
                let text = format!(
                    "Collect at least {} coins before finishing ({} so far).",
                    required, self.collected
                );
                events.push(self.message(text));
            }
            return;
        }

        self.end(true, events);
    }

    fn end(&mut self, victory: bool, events: &mut Vec<GameEvent>) {
        self.phase = SessionPhase::Ended { victory };
        events.push(GameEvent::SessionEnded { victory });
        info!(
            session_id = %self.id,
            victory,
            elapsed = self.elapsed(),
            collected = self.collected,
            "Session ended"
        );
    }

    /// Send the player back to spawn, dropping any power-up
    fn reset_player(&mut self) {
        self.player = Player::spawn(&self.config);
        self.powers.clear();
    }

    fn message(&self, text: impl Into<String>) -> GameEvent {
        GameEvent::ShowMessage {
            text: text.into(),
            duration_ms: self.config.message_duration_ms,
        }
    }

    /// Apply a power-up now, replacing any active one
    pub fn apply_power(&mut self, kind: PowerKind) -> Vec<GameEvent> {
        if self.is_ended() {
            debug!(session_id = %self.id, power = %kind, "Ignoring power-up after session end");
            return Vec::new();
        }

        self.powers.apply(kind, self.clock, &self.config);
        info!(session_id = %self.id, power = %kind, "Power-up applied");
        vec![self.message(kind.description())]
    }

    /// Apply a power-up by name; unknown names change nothing
    pub fn apply_power_named(&mut self, name: &str) -> Result<Vec<GameEvent>, GameError> {
        match name.parse::<PowerKind>() {
            Ok(kind) => Ok(self.apply_power(kind)),
            Err(err) => {
                warn!(session_id = %self.id, power = name, "Unknown power-up kind");
                Err(err)
            }
        }
    }

    /// Resolve the pending choice with `kind`
    pub fn select_power(&mut self, kind: PowerKind) -> Result<Vec<GameEvent>, GameError> {
        if self.is_ended() {
            return Err(GameError::SessionEnded(self.id));
        }
        let offered = self.pending_choice.as_ref().ok_or(GameError::NoChoicePending)?;
        if !offered.contains(&kind) {
            warn!(session_id = %self.id, power = %kind, "Selected power-up was not offered");
            return Err(GameError::PowerNotOffered(kind));
        }

        self.pending_choice = None;
        Ok(self.apply_power(kind))
    }

    /// Reinitialise every entity and the timer
    pub fn reset(&mut self) {
        info!(session_id = %self.id, "Session reset");
        let fresh = Self::with_id(self.id, self.config.clone(), self.level.clone());
        *self = fresh;
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> SessionSnapshot {
        let p = &self.player;
        let span = (self.config.world_width - p.width).max(1.0);

        SessionSnapshot {
            frame: self.frame,
            phase: self.phase,
            player: PlayerSnapshot {
                x: p.x,
                y: p.y,
                vel_x: p.vel_x,
                vel_y: p.vel_y,
                width: p.width,
                height: p.height,
                facing: p.facing,
                motion: p.motion_state(),
                jumps_remaining: p.jumps_remaining,
                dash: p.dash,
                dash_cooldown: p.dash_cooldown,
            },
            power: self.powers.active().map(|active| PowerSnapshot {
                kind: active.effect.kind(),
                remaining_ms: (self.powers.remaining_secs(self.clock).unwrap_or(0.0) * 1000.0)
                    as u64,
            }),
            hazards: self
                .hazards
                .iter()
                .map(|h| HazardSnapshot {
                    x: h.x,
                    y: h.y,
                    width: h.width,
                    height: h.height,
                    direction: h.direction,
                })
                .collect(),
            platforms: self.platforms.clone(),
            coins_taken: self.coins.iter().map(|c| c.taken).collect(),
            camera_x: self.camera_x,
            remaining_secs: self.remaining_secs(),
            collected: self.collected,
            progress: (p.x / span).clamp(0.0, 1.0),
        }
    }
}
