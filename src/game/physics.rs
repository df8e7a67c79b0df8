//! Platformer physics and collision resolution

use crate::config::SimConfig;

use super::entities::{Platform, Player, Rect};

/// Stateless physics helpers operating on the player and level geometry
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Add gravity to vertical velocity
    pub fn apply_gravity(player: &mut Player, gravity: f32, dt: f32) {
        player.vel_y += gravity * dt;
    }

    /// Advance position by velocity
    pub fn integrate(player: &mut Player, dt: f32) {
        player.x += player.vel_x * dt;
        player.y += player.vel_y * dt;
    }

    /// Resolve against the ground line.
    ///
    /// Crossing the line snaps the player onto it. Otherwise grounded is
    /// cleared provisionally; a platform may set it again.
    pub fn resolve_ground(player: &mut Player, ground_y: f32, was_airborne: bool) {
        if player.bottom() > ground_y {
            player.land(ground_y, was_airborne);
        } else {
            player.grounded = false;
        }
    }

    /// One-way platform support from above.
    ///
    /// The player lands when horizontally overlapping, falling or at rest,
    /// and the lower edge either sits within `tolerance` below the platform
    /// top or crossed the top during this frame (`prev_bottom` is the lower
    /// edge before integration). Returns whether any platform caught the player.
    pub fn resolve_platforms(
        player: &mut Player,
        platforms: &[Platform],
        tolerance: f32,
        prev_bottom: f32,
        was_airborne: bool,
    ) -> bool {
        let mut landed = false;
        for platform in platforms {
            let body = player.bounds();
            if Self::rests_on(&body, player.vel_y, prev_bottom, platform, tolerance) {
                player.land(platform.y, was_airborne);
                landed = true;
            }
        }
        landed
    }

    fn rests_on(
        body: &Rect,
        vel_y: f32,
        prev_bottom: f32,
        platform: &Platform,
        tolerance: f32,
    ) -> bool {
        let bottom = body.bottom();
        let within_band = bottom <= platform.y + tolerance;
        let crossed_top = prev_bottom <= platform.y;
        vel_y >= 0.0
            && body.overlaps_x(platform)
            && bottom >= platform.y
            && (within_band || crossed_top)
    }

    /// Keep the player inside the horizontal world extent
    pub fn clamp_to_world(player: &mut Player, world_width: f32) {
        let max_x = (world_width - player.width).max(0.0);
        player.x = player.x.max(0.0).min(max_x);
    }

    /// Camera offset following the player, kept inside the world
    pub fn camera_x(player_x: f32, config: &SimConfig) -> f32 {
        let max_x = (config.world_width - config.viewport_width).max(0.0);
        (player_x - config.viewport_width * config.camera_lead)
            .min(max_x)
            .max(0.0)
    }

    /// Player has reached the end zone at the right edge of the world
    pub fn in_end_zone(player: &Player, config: &SimConfig) -> bool {
        player.x >= config.world_width - player.width - config.end_zone_tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::MAX_JUMPS;

    fn airborne_player(config: &SimConfig) -> Player {
        let mut player = Player::spawn(config);
        player.grounded = false;
        player.jumps_remaining = 0;
        player
    }

    #[test]
    fn ground_snaps_and_refills() {
        let config = SimConfig::default();
        let mut player = airborne_player(&config);
        player.y = config.ground_y - player.height + 5.0;
        player.vel_y = 300.0;

        PhysicsSystem::resolve_ground(&mut player, config.ground_y, true);
        assert!(player.grounded);
        assert_eq!(player.vel_y, 0.0);
        assert_eq!(player.jumps_remaining, MAX_JUMPS);
        assert_eq!(player.bottom(), config.ground_y);
    }

    #[test]
    fn above_ground_clears_grounded() {
        let config = SimConfig::default();
        let mut player = Player::spawn(&config);
        player.y -= 30.0;

        PhysicsSystem::resolve_ground(&mut player, config.ground_y, false);
        assert!(!player.grounded);
    }

    #[test]
    fn platform_catches_falling_player_only() {
        let config = SimConfig::default();
        let platform = Rect::new(60.0, 300.0, 120.0, 16.0);
        let mut player = airborne_player(&config);
        player.y = 300.0 - player.height + 4.0;

        let prev_bottom = player.bottom();

        player.vel_y = -200.0;
        assert!(!PhysicsSystem::resolve_platforms(&mut player, &[platform], 20.0, prev_bottom, true));
        assert!(!player.grounded);

        player.vel_y = 200.0;
        assert!(PhysicsSystem::resolve_platforms(&mut player, &[platform], 20.0, prev_bottom, true));
        assert!(player.grounded);
        assert_eq!(player.bottom(), 300.0);
        assert_eq!(player.jumps_remaining, MAX_JUMPS);
    }

    #[test]
    fn platform_ignores_player_below_band_or_beside() {
        let config = SimConfig::default();
        let platform = Rect::new(60.0, 300.0, 120.0, 16.0);
        let mut player = airborne_player(&config);
        player.vel_y = 100.0;

        // Already below the top before moving: no catch outside the band
        player.y = 300.0 - player.height + 25.0;
        let prev_bottom = player.bottom() - 2.0;
        assert!(!PhysicsSystem::resolve_platforms(&mut player, &[platform], 20.0, prev_bottom, true));

        player.y = 300.0 - player.height + 2.0;
        player.x = 200.0;
        assert!(!PhysicsSystem::resolve_platforms(&mut player, &[platform], 20.0, 290.0, true));
    }

    #[test]
    fn fast_fall_past_band_still_lands() {
        let config = SimConfig::default();
        let platform = Rect::new(60.0, 300.0, 120.0, 16.0);
        let mut player = airborne_player(&config);
        player.vel_y = 1500.0;

        // Lower edge moved from 295 to 345 in one frame, well past the band
        player.y = 345.0 - player.height;
        assert!(PhysicsSystem::resolve_platforms(&mut player, &[platform], 20.0, 295.0, true));
        assert!(player.grounded);
        assert_eq!(player.bottom(), 300.0);
        assert_eq!(player.vel_y, 0.0);
    }

    #[test]
    fn camera_clamps_to_world() {
        let config = SimConfig::default();
        assert_eq!(PhysicsSystem::camera_x(80.0, &config), 0.0);
        assert_eq!(PhysicsSystem::camera_x(1000.0, &config), 1000.0 - 384.0);
        assert_eq!(PhysicsSystem::camera_x(2336.0, &config), 2400.0 - 960.0);
    }

    #[test]
    fn clamp_keeps_player_inside() {
        let config = SimConfig::default();
        let mut player = Player::spawn(&config);
        player.x = -12.0;
        PhysicsSystem::clamp_to_world(&mut player, config.world_width);
        assert_eq!(player.x, 0.0);

        player.x = 5000.0;
        PhysicsSystem::clamp_to_world(&mut player, config.world_width);
        assert_eq!(player.x, config.world_width - player.width);
        assert!(PhysicsSystem::in_end_zone(&player, &config));
    }
}
