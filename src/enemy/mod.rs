//! Patrolling enemy: wanders in random obstacle-free directions with
//! random pauses, and is stunned by hits.
//!
//! The enemy only computes a desired velocity; the host integrates it and
//! owns the position.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Direction samples tried before the enemy gives up and stands still.
pub const DIRECTION_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub move_speed: f32,
    pub direction_change_time: f32,
    /// Chance of pausing when a patrol leg ends.
    pub stop_chance: f32,
    pub stop_duration_min: f32,
    pub stop_duration_max: f32,
    pub obstacle_check_distance: f32,
    pub max_health: i32,
    pub stun_time: f32,
    pub aggro_range: f32,
    pub attack_range: f32,
    pub attack_damage: i32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            direction_change_time: 2.0,
            stop_chance: 0.6,
            stop_duration_min: 0.2,
            stop_duration_max: 0.6,
            obstacle_check_distance: 0.7,
            max_health: 10,
            stun_time: 1.0,
            aggro_range: 2.0,
            attack_range: 2.0,
            attack_damage: 1,
        }
    }
}

/// Only `Patrol` has behavior; the rest are labels for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnemyState {
    #[default]
    Patrol,
    Aggro,
    Charging,
    Cooldown,
}

/// Wall query along a ray, the enemy's only view of the level.
pub trait ObstacleProbe {
    fn blocked(&self, origin: Vec3, direction: Vec3, distance: f32) -> bool;
}

/// Hit-stun: velocity stays frozen until it runs out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stun {
    pub remaining: f32,
}

impl Stun {
    /// Returns true once the stun is over.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

#[derive(Debug, Clone)]
pub struct PatrolEnemy {
    pub tuning: EnemyTuning,
    state: EnemyState,
    velocity: Vec3,
    patrol_direction: Vec3,
    move_timer: f32,
    stop_timer: f32,
    is_stopped: bool,
    is_charging: bool,
    charge_cooldown_timer: f32,
    health: i32,
    dead: bool,
    stun: Option<Stun>,
}

impl PatrolEnemy {
    pub fn new(
        tuning: EnemyTuning,
        position: Vec3,
        probe: &dyn ObstacleProbe,
        rng: &mut impl Rng,
    ) -> Self {
        let health = tuning.max_health;
        let mut enemy = Self {
            tuning,
            state: EnemyState::Patrol,
            velocity: Vec3::ZERO,
            patrol_direction: Vec3::ZERO,
            move_timer: 0.0,
            stop_timer: 0.0,
            is_stopped: false,
            is_charging: false,
            charge_cooldown_timer: 0.0,
            health,
            dead: false,
            stun: None,
        };
        enemy.choose_new_direction(position, probe, rng);
        enemy
    }

    pub fn fixed_update(
        &mut self,
        dt: f32,
        position: Vec3,
        player: Option<Vec3>,
        probe: &dyn ObstacleProbe,
        rng: &mut impl Rng,
    ) {
        if self.dead {
            return;
        }

        if let Some(stun) = self.stun.as_mut() {
            self.velocity = Vec3::ZERO;
            if stun.tick(dt) {
                self.stun = None;
            }
            return;
        }

        self.charge_cooldown_timer = (self.charge_cooldown_timer - dt).max(0.0);
        self.update_state(position, player);

        if self.state == EnemyState::Patrol {
            self.patrol(dt, position, probe, rng);
        }
    }

    fn update_state(&mut self, position: Vec3, player: Option<Vec3>) {
        self.state = match player {
            Some(player) if position.distance(player) <= self.tuning.aggro_range => {
                EnemyState::Aggro
            }
            _ => EnemyState::Patrol,
        };
        if self.is_charging {
            self.state = EnemyState::Charging;
        }
        if self.charge_cooldown_timer > 0.0 {
            self.state = EnemyState::Cooldown;
        }
    }

    fn patrol(&mut self, dt: f32, position: Vec3, probe: &dyn ObstacleProbe, rng: &mut impl Rng) {
        if self.is_stopped {
            self.stop_timer -= dt;
            self.velocity = Vec3::ZERO;
            if self.stop_timer <= 0.0 {
                self.is_stopped = false;
                self.choose_new_direction(position, probe, rng);
            }
            return;
        }

        self.move_timer -= dt;
        if self.patrol_direction != Vec3::ZERO
            && probe.blocked(position, self.patrol_direction, self.tuning.obstacle_check_distance)
        {
            self.choose_new_direction(position, probe, rng);
            return;
        }

        self.velocity = self.patrol_direction * self.tuning.move_speed;
        if self.move_timer <= 0.0 {
            if rng.gen::<f32>() < self.tuning.stop_chance {
                self.start_stop(rng);
            } else {
                self.choose_new_direction(position, probe, rng);
            }
        }
    }

    /// Samples up to `DIRECTION_ATTEMPTS` flat unit directions. When all of
    /// them are blocked the enemy freezes in place.
    fn choose_new_direction(&mut self, position: Vec3, probe: &dyn ObstacleProbe, rng: &mut impl Rng) {
        for _ in 0..DIRECTION_ATTEMPTS {
            let angle = rng.gen_range(0.0..TAU);
            let dir = Vec3::new(angle.cos(), 0.0, angle.sin());
            if !probe.blocked(position, dir, self.tuning.obstacle_check_distance) {
                self.patrol_direction = dir;
                self.move_timer = self.tuning.direction_change_time;
                return;
            }
        }
        debug!("[Enemy] Boxed in at {:?}, holding still", position);
        self.patrol_direction = Vec3::ZERO;
    }

    fn start_stop(&mut self, rng: &mut impl Rng) {
        let (min, max) = (self.tuning.stop_duration_min, self.tuning.stop_duration_max);
        self.is_stopped = true;
        self.stop_timer = if max > min { rng.gen_range(min..max) } else { min };
        self.velocity = Vec3::ZERO;
    }

    /// Returns true if this hit killed the enemy.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if self.dead {
            return false;
        }

        self.velocity = Vec3::ZERO;
        self.health -= amount;
        if self.health <= 0 {
            self.dead = true;
            self.stun = None;
            info!("[Enemy] Killed");
            return true;
        }

        self.stun = Some(Stun {
            remaining: self.tuning.stun_time,
        });
        false
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn patrol_direction(&self) -> Vec3 {
        self.patrol_direction
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_stunned(&self) -> bool {
        self.stun.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.is_stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;

    const DT: f32 = 0.02;

    struct Probe {
        blocked: Cell<bool>,
        calls: Cell<usize>,
    }

    impl Probe {
        fn open() -> Self {
            Self {
                blocked: Cell::new(false),
                calls: Cell::new(0),
            }
        }

        fn walled() -> Self {
            let probe = Self::open();
            probe.blocked.set(true);
            probe
        }
    }

    impl ObstacleProbe for Probe {
        fn blocked(&self, _origin: Vec3, _direction: Vec3, _distance: f32) -> bool {
            self.calls.set(self.calls.get() + 1);
            self.blocked.get()
        }
    }

    fn never_stops() -> EnemyTuning {
        EnemyTuning {
            stop_chance: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_open_field_patrols_at_move_speed() {
        let mut rng = StdRng::seed_from_u64(7);
        let probe = Probe::open();
        let mut enemy = PatrolEnemy::new(never_stops(), Vec3::ZERO, &probe, &mut rng);

        enemy.fixed_update(DT, Vec3::ZERO, None, &probe, &mut rng);
        assert_eq!(enemy.state(), EnemyState::Patrol);
        assert!((enemy.velocity().length() - 5.0).abs() < 1e-4);
        assert_eq!(enemy.velocity().y, 0.0);
    }

    #[test]
    fn test_boxed_in_freezes_after_eight_samples() {
        let mut rng = StdRng::seed_from_u64(1);
        let probe = Probe::walled();
        let mut enemy = PatrolEnemy::new(EnemyTuning::default(), Vec3::ZERO, &probe, &mut rng);

        assert_eq!(probe.calls.get(), DIRECTION_ATTEMPTS);
        assert_eq!(enemy.patrol_direction(), Vec3::ZERO);

        enemy.fixed_update(DT, Vec3::ZERO, None, &probe, &mut rng);
        assert_eq!(enemy.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_wall_ahead_rechooses_direction() {
        let mut rng = StdRng::seed_from_u64(3);
        let probe = Probe::open();
        let mut enemy = PatrolEnemy::new(never_stops(), Vec3::ZERO, &probe, &mut rng);
        enemy.fixed_update(DT, Vec3::ZERO, None, &probe, &mut rng);

        probe.blocked.set(true);
        probe.calls.set(0);
        enemy.fixed_update(DT, Vec3::ZERO, None, &probe, &mut rng);
        assert_eq!(probe.calls.get(), 1 + DIRECTION_ATTEMPTS);
        assert_eq!(enemy.patrol_direction(), Vec3::ZERO);
    }

    #[test]
    fn test_leg_end_can_pause() {
        let mut rng = StdRng::seed_from_u64(11);
        let probe = Probe::open();
        let tuning = EnemyTuning {
            stop_chance: 1.0,
            direction_change_time: DT,
            ..Default::default()
        };
        let mut enemy = PatrolEnemy::new(tuning, Vec3::ZERO, &probe, &mut rng);

        enemy.fixed_update(DT, Vec3::ZERO, None, &probe, &mut rng);
        assert!(enemy.is_stopped());
        assert_eq!(enemy.velocity(), Vec3::ZERO);
        assert!((0.2..0.6).contains(&enemy.stop_timer));

        // Longest possible pause is 0.6s.
        let mut resumed = false;
        for _ in 0..35 {
            enemy.fixed_update(DT, Vec3::ZERO, None, &probe, &mut rng);
            resumed |= !enemy.is_stopped();
        }
        assert!(resumed);
    }

    #[test]
    fn test_player_in_range_is_aggro() {
        let mut rng = StdRng::seed_from_u64(5);
        let probe = Probe::open();
        let mut enemy = PatrolEnemy::new(EnemyTuning::default(), Vec3::ZERO, &probe, &mut rng);

        enemy.fixed_update(DT, Vec3::ZERO, Some(Vec3::new(1.5, 0.0, 0.0)), &probe, &mut rng);
        assert_eq!(enemy.state(), EnemyState::Aggro);

        enemy.fixed_update(DT, Vec3::ZERO, Some(Vec3::new(5.0, 0.0, 0.0)), &probe, &mut rng);
        assert_eq!(enemy.state(), EnemyState::Patrol);
    }

    #[test]
    fn test_stun_freezes_velocity() {
        let mut rng = StdRng::seed_from_u64(9);
        let probe = Probe::open();
        let mut enemy = PatrolEnemy::new(never_stops(), Vec3::ZERO, &probe, &mut rng);
        enemy.fixed_update(DT, Vec3::ZERO, None, &probe, &mut rng);

        assert!(!enemy.apply_damage(3));
        assert_eq!(enemy.health(), 7);
        assert!(enemy.is_stunned());

        for _ in 0..25 {
            enemy.fixed_update(DT, Vec3::ZERO, None, &probe, &mut rng);
            assert_eq!(enemy.velocity(), Vec3::ZERO);
        }

        for _ in 0..30 {
            enemy.fixed_update(DT, Vec3::ZERO, None, &probe, &mut rng);
        }
        assert!(!enemy.is_stunned());
        assert!(enemy.velocity().length() > 0.0);
    }

    #[test]
    fn test_lethal_hit_kills() {
        let mut rng = StdRng::seed_from_u64(2);
        let probe = Probe::open();
        let mut enemy = PatrolEnemy::new(EnemyTuning::default(), Vec3::ZERO, &probe, &mut rng);

        assert!(enemy.apply_damage(10));
        assert!(enemy.is_dead());
        assert!(!enemy.apply_damage(1), "already dead");
    }
}
