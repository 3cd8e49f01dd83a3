use bevy::prelude::*;

use super::animation::{delta_angle, AnimDirection, AnimParam, Animator};
use super::health::{DamageOutcome, Health};
use super::input::{CameraBasis, InputSource, PlayerInputHandler};
use super::motor::CharacterMotor;
use super::roll::RollState;
use super::tuning::CharacterTuning;

/// Player frame logic. `update` runs at render cadence (input, commands,
/// timers); `fixed_update` runs at physics cadence and drives the motor and
/// the animator.
pub struct PlayerController {
    tuning: CharacterTuning,
    input: PlayerInputHandler,
    health: Health,

    velocity_xz: Vec3,
    grounded: bool,
    prev_grounded_fixed: bool,
    coyote_timer: f32,
    jump_buffer_timer: f32,
    jump_consumed: bool,
    jump_cooldown_timer: f32,
    is_jumping: bool,
    jump_was_cut: bool,
    jump_released: bool,

    roll: Option<RollState>,
    roll_cooldown_timer: f32,

    direction: AnimDirection,
    was_grounded: bool,
    jump_executed: bool,
    pending_triggers: Vec<AnimParam>,
    prev_camera_yaw: Option<f32>,
    model_rotation: Quat,

    active: bool,
}

impl PlayerController {
    pub fn new(tuning: CharacterTuning) -> Self {
        let health = Health::new(tuning.max_health, tuning.invulnerable_on_hit);
        Self {
            tuning,
            input: PlayerInputHandler::default(),
            health,
            velocity_xz: Vec3::ZERO,
            grounded: false,
            prev_grounded_fixed: false,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            jump_consumed: false,
            jump_cooldown_timer: 0.0,
            is_jumping: false,
            jump_was_cut: false,
            jump_released: false,
            roll: None,
            roll_cooldown_timer: 0.0,
            direction: AnimDirection::Idle,
            was_grounded: false,
            jump_executed: false,
            pending_triggers: Vec::new(),
            prev_camera_yaw: None,
            model_rotation: Quat::IDENTITY,
            active: true,
        }
    }

    // ─── render cadence ──────────────────────────────────────────────────

    pub fn update(&mut self, dt: f32, source: &mut dyn InputSource, camera: &CameraBasis) {
        if !self.active || self.health.is_dead() {
            return;
        }
        self.input.read(source, camera);
        self.process_input_commands();
        self.tick_timers(dt);
    }

    fn process_input_commands(&mut self) {
        if self.input.jump_pressed() {
            self.jump_buffer_timer = self.tuning.jump_buffer_time;
            self.jump_consumed = false;
        }

        // Latched until the fixed step consumes it.
        if self.input.jump_released() {
            self.jump_released = true;
        }

        if self.input.roll_pressed() && self.can_roll() {
            self.start_roll();
        }
    }

    fn tick_timers(&mut self, dt: f32) {
        self.roll_cooldown_timer = (self.roll_cooldown_timer - dt).max(0.0);
        self.jump_buffer_timer = (self.jump_buffer_timer - dt).max(0.0);
        self.jump_cooldown_timer = (self.jump_cooldown_timer - dt).max(0.0);
        self.health.tick(dt);
    }

    // ─── physics cadence ─────────────────────────────────────────────────

    pub fn fixed_update(
        &mut self,
        dt: f32,
        motor: &mut dyn CharacterMotor,
        animator: &mut dyn Animator,
        camera: &CameraBasis,
    ) {
        if !self.active || self.health.is_dead() {
            return;
        }
        self.check_ground(dt, motor);
        self.apply_movement(dt, motor);
        self.apply_roll(dt, motor);
        self.apply_jump(motor);
        self.apply_jump_cut(motor);
        self.apply_gravity_modifiers(dt, motor);
        motor.update_collider(!self.grounded);
        self.rotate_model(dt, camera);
        self.update_animator(dt, animator, camera);
    }

    fn check_ground(&mut self, dt: f32, motor: &mut dyn CharacterMotor) {
        motor.update_ground_state();
        self.grounded = motor.is_grounded();

        if self.grounded {
            self.coyote_timer = self.tuning.coyote_time;
            self.is_jumping = false;
        } else if self.prev_grounded_fixed {
            // Only on the grounded -> airborne edge.
            self.coyote_timer = self.tuning.coyote_time;
        }

        self.coyote_timer = (self.coyote_timer - dt).max(0.0);
        self.prev_grounded_fixed = self.grounded;
    }

    fn apply_movement(&mut self, dt: f32, motor: &mut dyn CharacterMotor) {
        if self.roll.is_some() {
            return;
        }

        let dir = self.input.move_direction();
        let speed = self.tuning.move_speed;
        let target = Vec3::new(dir.x * speed, 0.0, dir.z * speed);
        let smooth_time = if dir.length_squared() > 0.01 {
            self.tuning.acceleration_time
        } else {
            self.tuning.deceleration_time
        };

        self.velocity_xz = move_towards(
            self.velocity_xz,
            target,
            speed / smooth_time.max(0.001) * dt,
        );
        motor.set_horizontal_velocity(self.velocity_xz);
    }

    fn apply_roll(&mut self, dt: f32, motor: &mut dyn CharacterMotor) {
        let Some(roll) = self.roll.as_mut() else {
            return;
        };
        let vy = motor.velocity().y;
        motor.set_velocity(roll.velocity(self.tuning.roll_speed, vy));
        if roll.advance(dt) {
            self.finish_roll();
        }
    }

    fn apply_jump(&mut self, motor: &mut dyn CharacterMotor) {
        let can_jump = (self.grounded || self.coyote_timer > 0.0)
            && self.roll.is_none()
            && !self.is_jumping
            && self.jump_cooldown_timer <= 0.0;

        if self.jump_buffer_timer > 0.0 && can_jump && !self.jump_consumed {
            motor.add_vertical_impulse(self.tuning.jump_force);
            self.jump_consumed = true;
            self.jump_buffer_timer = 0.0;
            self.coyote_timer = 0.0;
            self.is_jumping = true;
            self.jump_was_cut = false;
            self.jump_released = false;
            self.jump_executed = true;
            self.jump_cooldown_timer = self.tuning.jump_cooldown;
        }
    }

    fn apply_jump_cut(&mut self, motor: &mut dyn CharacterMotor) {
        if !self.is_jumping {
            self.jump_released = false;
            return;
        }

        if self.jump_released && !self.jump_was_cut && motor.velocity().y > 0.01 {
            motor.multiply_vertical_velocity(self.tuning.jump_cut_multiplier);
            self.jump_was_cut = true;
            self.jump_released = false;
        }
    }

    fn apply_gravity_modifiers(&mut self, dt: f32, motor: &mut dyn CharacterMotor) {
        let vy = motor.velocity().y;
        let g = self.tuning.gravity;

        if vy < -0.01 {
            motor.add_velocity(Vec3::Y * g * (self.tuning.fall_gravity_multiplier - 1.0) * dt);
            motor.clamp_fall_speed(self.tuning.max_fall_speed);
        } else if vy.abs() < self.tuning.apex_threshold && !self.grounded {
            motor.add_velocity(Vec3::Y * g * (self.tuning.apex_gravity_multiplier - 1.0) * dt);
        }
    }

    fn rotate_model(&mut self, dt: f32, camera: &CameraBasis) {
        let forward = camera.flat_forward();
        if forward == Vec3::ZERO {
            return;
        }
        let target = Quat::from_rotation_y((-forward.x).atan2(-forward.z));
        let t = (self.tuning.rotation_speed * dt).clamp(0.0, 1.0);
        self.model_rotation = self.model_rotation.slerp(target, t);
    }

    fn update_animator(&mut self, dt: f32, animator: &mut dyn Animator, camera: &CameraBasis) {
        self.direction = AnimDirection::from_input(self.input.raw_move());
        animator.set_integer(AnimParam::Direction, self.direction.as_i32());

        let yaw = camera.yaw_degrees();
        let prev = self.prev_camera_yaw.unwrap_or(yaw);
        animator.set_float(AnimParam::CameraRotation, delta_angle(prev, yaw) / dt.max(0.0001));
        self.prev_camera_yaw = Some(yaw);

        animator.set_bool(AnimParam::IsAirborne, !self.grounded);

        if self.jump_executed {
            animator.fire(AnimParam::Jump);
            self.jump_executed = false;
        }
        for trigger in self.pending_triggers.drain(..) {
            animator.fire(trigger);
        }
        if !self.was_grounded && self.grounded {
            animator.fire(AnimParam::Land);
        }

        animator.set_bool(AnimParam::IsGrounded, self.grounded);
        animator.set_bool(AnimParam::IsRolling, self.roll.is_some());
        animator.set_bool(AnimParam::IsDead, self.health.is_dead());

        self.was_grounded = self.grounded;
    }

    // ─── roll ────────────────────────────────────────────────────────────

    pub fn can_roll(&self) -> bool {
        self.roll.is_none() && self.roll_cooldown_timer <= 0.0
    }

    fn start_roll(&mut self) {
        self.roll = Some(RollState::new(
            self.input.last_non_zero_direction(),
            self.tuning.roll_duration,
        ));
        self.health.set_invulnerable(self.tuning.roll_invulnerable_time);
        self.input.disable();
        self.pending_triggers.push(AnimParam::Roll);
        debug!("[Player] Roll toward {:?}", self.input.last_non_zero_direction());
    }

    /// Cleanup shared by completion and interruption.
    fn finish_roll(&mut self) {
        self.input.enable();
        self.roll = None;
        self.roll_cooldown_timer = self.tuning.roll_cooldown;
    }

    /// Stops a running roll early, running the same cleanup as completion.
    pub fn interrupt_roll(&mut self) {
        if self.roll.is_some() {
            self.finish_roll();
        }
    }

    // ─── health ──────────────────────────────────────────────────────────

    pub fn take_damage(
        &mut self,
        amount: i32,
        motor: &mut dyn CharacterMotor,
        animator: &mut dyn Animator,
    ) -> DamageOutcome {
        let outcome = self.health.take_damage(amount);
        match outcome {
            DamageOutcome::Ignored => {}
            DamageOutcome::Damaged { remaining } => {
                animator.fire(AnimParam::Hurt);
                debug!("[Player] Took {} damage, {} left", amount, remaining);
            }
            DamageOutcome::Died => {
                animator.fire(AnimParam::Hurt);
                self.on_died(motor, animator);
            }
        }
        outcome
    }

    fn on_died(&mut self, motor: &mut dyn CharacterMotor, animator: &mut dyn Animator) {
        self.interrupt_roll();
        self.input.disable();
        motor.stop();
        motor.set_collider_enabled(false);
        animator.set_bool(AnimParam::IsDead, true);
        self.active = false;
        info!("[Player] Died");
    }

    /// Deactivating interrupts a roll; reactivating re-enables input.
    pub fn set_active(&mut self, active: bool) {
        if active == self.active {
            return;
        }
        self.active = active;
        if active {
            self.input.enable();
            self.roll = None;
        } else {
            self.interrupt_roll();
            self.input.disable();
        }
    }

    // ─── queries ─────────────────────────────────────────────────────────

    pub fn tuning(&self) -> &CharacterTuning {
        &self.tuning
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn input(&self) -> &PlayerInputHandler {
        &self.input
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_dead()
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_jumping(&self) -> bool {
        self.is_jumping
    }

    pub fn is_rolling(&self) -> bool {
        self.roll.is_some()
    }

    pub fn coyote_timer(&self) -> f32 {
        self.coyote_timer
    }

    pub fn jump_buffer_timer(&self) -> f32 {
        self.jump_buffer_timer
    }

    pub fn roll_cooldown_timer(&self) -> f32 {
        self.roll_cooldown_timer
    }

    pub fn direction(&self) -> AnimDirection {
        self.direction
    }

    pub fn model_rotation(&self) -> Quat {
        self.model_rotation
    }

    /// Snaps the visual model, e.g. after a save restored the player.
    pub fn set_model_rotation(&mut self, rotation: Quat) {
        self.model_rotation = rotation;
    }
}

/// Moves `current` toward `target` by at most `max_delta`.
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let to_target = target - current;
    let distance = to_target.length();
    if distance <= max_delta || distance == 0.0 {
        return target;
    }
    current + to_target / distance * max_delta
}
