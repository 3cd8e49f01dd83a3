/// What a `take_damage` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable or already dead.
    Ignored,
    Damaged { remaining: i32 },
    Died,
}

/// Hit points with a post-hit invulnerability window. Death is one-way.
#[derive(Debug, Clone)]
pub struct Health {
    max: i32,
    current: i32,
    dead: bool,
    invulnerable_timer: f32,
    invulnerable_on_hit: f32,
}

impl Health {
    pub fn new(max: i32, invulnerable_on_hit: f32) -> Self {
        Self {
            max,
            current: max,
            dead: false,
            invulnerable_timer: 0.0,
            invulnerable_on_hit,
        }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_timer > 0.0
    }

    /// Never shortens a window that is already running.
    pub fn set_invulnerable(&mut self, time: f32) {
        self.invulnerable_timer = self.invulnerable_timer.max(time);
    }

    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.is_invulnerable() || self.dead {
            return DamageOutcome::Ignored;
        }

        self.current -= amount;
        self.invulnerable_timer = self.invulnerable_on_hit;

        if self.current <= 0 {
            self.dead = true;
            DamageOutcome::Died
        } else {
            DamageOutcome::Damaged {
                remaining: self.current,
            }
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if !self.dead {
            self.invulnerable_timer = (self.invulnerable_timer - dt).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_starts_invulnerability() {
        let mut health = Health::new(10, 0.5);
        assert_eq!(health.take_damage(3), DamageOutcome::Damaged { remaining: 7 });
        assert_eq!(health.take_damage(3), DamageOutcome::Ignored);

        health.tick(0.5);
        assert_eq!(health.take_damage(3), DamageOutcome::Damaged { remaining: 4 });
    }

    #[test]
    fn test_set_invulnerable_keeps_longer_window() {
        let mut health = Health::new(10, 0.5);
        health.set_invulnerable(1.0);
        health.set_invulnerable(0.25);
        health.tick(0.5);
        assert!(health.is_invulnerable());
        health.tick(0.5);
        assert!(!health.is_invulnerable());
    }

    #[test]
    fn test_death_is_final() {
        let mut health = Health::new(2, 0.0);
        assert_eq!(health.take_damage(5), DamageOutcome::Died);
        assert!(health.is_dead());
        assert_eq!(health.take_damage(1), DamageOutcome::Ignored);
        assert_eq!(health.current(), -3);
    }
}
