//! Time-bounded interpolation of an actor's position and size.

use serde::{Deserialize, Serialize};

use crate::core::{Vec2, EPSILON};

/// Easing curve applied to tween progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    /// Fast start, soft landing: `1 - 2^(-10t)`.
    #[default]
    ExponentialOut,
    ExponentialIn,
    ExponentialInOut,
    /// Jump straight to the end value.
    Instant,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` onto the curve.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::ExponentialOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
            Self::ExponentialIn => {
                if t <= 0.0 {
                    0.0
                } else {
                    2.0_f32.powf(10.0 * (t - 1.0))
                }
            }
            Self::ExponentialInOut => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::Instant => 1.0,
        }
    }
}

/// Interpolates position and size from a start to an end value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    start_position: Vec2,
    end_position: Vec2,
    start_size: Vec2,
    end_size: Vec2,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Tween {
    /// Create a tween. A non-positive duration completes on the first advance.
    #[must_use]
    pub fn new(
        start_position: Vec2,
        end_position: Vec2,
        start_size: Vec2,
        end_size: Vec2,
        duration: f32,
        easing: Easing,
    ) -> Self {
        Self {
            start_position,
            end_position,
            start_size,
            end_size,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    /// Size-only tween; position stays put.
    #[must_use]
    pub fn resize(from: Vec2, to: Vec2, duration: f32, easing: Easing) -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO, from, to, duration, easing)
    }

    /// Advance by `dt` seconds. Returns true once finished.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.is_finished()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Eased progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        self.easing.apply(self.elapsed / self.duration)
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.start_position.lerp(self.end_position, self.progress())
    }

    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.start_size.lerp(self.end_size, self.progress())
    }

    #[must_use]
    pub fn end_position(&self) -> Vec2 {
        self.end_position
    }

    #[must_use]
    pub fn end_size(&self) -> Vec2 {
        self.end_size
    }

    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Seconds until the tween finishes.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}

/// Duration for an actor redirected while its previous tween is unfinished.
///
/// The remaining time of the old tween is scaled by the ratio of the new
/// distance to the old remaining distance, so the card keeps roughly its
/// current speed. The result is clamped to `[min, max]`. When the old tween
/// had no distance left, `fallback` is used before clamping.
#[must_use]
pub fn recycled_duration(
    current: Vec2,
    old: &Tween,
    new_end: Vec2,
    fallback: f32,
    min: f32,
    max: f32,
) -> f32 {
    let old_distance = current.distance(old.end_position());
    let new_distance = current.distance(new_end);

    let duration = if old_distance > EPSILON {
        old.remaining() * new_distance / old_distance
    } else {
        fallback
    };

    if duration.is_finite() {
        duration.max(min).min(max)
    } else {
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tween(duration: f32) -> Tween {
        Tween::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(20.0, 20.0),
            duration,
            Easing::Linear,
        )
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::ExponentialOut,
            Easing::ExponentialIn,
            Easing::ExponentialInOut,
        ] {
            assert!(easing.apply(0.0) < 0.01, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 0.001, "{easing:?} at 1");
        }
        assert_eq!(Easing::Instant.apply(0.0), 1.0);
    }

    #[test]
    fn test_linear_tween() {
        let mut t = tween(1.0);

        assert!(!t.advance(0.5));
        assert!(t.position().approx_eq(Vec2::new(50.0, 0.0)));
        assert!(t.size().approx_eq(Vec2::new(15.0, 15.0)));
        assert!((t.remaining() - 0.5).abs() < 0.001);

        assert!(t.advance(0.75));
        assert!(t.position().approx_eq(Vec2::new(100.0, 0.0)));
        assert_eq!(t.remaining(), 0.0);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut t = tween(0.0);
        assert!(t.advance(0.0));
        assert!(t.position().approx_eq(Vec2::new(100.0, 0.0)));
    }

    #[test]
    fn test_recycled_duration_keeps_speed() {
        let mut old = tween(1.0);
        old.advance(0.5);
        let current = old.position();

        // Half the remaining distance at the same speed takes half the time.
        let d = recycled_duration(current, &old, Vec2::new(75.0, 0.0), 0.4, 0.01, 2.0);
        assert!((d - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_recycled_duration_clamped() {
        let mut old = tween(1.0);
        old.advance(0.9);
        let current = old.position();

        let far = recycled_duration(current, &old, Vec2::new(10_000.0, 0.0), 0.4, 0.1, 0.6);
        assert_eq!(far, 0.6);

        let near = recycled_duration(current, &old, current, 0.4, 0.1, 0.6);
        assert_eq!(near, 0.1);
    }

    #[test]
    fn test_recycled_duration_fallback_when_arrived() {
        let mut old = tween(1.0);
        old.advance(1.0);
        let d = recycled_duration(old.position(), &old, Vec2::new(0.0, 0.0), 0.4, 0.1, 0.6);
        assert_eq!(d, 0.4);
    }
}
