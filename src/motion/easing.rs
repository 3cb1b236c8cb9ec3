//! Easing curves mapping normalized progress onto eased progress.

/// Time after which a spring is considered at rest, expressed as the
/// amplitude its envelope has decayed to.
const SPRING_REST_AMPLITUDE: f64 = 0.002;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ease {
    Power1Out,
    Power3Out,
    ExpoOut,
    Spring(Spring),
}

impl Ease {
    /// Maps `t` in `[0, 1]` to eased progress. Springs may overshoot `1.0`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Power1Out => power_out(t, 2),
            Self::Power3Out => power_out(t, 4),
            Self::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    (1.001 - 2.0_f64.powf(-10.0 * t)).min(1.0)
                }
            }
            Self::Spring(spring) => {
                if t >= 1.0 {
                    1.0
                } else {
                    spring.at(t * spring.settle_duration())
                }
            }
        }
    }
}

impl Default for Ease {
    fn default() -> Self {
        Self::Power1Out
    }
}

fn power_out(t: f64, exponent: i32) -> f64 {
    1.0 - (1.0 - t).powi(exponent)
}

/// Damped harmonic oscillator released from rest at 0, settling at 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl Spring {
    pub const fn with_stiffness(stiffness: f64) -> Self {
        Self {
            stiffness,
            damping: 10.0,
            mass: 1.0,
        }
    }

    fn natural_frequency(self) -> f64 {
        (self.stiffness / self.mass.max(f64::EPSILON)).sqrt()
    }

    fn damping_ratio(self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).max(f64::EPSILON).sqrt())
    }

    /// Position after `seconds`.
    pub fn at(self, seconds: f64) -> f64 {
        if seconds <= 0.0 {
            return 0.0;
        }

        let omega = self.natural_frequency();
        let zeta = self.damping_ratio();
        let decay = (-zeta * omega * seconds).exp();

        if zeta < 1.0 {
            let damped = omega * (1.0 - zeta * zeta).sqrt();
            1.0 - decay
                * ((damped * seconds).cos() + (zeta * omega / damped) * (damped * seconds).sin())
        } else if (zeta - 1.0).abs() < 1e-9 {
            1.0 - decay * (1.0 + omega * seconds)
        } else {
            let damped = omega * (zeta * zeta - 1.0).sqrt();
            1.0 - decay
                * ((damped * seconds).cosh() + (zeta * omega / damped) * (damped * seconds).sinh())
        }
    }

    /// Seconds until the oscillation envelope falls under the rest amplitude.
    pub fn settle_duration(self) -> f64 {
        let omega = self.natural_frequency();
        let zeta = self.damping_ratio();
        let rate = if zeta < 1.0 {
            zeta * omega
        } else {
            // Overdamped springs are dominated by their slow mode.
            omega * (zeta - (zeta * zeta - 1.0).sqrt())
        };

        if rate <= f64::EPSILON {
            return 10.0;
        }

        (1.0 / SPRING_REST_AMPLITUDE).ln() / rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curves_start_at_zero_and_end_at_one() {
        for ease in [
            Ease::Power1Out,
            Ease::Power3Out,
            Ease::ExpoOut,
            Ease::Spring(Spring::with_stiffness(120.0)),
        ] {
            assert!(ease.apply(0.0).abs() < 0.002, "{ease:?} at t=0");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-9, "{ease:?} at t=1");
        }
    }

    #[test]
    fn power_curves_are_monotonic() {
        for ease in [Ease::Power1Out, Ease::Power3Out, Ease::ExpoOut] {
            let mut previous = 0.0;
            for step in 0..=20 {
                let value = ease.apply(f64::from(step) / 20.0);
                assert!(value >= previous, "{ease:?} not monotonic at step {step}");
                previous = value;
            }
        }
    }

    #[test]
    fn underdamped_spring_overshoots_then_settles() {
        let spring = Spring::with_stiffness(120.0);
        let peak = (1..200)
            .map(|step| spring.at(f64::from(step) * 0.01))
            .fold(0.0_f64, f64::max);

        assert!(peak > 1.0);
        assert!((spring.at(spring.settle_duration()) - 1.0).abs() < 0.01);
    }

    #[test]
    fn critically_damped_spring_never_overshoots() {
        let spring = Spring {
            stiffness: 100.0,
            damping: 20.0,
            mass: 1.0,
        };

        for step in 0..300 {
            assert!(spring.at(f64::from(step) * 0.01) <= 1.0);
        }
    }
}
