//! Reconnect delay policy.

use std::time::Duration;

/// How long to wait before reopening the log socket after it closes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReconnectPolicy {
    /// Same delay after every close, forever.
    Fixed(Duration),
    /// Delay grows by `factor` per consecutive failed attempt, capped at `max`.
    /// The attempt count resets once a socket opens.
    Exponential {
        initial: Duration,
        max: Duration,
        factor: f64,
    },
}

impl ReconnectPolicy {
    /// Delay before reconnect number `attempt` (zero-based) since the last
    /// successful open.
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            ReconnectPolicy::Fixed(delay) => delay,
            ReconnectPolicy::Exponential {
                initial,
                max,
                factor,
            } => {
                let factor = if factor.is_finite() && factor >= 1.0 {
                    factor
                } else {
                    1.0
                };
                let scaled = initial.as_secs_f64() * factor.powi(attempt.min(64) as i32);
                if scaled.is_finite() && scaled < max.as_secs_f64() {
                    Duration::from_secs_f64(scaled)
                } else {
                    max
                }
            }
        }
    }
}

/// Human-readable delay for the disconnect notice, e.g. `3s` or `1.5s`.
pub fn describe_delay(delay: Duration) -> String {
    let ms = delay.as_millis();
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{:.1}s", delay.as_secs_f64())
    }
}
