// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exponential reconnect backoff with multiplicative jitter.

use std::time::Duration;

use necsus_config::model::ReconnectConfig;
use rand::Rng;

/// Delay schedule between reconnect attempts.
///
/// The deterministic component doubles per closure; jitter multiplies it by
/// `1 + U[0, 1)`. Both are capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
        }
    }

    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self::new(config.base_delay(), config.max_delay())
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// `min(base * 2^retry, max)`.
    pub fn deterministic(&self, retry: u32) -> Duration {
        2u32.checked_pow(retry)
            .and_then(|factor| self.base.checked_mul(factor))
            .map_or(self.max, |d| d.min(self.max))
    }

    /// The deterministic delay scaled by a random factor in `[1, 2)`.
    pub fn delay<R: Rng + ?Sized>(&self, retry: u32, rng: &mut R) -> Duration {
        let jitter: f64 = rng.gen_range(0.0..1.0);
        self.deterministic(retry).mul_f64(1.0 + jitter).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_config(&ReconnectConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn deterministic_component_strictly_increases() {
        let backoff = Backoff::default();
        let delays: Vec<_> = (1..=5).map(|r| backoff.deterministic(r)).collect();
        assert!(delays.windows(2).all(|w| w[0] < w[1]), "{delays:?}");
        assert_eq!(delays[0], Duration::from_millis(1000));
    }

    #[test]
    fn deterministic_saturates_at_max() {
        let backoff = Backoff::new(Duration::from_millis(500), Duration::from_secs(30));
        assert_eq!(backoff.deterministic(10), Duration::from_secs(30));
        assert_eq!(backoff.deterministic(40), Duration::from_secs(30));
    }

    #[test]
    fn jittered_delay_stays_within_bounds() {
        let backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(60));
        let mut rng = StdRng::seed_from_u64(7);
        for retry in 0..8 {
            let det = backoff.deterministic(retry);
            let delay = backoff.delay(retry, &mut rng);
            assert!(delay >= det, "retry {retry}: {delay:?} < {det:?}");
            assert!(delay < det * 2, "retry {retry}: {delay:?} >= 2 * {det:?}");
        }
    }

    #[test]
    fn jittered_delay_never_exceeds_max() {
        let backoff = Backoff::new(Duration::from_millis(500), Duration::from_secs(2));
        let mut rng = StdRng::seed_from_u64(1);
        for retry in 0..16 {
            assert!(backoff.delay(retry, &mut rng) <= Duration::from_secs(2));
        }
    }

    #[test]
    fn max_below_base_is_raised() {
        let backoff = Backoff::new(Duration::from_secs(2), Duration::from_secs(1));
        assert_eq!(backoff.max(), Duration::from_secs(2));
    }
}
