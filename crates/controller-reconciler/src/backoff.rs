use std::time::Duration;

use rand::Rng;

/// Bounded exponential backoff with jitter for transient cluster errors
/// (§4.5).
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub max_attempts: u32,
    pub base: Duration,
    pub max: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        BackoffConfig {
            max_attempts: 5,
            base: Duration::from_millis(200),
            max: Duration::from_secs(10),
        }
    }
}

/// Delay before retry attempt `attempt` (1-indexed): exponential growth
/// capped at `cfg.max`, plus up to 50% jitter to avoid synchronized
/// retries across keys.
pub fn delay_for_attempt(cfg: &BackoffConfig, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(20);
    let exp_millis = (cfg.base.as_millis() as u64).saturating_mul(1u64 << exponent);
    let capped_millis = exp_millis.min(cfg.max.as_millis() as u64);
    let jitter_millis = rand::thread_rng().gen_range(0..=capped_millis / 2 + 1);
    Duration::from_millis(capped_millis / 2 + jitter_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_never_exceeds_configured_max() {
        let cfg = BackoffConfig {
            max_attempts: 10,
            base: Duration::from_millis(100),
            max: Duration::from_secs(1),
        };
        for attempt in 1..=10 {
            let delay = delay_for_attempt(&cfg, attempt);
            assert!(delay <= cfg.max, "attempt {attempt} delay {delay:?} exceeds max");
        }
    }

    #[test]
    fn delay_grows_with_attempt_number_on_average() {
        let cfg = BackoffConfig::default();
        let first = delay_for_attempt(&cfg, 1);
        let last = delay_for_attempt(&cfg, cfg.max_attempts);
        assert!(last >= first);
    }
}
