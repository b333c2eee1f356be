//! Request-rate limiting for batch translation.
//!
//! A token bucket refilled continuously at `rps` tokens per second, holding
//! at most `burst` tokens. Time is read from `tokio::time` so paused-clock
//! tests are deterministic.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimiterConfig {
    /// Tokens per second. Zero disables limiting.
    pub rps: f64,
    /// Bucket capacity.
    pub burst: f64,
}

impl RateLimiterConfig {
    /// Burst defaults to one second worth of tokens, at least one.
    pub fn from_rps(rps: f64) -> Option<Self> {
        if !rps.is_finite() || rps < 0.0 {
            return None;
        }
        Some(Self {
            rps,
            burst: rps.max(1.0),
        })
    }

    /// From the `translation.qps` setting; values below one yield `None`.
    pub fn from_qps(qps: i64) -> Option<Self> {
        if qps < 1 {
            return None;
        }
        Self::from_rps(qps as f64)
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.burst = f64::from(tokens);
        self
    }

    fn unlimited(&self) -> bool {
        self.rps <= 0.0
    }
}

/// Limiter state as seen by logs and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimiterSnapshot {
    pub rps: f64,
    pub burst: f64,
    pub tokens: f64,
    /// Time until the next token, when the bucket is empty.
    pub next_token_in: Option<Duration>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refreshed_at: Instant,
}

impl Bucket {
    fn refill(&mut self, cfg: &RateLimiterConfig) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.refreshed_at).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * cfg.rps).min(cfg.burst);
            self.refreshed_at = now;
        }
    }

    /// Take one token, or report how long until one is available.
    fn take(&mut self, cfg: &RateLimiterConfig) -> Result<(), Duration> {
        self.refill(cfg);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            Err(self.shortfall(cfg))
        }
    }

    fn shortfall(&self, cfg: &RateLimiterConfig) -> Duration {
        Duration::from_secs_f64((1.0 - self.tokens) / cfg.rps)
    }
}

/// Token bucket shared by every task of one batch.
pub struct RateLimiter {
    cfg: RateLimiterConfig,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Starts with a full bucket.
    pub fn new(cfg: RateLimiterConfig) -> Self {
        let bucket = Mutex::new(Bucket {
            tokens: cfg.burst,
            refreshed_at: Instant::now(),
        });
        Self { cfg, bucket }
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.cfg
    }

    /// Wait for a token.
    pub async fn acquire(&self) {
        if self.cfg.unlimited() {
            return;
        }
        loop {
            // The lock is released before sleeping.
            let wait = match self.bucket.lock().await.take(&self.cfg) {
                Ok(()) => return,
                Err(wait) => wait,
            };
            tokio::time::sleep(wait).await;
        }
    }

    /// Take a token if one is available right now.
    pub async fn try_acquire(&self) -> bool {
        self.cfg.unlimited() || self.bucket.lock().await.take(&self.cfg).is_ok()
    }

    pub async fn snapshot(&self) -> RateLimiterSnapshot {
        let mut bucket = self.bucket.lock().await;
        let mut next_token_in = None;
        if !self.cfg.unlimited() {
            bucket.refill(&self.cfg);
            if bucket.tokens < 1.0 {
                next_token_in = Some(bucket.shortfall(&self.cfg));
            }
        }
        RateLimiterSnapshot {
            rps: self.cfg.rps,
            burst: self.cfg.burst,
            tokens: bucket.tokens,
            next_token_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_settings_values() {
        let config = RateLimiterConfig::from_qps(4).unwrap();
        assert_eq!((config.rps, config.burst), (4.0, 4.0));
        assert!(RateLimiterConfig::from_qps(0).is_none());
        assert!(RateLimiterConfig::from_qps(-3).is_none());

        let slow = RateLimiterConfig::from_rps(0.5).unwrap();
        assert_eq!(slow.burst, 1.0);
        assert!(RateLimiterConfig::from_rps(f64::NAN).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_throttle() {
        let limiter = RateLimiter::new(RateLimiterConfig::from_qps(2).unwrap());
        assert!(limiter.try_acquire().await);
        assert!(limiter.try_acquire().await);
        assert!(!limiter.try_acquire().await);

        let snap = limiter.snapshot().await;
        assert!(snap.next_token_in.is_some());

        let start = Instant::now();
        limiter.acquire().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(499) && waited < Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_zero_rate_is_unlimited() {
        let limiter = RateLimiter::new(RateLimiterConfig::from_rps(0.0).unwrap());
        for _ in 0..100 {
            limiter.acquire().await;
        }
        assert!(limiter.try_acquire().await);
        assert_eq!(limiter.snapshot().await.next_token_in, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_caps_at_burst() {
        let limiter =
            RateLimiter::new(RateLimiterConfig::from_rps(100.0).unwrap().with_max_tokens(5));
        for _ in 0..5 {
            assert!(limiter.try_acquire().await);
        }
        assert!(!limiter.try_acquire().await);

        // 100 tokens/s: one token per 10ms
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(limiter.try_acquire().await);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(limiter.snapshot().await.tokens, 5.0);
    }
}
