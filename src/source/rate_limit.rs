//! Token-bucket admission control for outbound API requests.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// How often a blocked caller re-checks the bucket.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A token bucket gating outbound requests.
///
/// Tokens accrue at `fill_rate` per second up to `capacity`; each admitted
/// request spends one. The bucket cannot fail, only delay. Share one
/// instance (behind an `Arc`) across clients to throttle their combined
/// request rate, or give each client its own for independent throttles.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    fill_rate: f64,
    state: Mutex<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a bucket that starts full.
    pub fn new(capacity: f64, fill_rate: f64) -> Self {
        Self {
            capacity,
            fill_rate,
            state: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Refill for the time elapsed since the last call, then spend one token
    /// if at least one is available. Returns whether a token was spent.
    pub fn try_consume(&self) -> bool {
        let mut bucket = self.state.lock().unwrap();

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.fill_rate).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Wait until a token can be spent. Polls the bucket at a fixed short
    /// interval; never times out on its own.
    pub async fn acquire(&self) {
        while !self.try_consume() {
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Tokens currently available, including accrual since the last refill.
    /// Does not mutate the bucket.
    pub fn available(&self) -> f64 {
        let bucket = self.state.lock().unwrap();
        let elapsed = Instant::now().duration_since(bucket.last_refill).as_secs_f64();
        (bucket.tokens + elapsed * self.fill_rate).min(self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn tokens_never_exceed_capacity() {
        let limiter = RateLimiter::new(3.0, 1.0);

        advance(Duration::from_secs(60)).await;
        assert!(limiter.available() <= 3.0);

        // A full bucket admits exactly `capacity` requests back to back.
        assert!(limiter.try_consume());
        assert!(limiter.try_consume());
        assert!(limiter.try_consume());
        assert!(!limiter.try_consume());
    }

    #[tokio::test(start_paused = true)]
    async fn refill_matches_elapsed_time() {
        let limiter = RateLimiter::new(5.0, 0.5);

        for _ in 0..5 {
            assert!(limiter.try_consume());
        }
        assert!(!limiter.try_consume());

        // 4 seconds at 0.5 tokens/sec accrues exactly 2 tokens.
        advance(Duration::from_secs(4)).await;
        assert!((limiter.available() - 2.0).abs() < 1e-9);

        assert!(limiter.try_consume());
        assert!(limiter.try_consume());
        assert!(!limiter.try_consume());
    }

    #[tokio::test(start_paused = true)]
    async fn sustained_rate_converges_to_fill_rate() {
        let limiter = RateLimiter::new(1.0, 2.0);
        let start = Instant::now();
        let mut admitted = 0u32;

        while Instant::now().duration_since(start) < Duration::from_secs(30) {
            limiter.acquire().await;
            admitted += 1;
        }

        // 30s at 2 tokens/sec, give or take poll-interval quantization.
        assert!(
            (55..=65).contains(&admitted),
            "admitted {admitted} requests in 30s at fill_rate 2.0"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_waits_for_refill() {
        let limiter = RateLimiter::new(1.0, 1.0);
        assert!(limiter.try_consume());

        let start = Instant::now();
        limiter.acquire().await;
        let waited = Instant::now().duration_since(start);

        assert!(waited >= Duration::from_millis(900));
        assert!(waited <= Duration::from_millis(1200));
    }
}
