use std::time::{Duration, Instant};

use dashmap::DashMap;

// Fixed-window admission control keyed by client identity. Each identity
// keeps the timestamps of its admitted requests; the window is recomputed
// relative to "now" on every check.
pub struct RateLimiter {
    history: DashMap<String, Vec<Instant>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            history: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window_secs(&self) -> u64 {
        self.window.as_secs()
    }

    // Admission check. Prunes expired timestamps for this identity, then
    // either records the call and admits it, or rejects without recording.
    // The DashMap entry guard holds the shard lock for the whole
    // prune-check-append step, so two concurrent calls for one identity
    // cannot both slip under the quota.
    pub fn admit(&self, identity: &str, now: Instant) -> bool {
        let mut entry = self.history.entry(identity.to_string()).or_default();

        // A timestamp exactly one window old no longer counts
        entry.retain(|&t| now.duration_since(t) < self.window);

        if entry.len() >= self.max_requests as usize {
            return false;
        }

        entry.push(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(10, Duration::from_secs(60))
    }

    #[test]
    fn admits_up_to_the_quota() {
        let rl = limiter();
        let base = Instant::now();
        for i in 0..10 {
            assert!(rl.admit("1.2.3.4", base + Duration::from_millis(i * 100)));
        }
        assert!(!rl.admit("1.2.3.4", base + Duration::from_secs(1)));
    }

    #[test]
    fn quota_is_per_identity() {
        let rl = limiter();
        let base = Instant::now();
        for _ in 0..10 {
            assert!(rl.admit("1.2.3.4", base));
        }
        assert!(!rl.admit("1.2.3.4", base));
        assert!(rl.admit("5.6.7.8", base));
    }

    #[test]
    fn rejection_does_not_record_the_attempt() {
        let rl = limiter();
        let base = Instant::now();
        for _ in 0..10 {
            assert!(rl.admit("a", base));
        }
        // Repeated rejections leave the log untouched
        for _ in 0..5 {
            assert!(!rl.admit("a", base + Duration::from_secs(1)));
        }
        assert_eq!(rl.history.get("a").unwrap().len(), 10);
        // All ten expire together, so a call one window after the burst
        // sees an empty log
        assert!(rl.admit("a", base + Duration::from_secs(60)));
    }

    #[test]
    fn timestamp_exactly_one_window_old_is_pruned() {
        let rl = limiter();
        let base = Instant::now();
        assert!(rl.admit("a", base));
        rl.admit("a", base + Duration::from_secs(60));
        let entry = rl.history.get("a").unwrap();
        assert_eq!(entry.value(), &[base + Duration::from_secs(60)]);
    }

    #[test]
    fn burst_then_wait_scenario() {
        let rl = limiter();
        let base = Instant::now();

        // 10 calls within 5 seconds all admitted
        for i in 0..10u64 {
            assert!(rl.admit("1.2.3.4", base + Duration::from_millis(i * 500)));
        }

        // 11th call one second later rejected
        assert!(!rl.admit("1.2.3.4", base + Duration::from_secs(6)));

        // 61 seconds after the first call the oldest entries have expired
        assert!(rl.admit("1.2.3.4", base + Duration::from_secs(61)));
    }
}
