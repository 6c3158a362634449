use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MAX_ATTEMPTS: usize = 5;
const WINDOW: Duration = Duration::from_secs(15 * 60);

/// Failed national-id logins per client IP over a sliding window.
#[derive(Clone)]
pub struct RateLimiter {
    attempts: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
    max_attempts: usize,
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(MAX_ATTEMPTS, WINDOW)
    }

    pub fn with_limits(max_attempts: usize, window: Duration) -> Self {
        Self { attempts: Arc::new(Mutex::new(HashMap::new())), max_attempts, window }
    }

    /// True when the IP has used up its attempts.
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        self.evict_expired(&mut map);
        map.get(&ip).is_some_and(|t| t.len() >= self.max_attempts)
    }

    pub fn record_failure(&self, ip: IpAddr) {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        self.evict_expired(&mut map);
        map.entry(ip).or_default().push(Instant::now());
    }

    /// Drop attempts older than the window, and IPs left with none.
    fn evict_expired(&self, map: &mut HashMap<IpAddr, Vec<Instant>>) {
        let Some(cutoff) = Instant::now().checked_sub(self.window) else {
            return;
        };
        map.retain(|_, timestamps| {
            timestamps.retain(|t| *t > cutoff);
            !timestamps.is_empty()
        });
    }

    #[cfg(test)]
    fn tracked_ips(&self) -> usize {
        self.attempts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Forget the IP after a successful login.
    pub fn clear(&self, ip: IpAddr) {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(&ip);
    }
}
