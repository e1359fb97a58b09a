//! Failed-login throttle keyed by client address.
//!
//! A key may fail `max_attempts` times; it is then locked until `lockout`
//! has elapsed since its last failure, after which the counter starts over.
//! A successful login clears the key. The map never holds more than
//! `capacity` keys: expired entries are swept first, then the entry with the
//! oldest failure is evicted.
//!
//! A login attempt first reserves a slot with [`LoginThrottle::try_acquire`].
//! Failures already counted plus attempts still in flight never exceed
//! `max_attempts`, so concurrent requests cannot slip past the limit while
//! their passwords are being checked.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use farmavet_core::config::AuthConfig;

use crate::clock::{Clock, SystemClock};

/// Suggested wait when the remaining attempts are all in flight.
const IN_FLIGHT_RETRY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
struct Attempts {
    failures: u32,
    pending: u32,
    last: Instant,
}

impl Attempts {
    fn fresh(now: Instant) -> Self {
        Self {
            failures: 0,
            pending: 0,
            last: now,
        }
    }
}

/// Login throttle. Share it behind an `Arc`.
pub struct LoginThrottle {
    entries: Mutex<HashMap<String, Attempts>>,
    max_attempts: u32,
    lockout: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for LoginThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginThrottle")
            .field("max_attempts", &self.max_attempts)
            .field("lockout", &self.lockout)
            .field("capacity", &self.capacity)
            .field("tracked", &self.tracked())
            .finish()
    }
}

impl LoginThrottle {
    /// Throttle on the system clock.
    pub fn new(max_attempts: u32, lockout: Duration, capacity: usize) -> Self {
        Self::with_clock(max_attempts, lockout, capacity, Arc::new(SystemClock))
    }

    /// Throttle on an explicit clock.
    pub fn with_clock(
        max_attempts: u32,
        lockout: Duration,
        capacity: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_attempts: max_attempts.max(1),
            lockout,
            capacity: capacity.max(1),
            clock,
        }
    }

    /// Throttle configured from the `[auth]` section.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.max_login_attempts,
            config.lockout(),
            config.throttle_capacity,
        )
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Attempts>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve one login attempt for `key`.
    ///
    /// Returns `Err(remaining)` while the key is locked out, and a short wait
    /// while the attempts in flight would take it past `max_attempts`. The returned
    /// ticket must be settled with [`LoginTicket::fail`] or
    /// [`LoginTicket::succeed`]; dropping it releases the slot uncounted.
    pub fn try_acquire(&self, key: &str) -> Result<LoginTicket<'_>, Duration> {
        let now = self.clock.now();
        let mut entries = self.lock();
        if !entries.contains_key(key) {
            self.make_room(&mut entries, now);
        }

        let attempts = entries
            .entry(key.to_string())
            .or_insert_with(|| Attempts::fresh(now));
        let elapsed = now.saturating_duration_since(attempts.last);
        if elapsed > self.lockout {
            attempts.failures = 0;
            attempts.last = now;
        }
        if attempts.failures >= self.max_attempts {
            return Err(self.lockout - now.saturating_duration_since(attempts.last));
        }
        if attempts.failures + attempts.pending >= self.max_attempts {
            return Err(IN_FLIGHT_RETRY);
        }

        attempts.pending += 1;
        Ok(LoginTicket {
            throttle: self,
            key: key.to_string(),
            settled: false,
        })
    }

    /// `Err(remaining)` while `key` has used up its failures.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        let now = self.clock.now();
        let entries = self.lock();
        let Some(attempts) = entries.get(key) else {
            return Ok(());
        };
        let elapsed = now.saturating_duration_since(attempts.last);
        if elapsed <= self.lockout && attempts.failures >= self.max_attempts {
            return Err(self.lockout - elapsed);
        }
        Ok(())
    }

    /// Sweep expired idle entries, then evict the oldest if still full.
    fn make_room(&self, entries: &mut HashMap<String, Attempts>, now: Instant) {
        if entries.len() < self.capacity {
            return;
        }
        let lockout = self.lockout;
        entries.retain(|_, a| a.pending > 0 || now.saturating_duration_since(a.last) <= lockout);
        if entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, a)| (a.pending > 0, a.last))
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
    }

    fn settle_failure(&self, key: &str) -> u32 {
        let now = self.clock.now();
        let mut entries = self.lock();
        if !entries.contains_key(key) {
            self.make_room(&mut entries, now);
        }
        let attempts = entries
            .entry(key.to_string())
            .or_insert_with(|| Attempts::fresh(now));
        attempts.pending = attempts.pending.saturating_sub(1);
        if now.saturating_duration_since(attempts.last) > self.lockout {
            attempts.failures = 0;
        }
        attempts.failures += 1;
        attempts.last = now;

        let failures = attempts.failures;
        if failures >= self.max_attempts {
            log::warn!("Login locked for {key} after {failures} failed attempts");
        }
        failures
    }

    fn release(&self, key: &str) {
        let mut entries = self.lock();
        if let Some(attempts) = entries.get_mut(key) {
            attempts.pending = attempts.pending.saturating_sub(1);
            if attempts.pending == 0 && attempts.failures == 0 {
                entries.remove(key);
            }
        }
    }

    /// Number of keys currently tracked.
    pub fn tracked(&self) -> usize {
        self.lock().len()
    }
}

/// A reserved login attempt.
#[must_use = "an unsettled ticket releases its attempt without counting it"]
#[derive(Debug)]
pub struct LoginTicket<'a> {
    throttle: &'a LoginThrottle,
    key: String,
    settled: bool,
}

impl LoginTicket<'_> {
    /// Count the attempt as a failure. Returns the failures in the window.
    pub fn fail(mut self) -> u32 {
        self.settled = true;
        self.throttle.settle_failure(&self.key)
    }

    /// Forget the key after a successful login.
    pub fn succeed(mut self) {
        self.settled = true;
        self.throttle.lock().remove(&self.key);
    }
}

impl Drop for LoginTicket<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.throttle.release(&self.key);
        }
    }
}
