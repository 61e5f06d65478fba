use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time, in whole seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_secs(&self) -> i64 {
        self.0
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ExpiryFailure {
    #[error("token has no numeric exp claim")]
    MissingExpiration,
    #[error("token expired at {expires_at}, now is {now}")]
    Elapsed { expires_at: i64, now: i64 },
}

/// Decides whether a token's `exp` claim has passed. There is no `nbf` handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpirationPolicy {
    leeway: u64,
}

impl ExpirationPolicy {
    /// `leeway` extends every token's lifetime by that many seconds; zero by default.
    pub fn new(leeway: u64) -> Self {
        Self { leeway }
    }

    pub fn check(&self, expires_at: Option<i64>, now: i64) -> Result<(), ExpiryFailure> {
        let expires_at = expires_at.ok_or(ExpiryFailure::MissingExpiration)?;
        let leeway = i64::try_from(self.leeway).unwrap_or(i64::MAX);
        if expires_at.saturating_add(leeway) <= now {
            return Err(ExpiryFailure::Elapsed { expires_at, now });
        }
        Ok(())
    }
}
