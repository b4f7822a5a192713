//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Intent rate limiter for WebSocket messages (per connection).
/// Matches the simulation tick rate; anything faster cannot take effect anyway.
pub const INTENT_RATE_LIMIT: u32 = 60;

/// Per-connection rate limiter state
#[derive(Clone)]
pub struct SessionRateLimiter {
    intent_limiter: Arc<Limiter>,
}

impl SessionRateLimiter {
    pub fn new() -> Self {
        Self {
            intent_limiter: create_limiter(INTENT_RATE_LIMIT),
        }
    }

    /// Check if an intent message is allowed (returns true if allowed)
    pub fn check_intent(&self) -> bool {
        self.intent_limiter.check().is_ok()
    }
}

impl Default for SessionRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
