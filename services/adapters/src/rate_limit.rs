//! Rate limiting for API requests

use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Request budget shared by every clone of a client
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl RateLimiter {
    /// Allow `requests_per_minute` requests; 0 disables limiting
    pub fn per_minute(requests_per_minute: u32) -> Self {
        match NonZeroU32::new(requests_per_minute) {
            Some(rate) => Self {
                limiter: Some(Arc::new(DefaultDirectRateLimiter::direct(Quota::per_minute(
                    rate,
                )))),
            },
            None => {
                tracing::warn!("Rate limit of 0 requests per minute, limiting disabled");
                Self::unlimited()
            }
        }
    }

    pub fn unlimited() -> Self {
        Self { limiter: None }
    }

    /// Wait until a request is allowed
    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    pub fn is_limited(&self) -> bool {
        self.limiter.is_some()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limited", &self.is_limited())
            .finish()
    }
}
