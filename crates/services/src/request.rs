//! Request tokens and time bounds shared by every service talking to a port.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use domains::DomainError;

/// Identifies one issued request. A response is applied only while the slot
/// it was issued for still holds the same token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic token counter; tokens are never reused.
#[derive(Debug, Default)]
pub struct TokenSource(AtomicU64);

impl TokenSource {
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Runs `request`, failing with [`DomainError::Timeout`] once `limit` elapses.
pub async fn bounded<T, F>(limit: Duration, request: F) -> domains::Result<T>
where
    F: Future<Output = domains::Result<T>>,
{
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::Timeout(limit)),
    }
}
