mod debug_dump;
mod session;
#[cfg(test)]
pub(crate) mod test_origin;

use std::{num::NonZeroU32, time::Duration};

use governor::{
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};

pub use debug_dump::DebugDump;
pub use session::DiningHallClient;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/141.0.0.0 Safari/537.36";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

const RATE_LIMIT: NonZeroU32 = match NonZeroU32::new(20) {
    Some(n) => n,
    None => panic!("rate limit must be non-zero"),
};
const DELAY_JITTER: Duration = Duration::from_secs(2);

pub(crate) type RateLimiter =
    governor::RateLimiter<NotKeyed, InMemoryState, QuantaClock, NoOpMiddleware<QuantaInstant>>;

/// Client that keeps the origin's session cookies and sends browser-like
/// headers on every request.
pub fn make_client(timeout: Duration) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    Client::builder()
        .cookie_store(true)
        .gzip(true)
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()
}

fn make_rate_limiter() -> RateLimiter {
    governor::RateLimiter::direct(governor::Quota::per_second(RATE_LIMIT))
}

/// Waits for a slot so bursts of range queries don't hammer the origin.
async fn throttle(rate_limiter: &RateLimiter) {
    let retry_jitter = governor::Jitter::new(Duration::ZERO, DELAY_JITTER);
    rate_limiter.until_ready_with_jitter(retry_jitter).await;
}
