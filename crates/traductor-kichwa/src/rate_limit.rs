//! Per-client token bucket limiter keyed on a proxy-supplied header.
//!
//! Requests without the header are never limited; the service is expected to
//! run behind a proxy that always sets it. The key is the last entry of the
//! header, the one the nearest proxy appended; earlier entries come from the
//! client and can be anything.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{HeaderName, Request, Response, StatusCode};
use axum::response::IntoResponse;
use dashmap::DashMap;
use tower::{Layer, Service};
use tracing::warn;

const LOG_INTERVAL: Duration = Duration::from_secs(60);
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

pub const DEFAULT_CLIENT_HEADER: &str = "x-forwarded-for";

#[derive(Clone)]
pub struct RateLimiter<S> {
    inner: S,
    state: SharedState,
    header: HeaderName,
    rate_per_sec: f64,
    burst: f64,
    /// Time for an empty bucket to fill up again.
    refill_time: Duration,
}

#[derive(Clone)]
struct SharedState {
    buckets: Arc<DashMap<String, TokenBucket>>,
    dropped_since_log: Arc<AtomicU64>,
    last_log: Arc<Mutex<Instant>>,
    last_prune: Arc<Mutex<Instant>>,
}

/// Refills continuously at `rate_per_sec`, capped at `burst`.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn full(burst: f64, now: Instant) -> Self {
        Self {
            tokens: burst,
            last_refill: now,
        }
    }

    /// Refill for the time elapsed since the last call, then take one token
    /// if there is one.
    pub fn try_acquire(&mut self, now: Instant, rate_per_sec: f64, burst: f64) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * rate_per_sec).min(burst);
            self.last_refill = now;
        }
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// A bucket untouched for `refill_time` is full again and can be dropped.
    pub fn is_refilled(&self, now: Instant, refill_time: Duration) -> bool {
        now.saturating_duration_since(self.last_refill) >= refill_time
    }
}

#[derive(Clone)]
pub struct RateLimiterLayer {
    header: HeaderName,
    rate_per_sec: f64,
    burst: f64,
}

impl RateLimiterLayer {
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        Self {
            header: HeaderName::from_static(DEFAULT_CLIENT_HEADER),
            rate_per_sec: rate_per_sec as f64,
            burst: burst as f64,
        }
    }

    /// Key buckets on `header` instead of `X-Forwarded-For`.
    pub fn with_header(mut self, header: HeaderName) -> Self {
        self.header = header;
        self
    }
}

impl<S> Layer<S> for RateLimiterLayer {
    type Service = RateLimiter<S>;

    fn layer(&self, inner: S) -> Self::Service {
        let now = Instant::now();
        RateLimiter {
            inner,
            state: SharedState {
                buckets: Arc::new(DashMap::new()),
                dropped_since_log: Arc::new(AtomicU64::new(0)),
                last_log: Arc::new(Mutex::new(now)),
                last_prune: Arc::new(Mutex::new(now)),
            },
            header: self.header.clone(),
            rate_per_sec: self.rate_per_sec,
            burst: self.burst,
            refill_time: Duration::try_from_secs_f64(self.burst / self.rate_per_sec)
                .unwrap_or(Duration::MAX),
        }
    }
}

impl<S, ReqBody> Service<Request<ReqBody>> for RateLimiter<S>
where
    S: Service<Request<ReqBody>, Response = Response<Body>> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        if let Some(client_id) = client_id(&req, &self.header)
            && !self.check_and_consume(&client_id)
        {
            self.state.dropped_since_log.fetch_add(1, Ordering::Relaxed);
            log_drops_if_needed(&self.state);
            return Box::pin(async move {
                Ok((StatusCode::TOO_MANY_REQUESTS, "rate limited").into_response())
            });
        }

        let fut = self.inner.call(req);
        Box::pin(fut)
    }
}

/// Last entry of the client header.
fn client_id<B>(req: &Request<B>, header: &HeaderName) -> Option<String> {
    req.headers()
        .get(header)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.rsplit(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl<S> RateLimiter<S> {
    fn check_and_consume(&self, client: &str) -> bool {
        let now = Instant::now();
        self.prune_if_needed(now);
        let mut entry = self
            .state
            .buckets
            .entry(client.to_string())
            .or_insert_with(|| TokenBucket::full(self.burst, now));
        entry.try_acquire(now, self.rate_per_sec, self.burst)
    }

    fn prune_if_needed(&self, now: Instant) {
        {
            let Ok(mut last) = self.state.last_prune.lock() else {
                return;
            };
            if now.saturating_duration_since(*last) < PRUNE_INTERVAL {
                return;
            }
            *last = now;
        }
        self.prune(now);
    }

    /// Drop buckets that have refilled completely; a fresh one is identical.
    fn prune(&self, now: Instant) {
        let refill_time = self.refill_time;
        self.state
            .buckets
            .retain(|_, bucket| !bucket.is_refilled(now, refill_time));
    }
}

fn log_drops_if_needed(state: &SharedState) {
    let now = Instant::now();
    let Ok(mut last) = state.last_log.lock() else {
        return;
    };
    if now.saturating_duration_since(*last) >= LOG_INTERVAL {
        let dropped = state.dropped_since_log.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            warn!("rate limiter dropped {dropped} requests in the last minute");
        }
        *last = now;
    }
}
