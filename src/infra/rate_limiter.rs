use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub requests_per_min: Option<u64>,
    pub concurrency: Option<u32>,
}

impl Limits {
    pub fn is_unlimited(&self) -> bool {
        self.requests_per_min.unwrap_or(0) == 0 && self.concurrency.unwrap_or(0) == 0
    }
}

/// Caps outbound catalog traffic. Clones share the same budget.
#[derive(Clone, Debug)]
pub struct UpstreamLimiter {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    limits: Limits,
    // token bucket: current tokens and the time of the last refill
    rpm_tokens: Mutex<(f64, Instant)>,
    sem: Option<Arc<Semaphore>>,
}

/// Held for the duration of one upstream request.
#[derive(Debug)]
pub struct Permit {
    _permit: Option<OwnedSemaphorePermit>,
}

impl UpstreamLimiter {
    pub fn new(limits: Limits) -> Self {
        let rpm_capacity = limits.requests_per_min.unwrap_or(0) as f64;
        let sem = limits
            .concurrency
            .filter(|c| *c > 0)
            .map(|c| Arc::new(Semaphore::new(c as usize)));
        Self {
            inner: Arc::new(Inner {
                limits,
                rpm_tokens: Mutex::new((rpm_capacity, Instant::now())),
                sem,
            }),
        }
    }

    /// Wait until a request may be sent. The returned permit releases the
    /// concurrency slot when dropped.
    pub async fn acquire(&self) -> Permit {
        let permit = match &self.inner.sem {
            // The semaphore is never closed, so acquisition only fails on shutdown
            Some(sem) => sem.clone().acquire_owned().await.ok(),
            None => None,
        };

        if let Some(rpm) = self.inner.limits.requests_per_min {
            if rpm > 0 {
                self.consume_token(rpm as f64, 60.0).await;
            }
        }

        Permit { _permit: permit }
    }

    async fn consume_token(&self, capacity: f64, period_secs: f64) {
        loop {
            let mut guard = self.inner.rpm_tokens.lock().await;
            let (ref mut tokens, ref mut last) = *guard;
            let now = Instant::now();
            let refill_rate = capacity / period_secs;
            *tokens = (*tokens + now.duration_since(*last).as_secs_f64() * refill_rate).min(capacity);
            *last = now;
            if *tokens >= 1.0 {
                *tokens -= 1.0;
                break;
            }
            let wait = (1.0 - *tokens) / refill_rate;
            drop(guard);
            tokio::time::sleep(Duration::from_secs_f64(wait.max(0.001))).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unlimited_never_blocks() {
        let limiter = UpstreamLimiter::new(Limits::default());
        assert!(Limits::default().is_unlimited());
        for _ in 0..100 {
            let _permit = limiter.acquire().await;
        }
    }

    #[tokio::test]
    async fn test_concurrency_slots_released_on_drop() {
        let limiter = UpstreamLimiter::new(Limits { requests_per_min: None, concurrency: Some(1) });
        let first = limiter.acquire().await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), limiter.acquire()).await;
        assert!(blocked.is_err());

        drop(first);
        let second = tokio::time::timeout(Duration::from_millis(50), limiter.acquire()).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_requests_per_minute_bucket() {
        let limiter = UpstreamLimiter::new(Limits { requests_per_min: Some(2), concurrency: None });
        let _a = limiter.acquire().await;
        let _b = limiter.acquire().await;

        // Bucket is empty; the third request has to wait for a refill
        let third = tokio::time::timeout(Duration::from_millis(200), limiter.acquire()).await;
        assert!(third.is_err());
    }
}
