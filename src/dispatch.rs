use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::trace;

use crate::error::OntoError;
use crate::stats::CallStats;
use crate::throttle::RateLimiter;
use crate::transport::Transport;

pub struct Throttled<T> {
    inner: T,
    limiter: Arc<RateLimiter>,
}

impl<T: Transport> Throttled<T> {
    pub fn new(inner: T, limiter: Arc<RateLimiter>) -> Self {
        Self { inner, limiter }
    }
}

impl<T: Transport> Transport for Throttled<T> {
    fn get(&self, path: &str, params: &[(String, String)]) -> Result<Option<Value>, OntoError> {
        let waited = self.limiter.acquire();
        if !waited.is_zero() {
            trace!(path, waited_ms = waited.as_millis() as u64, "throttled");
        }
        self.inner.get(path, params)
    }
}

pub struct Instrumented<T> {
    inner: T,
    stats: CallStats,
}

impl<T: Transport> Instrumented<T> {
    pub fn new(inner: T, report_interval: Duration) -> Self {
        Self {
            inner,
            stats: CallStats::new(report_interval),
        }
    }

    pub fn stats(&self) -> &CallStats {
        &self.stats
    }
}

impl<T: Transport> Transport for Instrumented<T> {
    fn get(&self, path: &str, params: &[(String, String)]) -> Result<Option<Value>, OntoError> {
        let result = self.inner.get(path, params);
        self.stats.record(result.is_err());
        result
    }
}

pub struct Dispatcher<T> {
    chain: Instrumented<Throttled<T>>,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, limiter: Arc<RateLimiter>, report_interval: Duration) -> Self {
        Self {
            chain: Instrumented::new(Throttled::new(transport, limiter), report_interval),
        }
    }

    pub fn invoke(&self, path: &str, params: &[(&str, &str)]) -> Result<Option<Value>, OntoError> {
        let params = params
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<Vec<_>>();
        self.chain.get(path, &params)
    }

    pub fn stats(&self) -> (u64, u64) {
        self.chain.stats().snapshot()
    }
}
