use std::sync::Arc;
use crate::counter::CounterStore;
use crate::rate_limit::RateLimiter;
use crate::simulator::RequestSimulator;
use crate::sink::Sink;
// app's shared state

pub struct AppState {
    pub counters: Arc<CounterStore>,
    pub rate_limiter: RateLimiter, // gates stats read-back only
    pub sink: Arc<dyn Sink>,       // same sink the publisher writes
    pub simulator: RequestSimulator,
}

impl AppState {
    pub fn new(
        counters: Arc<CounterStore>,
        sink: Arc<dyn Sink>,
        rate_limiter: RateLimiter,
        simulator: RequestSimulator,
    ) -> Self {
        Self {
            counters,
            rate_limiter,
            sink,
            simulator,
        }
    }
}
