use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};

lazy_static! {
    pub static ref VIEWS_TOTAL: Counter =
        register_counter!("event_counter_views_total", "Total number of simulated views").unwrap();
    pub static ref CLICKS_TOTAL: Counter =
        register_counter!("event_counter_clicks_total", "Total number of simulated clicks")
            .unwrap();
    pub static ref STATS_REQUESTS: Counter =
        register_counter!("event_counter_stats_requests_total", "Total stats read-back requests")
            .unwrap();
    pub static ref RATE_LIMITED: Counter = register_counter!(
        "event_counter_rate_limited_total",
        "Stats requests denied by the rate limiter"
    )
    .unwrap();
    pub static ref SNAPSHOT_WRITES: Counter =
        register_counter!("event_counter_snapshot_writes_total", "Snapshots written to the sink")
            .unwrap();
    pub static ref SNAPSHOT_FAILURES: Counter = register_counter!(
        "event_counter_snapshot_failures_total",
        "Snapshot ticks skipped after a failure"
    )
    .unwrap();
    pub static ref SNAPSHOT_LATENCY: Histogram = register_histogram!(
        "event_counter_snapshot_latency_seconds",
        "Time to copy, serialize and write one snapshot"
    )
    .unwrap();
    pub static ref COUNTER_KEYS: Gauge = register_gauge!(
        "event_counter_keys",
        "Current number of (category, minute) tallies"
    )
    .unwrap();
}
