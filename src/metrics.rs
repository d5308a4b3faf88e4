use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("gateway_requests_total", "Total number of chat requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter = register_counter!(
        "gateway_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref UPSTREAM_ERRORS_TOTAL: Counter = register_counter!(
        "gateway_upstream_errors_total",
        "Upstream calls that failed before streaming started"
    )
    .unwrap();
    pub static ref UPSTREAM_CONNECT_LATENCY: Histogram = register_histogram!(
        "gateway_upstream_connect_seconds",
        "Time spent opening the upstream stream"
    )
    .unwrap();
}
