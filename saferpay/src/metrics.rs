//! Gateway request metrics

use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

lazy_static::lazy_static! {
    pub static ref SAFERPAY_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "saferpay_requests_total",
        "Total Saferpay gateway requests",
        &["endpoint", "outcome"]
    )
    .unwrap();

    pub static ref SAFERPAY_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "saferpay_request_duration_seconds",
        "Saferpay gateway request duration",
        &["endpoint"]
    )
    .unwrap();
}
