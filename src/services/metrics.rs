//! Prometheus counters, exposed on `/metrics` through the default registry.

use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    static ref UPSTREAM_REQUESTS: IntCounterVec = register_int_counter_vec!(
        "dramabox_upstream_requests_total",
        "Requests made to the scraping backend, by endpoint and outcome",
        &["endpoint", "outcome"]
    )
    .expect("upstream counter registers once");

    static ref EPISODES_NORMALIZED: IntCounter = register_int_counter!(
        "dramabox_episodes_normalized_total",
        "Episodes produced by the stream normalizer"
    )
    .expect("episodes counter registers once");

    static ref TELEGRAM_UPDATES: IntCounterVec = register_int_counter_vec!(
        "dramabox_telegram_updates_total",
        "Telegram updates handled, by kind",
        &["kind"]
    )
    .expect("telegram counter registers once");
}

pub fn record_upstream(endpoint: &str, outcome: &str) {
    UPSTREAM_REQUESTS
        .with_label_values(&[endpoint, outcome])
        .inc();
}

pub fn record_episodes(count: usize) {
    EPISODES_NORMALIZED.inc_by(count as u64);
}

pub fn record_telegram_update(kind: &str) {
    TELEGRAM_UPDATES.with_label_values(&[kind]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let before = UPSTREAM_REQUESTS
            .with_label_values(&["metrics_test", "ok"])
            .get();
        record_upstream("metrics_test", "ok");
        record_upstream("metrics_test", "ok");
        let after = UPSTREAM_REQUESTS
            .with_label_values(&["metrics_test", "ok"])
            .get();
        assert_eq!(after - before, 2);

        let before = TELEGRAM_UPDATES.with_label_values(&["metrics_test"]).get();
        record_telegram_update("metrics_test");
        assert_eq!(TELEGRAM_UPDATES.with_label_values(&["metrics_test"]).get() - before, 1);
    }

    #[test]
    fn test_registered_in_default_registry() {
        record_episodes(3);
        let names: Vec<String> = prometheus::gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"dramabox_episodes_normalized_total".to_string()));
    }
}
