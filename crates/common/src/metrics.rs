//! Prometheus metrics on the default registry.

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder,
};

pub static STORAGE_FLUSH_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("hbnb_storage_flush_total", "Total successful storage flushes")
        .expect("register storage_flush_total")
});

pub static STORAGE_FLUSH_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("hbnb_storage_flush_errors_total", "Total failed storage flushes")
        .expect("register storage_flush_errors_total")
});

/// Entity mutations by `kind` (class name) and `op` (create, update, delete, link, unlink).
pub static ENTITY_MUTATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hbnb_entity_mutations_total",
        "Total committed entity mutations",
        &["kind", "op"]
    )
    .expect("register entity_mutations_total")
});

pub fn record_mutation(kind: &str, op: &str) {
    ENTITY_MUTATIONS_TOTAL.with_label_values(&[kind, op]).inc();
}

/// Render the default registry in the Prometheus text format.
pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_registry_lists_counters() {
        STORAGE_FLUSH_TOTAL.inc();
        record_mutation("State", "create");
        let (status, body) = encode_metrics();
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("hbnb_storage_flush_total"));
        assert!(body.contains(r#"hbnb_entity_mutations_total{kind="State",op="create"}"#));
    }
}
