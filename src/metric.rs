use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("channel_facebook_statds")
        .with_description("Facebook channel statistics")
        .with_unit("event")
        .build()
});

fn incr_statds(metric: String, value: String) {
    STATDS.add(1, &[KeyValue::new(metric, value)]);
}

pub fn incr_inbound_event_statds(topic: &str) {
    incr_statds("inbound_event".to_string(), topic.into())
}

pub fn incr_outbound_statds(operation: &str, outcome: &str) {
    incr_statds(
        "outbound_operation".to_string(),
        format!("{operation}:{outcome}"),
    )
}
