pub fn init() {
    // Initialize tracing subscriber once, honoring RUST_LOG if set.
    // Logs go to stderr: in stdio mode stdout carries the protocol.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log a metric line and record it through the `metrics` facade.
///
/// Names ending in `_total` are counters; everything else is a histogram.
pub fn log_metric(source: &str, metric: &str, value: f64) {
    tracing::info!(source = source, metric = metric, value = value, "metric");
    let name = format!("weather_gateway_{metric}");
    if metric.ends_with("_total") {
        metrics::counter!(name, "source" => source.to_string()).increment(value as u64);
    } else {
        metrics::histogram!(name, "source" => source.to_string()).record(value);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
    }

    #[test]
    fn log_metric_without_recorder_is_a_noop() {
        super::log_metric("nws", "remote_error_total", 1.0);
        super::log_metric("nws", "remote_latency_ms", 12.5);
    }
}
