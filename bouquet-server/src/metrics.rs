//! Prometheus metrics for the bouquet server.
//!
//! Provides metrics collection and a Prometheus-compatible `/metrics` endpoint.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// Metric names as constants for consistency
const SHARES_TOTAL: &str = "bouquet_shares_total";
const SHARE_FAILURES_TOTAL: &str = "bouquet_share_failures_total";
const IMAGES_RENDERED_TOTAL: &str = "bouquet_images_rendered_total";
const IMAGE_RENDER_DURATION: &str = "bouquet_image_render_duration_seconds";
const STORED_BOUQUETS: &str = "bouquet_stored_total";
const VALIDATION_FAILURES_TOTAL: &str = "bouquet_validation_failures_total";

/// Initialize metrics and return the Prometheus handle.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed
/// (e.g., if another recorder is already installed).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record the outcome of a share request.
///
/// # Arguments
///
/// * `lang` - Language the bouquet was shared in
/// * `success` - Whether the record was stored
pub fn record_share(lang: &str, success: bool) {
    if success {
        counter!(SHARES_TOTAL, "lang" => lang.to_string()).increment(1);
    } else {
        counter!(SHARE_FAILURES_TOTAL, "lang" => lang.to_string()).increment(1);
    }
}

/// Record a rendered card image.
///
/// # Arguments
///
/// * `format` - Image format extension (png, jpg, svg)
/// * `duration_secs` - Render time in seconds
pub fn record_image_rendered(format: &str, duration_secs: f64) {
    counter!(IMAGES_RENDERED_TOTAL, "format" => format.to_string()).increment(1);
    histogram!(IMAGE_RENDER_DURATION, "format" => format.to_string()).record(duration_secs);
}

/// Update the stored bouquet count.
#[allow(clippy::cast_precision_loss)]
pub fn set_stored_bouquets(count: usize) {
    gauge!(STORED_BOUQUETS).set(count as f64);
}

/// Record an input validation failure.
///
/// # Arguments
///
/// * `validation_type` - Type of validation that failed (mode, letter, id, etc.)
pub fn record_validation_failure(validation_type: &str) {
    counter!(
        VALIDATION_FAILURES_TOTAL,
        "type" => validation_type.to_string()
    )
    .increment(1);
}
