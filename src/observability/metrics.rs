//! Operation metrics.
//!
//! Recorded through the `metrics` facade. Nothing is exported unless the
//! host process installs a recorder.
//!
//! | Metric | Kind | Labels |
//! |--------|------|--------|
//! | `tempograph_operation_total` | counter | `operation`, `status` |
//! | `tempograph_operation_duration_ms` | histogram | `operation` |

use crate::Result;
use std::time::Instant;

/// Runs `f`, recording its outcome and duration under `operation`.
pub fn timed<T>(operation: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    let result = f();

    let status = if result.is_ok() { "success" } else { "error" };
    metrics::counter!(
        "tempograph_operation_total",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!("tempograph_operation_duration_ms", "operation" => operation)
        .record(start.elapsed().as_secs_f64() * 1000.0);

    result
}
