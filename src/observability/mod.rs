//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! chain + gateway produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges via the metrics facade)
//!
//! Consumers:
//!     → Log aggregation (stdout, file, remote)
//!     → Whatever exporter the hosting application installs
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
