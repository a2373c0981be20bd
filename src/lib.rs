// Tremor Monitor Core - wearable motion symptom classifier
// Windowed accelerometer analysis with debounced tremor/dyskinesia detection

// Module declarations
pub mod analysis;
pub mod config;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod sensor;

// Re-exports for convenience
pub use analysis::classifier::{ClassificationState, Symptom};
pub use analysis::{ClassificationPipeline, CycleReport, PipelineStats};
pub use config::AppConfig;
pub use monitor::Monitor;
pub use notify::{NotificationHub, Notifier};

use tracing::Level;

/// Install the global fmt subscriber
///
/// `verbose` enables per-cycle debug output. Safe to call more than once; only
/// the first call installs a subscriber.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
