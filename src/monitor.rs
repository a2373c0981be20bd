// Monitor: pipeline thread lifecycle
//
// Single Responsibility: start/stop of the classification cycle loop
//
// Startup is where every fatal condition surfaces: configuration validation and
// spectral engine construction both happen before the thread is spawned, so a
// running monitor can only stop because it was asked to or because its sensor
// went away.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::analysis::classifier::ClassificationState;
use crate::analysis::{spawn_pipeline_thread, ClassificationPipeline, PipelineStats};
use crate::config::AppConfig;
use crate::error::{log_monitor_error, MonitorError};
use crate::notify::NotificationHub;
use crate::sensor::SensorDriver;

/// Running pipeline thread plus its shutdown flag
struct Worker {
    running: Arc<AtomicBool>,
    handle: JoinHandle<PipelineStats>,
}

/// Owns the configuration, the notification hub and at most one pipeline thread
///
/// # Example
/// ```ignore
/// let monitor = Monitor::new(AppConfig::load());
/// let mut states = monitor.subscribe();
/// monitor.start(sensor)?;
/// // ...
/// let stats = monitor.stop()?;
/// ```
pub struct Monitor {
    config: AppConfig,
    hub: NotificationHub,
    worker: Mutex<Option<Worker>>,
}

impl Monitor {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            hub: NotificationHub::new(),
            worker: Mutex::new(None),
        }
    }

    /// Start classifying samples from `sensor`
    ///
    /// # Arguments
    /// * `sensor` - Sample source, moved onto the pipeline thread
    ///
    /// # Returns
    /// * `Ok(())` - Pipeline thread is running
    /// * `Err(MonitorError)` - Nothing was started
    ///
    /// # Errors
    /// - Monitor already running
    /// - Configuration rejected
    /// - Unsupported window size for the spectral engine
    /// - Thread spawn failure
    /// - Lock poisoning
    pub fn start<S: SensorDriver + 'static>(&self, sensor: S) -> Result<(), MonitorError> {
        let mut guard = self.lock_worker()?;
        if guard.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            let err = MonitorError::AlreadyRunning;
            log_monitor_error(&err, "start");
            return Err(err);
        }

        // A worker that exited on its own is reaped before restarting
        if let Some(finished) = guard.take() {
            Self::join_worker(finished)?;
        }

        let pipeline = ClassificationPipeline::new(&self.config).map_err(|err| {
            log_monitor_error(&err, "start");
            err
        })?;

        let running = Arc::new(AtomicBool::new(true));
        let handle = spawn_pipeline_thread(
            pipeline,
            sensor,
            self.hub.clone(),
            Arc::clone(&running),
            Duration::from_millis(self.config.pipeline.cycle_interval_ms),
        )
        .map_err(|err| {
            let err = MonitorError::SpawnFailed {
                reason: err.to_string(),
            };
            log_monitor_error(&err, "start");
            err
        })?;

        *guard = Some(Worker { running, handle });
        tracing::info!("[Monitor] Started");
        Ok(())
    }

    /// Stop the pipeline thread and wait for it to exit
    ///
    /// The in-flight cycle, if any, completes before the thread exits.
    ///
    /// # Returns
    /// * `Ok(PipelineStats)` - Counters from the finished thread
    /// * `Err(MonitorError::NotRunning)` - No thread was started
    pub fn stop(&self) -> Result<PipelineStats, MonitorError> {
        let worker = self.lock_worker()?.take().ok_or_else(|| {
            let err = MonitorError::NotRunning;
            log_monitor_error(&err, "stop");
            err
        })?;

        let stats = Self::join_worker(worker)?;
        tracing::info!(
            "[Monitor] Stopped after {} cycles ({} abandoned)",
            stats.cycles_completed,
            stats.cycles_abandoned
        );
        Ok(stats)
    }

    /// Whether a pipeline thread is currently producing cycles
    pub fn is_running(&self) -> bool {
        self.lock_worker()
            .map(|guard| {
                guard
                    .as_ref()
                    .is_some_and(|w| w.running.load(Ordering::SeqCst) && !w.handle.is_finished())
            })
            .unwrap_or(false)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    /// Attach a client for classification states
    pub fn subscribe(&self) -> broadcast::Receiver<ClassificationState> {
        self.hub.subscribe()
    }

    // ========================================================================
    // PRIVATE HELPER METHODS
    // ========================================================================

    fn lock_worker(&self) -> Result<MutexGuard<'_, Option<Worker>>, MonitorError> {
        self.worker.lock().map_err(|_| {
            let err = MonitorError::LockPoisoned {
                component: "pipeline_worker".to_string(),
            };
            log_monitor_error(&err, "lock_worker");
            err
        })
    }

    fn join_worker(worker: Worker) -> Result<PipelineStats, MonitorError> {
        worker.running.store(false, Ordering::SeqCst);
        worker.handle.join().map_err(|_| {
            let err = MonitorError::WorkerPanicked;
            log_monitor_error(&err, "join_worker");
            err
        })
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Ok(guard) = self.worker.get_mut() {
            if let Some(worker) = guard.take() {
                let _ = Self::join_worker(worker);
            }
        }
    }
}
