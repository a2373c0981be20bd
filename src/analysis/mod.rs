// Analysis module - DSP pipeline for motion symptom classification
//
// This module orchestrates the per-cycle analysis pipeline, turning one window
// of accelerometer samples into a debounced symptom classification.
//
// Architecture:
// - ClassificationPipeline: owns every stage and all reusable buffers
// - Pipeline: WindowBuilder → SpectralEngine → BandEnergyExtractor → ClassificationPolicy
//   → SymptomVoters → ClassificationPolicy::decide
// - Pipeline thread: runs cycles until the running flag clears or the sensor goes away,
//   handing every CycleReport to a Notifier

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub mod bands;
pub mod classifier;
pub mod spectrum;
pub mod voter;
pub mod window;

use bands::{BandEnergyExtractor, BandScore, FrequencyBands};
use classifier::{ClassificationPolicy, ClassificationState, VoteRecord};
use spectrum::{SpectralEngine, SpectralTransform};
use voter::{SymptomVoters, VoterSums};
use window::{Window, WindowBuilder};

use crate::config::AppConfig;
use crate::error::{
    log_sensor_error, ConfigError, ErrorCode, MonitorError, SensorError, SpectralError,
};
use crate::notify::Notifier;
use crate::sensor::SensorDriver;

/// Everything one cycle produced
///
/// `state` is what the notification subsystem shows; the rest is telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Completed cycles before this one
    pub cycle: u64,
    pub state: ClassificationState,
    pub vote: VoteRecord,
    pub score: BandScore,
    pub sums: VoterSums,
}

/// The single owned pipeline state
///
/// Created once at startup; every buffer is sized here and reused for the
/// lifetime of the pipeline.
pub struct ClassificationPipeline {
    window_builder: WindowBuilder,
    engine: SpectralEngine,
    extractor: BandEnergyExtractor,
    policy: ClassificationPolicy,
    voters: SymptomVoters,
    last_state: ClassificationState,
    cycles: u64,
}

impl ClassificationPipeline {
    /// Build a pipeline backed by rustfft
    ///
    /// # Errors
    /// - `MonitorError::Config` if the configuration is rejected
    /// - `MonitorError::SpectralInit` if the window size is not a supported FFT size
    pub fn new(config: &AppConfig) -> Result<Self, MonitorError> {
        config.validate()?;
        let engine = SpectralEngine::with_rustfft(
            config.window.window_size,
            config.window.sample_rate_hz,
        )?;
        Ok(Self::assemble(config, engine))
    }

    /// Build a pipeline around an injected transform
    ///
    /// The transform's size must equal the configured window size.
    pub fn with_transform(
        config: &AppConfig,
        transform: Box<dyn SpectralTransform>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if transform.size() != config.window.window_size {
            return Err(ConfigError::WindowSizeInvalid {
                size: transform.size(),
            });
        }
        let engine = SpectralEngine::new(transform, config.window.sample_rate_hz);
        Ok(Self::assemble(config, engine))
    }

    fn assemble(config: &AppConfig, engine: SpectralEngine) -> Self {
        Self {
            window_builder: WindowBuilder::new(engine.size(), config.window.filter_alpha),
            engine,
            extractor: BandEnergyExtractor::new(FrequencyBands::from_config(&config.bands)),
            policy: ClassificationPolicy::from_config(config),
            voters: SymptomVoters::new(config.detection.voter_capacity),
            last_state: ClassificationState::default(),
            cycles: 0,
        }
    }

    /// Run one full cycle: acquire a window and classify it
    ///
    /// A sensor failure abandons the cycle; voters and state are untouched.
    pub fn run_cycle<S: SensorDriver + ?Sized>(
        &mut self,
        sensor: &mut S,
    ) -> Result<CycleReport, SensorError> {
        let window = self.window_builder.build_window(sensor)?;
        let spectrum = self.engine.transform_sized(&window);
        let score = self.extractor.extract(&spectrum);
        Ok(self.finish_cycle(score))
    }

    /// Classify an already-prepared window of DC-removed magnitudes
    ///
    /// # Errors
    /// `SpectralError::WindowLengthMismatch` if `window` does not hold exactly
    /// `window_size` samples. Voters, state and the cycle count are untouched.
    pub fn process_window(&mut self, window: &Window<'_>) -> Result<CycleReport, SpectralError> {
        let spectrum = self.engine.transform(window)?;
        let score = self.extractor.extract(&spectrum);
        Ok(self.finish_cycle(score))
    }

    fn finish_cycle(&mut self, score: BandScore) -> CycleReport {
        let vote = self.policy.classify(&score);
        let sums = self.voters.update(&vote);
        let state = self.policy.decide(&sums, &vote);

        tracing::debug!(
            "[Pipeline] cycle={} tremor_energy={:.2} dyskinesia_energy={:.2} dominant={:.3}Hz (bin {}, mag {:.2}) t_sum={} k_sum={}",
            self.cycles,
            score.tremor_energy,
            score.dyskinesia_energy,
            score.dominant_frequency_hz,
            score.dominant_bin,
            score.dominant_magnitude,
            sums.tremor,
            sums.dyskinesia
        );

        if state.symptom != self.last_state.symptom {
            tracing::info!(
                "[Pipeline] State change {} -> {} (intensity {})",
                self.last_state.symptom.label(),
                state.symptom.label(),
                state.intensity
            );
        }

        let report = CycleReport {
            cycle: self.cycles,
            state,
            vote,
            score,
            sums,
        };
        self.last_state = state;
        self.cycles += 1;
        report
    }

    pub fn voters(&self) -> &SymptomVoters {
        &self.voters
    }

    pub fn policy(&self) -> &ClassificationPolicy {
        &self.policy
    }

    pub fn last_state(&self) -> ClassificationState {
        self.last_state
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles
    }

    pub fn window_size(&self) -> usize {
        self.window_builder.window_size()
    }
}

/// Counters returned when the pipeline thread exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub cycles_completed: u64,
    pub cycles_abandoned: u64,
}

/// Slice used while waiting out the cycle interval so stop requests are seen promptly
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Spawn the cycle loop on a dedicated thread
///
/// The loop runs until `running` is cleared or the sensor reports that no more
/// samples will ever arrive (`Disconnected` / `FixtureExhausted`). A
/// `SensorUnavailable` cycle is abandoned and retried on the next tick.
///
/// # Arguments
/// * `pipeline` - Pipeline state, moved into the thread
/// * `sensor` - Sample source, moved into the thread
/// * `notifier` - Receives every completed cycle's report
/// * `running` - Cleared by the owner to request shutdown; cleared by the thread on exit
/// * `interval` - Minimum time between cycle starts (zero runs back-to-back)
pub fn spawn_pipeline_thread<S, N>(
    mut pipeline: ClassificationPipeline,
    mut sensor: S,
    notifier: N,
    running: Arc<AtomicBool>,
    interval: Duration,
) -> io::Result<JoinHandle<PipelineStats>>
where
    S: SensorDriver + 'static,
    N: Notifier + 'static,
{
    thread::Builder::new()
        .name("tremor-pipeline".to_string())
        .spawn(move || {
            tracing::info!(
                "[PipelineThread] Starting cycle loop (window {} samples, interval {:?})",
                pipeline.window_size(),
                interval
            );

            let mut stats = PipelineStats::default();

            while running.load(Ordering::SeqCst) {
                let started = Instant::now();

                match pipeline.run_cycle(&mut sensor) {
                    Ok(report) => {
                        stats.cycles_completed += 1;
                        notifier.publish(&report);
                    }
                    Err(err @ SensorError::SensorUnavailable { .. }) => {
                        stats.cycles_abandoned += 1;
                        tracing::warn!("[PipelineThread] Cycle abandoned: {}", err.message());
                    }
                    Err(err) => {
                        stats.cycles_abandoned += 1;
                        log_sensor_error(&err, "pipeline_cycle");
                        break;
                    }
                }

                while running.load(Ordering::SeqCst) {
                    let elapsed = started.elapsed();
                    if elapsed >= interval {
                        break;
                    }
                    thread::sleep((interval - elapsed).min(STOP_POLL_INTERVAL));
                }
            }

            running.store(false, Ordering::SeqCst);
            tracing::info!(
                "[PipelineThread] Exiting after {} cycles ({} abandoned)",
                stats.cycles_completed,
                stats.cycles_abandoned
            );
            stats
        })
}
