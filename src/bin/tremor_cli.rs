use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tremor_monitor::analysis::classifier::{ClassificationState, Symptom};
use tremor_monitor::error::SensorError;
use tremor_monitor::sensor::{MotionFixture, SensorDriver, SyntheticMotion, SyntheticSensor};
use tremor_monitor::{init_logging, AppConfig, ClassificationPipeline};

#[derive(Parser, Debug)]
#[command(
    name = "tremor_cli",
    about = "Deterministic harness for the tremor/dyskinesia classification pipeline"
)]
struct Cli {
    /// Configuration file (defaults to assets/monitor_config.json in the
    /// working directory, then to built-in values)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Emit per-cycle debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify synthetic motion and print one JSON cycle report per line
    Simulate {
        #[arg(long, default_value_t = 4.0)]
        frequency: f32,
        #[arg(long, default_value_t = 0.4)]
        amplitude: f32,
        #[arg(long, default_value_t = 12)]
        cycles: u32,
        #[arg(long, default_value_t = 0.01)]
        noise: f32,
        #[arg(long)]
        seed: Option<u64>,
        /// Also save the generated samples as a replayable fixture
        #[arg(long)]
        record: Option<PathBuf>,
    },
    /// Replay a recorded fixture until it runs out of samples
    Replay {
        #[arg(long)]
        fixture: PathBuf,
        /// Expected final symptom; exits with status 2 on mismatch
        #[arg(long)]
        expect: Option<String>,
    },
    /// Print the effective configuration as JSON
    Config {
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli
        .config
        .map(AppConfig::load_from_file)
        .unwrap_or_else(AppConfig::load);

    match cli.command {
        Commands::Simulate {
            frequency,
            amplitude,
            cycles,
            noise,
            seed,
            record,
        } => run_simulate(config, frequency, amplitude, noise, cycles, seed, record),
        Commands::Replay { fixture, expect } => run_replay(config, fixture, expect),
        Commands::Config { path } => run_config(&config, path),
    }
}

fn run_simulate(
    config: AppConfig,
    frequency: f32,
    amplitude: f32,
    noise: f32,
    cycles: u32,
    seed: Option<u64>,
    record: Option<PathBuf>,
) -> Result<ExitCode> {
    let motion = SyntheticMotion::oscillation(frequency, amplitude).with_noise(noise);
    let sample_rate = config.window.sample_rate_hz;
    let mut synthetic = match seed {
        Some(seed) => SyntheticSensor::with_seed(motion, sample_rate, seed),
        None => SyntheticSensor::new(motion, sample_rate),
    };

    let mut sensor: Box<dyn SensorDriver> = match record {
        Some(path) => {
            let count = cycles as usize * config.window.window_size;
            let fixture = MotionFixture::record(
                format!("simulate-{frequency}hz-{amplitude}g"),
                sample_rate,
                &mut synthetic,
                count,
            )?;
            fixture
                .save(&path)
                .with_context(|| format!("writing fixture {}", path.display()))?;
            Box::new(fixture.into_sensor())
        }
        None => Box::new(synthetic),
    };

    let mut pipeline = ClassificationPipeline::new(&config).context("building pipeline")?;
    let mut last = ClassificationState::default();
    for _ in 0..cycles {
        let report = pipeline
            .run_cycle(sensor.as_mut())
            .context("running simulated cycle")?;
        println!("{}", serde_json::to_string(&report)?);
        last = report.state;
    }

    emit_summary(cycles as u64, last)?;
    Ok(ExitCode::from(0))
}

fn run_replay(
    mut config: AppConfig,
    fixture_path: PathBuf,
    expect: Option<String>,
) -> Result<ExitCode> {
    let expected = match expect.as_deref() {
        Some(label) => match Symptom::from_label(label) {
            Some(symptom) => Some(symptom),
            None => bail!("unknown symptom '{label}' (expected STABLE, TREMOR or DYSKINESIA)"),
        },
        None => None,
    };

    let fixture = MotionFixture::load(&fixture_path)
        .with_context(|| format!("loading fixture {}", fixture_path.display()))?;
    config.window.sample_rate_hz = fixture.sample_rate_hz;

    let mut pipeline = ClassificationPipeline::new(&config)
        .with_context(|| format!("building pipeline for fixture {}", fixture.name))?;
    let mut sensor = fixture.into_sensor();

    let mut cycles = 0u64;
    let mut last = ClassificationState::default();
    loop {
        match pipeline.run_cycle(&mut sensor) {
            Ok(report) => {
                println!("{}", serde_json::to_string(&report)?);
                last = report.state;
                cycles += 1;
            }
            Err(SensorError::FixtureExhausted { .. }) => break,
            Err(err) => return Err(err).context("replaying fixture"),
        }
    }

    emit_summary(cycles, last)?;

    match expected {
        Some(symptom) if symptom != last.symptom => {
            eprintln!(
                "Expected {} but fixture ended in {}",
                symptom.label(),
                last.symptom.label()
            );
            Ok(ExitCode::from(2))
        }
        _ => Ok(ExitCode::from(0)),
    }
}

fn run_config(config: &AppConfig, path: Option<PathBuf>) -> Result<ExitCode> {
    config.validate().context("validating configuration")?;
    let json = serde_json::to_string_pretty(config)?;

    if let Some(path) = path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(ExitCode::from(0))
}

fn emit_summary(cycles: u64, state: ClassificationState) -> Result<()> {
    let summary = RunSummary {
        cycles,
        final_symptom: state.symptom.label(),
        final_intensity: state.intensity,
    };
    eprintln!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

#[derive(Serialize)]
struct RunSummary {
    cycles: u64,
    final_symptom: &'static str,
    final_intensity: u8,
}
