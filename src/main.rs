use chessmirror::config::MirrorConfig;
use chessmirror::protocol::{run_stdin, ProtocolHandler, DRIVER_NAME};
use chessmirror::scheduler::{Scheduler, SharedSensor, Signal};
use chessmirror::transport::{Relay, WriterTarget};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Reads source board snapshots on stdin and writes mirror messages on stdout
#[derive(Parser, Debug)]
#[command(name = "chessmirror", version)]
struct Args {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Quiet time after the last change before a board is read (ms)
    #[arg(long)]
    quiescence_ms: Option<u64>,

    /// Fallback poll cadence (ms)
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log: String,
}

impl Args {
    fn load_config(&self) -> Result<MirrorConfig, chessmirror::error::ConfigError> {
        let mut config = match &self.config {
            Some(path) => MirrorConfig::load(path)?,
            None => MirrorConfig::default(),
        };
        if let Some(ms) = self.quiescence_ms {
            config.quiescence_ms = ms;
        }
        if let Some(ms) = self.poll_ms {
            config.poll_interval_ms = ms;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(?config, "{} starting", DRIVER_NAME);

    let sensor = SharedSensor::new();
    let relay = Relay::new().with_target(WriterTarget::new("stdout", io::stdout()));
    info!(targets = relay.target_count(), "relay ready");
    let scheduler = Scheduler::new(sensor.clone(), relay, &config);
    let position = scheduler.subscribe();

    let (signals, signal_rx) = mpsc::unbounded_channel();
    let scheduler = tokio::spawn(scheduler.run(signal_rx));

    let driver_signals = signals.clone();
    let driver = tokio::task::spawn_blocking(move || {
        let mut handler = ProtocolHandler::new(sensor, driver_signals, position, io::stdout());
        run_stdin(&mut handler);
    });

    if let Err(e) = driver.await {
        error!("driver task failed: {}", e);
    }
    // End of input without "quit" still stops the scheduler
    signals.send(Signal::Shutdown).ok();

    match scheduler.await {
        Ok(scheduler) => {
            info!(cycles = scheduler.cycles(), "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("scheduler task failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
