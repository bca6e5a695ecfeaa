use anyhow::Context;
use clap::Parser;
use config::ListenerConfig;
use log::{error, info};
use media::MediaKeySink;
use serial::SerialConnector;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use triggercore::interface::MonotonicClock;
use triggercore::{run_session, LoopExit, TriggerLoop};

mod config;
mod interrupt;
mod media;
mod serial;

#[derive(Parser)]
#[command(author, version, about = "Press play/pause when a serial envelope crosses a threshold")]
struct Args {
    /// Load listener settings from YAML instead of the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Serial device, e.g. COM3 or /dev/ttyACM0
    #[arg(long)]
    port: Option<String>,
    #[arg(long)]
    baud_rate: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match args.config {
        Some(path) => ListenerConfig::load(path)?,
        None => ListenerConfig::default(),
    }
    .with_overrides(args.port, args.baud_rate);

    let shutdown = Arc::new(AtomicBool::new(false));
    interrupt::watch_ctrl_c(shutdown.clone())?;

    let sink = MediaKeySink::new()?;
    let mut trigger = TriggerLoop::new(&config.to_gate_config(), sink, MonotonicClock::new())
        .context("building trigger pipeline")?
        .with_idle_pause(config.idle_pause());
    let mut connector = SerialConnector::from_config(&config);

    match run_session(&mut connector, &mut trigger, &shutdown) {
        Ok(LoopExit::Interrupted) => info!("Stopped on interrupt."),
        Ok(LoopExit::SourceExhausted) => info!("Serial source closed the stream."),
        Err(err) => error!("Serial error: {}", err),
    }

    let metrics = trigger.metrics();
    info!(
        "Session summary -> samples {}, malformed {}, triggers {}, suppressed {}",
        metrics.samples, metrics.malformed, metrics.fired, metrics.suppressed
    );

    Ok(())
}
