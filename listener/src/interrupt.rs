use anyhow::Context;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

/// Raises `shutdown` on the first Ctrl+C. The watcher owns a
/// current-thread runtime on its own thread; the trigger loop only ever
/// reads the flag.
pub fn watch_ctrl_c(shutdown: Arc<AtomicBool>) -> anyhow::Result<()> {
    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for signal handling")?;

    thread::Builder::new()
        .name("ctrl-c-watch".into())
        .spawn(move || {
            runtime.block_on(async {
                match signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Interrupt received, stopping after the current read");
                        shutdown.store(true, Ordering::SeqCst);
                    }
                    Err(err) => warn!("Ctrl+C handler unavailable: {}", err),
                }
            });
        })
        .context("spawning Ctrl+C watcher")?;

    Ok(())
}
