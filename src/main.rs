use anyhow::{Result, anyhow};
use std::time::Duration;
use svitlo::config::Config;
use svitlo::{HttpFetcher, OutageWorker, scheduler};
use tokio::task;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    config.validate().map_err(|e| anyhow!(e))?;
    let tz = config.tz().map_err(|e| anyhow!(e))?;
    info!(
        "Configuration loaded: {} workers, timezone {}, interval {}s",
        config.workers.len(),
        tz,
        config.scan_interval_secs
    );

    let refresh_timeout = Duration::from_secs(config.timeout_secs);
    let scan_interval = Duration::from_secs(config.scan_interval_secs);
    let fetcher = HttpFetcher::new(refresh_timeout)?;

    // One task per household; each worker owns its state
    let mut handles: Vec<task::JoinHandle<()>> = Vec::new();
    for source in config.workers {
        let worker = OutageWorker::new(source, tz, fetcher.clone());
        info!("Spawning worker {}", worker.label());
        handles.push(task::spawn(scheduler::run_scheduler(
            worker,
            scan_interval,
            refresh_timeout,
        )));
    }

    for handle in handles {
        if let Err(e) = handle.await {
            error!("Worker task failed: {:?}", e);
        }
    }

    Ok(())
}
