// src/scheduler.rs

use crate::client::ScheduleFetcher;
use crate::error::ScheduleError;
use crate::worker::OutageWorker;
use chrono::Utc;
use std::time::{Duration, Instant};
use tokio::time::{interval, timeout};
use tracing::{debug, error, info, warn};

/// Delay between attempts while no schedule has been fetched yet.
const FIRST_REFRESH_RETRY: Duration = Duration::from_secs(10);

/// Scheduler states: waiting for the first good payload, or refreshing periodically.
enum SchedulerState {
    WaitingForFirstRefresh,
    Refreshing,
}

/// One bounded refresh. Returns true when a new snapshot was stored.
async fn refresh_once<F: ScheduleFetcher>(
    worker: &mut OutageWorker<F>,
    refresh_timeout: Duration,
    cycle_number: u64,
) -> bool {
    let label = worker.label();
    let started = Instant::now();

    let outcome = match timeout(refresh_timeout, worker.refresh(Utc::now())).await {
        Ok(result) => result.map(|snapshot| serde_json::to_string(snapshot)),
        Err(_) => Err(ScheduleError::Timeout(refresh_timeout)),
    };

    match outcome {
        Ok(Ok(json)) => {
            debug!("[WORKER {}][CYCLE {}] Payload: {}", label, cycle_number, json);
            info!(
                "[WORKER {}][CYCLE {}] Refresh finished in {:?}.",
                label,
                cycle_number,
                started.elapsed()
            );
            true
        }
        Ok(Err(e)) => {
            error!("[WORKER {}][CYCLE {}] Could not serialize payload: {}", label, cycle_number, e);
            true
        }
        Err(e) => {
            warn!(
                "[WORKER {}][CYCLE {}] Update failed, keeping last known payload: {}",
                label, cycle_number, e
            );
            false
        }
    }
}

/// Main loop of one worker: retry until a first schedule arrives, then refresh on every tick.
pub async fn run_scheduler<F: ScheduleFetcher>(
    mut worker: OutageWorker<F>,
    scan_interval: Duration,
    refresh_timeout: Duration,
) {
    let mut state = SchedulerState::WaitingForFirstRefresh;
    let mut cycle_number: u64 = 0;

    loop {
        match state {
            SchedulerState::WaitingForFirstRefresh => {
                cycle_number += 1;
                info!("[WORKER {}] Fetching initial schedule...", worker.label());
                if refresh_once(&mut worker, refresh_timeout, cycle_number).await {
                    info!(
                        "[WORKER {}] Initial schedule loaded, refreshing every {:?}.",
                        worker.label(),
                        scan_interval
                    );
                    state = SchedulerState::Refreshing;
                } else {
                    warn!(
                        "[WORKER {}] No schedule yet. Retrying in {:?}...",
                        worker.label(),
                        FIRST_REFRESH_RETRY
                    );
                    tokio::time::sleep(FIRST_REFRESH_RETRY).await;
                }
            }
            SchedulerState::Refreshing => {
                let mut ticker = interval(scan_interval);
                // The first tick completes immediately; the initial refresh already ran.
                ticker.tick().await;

                loop {
                    ticker.tick().await;
                    cycle_number += 1;
                    refresh_once(&mut worker, refresh_timeout, cycle_number).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Address, SourceConfig};
    use crate::error::ScheduleResult;
    use crate::table::QueueReply;
    use async_trait::async_trait;
    use chrono_tz::Europe::Kyiv;
    use serde_json::{Value, json};

    /// Region document served after `delay`.
    struct SlowFetcher {
        delay: Duration,
    }

    #[async_trait]
    impl ScheduleFetcher for SlowFetcher {
        async fn fetch_queue_reply(
            &self,
            _base_url: &str,
            _address: &Address,
            _update_fact: &str,
        ) -> ScheduleResult<QueueReply> {
            Err(ScheduleError::Resolution("not a table source".into()))
        }

        async fn fetch_schedule_html(&self, _base_url: &str, _queue_code: &str) -> ScheduleResult<String> {
            Err(ScheduleError::Resolution("not a table source".into()))
        }

        async fn fetch_region_document(&self, _api_url: &str) -> ScheduleResult<Value> {
            tokio::time::sleep(self.delay).await;
            Ok(json!({
                "components": [{
                    "template_name": "electricity-outages-daily-schedule",
                    "dailySchedule": {"kiev": {"today": {"groups": {}}}}
                }]
            }))
        }
    }

    fn worker(delay: Duration) -> OutageWorker<SlowFetcher> {
        let source = SourceConfig::Region {
            api_url: "http://localhost/schedule".into(),
            region: "Kyiv".into(),
            region_code: "kiev".into(),
            group: "1.1".into(),
        };
        OutageWorker::new(source, Kyiv, SlowFetcher { delay })
    }

    #[tokio::test]
    async fn test_refresh_once_stores_snapshot() {
        let mut worker = worker(Duration::ZERO);
        assert!(refresh_once(&mut worker, Duration::from_secs(5), 1).await);
        let snapshot = worker.snapshot().unwrap();
        assert_eq!(snapshot.today_count(), 0);
        assert_eq!(snapshot.next_status(), "no_more_today");
    }

    #[tokio::test]
    async fn test_refresh_once_times_out() {
        let mut worker = worker(Duration::from_secs(2));
        assert!(!refresh_once(&mut worker, Duration::from_millis(20), 1).await);
        assert!(worker.snapshot().is_none());
    }
}
