use crate::assembler::{assemble_region, assemble_table, resolve_queue};
use crate::client::ScheduleFetcher;
use crate::config::SourceConfig;
use crate::error::ScheduleResult;
use crate::types::Snapshot;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

/// Refreshes one household's schedule and keeps the last good snapshot.
///
/// `refresh` takes `&mut self`, so two refreshes of the same worker never overlap.
#[derive(Debug)]
pub struct OutageWorker<F> {
    source: SourceConfig,
    tz: Tz,
    fetcher: F,
    last: Option<Snapshot>,
}

impl<F: ScheduleFetcher> OutageWorker<F> {
    pub fn new(source: SourceConfig, tz: Tz, fetcher: F) -> Self {
        Self {
            source,
            tz,
            fetcher,
            last: None,
        }
    }

    pub fn label(&self) -> String {
        self.source.label()
    }

    /// Last successfully assembled snapshot, if any refresh succeeded yet.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.last.as_ref()
    }

    /// Runs the configured pipeline. On error the previous snapshot stays in place.
    pub async fn refresh(&mut self, now: DateTime<Utc>) -> ScheduleResult<&Snapshot> {
        let snapshot = self.assemble(now).await?;
        info!(
            "[WORKER {}] Schedule updated: {} intervals, next={}",
            self.source.label(),
            snapshot.today_count(),
            snapshot.next_status()
        );
        Ok(self.last.insert(snapshot))
    }

    async fn assemble(&self, now: DateTime<Utc>) -> ScheduleResult<Snapshot> {
        match &self.source {
            SourceConfig::Table {
                base_url,
                address,
                markers,
            } => {
                // 1. Queue code for the address
                let update_fact = now.with_timezone(&self.tz).format("%d.%m.%Y %H:%M").to_string();
                let reply = self
                    .fetcher
                    .fetch_queue_reply(base_url, address, &update_fact)
                    .await?;
                let queue_code = resolve_queue(address, &reply)?;
                debug!("[WORKER {}] Queue resolved to {}", address, queue_code);

                // 2. Grid of that queue
                let html = self.fetcher.fetch_schedule_html(base_url, &queue_code).await?;
                let payload = assemble_table(address, &queue_code, &html, markers, now, self.tz)?;
                Ok(Snapshot::Table(payload))
            }
            SourceConfig::Region {
                api_url,
                region,
                region_code,
                group,
            } => {
                let document = self.fetcher.fetch_region_document(api_url).await?;
                let payload = assemble_region(region, region_code, group, &document, now, self.tz)?;
                Ok(Snapshot::Region(payload))
            }
        }
    }
}
