//! client.rs — HTTP access to the provider endpoints.
//!
//! The engine never talks to the network itself: workers go through a
//! `ScheduleFetcher`, and `HttpFetcher` is the reqwest-backed implementation.

use crate::config::Address;
use crate::error::ScheduleResult;
use crate::table::{QueueReply, gpv_query_value};
use async_trait::async_trait;
use reqwest::{Client, Response, header::CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const SHUTDOWNS_PATH: &str = "/ua/shutdowns";

/// Raw payload access for both source kinds.
#[async_trait]
pub trait ScheduleFetcher: Send + Sync {
    /// Address lookup on the table source; the reply names the queue (GPV) code.
    async fn fetch_queue_reply(
        &self,
        base_url: &str,
        address: &Address,
        update_fact: &str,
    ) -> ScheduleResult<QueueReply>;

    /// HTML grid of one queue.
    async fn fetch_schedule_html(&self, base_url: &str, queue_code: &str) -> ScheduleResult<String>;

    /// JSON page document of the region source.
    async fn fetch_region_document(&self, api_url: &str) -> ScheduleResult<Value>;
}

/// reqwest implementation of `ScheduleFetcher`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> ScheduleResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn json_or_text(response: Response) -> ScheduleResult<QueueReply> {
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("json"));
        if is_json {
            Ok(QueueReply::Json(response.json::<Value>().await?))
        } else {
            Ok(QueueReply::Text(response.text().await?))
        }
    }
}

#[async_trait]
impl ScheduleFetcher for HttpFetcher {
    async fn fetch_queue_reply(
        &self,
        base_url: &str,
        address: &Address,
        update_fact: &str,
    ) -> ScheduleResult<QueueReply> {
        let url = format!("{base_url}{SHUTDOWNS_PATH}");
        debug!("[HTTP] Resolving queue for '{}' via {}", address, url);

        let form = [
            ("method", "getHomeNum"),
            ("data[0][name]", "city"),
            ("data[0][value]", address.city.as_str()),
            ("data[1][name]", "street"),
            ("data[1][value]", address.street.as_str()),
            ("data[2][name]", "house_num"),
            ("data[2][value]", address.house.as_str()),
            ("data[3][name]", "updateFact"),
            ("data[3][value]", update_fact),
        ];
        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;
        Self::json_or_text(response).await
    }

    async fn fetch_schedule_html(&self, base_url: &str, queue_code: &str) -> ScheduleResult<String> {
        let url = format!("{base_url}{SHUTDOWNS_PATH}");
        debug!("[HTTP] Fetching schedule grid for {} via {}", queue_code, url);

        let response = self
            .client
            .get(&url)
            .query(&[("gpv", gpv_query_value(queue_code))])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    async fn fetch_region_document(&self, api_url: &str) -> ScheduleResult<Value> {
        debug!("[HTTP] Fetching regional schedule from {}", api_url);

        let response = self.client.get(api_url).send().await?.error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}
