// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::CrawlSettings;
use crate::engines::parsed_page::ParsedPage;
use crate::engines::traits::{EngineError, FetchError, PageFetcher};
use crate::infrastructure::metrics::{FETCH_FAILURES, FETCH_RETRIES, PAGES_FETCHED};
use crate::utils::retry_policy::RetryPolicy;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, warn};

/// 基于 reqwest 的页面抓取器
///
/// 所有请求共享同一个 `reqwest::Client`（内部使用连接池，可并发使用），
/// 每次请求都带超时，失败时按 [`RetryPolicy`] 退避重试
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    retry_policy: RetryPolicy,
}

impl ReqwestFetcher {
    /// 根据爬取配置创建抓取器
    pub fn new(settings: &CrawlSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.request_timeout())
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            retry_policy: RetryPolicy::from_settings(settings),
        })
    }

    /// 使用自定义的客户端和重试策略
    pub fn with_client(client: reqwest::Client, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            retry_policy,
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// 抓取页面正文，失败时按策略重试
    pub async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            let start = Instant::now();
            match self.fetch_once(url).await {
                Ok(body) => {
                    metrics::counter!(PAGES_FETCHED).increment(1);
                    debug!(
                        url,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Fetched page"
                    );
                    return Ok(body);
                }
                Err(e) if e.is_retryable() && self.retry_policy.should_retry(attempt) => {
                    attempt += 1;
                    let backoff = self.retry_policy.calculate_backoff(attempt);
                    metrics::counter!(FETCH_RETRIES).increment(1);
                    warn!(
                        url,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "Fetch failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    metrics::counter!(FETCH_FAILURES).increment(1);
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch_and_parse(&self, url: &str) -> Result<ParsedPage, EngineError> {
        let body = self.fetch_body(url).await?;
        Ok(ParsedPage::parse(url, &body)?)
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
