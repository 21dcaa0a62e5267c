// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::parsed_page::ParsedPage;
use crate::engines::traits::{EngineError, FetchError, PageFetcher};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

enum StoredPage {
    Body(String),
    Status(u16),
}

/// 内存页面抓取器
///
/// 测试用：从预先保存的页面回放抓取结果，并记录请求过的URL
#[derive(Default)]
pub struct InMemoryFetcher {
    pages: HashMap<String, StoredPage>,
    requested: Mutex<Vec<String>>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记页面内容
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), StoredPage::Body(body.into()));
        self
    }

    /// 登记一个返回错误状态码的页面
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.pages.insert(url.into(), StoredPage::Status(status));
        self
    }

    /// 按请求顺序返回所有请求过的URL
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl PageFetcher for InMemoryFetcher {
    async fn fetch_and_parse(&self, url: &str) -> Result<ParsedPage, EngineError> {
        self.requested.lock().push(url.to_string());

        match self.pages.get(url) {
            Some(StoredPage::Body(body)) => Ok(ParsedPage::parse(url, body)?),
            Some(StoredPage::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }
            .into()),
            None => Err(FetchError::Missing(url.to_string()).into()),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_pages_and_records_requests() {
        let fetcher = InMemoryFetcher::new()
            .with_page("https://f.example/a", "<div class=\"bbWrapper\">x</div>")
            .with_status("https://f.example/b", 500);

        assert!(fetcher.fetch_and_parse("https://f.example/a").await.is_ok());
        assert!(matches!(
            fetcher.fetch_and_parse("https://f.example/b").await,
            Err(EngineError::Fetch(FetchError::Status { status: 500, .. }))
        ));
        assert!(matches!(
            fetcher.fetch_and_parse("https://f.example/c").await,
            Err(EngineError::Fetch(FetchError::Missing(_)))
        ));

        assert_eq!(
            fetcher.requested(),
            vec![
                "https://f.example/a".to_string(),
                "https://f.example/b".to_string(),
                "https://f.example/c".to_string(),
            ]
        );
    }
}
