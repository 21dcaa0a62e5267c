// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::parsed_page::ParsedPage;
use async_trait::async_trait;
use thiserror::Error;

/// 抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败（网络错误或超时）
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// 非成功状态码
    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
    /// 没有可用的页面（离线抓取器未收录该URL）
    #[error("No page available for {0}")]
    Missing(String),
    /// 已取消
    #[error("Fetch cancelled")]
    Cancelled,
}

impl FetchError {
    /// 判断错误是否可重试
    ///
    /// 网络错误、超时和非成功状态码都会以有限次数重试
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Request(_) | FetchError::Status { .. } => true,
            FetchError::Missing(_) | FetchError::Cancelled => false,
        }
    }
}

/// 解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// 响应体为空
    #[error("Empty response body for {0}")]
    EmptyBody(String),
    /// 响应体不是 HTML 标记
    #[error("Response body for {0} is not markup")]
    NotMarkup(String),
}

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl EngineError {
    /// 是否为取消导致的错误
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Fetch(FetchError::Cancelled))
    }
}

/// 页面抓取特质
///
/// 获取URL并解析为 [`ParsedPage`]，实现必须可以安全地并发调用
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取并解析页面
    async fn fetch_and_parse(&self, url: &str) -> Result<ParsedPage, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
