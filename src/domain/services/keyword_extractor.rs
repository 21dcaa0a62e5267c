// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::match_set::MatchSet;
use crate::domain::models::message::Message;
use crate::domain::models::query::{KeywordSet, RecencyMode};
use crate::domain::services::page_navigator::PageSequence;
use crate::engines::parsed_page::ParsedPage;
use crate::engines::traits::{EngineError, FetchError, PageFetcher};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 状态更新消息的最大长度
pub const MAX_STATUS_LENGTH: usize = 50;

/// 高歧义决定触发词允许的长度
pub const STRICT_STATUS_LENGTH: usize = 5;

/// 单字母决定触发词：整条消息不能超过 [`STRICT_STATUS_LENGTH`]
pub const SINGLE_LETTER_DECISION_TRIGGERS: [&str; 5] = ["a.", "a!", "w.", "w!", "r."];

/// 单词形式的决定触发词：去掉触发词后剩余部分不能超过 [`STRICT_STATUS_LENGTH`]
pub const WORD_DECISION_TRIGGERS: [&str; 3] = ["accepted!", "waitlisted", "rejected"];

/// 折叠引用内容的标记，标记之前是被引用的消息
pub const QUOTE_EXPAND_MARKER: &str = "Click to expand...";

/// 扫描错误
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to fetch page {page_number} ({url}): {source}")]
    Fetch {
        page_number: u32,
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("Scan cancelled")]
    Cancelled,
}

/// 消息命中结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordHit {
    /// 命中的触发词
    pub trigger: String,
    /// 去掉引用内容后的消息正文
    pub text: String,
}

/// 只有问号作为标点的消息不提供信息
pub fn is_question_only(text: &str) -> bool {
    text.contains('?') && !text.contains(['.', '!'])
}

fn within_strict_cap(trigger: &str, length: usize) -> bool {
    if SINGLE_LETTER_DECISION_TRIGGERS.contains(&trigger) {
        return length <= STRICT_STATUS_LENGTH;
    }
    if WORD_DECISION_TRIGGERS.contains(&trigger) {
        return length.saturating_sub(trigger.chars().count()) <= STRICT_STATUS_LENGTH;
    }
    true
}

/// 去掉引用内容，只保留最后一个折叠标记之后的文字
pub fn strip_quoted(text: &str) -> &str {
    match text.rfind(QUOTE_EXPAND_MARKER) {
        Some(pos) => {
            let reply = text[pos + QUOTE_EXPAND_MARKER.len()..].trim();
            if reply.is_empty() {
                text
            } else {
                reply
            }
        }
        None => text,
    }
}

/// 检查单条消息是否命中触发词
///
/// 触发词按集合顺序检查，第一个通过所有条件的触发词胜出：
/// 1. 只含问号的消息直接拒绝
/// 2. 消息中必须出现触发词（不区分大小写）
/// 3. 消息长度不能超过 [`MAX_STATUS_LENGTH`]
/// 4. 决定类触发词还必须满足更严格的长度限制
pub fn match_message(text: &str, keywords: &KeywordSet) -> Option<KeywordHit> {
    let text = text.trim();
    if text.is_empty() || is_question_only(text) {
        return None;
    }

    let lower = text.to_lowercase();
    let length = text.chars().count();

    keywords
        .iter()
        .filter(|trigger| lower.contains(trigger))
        .filter(|_| length <= MAX_STATUS_LENGTH)
        .find(|trigger| within_strict_cap(trigger, length))
        .map(|trigger| KeywordHit {
            trigger: trigger.to_string(),
            text: strip_quoted(text).to_string(),
        })
}

/// 关键词提取器
///
/// 按时间顺序模式决定扫描方向，非 ALL 模式下某一页出现命中后停止扫描
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    keywords: KeywordSet,
    recency_mode: RecencyMode,
    page_concurrency: usize,
}

impl KeywordExtractor {
    pub fn new(keywords: KeywordSet, recency_mode: RecencyMode) -> Self {
        Self {
            keywords,
            recency_mode,
            page_concurrency: 1,
        }
    }

    /// ALL 模式下同时抓取的页面数
    pub fn with_page_concurrency(mut self, page_concurrency: usize) -> Self {
        self.page_concurrency = page_concurrency.max(1);
        self
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    /// 页面下标的扫描顺序
    pub fn scan_order(&self, page_count: usize) -> Vec<usize> {
        match self.recency_mode {
            RecencyMode::MostRecent => (0..page_count).rev().collect(),
            RecencyMode::All | RecencyMode::OldestFirst => (0..page_count).collect(),
        }
    }

    /// 扫描一个已解析的页面，把命中写入 `matches`
    ///
    /// # 返回值
    ///
    /// 该页面上的命中数
    pub fn scan_page(&self, page_number: u32, page: &ParsedPage, matches: &mut MatchSet) -> usize {
        let mut hits = 0;
        for block in page.find_message_blocks() {
            let Some(hit) = match_message(block.raw_text(), &self.keywords) else {
                continue;
            };
            let message = Message::from_block(block, page_number);
            debug!(
                page_number,
                author = %message.author,
                trigger = %hit.trigger,
                "Recorded keyword match"
            );
            matches.record(hit.text, &message);
            hits += 1;
        }
        hits
    }

    /// 扫描帖子的页面
    ///
    /// # 返回值
    ///
    /// * `Ok(MatchSet)` - 命中集合，没有命中时为空集合
    /// * `Err(ScanError)` - 某一页抓取失败（已重试）或扫描被取消
    pub async fn scan<F: PageFetcher + ?Sized>(
        &self,
        fetcher: &F,
        pages: &PageSequence,
        cancel: &CancellationToken,
    ) -> Result<MatchSet, ScanError> {
        let order = self.scan_order(pages.len());
        let mut matches = MatchSet::new();

        if self.recency_mode == RecencyMode::All {
            let mut fetched = stream::iter(order.into_iter().map(|index| async move {
                (index, fetch_page(fetcher, pages, index, cancel).await)
            }))
            .buffered(self.page_concurrency);

            while let Some((index, page)) = fetched.next().await {
                if let Some(page) = page? {
                    self.scan_page(page_number(index), &page, &mut matches);
                }
            }
            return Ok(matches);
        }

        for index in order {
            if let Some(page) = fetch_page(fetcher, pages, index, cancel).await? {
                self.scan_page(page_number(index), &page, &mut matches);
            }
            if !matches.is_empty() {
                debug!(
                    page_number = page_number(index),
                    matches = matches.len(),
                    "Stopping scan after first page with matches"
                );
                break;
            }
        }
        Ok(matches)
    }
}

fn page_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

/// 抓取单个页面；解析失败视为该页没有消息
async fn fetch_page<F: PageFetcher + ?Sized>(
    fetcher: &F,
    pages: &PageSequence,
    index: usize,
    cancel: &CancellationToken,
) -> Result<Option<ParsedPage>, ScanError> {
    let Some(url) = pages.get(index) else {
        return Ok(None);
    };
    if cancel.is_cancelled() {
        return Err(ScanError::Cancelled);
    }

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ScanError::Cancelled),
        result = fetcher.fetch_and_parse(url) => result,
    };

    match result {
        Ok(page) => Ok(Some(page)),
        Err(EngineError::Parse(e)) => {
            warn!(url, "Skipping unparseable page: {}", e);
            Ok(None)
        }
        Err(EngineError::Fetch(FetchError::Cancelled)) => Err(ScanError::Cancelled),
        Err(EngineError::Fetch(source)) => Err(ScanError::Fetch {
            page_number: page_number(index),
            url: url.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
#[path = "keyword_extractor_test.rs"]
mod tests;
