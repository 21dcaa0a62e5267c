// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::CrawlSettings;
use crate::domain::models::directory::DirectoryEntry;
use crate::domain::models::match_set::{CrawlResult, MatchSet, SchoolResult};
use crate::domain::models::query::{Query, QueryError};
use crate::domain::services::directory_resolver::DirectoryResolver;
use crate::domain::services::keyword_extractor::{KeywordExtractor, ScanError};
use crate::domain::services::page_navigator::PageNavigator;
use crate::engines::traits::{FetchError, PageFetcher};
use crate::infrastructure::directory_cache::{DirectoryCache, DirectoryError};
use crate::infrastructure::metrics::{MATCHES, QUERIES};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 查询错误
///
/// 只有整个查询无法进行时才返回；单个学校的失败记录在 [`SchoolResult`] 上
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("None of the requested schools could be resolved: {}", bad_queries.join(", "))]
    NoSchoolsResolved { bad_queries: Vec<String> },

    #[error("Crawl cancelled")]
    Cancelled,
}

/// 单个学校的爬取失败
#[derive(Error, Debug)]
pub enum SchoolError {
    #[error("Failed to discover thread pages: {0}")]
    Discover(#[from] FetchError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl SchoolError {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            SchoolError::Discover(FetchError::Cancelled) | SchoolError::Scan(ScanError::Cancelled)
        )
    }
}

/// 爬取服务
///
/// 查询的唯一入口：解析学校名称，按学校并发发现页面并扫描关键词，
/// 最后按请求顺序组装结果
pub struct CrawlService<F: PageFetcher + ?Sized> {
    /// 页面抓取器，所有学校共享
    fetcher: Arc<F>,
    /// 学年目录缓存
    directories: Arc<DirectoryCache>,
    settings: CrawlSettings,
    navigator: PageNavigator,
}

impl<F: PageFetcher + ?Sized> CrawlService<F> {
    /// 创建新的爬取服务实例
    ///
    /// # 参数
    ///
    /// * `fetcher` - 页面抓取器
    /// * `directories` - 学年目录缓存
    /// * `settings` - 爬取配置
    pub fn new(fetcher: Arc<F>, directories: Arc<DirectoryCache>, settings: CrawlSettings) -> Self {
        Self {
            fetcher,
            directories,
            settings,
            navigator: PageNavigator::default(),
        }
    }

    pub fn directories(&self) -> &DirectoryCache {
        &self.directories
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// 执行查询
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlResult)` - 与请求名称一一对应的结果
    /// * `Err(CrawlError)` - 学校数超限、学年未知、没有任何学校可解析或查询被取消
    pub async fn run_query(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<CrawlResult, CrawlError> {
        self.run_query_with_id(query, Uuid::new_v4(), cancel).await
    }

    /// 使用调用方提供的查询ID执行查询，日志中的 `query_id` 与之一致
    pub async fn run_query_with_id(
        &self,
        query: &Query,
        query_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<CrawlResult, CrawlError> {
        let started = Instant::now();
        metrics::counter!(QUERIES).increment(1);
        info!(
            %query_id,
            year = %query.year,
            schools = query.requested_names.len(),
            keyword = %query.keyword_category,
            recency = %query.recency_mode,
            "Starting query"
        );

        let max = self.settings.max_requested_schools;
        if query.requested_names.len() > max {
            return Err(QueryError::TooManySchools { max }.into());
        }
        if cancel.is_cancelled() {
            return Err(CrawlError::Cancelled);
        }

        let directory = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CrawlError::Cancelled),
            directory = self.directories.get_or_load(&*self.fetcher, &query.year) => directory?,
        };

        let resolver = DirectoryResolver::new(directory.names());
        let resolved: Vec<Option<DirectoryEntry>> = query
            .requested_names
            .iter()
            .map(|name| {
                resolver
                    .resolve_one(name)
                    .and_then(|r| directory.get(r.index).cloned())
            })
            .collect();

        let bad_queries: Vec<String> = query
            .requested_names
            .iter()
            .zip(&resolved)
            .filter(|(_, entry)| entry.is_none())
            .map(|(name, _)| name.clone())
            .collect();
        if !bad_queries.is_empty() {
            warn!(%query_id, ?bad_queries, "Some school names could not be resolved");
        }

        let mut unique: Vec<DirectoryEntry> = Vec::new();
        for entry in resolved.iter().flatten() {
            if !unique.iter().any(|seen| seen.name == entry.name) {
                unique.push(entry.clone());
            }
        }
        if unique.is_empty() {
            return Err(CrawlError::NoSchoolsResolved { bad_queries });
        }

        let extractor = KeywordExtractor::new(query.keywords.clone(), query.recency_mode)
            .with_page_concurrency(self.settings.page_concurrency);

        let outcomes: Vec<(String, Result<MatchSet, SchoolError>)> =
            stream::iter(unique.into_iter().map(|entry: DirectoryEntry| {
                let extractor = &extractor;
                async move {
                    let outcome = self.crawl_school(&entry, extractor, cancel).await;
                    (entry.name, outcome)
                }
            }))
            .buffer_unordered(self.settings.school_concurrency.max(1))
            .collect()
            .await;

        // Partial results are discarded once the query is cancelled
        if cancel.is_cancelled() || outcomes.iter().any(|(_, o)| matches!(o, Err(e) if e.is_cancelled())) {
            info!(%query_id, "Query cancelled");
            return Err(CrawlError::Cancelled);
        }

        let outcomes: HashMap<String, Result<MatchSet, String>> = outcomes
            .into_iter()
            .map(|(name, outcome)| {
                let outcome = outcome.map_err(|e| {
                    warn!(%query_id, school = %name, "School crawl failed: {}", e);
                    e.to_string()
                });
                (name, outcome)
            })
            .collect();

        let schools: Vec<SchoolResult> = query
            .requested_names
            .iter()
            .zip(resolved)
            .map(|(name, entry)| match entry {
                None => SchoolResult::unresolved(name.as_str()),
                Some(entry) => match outcomes.get(&entry.name) {
                    Some(Ok(matches)) => SchoolResult::matched(name.as_str(), entry, matches.clone()),
                    Some(Err(error)) => SchoolResult::failed(name.as_str(), entry, error.as_str()),
                    None => SchoolResult::failed(name.as_str(), entry, "School was not crawled"),
                },
            })
            .collect();

        let result = CrawlResult {
            year: query.year.clone(),
            keyword_category: query.keyword_category,
            recency_mode: query.recency_mode,
            schools,
            bad_queries,
        };

        let total = result.total_matches();
        metrics::counter!(MATCHES).increment(total as u64);
        info!(
            %query_id,
            matches = total,
            failures = result.failures().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query finished"
        );
        Ok(result)
    }

    /// 爬取一个学校：发现页面后扫描关键词
    async fn crawl_school(
        &self,
        entry: &DirectoryEntry,
        extractor: &KeywordExtractor,
        cancel: &CancellationToken,
    ) -> Result<MatchSet, SchoolError> {
        let pages = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled.into()),
            pages = self.navigator.discover(&*self.fetcher, &entry.thread_url) => pages?,
        };
        debug!(school = %entry.name, pages = pages.len(), "Scanning school thread");

        let matches = extractor.scan(&*self.fetcher, &pages, cancel).await?;
        debug!(school = %entry.name, matches = matches.len(), "Finished school thread");
        Ok(matches)
    }
}

#[cfg(test)]
#[path = "crawl_service_test.rs"]
mod tests;
