// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ForumSettings;
use crate::domain::models::directory::{Directory, DirectoryEntry};
use crate::engines::parsed_page::ParsedPage;
use crate::engines::traits::{EngineError, PageFetcher};
use crate::utils::url_utils::absolutize;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

static YEAR_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d{4}\s*-\s*\d{4}\s*").expect("year prefix pattern is valid"));

/// 目录加载错误
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Unknown year: {0}")]
    UnknownYear(String),

    #[error("Failed to load directory for {year}: {source}")]
    Load {
        year: String,
        #[source]
        source: EngineError,
    },

    #[error("Directory for {0} has no schools")]
    Empty(String),
}

/// 去掉链接文字中的 "YYYY-YYYY " 学年前缀
pub fn strip_year_prefix(text: &str) -> &str {
    match YEAR_PREFIX.find(text) {
        Some(prefix) => text[prefix.end()..].trim(),
        None => text.trim(),
    }
}

/// 从索引帖构造目录
pub fn build_directory(year: &str, listing: &ParsedPage) -> Directory {
    Directory::new(
        year,
        listing
            .directory_links()
            .iter()
            .map(|link| DirectoryEntry::new(strip_year_prefix(&link.text), link.href.clone())),
    )
}

/// 学年目录缓存
///
/// 每个学年的目录在进程内只加载一次
pub struct DirectoryCache {
    listing_urls: HashMap<String, String>,
    directories: DashMap<String, Arc<Directory>>,
}

impl DirectoryCache {
    pub fn new(listing_urls: HashMap<String, String>) -> Self {
        Self {
            listing_urls,
            directories: DashMap::new(),
        }
    }

    /// 相对地址按 `base_url` 补全
    pub fn from_settings(settings: &ForumSettings) -> Self {
        Self::new(
            settings
                .directory_urls
                .iter()
                .map(|(year, url)| {
                    let url = absolutize(&settings.base_url, url).unwrap_or_else(|| url.clone());
                    (year.clone(), url)
                })
                .collect(),
        )
    }

    /// 已配置的学年，按标签排序
    pub fn years(&self) -> Vec<&str> {
        let mut years: Vec<&str> = self.listing_urls.keys().map(String::as_str).collect();
        years.sort_unstable();
        years
    }

    /// 学年对应的索引帖地址
    pub fn listing_url(&self, year: &str) -> Result<&str, DirectoryError> {
        self.listing_urls
            .get(year)
            .map(String::as_str)
            .ok_or_else(|| DirectoryError::UnknownYear(year.to_string()))
    }

    pub fn cached(&self, year: &str) -> Option<Arc<Directory>> {
        self.directories.get(year).map(|entry| Arc::clone(entry.value()))
    }

    /// 获取学年目录，未缓存时抓取索引帖
    ///
    /// # 返回值
    ///
    /// * `Ok(Arc<Directory>)` - 学年目录
    /// * `Err(DirectoryError)` - 学年未知、索引帖抓取失败或目录为空
    pub async fn get_or_load<F: PageFetcher + ?Sized>(
        &self,
        fetcher: &F,
        year: &str,
    ) -> Result<Arc<Directory>, DirectoryError> {
        let listing_url = self.listing_url(year)?;
        if let Some(directory) = self.cached(year) {
            debug!(year, "Directory cache hit");
            return Ok(directory);
        }

        let listing = fetcher
            .fetch_and_parse(listing_url)
            .await
            .map_err(|source| DirectoryError::Load {
                year: year.to_string(),
                source,
            })?;

        let directory = build_directory(year, &listing);
        if directory.is_empty() {
            return Err(DirectoryError::Empty(year.to_string()));
        }
        info!(year, schools = directory.len(), "Loaded school directory");

        // A concurrent load may have finished first; keep whichever landed.
        let directory = self
            .directories
            .entry(year.to_string())
            .or_insert_with(|| Arc::new(directory))
            .clone();
        Ok(directory)
    }
}
