// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::directory::DirectoryEntry;
use crate::domain::models::message::Message;
use crate::domain::models::query::{KeywordCategory, RecencyMode};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// 命中消息的元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    /// 页码（从1开始）
    pub page_number: u32,
    pub author: String,
    pub date: Option<NaiveDate>,
}

/// 单个学校的命中集合
///
/// 以消息正文为键，同一正文再次出现时覆盖之前的记录。
/// 使用有序映射，保证导出结果可重复
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchSet(BTreeMap<String, MatchRecord>);

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录命中，返回被覆盖的旧记录
    pub fn record(&mut self, text: impl Into<String>, message: &Message) -> Option<MatchRecord> {
        self.0.insert(
            text.into(),
            MatchRecord {
                page_number: message.page_number,
                author: message.author.clone(),
                date: message.date,
            },
        )
    }

    pub fn get(&self, text: &str) -> Option<&MatchRecord> {
        self.0.get(text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MatchRecord)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 单个请求学校的结果
///
/// - `resolved == None`：名称无法解析，`matches` 也为 `None`
/// - `resolved == Some` 且 `error == Some`：抓取失败，`matches` 为 `None`
/// - 其余情况 `matches` 一定存在，可能为空集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolResult {
    pub requested_name: String,
    pub resolved: Option<DirectoryEntry>,
    pub matches: Option<MatchSet>,
    pub error: Option<String>,
}

impl SchoolResult {
    pub fn unresolved(requested_name: impl Into<String>) -> Self {
        Self {
            requested_name: requested_name.into(),
            resolved: None,
            matches: None,
            error: None,
        }
    }

    pub fn matched(
        requested_name: impl Into<String>,
        entry: DirectoryEntry,
        matches: MatchSet,
    ) -> Self {
        Self {
            requested_name: requested_name.into(),
            resolved: Some(entry),
            matches: Some(matches),
            error: None,
        }
    }

    pub fn failed(
        requested_name: impl Into<String>,
        entry: DirectoryEntry,
        error: impl Into<String>,
    ) -> Self {
        Self {
            requested_name: requested_name.into(),
            resolved: Some(entry),
            matches: None,
            error: Some(error.into()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}

/// 一次爬取的完整结果
///
/// `schools` 与请求的学校名称一一对应、顺序一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlResult {
    pub year: String,
    pub keyword_category: KeywordCategory,
    pub recency_mode: RecencyMode,
    pub schools: Vec<SchoolResult>,
    /// 无法解析的原始名称
    pub bad_queries: Vec<String>,
}

impl CrawlResult {
    /// 已解析学校的规范名称（去重，保持请求顺序）
    pub fn resolved_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in self.schools.iter().filter_map(|s| s.resolved.as_ref()) {
            if !names.contains(&entry.name.as_str()) {
                names.push(&entry.name);
            }
        }
        names
    }

    /// 抓取失败的学校及其错误
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.schools
            .iter()
            .filter_map(|s| {
                s.error
                    .as_deref()
                    .map(|err| (s.requested_name.as_str(), err))
            })
            .collect()
    }

    /// 所有学校的命中总数
    pub fn total_matches(&self) -> usize {
        self.schools
            .iter()
            .filter_map(|s| s.matches.as_ref())
            .map(MatchSet::len)
            .sum()
    }
}
