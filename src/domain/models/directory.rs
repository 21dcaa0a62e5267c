// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 学校目录条目
///
/// 学校的规范名称及其讨论帖地址，构造后不可变
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// 规范名称
    pub name: String,
    /// 讨论帖URL
    pub thread_url: String,
}

impl DirectoryEntry {
    pub fn new(name: impl Into<String>, thread_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            thread_url: thread_url.into(),
        }
    }
}

/// 某一学年的学校目录
///
/// 条目保持索引帖中的出现顺序，该顺序决定模糊匹配时的优先级
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    year: String,
    entries: Vec<DirectoryEntry>,
}

impl Directory {
    /// 创建目录，名称重复的条目只保留第一个，空名称被忽略
    pub fn new(year: impl Into<String>, entries: impl IntoIterator<Item = DirectoryEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|entry| !entry.name.trim().is_empty())
            .filter(|entry| seen.insert(entry.name.clone()))
            .collect();

        Self {
            year: year.into(),
            entries,
        }
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// 按目录顺序排列的名称
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn get(&self, index: usize) -> Option<&DirectoryEntry> {
        self.entries.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
