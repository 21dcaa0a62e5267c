// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::query::{Query, QueryError, RecencyMode};
use crate::domain::services::result_aggregator::ExportFormat;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 查询请求
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct QueryRequestDto {
    /// 学年标签，如 "2021-2022"
    #[validate(length(min = 1, max = 32))]
    pub year: String,
    /// 自由输入的学校名称
    #[validate(length(min = 1, max = 10))]
    pub schools: Vec<String>,
    /// 关键词类别标签
    #[validate(length(min = 1, max = 64))]
    pub keyword: String,
    /// `other` 类别的自定义关键词
    pub custom_keywords: Option<Vec<String>>,
    /// "all"、"most recent"，其他值按最早优先处理
    pub recency: Option<String>,
    /// "json"（默认）或 "csv"
    pub format: Option<String>,
}

impl QueryRequestDto {
    pub fn export_format(&self) -> ExportFormat {
        ExportFormat::from_label(self.format.as_deref())
    }

    /// 转换为领域查询
    pub fn to_query(&self) -> Result<Query, QueryError> {
        Query::from_labels(
            self.year.trim(),
            self.schools.clone(),
            &self.keyword,
            self.custom_keywords.clone(),
            self.recency.as_deref(),
        )
    }

    /// 下载文件名，由学年、学校、关键词和时间顺序组成
    pub fn attachment_name(&self) -> String {
        let recency = RecencyMode::from_label(self.recency.as_deref());
        let stem = format!(
            "{}_{}_{}_{}",
            self.year.trim(),
            self.schools
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("_"),
            self.keyword.trim(),
            recency
        );
        let stem: String = stem
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}.{}", stem, self.export_format().extension())
    }
}
