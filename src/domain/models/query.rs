// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 补充申请（secondary）
pub const SECONDARY_TRIGGERS: &[&str] = &["secondary received", "secondary"];
/// 面试邀请
pub const INTERVIEW_TRIGGERS: &[&str] = &["ii ", "ii!", "interview invite"];
/// 录取结果
pub const DECISION_TRIGGERS: &[&str] = &[
    "a.",
    "a!",
    "w.",
    "w!",
    "r.",
    "accepted!",
    "waitlisted",
    "rejected",
];
/// 奖助学金
pub const FINANCIAL_TRIGGERS: &[&str] = &["aid", "finaid", "fin aid", "financial aid"];

/// 查询构造错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unrecognized keyword category: {0}")]
    UnrecognizedKeywordCategory(String),

    #[error("Custom keyword is required for the 'other' category")]
    MissingCustomKeyword,

    #[error("At least one school name is required")]
    NoSchoolsRequested,

    #[error("Too many schools requested (max {max})")]
    TooManySchools { max: usize },
}

/// 关键词类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    Secondaries,
    Interviews,
    Decisions,
    Financial,
    /// 调用方自定义的触发词
    Other,
}

impl KeywordCategory {
    /// 内置触发词，`Other` 没有内置触发词
    pub fn builtin_triggers(&self) -> &'static [&'static str] {
        match self {
            KeywordCategory::Secondaries => SECONDARY_TRIGGERS,
            KeywordCategory::Interviews => INTERVIEW_TRIGGERS,
            KeywordCategory::Decisions => DECISION_TRIGGERS,
            KeywordCategory::Financial => FINANCIAL_TRIGGERS,
            KeywordCategory::Other => &[],
        }
    }
}

impl fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeywordCategory::Secondaries => write!(f, "secondaries"),
            KeywordCategory::Interviews => write!(f, "interviews"),
            KeywordCategory::Decisions => write!(f, "decisions"),
            KeywordCategory::Financial => write!(f, "financial"),
            KeywordCategory::Other => write!(f, "other"),
        }
    }
}

/// 从表单标签解析关键词类别
///
/// 同时接受网页表单使用的旧标签（"interview invites"、"financial aid"、"something else"）
impl FromStr for KeywordCategory {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "secondaries" => Ok(KeywordCategory::Secondaries),
            "interviews" | "interview invites" => Ok(KeywordCategory::Interviews),
            "decisions" => Ok(KeywordCategory::Decisions),
            "financial" | "financial aid" => Ok(KeywordCategory::Financial),
            "other" | "something else" => Ok(KeywordCategory::Other),
            _ => Err(QueryError::UnrecognizedKeywordCategory(s.to_string())),
        }
    }
}

/// 时间顺序模式
///
/// 控制扫描方向，以及命中后是否停止
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyMode {
    /// 扫描所有页面，收集全部命中
    All,
    /// 从最后一页往前扫描，第一页命中后停止
    MostRecent,
    /// 从第一页往后扫描，第一页命中后停止
    #[default]
    OldestFirst,
}

impl RecencyMode {
    /// 解析表单值，无法识别或缺失时使用默认值
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|l| l.trim().to_lowercase()).as_deref() {
            Some("all") => RecencyMode::All,
            Some("most recent") | Some("most_recent") => RecencyMode::MostRecent,
            _ => RecencyMode::OldestFirst,
        }
    }
}

impl fmt::Display for RecencyMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecencyMode::All => write!(f, "all"),
            RecencyMode::MostRecent => write!(f, "most recent"),
            RecencyMode::OldestFirst => write!(f, "oldest first"),
        }
    }
}

/// 有序的小写触发词集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordSet {
    triggers: Vec<String>,
}

impl KeywordSet {
    /// 根据类别构造触发词集合
    ///
    /// 内置类别使用固定常量，`Other` 使用调用方提供的非空触发词
    pub fn for_category(
        category: KeywordCategory,
        custom_keywords: Option<&[String]>,
    ) -> Result<Self, QueryError> {
        let triggers: Vec<String> = match category {
            KeywordCategory::Other => custom_keywords
                .unwrap_or_default()
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            builtin => builtin
                .builtin_triggers()
                .iter()
                .map(|t| t.to_string())
                .collect(),
        };

        if triggers.is_empty() {
            return Err(QueryError::MissingCustomKeyword);
        }
        Ok(Self { triggers })
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.triggers.iter().map(String::as_str)
    }
}

/// 一次爬取查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// 学年标签，例如 "2021-2022"
    pub year: String,
    /// 用户输入的学校名称，保持输入顺序
    pub requested_names: Vec<String>,
    pub keyword_category: KeywordCategory,
    pub custom_keywords: Option<Vec<String>>,
    pub keywords: KeywordSet,
    pub recency_mode: RecencyMode,
}

impl Query {
    /// 创建查询
    ///
    /// 空白的学校名称会被丢弃；触发词集合在此处构造，类别无效时立即失败
    pub fn new(
        year: impl Into<String>,
        requested_names: Vec<String>,
        keyword_category: KeywordCategory,
        custom_keywords: Option<Vec<String>>,
        recency_mode: RecencyMode,
    ) -> Result<Self, QueryError> {
        let requested_names: Vec<String> = requested_names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if requested_names.is_empty() {
            return Err(QueryError::NoSchoolsRequested);
        }

        let keywords = KeywordSet::for_category(keyword_category, custom_keywords.as_deref())?;

        Ok(Self {
            year: year.into(),
            requested_names,
            keyword_category,
            custom_keywords,
            keywords,
            recency_mode,
        })
    }

    /// 从原始表单值创建查询
    pub fn from_labels(
        year: impl Into<String>,
        requested_names: Vec<String>,
        keyword_label: &str,
        custom_keywords: Option<Vec<String>>,
        recency_label: Option<&str>,
    ) -> Result<Self, QueryError> {
        let category = keyword_label.parse::<KeywordCategory>()?;
        Self::new(
            year,
            requested_names,
            category,
            custom_keywords,
            RecencyMode::from_label(recency_label),
        )
    }
}
