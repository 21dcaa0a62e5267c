// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// 比较前从名称中去掉的噪声片段
pub const NOISE_TOKENS: [&str; 5] = ["School of Medicine", "-", "@", "Medical College", "."];

static NOISE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternation = NOISE_TOKENS
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){}", alternation)).expect("noise pattern is valid")
});

static NON_LETTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\W_0-9]+").expect("non-letter pattern is valid"));

const UNIVERSITY_OF: &str = "university of";

/// 与 "Charles R Drew University @ UCLA" 区分的查询
const UCLA_QUERY: &str = "ucla";
const DREW_MARKER: &str = "drew";

/// 最短的有效分词长度（更短的词如 "of" 被忽略）
const MIN_TOKEN_LEN: usize = 3;

/// 接受候选名称的匹配规则，按优先级排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// 任一方是另一方的子串
    Substring,
    /// 查询是候选名称大写字母缩写的子串（UCLA、UCSF）
    Abbreviation,
    /// "University of X" 的 "UX" 别名（UChicago、UPenn）
    UniversityAlias,
    /// 查询中的某个词是候选名称的子串
    Token,
}

/// 去掉噪声片段并合并空白
pub fn normalize(name: &str) -> String {
    NOISE_PATTERN
        .replace_all(name, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 由规范化名称中的大写字母组成的小写缩写
pub fn abbreviation(normalized: &str) -> String {
    NON_LETTERS
        .replace_all(normalized, "")
        .chars()
        .filter(|c| c.is_uppercase())
        .flat_map(char::to_lowercase)
        .collect()
}

/// "University of Chicago" -> "uchicago"
pub fn university_alias(normalized: &str) -> Option<String> {
    let lower = normalized.to_lowercase();
    let start = lower.find(UNIVERSITY_OF)? + UNIVERSITY_OF.len();
    Some(format!("u{}", lower[start..].trim()))
}

/// 预处理后的候选名称
#[derive(Debug, Clone)]
struct Candidate {
    original: String,
    lower: String,
    abbreviation: String,
    alias: Option<String>,
}

impl Candidate {
    fn new(original: &str) -> Self {
        let normalized = normalize(original);
        Self {
            original: original.to_string(),
            lower: normalized.to_lowercase(),
            abbreviation: abbreviation(&normalized),
            alias: university_alias(&normalized),
        }
    }

    /// 依次应用各条规则，返回第一个接受该候选的规则
    fn accepts(&self, query: &str) -> Option<MatchRule> {
        if self.lower.is_empty() {
            return None;
        }
        if query == UCLA_QUERY && self.lower.contains(DREW_MARKER) {
            return None;
        }
        if self.lower.contains(query) || query.contains(&self.lower) {
            return Some(MatchRule::Substring);
        }
        if !self.abbreviation.is_empty() && self.abbreviation.contains(query) {
            return Some(MatchRule::Abbreviation);
        }
        if let Some(alias) = &self.alias {
            if alias.contains(query) || query.contains(alias.as_str()) {
                return Some(MatchRule::UniversityAlias);
            }
        }
        let token_hit = query
            .split(' ')
            .filter(|token| token.chars().count() >= MIN_TOKEN_LEN)
            .any(|token| self.lower.contains(token));
        if token_hit {
            return Some(MatchRule::Token);
        }
        None
    }
}

/// 单个名称的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    /// 候选名称在目录中的位置
    pub index: usize,
    /// 目录中的原始名称
    pub name: String,
    pub rule: MatchRule,
}

/// 批量解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// 匹配到的规范名称，保持请求顺序且去重
    pub matched: Vec<String>,
    /// 无法匹配的原始查询
    pub unmatched: Vec<String>,
}

/// 学校名称解析器
///
/// 候选名称按目录顺序保存，每个查询依次尝试每个候选，第一个被接受的候选胜出。
/// 解析器构造后不可变，解析过程没有副作用
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    candidates: Vec<Candidate>,
}

impl DirectoryResolver {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            candidates: names.into_iter().map(Candidate::new).collect(),
        }
    }

    /// 解析单个查询
    pub fn resolve_one(&self, query: &str) -> Option<ResolvedName> {
        let query = normalize(query).to_lowercase();
        if query.is_empty() {
            return None;
        }

        self.candidates
            .iter()
            .enumerate()
            .find_map(|(index, candidate)| {
                candidate.accepts(&query).map(|rule| ResolvedName {
                    index,
                    name: candidate.original.clone(),
                    rule,
                })
            })
            .inspect(|resolved| {
                debug!(
                    query = %query,
                    name = %resolved.name,
                    rule = ?resolved.rule,
                    "Resolved school name"
                );
            })
    }

    /// 解析一组查询
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> Resolution {
        let mut resolution = Resolution::default();
        for raw in requested {
            let raw = raw.as_ref();
            match self.resolve_one(raw) {
                Some(resolved) => {
                    if !resolution.matched.contains(&resolved.name) {
                        resolution.matched.push(resolved.name);
                    }
                }
                None => resolution.unmatched.push(raw.to_string()),
            }
        }
        resolution
    }
}

/// 在给定目录名称上解析查询
pub fn resolve<S: AsRef<str>>(directory: &[&str], requested: &[S]) -> Resolution {
    DirectoryResolver::new(directory.iter().copied()).resolve(requested)
}

#[cfg(test)]
#[path = "directory_resolver_test.rs"]
mod tests;
