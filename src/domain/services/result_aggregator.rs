// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::match_set::{CrawlResult, MatchRecord, MatchSet, SchoolResult};
use crate::domain::models::query::RecencyMode;
use crate::engines::parsed_page::UNKNOWN_LABEL;
use serde::{Deserialize, Serialize};

/// CSV 表头
pub const CSV_HEADER: [&str; 4] = ["Message", "SDN Page Number", "Author Username", "Date Posted"];

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    /// 未识别的格式按 JSON 处理
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|l| l.trim().to_lowercase()).as_deref() {
            Some("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// 按当前格式导出结果
    pub fn aggregate(&self, result: &CrawlResult) -> Result<String, serde_json::Error> {
        match self {
            ExportFormat::Json => to_json(result),
            ExportFormat::Csv => Ok(to_csv(result)),
        }
    }
}

/// 与请求顺序对齐的 JSON 值，未解析或抓取失败的学校为 `null`
pub fn json_results(result: &CrawlResult) -> Vec<Option<&MatchSet>> {
    result.schools.iter().map(|school| school.matches.as_ref()).collect()
}

/// 导出 JSON 数组
pub fn to_json(result: &CrawlResult) -> Result<String, serde_json::Error> {
    serde_json::to_string(&json_results(result))
}

/// 导出 CSV 文本
///
/// 每个请求的学校一个区块：大写的学校名称行、表头行、按日期排序的数据行、空行。
/// 无法解析的学校名称行为空行且没有数据行
pub fn to_csv(result: &CrawlResult) -> String {
    let mut out = String::new();
    for school in &result.schools {
        write_block(&mut out, school, result.recency_mode);
    }
    out
}

fn write_block(out: &mut String, school: &SchoolResult, recency_mode: RecencyMode) {
    if school.is_resolved() {
        write_row(out, &[school.requested_name.to_uppercase().as_str()]);
    } else {
        out.push('\n');
    }
    write_row(out, &CSV_HEADER);

    if let Some(matches) = &school.matches {
        for (text, record) in sorted_rows(matches, recency_mode) {
            let page = record.page_number.to_string();
            let date = record
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
            write_row(out, &[text.as_str(), page.as_str(), record.author.as_str(), date.as_str()]);
        }
    }
    out.push('\n');
}

/// 按日期排序；稳定排序保证同一日期的行保持消息文本顺序
fn sorted_rows(matches: &MatchSet, recency_mode: RecencyMode) -> Vec<(&String, &MatchRecord)> {
    let mut rows: Vec<_> = matches.iter().collect();
    rows.sort_by(|(_, a), (_, b)| match recency_mode {
        RecencyMode::MostRecent => b.date.cmp(&a.date),
        RecencyMode::All | RecencyMode::OldestFirst => a.date.cmp(&b.date),
    });
    rows
}

fn write_row(out: &mut String, fields: &[&str]) {
    let quoted: Vec<String> = fields.iter().map(|field| quote(field)).collect();
    out.push_str(&quoted.join(","));
    out.push('\n');
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
