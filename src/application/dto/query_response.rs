// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::match_set::{CrawlResult, MatchSet};
use crate::domain::services::result_aggregator::json_results;
use serde::Serialize;
use uuid::Uuid;

/// 单个学校的失败信息
#[derive(Debug, Clone, Serialize)]
pub struct SchoolFailureDto {
    pub school: String,
    pub error: String,
}

/// JSON 查询响应
///
/// `results` 与请求的学校一一对应，未解析或失败的学校为 `null`
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponseDto {
    pub query_id: Uuid,
    pub resolved_schools: Vec<String>,
    pub results: Vec<Option<MatchSet>>,
    pub bad_queries: Vec<String>,
    pub failures: Vec<SchoolFailureDto>,
}

impl QueryResponseDto {
    pub fn new(query_id: Uuid, result: &CrawlResult) -> Self {
        Self {
            query_id,
            resolved_schools: result
                .resolved_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            results: json_results(result).into_iter().map(|m| m.cloned()).collect(),
            bad_queries: result.bad_queries.clone(),
            failures: result
                .failures()
                .into_iter()
                .map(|(school, error)| SchoolFailureDto {
                    school: school.to_string(),
                    error: error.to_string(),
                })
                .collect(),
        }
    }
}
