// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::models::query::QueryError;
use crate::domain::services::crawl_service::CrawlError;
use crate::infrastructure::directory_cache::DirectoryError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    /// 错误对应的 HTTP 状态码
    pub fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<CrawlError>() {
            return match err {
                CrawlError::Query(_) => StatusCode::BAD_REQUEST,
                CrawlError::Directory(DirectoryError::UnknownYear(_)) => StatusCode::BAD_REQUEST,
                CrawlError::Directory(_) => StatusCode::BAD_GATEWAY,
                CrawlError::NoSchoolsResolved { .. } => StatusCode::NOT_FOUND,
                CrawlError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            };
        }
        if self.0.downcast_ref::<QueryError>().is_some()
            || self.0.downcast_ref::<validator::ValidationErrors>().is_some()
        {
            return StatusCode::BAD_REQUEST;
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = self.0.to_string();

        let body = match self.0.downcast_ref::<CrawlError>() {
            Some(CrawlError::NoSchoolsResolved { bad_queries }) => {
                json!({ "error": error_message, "bad_queries": bad_queries })
            }
            _ => json!({ "error": error_message }),
        };
        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
