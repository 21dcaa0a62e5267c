// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::Extension,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    application::dto::{query_request::QueryRequestDto, query_response::QueryResponseDto},
    domain::services::{crawl_service::CrawlService, result_aggregator::ExportFormat},
    engines::traits::PageFetcher,
    presentation::errors::AppError,
};

/// 处理器共享的爬取服务
pub type SharedCrawlService = Arc<CrawlService<dyn PageFetcher>>;

/// 执行查询
///
/// 每个请求使用服务关闭令牌的子令牌；客户端断开时处理器被丢弃，子令牌随之取消
pub async fn run_query(
    Extension(service): Extension<SharedCrawlService>,
    Extension(shutdown): Extension<CancellationToken>,
    Json(request): Json<QueryRequestDto>,
) -> Result<Response, AppError> {
    request.validate()?;
    let query = request.to_query()?;
    let format = request.export_format();

    let query_id = Uuid::new_v4();
    let cancel = shutdown.child_token();
    let _guard = cancel.clone().drop_guard();

    let result = service.run_query_with_id(&query, query_id, &cancel).await?;
    info!(%query_id, format = ?format, "Returning query results");

    let response = match format {
        ExportFormat::Json => Json(QueryResponseDto::new(query_id, &result)).into_response(),
        ExportFormat::Csv => {
            let body = format.aggregate(&result)?;
            let headers = [
                (CONTENT_TYPE, format.content_type().to_string()),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", request.attachment_name()),
                ),
            ];
            (headers, body).into_response()
        }
    };
    Ok(response)
}

/// 已配置的学年
pub async fn list_years(Extension(service): Extension<SharedCrawlService>) -> Json<Value> {
    Json(json!({ "years": service.directories().years() }))
}
