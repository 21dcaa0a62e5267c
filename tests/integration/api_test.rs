// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{self, spawn_forum, FakeForum};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Extension, Router,
};
use serde_json::{json, Value};
use threadsift::presentation::routes;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

fn app(forum: &FakeForum, shutdown: CancellationToken) -> Router {
    routes::routes()
        .layer(Extension(helpers::crawl_service(forum)))
        .layer(Extension(shutdown))
}

fn post_query(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_and_years() {
    let forum = spawn_forum().await;
    let app = app(&forum, CancellationToken::new());

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");

    let response = app
        .oneshot(Request::get("/v1/years").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body, json!({ "years": [helpers::YEAR] }));
}

#[tokio::test]
async fn test_json_query() {
    let forum = spawn_forum().await;

    let response = app(&forum, CancellationToken::new())
        .oneshot(post_query(json!({
            "year": helpers::YEAR,
            "schools": ["Albany", "Hogwarts"],
            "keyword": "decisions",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(body["query_id"].is_string());
    assert_eq!(body["resolved_schools"], json!(["Albany Medical College"]));
    assert_eq!(body["bad_queries"], json!(["Hogwarts"]));
    assert_eq!(body["results"][0]["A."]["page_number"], 1);
    assert_eq!(body["results"][0]["A."]["date"], "2022-01-05");
    assert!(body["results"][1].is_null());
    assert_eq!(body["failures"], json!([]));
}

#[tokio::test]
async fn test_csv_query() {
    let forum = spawn_forum().await;

    let response = app(&forum, CancellationToken::new())
        .oneshot(post_query(json!({
            "year": helpers::YEAR,
            "schools": ["UCLA"],
            "keyword": "interview invites",
            "recency": "most recent",
            "format": "csv",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"2021-2022_UCLA_interview_invites_most_recent.csv\""
    );

    let csv = body_string(response).await;
    assert_eq!(
        csv,
        concat!(
            "\"UCLA\"\n",
            "\"Message\",\"SDN Page Number\",\"Author Username\",\"Date Posted\"\n",
            "\"Interview invite received!\",\"7\",\"bruin7\",\"2021-11-02\"\n",
            "\n",
        )
    );
}

#[tokio::test]
async fn test_rejected_queries() {
    let forum = spawn_forum().await;
    let app = app(&forum, CancellationToken::new());

    let cases = [
        (
            json!({ "year": helpers::YEAR, "schools": ["UCLA"], "keyword": "gossip" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "year": helpers::YEAR, "schools": ["UCLA"], "keyword": "other" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "year": helpers::YEAR, "schools": [], "keyword": "decisions" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "year": "1999-2000", "schools": ["UCLA"], "keyword": "decisions" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "year": helpers::YEAR, "schools": ["Hogwarts"], "keyword": "decisions" }),
            StatusCode::NOT_FOUND,
        ),
    ];

    for (body, expected) in cases {
        let response = app.clone().oneshot(post_query(body.clone())).await.unwrap();
        assert_eq!(response.status(), expected, "{}", body);
    }

    // Nothing was crawled for any rejected query.
    assert!(forum
        .hits()
        .iter()
        .all(|path| path == helpers::LISTING_PATH));
}

#[tokio::test]
async fn test_shutdown_cancels_queries() {
    let forum = spawn_forum().await;
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let response = app(&forum, shutdown)
        .oneshot(post_query(json!({
            "year": helpers::YEAR,
            "schools": ["UCLA"],
            "keyword": "interviews",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(forum.hits().is_empty());
}
