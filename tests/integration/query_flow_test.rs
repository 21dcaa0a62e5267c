// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{self, spawn_forum, ucla_page, DREW_PATH, UCLA_PATH, YEAR};
use chrono::NaiveDate;
use threadsift::domain::models::query::{KeywordCategory, Query, RecencyMode};
use threadsift::domain::services::result_aggregator::{to_csv, to_json};
use tokio_util::sync::CancellationToken;

fn query(names: &[&str], category: KeywordCategory, recency: RecencyMode) -> Query {
    Query::new(
        YEAR,
        names.iter().map(|n| n.to_string()).collect(),
        category,
        None,
        recency,
    )
    .unwrap()
}

#[tokio::test]
async fn test_oldest_first_stops_at_first_matching_page() {
    let forum = spawn_forum().await;
    let service = helpers::crawl_service(&forum);

    let result = service
        .run_query(
            &query(&["UCLA"], KeywordCategory::Interviews, RecencyMode::OldestFirst),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let matches = result.schools[0].matches.as_ref().unwrap();
    assert_eq!(matches.len(), 1);
    let record = matches.get("II!").unwrap();
    assert_eq!(record.page_number, 4);
    assert_eq!(record.author, "bruin4");
    assert_eq!(record.date, NaiveDate::from_ymd_opt(2021, 9, 3));

    // Page 4 is synthesized from the sparse widget; nothing after it is fetched.
    assert_eq!(forum.hit_count(&ucla_page(4)), 1);
    assert_eq!(forum.hit_count(&ucla_page(5)), 0);
    assert_eq!(forum.hit_count(&ucla_page(7)), 0);
}

#[tokio::test]
async fn test_most_recent_scans_backwards() {
    let forum = spawn_forum().await;
    let service = helpers::crawl_service(&forum);

    let result = service
        .run_query(
            &query(&["ucla"], KeywordCategory::Interviews, RecencyMode::MostRecent),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let matches = result.schools[0].matches.as_ref().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(
        matches.get("Interview invite received!").map(|r| r.page_number),
        Some(7)
    );
    assert_eq!(forum.hit_count(&ucla_page(6)), 0);
    // Only discovery touches page 1 when scanning backwards.
    assert_eq!(forum.hit_count(UCLA_PATH), 1);
}

#[tokio::test]
async fn test_all_mode_collects_every_page() {
    let forum = spawn_forum().await;
    let service = helpers::crawl_service(&forum);

    let result = service
        .run_query(
            &query(&["UCLA"], KeywordCategory::Interviews, RecencyMode::All),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let matches = result.schools[0].matches.as_ref().unwrap();
    let mut pages: Vec<u32> = matches.iter().map(|(_, r)| r.page_number).collect();
    pages.sort_unstable();
    assert_eq!(pages, vec![4, 6, 7]);
    assert_eq!(matches.get("II! for 10/12").map(|r| r.author.as_str()), Some("bruin6"));

    for n in 2..=7 {
        assert_eq!(forum.hit_count(&ucla_page(n)), 1, "page {}", n);
    }

    let csv = to_csv(&result);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "\"UCLA\"");
    assert!(lines[2].starts_with("\"II!\",\"4\""));
    assert!(lines[4].starts_with("\"Interview invite received!\",\"7\""));
}

#[tokio::test]
async fn test_mixed_outcomes_stay_attributable() {
    let forum = spawn_forum().await;
    let service = helpers::crawl_service(&forum);

    let result = service
        .run_query(
            &query(
                &["Albany", "UPenn", "Hogwarts", "Charles Drew"],
                KeywordCategory::Decisions,
                RecencyMode::OldestFirst,
            ),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.bad_queries, vec!["Hogwarts".to_string()]);
    assert_eq!(
        result.resolved_names(),
        vec![
            "Albany Medical College",
            "University of Pennsylvania",
            "Charles R Drew University @ UCLA",
        ]
    );

    let json: serde_json::Value = serde_json::from_str(&to_json(&result).unwrap()).unwrap();
    assert_eq!(json[0]["A."]["author"], "hopeful2");
    assert!(json[0].get("Accepted! So excited, just got the email today.").is_none());
    assert_eq!(json[1], serde_json::json!({}));
    assert!(json[2].is_null());
    assert!(json[3].is_null());

    let failures = result.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "Charles Drew");

    // Initial attempt plus two retries.
    assert_eq!(forum.hit_count(DREW_PATH), 3);
}

#[tokio::test]
async fn test_directory_is_loaded_once_per_year() {
    let forum = spawn_forum().await;
    let service = helpers::crawl_service(&forum);
    let q = query(&["Albany"], KeywordCategory::Decisions, RecencyMode::OldestFirst);

    for _ in 0..3 {
        service.run_query(&q, &CancellationToken::new()).await.unwrap();
    }

    assert_eq!(forum.hit_count(helpers::LISTING_PATH), 1);
}
