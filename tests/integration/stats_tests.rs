//! Statistics endpoint tests.

use actix_web::http::StatusCode;
use chrono::Utc;

use super::helpers::*;

#[actix_rt::test]
async fn test_stats_on_empty_store() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = get_json(&app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_files"], 0);
    assert_eq!(body["total_size"], 0);
    assert_eq!(body["total_size_formatted"], "0B");
    assert!(body["daily_stats"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_stats_count_active_files_only() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    upload_ok(&app, "one.log", "12345\n").await;
    let doomed = upload_ok(&app, "two.log", "abc\n").await;
    upload_ok(&app, "three.txt", &"z".repeat(1535)).await;

    let (_, body) = get_json(&app, "/api/stats").await;
    assert_eq!(body["total_files"], 3);
    assert_eq!(body["total_size"], 6 + 4 + 1535);
    assert_eq!(body["total_size_formatted"], "1.51 KB");

    let daily = body["daily_stats"].as_array().unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0]["date"], Utc::now().format("%Y-%m-%d").to_string());
    assert_eq!(daily[0]["count"], 3);

    delete_log(&app, doomed).await;

    let (_, body) = get_json(&app, "/api/stats").await;
    assert_eq!(body["total_files"], 2);
    assert_eq!(body["total_size"], 6 + 1535);
    assert_eq!(body["daily_stats"][0]["count"], 2);
}
