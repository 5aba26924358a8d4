//! Listing, metadata, download and delete tests.

use actix_web::http::{StatusCode, header};
use actix_web::test;
use log_vault::db::{InsertOutcome, NewLogFile};

use super::helpers::*;

#[actix_rt::test]
async fn test_list_is_paginated_newest_first() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let a = upload_ok(&app, "a.log", "a\n").await;
    let b = upload_ok(&app, "b.log", "b\n").await;
    let c = upload_ok(&app, "c.log", "c\n").await;

    let (status, page1) = get_json(&app, "/api/logs?page=1&per_page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page1["total"], 3);
    assert_eq!(page1["pages"], 2);
    assert_eq!(page1["current_page"], 1);
    assert_eq!(page1["per_page"], 2);

    let ids: Vec<i64> = page1["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![c, b]);

    let (_, page2) = get_json(&app, "/api/logs?page=2&per_page=2").await;
    let files = page2["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["id"].as_i64(), Some(a));
    assert_eq!(files[0]["filename"], "a.log");
    assert_eq!(files[0]["file_size"], 2);
    assert_eq!(files[0]["client_info"], "log-vault-tests/1.0");
    assert!(files[0]["upload_time"].is_string());
}

#[actix_rt::test]
async fn test_list_search_filters_by_original_name() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    upload_ok(&app, "nginx-access.log", "1\n").await;
    upload_ok(&app, "nginx-error.log", "2\n").await;
    upload_ok(&app, "app.txt", "3\n").await;

    let (_, body) = get_json(&app, "/api/logs?search=nginx").await;
    assert_eq!(body["total"], 2);

    let (_, body) = get_json(&app, "/api/logs?search=%20%20").await;
    assert_eq!(body["total"], 3);
}

#[actix_rt::test]
async fn test_list_clamps_and_falls_back() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = get_json(&app, "/api/logs?per_page=500&page=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["per_page"], 100);
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["total"], 0);
    assert_eq!(body["pages"], 0);

    let (_, body) = get_json(&app, "/api/logs?per_page=0").await;
    assert_eq!(body["per_page"], 1);

    let (_, body) = get_json(&app, "/api/logs?per_page=ten").await;
    assert_eq!(body["per_page"], 20);
}

#[actix_rt::test]
async fn test_page_past_the_end_is_empty() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    upload_ok(&app, "only.log", "x\n").await;

    let (status, body) = get_json(&app, "/api/logs?page=9").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["files"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 1);

    let (status, body) = get_json(&app, "/api/logs?page=9223372036854775807").await;
    assert_eq!(status, StatusCode::OK, "{:?}", body);
    assert!(body["files"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 1);
    assert_eq!(body["current_page"].as_u64(), Some(i64::MAX as u64));
}

#[actix_rt::test]
async fn test_get_log_metadata() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let id = upload_ok(&app, "meta.txt", "hello\n").await;

    let (status, body) = get_json(&app, &format!("/api/logs/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64(), Some(id));
    assert_eq!(body["filename"], "meta.txt");
    assert_eq!(body["file_size"], 6);

    let (status, body) = get_json(&app, "/api/logs/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "File not found");

    let (status, body) = get_json(&app, "/api/logs/not-a-number").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[actix_rt::test]
async fn test_download_returns_attachment() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let id = upload_ok(&app, "report.log", "first\nsecond\n").await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/logs/{}/download", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"), "{}", content_type);

    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"), "{}", disposition);
    assert!(disposition.contains("report.log"), "{}", disposition);

    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"first\nsecond\n");
}

#[actix_rt::test]
async fn test_download_encodes_non_ascii_filename() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let name = "20250101_000000_log.log";
    let path = ctx.storage_dir().join(name);
    std::fs::write(&path, "你好\n").unwrap();

    let outcome = ctx
        .pool
        .insert_log_file(NewLogFile {
            filename: name.to_string(),
            original_filename: "日志.log".to_string(),
            file_path: path.to_string_lossy().into_owned(),
            file_size: 7,
            file_hash: "b".repeat(64),
            client_info: String::new(),
        })
        .await
        .unwrap();
    let InsertOutcome::Created(record) = outcome else {
        panic!("expected a new record");
    };

    let req = test::TestRequest::get()
        .uri(&format!("/api/logs/{}/download", record.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let disposition = String::from_utf8_lossy(
        resp.headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .as_bytes(),
    )
    .into_owned();
    assert!(disposition.starts_with("attachment"), "{}", disposition);
    assert!(
        disposition.contains("filename*=UTF-8''%E6%97%A5%E5%BF%97.log"),
        "{}",
        disposition
    );
}

#[actix_rt::test]
async fn test_missing_blob_is_not_found() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let id = upload_ok(&app, "vanished.log", "soon gone\n").await;
    std::fs::remove_file(blob_path(&ctx, id).await).unwrap();

    let (status, body) = get_json(&app, &format!("/api/logs/{}/download", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "File not found on disk");

    // Metadata is still there
    let (status, _) = get_json(&app, &format!("/api/logs/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_delete_hides_record_and_removes_blob() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let id = upload_ok(&app, "doomed.log", "bye\n").await;
    let path = blob_path(&ctx, id).await;

    let (status, body) = delete_log(&app, id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "File deleted successfully");
    assert!(!path.exists());

    for uri in [
        format!("/api/logs/{}", id),
        format!("/api/logs/{}/content", id),
        format!("/api/logs/{}/download", id),
    ] {
        let (status, _) = get_json(&app, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
    }

    let (_, list) = get_json(&app, "/api/logs").await;
    assert_eq!(list["total"], 0);

    // Second delete sees nothing active
    let (status, body) = delete_log(&app, id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "File not found");

    // Soft delete keeps the row, stamped as reclaimed
    let pending = ctx.pool.get_unreclaimed_deleted(0, 10).await.unwrap();
    assert!(pending.is_empty());
}

#[actix_rt::test]
async fn test_delete_succeeds_when_blob_already_missing() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let id = upload_ok(&app, "gone.log", "x\n").await;
    std::fs::remove_file(blob_path(&ctx, id).await).unwrap();

    let (status, _) = delete_log(&app, id).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_unknown_routes_answer_json_404() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    for uri in ["/api/nope", "/definitely/not/here"] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["error"], "Not found");
    }
}

#[actix_rt::test]
async fn test_health_and_ready() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = get_json(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get_json(&app, "/api/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

#[actix_rt::test]
async fn test_index_serves_ui_shell() {
    let ctx = setup().await;
    std::fs::create_dir_all(ctx.dir.path().join("static")).unwrap();
    std::fs::write(
        ctx.config.static_dir.join("index.html"),
        "<html><body>Log Vault</body></html>",
    )
    .unwrap();
    let app = create_test_app(&ctx).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Log Vault"));
}

#[actix_rt::test]
async fn test_openapi_document_is_served() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = get_json(&app, "/api/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/upload"].is_object());
}
