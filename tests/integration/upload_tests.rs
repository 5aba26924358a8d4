//! Upload endpoint tests: storage, deduplication and rejection paths.

use actix_web::http::StatusCode;
use actix_web::test;
use log_vault::db::{InsertOutcome, NewLogFile};

use super::helpers::*;

#[actix_rt::test]
async fn test_upload_stores_record_and_blob() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = upload(&app, "server.log", "line one\nline two\n").await;

    assert_eq!(status, StatusCode::OK, "{:?}", body);
    assert_eq!(body["message"], "File uploaded successfully");
    assert_eq!(body["filename"], "server.log");
    assert_eq!(body["file_size"], 18);

    let id = body["file_id"].as_i64().unwrap();
    let record = ctx
        .pool
        .get_active_log_file(id as i32)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.original_filename, "server.log");
    assert!(record.filename.ends_with("_server.log"));
    assert_eq!(record.client_info.as_deref(), Some("log-vault-tests/1.0"));
    assert_eq!(record.file_hash.as_deref().map(str::len), Some(64));

    let on_disk = std::fs::read_to_string(&record.file_path).unwrap();
    assert_eq!(on_disk, "line one\nline two\n");
    assert_eq!(ctx.blob_names(), vec![record.filename]);
}

#[actix_rt::test]
async fn test_duplicate_content_returns_existing_record() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let first = upload_ok(&app, "first.log", "same bytes\n").await;
    let (status, body) = upload(&app, "second.txt", "same bytes\n").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "File already exists");
    assert_eq!(body["file_id"].as_i64(), Some(first));
    assert_eq!(body["existing_filename"], "first.log");

    // The second blob was discarded
    assert_eq!(ctx.blob_names().len(), 1);

    let (_, list) = get_json(&app, "/api/logs").await;
    assert_eq!(list["total"], 1);
}

#[actix_rt::test]
async fn test_reupload_after_delete_creates_new_record() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let first = upload_ok(&app, "app.log", "content\n").await;
    let (status, _) = delete_log(&app, first).await;
    assert_eq!(status, StatusCode::OK);

    let second = upload_ok(&app, "app.log", "content\n").await;
    assert_ne!(first, second);
}

#[actix_rt::test]
async fn test_same_name_different_content_gets_distinct_blobs() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    upload_ok(&app, "same.log", "one\n").await;
    upload_ok(&app, "same.log", "two\n").await;

    assert_eq!(ctx.blob_names().len(), 2);
}

#[actix_rt::test]
async fn test_disallowed_extension_is_rejected() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    for name in ["notes.md", "binary.exe", "noextension"] {
        let (status, body) = upload(&app, name, "data\n").await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", name);
        assert_eq!(
            body["error"],
            "Invalid file type. Only .txt and .log files are allowed"
        );
    }

    assert!(ctx.blob_names().is_empty());
    let (_, list) = get_json(&app, "/api/logs").await;
    assert_eq!(list["total"], 0);
}

#[actix_rt::test]
async fn test_extension_check_is_case_insensitive() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    upload_ok(&app, "UPPER.LOG", "shout\n").await;
}

#[actix_rt::test]
async fn test_missing_file_part_is_rejected() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = upload_parts(
        &app,
        &[Part {
            name: "comment",
            filename: None,
            content: b"hello",
        }],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file provided");
}

#[actix_rt::test]
async fn test_non_multipart_request_is_rejected() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let req = test::TestRequest::post()
        .uri("/api/upload")
        .set_json(serde_json::json!({ "file": "nope" }))
        .to_request();
    let (status, body) = json_response(test::call_service(&app, req).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file provided");
}

#[actix_rt::test]
async fn test_empty_filename_is_rejected() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = upload_parts(&app, &[Part::file("", b"data")]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file selected");
    assert!(ctx.blob_names().is_empty());
}

#[actix_rt::test]
async fn test_extra_parts_are_ignored() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = upload_parts(
        &app,
        &[
            Part {
                name: "comment",
                filename: None,
                content: b"ignored",
            },
            Part::file("kept.log", b"kept\n"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{:?}", body);
    assert_eq!(body["filename"], "kept.log");
}

#[actix_rt::test]
async fn test_oversized_upload_is_rejected_without_leftovers() {
    let ctx = setup_with(|config| config.max_upload_size = 64).await;
    let app = create_test_app(&ctx).await;

    let big = "x".repeat(1024);
    let (status, body) = upload(&app, "big.log", &big).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "File too large");
    assert!(ctx.blob_names().is_empty());
}

#[actix_rt::test]
async fn test_declared_length_over_limit_is_rejected_before_reading() {
    let ctx = setup_with(|config| config.max_upload_size = 1024).await;
    let app = create_test_app(&ctx).await;

    // The body itself is small; only the declared length is over the limit
    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header((
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(&[Part::file("small.log", b"tiny\n")]))
        .insert_header(("Content-Length", "10485760"))
        .to_request();
    let (status, body) = json_response(test::call_service(&app, req).await).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "File too large");
    assert!(ctx.blob_names().is_empty());

    let (_, list) = get_json(&app, "/api/logs").await;
    assert_eq!(list["total"], 0);
}

#[actix_rt::test]
async fn test_path_components_are_stripped_from_storage_name() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let id = upload_ok(&app, "../../etc/evil name.log", "x\n").await;
    let path = blob_path(&ctx, id).await;

    assert_eq!(path.parent().unwrap(), ctx.storage_dir());
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with("_etc_evil_name.log"), "{}", name);
}

#[actix_rt::test]
async fn test_fingerprint_freed_by_delete_can_be_inserted_again() {
    let ctx = setup().await;

    let entry = |name: &str| NewLogFile {
        filename: format!("20250101_000000_{}", name),
        original_filename: name.to_string(),
        file_path: ctx.storage_dir().join(name).to_string_lossy().into_owned(),
        file_size: 4,
        file_hash: "d".repeat(64),
        client_info: String::new(),
    };

    let InsertOutcome::Created(holder) = ctx.pool.insert_log_file(entry("a.log")).await.unwrap()
    else {
        panic!("expected a new record");
    };

    match ctx.pool.insert_log_file(entry("b.log")).await.unwrap() {
        InsertOutcome::Duplicate(existing) => assert_eq!(existing.id, holder.id),
        other => panic!("expected a duplicate, got {:?}", other),
    }

    // Once the holder is gone the conflict resolves to a fresh row
    assert!(ctx.pool.soft_delete_log_file(holder.id).await.unwrap());
    match ctx.pool.insert_log_file(entry("c.log")).await.unwrap() {
        InsertOutcome::Created(record) => {
            assert_ne!(record.id, holder.id);
            assert_eq!(record.original_filename, "c.log");
        }
        other => panic!("expected a new record, got {:?}", other),
    }
}
