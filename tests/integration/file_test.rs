//! Integration tests for ticket attachments.

mod helpers;

use axum::http::{StatusCode, header};

use helpers::TestApp;

const PDF: &[u8] = b"%PDF-1.4 test";

#[tokio::test]
async fn test_upload_list_download() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let customer = app.token(&app.customer);
    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;

    let uploaded = app
        .upload(id, &[("rapor şubat.pdf", "application/pdf", PDF)], &customer)
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED);
    let file = uploaded.data()[0].clone();
    assert_eq!(file["file_name"], "rapor şubat.pdf");
    assert_eq!(file["size_bytes"], PDF.len());
    assert_eq!(file["mime_type"], "application/pdf");
    assert!(file.get("storage_key").is_none());

    let listed = app
        .request("GET", &format!("/api/tickets/{id}/files"), None, Some(&admin))
        .await;
    assert_eq!(listed.data().as_array().unwrap().len(), 1);

    let file_id = file["id"].as_i64().unwrap();
    let downloaded = app
        .request("GET", &format!("/api/files/{file_id}/download"), None, Some(&customer))
        .await;
    assert_eq!(downloaded.status, StatusCode::OK);
    assert_eq!(
        downloaded.headers[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(
        downloaded.headers[header::CONTENT_DISPOSITION],
        "attachment; filename*=UTF-8''rapor%20%C5%9Fubat%2Epdf"
    );
    assert_eq!(downloaded.raw.as_ref(), PDF);
}

#[tokio::test]
async fn test_only_admin_deletes_files() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let customer = app.token(&app.customer);
    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;

    let uploaded = app.upload(id, &[("a.txt", "text/plain", b"hello")], &customer).await;
    let file_id = uploaded.data()[0]["id"].as_i64().unwrap();
    let path = format!("/api/files/{file_id}");

    let forbidden = app.request("DELETE", &path, None, Some(&customer)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let deleted = app.request("DELETE", &path, None, Some(&admin)).await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app
        .request("GET", &format!("{path}/download"), None, Some(&admin))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rejects_disallowed_type() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;

    let response = app
        .upload(
            id,
            &[
                ("ok.png", "image/png", b"\x89PNG"),
                ("setup.exe", "application/x-msdownload", b"MZ"),
            ],
            &admin,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.violation_fields(), vec!["files[1]"]);

    let listed = app
        .request("GET", &format!("/api/tickets/{id}/files"), None, Some(&admin))
        .await;
    assert!(listed.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_rejects_too_many_files() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;

    let names: Vec<String> = (0..6).map(|i| format!("{i}.txt")).collect();
    let files: Vec<(&str, &str, &[u8])> = names
        .iter()
        .map(|n| (n.as_str(), "text/plain", b"x".as_slice()))
        .collect();

    let response = app.upload(id, &files, &admin).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.violation_fields(), vec!["files"]);
}

#[tokio::test]
async fn test_outsider_cannot_reach_files() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let outsider = app.token(&app.outsider);
    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;
    let uploaded = app.upload(id, &[("a.txt", "text/plain", b"x")], &admin).await;
    let file_id = uploaded.data()[0]["id"].as_i64().unwrap();

    let upload = app.upload(id, &[("b.txt", "text/plain", b"y")], &outsider).await;
    assert_eq!(upload.status, StatusCode::FORBIDDEN);

    let list = app
        .request("GET", &format!("/api/tickets/{id}/files"), None, Some(&outsider))
        .await;
    assert_eq!(list.status, StatusCode::FORBIDDEN);

    let download = app
        .request("GET", &format!("/api/files/{file_id}/download"), None, Some(&outsider))
        .await;
    assert_eq!(download.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_upload_to_missing_ticket() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);

    let response = app.upload(4242, &[("a.txt", "text/plain", b"x")], &admin).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_files_of_deleted_ticket_are_gone() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;

    let customer = app.token(&app.customer);
    let uploaded = app.upload(id, &[("a.txt", "text/plain", b"hello")], &customer).await;
    let file_id = uploaded.data()[0]["id"].as_i64().unwrap();

    let deleted = app
        .request("DELETE", &format!("/api/tickets/{id}"), None, Some(&admin))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let listed = app
        .request("GET", &format!("/api/tickets/{id}/files"), None, Some(&admin))
        .await;
    assert_eq!(listed.status, StatusCode::NOT_FOUND);

    let removed = app
        .request("DELETE", &format!("/api/files/{file_id}"), None, Some(&admin))
        .await;
    assert_eq!(removed.status, StatusCode::NOT_FOUND);
}
