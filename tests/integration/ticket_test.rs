//! Integration tests for the ticket lifecycle over HTTP.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);

    let response = app
        .request(
            "POST",
            "/api/tickets",
            Some(json!({
                "companyId": app.acme.id,
                "moduleId": 1,
                "subject": "X",
                "description": "Y",
                "priorityId": 2,
                "email": "ops@acme.test",
                "dueDate": "2026-12-01"
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let created = response.data().clone();
    assert_eq!(created["status_id"], 1);
    assert_eq!(created["status_name"], "New");
    assert_eq!(created["priority_name"], "Medium");
    assert!(created["resolved_at"].is_null());

    let history = created["status_history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["status_id"], 1);
    assert_eq!(history[0]["notes"], "Ticket created");

    let id = created["id"].as_i64().unwrap();
    let fetched = app
        .request("GET", &format!("/api/tickets/{id}"), None, Some(&admin))
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    for field in [
        "company_id",
        "module_id",
        "subject",
        "description",
        "email",
        "priority_id",
        "due_date",
        "created_at",
    ] {
        assert_eq!(fetched.data()[field], created[field], "field {field}");
    }
}

#[tokio::test]
async fn test_create_reports_all_violations() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);

    let response = app
        .request(
            "POST",
            "/api/tickets",
            Some(json!({ "companyId": 0, "subject": " ", "description": "" })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.violation_fields(),
        vec!["company_id", "description", "module_id", "subject"]
    );
}

#[tokio::test]
async fn test_missing_company_reported_with_body_violations() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);

    let response = app
        .request(
            "POST",
            "/api/tickets",
            Some(json!({ "moduleId": 1, "subject": "", "description": "Y" })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.violation_fields(), vec!["company_id", "subject"]);
}

#[tokio::test]
async fn test_create_checks_references() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);

    let response = app
        .request(
            "POST",
            "/api/tickets",
            Some(json!({
                "companyId": 999,
                "moduleId": 99,
                "subject": "X",
                "description": "Y",
                "assignedTo": app.customer.id
            })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.violation_fields(),
        vec!["module_id", "company_id", "assigned_to"]
    );
}

#[tokio::test]
async fn test_customer_ticket_is_clamped_to_own_company() {
    let app = TestApp::new().await;
    let customer = app.token(&app.customer);

    let response = app
        .request(
            "POST",
            "/api/tickets",
            Some(json!({
                "companyId": app.globex.id,
                "moduleId": 2,
                "subject": "Invoice export fails",
                "description": "Details in mail",
                "assignedTo": app.support.id
            })),
            Some(&customer),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data()["company_id"], app.acme.id);
    assert!(response.data()["assigned_to"].is_null());
}

#[tokio::test]
async fn test_lifecycle_scenario() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let support = app.token(&app.support);
    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;
    let path = format!("/api/tickets/{id}");

    // Assigning a New ticket moves it to Assigned.
    let assigned = app
        .request("PUT", &path, Some(json!({ "assignedTo": app.support.id })), Some(&admin))
        .await;
    assert_eq!(assigned.status, StatusCode::OK);
    assert_eq!(assigned.data()["status_id"], 2);
    assert!(assigned.data()["resolved_at"].is_null());
    assert_eq!(assigned.data()["status_history"].as_array().unwrap().len(), 2);

    // The assignee completes it.
    let completed = app
        .request("PUT", &path, Some(json!({ "statusId": 6 })), Some(&support))
        .await;
    assert_eq!(completed.status, StatusCode::OK);
    assert_eq!(completed.data()["status_id"], 6);
    assert!(completed.data()["resolved_at"].is_string());
    let history = completed.data()["status_history"].as_array().unwrap();
    assert_eq!(history.last().unwrap()["status_id"], 6);

    // Priority changes by support are ignored.
    let ignored = app
        .request("PUT", &path, Some(json!({ "priorityId": 4 })), Some(&support))
        .await;
    assert_eq!(ignored.status, StatusCode::OK);
    assert_eq!(ignored.data()["priority_id"], 2);

    // Support may not reopen to New.
    let reopened = app
        .request("PUT", &path, Some(json!({ "statusId": 1 })), Some(&support))
        .await;
    assert_eq!(reopened.status, StatusCode::FORBIDDEN);
    let ticket = app.store.raw_ticket(id).await.unwrap();
    assert_eq!(ticket.status_id.id(), 6);
    assert_eq!(app.store.raw_history(id).await.len(), 3);

    // Leaving a closing state clears resolved_at.
    let back = app
        .request("PUT", &path, Some(json!({ "statusId": 3 })), Some(&support))
        .await;
    assert!(back.data()["resolved_at"].is_null());
}

#[tokio::test]
async fn test_identical_update_adds_no_history() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;
    let path = format!("/api/tickets/{id}");

    let first = app
        .request("PUT", &path, Some(json!({ "statusId": 1, "priorityId": 2 })), Some(&admin))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.data()["status_history"].as_array().unwrap().len(), 1);

    let noted = app
        .request("PUT", &path, Some(json!({ "notes": "Called the customer" })), Some(&admin))
        .await;
    let history = noted.data()["status_history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["notes"], "Called the customer");
}

#[tokio::test]
async fn test_null_clears_assignment() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let mut body = app.ticket_body(app.acme.id, "X");
    body["assignedTo"] = json!(app.support.id);
    let id = app.create_ticket(&admin, body).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/tickets/{id}"),
            Some(json!({ "assignedTo": null })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.data()["assigned_to"].is_null());
}

#[tokio::test]
async fn test_soft_delete_hides_ticket() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;
    let path = format!("/api/tickets/{id}");

    let deleted = app.request("DELETE", &path, None, Some(&admin)).await;
    assert_eq!(deleted.status, StatusCode::OK);

    let fetched = app.request("GET", &path, None, Some(&admin)).await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);

    let listed = app.request("GET", "/api/tickets", None, Some(&admin)).await;
    assert!(listed.data().as_array().unwrap().is_empty());

    assert!(!app.store.raw_history(id).await.is_empty());

    let again = app.request("DELETE", &path, None, Some(&admin)).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_path_id() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);

    let response = app.request("GET", "/api/tickets/abc", None, Some(&admin)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_store_outage_is_opaque() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;

    app.store.set_fail_history_writes(true);
    let failed = app
        .request(
            "PUT",
            &format!("/api/tickets/{id}"),
            Some(json!({ "statusId": 3 })),
            Some(&admin),
        )
        .await;
    assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(failed.body["message"], "Internal server error");
    assert_eq!(app.store.raw_ticket(id).await.unwrap().status_id.id(), 1);
    assert_eq!(app.store.raw_history(id).await.len(), 1);
    app.store.set_fail_history_writes(false);

    // The identity lookup hits the store too, so an outage is reported as such.
    app.store.set_unavailable(true);
    let response = app.request("GET", "/api/tickets", None, Some(&admin)).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["error"], "SERVICE_UNAVAILABLE");
}
