//! Integration tests for dashboard statistics.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_stats_follow_list_scope() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);

    for i in 0..6 {
        app.create_ticket(&admin, app.ticket_body(app.acme.id, &format!("Acme {i}")))
            .await;
    }
    let mut body = app.ticket_body(app.globex.id, "Globex critical");
    body["priorityId"] = json!(4);
    body["assignedTo"] = json!(app.support.id);
    app.create_ticket(&admin, body).await;

    let as_admin = app.request("GET", "/api/dashboard/stats", None, Some(&admin)).await;
    assert_eq!(as_admin.status, StatusCode::OK);
    let stats = as_admin.data();
    assert_eq!(stats["total"], 7);
    assert_eq!(stats["new"], 7);
    assert_eq!(stats["assigned"], 0);
    assert_eq!(stats["critical"], 1);
    assert_eq!(stats["resolved"], 0);
    assert_eq!(stats["recent_tickets"].as_array().unwrap().len(), 5);

    let as_customer = app
        .request("GET", "/api/dashboard/stats", None, Some(&app.token(&app.customer)))
        .await;
    let stats = as_customer.data();
    assert_eq!(stats["total"], 6);
    assert_eq!(stats["critical"], 0);
    assert!(
        stats["recent_tickets"]
            .as_array()
            .unwrap()
            .iter()
            .all(|t| t["company_id"] == app.acme.id)
    );

    let as_support = app
        .request("GET", "/api/dashboard/stats", None, Some(&app.token(&app.support)))
        .await;
    let stats = as_support.data();
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["critical"], 1);
    assert_eq!(stats["recent_tickets"][0]["subject"], "Globex critical");
}

#[tokio::test]
async fn test_resolved_counts_completed_and_closed() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);

    let a = app.create_ticket(&admin, app.ticket_body(app.acme.id, "A")).await;
    let b = app.create_ticket(&admin, app.ticket_body(app.acme.id, "B")).await;
    app.create_ticket(&admin, app.ticket_body(app.acme.id, "C")).await;

    for (id, status) in [(a, 6), (b, 8)] {
        let response = app
            .request(
                "PUT",
                &format!("/api/tickets/{id}"),
                Some(json!({ "statusId": status })),
                Some(&admin),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let stats = app.request("GET", "/api/dashboard/stats", None, Some(&admin)).await;
    assert_eq!(stats.data()["resolved"], 2);
    assert_eq!(stats.data()["new"], 1);
}

#[tokio::test]
async fn test_empty_dashboard() {
    let app = TestApp::new().await;
    let stats = app
        .request("GET", "/api/dashboard/stats", None, Some(&app.token(&app.outsider)))
        .await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.data()["total"], 0);
    assert!(stats.data()["recent_tickets"].as_array().unwrap().is_empty());
}
