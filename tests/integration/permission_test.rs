//! Integration tests for role scoping and admin-only surfaces.

mod helpers;

use std::collections::HashSet;

use axum::http::StatusCode;
use serde_json::{Value, json};

use helpdesk_core::config::AppConfig;
use helpers::TestApp;

fn ids(list: &Value) -> HashSet<i64> {
    list.as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["id"].as_i64())
        .collect()
}

#[tokio::test]
async fn test_list_is_role_scoped() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);

    let mut assigned = app.ticket_body(app.acme.id, "Acme assigned");
    assigned["assignedTo"] = json!(app.support.id);
    let acme_assigned = app.create_ticket(&admin, assigned).await;
    let acme_open = app.create_ticket(&admin, app.ticket_body(app.acme.id, "Acme open")).await;
    let mut other = app.ticket_body(app.globex.id, "Globex");
    other["assignedTo"] = json!(app.other_support.id);
    let globex = app.create_ticket(&admin, other).await;

    let as_admin = app.request("GET", "/api/tickets", None, Some(&admin)).await;
    assert_eq!(ids(as_admin.data()), HashSet::from([acme_assigned, acme_open, globex]));

    let as_customer = app
        .request("GET", "/api/tickets", None, Some(&app.token(&app.customer)))
        .await;
    assert_eq!(ids(as_customer.data()), HashSet::from([acme_assigned, acme_open]));

    let as_support = app
        .request("GET", "/api/tickets", None, Some(&app.token(&app.support)))
        .await;
    assert_eq!(ids(as_support.data()), HashSet::from([acme_assigned]));

    let as_outsider = app
        .request("GET", "/api/tickets", None, Some(&app.token(&app.outsider)))
        .await;
    assert_eq!(ids(as_outsider.data()), HashSet::from([globex]));
}

#[tokio::test]
async fn test_detail_view_respects_scope() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;
    let path = format!("/api/tickets/{id}");

    let own = app
        .request("GET", &path, None, Some(&app.token(&app.customer)))
        .await;
    assert_eq!(own.status, StatusCode::OK);

    let foreign = app
        .request("GET", &path, None, Some(&app.token(&app.outsider)))
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);
    assert_eq!(foreign.body["error"], "FORBIDDEN");

    let unassigned = app
        .request("GET", &path, None, Some(&app.token(&app.support)))
        .await;
    assert_eq!(unassigned.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_customer_can_never_update() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;
    let before = app.store.raw_ticket(id).await.unwrap();

    let response = app
        .request(
            "PUT",
            &format!("/api/tickets/{id}"),
            Some(json!({ "statusId": 8, "notes": "closing my own ticket" })),
            Some(&app.token(&app.customer)),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.raw_ticket(id).await.unwrap(), before);
    assert_eq!(app.store.raw_history(id).await.len(), 1);
}

#[tokio::test]
async fn test_forbidden_wins_over_invalid_body() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;

    let update = app
        .request(
            "PUT",
            &format!("/api/tickets/{id}"),
            Some(json!({ "statusId": 99 })),
            Some(&app.token(&app.customer)),
        )
        .await;
    assert_eq!(update.status, StatusCode::FORBIDDEN);

    let create = app
        .request(
            "POST",
            "/api/tickets",
            Some(json!({ "subject": "" })),
            Some(&app.token(&app.support)),
        )
        .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);

    let ticket = app
        .request("GET", &format!("/api/tickets/{id}"), None, Some(&admin))
        .await;
    assert_eq!(ticket.data()["status_id"], 1);
}

#[tokio::test]
async fn test_support_cannot_touch_unassigned_ticket() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let mut body = app.ticket_body(app.acme.id, "X");
    body["assignedTo"] = json!(app.other_support.id);
    let id = app.create_ticket(&admin, body).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/tickets/{id}"),
            Some(json!({ "statusId": 3 })),
            Some(&app.token(&app.support)),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_only_admin_creates_and_deletes_as_staff() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let support = app.token(&app.support);

    let create = app
        .request("POST", "/api/tickets", Some(app.ticket_body(app.acme.id, "X")), Some(&support))
        .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);

    let id = app.create_ticket(&admin, app.ticket_body(app.acme.id, "X")).await;
    for user in [&app.support, &app.customer] {
        let response = app
            .request("DELETE", &format!("/api/tickets/{id}"), None, Some(&app.token(user)))
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
    }
    assert!(app.store.raw_ticket(id).await.unwrap().is_active);
}

#[tokio::test]
async fn test_company_management_is_admin_only() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let support = app.token(&app.support);

    let listed = app.request("GET", "/api/companies", None, Some(&admin)).await;
    assert_eq!(listed.status, StatusCode::OK);
    let acme = listed
        .data()
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Acme")
        .cloned()
        .unwrap();
    assert_eq!(acme["customer_count"], 1);

    let created = app
        .request("POST", "/api/companies", Some(json!({ "name": "Initech" })), Some(&admin))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.data()["id"].as_i64().unwrap();

    let renamed = app
        .request(
            "PUT",
            &format!("/api/companies/{id}"),
            Some(json!({ "name": "Initrode" })),
            Some(&admin),
        )
        .await;
    assert_eq!(renamed.data()["name"], "Initrode");

    let blank = app
        .request("POST", "/api/companies", Some(json!({ "name": "  " })), Some(&admin))
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let forbidden = app.request("GET", "/api/companies", None, Some(&support)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let removed = app
        .request("DELETE", &format!("/api/companies/{id}"), None, Some(&admin))
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    let missing = app
        .request("DELETE", &format!("/api/companies/{id}"), None, Some(&admin))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_management() {
    let app = TestApp::new().await;
    let admin = app.token(&app.admin);
    let customer = app.token(&app.customer);

    let created = app
        .request(
            "POST",
            "/api/users",
            Some(json!({
                "fullName": "Cem Customer",
                "username": "cem",
                "password": "long-enough",
                "roleId": 3,
                "companyId": app.globex.id
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["role"], "customer");

    let duplicate = app
        .request(
            "POST",
            "/api/users",
            Some(json!({
                "full_name": "Cem Again",
                "username": "cem",
                "password": "long-enough",
                "role_id": 2
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let no_company = app
        .request(
            "POST",
            "/api/users",
            Some(json!({
                "full_name": "Lone Customer",
                "username": "lone",
                "password": "long-enough",
                "role_id": 3
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(no_company.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_company.violation_fields(), vec!["company_id"]);

    let listed = app.request("GET", "/api/users", None, Some(&customer)).await;
    assert_eq!(listed.status, StatusCode::FORBIDDEN);

    let support_users = app
        .request("GET", "/api/users/support", None, Some(&customer))
        .await;
    assert_eq!(support_users.status, StatusCode::OK);
    let names: HashSet<&str> = support_users
        .data()
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["username"].as_str())
        .collect();
    assert_eq!(names, HashSet::from(["sam", "sue"]));
}

#[tokio::test]
async fn test_reference_data_for_any_user() {
    let app = TestApp::new().await;
    let customer = app.token(&app.customer);

    let statuses = app.request("GET", "/api/statuses", None, Some(&customer)).await;
    assert_eq!(statuses.status, StatusCode::OK);
    assert_eq!(statuses.data().as_array().unwrap().len(), 8);
    assert_eq!(statuses.data()[0]["id"], 1);

    let priorities = app.request("GET", "/api/priorities", None, Some(&customer)).await;
    assert_eq!(priorities.data().as_array().unwrap().len(), 4);

    let modules = app.request("GET", "/api/modules", None, Some(&customer)).await;
    assert!(!modules.data().as_array().unwrap().is_empty());

    let anonymous = app.request("GET", "/api/modules", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rate_limit() {
    let mut config = AppConfig::default();
    config.rate_limit.max_requests = 3;
    let app = TestApp::with_config(config).await;

    for _ in 0..3 {
        let response = app.request("GET", "/api/health", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
    }
    let limited = app.request("GET", "/api/health", None, None).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.body["error"], "RATE_LIMITED");
}
