mod common;

use chrono::{Duration, Utc};
use common::{draft, spawn_app, ADMIN, OPERATOR_1, OPERATOR_2};
use serde_json::{json, Value};

#[tokio::test]
async fn health_reports_store_backend() {
    let app = spawn_app().await;
    let body: Value = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("health")
        .json()
        .await
        .expect("health json");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["advisory_configured"], false);
}

#[tokio::test]
async fn bad_credentials_and_missing_token_are_rejected() {
    let app = spawn_app().await;
    let resp = app
        .client
        .post(app.url("/api/v1/auth/sign-in"))
        .json(&json!({ "email": OPERATOR_1.0, "password": "wrong" }))
        .send()
        .await
        .expect("sign-in");
    assert_eq!(resp.status(), 401);

    let resp = app.client.get(app.url("/api/v1/shift-logs")).send().await.expect("list");
    assert_eq!(resp.status(), 401);

    let resp = app.get("not-a-token", "/api/v1/dashboard").await;
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn query_string_token_is_refused_on_rest_routes() {
    let app = spawn_app().await;
    let op = app.sign_in(OPERATOR_1).await;
    let resp = app
        .client
        .get(app.url(&format!("/api/v1/shift-logs?token={op}")))
        .send()
        .await
        .expect("list");
    assert_eq!(resp.status(), 401);
    assert_eq!(app.get(&op, "/api/v1/shift-logs").await.status(), 200);
}

#[tokio::test]
async fn me_reports_role() {
    let app = spawn_app().await;
    let admin = app.sign_in(ADMIN).await;
    let me: Value = app.get(&admin, "/api/v1/auth/me").await.json().await.expect("me");
    assert_eq!(me["isAdmin"], true);
    assert_eq!(me["identity"]["email"], ADMIN.0);
}

#[tokio::test]
async fn submitted_log_is_stamped_and_checklist_filtered() {
    let app = spawn_app().await;
    let op = app.sign_in(OPERATOR_1).await;

    let log = app.submit_log(&op, &draft("Grup A", "Sore", "Unit 1-2")).await;
    assert_eq!(log["userEmail"], OPERATOR_1.0);
    assert!(log["createdBy"].is_string());
    assert_eq!(log["entries"][0]["loadLowest"], 0.0);
    assert_eq!(log["entries"][0]["loadHighest"], 2.0);
    assert_eq!(log["entries"][1]["notes"], "normal operation");

    let checklist = log["checklist"].as_object().expect("checklist");
    let mut keys: Vec<_> = checklist.keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        [
            "engkolManualTurbinUnit1",
            "engkolManualTurbinUnit2",
            "purifierOliUnit1",
            "purifierOliUnit2"
        ]
    );
    assert_eq!(checklist["purifierOliUnit1"], true);
    assert_eq!(checklist["purifierOliUnit2"], false);
}

#[tokio::test]
async fn invalid_reports_are_refused() {
    let app = spawn_app().await;
    let op = app.sign_in(OPERATOR_1).await;

    let resp = app.post(&op, "/api/v1/shift-logs", &draft("", "Pagi", "Unit 1-2")).await;
    assert_eq!(resp.status(), 422);

    let mut wrong_units = draft("Grup A", "Pagi", "Unit 3-4");
    wrong_units["units"] = draft("Grup A", "Pagi", "Unit 1-2")["units"].clone();
    let resp = app.post(&op, "/api/v1/shift-logs", &wrong_units).await;
    assert_eq!(resp.status(), 422);

    let admin = app.sign_in(ADMIN).await;
    let resp = app.post(&admin, "/api/v1/shift-logs", &draft("Grup A", "Pagi", "Unit 1-2")).await;
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn operators_see_own_logs_and_admin_sees_all() {
    let app = spawn_app().await;
    let op1 = app.sign_in(OPERATOR_1).await;
    let op2 = app.sign_in(OPERATOR_2).await;
    let admin = app.sign_in(ADMIN).await;

    app.submit_log(&op1, &draft("Grup A", "Pagi", "Unit 1-2")).await;
    app.submit_log(&op2, &draft("Grup B", "Malam", "Unit 3-4")).await;

    let mine: Vec<Value> = app.get(&op1, "/api/v1/shift-logs").await.json().await.expect("list");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["groupName"], "Grup A");

    let all: Vec<Value> = app.get(&admin, "/api/v1/shift-logs").await.json().await.expect("list");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["groupName"], "Grup B", "newest first");

    let other_id = all[0]["id"].as_str().expect("id");
    let resp = app.get(&op1, &format!("/api/v1/shift-logs/{other_id}")).await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn history_filter_applies_text_and_inclusive_dates() {
    let app = spawn_app().await;
    let op1 = app.sign_in(OPERATOR_1).await;
    let op2 = app.sign_in(OPERATOR_2).await;
    let admin = app.sign_in(ADMIN).await;
    let first_day = Utc::now().date_naive();
    app.submit_log(&op1, &draft("Grup A", "Pagi", "Unit 1-2")).await;
    app.submit_log(&op2, &draft("Grup B", "Sore", "Unit 3-4")).await;
    let last_day = Utc::now().date_naive();

    let hits: Vec<Value> = app.get(&admin, "/api/v1/shift-logs?q=grup%20a").await.json().await.expect("q");
    assert_eq!(hits.len(), 1);

    let hits: Vec<Value> = app
        .get(&admin, "/api/v1/shift-logs?q=OPERATOR2")
        .await
        .json()
        .await
        .expect("email q");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["groupName"], "Grup B");

    let tomorrow = last_day + Duration::days(1);
    let hits: Vec<Value> = app
        .get(&admin, &format!("/api/v1/shift-logs?start={first_day}&end={last_day}"))
        .await
        .json()
        .await
        .expect("range");
    assert_eq!(hits.len(), 2);
    let hits: Vec<Value> = app
        .get(&admin, &format!("/api/v1/shift-logs?start={tomorrow}&end="))
        .await
        .json()
        .await
        .expect("future range");
    assert!(hits.is_empty());

    let resp = app.get(&admin, "/api/v1/shift-logs?start=10-03-2024").await;
    assert_eq!(resp.status(), 422);
}

#[tokio::test]
async fn delete_is_limited_to_author_or_admin() {
    let app = spawn_app().await;
    let op1 = app.sign_in(OPERATOR_1).await;
    let op2 = app.sign_in(OPERATOR_2).await;
    let admin = app.sign_in(ADMIN).await;

    let first = app.submit_log(&op1, &draft("Grup A", "Pagi", "Unit 1-2")).await;
    let second = app.submit_log(&op1, &draft("Grup A", "Sore", "Unit 1-2")).await;
    let first_id = first["id"].as_str().expect("id");
    let second_id = second["id"].as_str().expect("id");

    let resp = app.delete(&op2, &format!("/api/v1/shift-logs/{first_id}")).await;
    assert_eq!(resp.status(), 403);

    let resp = app.delete(&op1, &format!("/api/v1/shift-logs/{first_id}")).await;
    assert_eq!(resp.status(), 200);
    let resp = app.delete(&op1, &format!("/api/v1/shift-logs/{first_id}")).await;
    assert_eq!(resp.status(), 404);

    let resp = app.delete(&admin, &format!("/api/v1/shift-logs/{second_id}")).await;
    assert_eq!(resp.status(), 200);
    let left: Vec<Value> = app.get(&admin, "/api/v1/shift-logs").await.json().await.expect("list");
    assert!(left.is_empty());
}

#[tokio::test]
async fn dashboard_aggregates_visible_logs() {
    let app = spawn_app().await;
    let op = app.sign_in(OPERATOR_1).await;

    let empty: Value = app.get(&op, "/api/v1/dashboard").await.json().await.expect("dashboard");
    assert_eq!(empty["totalLoad"], 0.0);
    assert_eq!(empty["series"].as_array().map(Vec::len), Some(0));

    let mut d = draft("Grup A", "Pagi", "Unit 1-2");
    d["units"][1] = json!({ "unitId": "Unit 2", "isOnline": false, "loadCurrent": 3.0 });
    let before = Utc::now().date_naive().to_string();
    app.submit_log(&op, &d).await;
    let after = Utc::now().date_naive().to_string();

    let dash: Value = app.get(&op, "/api/v1/dashboard").await.json().await.expect("dashboard");
    assert_eq!(dash["totalLoad"], 1.5);
    assert_eq!(dash["totalShifts"], 1);
    assert_eq!(dash["units"][0]["isOnline"], true);
    assert_eq!(dash["units"][0]["loadCurrent"], 1.5);
    assert_eq!(dash["units"][0]["loadLowest"], 0.0);
    assert_eq!(dash["units"][0]["loadHighest"], 2.0);
    assert_eq!(dash["units"][1]["offlineReason"], "Standby");
    assert_eq!(dash["units"][1]["loadCurrent"], 3.0);
    assert_eq!(dash["units"][2]["isOnline"], false);
    let series = dash["series"].as_array().expect("series");
    assert_eq!(series.len(), 7);
    assert_eq!(series[6]["value"], 1.5);
    let anchor = series[6]["date"].as_str().expect("date");
    assert!(anchor == before || anchor == after, "anchor {anchor}");
}

#[tokio::test]
async fn entry_rules_are_served_to_the_form() {
    let app = spawn_app().await;
    let tpl: Value = app
        .client
        .get(app.url("/api/v1/shift-entry/checklist?shift=Pagi&unitGroup=Unit%203-4"))
        .send()
        .await
        .expect("template")
        .json()
        .await
        .expect("template json");
    let keys: Vec<_> = tpl["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|i| i["key"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        keys,
        [
            "pemanasanEDG",
            "housekeeping",
            "pemanasanFirefighting",
            "drainSeparator",
            "penambahanNaOHUnit3",
            "penambahanNaOHUnit4"
        ]
    );

    for (input, expected) in [(json!(2500), 2.5), (json!("450"), 450.0), (json!(500), 500.0)] {
        let out: Value = app
            .client
            .post(app.url("/api/v1/shift-entry/normalize-load"))
            .json(&json!({ "value": input }))
            .send()
            .await
            .expect("normalize")
            .json()
            .await
            .expect("normalize json");
        assert_eq!(out["value"], expected);
    }
}

#[tokio::test]
async fn promoted_operator_gets_admin_scope() {
    let app = spawn_app().await;
    let op1 = app.sign_in(OPERATOR_1).await;
    let op2 = app.sign_in(OPERATOR_2).await;
    let admin = app.sign_in(ADMIN).await;
    app.submit_log(&op2, &draft("Grup B", "Pagi", "Unit 3-4")).await;

    let me: Value = app.get(&op1, "/api/v1/auth/me").await.json().await.expect("me");
    let uid = me["identity"]["uid"].as_str().expect("uid").to_string();

    let resp = app
        .client
        .patch(app.url(&format!("/api/v1/users/{uid}/role")))
        .bearer_auth(&admin)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .expect("patch role");
    assert_eq!(resp.status(), 200);

    let all: Vec<Value> = app.get(&op1, "/api/v1/shift-logs").await.json().await.expect("list");
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn only_admin_manages_users() {
    let app = spawn_app().await;
    let op = app.sign_in(OPERATOR_1).await;
    let admin = app.sign_in(ADMIN).await;
    let body = json!({ "email": "new@plant.example", "password": "new-pass-1" });

    let resp = app.post(&op, "/api/v1/users", &body).await;
    assert_eq!(resp.status(), 403);
    let resp = app.post(&admin, "/api/v1/users", &body).await;
    assert_eq!(resp.status(), 200);
    let resp = app.post(&admin, "/api/v1/users", &body).await;
    assert_eq!(resp.status(), 409);

    app.sign_in(("new@plant.example", "new-pass-1")).await;

    let resp = app
        .client
        .patch(app.url(&format!("/api/v1/users/{}/role", uuid::Uuid::new_v4())))
        .bearer_auth(&admin)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .expect("patch unknown");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn signed_out_token_stops_working() {
    let app = spawn_app().await;
    let op = app.sign_in(OPERATOR_1).await;
    let resp = app.post(&op, "/api/v1/auth/sign-out", &json!({})).await;
    assert_eq!(resp.status(), 200);
    let resp = app.get(&op, "/api/v1/shift-logs").await;
    assert_eq!(resp.status(), 401);
}
