#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use plant_shift_api::{
    advisory::AdvisoryClient,
    auth,
    build_router,
    config::AdvisoryConfig,
    db::MemoryStore,
    models::Role,
    AppState,
};
use serde_json::{json, Value};

pub const ADMIN: (&str, &str) = ("admin@plant.example", "admin-pass");
pub const OPERATOR_1: (&str, &str) = ("operator1@plant.example", "operator-pass-1");
pub const OPERATOR_2: (&str, &str) = ("operator2@plant.example", "operator-pass-2");

pub struct TestApp {
    pub addr: SocketAddr,
    pub base: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
}

/// Router over a fresh in-memory store with one admin and two operators.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    for (email, password, role) in [
        (ADMIN.0, ADMIN.1, Role::Admin),
        (OPERATOR_1.0, OPERATOR_1.1, Role::Operator),
        (OPERATOR_2.0, OPERATOR_2.1, Role::Operator),
    ] {
        auth::create_user(store.as_ref(), email, password, role)
            .await
            .expect("seed user");
    }

    let advisory = AdvisoryClient::new(AdvisoryConfig::default()).expect("advisory client");
    let app = build_router(AppState::new(store.clone(), advisory));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    TestApp {
        addr,
        base: format!("http://{addr}"),
        client: reqwest::Client::new(),
        store,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn sign_in(&self, (email, password): (&str, &str)) -> String {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/sign-in"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("sign-in request");
        assert_eq!(resp.status(), 200, "sign-in for {email}");
        let body: Value = resp.json().await.expect("sign-in json");
        body["token"].as_str().expect("token").to_string()
    }

    pub async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request")
    }

    pub async fn post(&self, token: &str, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request")
    }

    pub async fn delete(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request")
    }

    /// Files a report and returns the stored log.
    pub async fn submit_log(&self, token: &str, draft: &Value) -> Value {
        let resp = self.post(token, "/api/v1/shift-logs", draft).await;
        assert_eq!(resp.status(), 201);
        resp.json().await.expect("log json")
    }
}

pub fn draft(group: &str, shift: &str, unit_group: &str) -> Value {
    let units = if unit_group == "Unit 1-2" {
        ["Unit 1", "Unit 2"]
    } else {
        ["Unit 3", "Unit 4"]
    };
    json!({
        "groupName": group,
        "shift": shift,
        "unitGroup": unit_group,
        "units": [
            { "unitId": units[0], "isOnline": true, "loadCurrent": 1.5, "loadLowest": "", "loadHighest": "2" },
            { "unitId": units[1], "isOnline": true, "loadCurrent": 2.0, "loadLowest": 1, "loadHighest": 2.5 }
        ],
        "notes": "normal operation",
        "checklist": {
            "pemanasanEDG": true,
            "housekeeping": true,
            "purifierOliUnit1": true,
            "penambahanNaOHUnit3": true
        }
    })
}
