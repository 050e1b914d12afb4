use std::sync::Arc;

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::json;

use kanelm_api::app::{build_app, services::DynOwnershipStore, AppServices};
use kanelm_api::config::AppConfig;
use kanelm_auth::Session;
use kanelm_core::{ProjectId, TaskId, UserId};
use kanelm_infra::InMemoryOwnershipStore;

const PERMISSIONS: &str = include_str!("../../../permissions.toml");

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    store: Arc<InMemoryOwnershipStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let table = kanelm_infra::parse_permission_table(PERMISSIONS).unwrap();
        let store = Arc::new(InMemoryOwnershipStore::new());
        let dyn_store: DynOwnershipStore = store.clone();
        let services = Arc::new(AppServices::new(table, dyn_store, &AppConfig::default()));

        // Same router as prod, bound to an ephemeral port.
        let app = build_app(Arc::clone(&services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services,
            store,
            handle,
        }
    }

    fn login(&self, token: &str, user: i64, name: &str) {
        self.services
            .sessions()
            .insert(token, Session::new(UserId::new(user), name, Utc::now()));
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_a_known_token() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/session")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(server.url("/session"))
        .bearer_auth("never-issued")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");
}

#[tokio::test]
async fn session_reports_the_caller() {
    let server = TestServer::spawn().await;
    server.login("tok-ricky", 5, "ricky");
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/session"))
        .bearer_auth("tok-ricky")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user_id"], 5);
    assert_eq!(body["display_name"], "ricky");
}

#[tokio::test]
async fn task_owner_may_update_but_stranger_may_not() {
    let server = TestServer::spawn().await;
    server.login("tok-owner", 5, "owner");
    server.login("tok-stranger", 6, "stranger");
    server.store.add_task_owner(TaskId::new(42), UserId::new(5));
    let client = reqwest::Client::new();

    let body = json!({"entity": "task", "action": "update", "task_id": 42});

    let res = client
        .post(server.url("/authz/check"))
        .bearer_auth("tok-owner")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let decision: serde_json::Value = res.json().await.unwrap();
    assert_eq!(decision["allowed"], true);

    let res = client
        .post(server.url("/authz/check"))
        .bearer_auth("tok-stranger")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let decision: serde_json::Value = res.json().await.unwrap();
    assert_eq!(decision["allowed"], false);

    let res = client
        .post(server.url("/authz/require"))
        .bearer_auth("tok-stranger")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn project_owner_passes_require() {
    let server = TestServer::spawn().await;
    server.login("tok-owner", 5, "owner");
    server.store.add_project_owner(ProjectId::new(1), UserId::new(5));
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/authz/require"))
        .bearer_auth("tok-owner")
        .json(&json!({"entity": "project", "action": "add_owner", "project_id": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn unconfigured_pair_is_a_server_error_not_a_denial() {
    let server = TestServer::spawn().await;
    server.login("tok-admin", 1, "admin");
    server.store.set_admin(UserId::new(1), true);
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/authz/check"))
        .bearer_auth("tok-admin")
        .json(&json!({"entity": "project", "action": "archive", "project_id": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "misconfigured");
}

#[tokio::test]
async fn permissions_lists_the_loaded_table() {
    let server = TestServer::spawn().await;
    server.login("tok", 5, "ricky");
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/permissions"))
        .bearer_auth("tok")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let table: serde_json::Value = res.json().await.unwrap();
    assert_eq!(table["task"]["assign"], json!(["admin", "project owner"]));
}

#[tokio::test]
async fn logout_is_idempotent_and_revokes_the_token() {
    let server = TestServer::spawn().await;
    server.login("tok", 5, "ricky");
    let client = reqwest::Client::new();

    let res = client
        .delete(server.url("/session"))
        .bearer_auth("tok")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(server.services.sessions().lookup("tok").is_none());

    // the token is gone, so a second logout cannot authenticate
    let res = client
        .delete(server.url("/session"))
        .bearer_auth("tok")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
