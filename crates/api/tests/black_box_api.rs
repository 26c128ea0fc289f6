use reqwest::StatusCode;
use serde_json::{Value, json};

use penstack_api::config::AppConfig;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let config = AppConfig::from_lookup(|key| match key {
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            "LOG_FORMAT" => Some("pretty".to_string()),
            _ => None,
        })
        .expect("test config");
        let app = penstack_api::app::build_app(&config).expect("build app");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
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

/// Register + login; returns `(user_id, token)`.
async fn signup(client: &reqwest::Client, srv: &TestServer, username: &str) -> (String, String) {
    let email = format!("{username}@example.com");

    let res = client
        .post(srv.url("/api/users/register"))
        .json(&json!({ "username": username, "email": email, "password": "hunter2!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let user: Value = res.json().await.unwrap();
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());

    let res = client
        .post(srv.url("/api/users/login"))
        .json(&json!({ "email": email, "password": "hunter2!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    (
        user["id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}

async fn create_pen(client: &reqwest::Client, srv: &TestServer, token: &str, body: Value) -> Value {
    let res = client
        .post(srv.url("/api/pens"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/api/users/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "missing token");

    let res = client
        .post(srv.url("/api/pens"))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .json(&json!({ "title": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/api/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Not Found");
}

#[tokio::test]
async fn me_reflects_token_identity() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (id, token) = signup(&client, &srv, "alice").await;

    let res = client
        .get(srv.url("/api/users/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], id);
    assert_eq!(body["username"], "alice");
    assert!(body["expiresAt"].is_string());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    signup(&client, &srv, "alice").await;

    let wrong_password = client
        .post(srv.url("/api/users/login"))
        .json(&json!({ "email": "alice@example.com", "password": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    let a: Value = wrong_password.json().await.unwrap();

    let unknown_email = client
        .post(srv.url("/api/users/login"))
        .json(&json!({ "email": "bob@example.com", "password": "hunter2!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown_email.status(), StatusCode::BAD_REQUEST);
    let b: Value = unknown_email.json().await.unwrap();

    assert_eq!(a["message"], b["message"]);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    signup(&client, &srv, "alice").await;

    let res = client
        .post(srv.url("/api/users/register"))
        .json(&json!({ "username": "alice2", "email": "ALICE@example.com", "password": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owner_lifecycle_and_logout_revokes_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (alice_id, alice) = signup(&client, &srv, "alice").await;
    let (_bob_id, bob) = signup(&client, &srv, "bob").await;

    let pen = create_pen(&client, &srv, &alice, json!({ "title": "Hello", "html": "<p>hi</p>" })).await;
    let pen_id = pen["id"].as_str().unwrap().to_string();
    assert_eq!(pen["isPublic"], true);
    assert_eq!(pen["userId"], alice_id);

    // Another user cannot mutate it.
    let res = client
        .patch(srv.url(&format!("/api/pens/{pen_id}")))
        .bearer_auth(&bob)
        .json(&json!({ "title": "Mine now" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(srv.url(&format!("/api/pens/{pen_id}")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Owner can update then delete.
    let res = client
        .patch(srv.url(&format!("/api/pens/{pen_id}")))
        .bearer_auth(&alice)
        .json(&json!({ "css": "p { color: red }" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["title"], "Hello");
    assert_eq!(updated["css"], "p { color: red }");

    let res = client
        .delete(srv.url(&format!("/api/pens/{pen_id}")))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], pen_id);

    let res = client
        .get(srv.url(&format!("/api/pens/{pen_id}")))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Logout, then the same token is refused.
    let res = client
        .post(srv.url("/api/users/logout"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["username"], "alice");

    let res = client
        .get(srv.url("/api/users/me"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "token invalidated");

    // Bob's session is unaffected.
    let res = client
        .get(srv.url("/api/users/me"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn pen_owner_comes_from_the_token_not_the_body() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (alice_id, alice) = signup(&client, &srv, "alice").await;
    let (bob_id, bob) = signup(&client, &srv, "bob").await;

    let pen = create_pen(
        &client,
        &srv,
        &alice,
        json!({ "title": "Forged", "userId": bob_id }),
    )
    .await;
    assert_eq!(pen["userId"], alice_id);

    // Bob cannot delete it even though his id was in the body.
    let res = client
        .delete(srv.url(&format!("/api/pens/{}", pen["id"].as_str().unwrap())))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn private_pens_are_hidden_from_other_users() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (alice_id, alice) = signup(&client, &srv, "alice").await;
    let (_bob_id, bob) = signup(&client, &srv, "bob").await;

    create_pen(&client, &srv, &alice, json!({ "title": "Open" })).await;
    let secret = create_pen(&client, &srv, &alice, json!({ "title": "Secret", "isPublic": false })).await;
    let secret_id = secret["id"].as_str().unwrap();

    let res = client
        .get(srv.url(&format!("/api/pens/{secret_id}")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(srv.url(&format!("/api/pens/user/{alice_id}")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    let seen_by_bob: Value = res.json().await.unwrap();
    assert_eq!(seen_by_bob.as_array().unwrap().len(), 1);

    let res = client
        .get(srv.url(&format!("/api/pens/user/{alice_id}")))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    let seen_by_alice: Value = res.json().await.unwrap();
    assert_eq!(seen_by_alice.as_array().unwrap().len(), 2);

    // Public feed needs no token and carries the author.
    let res = client.get(srv.url("/api/pens/public")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let feed: Value = res.json().await.unwrap();
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["title"], "Open");
    assert_eq!(feed[0]["user"]["username"], "alice");
}

#[tokio::test]
async fn batch_delete_is_all_or_nothing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (_alice_id, alice) = signup(&client, &srv, "alice").await;
    let (_bob_id, bob) = signup(&client, &srv, "bob").await;

    let a1 = create_pen(&client, &srv, &alice, json!({ "title": "a1" })).await;
    let a2 = create_pen(&client, &srv, &alice, json!({ "title": "a2" })).await;
    let b1 = create_pen(&client, &srv, &bob, json!({ "title": "b1" })).await;

    let res = client
        .post(srv.url("/api/pens/batch-delete"))
        .bearer_auth(&alice)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // One foreign id poisons the whole batch.
    let res = client
        .post(srv.url("/api/pens/batch-delete"))
        .bearer_auth(&alice)
        .json(&json!({ "ids": [a1["id"], b1["id"]] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // So does an id that does not exist.
    let res = client
        .post(srv.url("/api/pens/batch-delete"))
        .bearer_auth(&alice)
        .json(&json!({ "ids": [a1["id"], "0190b3f5-0000-7000-8000-000000000000"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(srv.url(&format!("/api/pens/{}", a1["id"].as_str().unwrap())))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(srv.url("/api/pens/batch-delete"))
        .bearer_auth(&alice)
        .json(&json!({ "ids": [a1["id"], a2["id"]] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["deleted"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn tampered_and_foreign_tokens_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (_id, token) = signup(&client, &srv, "alice").await;

    // Flip one character of the signature segment.
    let mut bytes = token.into_bytes();
    let i = bytes.len() - 5;
    bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).unwrap();

    let res = client
        .get(srv.url("/api/users/me"))
        .bearer_auth(&tampered)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "invalid token");

    let res = client
        .get(srv.url("/api/users/me"))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
