mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use uptime_api::auth::now_ms;

use common::{new_user_payload, TestServer, PASSWORD, PHONE};

async fn register(server: &TestServer, client: &reqwest::Client) -> Result<()> {
    let res = client
        .post(server.url("api/users"))
        .json(&new_user_payload())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn end_to_end_register_login_read() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    register(&server, &client).await?;

    let before = now_ms();
    let res = client
        .post(server.url("api/tokens"))
        .json(&json!({"phone": PHONE, "password": PASSWORD}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let token = res.json::<Value>().await?;
    let id = token["id"].as_str().unwrap_or_default();
    assert_eq!(id.len(), 20);
    assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    assert_eq!(token["phone"], PHONE);

    let expires = token["expires"].as_i64().unwrap_or_default();
    assert!(expires > now_ms());
    assert!((expires - (before + 3_600_000)).abs() < 5_000);
    assert!(server.record_path("tokens", id).exists());

    let res = client
        .get(server.url("api/tokens"))
        .query(&[("id", id)])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, token);

    let res = client
        .get(server.url("api/users"))
        .query(&[("phone", PHONE)])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.json::<Value>().await?.get("hashedPassword").is_none());
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_rejected_without_token() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    register(&server, &client).await?;

    let res = client
        .post(server.url("api/tokens"))
        .json(&json!({"phone": PHONE, "password": "wrong"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let tokens_dir = server.data_dir.path().join("data").join("tokens");
    assert_eq!(std::fs::read_dir(tokens_dir)?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn extend_live_token_and_refuse_expired_one() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    register(&server, &client).await?;

    let token = client
        .post(server.url("api/tokens"))
        .json(&json!({"phone": PHONE, "password": PASSWORD}))
        .send()
        .await?
        .json::<Value>()
        .await?;
    let id = token["id"].as_str().unwrap_or_default().to_string();
    let original_expiry = token["expires"].as_i64().unwrap_or_default();

    let res = client
        .put(server.url("api/tokens"))
        .json(&json!({"id": id, "extend": true}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let extended = client
        .get(server.url("api/tokens"))
        .query(&[("id", id.as_str())])
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert!(extended["expires"].as_i64().unwrap_or_default() > original_expiry);

    // Rewind the stored expiry into the past
    let expired_at = now_ms() - 1_000;
    let path = server.record_path("tokens", &id);
    std::fs::write(
        &path,
        serde_json::to_vec(&json!({"id": id, "phone": PHONE, "expires": expired_at}))?,
    )?;

    let res = client
        .put(server.url("api/tokens"))
        .json(&json!({"id": id, "extend": true}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let stored: Value = serde_json::from_slice(&std::fs::read(&path)?)?;
    assert_eq!(stored["expires"], expired_at);
    Ok(())
}

#[tokio::test]
async fn delete_token_twice() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    register(&server, &client).await?;

    let token = client
        .post(server.url("api/tokens"))
        .json(&json!({"phone": PHONE, "password": PASSWORD}))
        .send()
        .await?
        .json::<Value>()
        .await?;
    let id = token["id"].as_str().unwrap_or_default().to_string();

    let res = client
        .delete(server.url("api/tokens"))
        .query(&[("id", id.as_str())])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(server.url("api/tokens"))
        .query(&[("id", id.as_str())])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(server.url("api/tokens"))
        .query(&[("id", id.as_str())])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
