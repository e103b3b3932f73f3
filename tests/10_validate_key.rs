mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    // We consider OK or SERVICE_UNAVAILABLE acceptable as a basic liveness check
    assert!(
        res.status() == StatusCode::OK || res.status() == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        res.status()
    );

    // Should be valid JSON
    let _body = res.json::<serde_json::Value>().await?;
    Ok(())
}

#[tokio::test]
async fn wrong_key_is_denied_without_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/validate-key", server.base_url))
        .json(&json!({ "key": "foo" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["valid"], false, "body: {}", body);
    assert!(body["sessionToken"].is_null(), "body: {}", body);
    assert!(body["expiresAt"].is_null(), "body: {}", body);

    Ok(())
}

#[tokio::test]
async fn correct_key_mints_session_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let before = chrono::Utc::now().timestamp_millis();
    let res = client
        .post(format!("{}/auth/validate-key", server.base_url))
        .json(&json!({ "key": common::TEST_ADMIN_KEY }))
        .send()
        .await?;
    let after = chrono::Utc::now().timestamp_millis();

    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["valid"], true, "body: {}", body);

    // Token shape: "<issue-ms>-<32 hex chars>"
    let token = body["sessionToken"].as_str().expect("sessionToken");
    let (ts, digest) = token.split_once('-').expect("token separator");
    let issued: i64 = ts.parse()?;
    assert!(issued >= before && issued <= after, "issue time out of range");
    assert_eq!(digest.len(), 32);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));

    // Expiry is exactly issue + 24h
    let expires_at = body["expiresAt"].as_i64().expect("expiresAt");
    assert_eq!(expires_at, issued + 24 * 60 * 60 * 1000);

    Ok(())
}

#[tokio::test]
async fn missing_key_is_bad_request() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/validate-key", server.base_url))
        .json(&json!({}))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["valid"], false, "body: {}", body);
    assert!(body.get("error").is_some(), "body: {}", body);

    Ok(())
}

#[tokio::test]
async fn empty_key_is_bad_request() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/validate-key", server.base_url))
        .json(&json!({ "key": "" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn repeated_logins_each_mint_a_token() -> Result<()> {
    let server = common::ensure_server().await?;

    let first = common::session_token(server).await?;
    let second = common::session_token(server).await?;

    // Tokens issued in the same millisecond are identical by construction;
    // both must verify, which the admin surface tests exercise. Here we only
    // check both came back well-formed.
    for token in [&first, &second] {
        let (ts, digest) = token.split_once('-').expect("token separator");
        assert!(ts.parse::<i64>().is_ok());
        assert_eq!(digest.len(), 32);
    }

    Ok(())
}
