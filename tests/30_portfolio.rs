mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn public_read_views_respond() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in [
        "/api/portfolio/personal-info",
        "/api/portfolio/projects",
        "/api/portfolio/skills",
        "/api/portfolio/work-experience",
    ] {
        let res = client
            .get(format!("{}{}", server.base_url, path))
            .send()
            .await?;

        // 200 with a live database; 500 without one. Never 401: these views
        // are public.
        assert!(
            res.status() == StatusCode::OK || res.status() == StatusCode::INTERNAL_SERVER_ERROR,
            "{}: unexpected status {}",
            path,
            res.status()
        );

        let body = res.json::<serde_json::Value>().await?;
        if body["success"] == true {
            assert!(body.get("data").is_some(), "{}: missing data: {}", path, body);
        }
    }

    Ok(())
}

#[tokio::test]
async fn contact_rejects_invalid_email_before_touching_storage() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/contact", server.base_url))
        .json(&json!({ "email": "not-an-email", "message": "hello" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "BAD_REQUEST", "body: {}", body);

    Ok(())
}

#[tokio::test]
async fn contact_rejects_empty_message() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/contact", server.base_url))
        .json(&json!({ "email": "visitor@example.com", "message": "   " }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn contact_accepts_a_plausible_inquiry() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/contact", server.base_url))
        .json(&json!({
            "email": "visitor@example.com",
            "message": "Interested in working together"
        }))
        .send()
        .await?;

    // 201 with a live database; 500 without one
    assert!(
        res.status() == StatusCode::CREATED
            || res.status() == StatusCode::INTERNAL_SERVER_ERROR,
        "unexpected status: {}",
        res.status()
    );

    if res.status() == StatusCode::CREATED {
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["success"], true, "body: {}", body);
        assert_eq!(body["data"]["email"], "visitor@example.com", "body: {}", body);
        assert!(body["data"]["id"].is_string(), "generated id: {}", body);
    }

    Ok(())
}

#[tokio::test]
async fn root_endpoint_describes_the_api() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(&server.base_url).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert!(body["data"]["endpoints"].is_object(), "body: {}", body);

    Ok(())
}
