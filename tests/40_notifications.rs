mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn notifications_require_a_session_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for (method, path) in [
        ("GET", "/admin/notifications"),
        ("POST", "/admin/notifications/seen"),
        ("GET", "/admin/notifications/stream"),
    ] {
        let req = match method {
            "GET" => client.get(format!("{}{}", server.base_url, path)),
            _ => client.post(format!("{}{}", server.base_url, path)),
        };
        let res = req.send().await?;
        assert_eq!(
            res.status(),
            StatusCode::UNAUTHORIZED,
            "{} {} should be privileged",
            method,
            path
        );
    }

    Ok(())
}

#[tokio::test]
async fn unread_counter_is_reported_and_mark_seen_zeroes_it() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::session_token(server).await?;

    let res = client
        .get(format!("{}/admin/notifications", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert!(body["unread"].is_u64(), "body: {}", body);

    // Mark seen, twice: the second call must be a no-op, not an error
    for _ in 0..2 {
        let res = client
            .post(format!("{}/admin/notifications/seen", server.base_url))
            .bearer_auth(&token)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);

        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["unread"], 0, "body: {}", body);
    }

    Ok(())
}

#[tokio::test]
async fn event_stream_opens_with_a_valid_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::session_token(server).await?;

    let res = client
        .get(format!("{}/admin/notifications/stream", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(
        content_type.starts_with("text/event-stream"),
        "unexpected content type: {}",
        content_type
    );

    // Dropping the response cancels the subscription
    drop(res);
    Ok(())
}
