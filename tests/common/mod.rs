use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Admin key the spawned server is configured with
pub const TEST_ADMIN_KEY: &str = "secret123";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/portfolio-api");
        cmd.env("PORTFOLIO_API_PORT", port.to_string())
            .env("ADMIN_ACCESS_KEY", TEST_ADMIN_KEY)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL from .env
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Consider server ready on any non-404 response
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Login with the test admin key and return the minted session token
#[allow(dead_code)]
pub async fn session_token(server: &TestServer) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/auth/validate-key", server.base_url))
        .json(&serde_json::json!({ "key": TEST_ADMIN_KEY }))
        .send()
        .await?;

    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

    let body = res.json::<serde_json::Value>().await?;
    anyhow::ensure!(body["valid"] == true, "key not accepted: {}", body);

    body["sessionToken"]
        .as_str()
        .map(|s| s.to_string())
        .context("missing sessionToken in validation response")
}
