use axum::{routing::get, routing::post, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use portfolio_api::handlers;
use portfolio_api::middleware::session_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, ADMIN_ACCESS_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = portfolio_api::config::config();
    tracing::info!("Starting portfolio API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORTFOLIO_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("Portfolio API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(portfolio_routes())
        // Privileged admin surface
        .merge(admin_routes())
        // Global middleware: the site frontend may be served from anywhere,
        // so CORS stays permissive
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    Router::new().route("/auth/validate-key", post(handlers::auth::validate_key))
}

fn portfolio_routes() -> Router {
    use handlers::portfolio;

    Router::new()
        .route("/api/portfolio/personal-info", get(portfolio::personal_info))
        .route("/api/portfolio/projects", get(portfolio::projects))
        .route(
            "/api/portfolio/projects/:id/skills",
            get(portfolio::project_skills),
        )
        .route("/api/portfolio/skills", get(portfolio::skills))
        .route(
            "/api/portfolio/work-experience",
            get(portfolio::work_experience),
        )
        .route("/api/contact", post(portfolio::submit_contact))
}

fn admin_routes() -> Router {
    use handlers::admin;

    Router::new()
        .route("/admin/operations", post(admin::operations))
        .route("/admin/notifications", get(admin::notifications))
        .route("/admin/notifications/seen", post(admin::notifications_seen))
        .route(
            "/admin/notifications/stream",
            get(admin::notifications_stream),
        )
        // Every privileged route verifies the session token
        .route_layer(axum::middleware::from_fn(session_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Portfolio API",
            "version": version,
            "description": "Backend for a personal portfolio site (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/validate-key (public - admin key exchange)",
                "portfolio": "/api/portfolio/* (public read views)",
                "contact": "/api/contact (public)",
                "admin": "/admin/operations, /admin/notifications* (requires session token)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match portfolio_api::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
