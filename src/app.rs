use std::net::SocketAddr;

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower_http::{cors::CorsLayer, services::ServeFile, trace::TraceLayer};

use crate::state::AppState;
use crate::{oauth, students, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(oauth::router())
        .nest(
            "/api",
            Router::new()
                .route("/hello", get(hello))
                .merge(users::router())
                .merge(students::router()),
        )
        .route_service("/", ServeFile::new("public/login.html"))
        .route_service("/login.html", ServeFile::new("public/login.html"))
        .route_service(
            "/access-denied.html",
            ServeFile::new("public/access-denied.html"),
        )
        .route_service("/interview.html", ServeFile::new("public/interview.html"))
        .route_service("/script.js", ServeFile::new("public/script.js"))
        .route_service("/interview.js", ServeFile::new("public/interview.js"))
        // Anything no route matches gets the JSON 404 envelope.
        .fallback(fallback_404)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "timestamp": OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
    }))
}

/// `GET /api/hello`: liveness ping with the build version and environment.
async fn hello(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": "Hello from the API!",
        "data": {
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.config.environment,
        },
    }))
}

async fn fallback_404(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Route not found",
            "path": uri.path(),
            "method": method.as_str(),
        })),
    )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "3000".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not install ctrl-c handler");
    }
}
