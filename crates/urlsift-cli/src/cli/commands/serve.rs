//! `urlsift serve` – HTTP prediction endpoint.
//!
//! `POST /predict` takes `{"url": "..."}` regardless of content type and answers with a
//! [`PredictionResponse`]; `GET /health` answers `ok`. The model is loaded once and shared
//! read-only by every request.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use urlsift_core::config::UrlsiftConfig;
use urlsift_core::ensemble::Model;
use urlsift_core::features::extract;

use super::PredictionResponse;

#[derive(Clone)]
struct AppState {
    model: Arc<Model>,
}

type ApiError = (StatusCode, Json<Value>);

fn router(model: Arc<Model>, cors_permissive: bool) -> Router {
    let app = Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(AppState { model });
    if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

pub async fn run_serve(
    cfg: &UrlsiftConfig,
    model_path: Option<PathBuf>,
    bind: Option<String>,
) -> Result<()> {
    let path = match model_path {
        Some(p) => p,
        None => cfg.resolved_model_path()?,
    };
    let model = Arc::new(Model::load_from_path(&path)?);
    let app = router(model, cfg.server.cors_permissive);

    let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, model = %path.display(), "serving predictions");
    println!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;

    tracing::info!("server shut down");
    Ok(())
}

async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionResponse>, ApiError> {
    let url = url_from_body(&body).map_err(|msg| {
        tracing::debug!(error = %msg, "rejected predict request");
        (StatusCode::BAD_REQUEST, Json(json!({ "error": msg })))
    })?;
    let prediction = state.model.predict(&extract(&url));
    tracing::debug!(
        url = %url,
        label = %prediction.label,
        malicious = prediction.probabilities.malicious,
        "prediction"
    );
    Ok(Json(PredictionResponse::new(url, &prediction)))
}

async fn health() -> &'static str {
    "ok"
}

/// The `url` member of a JSON object body. Absent or null means the empty string.
fn url_from_body(body: &[u8]) -> Result<String, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| format!("invalid JSON body: {e}"))?;
    let Value::Object(mut fields) = value else {
        return Err("JSON body must be an object".to_string());
    };
    match fields.remove("url") {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(url)) => Ok(url),
        Some(_) => Err("`url` must be a string".to_string()),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("could not listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::warn!("could not listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
