//! HTTP surface: `POST /dados` ingests one record, `GET /dados` lists them all.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::ListingErrors;
use crate::errors::IngestError;
use crate::record::{self, Collection};

pub const DADOS_ROUTE: &str = "/dados";

/// Body of a successful ingestion.
#[derive(Debug, Serialize)]
pub struct IngestSuccess {
    pub status: &'static str,
    pub total: usize,
}

/// `{"status":"erro","detalhe":..}` error body.
#[derive(Debug, Serialize)]
pub struct IngestFailure {
    pub status: &'static str,
    pub detalhe: String,
}

impl IngestFailure {
    fn from_error(err: &IngestError) -> Self {
        Self {
            status: "erro",
            detalhe: err.to_string(),
        }
    }
}

/// Records are accepted whatever their size; there is no body cap.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(DADOS_ROUTE, get(list_records).post(ingest_record))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ingest_record(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match body {
        Ok(body) => {
            tracing::info!(payload = %String::from_utf8_lossy(&body), "received record");
            ingest(&state, &body).await
        }
        Err(rejection) => Err(IngestError::bad_request(format!(
            "could not read request body: {}",
            rejection.body_text()
        ))),
    };

    match result {
        Ok(total) => (
            StatusCode::OK,
            Json(IngestSuccess {
                status: "sucesso",
                total,
            }),
        )
            .into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to ingest record");
            (StatusCode::BAD_REQUEST, Json(IngestFailure::from_error(&err))).into_response()
        }
    }
}

async fn ingest(state: &AppState, body: &[u8]) -> Result<usize, IngestError> {
    let rec = record::stamp(record::parse_object(body)?);
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || store.append(rec)).await?
}

async fn list_records(State(state): State<AppState>) -> Result<Json<Collection>, Response> {
    let store = state.store.clone();
    let loaded = match tokio::task::spawn_blocking(move || store.load()).await {
        Ok(result) => result,
        Err(join_err) => Err(IngestError::from(join_err)),
    };

    loaded.map(Json).map_err(|err| {
        tracing::error!(error = %err, "failed to list records");
        match state.listing_errors {
            ListingErrors::Passthrough => err.into_response(),
            ListingErrors::Envelope => {
                (err.status_code(), Json(IngestFailure::from_error(&err))).into_response()
            }
        }
    })
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
