//! HTTP routes over the installed translator.
//!
//! Translation goes through [`engine::installed`], so until the lexicon is
//! installed every translate call answers 503 like `/healthz` does.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::engine::{self, TranslateError, TranslationOutcome};
use crate::normalize::normalize_text;

pub const DEFAULT_MAX_INPUT_CHARS: usize = 500;

#[derive(Clone)]
pub struct AppState {
    pub max_input_chars: usize,
}

#[derive(Deserialize)]
pub struct TranslateRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct NormalizeQuery {
    pub text: String,
}

#[derive(Serialize)]
pub struct NormalizeResponse {
    text: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/translate", get(translate_query).post(translate_json))
        .route("/v1/normalize", get(normalize))
        .with_state(state)
}

async fn healthz() -> Response {
    if engine::is_ready() {
        "ok".into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "lexicon not loaded").into_response()
    }
}

async fn translate_json(
    State(state): State<AppState>,
    body: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    translate(&state, &request.text)
}

async fn translate_query(
    State(state): State<AppState>,
    query: Result<Query<TranslateRequest>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(request) = query.map_err(|_| ApiError::bad_request("text is required"))?;
    translate(&state, &request.text)
}

fn translate(state: &AppState, text: &str) -> Result<Response, ApiError> {
    check_length(text, state.max_input_chars)?;

    match engine::installed().and_then(|translator| translator.translate(text)) {
        Ok(translation) => {
            if translation.degraded() {
                debug!(
                    unknown = ?translation.unknown_words,
                    "translated with untranslated words"
                );
            }
            let outcome = TranslationOutcome::from(translation);
            Ok(Json(outcome).into_response())
        }
        Err(err) => {
            info!(kind = ?err.kind(), "translation failed: {err}");
            Err(ApiError::Translation(err))
        }
    }
}

async fn normalize(
    State(state): State<AppState>,
    query: Result<Query<NormalizeQuery>, QueryRejection>,
) -> Result<Json<NormalizeResponse>, ApiError> {
    let Query(params) = query.map_err(|_| ApiError::bad_request("text is required"))?;
    check_length(&params.text, state.max_input_chars)?;
    Ok(Json(NormalizeResponse {
        text: normalize_text(&params.text),
    }))
}

fn check_length(text: &str, max: usize) -> Result<(), ApiError> {
    if text.chars().count() > max {
        return Err(ApiError::bad_request(format!(
            "text must be at most {max} characters"
        )));
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Translation(#[from] TranslateError),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Translation(err) => {
                let status = match err {
                    TranslateError::LexiconNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                let body = Json(TranslationOutcome::from(err));
                (status, body).into_response()
            }
        }
    }
}
