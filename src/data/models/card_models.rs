use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::srs::{SrsCard, SrsError};

/// Grading request sent by the review session UI.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub card_id: i32,
    pub quality: i32,
}

/// The rescheduled state handed back after a grading action.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub card_id: i32,
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetitions: i32,
    pub due_at: NaiveDateTime,
}

impl From<&SrsCard> for ReviewResponse {
    fn from(card: &SrsCard) -> Self {
        ReviewResponse {
            card_id: card.card_id,
            ease_factor: card.ease_factor,
            interval_days: card.interval_days,
            repetitions: card.repetitions,
            due_at: card.due_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DueResponse {
    pub count: usize,
    pub cards: Vec<SrsCard>,
}

/// Standard API response format
#[derive(Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

/// Error surface of the `/api/srs` handlers.
#[derive(Debug)]
pub enum ApiError {
    NotLoggedIn,
    Srs(SrsError),
}

impl From<SrsError> for ApiError {
    fn from(err: SrsError) -> Self {
        ApiError::Srs(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotLoggedIn => {
                let body = json!({
                    "error": "Not logged in",
                    "status": StatusCode::UNAUTHORIZED.as_u16(),
                    "retryable": false
                });
                (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
            }
            ApiError::Srs(err) => err.into_response(),
        }
    }
}

impl IntoResponse for SrsError {
    fn into_response(self) -> Response {
        let status = match self {
            SrsError::InvalidQuality(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SrsError::CardNotFound => StatusCode::NOT_FOUND,
            // Recoverable: the client re-reads the card and grades again.
            SrsError::StaleCardState => StatusCode::CONFLICT,
            // Transient: the client may retry with backoff.
            SrsError::PersistenceTimeout => StatusCode::SERVICE_UNAVAILABLE,
            SrsError::PartialWrite => StatusCode::INTERNAL_SERVER_ERROR,
            SrsError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let retryable = matches!(
            self,
            SrsError::StaleCardState | SrsError::PersistenceTimeout
        );
        let body = json!({
            "error": self.to_string(),
            "status": status.as_u16(),
            "retryable": retryable
        });
        (status, axum::Json(body)).into_response()
    }
}
