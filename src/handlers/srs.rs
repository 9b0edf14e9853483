use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Extension, Router};
use chrono::Utc;
use std::sync::Arc;
use tera::Context;

use crate::data::models::card_models::ApiError;
use crate::data::models::{ApiResponse, DueResponse, ReviewRequest, ReviewResponse};
use crate::srs::{CardDraft, SrsCard};
use crate::utils::{self, render_template};
use crate::Scheduler;

async fn current_user(session: &tower_sessions::Session) -> Result<i32, ApiError> {
    utils::get_current_user_id(session)
        .await
        .ok_or(ApiError::NotLoggedIn)
}

pub async fn review_page(
    Extension(templates): Extension<Arc<tera::Tera>>,
    session: tower_sessions::Session,
) -> impl IntoResponse {
    let mut context = Context::new();
    context.insert("logged_in", &utils::is_logged_in(&session).await);
    render_template(&templates, "review.html", context)
}

pub async fn create_card(
    State(scheduler): State<Scheduler>,
    session: tower_sessions::Session,
    Json(draft): Json<CardDraft>,
) -> Result<Json<SrsCard>, ApiError> {
    let user_id = current_user(&session).await?;
    let card = scheduler.create_card(user_id, draft, Utc::now().naive_utc())?;
    Ok(Json(card))
}

pub async fn list_cards(
    State(scheduler): State<Scheduler>,
    session: tower_sessions::Session,
) -> Result<Json<Vec<SrsCard>>, ApiError> {
    let user_id = current_user(&session).await?;
    Ok(Json(scheduler.list_cards(user_id)?))
}

pub async fn delete_card(
    State(scheduler): State<Scheduler>,
    session: tower_sessions::Session,
    Path(card_id): Path<i32>,
) -> Result<Json<ApiResponse>, ApiError> {
    let user_id = current_user(&session).await?;
    scheduler.delete_card(user_id, card_id)?;
    Ok(Json(ApiResponse {
        success: true,
        message: "Card deleted".to_string(),
    }))
}

/// One grading action from the review session.
pub async fn review_card(
    State(scheduler): State<Scheduler>,
    session: tower_sessions::Session,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let user_id = current_user(&session).await?;
    let card = scheduler.review(
        user_id,
        payload.card_id,
        payload.quality,
        Utc::now().naive_utc(),
    )?;
    Ok(Json(ReviewResponse::from(&card)))
}

pub async fn due_cards(
    State(scheduler): State<Scheduler>,
    session: tower_sessions::Session,
) -> Result<Json<DueResponse>, ApiError> {
    let user_id = current_user(&session).await?;
    let cards = scheduler.due_cards(user_id, Utc::now().naive_utc())?;
    Ok(Json(DueResponse {
        count: cards.len(),
        cards,
    }))
}

pub async fn stats(
    State(scheduler): State<Scheduler>,
    session: tower_sessions::Session,
) -> Result<Json<crate::srs::ReviewStats>, ApiError> {
    let user_id = current_user(&session).await?;
    Ok(Json(scheduler.stats(user_id, Utc::now().naive_utc())?))
}

pub fn api_router(scheduler: Scheduler) -> Router {
    Router::new()
        .route("/cards", get(list_cards).post(create_card))
        .route("/cards/{card_id}", delete(delete_card))
        .route("/review", post(review_card))
        .route("/due", get(due_cards))
        .route("/stats", get(stats))
        .with_state(scheduler)
}
