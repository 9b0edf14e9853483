use axum::extract::{Json, State};
use chrono::Utc;

use crate::data::models::card_models::ApiError;
use crate::features::recommend::{Recommendation, RecommendationEngine, CATALOG};
use crate::utils;
use crate::Scheduler;

const MAX_RECOMMENDATIONS: usize = 5;

pub async fn recommendations(
    State(scheduler): State<Scheduler>,
    session: tower_sessions::Session,
) -> Result<Json<Vec<Recommendation>>, ApiError> {
    let user_id = utils::get_current_user_id(&session)
        .await
        .ok_or(ApiError::NotLoggedIn)?;
    let stats = scheduler.stats(user_id, Utc::now().naive_utc())?;
    Ok(Json(RecommendationEngine::recommend(
        &stats,
        CATALOG,
        MAX_RECOMMENDATIONS,
    )))
}
