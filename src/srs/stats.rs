use chrono::NaiveDateTime;
use serde::Serialize;

use crate::srs::card::{ReviewRecord, SrsCard};
use crate::srs::quality::ReviewQuality;

/// Aggregate view of a user's study state. Derived on demand, never
/// stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewStats {
    /// Cards with `due_at <= now`.
    pub due_now: i64,
    /// Cards coming due by the end of the current day.
    pub due_today: i64,
    /// Reviews completed since the start of the current day.
    pub reviews_today: i64,
    pub total_cards: i64,
    /// Fraction of all reviews graded at or above passing; absent until
    /// the first review exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_rate: Option<f64>,
}

pub fn compute(cards: &[SrsCard], reviews: &[ReviewRecord], now: NaiveDateTime) -> ReviewStats {
    let start_of_day = now.date().and_hms_opt(0, 0, 0).unwrap_or(now);
    let end_of_day = now.date().and_hms_opt(23, 59, 59).unwrap_or(now);

    let due_now = cards.iter().filter(|card| card.due_at <= now).count() as i64;
    let due_today = cards.iter().filter(|card| card.due_at <= end_of_day).count() as i64;
    let reviews_today = reviews
        .iter()
        .filter(|review| review.reviewed_at >= start_of_day)
        .count() as i64;

    let retention_rate = if reviews.is_empty() {
        None
    } else {
        let passed = reviews
            .iter()
            .filter(|review| review.quality >= ReviewQuality::PASSING)
            .count();
        Some(passed as f64 / reviews.len() as f64)
    };

    ReviewStats {
        due_now,
        due_today,
        reviews_today,
        total_cards: cards.len() as i64,
        retention_rate,
    }
}
