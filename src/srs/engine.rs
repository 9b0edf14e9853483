use serde::{Deserialize, Serialize};

use crate::srs::quality::ReviewQuality;

/// Ease factors never drop below this, however badly a card is graded.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Starting ease for a freshly created card.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// The scheduling fields of a card, as fed to and produced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulingState {
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetitions: i32,
}

impl SchedulingState {
    pub fn new_card() -> Self {
        SchedulingState {
            ease_factor: INITIAL_EASE_FACTOR,
            interval_days: 0,
            repetitions: 0,
        }
    }
}

/// One SM-2 transition. Pure: no clock, no I/O.
///
/// The ease update applies on pass and fail alike:
/// `ef' = ef + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))`, floored at 1.3.
/// A failing grade (q < 3) resets the repetition ladder to a one-day
/// interval; a passing grade advances it: 1 day, then 6 days, then
/// `round(interval * ef')`.
pub fn next_state(state: SchedulingState, quality: ReviewQuality) -> SchedulingState {
    let q = quality.grade() as f64;
    let ease_delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    let ease_factor = (state.ease_factor + ease_delta).max(MIN_EASE_FACTOR);

    let (interval_days, repetitions) = if !quality.is_passing() {
        (1, 0)
    } else {
        let interval = match state.repetitions {
            0 => 1,
            1 => 6,
            _ => (state.interval_days as f64 * ease_factor).round() as i32,
        };
        (interval, state.repetitions + 1)
    };

    SchedulingState {
        ease_factor,
        interval_days,
        repetitions,
    }
}
