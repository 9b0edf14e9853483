use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::srs::engine::SchedulingState;

/// What kind of knowledge a card drills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Vocabulary,
    Sentence,
    Grammar,
    MedicalTerm,
    Custom,
}

impl CardType {
    pub fn as_str(self) -> &'static str {
        match self {
            CardType::Vocabulary => "vocabulary",
            CardType::Sentence => "sentence",
            CardType::Grammar => "grammar",
            CardType::MedicalTerm => "medical_term",
            CardType::Custom => "custom",
        }
    }

    /// Storage may hold values written by newer builds; anything
    /// unrecognized reads back as `Custom` instead of failing the row.
    pub fn parse(raw: &str) -> CardType {
        match raw {
            "vocabulary" => CardType::Vocabulary,
            "sentence" => CardType::Sentence,
            "grammar" => CardType::Grammar,
            "medical_term" => CardType::MedicalTerm,
            _ => CardType::Custom,
        }
    }
}

impl Default for CardType {
    fn default() -> Self {
        CardType::Vocabulary
    }
}

/// The prompt/answer payload of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContent {
    pub front: String,
    pub back: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinyin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Weak link back to the content a card was created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSource {
    pub source_type: String,
    pub source_id: i32,
}

/// A reviewable card owned by one user.
///
/// `version` increments on every write and backs the optimistic
/// concurrency check in the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SrsCard {
    pub card_id: i32,
    pub user_id: i32,
    pub card_type: CardType,
    #[serde(flatten)]
    pub content: CardContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CardSource>,
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetitions: i32,
    pub due_at: NaiveDateTime,
    #[serde(skip)]
    pub version: i32,
    pub created_at: NaiveDateTime,
}

impl SrsCard {
    pub fn scheduling(&self) -> SchedulingState {
        SchedulingState {
            ease_factor: self.ease_factor,
            interval_days: self.interval_days,
            repetitions: self.repetitions,
        }
    }

    pub fn apply(&mut self, state: SchedulingState, due_at: NaiveDateTime) {
        self.ease_factor = state.ease_factor;
        self.interval_days = state.interval_days;
        self.repetitions = state.repetitions;
        self.due_at = due_at;
    }
}

/// Everything a user supplies when adding a card; scheduling state and
/// identity are filled in by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct CardDraft {
    #[serde(default)]
    pub card_type: CardType,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub pinyin: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub source: Option<CardSource>,
}

impl CardDraft {
    pub fn into_content(self) -> (CardType, CardContent, Option<CardSource>) {
        (
            self.card_type,
            CardContent {
                front: self.front,
                back: self.back,
                pinyin: self.pinyin,
                example: self.example,
                notes: self.notes,
            },
            self.source,
        )
    }
}

/// Immutable record of one review event, with the scheduling transition
/// snapshotted for auditability. Never mutated or deleted; the review
/// history is the source of truth for retention statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRecord {
    pub card_id: i32,
    pub user_id: i32,
    pub quality: i32,
    pub previous_interval: i32,
    pub new_interval: i32,
    pub previous_ease: f64,
    pub new_ease: f64,
    pub reviewed_at: NaiveDateTime,
}
