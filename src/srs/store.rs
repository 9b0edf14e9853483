use chrono::NaiveDateTime;
use thiserror::Error;

use crate::srs::card::{CardContent, CardSource, CardType, ReviewRecord, SrsCard};

/// Failures at the persistence seam. The scheduler translates these into
/// its own taxonomy; handlers never see a `StoreError` directly.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A bounded wait elapsed (pool checkout, lock acquisition). Nothing
    /// in the store is allowed to block indefinitely.
    #[error("persistence operation timed out")]
    Timeout,
    /// The optimistic version check failed: someone else wrote the card
    /// between our read and our write.
    #[error("card version conflict")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence interface for cards and their review history.
///
/// The scheduler receives an implementation at construction and owns no
/// ambient connection state. Every operation is scoped to one owning
/// user; a card that exists but belongs to someone else behaves exactly
/// like a card that does not exist.
pub trait CardStore {
    fn load_card(&self, user_id: i32, card_id: i32) -> Result<Option<SrsCard>, StoreError>;

    fn insert_card(
        &self,
        user_id: i32,
        card_type: CardType,
        content: CardContent,
        source: Option<CardSource>,
        now: NaiveDateTime,
    ) -> Result<SrsCard, StoreError>;

    /// Compare-and-set write of a card's mutable fields. Succeeds only if
    /// the stored version still equals `expected_version`, and bumps the
    /// version by one as part of the same write.
    fn save_card(&self, card: &SrsCard, expected_version: i32) -> Result<(), StoreError>;

    fn delete_card(&self, user_id: i32, card_id: i32) -> Result<bool, StoreError>;

    /// Append-only; review rows are never updated or removed.
    fn append_review(&self, record: &ReviewRecord) -> Result<(), StoreError>;

    /// Cards with `due_at <= now`. Callers must not rely on the order;
    /// the due-set selector re-sorts.
    fn due_cards(&self, user_id: i32, now: NaiveDateTime) -> Result<Vec<SrsCard>, StoreError>;

    fn all_cards(&self, user_id: i32) -> Result<Vec<SrsCard>, StoreError>;

    fn reviews_since(
        &self,
        user_id: i32,
        since: NaiveDateTime,
    ) -> Result<Vec<ReviewRecord>, StoreError>;
}
