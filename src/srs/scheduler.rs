use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

use crate::srs::card::{CardDraft, ReviewRecord, SrsCard};
use crate::srs::engine;
use crate::srs::quality::{InvalidQuality, ReviewQuality};
use crate::srs::stats::{self, ReviewStats};
use crate::srs::store::{CardStore, StoreError};

#[derive(Error, Debug)]
pub enum SrsError {
    #[error(transparent)]
    InvalidQuality(#[from] InvalidQuality),
    #[error("card not found")]
    CardNotFound,
    /// Another session wrote the card between our read and our write.
    /// Recoverable: re-read the card and grade again.
    #[error("card was modified concurrently")]
    StaleCardState,
    #[error("persistence timed out")]
    PersistenceTimeout,
    /// The card update and its review record diverged and could not be
    /// reconciled. Must reach the user; silently ignoring it corrupts
    /// the review statistics.
    #[error("card updated but review history write failed")]
    PartialWrite,
    #[error("storage error: {0}")]
    Storage(anyhow::Error),
}

impl From<StoreError> for SrsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => SrsError::PersistenceTimeout,
            StoreError::Conflict => SrsError::StaleCardState,
            StoreError::NotFound => SrsError::CardNotFound,
            StoreError::Backend(e) => SrsError::Storage(e),
        }
    }
}

/// Applies SM-2 transitions to stored cards.
///
/// The store is injected at construction; the scheduler keeps no other
/// state, so one instance serves every request. Conflicting writes to
/// the same card are serialized by the store's version check rather
/// than by locking here.
pub struct SrsScheduler<S: CardStore> {
    store: S,
}

impl<S: CardStore> SrsScheduler<S> {
    pub fn new(store: S) -> Self {
        SrsScheduler { store }
    }

    /// Grades one card and reschedules it.
    ///
    /// The card update and the review-history append form one logical
    /// transaction: a failed append is retried once, then the card is
    /// rolled back to its pre-review state. Only when that rollback also
    /// fails does `PartialWrite` surface.
    pub fn review(
        &self,
        user_id: i32,
        card_id: i32,
        raw_quality: i32,
        now: NaiveDateTime,
    ) -> Result<SrsCard, SrsError> {
        let quality = ReviewQuality::try_from(raw_quality)?;
        let card = self
            .store
            .load_card(user_id, card_id)?
            .ok_or(SrsError::CardNotFound)?;

        let previous = card.scheduling();
        let next = engine::next_state(previous, quality);
        let due_at = now + Duration::days(next.interval_days as i64);

        let mut updated = card.clone();
        updated.apply(next, due_at);
        self.store.save_card(&updated, card.version)?;
        updated.version = card.version + 1;

        let record = ReviewRecord {
            card_id,
            user_id,
            quality: quality.grade(),
            previous_interval: previous.interval_days,
            new_interval: next.interval_days,
            previous_ease: previous.ease_factor,
            new_ease: next.ease_factor,
            reviewed_at: now,
        };

        if let Err(first) = self.store.append_review(&record) {
            log::warn!(
                "review append failed for card {card_id} (user {user_id}), retrying: {first}"
            );
            if self.store.append_review(&record).is_err() {
                // Undo the card update so state and history stay consistent.
                if self.store.save_card(&card, updated.version).is_err() {
                    log::error!(
                        "rollback failed for card {card_id} (user {user_id}); \
                         card and review history have diverged"
                    );
                    return Err(SrsError::PartialWrite);
                }
                return Err(first.into());
            }
        }

        Ok(updated)
    }

    /// All cards due at `now`, most overdue first, card id as the tie
    /// break. Read-only and safe to re-run; ordering is enforced here
    /// rather than trusted to the store.
    pub fn due_cards(&self, user_id: i32, now: NaiveDateTime) -> Result<Vec<SrsCard>, SrsError> {
        let mut cards = self.store.due_cards(user_id, now)?;
        cards.sort_by(|a, b| a.due_at.cmp(&b.due_at).then(a.card_id.cmp(&b.card_id)));
        Ok(cards)
    }

    pub fn stats(&self, user_id: i32, now: NaiveDateTime) -> Result<ReviewStats, SrsError> {
        let cards = self.store.all_cards(user_id)?;
        let reviews = self.store.reviews_since(user_id, NaiveDateTime::MIN)?;
        Ok(stats::compute(&cards, &reviews, now))
    }

    pub fn create_card(
        &self,
        user_id: i32,
        draft: CardDraft,
        now: NaiveDateTime,
    ) -> Result<SrsCard, SrsError> {
        let (card_type, content, source) = draft.into_content();
        Ok(self
            .store
            .insert_card(user_id, card_type, content, source, now)?)
    }

    pub fn delete_card(&self, user_id: i32, card_id: i32) -> Result<(), SrsError> {
        if self.store.delete_card(user_id, card_id)? {
            Ok(())
        } else {
            Err(SrsError::CardNotFound)
        }
    }

    pub fn list_cards(&self, user_id: i32) -> Result<Vec<SrsCard>, SrsError> {
        Ok(self.store.all_cards(user_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::card::{CardContent, CardSource, CardType};
    use crate::srs::memory::MemoryCardStore;
    use chrono::NaiveDate;
    use std::cell::Cell;
    use std::sync::Mutex;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn draft(front: &str) -> CardDraft {
        CardDraft {
            card_type: CardType::Vocabulary,
            front: front.to_string(),
            back: "answer".to_string(),
            pinyin: Some("nǐ hǎo".to_string()),
            example: None,
            notes: None,
            source: None,
        }
    }

    fn scheduler() -> SrsScheduler<MemoryCardStore> {
        SrsScheduler::new(MemoryCardStore::new())
    }

    #[test]
    fn review_matches_the_pure_engine_output() {
        let scheduler = scheduler();
        let card = scheduler.create_card(1, draft("你好"), now()).unwrap();

        let updated = scheduler.review(1, card.card_id, 4, now()).unwrap();
        let expected = engine::next_state(card.scheduling(), ReviewQuality::Hesitant);

        assert_eq!(updated.scheduling(), expected);
        assert_eq!(updated.repetitions, 1);
        assert_eq!(updated.interval_days, 1);
        assert_eq!(updated.due_at, now() + Duration::days(1));

        // Reading the card back yields exactly what review() returned.
        let reloaded = scheduler
            .store
            .load_card(1, card.card_id)
            .unwrap()
            .unwrap();
        assert_eq!(reloaded, updated);
    }

    #[test]
    fn review_appends_a_snapshot_record() {
        let scheduler = scheduler();
        let card = scheduler.create_card(1, draft("水"), now()).unwrap();
        scheduler.review(1, card.card_id, 5, now()).unwrap();

        let reviews = scheduler
            .store
            .reviews_since(1, NaiveDateTime::MIN)
            .unwrap();
        assert_eq!(reviews.len(), 1);
        let record = &reviews[0];
        assert_eq!(record.quality, 5);
        assert_eq!(record.previous_interval, 0);
        assert_eq!(record.new_interval, 1);
        assert!((record.previous_ease - 2.5).abs() < 1e-9);
        assert!((record.new_ease - 2.6).abs() < 1e-9);
    }

    #[test]
    fn invalid_quality_is_rejected_before_any_write() {
        let scheduler = scheduler();
        let card = scheduler.create_card(1, draft("茶"), now()).unwrap();

        let err = scheduler.review(1, card.card_id, 6, now()).unwrap_err();
        assert!(matches!(err, SrsError::InvalidQuality(_)));
        let reloaded = scheduler
            .store
            .load_card(1, card.card_id)
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.version, card.version);
    }

    #[test]
    fn reviewing_someone_elses_card_is_not_found() {
        let scheduler = scheduler();
        let card = scheduler.create_card(1, draft("马"), now()).unwrap();
        assert!(matches!(
            scheduler.review(2, card.card_id, 4, now()),
            Err(SrsError::CardNotFound)
        ));
        assert!(matches!(
            scheduler.review(1, 999, 4, now()),
            Err(SrsError::CardNotFound)
        ));
    }

    #[test]
    fn due_cards_order_by_due_date_then_id() {
        let scheduler = scheduler();
        let a = scheduler.create_card(1, draft("一"), now()).unwrap();
        let b = scheduler.create_card(1, draft("二"), now()).unwrap();
        let c = scheduler.create_card(1, draft("三"), now()).unwrap();

        // Push c further into the past than a and b, which stay tied.
        let mut overdue = c.clone();
        overdue.due_at = now() - Duration::days(2);
        scheduler.store.save_card(&overdue, c.version).unwrap();

        let due = scheduler.due_cards(1, now()).unwrap();
        let ids: Vec<i32> = due.iter().map(|card| card.card_id).collect();
        assert_eq!(ids, vec![c.card_id, a.card_id, b.card_id]);
    }

    #[test]
    fn due_cards_never_contain_future_cards() {
        let scheduler = scheduler();
        let card = scheduler.create_card(1, draft("龙"), now()).unwrap();
        scheduler.review(1, card.card_id, 4, now()).unwrap();

        let due = scheduler.due_cards(1, now()).unwrap();
        assert!(due.is_empty());
        assert_eq!(
            scheduler
                .due_cards(1, now() + Duration::days(1))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn deleting_a_card_keeps_its_review_history() {
        let scheduler = scheduler();
        let card = scheduler.create_card(1, draft("书"), now()).unwrap();
        scheduler.review(1, card.card_id, 3, now()).unwrap();
        scheduler.delete_card(1, card.card_id).unwrap();

        assert!(matches!(
            scheduler.delete_card(1, card.card_id),
            Err(SrsError::CardNotFound)
        ));
        let reviews = scheduler
            .store
            .reviews_since(1, NaiveDateTime::MIN)
            .unwrap();
        assert_eq!(reviews.len(), 1);
    }

    #[test]
    fn stats_reflect_reviews_and_due_counts() {
        let scheduler = scheduler();
        let card = scheduler.create_card(1, draft("火"), now()).unwrap();
        scheduler.create_card(1, draft("山"), now()).unwrap();
        scheduler.review(1, card.card_id, 5, now()).unwrap();

        let stats = scheduler.stats(1, now()).unwrap();
        assert_eq!(stats.total_cards, 2);
        assert_eq!(stats.due_now, 1);
        assert_eq!(stats.reviews_today, 1);
        assert_eq!(stats.retention_rate, Some(1.0));
    }

    #[test]
    fn card_source_survives_creation() {
        let scheduler = scheduler();
        let mut with_source = draft("脉搏");
        with_source.card_type = CardType::MedicalTerm;
        with_source.source = Some(CardSource {
            source_type: "reading".to_string(),
            source_id: 12,
        });
        let card = scheduler.create_card(1, with_source, now()).unwrap();
        assert_eq!(card.card_type, CardType::MedicalTerm);
        assert_eq!(card.source.as_ref().unwrap().source_id, 12);
    }

    /// Wraps the memory store to serve one deliberately stale read,
    /// standing in for a second browser tab that loaded the card before
    /// another session graded it.
    struct StaleReadStore {
        inner: MemoryCardStore,
        stale: Mutex<Option<SrsCard>>,
    }

    impl StaleReadStore {
        fn serve_stale(&self, card: SrsCard) {
            *self.stale.lock().unwrap() = Some(card);
        }
    }

    impl CardStore for StaleReadStore {
        fn load_card(&self, user_id: i32, card_id: i32) -> Result<Option<SrsCard>, StoreError> {
            if let Some(card) = self.stale.lock().unwrap().take() {
                return Ok(Some(card));
            }
            self.inner.load_card(user_id, card_id)
        }

        fn insert_card(
            &self,
            user_id: i32,
            card_type: CardType,
            content: CardContent,
            source: Option<CardSource>,
            now: NaiveDateTime,
        ) -> Result<SrsCard, StoreError> {
            self.inner.insert_card(user_id, card_type, content, source, now)
        }

        fn save_card(&self, card: &SrsCard, expected_version: i32) -> Result<(), StoreError> {
            self.inner.save_card(card, expected_version)
        }

        fn delete_card(&self, user_id: i32, card_id: i32) -> Result<bool, StoreError> {
            self.inner.delete_card(user_id, card_id)
        }

        fn append_review(&self, record: &ReviewRecord) -> Result<(), StoreError> {
            self.inner.append_review(record)
        }

        fn due_cards(&self, user_id: i32, now: NaiveDateTime) -> Result<Vec<SrsCard>, StoreError> {
            self.inner.due_cards(user_id, now)
        }

        fn all_cards(&self, user_id: i32) -> Result<Vec<SrsCard>, StoreError> {
            self.inner.all_cards(user_id)
        }

        fn reviews_since(
            &self,
            user_id: i32,
            since: NaiveDateTime,
        ) -> Result<Vec<ReviewRecord>, StoreError> {
            self.inner.reviews_since(user_id, since)
        }
    }

    #[test]
    fn a_stale_second_writer_is_rejected() {
        let store = StaleReadStore {
            inner: MemoryCardStore::new(),
            stale: Mutex::new(None),
        };
        let scheduler = SrsScheduler::new(store);
        let card = scheduler.create_card(1, draft("门"), now()).unwrap();

        // First session grades normally.
        scheduler.review(1, card.card_id, 4, now()).unwrap();

        // Second session still holds the pre-review snapshot.
        scheduler.store.serve_stale(card.clone());
        let err = scheduler.review(1, card.card_id, 2, now()).unwrap_err();
        assert!(matches!(err, SrsError::StaleCardState));

        // The first session's write is untouched.
        let reloaded = scheduler
            .store
            .load_card(1, card.card_id)
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.repetitions, 1);
        assert_eq!(
            scheduler
                .store
                .reviews_since(1, NaiveDateTime::MIN)
                .unwrap()
                .len(),
            1
        );
    }

    /// Delegating store that fails a scheduled number of appends and
    /// every save past an allowance, for exercising the partial-write
    /// recovery path.
    struct FlakyStore {
        inner: MemoryCardStore,
        append_failures: Cell<usize>,
        saves_allowed: Cell<usize>,
    }

    impl FlakyStore {
        fn new(append_failures: usize, saves_allowed: usize) -> Self {
            FlakyStore {
                inner: MemoryCardStore::new(),
                append_failures: Cell::new(append_failures),
                saves_allowed: Cell::new(saves_allowed),
            }
        }
    }

    impl CardStore for FlakyStore {
        fn load_card(&self, user_id: i32, card_id: i32) -> Result<Option<SrsCard>, StoreError> {
            self.inner.load_card(user_id, card_id)
        }

        fn insert_card(
            &self,
            user_id: i32,
            card_type: CardType,
            content: CardContent,
            source: Option<CardSource>,
            now: NaiveDateTime,
        ) -> Result<SrsCard, StoreError> {
            self.inner.insert_card(user_id, card_type, content, source, now)
        }

        fn save_card(&self, card: &SrsCard, expected_version: i32) -> Result<(), StoreError> {
            let allowed = self.saves_allowed.get();
            if allowed == 0 {
                return Err(StoreError::Backend(anyhow::anyhow!("save failed")));
            }
            self.saves_allowed.set(allowed - 1);
            self.inner.save_card(card, expected_version)
        }

        fn delete_card(&self, user_id: i32, card_id: i32) -> Result<bool, StoreError> {
            self.inner.delete_card(user_id, card_id)
        }

        fn append_review(&self, record: &ReviewRecord) -> Result<(), StoreError> {
            let failures = self.append_failures.get();
            if failures > 0 {
                self.append_failures.set(failures - 1);
                return Err(StoreError::Backend(anyhow::anyhow!("append failed")));
            }
            self.inner.append_review(record)
        }

        fn due_cards(&self, user_id: i32, now: NaiveDateTime) -> Result<Vec<SrsCard>, StoreError> {
            self.inner.due_cards(user_id, now)
        }

        fn all_cards(&self, user_id: i32) -> Result<Vec<SrsCard>, StoreError> {
            self.inner.all_cards(user_id)
        }

        fn reviews_since(
            &self,
            user_id: i32,
            since: NaiveDateTime,
        ) -> Result<Vec<ReviewRecord>, StoreError> {
            self.inner.reviews_since(user_id, since)
        }
    }

    #[test]
    fn one_append_failure_is_retried_transparently() {
        let scheduler = SrsScheduler::new(FlakyStore::new(1, usize::MAX));
        let card = scheduler.create_card(1, draft("雨"), now()).unwrap();

        let updated = scheduler.review(1, card.card_id, 4, now()).unwrap();
        assert_eq!(updated.repetitions, 1);
        assert_eq!(
            scheduler
                .store
                .reviews_since(1, NaiveDateTime::MIN)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn double_append_failure_rolls_the_card_back() {
        let scheduler = SrsScheduler::new(FlakyStore::new(2, usize::MAX));
        let card = scheduler.create_card(1, draft("雪"), now()).unwrap();

        let err = scheduler.review(1, card.card_id, 4, now()).unwrap_err();
        assert!(matches!(err, SrsError::Storage(_)));

        let reloaded = scheduler
            .store
            .load_card(1, card.card_id)
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.scheduling(), card.scheduling());
        assert_eq!(reloaded.due_at, card.due_at);
        assert!(
            scheduler
                .store
                .reviews_since(1, NaiveDateTime::MIN)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn failed_rollback_surfaces_as_partial_write() {
        // One save allowed (the review update); the rollback save fails.
        let scheduler = SrsScheduler::new(FlakyStore::new(2, 1));
        let card = scheduler.create_card(1, draft("风"), now()).unwrap();

        let err = scheduler.review(1, card.card_id, 4, now()).unwrap_err();
        assert!(matches!(err, SrsError::PartialWrite));
    }
}
