use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::Integer;

use crate::DbPool;
use crate::schema::{srs_cards, srs_reviews};
use crate::srs::engine::SchedulingState;
use crate::srs::{CardContent, CardSource, CardStore, CardType, ReviewRecord, SrsCard, StoreError};

#[derive(Queryable)]
struct CardRow {
    card_id: i32,
    user_id: i32,
    card_type: String,
    front: String,
    back: String,
    pinyin: Option<String>,
    example: Option<String>,
    notes: Option<String>,
    source_type: Option<String>,
    source_id: Option<i32>,
    ease_factor: f64,
    interval_days: i32,
    repetitions: i32,
    due_at: NaiveDateTime,
    version: i32,
    created_at: NaiveDateTime,
}

impl From<CardRow> for SrsCard {
    fn from(row: CardRow) -> SrsCard {
        let source = match (row.source_type, row.source_id) {
            (Some(source_type), Some(source_id)) => Some(CardSource {
                source_type,
                source_id,
            }),
            _ => None,
        };
        SrsCard {
            card_id: row.card_id,
            user_id: row.user_id,
            card_type: CardType::parse(&row.card_type),
            content: CardContent {
                front: row.front,
                back: row.back,
                pinyin: row.pinyin,
                example: row.example,
                notes: row.notes,
            },
            source,
            ease_factor: row.ease_factor,
            interval_days: row.interval_days,
            repetitions: row.repetitions,
            due_at: row.due_at,
            version: row.version,
            created_at: row.created_at,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = srs_cards)]
struct NewCardRow<'a> {
    user_id: i32,
    card_type: &'a str,
    front: &'a str,
    back: &'a str,
    pinyin: Option<&'a str>,
    example: Option<&'a str>,
    notes: Option<&'a str>,
    source_type: Option<&'a str>,
    source_id: Option<i32>,
    ease_factor: f64,
    interval_days: i32,
    repetitions: i32,
    due_at: NaiveDateTime,
    version: i32,
    created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = srs_reviews)]
struct NewReviewRow {
    card_id: i32,
    user_id: i32,
    quality: i32,
    previous_interval: i32,
    new_interval: i32,
    previous_ease: f64,
    new_ease: f64,
    reviewed_at: NaiveDateTime,
}

/// `CardStore` over the r2d2/SQLite pool. The optimistic version check
/// rides on the `UPDATE ... WHERE version = ?` row count, so conflicting
/// writers serialize without any explicit locking.
pub struct SqliteCardStore {
    pool: DbPool,
}

impl SqliteCardStore {
    pub fn new(pool: DbPool) -> Self {
        SqliteCardStore { pool }
    }

    // Pool checkout is the only wait in this store and r2d2 bounds it,
    // so a failed checkout reads as a timeout rather than a hang.
    fn conn(
        &self,
    ) -> Result<
        diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>,
        StoreError,
    > {
        self.pool.get().map_err(|e| {
            log::error!("connection checkout failed: {e}");
            StoreError::Timeout
        })
    }
}

fn backend(err: diesel::result::Error) -> StoreError {
    StoreError::Backend(err.into())
}

impl CardStore for SqliteCardStore {
    fn load_card(&self, user_id: i32, card_id: i32) -> Result<Option<SrsCard>, StoreError> {
        let mut conn = self.conn()?;
        let row = srs_cards::table
            .filter(srs_cards::card_id.eq(card_id))
            .filter(srs_cards::user_id.eq(user_id))
            .first::<CardRow>(&mut conn)
            .optional()
            .map_err(backend)?;
        Ok(row.map(SrsCard::from))
    }

    fn insert_card(
        &self,
        user_id: i32,
        card_type: CardType,
        content: CardContent,
        source: Option<CardSource>,
        now: NaiveDateTime,
    ) -> Result<SrsCard, StoreError> {
        let mut conn = self.conn()?;
        let state = SchedulingState::new_card();
        let row = NewCardRow {
            user_id,
            card_type: card_type.as_str(),
            front: &content.front,
            back: &content.back,
            pinyin: content.pinyin.as_deref(),
            example: content.example.as_deref(),
            notes: content.notes.as_deref(),
            source_type: source.as_ref().map(|s| s.source_type.as_str()),
            source_id: source.as_ref().map(|s| s.source_id),
            ease_factor: state.ease_factor,
            interval_days: state.interval_days,
            repetitions: state.repetitions,
            // A new card is due immediately.
            due_at: now,
            version: 1,
            created_at: now,
        };

        let card_id = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                diesel::insert_into(srs_cards::table)
                    .values(&row)
                    .execute(conn)?;
                diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()"))
                    .get_result::<i32>(conn)
            })
            .map_err(backend)?;

        Ok(SrsCard {
            card_id,
            user_id,
            card_type,
            content,
            source,
            ease_factor: state.ease_factor,
            interval_days: state.interval_days,
            repetitions: state.repetitions,
            due_at: now,
            version: 1,
            created_at: now,
        })
    }

    fn save_card(&self, card: &SrsCard, expected_version: i32) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let updated = diesel::update(
            srs_cards::table
                .filter(srs_cards::card_id.eq(card.card_id))
                .filter(srs_cards::user_id.eq(card.user_id))
                .filter(srs_cards::version.eq(expected_version)),
        )
        .set((
            srs_cards::ease_factor.eq(card.ease_factor),
            srs_cards::interval_days.eq(card.interval_days),
            srs_cards::repetitions.eq(card.repetitions),
            srs_cards::due_at.eq(card.due_at),
            srs_cards::version.eq(expected_version + 1),
        ))
        .execute(&mut conn)
        .map_err(backend)?;

        if updated == 1 {
            return Ok(());
        }

        // Distinguish a lost race from a card that is gone entirely.
        let exists: i64 = srs_cards::table
            .filter(srs_cards::card_id.eq(card.card_id))
            .filter(srs_cards::user_id.eq(card.user_id))
            .count()
            .get_result(&mut conn)
            .map_err(backend)?;
        if exists > 0 {
            Err(StoreError::Conflict)
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn delete_card(&self, user_id: i32, card_id: i32) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            srs_cards::table
                .filter(srs_cards::card_id.eq(card_id))
                .filter(srs_cards::user_id.eq(user_id)),
        )
        .execute(&mut conn)
        .map_err(backend)?;
        Ok(deleted > 0)
    }

    fn append_review(&self, record: &ReviewRecord) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        diesel::insert_into(srs_reviews::table)
            .values(&NewReviewRow {
                card_id: record.card_id,
                user_id: record.user_id,
                quality: record.quality,
                previous_interval: record.previous_interval,
                new_interval: record.new_interval,
                previous_ease: record.previous_ease,
                new_ease: record.new_ease,
                reviewed_at: record.reviewed_at,
            })
            .execute(&mut conn)
            .map_err(backend)?;
        Ok(())
    }

    fn due_cards(&self, user_id: i32, now: NaiveDateTime) -> Result<Vec<SrsCard>, StoreError> {
        let mut conn = self.conn()?;
        let rows = srs_cards::table
            .filter(srs_cards::user_id.eq(user_id))
            .filter(srs_cards::due_at.le(now))
            .order_by((srs_cards::due_at.asc(), srs_cards::card_id.asc()))
            .load::<CardRow>(&mut conn)
            .map_err(backend)?;
        Ok(rows.into_iter().map(SrsCard::from).collect())
    }

    fn all_cards(&self, user_id: i32) -> Result<Vec<SrsCard>, StoreError> {
        let mut conn = self.conn()?;
        let rows = srs_cards::table
            .filter(srs_cards::user_id.eq(user_id))
            .order_by(srs_cards::card_id.asc())
            .load::<CardRow>(&mut conn)
            .map_err(backend)?;
        Ok(rows.into_iter().map(SrsCard::from).collect())
    }

    fn reviews_since(
        &self,
        user_id: i32,
        since: NaiveDateTime,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        let mut conn = self.conn()?;
        let rows = srs_reviews::table
            .filter(srs_reviews::user_id.eq(user_id))
            .filter(srs_reviews::reviewed_at.ge(since))
            .order_by(srs_reviews::reviewed_at.asc())
            .select((
                srs_reviews::card_id,
                srs_reviews::user_id,
                srs_reviews::quality,
                srs_reviews::previous_interval,
                srs_reviews::new_interval,
                srs_reviews::previous_ease,
                srs_reviews::new_ease,
                srs_reviews::reviewed_at,
            ))
            .load::<(i32, i32, i32, i32, i32, f64, f64, NaiveDateTime)>(&mut conn)
            .map_err(backend)?;
        Ok(rows
            .into_iter()
            .map(
                |(
                    card_id,
                    user_id,
                    quality,
                    previous_interval,
                    new_interval,
                    previous_ease,
                    new_ease,
                    reviewed_at,
                )| ReviewRecord {
                    card_id,
                    user_id,
                    quality,
                    previous_interval,
                    new_interval,
                    previous_ease,
                    new_ease,
                    reviewed_at,
                },
            )
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::initialize_schema;
    use chrono::NaiveDate;
    use diesel::r2d2::{ConnectionManager, Pool};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn store() -> SqliteCardStore {
        let manager = ConnectionManager::<SqliteConnection>::new(":memory:");
        let pool = Pool::builder().max_size(1).build(manager).unwrap();
        initialize_schema(&mut pool.get().unwrap()).unwrap();
        SqliteCardStore::new(pool)
    }

    fn content(front: &str) -> CardContent {
        CardContent {
            front: front.to_string(),
            back: "answer".to_string(),
            pinyin: Some("hàn".to_string()),
            example: None,
            notes: None,
        }
    }

    #[test]
    fn insert_and_load_round_trip() {
        let store = store();
        let source = Some(CardSource {
            source_type: "lesson".to_string(),
            source_id: 7,
        });
        let card = store
            .insert_card(1, CardType::Grammar, content("把"), source, now())
            .unwrap();

        let loaded = store.load_card(1, card.card_id).unwrap().unwrap();
        assert_eq!(loaded, card);
        assert_eq!(loaded.card_type, CardType::Grammar);
        assert_eq!(loaded.source.as_ref().unwrap().source_id, 7);
        assert!(store.load_card(2, card.card_id).unwrap().is_none());
    }

    #[test]
    fn save_card_is_compare_and_set() {
        let store = store();
        let mut card = store
            .insert_card(1, CardType::Vocabulary, content("好"), None, now())
            .unwrap();
        card.repetitions = 1;
        card.interval_days = 1;
        store.save_card(&card, 1).unwrap();

        assert!(matches!(
            store.save_card(&card, 1),
            Err(StoreError::Conflict)
        ));
        card.card_id += 100;
        assert!(matches!(
            store.save_card(&card, 2),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn due_query_filters_and_orders() {
        let store = store();
        let early = store
            .insert_card(1, CardType::Vocabulary, content("一"), None, now())
            .unwrap();
        let late = store
            .insert_card(1, CardType::Vocabulary, content("二"), None, now())
            .unwrap();

        let mut overdue = early.clone();
        overdue.due_at = now() - chrono::Duration::days(5);
        store.save_card(&overdue, early.version).unwrap();
        let mut future = late.clone();
        future.due_at = now() + chrono::Duration::days(5);
        store.save_card(&future, late.version).unwrap();

        let due = store.due_cards(1, now()).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].card_id, early.card_id);
    }

    #[test]
    fn reviews_append_and_filter_by_time() {
        let store = store();
        let record = ReviewRecord {
            card_id: 1,
            user_id: 1,
            quality: 4,
            previous_interval: 0,
            new_interval: 1,
            previous_ease: 2.5,
            new_ease: 2.5,
            reviewed_at: now(),
        };
        store.append_review(&record).unwrap();

        let all = store.reviews_since(1, NaiveDateTime::MIN).unwrap();
        assert_eq!(all, vec![record]);
        assert!(
            store
                .reviews_since(1, now() + chrono::Duration::hours(1))
                .unwrap()
                .is_empty()
        );
        assert!(store.reviews_since(2, NaiveDateTime::MIN).unwrap().is_empty());
    }

    #[test]
    fn delete_respects_ownership() {
        let store = store();
        let card = store
            .insert_card(1, CardType::Vocabulary, content("三"), None, now())
            .unwrap();
        assert!(!store.delete_card(2, card.card_id).unwrap());
        assert!(store.delete_card(1, card.card_id).unwrap());
        assert!(!store.delete_card(1, card.card_id).unwrap());
    }
}
