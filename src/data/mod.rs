use diesel::connection::SimpleConnection;
use diesel::sqlite::SqliteConnection;

pub mod models;
pub mod repositories;

/// Creates the tables on first run. Idempotent, so it runs on every
/// startup and against the `:memory:` databases the tests use.
pub fn initialize_schema(conn: &mut SqliteConnection) -> anyhow::Result<()> {
    conn.batch_execute(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS srs_cards (
            card_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users (user_id),
            card_type TEXT NOT NULL,
            front TEXT NOT NULL,
            back TEXT NOT NULL,
            pinyin TEXT,
            example TEXT,
            notes TEXT,
            source_type TEXT,
            source_id INTEGER,
            ease_factor DOUBLE NOT NULL,
            interval_days INTEGER NOT NULL,
            repetitions INTEGER NOT NULL,
            due_at TIMESTAMP NOT NULL,
            version INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_srs_cards_due
            ON srs_cards (user_id, due_at);

        CREATE TABLE IF NOT EXISTS srs_reviews (
            review_id INTEGER PRIMARY KEY AUTOINCREMENT,
            card_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL REFERENCES users (user_id),
            quality INTEGER NOT NULL,
            previous_interval INTEGER NOT NULL,
            new_interval INTEGER NOT NULL,
            previous_ease DOUBLE NOT NULL,
            new_ease DOUBLE NOT NULL,
            reviewed_at TIMESTAMP NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_srs_reviews_user
            ON srs_reviews (user_id, reviewed_at);
        "#,
    )?;
    Ok(())
}
