use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY,
            email         TEXT UNIQUE,
            username      TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role          TEXT NOT NULL DEFAULT 'user',
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS topics (
            id          INTEGER PRIMARY KEY,
            name        TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS quotes (
            id          INTEGER PRIMARY KEY,
            text        TEXT NOT NULL,
            author      TEXT,
            is_public   INTEGER NOT NULL DEFAULT 1,
            is_favorite INTEGER NOT NULL DEFAULT 0,
            user_id     INTEGER REFERENCES users(id),
            topic_id    INTEGER REFERENCES topics(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_quotes_created
            ON quotes(created_at);

        CREATE INDEX IF NOT EXISTS idx_quotes_owner
            ON quotes(user_id);

        -- Seed reference topics
        INSERT OR IGNORE INTO topics (name) VALUES
            ('wisdom'), ('humor'), ('motivation'), ('life'), ('work');
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
