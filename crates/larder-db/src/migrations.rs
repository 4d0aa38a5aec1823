use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (users, recipes)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                is_online   INTEGER NOT NULL DEFAULT 0
            );

            -- op is the author's nickname, deliberately not a foreign key:
            -- recipes outlive the account that posted them.
            CREATE TABLE recipes (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                op            TEXT NOT NULL,
                title         TEXT NOT NULL CHECK (length(title) <= 64),
                instructions  TEXT NOT NULL,
                image_urls    TEXT NOT NULL DEFAULT '[]',
                time          TEXT NOT NULL
            );

            CREATE INDEX idx_recipes_op ON recipes(op);
            CREATE INDEX idx_recipes_time ON recipes(time);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
