use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Row, SqlitePool,
};
use std::{path::Path, time::Duration};
use vocadeck_core::{repo::Repository, BestScore, CoreError, Deck, Score, ScorePolicy, Word};

pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    pub async fn open_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(db("sqlite connect"))?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    /// A private database living as long as the pool; one connection so that
    /// every query sees the same data.
    pub async fn open_memory() -> Result<Self, CoreError> {
        let opts = "sqlite::memory:"
            .parse::<SqliteConnectOptions>()
            .map_err(db("sqlite options"))?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(opts)
            .await
            .map_err(db("sqlite connect"))?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    async fn ensure_schema(&self) -> Result<(), CoreError> {
        const STMT: &str = r#"
        CREATE TABLE IF NOT EXISTS decks (
          id          TEXT PRIMARY KEY,
          user_id     TEXT NOT NULL,
          name        TEXT NOT NULL,
          created_at  TEXT NOT NULL,
          UNIQUE (user_id, name)
        );

        CREATE TABLE IF NOT EXISTS words (
          seq         INTEGER PRIMARY KEY AUTOINCREMENT,
          id          TEXT NOT NULL UNIQUE,
          deck_id     TEXT NOT NULL,
          hungarian   TEXT NOT NULL,
          german      TEXT NOT NULL,
          created_at  TEXT NOT NULL,
          FOREIGN KEY(deck_id) REFERENCES decks(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS best_scores (
          deck_id     TEXT PRIMARY KEY,
          score       INTEGER NOT NULL,
          updated_at  TEXT NOT NULL,
          FOREIGN KEY(deck_id) REFERENCES decks(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_words_deck ON words (deck_id, seq);
        "#;

        for chunk in STMT.split(';') {
            let sql = chunk.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(db("sqlite schema"))?;
        }
        tracing::debug!("sqlite schema ready");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Repository for SqliteRepo {
    // Writes never read before writing: each statement takes the write lock up
    // front and waits on `busy_timeout` under contention.

    // ===== Decks =====
    async fn create_deck(&self, user: &str, name: &str) -> Result<Deck, CoreError> {
        let deck = Deck::new(user, name);
        let res = sqlx::query(
            r#"INSERT INTO decks (id,user_id,name,created_at) VALUES (?,?,?,?)
               ON CONFLICT(user_id, name) DO NOTHING"#,
        )
        .bind(deck.id.to_string())
        .bind(&deck.user_id)
        .bind(&deck.name)
        .bind(dt_to_str(deck.created_at))
        .execute(&self.pool)
        .await
        .map_err(db("insert deck"))?;
        if res.rows_affected() == 0 {
            return Err(CoreError::Conflict("deck name already exists"));
        }
        Ok(deck)
    }

    async fn list_decks(&self, user: &str) -> Result<Vec<Deck>, CoreError> {
        let rows = sqlx::query(
            "SELECT id,user_id,name,created_at FROM decks WHERE user_id=? ORDER BY created_at ASC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(db("list decks"))?;
        rows.into_iter().map(row_into_deck).collect()
    }

    async fn delete_deck(&self, user: &str, name: &str) -> Result<(), CoreError> {
        // Writes only: the transaction holds the write lock from its first statement.
        let mut tx = self.pool.begin().await.map_err(db("tx"))?;

        sqlx::query("DELETE FROM words WHERE deck_id IN (SELECT id FROM decks WHERE user_id=? AND name=?)")
            .bind(user)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(db("del words"))?;

        sqlx::query(
            "DELETE FROM best_scores WHERE deck_id IN (SELECT id FROM decks WHERE user_id=? AND name=?)",
        )
        .bind(user)
        .bind(name)
        .execute(&mut *tx)
        .await
        .map_err(db("del scores"))?;

        let res = sqlx::query("DELETE FROM decks WHERE user_id=? AND name=?")
            .bind(user)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(db("del deck"))?;
        if res.rows_affected() == 0 {
            tx.rollback().await.ok();
            return Err(CoreError::NotFound("deck"));
        }

        tx.commit().await.map_err(db("tx commit"))
    }

    // ===== Words =====
    async fn add_word(
        &self,
        user: &str,
        deck_name: &str,
        hungarian: &str,
        german: &str,
    ) -> Result<Word, CoreError> {
        let id = uuid::Uuid::new_v4();
        let created_at = Utc::now();
        let row = sqlx::query(
            r#"INSERT INTO words (id,deck_id,hungarian,german,created_at)
               SELECT ?, id, ?, ?, ? FROM decks WHERE user_id=? AND name=?
               RETURNING deck_id"#,
        )
        .bind(id.to_string())
        .bind(hungarian)
        .bind(german)
        .bind(dt_to_str(created_at))
        .bind(user)
        .bind(deck_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db("insert word"))?
        .ok_or(CoreError::NotFound("deck"))?;

        Ok(Word {
            id,
            deck_id: uuid_from_str(row.get::<String, _>("deck_id"))?,
            hungarian: hungarian.to_string(),
            german: german.to_string(),
            created_at,
        })
    }

    async fn list_words(&self, user: &str) -> Result<Vec<Word>, CoreError> {
        let rows = sqlx::query(
            r#"SELECT w.id, w.deck_id, w.hungarian, w.german, w.created_at
               FROM words w JOIN decks d ON d.id = w.deck_id
               WHERE d.user_id=? ORDER BY w.seq ASC"#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(db("list words"))?;
        let mut v = Vec::with_capacity(rows.len());
        for row in rows {
            v.push(Word {
                id: uuid_from_str(row.get::<String, _>("id"))?,
                deck_id: uuid_from_str(row.get::<String, _>("deck_id"))?,
                hungarian: row.get::<String, _>("hungarian"),
                german: row.get::<String, _>("german"),
                created_at: dt_from_str(row.get::<String, _>("created_at"))?,
            });
        }
        Ok(v)
    }

    // ===== Scores =====
    async fn record_score(
        &self,
        user: &str,
        deck_name: &str,
        score: Score,
        policy: ScorePolicy,
    ) -> Result<BestScore, CoreError> {
        let row = sqlx::query(upsert_sql(policy))
            .bind(score)
            .bind(dt_to_str(Utc::now()))
            .bind(user)
            .bind(deck_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db("upsert score"))?
            .ok_or(CoreError::NotFound("deck"))?;
        Ok(BestScore {
            deck_id: uuid_from_str(row.get::<String, _>("deck_id"))?,
            score: row.get::<i64, _>("score"),
            updated_at: dt_from_str(row.get::<String, _>("updated_at"))?,
        })
    }

    async fn list_best_scores(&self, user: &str) -> Result<Vec<BestScore>, CoreError> {
        let rows = sqlx::query(
            r#"SELECT s.deck_id, s.score, s.updated_at
               FROM best_scores s JOIN decks d ON d.id = s.deck_id
               WHERE d.user_id=?"#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(db("list scores"))?;
        let mut v = Vec::with_capacity(rows.len());
        for row in rows {
            v.push(BestScore {
                deck_id: uuid_from_str(row.get::<String, _>("deck_id"))?,
                score: row.get::<i64, _>("score"),
                updated_at: dt_from_str(row.get::<String, _>("updated_at"))?,
            });
        }
        Ok(v)
    }
}

// ===== Helpers =====
fn db(op: &'static str) -> impl FnOnce(sqlx::Error) -> CoreError {
    move |e| {
        tracing::error!(op, error = %e, "sqlite query failed");
        CoreError::Storage(op)
    }
}

// The SELECT yields no row for an unknown deck, so nothing is written or returned.
fn upsert_sql(policy: ScorePolicy) -> &'static str {
    match policy {
        ScorePolicy::Overwrite => {
            r#"INSERT INTO best_scores (deck_id,score,updated_at)
               SELECT id, ?, ? FROM decks WHERE user_id=? AND name=?
               ON CONFLICT(deck_id) DO UPDATE SET score=excluded.score, updated_at=excluded.updated_at
               RETURNING deck_id, score, updated_at"#
        }
        ScorePolicy::KeepHighest => {
            r#"INSERT INTO best_scores (deck_id,score,updated_at)
               SELECT id, ?, ? FROM decks WHERE user_id=? AND name=?
               ON CONFLICT(deck_id) DO UPDATE SET score=max(best_scores.score, excluded.score),
                                                  updated_at=excluded.updated_at
               RETURNING deck_id, score, updated_at"#
        }
    }
}

// Stored rows are written by this crate; a value that does not parse back is a store fault.
fn corrupt(what: &'static str, raw: &str) -> CoreError {
    tracing::error!(what, raw, "corrupt value in sqlite store");
    CoreError::Storage(what)
}

fn uuid_from_str(s: String) -> Result<uuid::Uuid, CoreError> {
    uuid::Uuid::parse_str(&s).map_err(|_| corrupt("corrupt uuid", &s))
}

fn dt_to_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn dt_from_str(s: String) -> Result<DateTime<Utc>, CoreError> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupt("corrupt datetime", &s))
}

fn row_into_deck(row: sqlx::sqlite::SqliteRow) -> Result<Deck, CoreError> {
    Ok(Deck {
        id: uuid_from_str(row.get::<String, _>("id"))?,
        user_id: row.get::<String, _>("user_id"),
        name: row.get::<String, _>("name"),
        created_at: dt_from_str(row.get::<String, _>("created_at"))?,
    })
}
