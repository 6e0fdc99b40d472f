use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgConnection, PgPool, Row};
use vocadeck_core::{
    repo::Repository, BestScore, CoreError, Deck, DeckId, Score, ScorePolicy, Word,
};

pub struct PostgresRepo {
    pool: PgPool,
}

impl PostgresRepo {
    pub async fn connect(url: &str) -> Result<Self, CoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(db("pg connect"))?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    async fn ensure_schema(&self) -> Result<(), CoreError> {
        const STMT: &str = r#"
        CREATE TABLE IF NOT EXISTS decks (
          id          uuid PRIMARY KEY,
          user_id     text NOT NULL,
          name        text NOT NULL,
          created_at  timestamptz NOT NULL,
          UNIQUE (user_id, name)
        );

        CREATE TABLE IF NOT EXISTS words (
          seq         bigserial PRIMARY KEY,
          id          uuid NOT NULL UNIQUE,
          deck_id     uuid NOT NULL REFERENCES decks(id) ON DELETE CASCADE,
          hungarian   text NOT NULL,
          german      text NOT NULL,
          created_at  timestamptz NOT NULL
        );

        CREATE TABLE IF NOT EXISTS best_scores (
          deck_id     uuid PRIMARY KEY REFERENCES decks(id) ON DELETE CASCADE,
          score       bigint NOT NULL,
          updated_at  timestamptz NOT NULL
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
                .map_err(db("pg schema"))?;
        }
        tracing::debug!("pg schema ready");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Repository for PostgresRepo {
    // ===== Decks =====
    async fn create_deck(&self, user: &str, name: &str) -> Result<Deck, CoreError> {
        let deck = Deck::new(user, name);
        let res = sqlx::query(
            r#"INSERT INTO decks (id,user_id,name,created_at) VALUES ($1,$2,$3,$4)
               ON CONFLICT (user_id, name) DO NOTHING"#,
        )
        .bind(deck.id)
        .bind(&deck.user_id)
        .bind(&deck.name)
        .bind(deck.created_at)
        .execute(&self.pool)
        .await
        .map_err(db("pg insert deck"))?;
        if res.rows_affected() == 0 {
            return Err(CoreError::Conflict("deck name already exists"));
        }
        Ok(deck)
    }

    async fn list_decks(&self, user: &str) -> Result<Vec<Deck>, CoreError> {
        let rows = sqlx::query(
            "SELECT id,user_id,name,created_at FROM decks WHERE user_id=$1 ORDER BY created_at ASC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(db("pg list decks"))?;
        Ok(rows.iter().map(row_into_deck).collect())
    }

    async fn delete_deck(&self, user: &str, name: &str) -> Result<(), CoreError> {
        let mut tx = self.pool.begin().await.map_err(db("pg tx"))?;
        let Some(id) = find_deck_id(&mut tx, user, name).await? else {
            tx.rollback().await.ok();
            return Err(CoreError::NotFound("deck"));
        };

        sqlx::query("DELETE FROM words WHERE deck_id=$1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db("pg del words"))?;

        sqlx::query("DELETE FROM best_scores WHERE deck_id=$1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db("pg del scores"))?;

        sqlx::query("DELETE FROM decks WHERE id=$1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db("pg del deck"))?;

        tx.commit().await.map_err(db("pg tx commit"))
    }

    // ===== Words =====
    async fn add_word(
        &self,
        user: &str,
        deck_name: &str,
        hungarian: &str,
        german: &str,
    ) -> Result<Word, CoreError> {
        let mut tx = self.pool.begin().await.map_err(db("pg tx"))?;
        let deck_id = find_deck_id(&mut tx, user, deck_name)
            .await?
            .ok_or(CoreError::NotFound("deck"))?;

        let word = Word::new(deck_id, hungarian, german);
        sqlx::query(
            "INSERT INTO words (id,deck_id,hungarian,german,created_at) VALUES ($1,$2,$3,$4,$5)",
        )
        .bind(word.id)
        .bind(word.deck_id)
        .bind(&word.hungarian)
        .bind(&word.german)
        .bind(word.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db("pg insert word"))?;

        tx.commit().await.map_err(db("pg tx commit"))?;
        Ok(word)
    }

    async fn list_words(&self, user: &str) -> Result<Vec<Word>, CoreError> {
        let rows = sqlx::query(
            r#"SELECT w.id, w.deck_id, w.hungarian, w.german, w.created_at
               FROM words w JOIN decks d ON d.id = w.deck_id
               WHERE d.user_id=$1 ORDER BY w.seq ASC"#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(db("pg list words"))?;
        Ok(rows
            .into_iter()
            .map(|row| Word {
                id: row.get("id"),
                deck_id: row.get("deck_id"),
                hungarian: row.get("hungarian"),
                german: row.get("german"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    // ===== Scores =====
    async fn record_score(
        &self,
        user: &str,
        deck_name: &str,
        score: Score,
        policy: ScorePolicy,
    ) -> Result<BestScore, CoreError> {
        let mut tx = self.pool.begin().await.map_err(db("pg tx"))?;
        let deck_id = find_deck_id(&mut tx, user, deck_name)
            .await?
            .ok_or(CoreError::NotFound("deck"))?;

        let row = sqlx::query(upsert_sql(policy))
            .bind(deck_id)
            .bind(score)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await
            .map_err(db("pg upsert score"))?;
        let best = BestScore {
            deck_id,
            score: row.get::<i64, _>("score"),
            updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        };

        tx.commit().await.map_err(db("pg tx commit"))?;
        Ok(best)
    }

    async fn list_best_scores(&self, user: &str) -> Result<Vec<BestScore>, CoreError> {
        let rows = sqlx::query(
            r#"SELECT s.deck_id, s.score, s.updated_at
               FROM best_scores s JOIN decks d ON d.id = s.deck_id
               WHERE d.user_id=$1"#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(db("pg list scores"))?;
        Ok(rows
            .into_iter()
            .map(|row| BestScore {
                deck_id: row.get("deck_id"),
                score: row.get("score"),
                updated_at: row.get("updated_at"),
            })
            .collect())
    }
}

// ===== helpers =====
fn db(op: &'static str) -> impl FnOnce(sqlx::Error) -> CoreError {
    move |e| {
        tracing::error!(op, error = %e, "pg query failed");
        CoreError::Storage(op)
    }
}

async fn find_deck_id(
    conn: &mut PgConnection,
    user: &str,
    name: &str,
) -> Result<Option<DeckId>, CoreError> {
    // Row lock held until commit; a concurrent delete cannot orphan new rows.
    let id = sqlx::query_scalar::<_, uuid::Uuid>(
        "SELECT id FROM decks WHERE user_id=$1 AND name=$2 FOR UPDATE",
    )
    .bind(user)
    .bind(name)
    .fetch_optional(&mut *conn)
    .await
    .map_err(db("pg read deck"))?;
    Ok(id)
}

fn upsert_sql(policy: ScorePolicy) -> &'static str {
    match policy {
        ScorePolicy::Overwrite => {
            r#"INSERT INTO best_scores (deck_id,score,updated_at) VALUES ($1,$2,$3)
               ON CONFLICT (deck_id) DO UPDATE SET score=EXCLUDED.score, updated_at=EXCLUDED.updated_at
               RETURNING score, updated_at"#
        }
        ScorePolicy::KeepHighest => {
            r#"INSERT INTO best_scores (deck_id,score,updated_at) VALUES ($1,$2,$3)
               ON CONFLICT (deck_id) DO UPDATE SET score=GREATEST(best_scores.score, EXCLUDED.score),
                                                   updated_at=EXCLUDED.updated_at
               RETURNING score, updated_at"#
        }
    }
}

fn row_into_deck(row: &sqlx::postgres::PgRow) -> Deck {
    Deck {
        id: row.get::<uuid::Uuid, _>("id"),
        user_id: row.get::<String, _>("user_id"),
        name: row.get::<String, _>("name"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}
