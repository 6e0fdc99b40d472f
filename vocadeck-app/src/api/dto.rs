use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vocadeck_core::{Deck, Score, Word, WordPair};

// Requests carry every field as optional so that a missing one surfaces as a
// validation error with a precise message instead of a body rejection.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(alias = "scopeKey")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeckIn {
    #[serde(alias = "scopeKey")]
    pub user_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWordIn {
    #[serde(alias = "scopeKey")]
    pub user_id: Option<String>,
    pub deck_name: Option<String>,
    pub hungarian: Option<String>,
    pub german: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordScoreIn {
    #[serde(alias = "scopeKey")]
    pub user_id: Option<String>,
    pub deck_name: Option<String>,
    /// Number or numeric string; checked by `validate::score`.
    pub score: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct MessageOut {
    pub message: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckOut {
    pub id: Uuid,
    pub name: String,
    pub words: Vec<WordPair>,
    pub created_at: DateTime<Utc>,
}

impl From<Deck> for DeckOut {
    fn from(d: Deck) -> Self {
        Self { id: d.id, name: d.name, words: Vec::new(), created_at: d.created_at }
    }
}

#[derive(Serialize)]
pub struct DeckCreatedOut {
    pub message: &'static str,
    pub deck: DeckOut,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordOut {
    pub id: Uuid,
    pub deck_name: String,
    pub hungarian: String,
    pub german: String,
}

impl WordOut {
    pub fn new(deck_name: &str, w: Word) -> Self {
        Self { id: w.id, deck_name: deck_name.to_string(), hungarian: w.hungarian, german: w.german }
    }
}

#[derive(Serialize)]
pub struct WordAddedOut {
    pub message: &'static str,
    pub word: WordOut,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSavedOut {
    pub message: &'static str,
    pub deck_name: String,
    pub best_score: Score,
}
