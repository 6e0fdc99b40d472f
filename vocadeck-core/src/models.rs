use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type DeckId = Uuid;
pub type WordId = Uuid;
pub type Score = i64;

/// Scope used when a caller does not name a user.
pub const SHARED_SCOPE: &str = "";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    pub id: DeckId,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Deck {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Word {
    pub id: WordId,
    pub deck_id: DeckId,
    pub hungarian: String,
    pub german: String,
    pub created_at: DateTime<Utc>,
}

impl Word {
    pub fn new(deck_id: DeckId, hungarian: impl Into<String>, german: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            deck_id,
            hungarian: hungarian.into(),
            german: german.into(),
            created_at: Utc::now(),
        }
    }

    pub fn pair(&self) -> WordPair {
        WordPair {
            hungarian: self.hungarian.clone(),
            german: self.german.clone(),
        }
    }
}

/// The shape a word takes inside a deck listing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordPair {
    pub hungarian: String,
    pub german: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BestScore {
    pub deck_id: DeckId,
    pub score: Score,
    pub updated_at: DateTime<Utc>,
}

/// How a newly recorded score is merged with the stored one.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ScorePolicy {
    /// Replace the stored value unconditionally, even with a lower score.
    #[default]
    Overwrite,
    /// Replace only when the new score is strictly greater.
    KeepHighest,
}

impl ScorePolicy {
    pub fn merge(&self, stored: Option<Score>, incoming: Score) -> Score {
        match (self, stored) {
            (ScorePolicy::KeepHighest, Some(old)) => old.max(incoming),
            _ => incoming,
        }
    }
}
