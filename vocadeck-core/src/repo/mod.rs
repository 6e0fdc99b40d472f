use crate::{BestScore, CoreError, Deck, Score, ScorePolicy, Word};
use async_trait::async_trait;

pub mod memory;

/// Storage for decks, their words and best scores.
///
/// Every method takes the owning user as `user`; deck names are unique per
/// user. Operations touching more than one table are atomic.
#[async_trait]
pub trait Repository: Send + Sync {
    // Decks
    async fn create_deck(&self, user: &str, name: &str) -> Result<Deck, CoreError>;
    async fn list_decks(&self, user: &str) -> Result<Vec<Deck>, CoreError>;
    /// Removes the deck together with its words and score.
    async fn delete_deck(&self, user: &str, name: &str) -> Result<(), CoreError>;

    // Words
    async fn add_word(
        &self,
        user: &str,
        deck_name: &str,
        hungarian: &str,
        german: &str,
    ) -> Result<Word, CoreError>;
    /// All words across the user's decks, in insertion order.
    async fn list_words(&self, user: &str) -> Result<Vec<Word>, CoreError>;

    // Scores
    async fn record_score(
        &self,
        user: &str,
        deck_name: &str,
        score: Score,
        policy: ScorePolicy,
    ) -> Result<BestScore, CoreError>;
    async fn list_best_scores(&self, user: &str) -> Result<Vec<BestScore>, CoreError>;
}
