use crate::{BestScore, CoreError, Deck, DeckId, Score, ScorePolicy, Word};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
struct State {
    decks: Vec<Deck>,
    words: Vec<Word>,
    scores: HashMap<DeckId, BestScore>,
}

impl State {
    fn find_deck(&self, user: &str, name: &str) -> Option<&Deck> {
        self.decks
            .iter()
            .find(|d| d.user_id == user && d.name == name)
    }

    fn owns(&self, user: &str, deck_id: DeckId) -> bool {
        self.decks.iter().any(|d| d.id == deck_id && d.user_id == user)
    }
}

/// Whole-state lock: each operation sees and leaves a consistent snapshot.
#[derive(Default)]
pub struct MemoryRepo {
    state: RwLock<State>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl crate::repo::Repository for MemoryRepo {
    async fn create_deck(&self, user: &str, name: &str) -> Result<Deck, CoreError> {
        let mut st = self.state.write();
        if st.find_deck(user, name).is_some() {
            return Err(CoreError::Conflict("deck name already exists"));
        }
        let deck = Deck::new(user, name);
        st.decks.push(deck.clone());
        Ok(deck)
    }

    async fn list_decks(&self, user: &str) -> Result<Vec<Deck>, CoreError> {
        Ok(self
            .state
            .read()
            .decks
            .iter()
            .filter(|d| d.user_id == user)
            .cloned()
            .collect())
    }

    async fn delete_deck(&self, user: &str, name: &str) -> Result<(), CoreError> {
        let mut st = self.state.write();
        let id = st
            .find_deck(user, name)
            .map(|d| d.id)
            .ok_or(CoreError::NotFound("deck"))?;
        st.decks.retain(|d| d.id != id);
        st.words.retain(|w| w.deck_id != id);
        st.scores.remove(&id);
        Ok(())
    }

    async fn add_word(
        &self,
        user: &str,
        deck_name: &str,
        hungarian: &str,
        german: &str,
    ) -> Result<Word, CoreError> {
        let mut st = self.state.write();
        let deck_id = st
            .find_deck(user, deck_name)
            .map(|d| d.id)
            .ok_or(CoreError::NotFound("deck"))?;
        let word = Word::new(deck_id, hungarian, german);
        st.words.push(word.clone());
        Ok(word)
    }

    async fn list_words(&self, user: &str) -> Result<Vec<Word>, CoreError> {
        let st = self.state.read();
        Ok(st
            .words
            .iter()
            .filter(|w| st.owns(user, w.deck_id))
            .cloned()
            .collect())
    }

    async fn record_score(
        &self,
        user: &str,
        deck_name: &str,
        score: Score,
        policy: ScorePolicy,
    ) -> Result<BestScore, CoreError> {
        let mut st = self.state.write();
        let deck_id = st
            .find_deck(user, deck_name)
            .map(|d| d.id)
            .ok_or(CoreError::NotFound("deck"))?;
        let stored = st.scores.get(&deck_id).map(|s| s.score);
        let best = BestScore {
            deck_id,
            score: policy.merge(stored, score),
            updated_at: Utc::now(),
        };
        st.scores.insert(deck_id, best.clone());
        Ok(best)
    }

    async fn list_best_scores(&self, user: &str) -> Result<Vec<BestScore>, CoreError> {
        let st = self.state.read();
        Ok(st
            .scores
            .values()
            .filter(|s| st.owns(user, s.deck_id))
            .cloned()
            .collect())
    }
}
