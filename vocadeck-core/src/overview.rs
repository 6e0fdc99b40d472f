use crate::{repo::Repository, BestScore, CoreError, Deck, Score, Word, WordPair};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Everything a client needs to render a user's decks.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeckOverview {
    pub decks: BTreeMap<String, Vec<WordPair>>,
    /// Decks without a recorded score report 0.
    pub best_scores: BTreeMap<String, Score>,
}

pub fn assemble(decks: &[Deck], words: &[Word], scores: &[BestScore]) -> DeckOverview {
    let mut overview = DeckOverview::default();
    let mut names = HashMap::with_capacity(decks.len());
    for d in decks {
        names.insert(d.id, d.name.as_str());
        overview.decks.insert(d.name.clone(), Vec::new());
        overview.best_scores.insert(d.name.clone(), 0);
    }
    for w in words {
        if let Some(name) = names.get(&w.deck_id) {
            overview.decks.entry((*name).to_string()).or_default().push(w.pair());
        }
    }
    for s in scores {
        if let Some(name) = names.get(&s.deck_id) {
            overview.best_scores.insert((*name).to_string(), s.score);
        }
    }
    overview
}

pub async fn load_overview<R: Repository + ?Sized>(
    repo: &R,
    user: &str,
) -> Result<DeckOverview, CoreError> {
    let decks = repo.list_decks(user).await?;
    let words = repo.list_words(user).await?;
    let scores = repo.list_best_scores(user).await?;
    Ok(assemble(&decks, &words, &scores))
}
