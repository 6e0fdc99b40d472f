use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{field::Empty, info, Span};

use vocadeck_core::{load_overview, validate, DeckOverview, Repository, ScorePolicy};

use crate::api::dto::{
    AddWordIn, CreateDeckIn, DeckCreatedOut, MessageOut, RecordScoreIn, ScoreSavedOut, UserQuery,
    WordAddedOut, WordOut,
};
use crate::api::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    /// Reject requests that carry no `userId` instead of using the shared scope.
    pub require_user_id: bool,
    pub score_policy: ScorePolicy,
}

impl AppState {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo, require_user_id: false, score_policy: ScorePolicy::default() }
    }

    fn scope<'a>(&self, user: Option<&'a str>) -> Result<&'a str, ApiError> {
        let user = validate::scope(user, self.require_user_id)?;
        Span::current().record("user", user);
        Ok(user)
    }
}

#[tracing::instrument(skip_all, err(level = "warn"), fields(user = Empty))]
pub async fn list_decks(
    State(st): State<Arc<AppState>>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<DeckOverview>, ApiError> {
    let Query(q) = query?;
    let user = st.scope(q.user_id.as_deref())?;
    let overview = load_overview(&*st.repo, user).await?;
    Ok(Json(overview))
}

#[tracing::instrument(skip_all, err(level = "warn"), fields(user = Empty, deck = Empty))]
pub async fn create_deck(
    State(st): State<Arc<AppState>>,
    payload: Result<Json<CreateDeckIn>, JsonRejection>,
) -> Result<(StatusCode, Json<DeckCreatedOut>), ApiError> {
    let Json(body) = payload?;
    let user = st.scope(body.user_id.as_deref())?;
    let name = validate::required(body.name.as_deref(), "name is required")?;
    Span::current().record("deck", name);

    let deck = st.repo.create_deck(user, name).await?;
    info!(deck_id = %deck.id, "deck created");
    Ok((
        StatusCode::CREATED,
        Json(DeckCreatedOut { message: "deck created", deck: deck.into() }),
    ))
}

#[tracing::instrument(skip_all, err(level = "warn"), fields(user = Empty, deck = Empty))]
pub async fn delete_deck(
    State(st): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<MessageOut>, ApiError> {
    let Path(name) = path?;
    let Query(q) = query?;
    let user = st.scope(q.user_id.as_deref())?;
    let name = validate::required(Some(name.as_str()), "deck name is required")?;
    Span::current().record("deck", name);

    st.repo.delete_deck(user, name).await?;
    info!("deck deleted");
    Ok(Json(MessageOut { message: "deck deleted" }))
}

#[tracing::instrument(skip_all, err(level = "warn"), fields(user = Empty, deck = Empty))]
pub async fn add_word(
    State(st): State<Arc<AppState>>,
    payload: Result<Json<AddWordIn>, JsonRejection>,
) -> Result<(StatusCode, Json<WordAddedOut>), ApiError> {
    let Json(body) = payload?;
    let user = st.scope(body.user_id.as_deref())?;
    let deck = validate::required(body.deck_name.as_deref(), "deckName is required")?;
    let hungarian = validate::required(body.hungarian.as_deref(), "hungarian is required")?;
    let german = validate::required(body.german.as_deref(), "german is required")?;
    Span::current().record("deck", deck);

    let word = st.repo.add_word(user, deck, hungarian, german).await?;
    info!(word_id = %word.id, "word added");
    Ok((
        StatusCode::CREATED,
        Json(WordAddedOut { message: "word added", word: WordOut::new(deck, word) }),
    ))
}

#[tracing::instrument(skip_all, err(level = "warn"), fields(user = Empty, deck = Empty))]
pub async fn record_score(
    State(st): State<Arc<AppState>>,
    payload: Result<Json<RecordScoreIn>, JsonRejection>,
) -> Result<Json<ScoreSavedOut>, ApiError> {
    let Json(body) = payload?;
    let user = st.scope(body.user_id.as_deref())?;
    let deck = validate::required(body.deck_name.as_deref(), "deckName is required")?;
    let score = validate::score(body.score.as_ref())?;
    Span::current().record("deck", deck);

    let best = st.repo.record_score(user, deck, score, st.score_policy).await?;
    info!(score, best = best.score, "score saved");
    Ok(Json(ScoreSavedOut {
        message: "score saved",
        deck_name: deck.to_string(),
        best_score: best.score,
    }))
}
