use vocadeck_core::{
    load_overview, repo::memory::MemoryRepo, CoreError, Repository, ScorePolicy, SHARED_SCOPE,
};

#[tokio::test]
async fn new_deck_lists_empty_with_zero_score() {
    let repo = MemoryRepo::new();
    repo.create_deck("anna", "Animals").await.unwrap();

    let o = load_overview(&repo, "anna").await.unwrap();
    assert!(o.decks["Animals"].is_empty());
    assert_eq!(o.best_scores["Animals"], 0);
}

#[tokio::test]
async fn duplicate_deck_is_rejected_without_touching_data() {
    let repo = MemoryRepo::new();
    repo.create_deck("anna", "Animals").await.unwrap();
    repo.add_word("anna", "Animals", "kutya", "Hund").await.unwrap();
    repo.record_score("anna", "Animals", 70, ScorePolicy::Overwrite).await.unwrap();

    let err = repo.create_deck("anna", "Animals").await.unwrap_err();
    assert_eq!(err, CoreError::Conflict("deck name already exists"));

    let o = load_overview(&repo, "anna").await.unwrap();
    assert_eq!(o.decks["Animals"].len(), 1);
    assert_eq!(o.best_scores["Animals"], 70);
}

#[tokio::test]
async fn words_append_in_order() {
    let repo = MemoryRepo::new();
    repo.create_deck(SHARED_SCOPE, "Animals").await.unwrap();
    repo.add_word(SHARED_SCOPE, "Animals", "kutya", "Hund").await.unwrap();
    repo.add_word(SHARED_SCOPE, "Animals", "macska", "Katze").await.unwrap();
    let w = repo.add_word(SHARED_SCOPE, "Animals", "kutya", "Hund").await.unwrap();
    assert_eq!(w.hungarian, "kutya");

    let o = load_overview(&repo, SHARED_SCOPE).await.unwrap();
    let got: Vec<_> = o.decks["Animals"].iter().map(|p| (p.hungarian.as_str(), p.german.as_str())).collect();
    assert_eq!(got, [("kutya", "Hund"), ("macska", "Katze"), ("kutya", "Hund")]);
}

#[tokio::test]
async fn words_and_scores_need_an_existing_deck() {
    let repo = MemoryRepo::new();
    let err = repo.add_word("anna", "Nope", "ház", "Haus").await.unwrap_err();
    assert_eq!(err, CoreError::NotFound("deck"));
    let err = repo.record_score("anna", "Nope", 1, ScorePolicy::Overwrite).await.unwrap_err();
    assert_eq!(err, CoreError::NotFound("deck"));
    assert!(repo.list_decks("anna").await.unwrap().is_empty());
}

// Overwrite does not enforce "best": a lower score replaces a higher one.
#[tokio::test]
async fn overwrite_policy_replaces_higher_score_with_lower() {
    let repo = MemoryRepo::new();
    repo.create_deck("anna", "Animals").await.unwrap();
    repo.record_score("anna", "Animals", 90, ScorePolicy::Overwrite).await.unwrap();
    let best = repo.record_score("anna", "Animals", 40, ScorePolicy::Overwrite).await.unwrap();
    assert_eq!(best.score, 40);
    assert_eq!(load_overview(&repo, "anna").await.unwrap().best_scores["Animals"], 40);
}

#[tokio::test]
async fn keep_highest_policy_ignores_lower_score() {
    let repo = MemoryRepo::new();
    repo.create_deck("anna", "Animals").await.unwrap();
    repo.record_score("anna", "Animals", 90, ScorePolicy::KeepHighest).await.unwrap();
    let best = repo.record_score("anna", "Animals", 40, ScorePolicy::KeepHighest).await.unwrap();
    assert_eq!(best.score, 90);
    let best = repo.record_score("anna", "Animals", 95, ScorePolicy::KeepHighest).await.unwrap();
    assert_eq!(best.score, 95);
}

#[tokio::test]
async fn delete_cascades_and_later_writes_are_not_found() {
    let repo = MemoryRepo::new();
    repo.create_deck("anna", "Animals").await.unwrap();
    repo.add_word("anna", "Animals", "kutya", "Hund").await.unwrap();
    repo.record_score("anna", "Animals", 87, ScorePolicy::Overwrite).await.unwrap();

    repo.delete_deck("anna", "Animals").await.unwrap();

    assert!(repo.list_words("anna").await.unwrap().is_empty());
    assert!(repo.list_best_scores("anna").await.unwrap().is_empty());
    let o = load_overview(&repo, "anna").await.unwrap();
    assert!(!o.decks.contains_key("Animals"));
    assert!(!o.best_scores.contains_key("Animals"));

    assert_eq!(repo.delete_deck("anna", "Animals").await.unwrap_err(), CoreError::NotFound("deck"));
    assert_eq!(
        repo.add_word("anna", "Animals", "kutya", "Hund").await.unwrap_err(),
        CoreError::NotFound("deck")
    );

    // A recreated deck starts clean.
    repo.create_deck("anna", "Animals").await.unwrap();
    let o = load_overview(&repo, "anna").await.unwrap();
    assert!(o.decks["Animals"].is_empty());
    assert_eq!(o.best_scores["Animals"], 0);
}

#[tokio::test]
async fn users_are_isolated() {
    let repo = MemoryRepo::new();
    repo.create_deck("anna", "Animals").await.unwrap();
    repo.create_deck("bela", "Animals").await.unwrap();
    repo.add_word("bela", "Animals", "ló", "Pferd").await.unwrap();

    let anna = load_overview(&repo, "anna").await.unwrap();
    assert!(anna.decks["Animals"].is_empty());
    let bela = load_overview(&repo, "bela").await.unwrap();
    assert_eq!(bela.decks["Animals"].len(), 1);

    repo.delete_deck("anna", "Animals").await.unwrap();
    assert_eq!(repo.list_decks("bela").await.unwrap().len(), 1);
    assert!(load_overview(&repo, SHARED_SCOPE).await.unwrap().decks.is_empty());
}
