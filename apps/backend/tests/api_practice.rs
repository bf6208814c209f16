//! Practice queue and review API tests.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use pretty_assertions::assert_eq;

use common::fixtures;
use common::TestContext;
use lexis_backend::models::{CardProgress, MasteryState};

/// Test the first correct review of a card.
#[tokio::test]
async fn test_first_review_moves_card_to_learning() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (learner_id, token) = ctx.create_test_learner(None).await;
    let card_id = ctx.create_test_flashcard("hola", "hello").await;

    let (name, value) = TestContext::auth_header(&token);
    let response = server
        .post("/api/practice/review")
        .add_header(name, value)
        .json(&fixtures::review_request(card_id, true, 2000))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["state"], "learning");
    assert_eq!(body["mastery_level"], 1);
    assert_eq!(body["correct_streak"], 1);
    assert_eq!(body["review_count"], 1);
    assert_eq!(body["score"], 1.8);

    let stored = ctx.progress(learner_id, card_id).await.unwrap();
    assert_eq!(stored.state, MasteryState::Learning);
    assert_eq!(stored.response_time_ms, Some(2000));
}

/// Test a wrong answer on a mastered card demotes it one tier.
#[tokio::test]
async fn test_incorrect_review_demotes_mastered_card() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (learner_id, token) = ctx.create_test_learner(None).await;
    let card_id = ctx.create_test_flashcard("árbol", "tree").await;

    ctx.db
        .upsert_progress(&CardProgress {
            state: MasteryState::Mastered,
            mastery_level: 3,
            correct_streak: 5,
            review_count: 10,
            ..CardProgress::new(learner_id, card_id)
        })
        .await
        .unwrap();

    let (name, value) = TestContext::auth_header(&token);
    let response = server
        .post("/api/practice/review")
        .add_header(name, value)
        .json(&fixtures::review_request(card_id, false, 4000))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["state"], "known");
    assert_eq!(body["mastery_level"], 2);
    assert_eq!(body["correct_streak"], 0);
    assert_eq!(body["review_count"], 11);
}

/// Test latency defaults when omitted.
#[tokio::test]
async fn test_review_without_latency() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (learner_id, token) = ctx.create_test_learner(None).await;
    let card_id = ctx.create_test_flashcard("sol", "sun").await;

    let (name, value) = TestContext::auth_header(&token);
    server
        .post("/api/practice/review")
        .add_header(name, value)
        .json(&serde_json::json!({ "flashcard_id": card_id, "correct": true }))
        .await
        .assert_status_ok();

    let stored = ctx.progress(learner_id, card_id).await.unwrap();
    assert_eq!(stored.response_time_ms, Some(5000));
    assert_eq!(stored.score, 1.2);
}

/// Test negative latency is rejected without touching progress.
#[tokio::test]
async fn test_review_rejects_negative_latency() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (learner_id, token) = ctx.create_test_learner(None).await;
    let card_id = ctx.create_test_flashcard("luna", "moon").await;

    let (name, value) = TestContext::auth_header(&token);
    let response = server
        .post("/api/practice/review")
        .add_header(name, value)
        .json(&fixtures::review_request(card_id, true, -1))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "validation_error");
    assert!(ctx.progress(learner_id, card_id).await.is_none());
}

/// Test reviewing an unknown flashcard.
#[tokio::test]
async fn test_review_unknown_flashcard() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (_, token) = ctx.create_test_learner(None).await;

    let (name, value) = TestContext::auth_header(&token);
    let response = server
        .post("/api/practice/review")
        .add_header(name, value)
        .json(&fixtures::review_request(uuid::Uuid::new_v4(), true, 1000))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

/// Test reviewing requires authentication.
#[tokio::test]
async fn test_review_requires_auth() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let card_id = ctx.create_test_flashcard("mar", "sea").await;

    let response = server
        .post("/api/practice/review")
        .json(&fixtures::review_request(card_id, true, 1000))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

/// Test unseen cards come before cards scheduled for later.
#[tokio::test]
async fn test_queue_orders_unseen_before_scheduled() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (_, token) = ctx.create_test_learner(None).await;
    let reviewed = ctx.create_test_flashcard("pan", "bread").await;
    let unseen = ctx.create_test_flashcard("queso", "cheese").await;

    let (name, value) = TestContext::auth_header(&token);
    server
        .post("/api/practice/review")
        .add_header(name, value)
        .json(&fixtures::review_request(reviewed, true, 1500))
        .await
        .assert_status_ok();

    let (name, value) = TestContext::auth_header(&token);
    let response = server.get("/api/practice/queue").add_header(name, value).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let cards = body["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["flashcard_id"], unseen.to_string());
    assert_eq!(cards[0]["bucket"], "unseen");
    assert_eq!(cards[0]["state"], "unknown");
    assert_eq!(cards[1]["flashcard_id"], reviewed.to_string());
    assert_eq!(cards[1]["bucket"], "scheduled");
    assert_eq!(cards[1]["state"], "learning");
    assert_eq!(body["due_count"], 0);
    assert_eq!(body["unseen_count"], 1);
    assert_eq!(body["scheduled_count"], 1);
}

/// Test overdue cards lead the queue.
#[tokio::test]
async fn test_queue_puts_due_cards_first() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (learner_id, token) = ctx.create_test_learner(None).await;
    let unseen = ctx.create_test_flashcard("uno", "one").await;
    let due = ctx.create_test_flashcard("dos", "two").await;

    ctx.db
        .upsert_progress(&CardProgress {
            state: MasteryState::Learning,
            mastery_level: 1,
            correct_streak: 1,
            review_count: 1,
            next_review: Some(chrono::Utc::now() - chrono::Duration::hours(1)),
            ..CardProgress::new(learner_id, due)
        })
        .await
        .unwrap();

    let (name, value) = TestContext::auth_header(&token);
    let response = server.get("/api/practice/queue").add_header(name, value).await;

    let body: serde_json::Value = response.json();
    let ids: Vec<&str> = body["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["flashcard_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![due.to_string(), unseen.to_string()]);
    assert_eq!(body["cards"][0]["bucket"], "due");
}

/// Test the queue limit truncates cards but not counts.
#[tokio::test]
async fn test_queue_limit() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (_, token) = ctx.create_test_learner(None).await;
    for word in ["a", "b", "c"] {
        ctx.create_test_flashcard(word, word).await;
    }

    let (name, value) = TestContext::auth_header(&token);
    let response = server
        .get("/api/practice/queue")
        .add_query_param("limit", 2)
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["cards"].as_array().unwrap().len(), 2);
    assert_eq!(body["unseen_count"], 3);
}

/// Test the queue can be limited to cards in one state.
#[tokio::test]
async fn test_queue_filtered_by_state() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (learner_id, token) = ctx.create_test_learner(None).await;
    let unseen = ctx.create_test_flashcard("leche", "milk").await;
    let known = ctx.create_test_flashcard("huevo", "egg").await;
    let forgotten = ctx.create_test_flashcard("sal", "salt").await;

    for (card, state) in [(known, MasteryState::Known), (forgotten, MasteryState::Unknown)] {
        ctx.db
            .upsert_progress(&CardProgress {
                state,
                review_count: 2,
                next_review: Some(chrono::Utc::now() - chrono::Duration::minutes(5)),
                ..CardProgress::new(learner_id, card)
            })
            .await
            .unwrap();
    }

    let (name, value) = TestContext::auth_header(&token);
    let body: serde_json::Value = server
        .get("/api/practice/queue")
        .add_query_param("state", "known")
        .add_header(name, value)
        .await
        .json();
    let cards = body["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["flashcard_id"], known.to_string());

    let (name, value) = TestContext::auth_header(&token);
    let body: serde_json::Value = server
        .get("/api/practice/queue")
        .add_query_param("state", "unknown")
        .add_header(name, value)
        .await
        .json();
    let ids: Vec<&str> = body["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["flashcard_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![forgotten.to_string(), unseen.to_string()]);
    assert_eq!(body["due_count"], 1);
    assert_eq!(body["unseen_count"], 1);
}

/// Test an unrecognized state filter is rejected.
#[tokio::test]
async fn test_queue_rejects_unknown_state_filter() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (_, token) = ctx.create_test_learner(None).await;

    let (name, value) = TestContext::auth_header(&token);
    let response = server
        .get("/api/practice/queue")
        .add_query_param("state", "expert")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "validation_error");
}
