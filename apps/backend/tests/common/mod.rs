//! Common test utilities and fixtures for integration tests.
//!
//! Every TestContext owns a fresh in-memory SQLite database with the
//! default state thresholds seeded, so tests need no external services.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue};
use axum::Router;
use uuid::Uuid;

use lexis_backend::db::Database;
use lexis_backend::models::{CardProgress, CreateFlashcardRequest, CreateLessonRequest};
use lexis_backend::services::RetryPolicy;
use lexis_backend::{build_router, AppState};

/// Test context containing the database and the application router.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if the in-memory database cannot be set up.
    pub async fn new() -> Self {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");

        db.seed_default_thresholds()
            .await
            .expect("Failed to seed thresholds");

        let state = AppState::new(db, RetryPolicy::none());
        let db = state.db.clone();
        let app = build_router(state);

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a test learner and return its ID and token.
    pub async fn create_test_learner(&self, name: Option<&str>) -> (Uuid, String) {
        let learner = self
            .db
            .create_learner(name)
            .await
            .expect("Failed to create test learner");
        (learner.id, learner.token)
    }

    /// Create a flashcard and return its ID.
    pub async fn create_test_flashcard(&self, front: &str, back: &str) -> Uuid {
        self.create_lesson_flashcard(None, front, back).await
    }

    /// Create a flashcard in a lesson and return its ID.
    pub async fn create_lesson_flashcard(
        &self,
        lesson_id: Option<Uuid>,
        front: &str,
        back: &str,
    ) -> Uuid {
        self.db
            .create_flashcard(&CreateFlashcardRequest {
                front_text: front.to_string(),
                back_text: back.to_string(),
                example_sentence: None,
                lesson_id,
            })
            .await
            .expect("Failed to create test flashcard")
            .id
    }

    /// Create a lesson and return its ID.
    pub async fn create_test_lesson(&self, title: &str, order_index: i64) -> Uuid {
        self.db
            .create_lesson(&CreateLessonRequest {
                title: title.to_string(),
                description: None,
                order_index,
            })
            .await
            .expect("Failed to create test lesson")
            .id
    }

    /// Stored progress of a learner on a card.
    pub async fn progress(&self, learner_id: Uuid, flashcard_id: Uuid) -> Option<CardProgress> {
        self.db
            .get_progress(learner_id, flashcard_id)
            .await
            .expect("Failed to read progress")
    }

    /// Authorization header for a learner token.
    pub fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .expect("Token is not a valid header value");
        (AUTHORIZATION, value)
    }
}
