//! SQLite database operations

pub mod error;

use std::str::FromStr;

use chrono::Utc;
use lexis_core::{CardProgress, MasteryState, RawThreshold, ThresholdTable};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use uuid::Uuid;

pub use error::DbError;

use crate::models::*;

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, DbError>;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to SQLite and create connection pool
    ///
    /// In-memory databases live inside a single connection, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(10)
                .connect_with(options)
                .await?
        };

        Ok(Self { pool })
    }

    /// Fresh in-memory database with migrations applied
    pub async fn in_memory() -> Result<Self> {
        let db = Self::connect("sqlite::memory:").await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // === Learner Repository ===

    /// Create a new learner with generated token
    pub async fn create_learner(&self, name: Option<&str>) -> Result<Learner> {
        let now = Utc::now();
        let learner = sqlx::query_as::<_, Learner>(
            r#"
            INSERT INTO learners (id, token, name, created_at, last_seen_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, token, name, created_at, last_seen_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(learner)
    }

    /// Get learner by token
    pub async fn get_learner_by_token(&self, token: &str) -> Result<Option<Learner>> {
        let learner = sqlx::query_as::<_, Learner>(
            r#"
            SELECT id, token, name, created_at, last_seen_at
            FROM learners
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(learner)
    }

    /// Update learner last_seen_at timestamp
    pub async fn update_last_seen(&self, learner_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE learners SET last_seen_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(learner_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // === Flashcard Repository ===

    /// Insert a flashcard
    pub async fn create_flashcard(&self, request: &CreateFlashcardRequest) -> Result<Flashcard> {
        let card = sqlx::query_as::<_, Flashcard>(
            r#"
            INSERT INTO flashcards (id, front_text, back_text, example_sentence, lesson_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, front_text, back_text, example_sentence, lesson_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.front_text)
        .bind(&request.back_text)
        .bind(&request.example_sentence)
        .bind(request.lesson_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(card)
    }

    /// Get flashcard by ID
    pub async fn get_flashcard(&self, flashcard_id: Uuid) -> Result<Option<Flashcard>> {
        let card = sqlx::query_as::<_, Flashcard>(
            r#"
            SELECT id, front_text, back_text, example_sentence, lesson_id, created_at
            FROM flashcards
            WHERE id = $1
            "#,
        )
        .bind(flashcard_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    /// List all flashcards in creation order
    pub async fn list_flashcards(&self) -> Result<Vec<Flashcard>> {
        let cards = sqlx::query_as::<_, Flashcard>(
            r#"
            SELECT id, front_text, back_text, example_sentence, lesson_id, created_at
            FROM flashcards
            ORDER BY created_at, rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    /// All flashcard IDs in creation order
    pub async fn get_all_card_ids(&self) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM flashcards ORDER BY created_at, rowid")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    /// Flashcard IDs of one lesson in creation order
    pub async fn get_card_ids_for_lesson(&self, lesson_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM flashcards WHERE lesson_id = $1 ORDER BY created_at, rowid",
        )
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    // === Lesson Repository ===

    /// Insert a lesson
    pub async fn create_lesson(&self, request: &CreateLessonRequest) -> Result<Lesson> {
        let lesson = sqlx::query_as::<_, Lesson>(
            r#"
            INSERT INTO lessons (id, title, description, order_index, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, order_index, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.order_index)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(lesson)
    }

    /// Get lesson by ID
    pub async fn get_lesson(&self, lesson_id: Uuid) -> Result<Option<Lesson>> {
        let lesson = sqlx::query_as::<_, Lesson>(
            r#"
            SELECT id, title, description, order_index, created_at
            FROM lessons
            WHERE id = $1
            "#,
        )
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lesson)
    }

    /// Lessons in display order with a learner's completion counts
    pub async fn list_lessons_for_user(&self, user_id: Uuid) -> Result<Vec<LessonSummary>> {
        let lessons = sqlx::query_as::<_, LessonSummary>(
            r#"
            SELECT l.id, l.title, l.description, l.order_index,
                   COUNT(f.id) AS flashcard_count,
                   COALESCE(SUM(CASE WHEN wp.state IN ($2, $3) THEN 1 ELSE 0 END), 0)
                       AS mastered_count
            FROM lessons l
            LEFT JOIN flashcards f ON f.lesson_id = l.id
            LEFT JOIN word_progress wp ON wp.flashcard_id = f.id AND wp.user_id = $1
            GROUP BY l.id
            ORDER BY l.order_index, l.created_at, l.rowid
            "#,
        )
        .bind(user_id)
        .bind(MasteryState::Mastered.as_str())
        .bind(MasteryState::LongTerm.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(lessons)
    }

    // === Progress Repository ===

    /// Get progress for one learner and flashcard
    pub async fn get_progress(&self, user_id: Uuid, flashcard_id: Uuid) -> Result<Option<CardProgress>> {
        let row = sqlx::query_as::<_, DbCardProgress>(
            r#"
            SELECT user_id, flashcard_id, state, mastery_level, correct_streak, review_count,
                   score, last_reviewed, next_review, response_time_ms
            FROM word_progress
            WHERE user_id = $1 AND flashcard_id = $2
            "#,
        )
        .bind(user_id)
        .bind(flashcard_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DbCardProgress::into_core).transpose()?)
    }

    /// Upsert progress keyed by (user_id, flashcard_id)
    pub async fn upsert_progress(&self, progress: &CardProgress) -> Result<CardProgress> {
        let row = DbCardProgress::from_core(progress);
        let saved = sqlx::query_as::<_, DbCardProgress>(
            r#"
            INSERT INTO word_progress (user_id, flashcard_id, state, mastery_level, correct_streak,
                                       review_count, score, last_reviewed, next_review,
                                       response_time_ms, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id, flashcard_id) DO UPDATE SET
                state = excluded.state,
                mastery_level = excluded.mastery_level,
                correct_streak = excluded.correct_streak,
                review_count = excluded.review_count,
                score = excluded.score,
                last_reviewed = excluded.last_reviewed,
                next_review = excluded.next_review,
                response_time_ms = excluded.response_time_ms,
                updated_at = excluded.updated_at
            RETURNING user_id, flashcard_id, state, mastery_level, correct_streak, review_count,
                      score, last_reviewed, next_review, response_time_ms
            "#,
        )
        .bind(row.user_id)
        .bind(row.flashcard_id)
        .bind(&row.state)
        .bind(row.mastery_level)
        .bind(row.correct_streak)
        .bind(row.review_count)
        .bind(row.score)
        .bind(row.last_reviewed)
        .bind(row.next_review)
        .bind(row.response_time_ms)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(saved.into_core()?)
    }

    /// All progress records for a learner, soonest due first
    pub async fn get_all_progress_for_user(&self, user_id: Uuid) -> Result<Vec<CardProgress>> {
        let rows = sqlx::query_as::<_, DbCardProgress>(
            r#"
            SELECT user_id, flashcard_id, state, mastery_level, correct_streak, review_count,
                   score, last_reviewed, next_review, response_time_ms
            FROM word_progress
            WHERE user_id = $1
            ORDER BY next_review
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_core().map_err(DbError::from))
            .collect()
    }

    /// Delete every progress record of a learner
    pub async fn delete_all_progress_for_user(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM word_progress WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Reviewed flashcards joined with the learner's progress
    pub async fn get_word_states(&self, user_id: Uuid) -> Result<Vec<DbWordState>> {
        let rows = sqlx::query_as::<_, DbWordState>(
            r#"
            SELECT f.id AS flashcard_id, f.front_text, f.back_text, f.example_sentence,
                   l.title AS lesson_title,
                   wp.state, wp.mastery_level, wp.score, wp.last_reviewed, wp.next_review
            FROM flashcards f
            JOIN word_progress wp ON wp.flashcard_id = f.id AND wp.user_id = $1
            LEFT JOIN lessons l ON l.id = f.lesson_id
            ORDER BY f.front_text
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // === Threshold Repository ===

    /// Stored threshold rows, least demanding first
    pub async fn get_state_thresholds(&self) -> Result<Vec<RawThreshold>> {
        let rows = sqlx::query_as::<_, DbStateThreshold>(
            r#"
            SELECT state, name, description, min_mastery_level, min_correct_streak,
                   min_review_count, max_response_time_ms, score_weight, next_review_delay
            FROM learning_settings
            ORDER BY min_mastery_level, min_correct_streak, min_review_count
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DbStateThreshold::into_raw).collect())
    }

    /// Replace the whole threshold table in one transaction
    pub async fn replace_state_thresholds(&self, rows: &[RawThreshold]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM learning_settings")
            .execute(&mut *tx)
            .await?;

        let now = Utc::now();
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO learning_settings (state, name, description, min_mastery_level,
                                               min_correct_streak, min_review_count,
                                               max_response_time_ms, score_weight,
                                               next_review_delay, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(&row.state)
            .bind(&row.name)
            .bind(&row.description)
            .bind(row.min_mastery_level)
            .bind(row.min_correct_streak)
            .bind(row.min_review_count)
            .bind(row.max_response_time_ms)
            .bind(row.score_weight)
            .bind(&row.next_review_delay)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Seed the built-in thresholds when the table is empty
    ///
    /// Returns whether rows were written.
    pub async fn seed_default_thresholds(&self) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM learning_settings")
            .fetch_one(&self.pool)
            .await?;

        if count > 0 {
            return Ok(false);
        }

        self.replace_state_thresholds(&ThresholdTable::standard_rows())
            .await?;
        Ok(true)
    }
}
