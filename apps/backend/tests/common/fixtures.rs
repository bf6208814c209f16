//! Test fixtures and factory functions for request bodies.

use serde_json::json;
use uuid::Uuid;

use lexis_backend::models::RawThreshold;
use lexis_core::ThresholdTable;

/// Create a learner register request body.
pub fn register_request(name: Option<&str>) -> serde_json::Value {
    match name {
        Some(n) => json!({ "name": n }),
        None => json!({}),
    }
}

/// Create a flashcard request body.
pub fn flashcard_request(front: &str, back: &str) -> serde_json::Value {
    json!({
        "front_text": front,
        "back_text": back,
        "example_sentence": format!("{} ...", front)
    })
}

/// Create a lesson request body.
pub fn lesson_request(title: &str, order_index: i64) -> serde_json::Value {
    json!({
        "title": title,
        "description": format!("Words about {}", title.to_lowercase()),
        "order_index": order_index
    })
}

/// Create a submit review request body.
pub fn review_request(flashcard_id: Uuid, correct: bool, response_time_ms: i64) -> serde_json::Value {
    json!({
        "flashcard_id": flashcard_id,
        "correct": correct,
        "response_time_ms": response_time_ms
    })
}

/// The built-in threshold rows.
pub fn standard_thresholds() -> Vec<RawThreshold> {
    ThresholdTable::standard_rows()
}

/// Create a replace thresholds request body.
pub fn thresholds_request(rows: &[RawThreshold]) -> serde_json::Value {
    json!({ "thresholds": rows })
}
