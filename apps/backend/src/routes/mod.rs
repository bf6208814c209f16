//! HTTP route handlers

pub mod auth;
pub mod flashcards;
pub mod learners;
pub mod lessons;
pub mod practice;
pub mod progress;
pub mod settings;
