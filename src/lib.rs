//! Utility Advisor Library
//!
//! A utility-provider directory with a chat advisor. Each chat message is run
//! through profile extraction, a provider lookup for the user's ZIP code, reply
//! generation (external completion service with a rule-based fallback), and
//! recommendation ranking.
//!
//! # Modules
//!
//! - `api`: Router, middleware and OpenAPI document.
//! - `core`: Conversation pipeline.
//! - `integrations`: Provider sources and the completion delegate.
//! - `advisor`: Conversation orchestration for one turn.
//! - `api_models`: Request and response bodies.
//! - `completion`: OpenAI-compatible completion client.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `directory`: Built-in provider directory for supported cities.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `profile`: Profile extraction from free text.
//! - `ranker`: Provider and bundle recommendations.
//! - `responder`: Reply generation.
//! - `rules`: Rule-based reply cascade.
//! - `source`: Provider source abstraction and Postgres implementation.

pub mod api;
pub mod core;
pub mod integrations;

pub mod advisor;
pub mod api_models;
pub mod completion;
pub mod config;
pub mod db;
pub mod directory;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod profile;
pub mod ranker;
pub mod responder;
pub mod rules;
pub mod source;
