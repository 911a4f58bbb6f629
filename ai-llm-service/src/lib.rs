//! Generation backend for the merge-request reviewer.
//!
//! - [`services::ollama_service::OllamaService`] sends one prompt to
//!   `POST {endpoint}/api/generate` and returns a [`GenerationResult`].
//! - [`health_service::HealthService`] probes `GET {endpoint}/api/tags`.
//! - [`telemetry`] renders only this crate's events.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod services;
pub mod telemetry;

pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use services::ollama_service::{GenerationResult, OllamaService};
