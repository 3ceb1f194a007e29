//! Server crate for the ReelRecs recommendation engine.
//!
//! This crate holds the online side: configuration, the immutable
//! recommender state, the top-K ranker and the orchestrator the CLI talks to.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod ranker;
pub mod state;

pub use config::Config;
pub use error::RecommendError;
pub use orchestrator::{MovieRecommendation, RecommendationOrchestrator};
pub use state::RecommenderState;
