//! Errors surfaced to the presentation layer.

use data_loader::DataLoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommendError {
    /// The query title matches no movie in the table
    #[error("Movie '{title}' not found")]
    NotFound { title: String },

    /// The table holds no movie other than the query
    #[error("No other movies to recommend for '{title}'")]
    EmptyResult { title: String },

    /// The online state could not be loaded or built
    #[error("Startup failed: {0}")]
    Startup(#[from] DataLoadError),
}
