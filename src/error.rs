use thiserror::Error;

/// Why a profile lookup failed. Every variant ends up as the error message
/// shown under the search box.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("User not found")]
    NotFound,

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Unexpected response from GitHub: {0}")]
    Decode(#[source] reqwest::Error),
}
