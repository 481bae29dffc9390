//! Error types surfaced by the synchronous engines.
//!
//! Rate computation and location validation never fail; their problems are
//! returned as values. Only payload construction has a hard failure mode.

/// Fatal problems while assembling a reservation edit request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),
}
