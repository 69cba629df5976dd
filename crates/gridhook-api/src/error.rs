//! Extension-point error types.

use thiserror::Error;

/// Failure while serving a single extender callback.
///
/// How each variant reaches the scheduler is per-endpoint policy: the filter
/// and bind endpoints stringify it into the response body under HTTP 200,
/// the prioritize endpoint aborts the request, and the preemption endpoint
/// turns decode failures into a bare 400.
#[derive(Debug, Error)]
pub enum ExtenderError {
    /// The request body was not valid JSON for the route's wire type.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The operator's decision function returned an error.
    #[error("evaluation error: {0}")]
    Eval(#[source] anyhow::Error),

    /// The operator's decision function broke an output invariant.
    #[error("contract violation: {0}")]
    Contract(String),
}
