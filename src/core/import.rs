//! Reading the extraction model's answer.
//!
//! The model is asked for `{"medications": [...]}` but often wraps it in a
//! markdown code fence, and occasionally returns the bare array.

use serde::Deserialize;
use thiserror::Error;

use crate::models::med::Medication;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to parse medication data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no medications found")]
    Empty,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Response {
    Wrapped { medications: Vec<Medication> },
    Bare(Vec<Medication>),
}

/// Strip a surrounding ```` ``` ```` or ```` ```json ```` fence, if any.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parse medications from a model response. Dose times are normalized to
/// sorted, unique `HH:MM`; times that do not parse are kept as-is.
pub fn parse_medications(response: &str) -> Result<Vec<Medication>, ImportError> {
    let json = strip_code_fence(response);
    let mut medications = match serde_json::from_str(json)? {
        Response::Wrapped { medications } => medications,
        Response::Bare(medications) => medications,
    };
    if medications.is_empty() {
        return Err(ImportError::Empty);
    }
    for m in &mut medications {
        m.normalize_times();
    }
    Ok(medications)
}
