//! Success-flag outcome used at batch boundaries.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A typed outcome: success flag, human-readable message and the value on success.
///
/// Batch callers turn each document's `Result` into an `Outcome` so one bad
/// document never stops the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
}

impl<T> Outcome<T> {
    pub fn ok(value: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            value: Some(value),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            value: None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            success: self.success,
            message: self.message,
            value: self.value.map(f),
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for Outcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::ok(value, "ok"),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;

    #[test]
    fn test_from_result() {
        let ok: Outcome<u32> = Ok::<_, ExtractionError>(7).into();
        assert!(ok.success);
        assert_eq!(ok.value, Some(7));

        let failed: Outcome<u32> = Err(ExtractionError::StructureNotRecognized).into();
        assert!(!failed.success);
        assert_eq!(failed.message, "fiscal document structure not recognized");
        assert_eq!(failed.value, None);
    }

    #[test]
    fn test_map_and_serialize() {
        let outcome = Outcome::ok(2, "done").map(|n| n * 10);
        assert_eq!(outcome.value, Some(20));

        let json = serde_json::to_value(Outcome::<u32>::failed("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "message": "boom" }));
    }
}
