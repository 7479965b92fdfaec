//! Save document parsing, querying, and mutation.
//!
//! The decompressed blob is a JSON object with a `mainSave` section holding
//! `metadata` and `data` objects; the money value is stored in both, and the
//! most recent `financialHistory` entry mirrors it as a `balance`. Only
//! those fields are ever touched; everything else passes through the
//! re-encode unchanged, in its original key order.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to parse save JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("{0} is not an object")]
    NotAnObject(&'static str),

    #[error("financialHistory.entries is malformed: {0}")]
    MalformedHistory(&'static str),

    #[error("money value must be finite, got {0}")]
    NonFinite(f64),
}

#[derive(Error, Debug)]
pub enum ValueParseError {
    #[error("not a number: '{0}'")]
    Invalid(String),

    #[error("value must be finite, got {0}")]
    NonFinite(f64),
}

/// A decoded save document with query/modify capabilities.
pub struct SaveDocument {
    data: Value,
}

impl SaveDocument {
    /// Parse a decompressed save blob as UTF-8 JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DocumentError> {
        let data = serde_json::from_slice(bytes)?;
        Ok(SaveDocument { data })
    }

    /// Serialize back to compact UTF-8 JSON (no insignificant whitespace).
    ///
    /// Key order is preserved from the parsed input, so encoding the same
    /// document twice yields identical bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, DocumentError> {
        Ok(serde_json::to_vec(&self.data)?)
    }

    /// Get `mainSave.metadata.money`.
    pub fn metadata_money(&self) -> Option<f64> {
        self.data
            .get("mainSave")
            .and_then(|s| s.get("metadata"))
            .and_then(|m| m.get("money"))
            .and_then(Value::as_f64)
    }

    /// Get `mainSave.data.money`.
    pub fn data_money(&self) -> Option<f64> {
        self.data
            .get("mainSave")
            .and_then(|s| s.get("data"))
            .and_then(|d| d.get("money"))
            .and_then(Value::as_f64)
    }

    /// Get the `balance` of the last `financialHistory` entry, if the
    /// history exists and is non-empty.
    pub fn last_balance(&self) -> Option<f64> {
        self.data
            .get("mainSave")
            .and_then(|s| s.get("data"))
            .and_then(|d| d.get("financialHistory"))
            .and_then(|h| h.get("entries"))
            .and_then(Value::as_array)
            .and_then(|entries| entries.last())
            .and_then(|entry| entry.get("balance"))
            .and_then(Value::as_f64)
    }

    /// Set the money value everywhere the save stores it:
    /// `mainSave.metadata.money`, `mainSave.data.money`, and the `balance`
    /// of the last `financialHistory` entry (created if absent) when the
    /// history is present and non-empty.
    ///
    /// A missing `financialHistory` or `entries`, or an empty entry list, is
    /// tolerated; `entries` holding anything other than a sequence of
    /// objects is rejected as malformed.
    pub fn set_money(&mut self, value: f64) -> Result<(), DocumentError> {
        let number = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .ok_or(DocumentError::NonFinite(value))?;

        let main = self
            .data
            .get_mut("mainSave")
            .ok_or_else(|| DocumentError::KeyNotFound("mainSave".to_string()))?;

        let metadata = main
            .get_mut("metadata")
            .ok_or_else(|| DocumentError::KeyNotFound("mainSave.metadata".to_string()))?
            .as_object_mut()
            .ok_or(DocumentError::NotAnObject("mainSave.metadata"))?;
        metadata.insert("money".to_string(), number.clone());

        let data = main
            .get_mut("data")
            .ok_or_else(|| DocumentError::KeyNotFound("mainSave.data".to_string()))?
            .as_object_mut()
            .ok_or(DocumentError::NotAnObject("mainSave.data"))?;
        data.insert("money".to_string(), number.clone());

        if let Some(entries) = data
            .get_mut("financialHistory")
            .and_then(|h| h.get_mut("entries"))
        {
            let entries = entries
                .as_array_mut()
                .ok_or(DocumentError::MalformedHistory("not a sequence"))?;
            if entries.iter().any(|e| !e.is_object()) {
                return Err(DocumentError::MalformedHistory(
                    "contains a non-object entry",
                ));
            }
            if let Some(last) = entries.last_mut().and_then(Value::as_object_mut) {
                last.insert("balance".to_string(), number);
            }
        }

        Ok(())
    }
}

/// Validate a user-supplied replacement value.
///
/// Accepts anything `f64` accepts ("12345", "12345.67", "-2.5e3") after
/// trimming whitespace; rejects non-finite values, which the JSON document
/// cannot represent.
pub fn parse_money_input(input: &str) -> Result<f64, ValueParseError> {
    let trimmed = input.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| ValueParseError::Invalid(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(ValueParseError::NonFinite(value));
    }
    Ok(value)
}
