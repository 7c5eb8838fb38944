//! Helper functions shared by webhook/ and messenger/

use crate::errors::ChannelError;
use serde::de::DeserializeOwned;

/// Decodes a JSON request body, rejecting it as a validation error
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ChannelError> {
    serde_json::from_slice(body)
        .map_err(|e| ChannelError::Validation(format!("invalid request body: {e}")))
}

/// Fails with a validation error naming every required field when any of
/// them is blank
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), ChannelError> {
    if fields.iter().all(|(_, value)| !value.trim().is_empty()) {
        return Ok(());
    }

    let names = fields.iter().map(|(name, _)| *name).collect::<Vec<_>>();
    let verb = if names.len() == 1 { "is" } else { "are" };

    Err(ChannelError::Validation(format!(
        "{} {verb} required",
        names.join(", ")
    )))
}

/// Formats Facebook epoch milliseconds for logs
pub fn millis_to_rfc3339(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|datetime| datetime.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}
