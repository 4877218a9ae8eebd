//! Error body shapes shared between the server and its clients.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Generic error body for unexpected failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonError {
    pub error_message: String,
}

/// `{"detail": "..."}` body used for 401/403/404 responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Detail {
            detail: detail.into(),
        }
    }
}

/// Field-scoped validation failures. Top-level field errors serialize as
/// `{"field": "message"}`; errors against the variant payload nest under
/// `"additional_data"`. Collected in full before being returned so a caller
/// sees every missing field at once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_data: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, name: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.fields.insert(name.into(), message.into());
        self
    }

    pub fn additional(&mut self, name: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.additional_data.insert(name.into(), message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.additional_data.is_empty()
    }

    /// Returns `value` if no errors were collected, the errors otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = self
            .fields
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>();
        parts.extend(
            self.additional_data
                .iter()
                .map(|(field, message)| format!("additional_data.{field}: {message}")),
        );
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_errors_serialize_flat() {
        let mut errors = ValidationErrors::new();
        errors.field("listing_type", "Cannot change listing type on update.");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"listing_type": "Cannot change listing type on update."})
        );
    }

    #[test]
    fn payload_errors_nest_under_additional_data() {
        let mut errors = ValidationErrors::new();
        errors.additional("category", "This field is required for item");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"additional_data": {"category": "This field is required for item"}})
        );
    }

    #[test]
    fn into_result_passes_through_when_clean() {
        let errors = ValidationErrors::new();
        assert_eq!(errors.into_result(5), Ok(5));
    }
}
