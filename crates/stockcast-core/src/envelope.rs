use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::gateway::DataOrigin;
use crate::ValidationError;

pub const SCHEMA_VERSION: &str = "v1.0.0";

/// Response wrapper for machine-readable output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn success(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data,
            errors: Vec::new(),
        }
    }

    pub fn push_error(&mut self, error: EnvelopeError) -> Result<(), ValidationError> {
        error.validate()?;
        self.errors.push(error);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub schema_version: String,
    /// RFC 3339 UTC timestamp.
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(request_id: impl Into<String>, latency_ms: u64) -> Result<Self, ValidationError> {
        let now = OffsetDateTime::now_utc();
        let meta = Self {
            request_id: request_id.into(),
            schema_version: String::from(SCHEMA_VERSION),
            generated_at: now.format(&Rfc3339).unwrap_or_else(|_| now.to_string()),
            origin: None,
            latency_ms,
            warnings: Vec::new(),
        };
        meta.validate()?;
        Ok(meta)
    }

    pub fn with_origin(mut self, origin: DataOrigin) -> Self {
        self.origin = Some(origin.to_string());
        self
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_id.trim().len() < 8 {
            return Err(ValidationError::InvalidRequestId);
        }
        if !is_valid_schema_version(&self.schema_version) {
            return Err(ValidationError::InvalidSchemaVersion {
                value: self.schema_version.clone(),
            });
        }
        Ok(())
    }
}

/// Error payload for failed responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
}

impl EnvelopeError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let error = Self {
            code: code.into(),
            message: message.into(),
        };
        error.validate()?;
        Ok(error)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyErrorCode);
        }
        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyErrorMessage);
        }
        Ok(())
    }
}

fn is_valid_schema_version(value: &str) -> bool {
    let Some(version) = value.strip_prefix('v') else {
        return false;
    };

    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::ProviderId;

    #[test]
    fn meta_carries_origin_and_warnings() {
        let meta = EnvelopeMeta::new("2f1c9a3e-request", 12)
            .expect("meta")
            .with_origin(DataOrigin::Live(ProviderId::Backend))
            .with_warnings(vec![String::from("search: timeout")]);

        let json = serde_json::to_value(Envelope::success(meta, vec![1, 2])).expect("json");
        assert_eq!(json["meta"]["schema_version"], "v1.0.0");
        assert_eq!(json["meta"]["origin"], "live:backend");
        assert_eq!(json["meta"]["warnings"][0], "search: timeout");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("errors").is_none());
        assert!(json["meta"]["generated_at"]
            .as_str()
            .is_some_and(|ts| ts.ends_with('Z')));
    }

    #[test]
    fn rejects_short_request_ids_and_blank_errors() {
        assert_eq!(
            EnvelopeMeta::new("abc", 0),
            Err(ValidationError::InvalidRequestId)
        );
        assert_eq!(
            EnvelopeError::new("", "message"),
            Err(ValidationError::EmptyErrorCode)
        );
        assert_eq!(
            EnvelopeError::new("validation", " "),
            Err(ValidationError::EmptyErrorMessage)
        );
    }

    #[test]
    fn schema_versions_need_three_numeric_parts() {
        assert!(is_valid_schema_version("v1.0.0"));
        assert!(!is_valid_schema_version("1.0.0"));
        assert!(!is_valid_schema_version("v1.0"));
        assert!(!is_valid_schema_version("v1.x.0"));
    }
}
