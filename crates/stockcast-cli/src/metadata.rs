use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use stockcast_core::{DataOrigin, EnvelopeMeta, ValidationError};
use uuid::Uuid;

/// Request identifier (UUID v4) for end-to-end request tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Command metadata collected while a command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub request_id: RequestId,
    pub origin: Option<DataOrigin>,
    pub latency_ms: u64,
    pub warnings: Vec<String>,
}

impl Metadata {
    pub fn new(origin: Option<DataOrigin>, latency_ms: u64) -> Self {
        Self {
            request_id: RequestId::new_v4(),
            origin,
            latency_ms,
            warnings: Vec::new(),
        }
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn into_envelope_meta(self) -> Result<EnvelopeMeta, ValidationError> {
        let mut meta = EnvelopeMeta::new(self.request_id.to_string(), self.latency_ms)?
            .with_warnings(self.warnings);
        if let Some(origin) = self.origin {
            meta = meta.with_origin(origin);
        }
        Ok(meta)
    }
}
