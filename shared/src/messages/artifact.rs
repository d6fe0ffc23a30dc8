//! Artifact reference and label payloads

use serde::{Deserialize, Serialize};

/// Named link to an externally hosted artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactReferencePayload {
    pub name: String,
    pub value: String,
}

impl ArtifactReferencePayload {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Key-value label attached to a test or run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPayload {
    pub key: String,
    pub value: String,
}

impl LabelPayload {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Labels and artifact references are both shipped wrapped in `{"items": […]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsEnvelope<T> {
    pub items: Vec<T>,
}

impl<T> ItemsEnvelope<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}
