//! Token exchange payloads

use serde::{Deserialize, Serialize};

/// Body for `POST /api/iam/v1/auth/refresh`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRefreshRequest {
    pub refresh_token: String,
}

/// Response carrying the short-lived bearer token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRefreshResponse {
    pub auth_token: String,
}
