use serde::{Deserialize, Serialize};

pub const ACCESS_CHECK_PATH: &str = "/api/v1/access/check";
pub const HEADER_API_KEY: &str = "x-codified-api-key";

/// Document descriptor as the access-check API expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
}

/// Body of `POST /api/v1/access/check`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckAccessRequest {
    pub data: Vec<DocumentRef>,
    pub username: String,
}

/// Success body of the access check.
///
/// `results` is required by the API contract. It is optional here so that a
/// response missing the field can be reported as a contract violation instead
/// of a generic deserialization failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckAccessResponse {
    pub results: Option<Vec<AccessResult>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessResult {
    pub data: DocumentRef,
    pub has_permission: bool,
}
