use serde::{Deserialize, Serialize};
use linkhash_types::ShortKey;

/// Body of a create request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateLinkRequest {
    pub link: String,
}

/// Body of a create response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateLinkResponse {
    /// Full short link: `<base_url>/<key>`.
    pub link: String,
    pub key: ShortKey,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub entries: usize,
    /// Entries stored under a suffixed key after a derived-key collision.
    pub collisions: usize,
}

impl HealthResponse {
    pub fn ok(entries: usize, collisions: usize) -> Self {
        Self {
            status: "ok".into(),
            entries,
            collisions,
        }
    }
}
