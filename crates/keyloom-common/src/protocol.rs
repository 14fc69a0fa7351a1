//! Messages exchanged with the suggestion worker
//!
//! One request produces at most one response. Responses echo the request
//! `id` so overlapping requests on the shared response channel can be
//! matched by the caller.

use serde::{Deserialize, Serialize};

use crate::schema::Collection;

/// Request for one suggestion computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestRequest {
    /// Correlation id, echoed verbatim in the response.
    pub id: u64,

    /// The schema snapshot to enumerate. An empty list makes the worker
    /// drop the request without replying.
    pub collections: Vec<Collection>,

    /// Name of the reference collection `base_keys` are computed for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_collection: Option<String>,

    #[serde(default)]
    pub disable_request_keys: bool,

    #[serde(default)]
    pub disable_collection_join_keys: bool,
}

/// Result bundle for one suggestion computation.
///
/// Skipped key sets are absent, not null and not empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub id: u64,

    pub base_keys: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_keys: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_join_keys: Option<Vec<String>>,
}
