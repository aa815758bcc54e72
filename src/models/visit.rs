use serde::{Deserialize, Serialize};

/// Body of a visit registration request
///
/// Missing fields decode as empty strings; only malformed JSON or wrongly
/// typed fields are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    #[serde(rename = "url", default)]
    pub page: String,
    #[serde(default)]
    pub visitor_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageVisitStats {
    pub unique_visitors: u64,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub url: Option<String>,
}
