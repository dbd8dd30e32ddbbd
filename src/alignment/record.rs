use serde::Deserialize;

/// A raw alignment record as delivered by a read backend.
///
/// Positions are 0-based. `cigar`, `original_bases` and `base_quality` may all be
/// absent for unmapped reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRead {
    /// Backend-supplied id. Not guaranteed to be unique.
    #[serde(default)]
    pub id: Option<String>,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    pub position: u64,
    #[serde(default)]
    pub cigar: Option<String>,
    #[serde(default)]
    pub original_bases: Option<String>,
    /// Per-base qualities, Phred+33 encoded.
    #[serde(default)]
    pub base_quality: Option<String>,
    /// SAM flags bitfield.
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub mate_position: Option<u64>,
    #[serde(default)]
    pub mapping_quality: Option<u32>,
}

/// One page of a paginated read response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadPage {
    #[serde(default)]
    pub reads: Vec<RawRead>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl ReadPage {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Whether the backend has more pages for the same query.
    pub fn has_more(&self) -> bool {
        self.next_page_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}
