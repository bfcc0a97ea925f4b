use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSummary {
    pub members: u64,
    /// Uncompressed bytes read from disk across all members.
    pub bytes_in: u64,
}
