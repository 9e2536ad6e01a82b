//! Turn record types
//!
//! Ephemeral data produced and consumed within a single turn. Rumor records
//! are informational; only articles survive the turn (in the country feed)
//! and only the history record survives the country session.

use serde::{Deserialize, Serialize};

/// One node's adopted rumor for the current turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RumorRecord {
    pub node_id: usize,
    pub text: String,
    /// How hard the rumor pushes outward, in [0, 1]
    pub propagation_strength: f32,
    /// How readily the holder believed it, in [0, 1]
    pub credibility: f32,
}

/// The journalist's output for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub event_text: String,
    /// Rumors joined in node-id order with " / "
    pub aggregated_rumors: String,
    pub article: String,
}

/// The historian's consolidation of a country's feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub consolidated: String,
}
