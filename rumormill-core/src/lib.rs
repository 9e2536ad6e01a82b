//! Rumormill Core - belief network primitives
//!
//! This crate provides the propagation substrate:
//! - Nodes with threshold-driven susceptibility and a habituation rule
//! - The directed belief network with hub seeding and rumor-driven growth
//! - Turn record types (rumor, news, history)

pub mod network;
pub mod node;
pub mod records;

pub use network::*;
pub use node::*;
pub use records::*;

/// Susceptibility never drops below this floor
pub const MIN_THRESHOLD: f32 = 0.05;

/// Score gained when a node adopts a rumor
pub const ADOPT_SCORE: f32 = 0.2;

/// Score lost when a node rejects (or fails to receive) a rumor
pub const REJECT_SCORE: f32 = -0.1;

/// Attempt cap for a single growth pass over a near-saturated graph
pub const MAX_GROWTH_ATTEMPTS: usize = 100;
