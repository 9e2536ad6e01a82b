//! Nodes - the agents a rumor passes through
//!
//! Every node owns a private seeded random stream so that concurrent
//! provider calls never contend for a shared generator and a run can be
//! replayed bit-for-bit from its seed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{ADOPT_SCORE, MIN_THRESHOLD, REJECT_SCORE};

/// Role a node plays in the propagation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// The hub; aggregates rumors into articles, never adopts one
    Journalist,
    /// Named character from the world roster
    MainCharacter,
    /// Everyone else
    Citizen,
    /// Consolidates the feed into history, never adopts a rumor
    Historian,
}

impl NodeRole {
    /// Listeners are the nodes eligible to adopt rumors
    pub fn is_listener(self) -> bool {
        matches!(self, NodeRole::Citizen | NodeRole::MainCharacter)
    }
}

/// A single agent in the belief network
#[derive(Debug, Clone)]
pub struct Node {
    id: usize,
    role: NodeRole,
    /// Susceptibility; lower means easier rumor adoption. Never below 0.05.
    threshold: f32,
    /// Two-component receptivity vector
    trait_weights: [f32; 2],
    /// Influence accumulated this turn, reset by `update_threshold`
    score: f32,
    /// Rumor currently held, cleared or replaced each turn
    current_rumor: Option<String>,
    rng: SmallRng,
}

impl Node {
    /// Create a node whose random stream is derived from the network seed
    /// and its own id.
    pub fn new(id: usize, role: NodeRole, threshold: f32, trait_weights: [f32; 2], network_seed: u64) -> Self {
        Self {
            id,
            role,
            threshold,
            trait_weights,
            score: 0.0,
            current_rumor: None,
            rng: SmallRng::seed_from_u64(network_seed.wrapping_add(id as u64)),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn trait_weights(&self) -> [f32; 2] {
        self.trait_weights
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn current_rumor(&self) -> Option<&str> {
        self.current_rumor.as_deref()
    }

    pub fn is_listener(&self) -> bool {
        self.role.is_listener()
    }

    /// Next value in [0, 1) from this node's private stream
    pub fn draw_unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Record a successful adoption for this turn
    pub fn adopt_rumor(&mut self, text: String) {
        self.current_rumor = Some(text);
        self.score += ADOPT_SCORE;
    }

    /// Record a rejection (or a failed delivery) for this turn
    pub fn reject_rumor(&mut self) {
        self.current_rumor = None;
        self.score += REJECT_SCORE;
    }

    /// Habituation rule, applied once per node per turn.
    ///
    /// Any exposure - positive or negative - lowers resistance and nudges
    /// receptivity upward; this is reinforcement, not truth-tracking.
    pub fn update_threshold(&mut self) {
        self.threshold = (self.threshold - self.score.abs() * 0.1).max(MIN_THRESHOLD);
        let delta = self.score * 0.01;
        self.trait_weights[0] += delta;
        self.trait_weights[1] += delta;
        self.score = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adaptation_rule() {
        let mut node = Node::new(3, NodeRole::Citizen, 1.0, [1.0, 1.0], 42);
        // three adoptions in one turn: 0.6 accumulated
        node.adopt_rumor("a".into());
        node.adopt_rumor("b".into());
        node.adopt_rumor("c".into());
        assert!((node.score() - 0.6).abs() < 1e-6);

        node.update_threshold();
        assert!((node.threshold() - 0.94).abs() < 1e-6);
        assert!((node.trait_weights()[0] - 1.006).abs() < 1e-6);
        assert!((node.trait_weights()[1] - 1.006).abs() < 1e-6);
        assert_eq!(node.score(), 0.0);
    }

    #[test]
    fn test_threshold_floor() {
        let mut node = Node::new(0, NodeRole::Citizen, 1.0, [1.0, 1.0], 7);
        for _ in 0..100 {
            node.adopt_rumor("loud rumor".into());
            node.adopt_rumor("louder rumor".into());
            node.update_threshold();
        }
        assert!(node.threshold() >= MIN_THRESHOLD);
        assert!((node.threshold() - MIN_THRESHOLD).abs() < 1e-6);
    }

    #[test]
    fn test_negative_exposure_also_lowers_resistance() {
        let mut node = Node::new(1, NodeRole::MainCharacter, 1.0, [1.0, 1.0], 7);
        node.reject_rumor();
        assert!(node.current_rumor().is_none());
        node.update_threshold();
        // |-0.1| * 0.1 = 0.01 off the threshold, weights nudged down
        assert!((node.threshold() - 0.99).abs() < 1e-6);
        assert!((node.trait_weights()[0] - 0.999).abs() < 1e-6);
        assert_eq!(node.score(), 0.0);
    }

    #[test]
    fn test_private_stream_is_reproducible() {
        let mut a = Node::new(5, NodeRole::Citizen, 1.0, [1.0, 1.0], 1234);
        let mut b = Node::new(5, NodeRole::Citizen, 1.0, [1.0, 1.0], 1234);
        let draws_a: Vec<f32> = (0..32).map(|_| a.draw_unit()).collect();
        let draws_b: Vec<f32> = (0..32).map(|_| b.draw_unit()).collect();
        assert_eq!(draws_a, draws_b);
        assert!(draws_a.iter().all(|d| (0.0..1.0).contains(d)));
    }

    #[test]
    fn test_listener_roles() {
        assert!(NodeRole::Citizen.is_listener());
        assert!(NodeRole::MainCharacter.is_listener());
        assert!(!NodeRole::Journalist.is_listener());
        assert!(!NodeRole::Historian.is_listener());
    }
}
