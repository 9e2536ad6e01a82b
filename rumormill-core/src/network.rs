//! The belief network - node registry, directed adjacency, growth
//!
//! A network is built fresh for every country session and discarded when the
//! session ends. All randomness flows through the network-owned generator or
//! the per-node streams; nothing global.

use std::collections::BTreeSet;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{Node, NodeRole, MAX_GROWTH_ATTEMPTS};

/// Parameters for building a [`BeliefNetwork`]
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Total node count, journalist and historian included. Must be >= 2.
    pub population: usize,
    /// Starting susceptibility for every node
    pub initial_threshold: f32,
    /// Starting receptivity vector for every node
    pub initial_trait_weights: [f32; 2],
    /// Fraction of the population the journalist broadcasts to initially
    pub hub_fraction: f32,
    /// Number of main characters; clamped into 0..=population-2
    pub main_count: usize,
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            population: 12,
            initial_threshold: 1.0,
            initial_trait_weights: [1.0, 1.0],
            hub_fraction: 0.7,
            main_count: 0,
            seed: 1234,
        }
    }
}

/// Directed belief-propagation graph.
///
/// Node ids are dense 0..N-1: id 0 is the journalist, id N-1 the historian,
/// ids 1..=main_count the main characters, everyone else a citizen.
pub struct BeliefNetwork {
    nodes: Vec<Node>,
    /// Out-edges per node; a BTreeSet keeps targets distinct and iteration
    /// order stable across runs
    adjacency: Vec<BTreeSet<usize>>,
    rng: SmallRng,
}

impl BeliefNetwork {
    /// Build the network: assign roles, then seed the broadcast topology by
    /// connecting the journalist to a shuffled sample of the population.
    ///
    /// The caller is responsible for rejecting populations below 2; see the
    /// runtime's configuration validation.
    pub fn new(config: &NetworkConfig) -> Self {
        let n = config.population;
        let main_count = config.main_count.min(n.saturating_sub(2));
        let rng = SmallRng::seed_from_u64(config.seed);

        let mut nodes = Vec::with_capacity(n);
        for id in 0..n {
            let role = if id == 0 {
                NodeRole::Journalist
            } else if id == n - 1 {
                NodeRole::Historian
            } else if id <= main_count {
                NodeRole::MainCharacter
            } else {
                NodeRole::Citizen
            };
            nodes.push(Node::new(
                id,
                role,
                config.initial_threshold,
                config.initial_trait_weights,
                config.seed,
            ));
        }

        let mut net = Self {
            nodes,
            adjacency: vec![BTreeSet::new(); n],
            rng,
        };

        // Hub seeding: journalist -> first k of the shuffled non-journalist ids
        let k = ((config.hub_fraction * n as f32).round() as usize)
            .max(1)
            .min(n - 1);
        let mut candidates: Vec<usize> = (1..n).collect();
        candidates.shuffle(&mut net.rng);
        for &target in candidates.iter().take(k) {
            net.add_edge(0, target);
        }

        net
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: usize) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn out_degree(&self, id: usize) -> usize {
        self.adjacency[id].len()
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.adjacency[from].contains(&to)
    }

    /// Targets of a node's out-edges, in ascending id order
    pub fn targets(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[id].iter().copied()
    }

    /// Every directed edge as (from, to), in deterministic order
    pub fn edge_list(&self) -> Vec<(usize, usize)> {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(from, targets)| targets.iter().map(move |&to| (from, to)))
            .collect()
    }

    /// Ids of nodes currently holding a rumor, in ascending order
    pub fn active_rumor_ids(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .filter(|n| n.current_rumor().is_some())
            .map(|n| n.id())
            .collect()
    }

    /// Insert a directed edge. Self-loops and duplicates are ignored;
    /// idempotent, no failure mode.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        self.adjacency[from].insert(to);
    }

    /// Rumor-holders opportunistically reach new listeners: draw random
    /// (active source, any destination) pairs until `max_new_edges` fresh
    /// edges land or the attempt cap is hit. Returns the number added.
    pub fn grow_edges_from_active_rumors(&mut self, max_new_edges: usize) -> usize {
        let active = self.active_rumor_ids();
        if active.is_empty() {
            return 0;
        }

        let mut added = 0;
        let mut attempts = 0;
        while added < max_new_edges && attempts < MAX_GROWTH_ATTEMPTS {
            let src = active[self.rng.gen_range(0..active.len())];
            let dst = self.rng.gen_range(0..self.nodes.len());
            if src != dst && !self.has_edge(src, dst) {
                self.add_edge(src, dst);
                added += 1;
            }
            attempts += 1;
        }
        added
    }
}
