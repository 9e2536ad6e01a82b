//! The per-event turn pipeline: diffusion -> aggregation -> growth
//!
//! The diffusion fan-out is the one concurrent region in the system. Draws
//! happen sequentially from each node's own stream, the provider calls run
//! concurrently, and results are applied only after the join - so node
//! state is mutated exclusively from the driving task and no step ever
//! reads `current_rumor` before the barrier completes.

use futures::future::join_all;
use tracing::{debug, warn};

use rumormill_core::{BeliefNetwork, NewsRecord, RumorRecord};
use rumormill_gen::{ProviderError, SharedProvider};

use crate::{CancelToken, SimConfig};

/// Separator between rumors in the journalist's digest
const RUMOR_SEPARATOR: &str = " / ";

/// Everything one turn produced
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub news: NewsRecord,
    /// Adopted rumors in node-id order; informational only
    pub rumors: Vec<RumorRecord>,
    pub edges_added: usize,
}

/// Strict comparison: a draw exactly at the acceptance probability rejects
#[inline]
pub fn adopts(draw: f32, acceptance_probability: f32) -> bool {
    draw < acceptance_probability
}

/// Drives one country session's belief network through its turns
pub struct TurnPipeline {
    net: BeliefNetwork,
    provider: SharedProvider,
    acceptance_probability: f32,
    growth_edges_per_turn: usize,
}

impl TurnPipeline {
    pub fn new(net: BeliefNetwork, provider: SharedProvider, config: &SimConfig) -> Self {
        Self {
            net,
            provider,
            acceptance_probability: config.acceptance_probability,
            growth_edges_per_turn: config.growth_edges_per_turn,
        }
    }

    pub fn network(&self) -> &BeliefNetwork {
        &self.net
    }

    /// Run one event through the pipeline.
    ///
    /// Returns `Ok(None)` when cancellation lands between steps - the turn
    /// is abandoned at a consistent boundary and produces no article. A
    /// failed news call is returned as an error for the orchestrator to
    /// abort the country on.
    pub async fn run_turn(
        &mut self,
        event_text: &str,
        severity: u8,
        cancel: &CancelToken,
    ) -> Result<Option<TurnOutcome>, ProviderError> {
        let rumors = self.diffusion_step(event_text, severity).await;
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let news = self.aggregation_step(event_text).await?;

        let edges_added = if cancel.is_cancelled() {
            0
        } else {
            self.growth_step()
        };

        Ok(Some(TurnOutcome {
            news,
            rumors,
            edges_added,
        }))
    }

    /// Every listener independently decides, then all rumor calls are
    /// dispatched at once and joined. A failed call demotes that node to
    /// the rejection branch; one node's failure never aborts the turn.
    async fn diffusion_step(&mut self, event_text: &str, severity: u8) -> Vec<RumorRecord> {
        let mut adopters = Vec::new();
        let mut rejecters = Vec::new();
        for id in 0..self.net.len() {
            let node = self.net.node_mut(id);
            if !node.is_listener() {
                continue;
            }
            if adopts(node.draw_unit(), self.acceptance_probability) {
                adopters.push(id);
            } else {
                rejecters.push(id);
            }
        }

        debug!(
            adopters = adopters.len(),
            rejecters = rejecters.len(),
            "diffusion fan-out"
        );

        // the barrier: nothing below runs until every call has resolved
        let calls = adopters.iter().map(|_| self.provider.generate_rumor(event_text));
        let results = join_all(calls).await;

        let strength = (severity as f32 / 100.0).clamp(0.0, 1.0);
        let mut records = Vec::with_capacity(adopters.len());
        for (&id, result) in adopters.iter().zip(results) {
            let node = self.net.node_mut(id);
            match result {
                Ok(text) => {
                    let credibility = (1.0 - node.threshold()).clamp(0.0, 1.0);
                    node.adopt_rumor(text.clone());
                    records.push(RumorRecord {
                        node_id: id,
                        text,
                        propagation_strength: strength,
                        credibility,
                    });
                }
                Err(e) => {
                    warn!(node = id, error = %e, "rumor call failed, treated as rejection");
                    node.reject_rumor();
                }
            }
            node.update_threshold();
        }
        for id in rejecters {
            let node = self.net.node_mut(id);
            node.reject_rumor();
            node.update_threshold();
        }

        records
    }

    /// Collect held rumors in node-id order and ask the journalist for one
    /// article. Exactly one provider call, sequenced after the barrier.
    async fn aggregation_step(&mut self, event_text: &str) -> Result<NewsRecord, ProviderError> {
        let aggregated = self
            .net
            .nodes()
            .filter_map(|n| n.current_rumor())
            .collect::<Vec<_>>()
            .join(RUMOR_SEPARATOR);

        let article = self
            .provider
            .generate_news(event_text, &aggregated, true)
            .await?;

        Ok(NewsRecord {
            event_text: event_text.to_string(),
            aggregated_rumors: aggregated,
            article,
        })
    }

    /// Topology-only mutation; never touches the turn's article
    fn growth_step(&mut self) -> usize {
        self.net.grow_edges_from_active_rumors(self.growth_edges_per_turn)
    }
}
