//! Country orchestration
//!
//! One control task walks the world's countries in order. Per country:
//! build a fresh belief network sized by that country's character roster,
//! run one turn per eligible event, then consolidate the feed into history.
//! Countries with no eligible events are skipped; countries with fewer
//! events than the turn cap run degraded. Neither halts the run.

use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use rumormill_core::{BeliefNetwork, HistoryRecord, NetworkConfig};
use rumormill_gen::SharedProvider;
use rumormill_world::{CountryDef, WorldDatabase, WorldError};

use crate::{CancelToken, SimConfig, TurnPipeline};

/// Fatal run errors. Everything recoverable is a per-country outcome.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    World(#[from] WorldError),
}

/// What happened to one country
#[derive(Debug, Clone, PartialEq)]
pub enum CountryOutcome {
    /// Full pipeline ran; feed and history are populated
    Completed {
        /// Header line plus one article per turn
        feed: String,
        articles: Vec<String>,
        history: HistoryRecord,
    },
    /// No eligible events; the country's pipeline never started
    Skipped { reason: String },
    /// A news or history call failed; the rest of this country's pipeline
    /// was dropped
    Aborted { error: String },
}

/// One country's result
#[derive(Debug, Clone, PartialEq)]
pub struct CountryChronicle {
    pub country: String,
    pub outcome: CountryOutcome,
}

/// The whole run's result
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub chronicles: Vec<CountryChronicle>,
    /// True when the run stopped at a cancellation boundary; chronicles
    /// hold whatever completed before that
    pub cancelled: bool,
}

impl RunReport {
    pub fn completed_count(&self) -> usize {
        self.chronicles
            .iter()
            .filter(|c| matches!(c.outcome, CountryOutcome::Completed { .. }))
            .count()
    }
}

/// Drives the per-country state machine to completion
pub struct Orchestrator {
    world: WorldDatabase,
    provider: SharedProvider,
    config: SimConfig,
    cancel: CancelToken,
}

impl Orchestrator {
    /// Validates configuration and world data up front; these are the only
    /// fatal errors in the system.
    pub fn new(
        world: WorldDatabase,
        provider: SharedProvider,
        config: SimConfig,
    ) -> Result<Self, RunError> {
        config.validate().map_err(RunError::Configuration)?;
        world.validate()?;
        Ok(Self {
            world,
            provider,
            config,
            cancel: CancelToken::new(),
        })
    }

    /// Handle for aborting the run from outside
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Process every country in order and return the full report
    pub async fn run(self) -> RunReport {
        let mut chronicles = Vec::new();

        for (index, country) in self.world.countries.iter().enumerate() {
            match self.run_country(index, country).await {
                Some(outcome) => {
                    chronicles.push(CountryChronicle {
                        country: country.name.clone(),
                        outcome,
                    });
                }
                None => {
                    info!(country = %country.name, "run cancelled");
                    return RunReport {
                        chronicles,
                        cancelled: true,
                    };
                }
            }
        }

        info!(countries = chronicles.len(), "all countries processed");
        RunReport {
            chronicles,
            cancelled: false,
        }
    }

    /// One country session. `None` means cancellation landed at a boundary
    /// and the run should stop.
    async fn run_country(&self, index: usize, country: &CountryDef) -> Option<CountryOutcome> {
        if self.cancel.is_cancelled() {
            return None;
        }

        let eligible = self
            .world
            .eligible_events(&country.name, self.config.event_filter);
        if eligible.is_empty() {
            warn!(country = %country.name, "no eligible events, skipping");
            return Some(CountryOutcome::Skipped {
                reason: "no eligible events".to_string(),
            });
        }

        let turns = eligible.len().min(self.config.turn_cap);
        if turns < self.config.turn_cap {
            warn!(
                country = %country.name,
                events = turns,
                cap = self.config.turn_cap,
                "fewer events than the turn cap, running degraded"
            );
        }

        // fresh network per country, sized by its character roster
        let main_count = self.world.main_character_count(&country.name);
        let net = BeliefNetwork::new(&NetworkConfig {
            population: self.config.population,
            initial_threshold: self.config.initial_threshold,
            initial_trait_weights: self.config.initial_trait_weights,
            hub_fraction: self.config.hub_fraction,
            main_count,
            seed: self.config.seed.wrapping_add(index as u64),
        });
        let mut pipeline = TurnPipeline::new(net, self.provider.clone(), &self.config);

        let mut feed = format!("=== {} ===\n", country.name);
        let mut articles = Vec::with_capacity(turns);

        for (turn, event) in eligible.iter().take(turns).enumerate() {
            if self.cancel.is_cancelled() {
                return None;
            }

            let event_text = format!("[{}] {}", country.name, event.base_text());
            match pipeline
                .run_turn(&event_text, event.severity, &self.cancel)
                .await
            {
                Ok(Some(outcome)) => {
                    info!(
                        country = %country.name,
                        turn = turn + 1,
                        rumors = outcome.rumors.len(),
                        edges_added = outcome.edges_added,
                        "turn complete"
                    );
                    feed.push_str(&outcome.news.article);
                    feed.push('\n');
                    articles.push(outcome.news.article);
                }
                Ok(None) => return None,
                Err(e) => {
                    error!(country = %country.name, turn = turn + 1, error = %e, "news call failed, aborting country");
                    return Some(CountryOutcome::Aborted {
                        error: e.to_string(),
                    });
                }
            }

            if self.config.step_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.step_delay_ms)).await;
            }
        }

        if self.cancel.is_cancelled() {
            return None;
        }

        match self.provider.generate_history(&feed).await {
            Ok(consolidated) => {
                info!(country = %country.name, turns, "country consolidated");
                Some(CountryOutcome::Completed {
                    feed,
                    articles,
                    history: HistoryRecord { consolidated },
                })
            }
            Err(e) => {
                error!(country = %country.name, error = %e, "history call failed, aborting country");
                Some(CountryOutcome::Aborted {
                    error: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rumormill_gen::{ProviderError, TemplateProvider, TextGenProvider};
    use rumormill_world::{CharacterDef, EventDef, EventFilter, Faction, Profession};
    use std::sync::Arc;

    fn country(name: &str) -> CountryDef {
        CountryDef {
            name: name.to_string(),
            description: String::new(),
            technology: 50,
            magic: 50,
            culture: 50,
            stability: 50,
            player_homeland: false,
        }
    }

    fn character(name: &str, homeland: &str) -> CharacterDef {
        CharacterDef {
            name: name.to_string(),
            homeland: homeland.to_string(),
            profession: Profession::Scholar,
            faction: Faction::Neutral,
            curiosity: 50,
            skepticism: 50,
            influence: 50,
            loyalty: 50,
            trust_to_player: 50,
        }
    }

    fn event(name: &str, target: Option<&str>, global: bool) -> EventDef {
        EventDef {
            name: name.to_string(),
            summary_template: format!("{name} happened."),
            tags: Vec::new(),
            target_country: target.map(str::to_string),
            global,
            weight: 50,
            severity: 60,
        }
    }

    fn two_country_world() -> WorldDatabase {
        WorldDatabase {
            countries: vec![country("Arden"), country("Veska")],
            characters: vec![character("Mira", "Arden"), character("Toma", "Arden")],
            events: vec![
                event("comet", Some("Arden"), false),
                event("flood", Some("Arden"), false),
                event("riot", Some("Arden"), false),
                event("skirmish", Some("Veska"), false),
            ],
        }
    }

    /// Fails news calls for one country only.
    struct GaggedIn(&'static str);

    #[async_trait]
    impl TextGenProvider for GaggedIn {
        async fn generate_rumor(&self, event_text: &str) -> Result<String, ProviderError> {
            Ok(format!("heard: {event_text}"))
        }

        async fn generate_news(
            &self,
            event_text: &str,
            _aggregated_rumors: &str,
            _as_journalist: bool,
        ) -> Result<String, ProviderError> {
            if event_text.contains(self.0) {
                Err(ProviderError::Api("censored".to_string()))
            } else {
                Ok(format!("article: {event_text}"))
            }
        }

        async fn generate_history(&self, full_feed: &str) -> Result<String, ProviderError> {
            Ok(format!("history of: {full_feed}"))
        }
    }

    #[tokio::test]
    async fn test_degraded_country_still_consolidates() {
        // 3 eligible events against a cap of 10: exactly 3 turns, history
        // still produced from the partial feed
        let world = WorldDatabase {
            countries: vec![country("Arden")],
            characters: vec![],
            events: vec![
                event("comet", Some("Arden"), false),
                event("flood", Some("Arden"), false),
                event("riot", Some("Arden"), false),
            ],
        };
        let orchestrator =
            Orchestrator::new(world, TemplateProvider::shared(), SimConfig::default()).unwrap();
        let report = orchestrator.run().await;

        assert!(!report.cancelled);
        assert_eq!(report.chronicles.len(), 1);
        match &report.chronicles[0].outcome {
            CountryOutcome::Completed {
                feed,
                articles,
                history,
            } => {
                assert_eq!(articles.len(), 3);
                assert!(feed.starts_with("=== Arden ===\n"));
                assert!(!history.consolidated.is_empty());
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_turn_cap_limits_turns() {
        let world = WorldDatabase {
            countries: vec![country("Arden")],
            characters: vec![],
            events: (0..6).map(|i| event(&format!("e{i}"), Some("Arden"), false)).collect(),
        };
        let config = SimConfig {
            turn_cap: 4,
            ..SimConfig::default()
        };
        let orchestrator = Orchestrator::new(world, TemplateProvider::shared(), config).unwrap();
        let report = orchestrator.run().await;

        match &report.chronicles[0].outcome {
            CountryOutcome::Completed { articles, .. } => assert_eq!(articles.len(), 4),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_country_skipped_run_continues() {
        let mut world = two_country_world();
        world.events.retain(|e| e.target_country.as_deref() != Some("Veska"));

        let orchestrator =
            Orchestrator::new(world, TemplateProvider::shared(), SimConfig::default()).unwrap();
        let report = orchestrator.run().await;

        assert_eq!(report.chronicles.len(), 2);
        assert!(matches!(
            report.chronicles[0].outcome,
            CountryOutcome::Completed { .. }
        ));
        assert!(matches!(
            report.chronicles[1].outcome,
            CountryOutcome::Skipped { .. }
        ));
        assert_eq!(report.completed_count(), 1);
    }

    #[tokio::test]
    async fn test_event_filter_is_a_caller_choice() {
        let mut world = two_country_world();
        world.events.push(event("eclipse", None, true));

        let config = SimConfig {
            event_filter: EventFilter::CountryOnly,
            ..SimConfig::default()
        };
        let orchestrator =
            Orchestrator::new(world.clone(), TemplateProvider::shared(), config).unwrap();
        let report = orchestrator.run().await;
        match &report.chronicles[1].outcome {
            CountryOutcome::Completed { articles, .. } => assert_eq!(articles.len(), 1),
            other => panic!("expected completion, got {other:?}"),
        }

        let config = SimConfig {
            event_filter: EventFilter::CountryOrGlobal,
            ..SimConfig::default()
        };
        let orchestrator = Orchestrator::new(world, TemplateProvider::shared(), config).unwrap();
        let report = orchestrator.run().await;
        match &report.chronicles[1].outcome {
            CountryOutcome::Completed { articles, .. } => assert_eq!(articles.len(), 2),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_news_failure_aborts_only_that_country() {
        let orchestrator = Orchestrator::new(
            two_country_world(),
            Arc::new(GaggedIn("Arden")),
            SimConfig::default(),
        )
        .unwrap();
        let report = orchestrator.run().await;

        assert_eq!(report.chronicles.len(), 2);
        assert!(matches!(
            report.chronicles[0].outcome,
            CountryOutcome::Aborted { .. }
        ));
        assert!(matches!(
            report.chronicles[1].outcome,
            CountryOutcome::Completed { .. }
        ));
    }

    #[tokio::test]
    async fn test_cancellation_returns_partial_report() {
        let orchestrator = Orchestrator::new(
            two_country_world(),
            TemplateProvider::shared(),
            SimConfig::default(),
        )
        .unwrap();
        orchestrator.cancel_token().cancel();
        let report = orchestrator.run().await;

        assert!(report.cancelled);
        assert!(report.chronicles.is_empty());
    }

    #[tokio::test]
    async fn test_runs_are_deterministic() {
        async fn run() -> RunReport {
            Orchestrator::new(
                two_country_world(),
                TemplateProvider::shared(),
                SimConfig::default(),
            )
            .unwrap()
            .run()
            .await
        }

        assert_eq!(run().await, run().await);
    }

    #[test]
    fn test_invalid_population_is_fatal() {
        let config = SimConfig {
            population: 1,
            ..SimConfig::default()
        };
        let result = Orchestrator::new(two_country_world(), TemplateProvider::shared(), config);
        assert!(matches!(result, Err(RunError::Configuration(_))));
    }

    #[test]
    fn test_empty_world_is_fatal() {
        let result = Orchestrator::new(
            WorldDatabase::default(),
            TemplateProvider::shared(),
            SimConfig::default(),
        );
        assert!(matches!(result, Err(RunError::World(_))));
    }
}
