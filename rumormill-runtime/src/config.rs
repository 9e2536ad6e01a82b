//! Simulation configuration

use rumormill_world::EventFilter;

/// Everything the orchestrator needs besides the world and the provider.
///
/// Turn budget and event eligibility are policy, not mechanics, so both are
/// caller choices here rather than constants.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Belief network size per country, journalist and historian included
    pub population: usize,
    /// Fraction of the population the journalist seeds edges to
    pub hub_fraction: f32,
    /// Starting susceptibility for every node
    pub initial_threshold: f32,
    /// Starting receptivity vector for every node
    pub initial_trait_weights: [f32; 2],
    /// Adoption chance per listener per turn; a draw exactly at this value
    /// rejects
    pub acceptance_probability: f32,
    /// Edge budget for each growth step
    pub growth_edges_per_turn: usize,
    /// Upper bound on turns per country
    pub turn_cap: usize,
    /// Which events a country's pipeline may run
    pub event_filter: EventFilter,
    /// Pacing delay between turns; purely cosmetic, 0 disables
    pub step_delay_ms: u64,
    /// Base seed; each country derives its own network seed from it
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            population: 12,
            hub_fraction: 0.7,
            initial_threshold: 1.0,
            initial_trait_weights: [1.0, 1.0],
            acceptance_probability: 0.85,
            growth_edges_per_turn: 4,
            turn_cap: 10,
            event_filter: EventFilter::CountryOrGlobal,
            step_delay_ms: 0,
            seed: 1234,
        }
    }
}

impl SimConfig {
    /// Reject configurations the network or pipeline cannot honor
    pub fn validate(&self) -> Result<(), String> {
        if self.population < 2 {
            return Err(format!(
                "population must be at least 2 (journalist + historian), got {}",
                self.population
            ));
        }
        if !(0.0..=1.0).contains(&self.hub_fraction) {
            return Err(format!("hub_fraction must be in [0, 1], got {}", self.hub_fraction));
        }
        if !(0.0..=1.0).contains(&self.acceptance_probability) {
            return Err(format!(
                "acceptance_probability must be in [0, 1], got {}",
                self.acceptance_probability
            ));
        }
        if self.turn_cap == 0 {
            return Err("turn_cap must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bounds_rejected() {
        let mut config = SimConfig {
            population: 1,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());

        config.population = 12;
        config.hub_fraction = 1.5;
        assert!(config.validate().is_err());

        config.hub_fraction = 0.7;
        config.acceptance_probability = -0.1;
        assert!(config.validate().is_err());

        config.acceptance_probability = 0.85;
        config.turn_cap = 0;
        assert!(config.validate().is_err());
    }
}
