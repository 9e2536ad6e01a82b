//! World database - loading, validation, and event eligibility

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CountryDef, CharacterDef, EventDef};

/// Errors from loading or validating world data
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("failed to read world file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse world file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid world data: {0}")]
    Validation(String),
}

/// Which events a country's pipeline may run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    /// Only events targeted at the country
    CountryOnly,
    /// Country-targeted events plus world-wide ones
    #[default]
    CountryOrGlobal,
}

/// The full static dataset: ordered countries, characters, events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldDatabase {
    #[serde(default)]
    pub countries: Vec<CountryDef>,
    #[serde(default)]
    pub characters: Vec<CharacterDef>,
    #[serde(default)]
    pub events: Vec<EventDef>,
}

impl WorldDatabase {
    /// Load a world from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, WorldError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a world from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, WorldError> {
        Ok(toml::from_str(content)?)
    }

    /// Check referential integrity. A world with no countries cannot drive
    /// a run; characters and events must point at defined countries.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.countries.is_empty() {
            return Err(WorldError::Validation("world has no countries".to_string()));
        }

        for character in &self.characters {
            if !self.has_country(&character.homeland) {
                return Err(WorldError::Validation(format!(
                    "character '{}' has unknown homeland '{}'",
                    character.name, character.homeland
                )));
            }
        }

        for event in &self.events {
            match &event.target_country {
                Some(target) if !self.has_country(target) => {
                    return Err(WorldError::Validation(format!(
                        "event '{}' targets unknown country '{}'",
                        event.name, target
                    )));
                }
                None if !event.global => {
                    return Err(WorldError::Validation(format!(
                        "event '{}' has no target country and is not global",
                        event.name
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn has_country(&self, name: &str) -> bool {
        self.countries.iter().any(|c| c.name == name)
    }

    /// Number of characters whose homeland is the given country; sizes the
    /// main-character block of that country's belief network.
    pub fn main_character_count(&self, country: &str) -> usize {
        self.characters
            .iter()
            .filter(|c| c.homeland == country)
            .count()
    }

    /// Events a country's pipeline may run, in declaration order
    pub fn eligible_events(&self, country: &str, filter: EventFilter) -> Vec<&EventDef> {
        self.events
            .iter()
            .filter(|e| {
                let targeted = e.target_country.as_deref() == Some(country);
                match filter {
                    EventFilter::CountryOnly => targeted,
                    EventFilter::CountryOrGlobal => targeted || e.global,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [[countries]]
        name = "Arden"
        description = "A river kingdom"
        technology = 40
        magic = 70

        [[countries]]
        name = "Veska"
        stability = 30

        [[characters]]
        name = "Mira"
        homeland = "Arden"
        profession = "scholar"
        curiosity = 80

        [[characters]]
        name = "Toma"
        homeland = "Arden"
        faction = "guild"

        [[events]]
        name = "Comet over the capital"
        summary_template = "A twin-tailed comet hangs over the capital."
        tags = ["magic", "culture"]
        target_country = "Arden"
        severity = 70

        [[events]]
        name = "Border skirmish"
        tags = ["war"]
        target_country = "Veska"

        [[events]]
        name = "Plague of locusts"
        tags = ["disaster"]
        global = true
        severity = 90
    "#;

    #[test]
    fn test_parse_and_validate() {
        let world = WorldDatabase::from_toml_str(SAMPLE).unwrap();
        world.validate().unwrap();
        assert_eq!(world.countries.len(), 2);
        assert_eq!(world.characters.len(), 2);
        assert_eq!(world.events.len(), 3);
        // defaults fill unspecified stats
        assert_eq!(world.countries[0].stability, 50);
        assert_eq!(world.characters[1].curiosity, 50);
    }

    #[test]
    fn test_empty_world_rejected() {
        let world = WorldDatabase::default();
        assert!(matches!(world.validate(), Err(WorldError::Validation(_))));
    }

    #[test]
    fn test_unknown_homeland_rejected() {
        let mut world = WorldDatabase::from_toml_str(SAMPLE).unwrap();
        world.characters[0].homeland = "Nowhere".to_string();
        assert!(matches!(world.validate(), Err(WorldError::Validation(_))));
    }

    #[test]
    fn test_unreachable_event_rejected() {
        let mut world = WorldDatabase::from_toml_str(SAMPLE).unwrap();
        world.events[2].global = false;
        assert!(matches!(world.validate(), Err(WorldError::Validation(_))));
    }

    #[test]
    fn test_main_character_count() {
        let world = WorldDatabase::from_toml_str(SAMPLE).unwrap();
        assert_eq!(world.main_character_count("Arden"), 2);
        assert_eq!(world.main_character_count("Veska"), 0);
    }

    #[test]
    fn test_event_eligibility() {
        let world = WorldDatabase::from_toml_str(SAMPLE).unwrap();

        let country_only = world.eligible_events("Arden", EventFilter::CountryOnly);
        assert_eq!(country_only.len(), 1);
        assert_eq!(country_only[0].name, "Comet over the capital");

        let with_global = world.eligible_events("Arden", EventFilter::CountryOrGlobal);
        assert_eq!(with_global.len(), 2);
        assert_eq!(with_global[1].name, "Plague of locusts");

        let veska = world.eligible_events("Veska", EventFilter::CountryOrGlobal);
        assert_eq!(veska.len(), 2);
    }
}
