//! World definition records

use serde::{Deserialize, Serialize};

/// What a character does for a living
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Profession {
    Poet,
    #[default]
    Scholar,
    Merchant,
    Knight,
    Priest,
    Spy,
    Journalist,
}

/// Allegiance block a character belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    #[default]
    Neutral,
    Royal,
    Guild,
    Temple,
    Rebel,
}

/// Broad category an event falls under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTag {
    Politics,
    War,
    Economy,
    Culture,
    Magic,
    Crime,
    Disaster,
    Festival,
}

fn default_stat() -> u8 {
    50
}

/// A country of the simulated world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryDef {
    pub name: String,
    #[serde(default)]
    pub description: String,

    // Worldview parameters, 0-100
    #[serde(default = "default_stat")]
    pub technology: u8,
    #[serde(default = "default_stat")]
    pub magic: u8,
    #[serde(default = "default_stat")]
    pub culture: u8,
    #[serde(default = "default_stat")]
    pub stability: u8,

    #[serde(default)]
    pub player_homeland: bool,
}

/// A named character with a homeland assignment.
///
/// The runtime only needs the per-country headcount for network sizing; the
/// personality stats ride along for prompt building and future mechanics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterDef {
    pub name: String,
    /// Name of the country this character calls home
    pub homeland: String,
    #[serde(default)]
    pub profession: Profession,
    #[serde(default)]
    pub faction: Faction,

    // Personality, 0-100
    #[serde(default = "default_stat")]
    pub curiosity: u8,
    #[serde(default = "default_stat")]
    pub skepticism: u8,
    #[serde(default = "default_stat")]
    pub influence: u8,
    #[serde(default = "default_stat")]
    pub loyalty: u8,

    #[serde(default = "default_stat")]
    pub trust_to_player: u8,
}

/// An event template the orchestrator can run a turn from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDef {
    pub name: String,
    /// One or two sentences describing the event; the name is used when empty
    #[serde(default)]
    pub summary_template: String,
    #[serde(default)]
    pub tags: Vec<EventTag>,

    /// Country this event targets; None only makes sense together with `global`
    #[serde(default)]
    pub target_country: Option<String>,
    /// World-wide events reach every country when the filter allows them
    #[serde(default)]
    pub global: bool,

    /// Relative occurrence weight, 0-100
    #[serde(default = "default_stat")]
    pub weight: u8,
    /// Magnitude of the event, 0-100; seeds rumor propagation strength
    #[serde(default = "default_stat")]
    pub severity: u8,
}

impl EventDef {
    /// The text a turn is run from: the summary, or the name as fallback
    pub fn base_text(&self) -> &str {
        if self.summary_template.is_empty() {
            &self.name
        } else {
            &self.summary_template
        }
    }
}
