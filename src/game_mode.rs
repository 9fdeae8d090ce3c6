use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub const VALORANT: &str = "valorant";
pub const LEAGUE_OF_LEGENDS: &str = "league-of-legends";

static DEFAULT_REGISTRY: Lazy<GameModeRegistry> = Lazy::new(GameModeRegistry::builtin);

/// Canonical game-mode id (`valorant`, `league-of-legends`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameMode(String);

impl GameMode {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_ascii_lowercase())
    }

    pub fn valorant() -> Self {
        Self(VALORANT.to_string())
    }

    pub fn league_of_legends() -> Self {
        Self(LEAGUE_OF_LEGENDS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-mode labels and wire ids. Adding a game is a new profile, not a new branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeProfile {
    pub id: String,
    pub display_name: String,
    /// Value sent as `game` in request bodies.
    pub service_id: String,
    /// Heading for the "what happened" side of a prediction comparison.
    pub primary_label: String,
    /// Heading for the "what could have happened" side.
    pub alternative_label: String,
    pub aliases: Vec<String>,
}

impl ModeProfile {
    pub fn new(
        id: &str,
        display_name: &str,
        service_id: &str,
        primary_label: &str,
        alternative_label: &str,
    ) -> Self {
        Self {
            id: id.to_ascii_lowercase(),
            display_name: display_name.to_string(),
            service_id: service_id.to_string(),
            primary_label: primary_label.to_string(),
            alternative_label: alternative_label.to_string(),
            aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_ascii_lowercase());
        self
    }

    fn answers_to(&self, key: &str) -> bool {
        self.id == key || self.aliases.iter().any(|a| a == key)
    }
}

#[derive(Debug, Clone)]
pub struct GameModeRegistry {
    profiles: Vec<ModeProfile>,
    fallback: usize,
}

impl GameModeRegistry {
    /// Empty registry whose only entry is `fallback`, used for every unregistered mode.
    pub fn new(fallback: ModeProfile) -> Self {
        Self {
            profiles: vec![fallback],
            fallback: 0,
        }
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new(
            ModeProfile::new(
                LEAGUE_OF_LEGENDS,
                "League of Legends",
                "lol",
                "Contest Drake",
                "Concede Drake",
            )
            .with_alias("lol")
            .with_alias("league"),
        );
        registry.register(ModeProfile::new(
            VALORANT,
            "VALORANT",
            "valorant",
            "Original Action",
            "Alternative Action",
        ));
        registry
    }

    /// Adds a profile, replacing any existing one with the same id.
    pub fn register(&mut self, profile: ModeProfile) {
        if let Some(existing) = self.profiles.iter_mut().find(|p| p.id == profile.id) {
            *existing = profile;
        } else {
            self.profiles.push(profile);
        }
    }

    /// Maps a raw id or alias onto its canonical mode; unknown ids pass through.
    pub fn resolve(&self, raw: &str) -> GameMode {
        let key = raw.trim().to_ascii_lowercase();
        self.profiles
            .iter()
            .find(|p| p.answers_to(&key))
            .map(|p| GameMode::new(&p.id))
            .unwrap_or(GameMode(key))
    }

    pub fn contains(&self, mode: &GameMode) -> bool {
        self.profiles.iter().any(|p| p.answers_to(mode.as_str()))
    }

    pub fn profile(&self, mode: &GameMode) -> &ModeProfile {
        self.profiles
            .iter()
            .find(|p| p.answers_to(mode.as_str()))
            .unwrap_or(&self.profiles[self.fallback])
    }

    pub fn modes(&self) -> impl Iterator<Item = GameMode> + '_ {
        self.profiles.iter().map(|p| GameMode::new(&p.id))
    }

    /// Next registered mode in registration order, wrapping around.
    pub fn next_after(&self, mode: &GameMode) -> GameMode {
        let idx = self
            .profiles
            .iter()
            .position(|p| p.answers_to(mode.as_str()))
            .map(|i| (i + 1) % self.profiles.len())
            .unwrap_or(self.fallback);
        GameMode::new(&self.profiles[idx].id)
    }
}

impl Default for GameModeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

pub fn default_registry() -> &'static GameModeRegistry {
    &DEFAULT_REGISTRY
}
