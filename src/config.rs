//! Game rules and search tuning, consumed as plain data.
//!
//! Both structs deserialize from TOML with every field optional, so a config file
//! only has to list what it changes.

use crate::letter::MAX_TIER;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable overriding [`SearchConfig::iterations`].
pub const ENV_SEARCH_ITERATIONS: &str = "LETTER_DUEL_SEARCH_ITERATIONS";
/// Environment variable overriding [`SearchConfig::exploration`].
pub const ENV_SEARCH_EXPLORATION: &str = "LETTER_DUEL_SEARCH_EXPLORATION";
/// Environment variable overriding [`SearchConfig::seed`].
pub const ENV_SEARCH_SEED: &str = "LETTER_DUEL_SEARCH_SEED";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A per-round lookup with a ceiling for rounds past the end of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTable {
    /// Value for round 1, round 2, ...
    pub rounds: Vec<u32>,
    /// Value for every round beyond `rounds`.
    pub max: u32,
}

impl RoundTable {
    pub fn new(rounds: impl Into<Vec<u32>>, max: u32) -> Self {
        Self {
            rounds: rounds.into(),
            max,
        }
    }

    /// Rounds are 1-based; round 0 reads as round 1.
    pub fn for_round(&self, round: u32) -> u32 {
        let index = round.saturating_sub(1) as usize;
        self.rounds.get(index).copied().unwrap_or(self.max)
    }

    fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.rounds.iter().copied().chain(std::iter::once(self.max))
    }
}

/// The rules of the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub initial_round: u32,
    pub initial_gold: u32,
    pub initial_health: i32,
    /// A player at or below this health has lost.
    pub health_to_lose: i32,
    pub battle_victories_to_win: u32,
    pub letter_buy_cost: u32,
    pub letter_sell_value: u32,
    pub pool_refresh_cost: u32,
    pub rack_capacity: usize,
    /// Highest letter tier offered in the pool.
    pub pool_tier: RoundTable,
    /// Number of letters offered in the pool.
    pub pool_capacity: RoundTable,
    /// Health lost by every battle loser.
    pub health_cost: RoundTable,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_round: 1,
            initial_gold: 10,
            initial_health: 10,
            health_to_lose: 0,
            battle_victories_to_win: 10,
            letter_buy_cost: 3,
            letter_sell_value: 2,
            pool_refresh_cost: 1,
            rack_capacity: 6,
            pool_tier: RoundTable::new([1, 1, 2, 2, 3, 3, 4, 4, 5, 5], 6),
            pool_capacity: RoundTable::new([3, 3, 4, 4, 4, 5, 5, 5, 6, 6], 6),
            health_cost: RoundTable::new([1, 1, 1, 1, 2, 2, 2, 3, 3, 3], 3),
        }
    }
}

impl GameConfig {
    pub fn pool_tier_for_round(&self, round: u32) -> u8 {
        self.pool_tier.for_round(round).min(MAX_TIER as u32) as u8
    }

    pub fn pool_capacity_for_round(&self, round: u32) -> usize {
        self.pool_capacity.for_round(round) as usize
    }

    pub fn health_cost_for_round(&self, round: u32) -> i32 {
        self.health_cost.for_round(round) as i32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rack_capacity == 0 {
            return Err(ConfigError::Invalid("rack_capacity must be at least 1".into()));
        }
        if self.initial_round == 0 {
            return Err(ConfigError::Invalid("initial_round is 1-based".into()));
        }
        if self.battle_victories_to_win == 0 {
            return Err(ConfigError::Invalid(
                "battle_victories_to_win must be at least 1".into(),
            ));
        }
        if self.pool_tier.rounds.is_empty() {
            return Err(ConfigError::Invalid("pool_tier table is empty".into()));
        }
        if let Some(tier) = self
            .pool_tier
            .values()
            .find(|t| *t == 0 || *t > MAX_TIER as u32)
        {
            return Err(ConfigError::Invalid(format!(
                "pool tier {tier} outside 1..={MAX_TIER}"
            )));
        }
        if self.pool_capacity.rounds.is_empty() || self.pool_capacity.max == 0 {
            return Err(ConfigError::Invalid(
                "pool_capacity needs rounds and a non-zero max".into(),
            ));
        }
        Ok(())
    }
}

/// Tuning of the computer player's tree search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Select/expand/simulate/backpropagate cycles per turn.
    pub iterations: u32,
    /// The `C` in the UCT formula.
    pub exploration: f64,
    /// Rollouts longer than this are scored as no-contest.
    pub max_rollout_steps: usize,
    /// Seed of the search RNG. Falls back to the searching player's seed.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: 20_000,
            exploration: 1.41,
            max_rollout_steps: 100_000,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::Invalid("iterations must be at least 1".into()));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "exploration constant {} must be finite and non-negative",
                self.exploration
            )));
        }
        if self.max_rollout_steps == 0 {
            return Err(ConfigError::Invalid(
                "max_rollout_steps must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Root of a config file: a `[game]` and a `[search]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub search: SearchConfig,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, applies env overrides, then validates.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        let config = config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Overrides search settings from `LETTER_DUEL_SEARCH_*` variables. Unparseable values are ignored.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Some(v) = parsed_env(ENV_SEARCH_ITERATIONS) {
            self.search.iterations = v;
        }
        if let Some(v) = parsed_env(ENV_SEARCH_EXPLORATION) {
            self.search.exploration = v;
        }
        if let Some(v) = parsed_env(ENV_SEARCH_SEED) {
            self.search.seed = Some(v);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate()?;
        self.search.validate()
    }
}

fn parsed_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => {
            debug!("{key} overridden from environment");
            Some(v)
        }
        Err(_) => {
            debug!("ignoring unparseable {key}={raw}");
            None
        }
    }
}
