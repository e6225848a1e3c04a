//! Game Configuration
//!
//! Tunable constants for a game instance. Defaults match the classic
//! 64x64 board with 100 coins.

use std::str::FromStr;
use std::time::Duration;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::grid::Grid;
use crate::{DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_PLAYER_NAME_LENGTH, NUM_COINS};

/// Coin values by rank: the first `count` coins of a layout get `value`,
/// the next tier's `count` get the next value, and so on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueTiers(pub Vec<CoinTier>);

/// One tier of coin values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinTier {
    /// Coin value.
    pub value: u32,
    /// Number of coins with this value per layout.
    pub count: usize,
}

impl Default for ValueTiers {
    fn default() -> Self {
        Self(vec![
            CoinTier { value: 1, count: 50 },
            CoinTier { value: 2, count: 25 },
            CoinTier { value: 5, count: 20 },
            CoinTier { value: 10, count: 5 },
        ])
    }
}

impl ValueTiers {
    /// Total coins across all tiers.
    pub fn total(&self) -> usize {
        self.0.iter().map(|tier| tier.count).sum()
    }

    /// Value of the coin at `rank` in a layout, if the rank is covered.
    pub fn value_for_rank(&self, rank: usize) -> Option<u32> {
        let mut upper = 0;
        for tier in &self.0 {
            upper += tier.count;
            if rank < upper {
                return Some(tier.value);
            }
        }
        None
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Environment variable present but unparseable.
    #[error("invalid value {value:?} for {var}")]
    InvalidVar {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// Grid has no cells.
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    EmptyGrid {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },

    /// More coins than cells.
    #[error("{num_coins} coins do not fit on {cells} cells")]
    TooManyCoins {
        /// Configured coin count.
        num_coins: usize,
        /// Available cells.
        cells: usize,
    },

    /// Tier counts disagree with the coin count.
    #[error("value tiers cover {tiers} coins but num_coins is {num_coins}")]
    TierMismatch {
        /// Sum of tier counts.
        tiers: usize,
        /// Configured coin count.
        num_coins: usize,
    },

    /// Coins must be worth something.
    #[error("coin tiers must have non-zero values")]
    ZeroValueTier,

    /// Names must be allowed at least one character.
    #[error("max_name_length must be at least 1")]
    ZeroNameLength,

    /// Refill must be attempted at least once.
    #[error("max_refill_attempts must be at least 1")]
    ZeroRefillAttempts,
}

/// Game configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Grid width (columns).
    pub width: u32,
    /// Grid height (rows).
    pub height: u32,
    /// Longest accepted player name, in characters.
    pub max_name_length: usize,
    /// Coins per layout.
    pub num_coins: usize,
    /// Value assignment by rank.
    pub value_tiers: ValueTiers,
    /// Inactivity expiry for player positions. `None` keeps players forever.
    pub player_ttl: Option<Duration>,
    /// Per-call store timeout.
    pub store_timeout: Duration,
    /// Attempts to repopulate an empty coin collection before giving up.
    pub max_refill_attempts: u32,
    /// Fixed RNG seed. `None` seeds from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            max_name_length: MAX_PLAYER_NAME_LENGTH,
            num_coins: NUM_COINS,
            value_tiers: ValueTiers::default(),
            player_ttl: None,
            store_timeout: Duration::from_secs(2),
            max_refill_attempts: 3,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            width: env_var("COIN_GRID_WIDTH")?.unwrap_or(defaults.width),
            height: env_var("COIN_GRID_HEIGHT")?.unwrap_or(defaults.height),
            max_name_length: env_var("COIN_GRID_MAX_NAME_LENGTH")?
                .unwrap_or(defaults.max_name_length),
            num_coins: env_var("COIN_GRID_NUM_COINS")?.unwrap_or(defaults.num_coins),
            value_tiers: defaults.value_tiers,
            player_ttl: env_var("COIN_GRID_PLAYER_TTL_SECS")?
                .map(Duration::from_secs)
                .or(defaults.player_ttl),
            store_timeout: env_var("COIN_GRID_STORE_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.store_timeout),
            max_refill_attempts: env_var("COIN_GRID_REFILL_ATTEMPTS")?
                .unwrap_or(defaults.max_refill_attempts),
            rng_seed: env_var("COIN_GRID_SEED")?.or(defaults.rng_seed),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid { width: self.width, height: self.height });
        }
        let cells = self.grid().cell_count();
        if self.num_coins > cells {
            return Err(ConfigError::TooManyCoins { num_coins: self.num_coins, cells });
        }
        let tiers = self.value_tiers.total();
        if tiers != self.num_coins {
            return Err(ConfigError::TierMismatch { tiers, num_coins: self.num_coins });
        }
        if self.value_tiers.0.iter().any(|tier| tier.value == 0) {
            return Err(ConfigError::ZeroValueTier);
        }
        if self.max_name_length == 0 {
            return Err(ConfigError::ZeroNameLength);
        }
        if self.max_refill_attempts == 0 {
            return Err(ConfigError::ZeroRefillAttempts);
        }
        Ok(())
    }

    /// Grid bounds.
    pub fn grid(&self) -> Grid {
        Grid::new(self.width, self.height)
    }
}

fn env_var<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { var, value }),
        Err(_) => Ok(None),
    }
}
