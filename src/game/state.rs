//! Game State Engine
//!
//! Owns player registration, movement, coin collection and snapshot
//! assembly. All state lives in the injected [`Store`]; the engine only
//! composes store calls and relies on the store's atomic primitives for
//! mutual exclusion:
//!
//! - name reservation is a single `set_add`
//! - a move is settled with `claim_cell`: coin removal, score credit and
//!   position write land together, and at most one mover gets a coin
//! - scores only move through the store's atomic increments
//!
//! A failed coin refill is remembered and retried before the next move or
//! snapshot, so the game cannot stay coinless once the store recovers.
//!
//! Every operation suspends at each store call and may interleave with
//! others. Callers must not assume atomicity beyond the points above.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, instrument, warn};

use crate::core::grid::{Grid, Position};
use crate::core::rng::DeterministicRng;
use crate::game::coins::{CoinDistributor, CoinLayout};
use crate::game::config::{ConfigError, GameConfig};
use crate::game::direction::Direction;
use crate::game::error::{Admission, GameError, RejectReason};
use crate::game::snapshot::Snapshot;
use crate::store::{keys, CellClaim, Store, StoreError, TimedStore};

/// What a move did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Unknown direction or unknown player; nothing changed.
    Ignored,
    /// Player moved (or bumped a wall) onto an empty cell.
    Moved {
        /// New position.
        to: Position,
    },
    /// Player moved onto a coin and collected it.
    Collected {
        /// New position.
        to: Position,
        /// Coin value credited.
        value: u64,
        /// Player score after the credit.
        score: u64,
        /// Whether this was the last coin and a new batch was placed.
        refilled: bool,
    },
}

/// Authoritative game state over a store.
pub struct GameState<S> {
    store: TimedStore<S>,
    config: GameConfig,
    grid: Grid,
    coins: CoinDistributor,
    rng: Mutex<DeterministicRng>,
    refill_pending: AtomicBool,
}

impl<S: Store> GameState<S> {
    /// Create an engine over `store`. Does not touch the store; call
    /// [`GameState::ensure_coins`] once at startup.
    pub fn new(store: S, config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.rng_seed {
            Some(seed) => DeterministicRng::new(seed),
            None => DeterministicRng::from_entropy(),
        };
        Ok(Self {
            store: TimedStore::new(store, config.store_timeout),
            grid: config.grid(),
            coins: CoinDistributor::new(&config),
            rng: Mutex::new(rng),
            refill_pending: AtomicBool::new(false),
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Backing store (without the timeout wrapper).
    pub fn store(&self) -> &S {
        self.store.inner()
    }

    /// Register a player.
    ///
    /// Empty names, names over the length limit and names ever used before
    /// are refused with [`Admission::Rejected`]. Only store failures are
    /// errors.
    #[instrument(skip(self))]
    pub async fn add_player(&self, name: &str) -> Result<Admission, GameError> {
        let len = name.chars().count();
        if len == 0 {
            return Ok(Admission::Rejected(RejectReason::Empty));
        }
        if len > self.config.max_name_length {
            return Ok(Admission::Rejected(RejectReason::TooLong {
                len,
                max: self.config.max_name_length,
            }));
        }

        if !self.store.set_add(keys::USED_NAMES, name).await? {
            debug!("name already used");
            return Ok(Admission::Rejected(RejectReason::Taken));
        }

        let start = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            self.grid.random_point(&mut rng)
        };
        self.store.sorted_set_increment(keys::SCORES, name, 0).await?;
        self.write_position(name, start).await?;

        info!(%start, "player joined");
        Ok(Admission::Accepted)
    }

    /// Move a player by a wire direction (`"U"`, `"R"`, `"D"`, `"L"`).
    /// Any other direction is ignored.
    pub async fn move_player(&self, direction: &str, name: &str) -> Result<MoveOutcome, GameError> {
        match Direction::parse(direction) {
            Some(direction) => self.step(direction, name).await,
            None => {
                debug!(direction, name, "ignoring unknown direction");
                Ok(MoveOutcome::Ignored)
            }
        }
    }

    /// Move a player one cell, collecting any coin on the target cell.
    ///
    /// The grid has hard walls: each axis is clamped. The coin claim, score
    /// credit and position write are one store call, so a failure leaves
    /// the coin, score and position untouched. If the collected coin was
    /// the last one, a fresh batch is placed before this returns.
    #[instrument(skip(self))]
    pub async fn step(&self, direction: Direction, name: &str) -> Result<MoveOutcome, GameError> {
        self.retry_pending_refill().await?;

        let key = keys::player(name);
        let Some(raw) = self.store.kv_get(&key).await? else {
            debug!("ignoring move for unknown player");
            return Ok(MoveOutcome::Ignored);
        };
        let current = decode_position(&key, &raw)?;
        let to = self.grid.step(current, direction.delta());

        let cell = to.to_string();
        let claim = CellClaim {
            coins: keys::COINS,
            cell: &cell,
            scores: keys::SCORES,
            member: name,
            position_key: &key,
            position: &cell,
            ttl: self.config.player_ttl,
        };
        let Some(claimed) = self.store.claim_cell(&claim).await? else {
            return Ok(MoveOutcome::Moved { to });
        };
        debug!(%to, value = claimed.value, score = claimed.score, remaining = claimed.remaining, "coin collected");

        let refilled = claimed.remaining == 0;
        if refilled {
            info!("last coin collected, placing a new batch");
            self.refill_coins().await?;
        }

        Ok(MoveOutcome::Collected {
            to,
            value: claimed.value,
            score: claimed.score,
            refilled,
        })
    }

    /// Assemble a snapshot of positions (by name), scores (highest first)
    /// and coins.
    ///
    /// Players whose position expires between listing and fetching are
    /// skipped. An empty coin collection is returned as-is, except that a
    /// pending refill is retried first.
    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<Snapshot, GameError> {
        self.retry_pending_refill().await?;

        let player_keys = self.store.keys_by_prefix(keys::PLAYER_PREFIX).await?;
        let values = self.store.multi_get(&player_keys).await?;

        let mut positions = Vec::with_capacity(player_keys.len());
        for (key, raw) in player_keys.iter().zip(values) {
            let (Some(name), Some(raw)) = (keys::player_name(key), raw) else {
                continue;
            };
            positions.push((name.to_string(), decode_position(key, &raw)?));
        }
        positions.sort_by(|a, b| a.0.cmp(&b.0));

        let scores = self.store.sorted_set_range_desc(keys::SCORES).await?;

        let mut coins = BTreeMap::new();
        for (cell, raw) in self.store.hash_get_all(keys::COINS).await? {
            let pos = decode_position(keys::COINS, &cell)?;
            coins.insert(pos, decode_coin(&cell, &raw)?);
        }

        Ok(Snapshot { positions, scores, coins })
    }

    /// Place coins if the collection is empty. Returns the new layout, or
    /// `None` if coins were already present.
    pub async fn ensure_coins(&self) -> Result<Option<CoinLayout>, GameError> {
        if self.store.hash_len(keys::COINS).await? > 0 {
            return Ok(None);
        }
        self.refill_coins().await.map(Some)
    }

    /// Current position of a player, if tracked.
    pub async fn position_of(&self, name: &str) -> Result<Option<Position>, GameError> {
        let key = keys::player(name);
        match self.store.kv_get(&key).await? {
            Some(raw) => Ok(Some(decode_position(&key, &raw)?)),
            None => Ok(None),
        }
    }

    /// Whether a name has ever been registered.
    pub async fn is_registered(&self, name: &str) -> Result<bool, GameError> {
        Ok(self.store.set_is_member(keys::USED_NAMES, name).await?)
    }

    /// Value of the coin on a cell, if any.
    pub async fn coin_at(&self, pos: Position) -> Result<Option<u32>, GameError> {
        let cell = pos.to_string();
        match self.store.hash_get(keys::COINS, &cell).await? {
            Some(raw) => Ok(Some(decode_coin(&cell, &raw)?)),
            None => Ok(None),
        }
    }

    /// Whether an earlier refill gave up and is still owed.
    pub fn refill_pending(&self) -> bool {
        self.refill_pending.load(Ordering::Acquire)
    }

    /// Place a new coin batch, retrying up to the configured limit.
    ///
    /// Exhausting the retries is an [`GameError::InvariantViolation`] and
    /// marks the refill as pending; the game must not carry on without
    /// coins.
    async fn refill_coins(&self) -> Result<CoinLayout, GameError> {
        let max_attempts = self.config.max_refill_attempts;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.coins.place_coins(&self.store, &self.rng).await {
                Ok(layout) => {
                    self.refill_pending.store(false, Ordering::Release);
                    return Ok(layout);
                }
                Err(source) if attempt >= max_attempts => {
                    self.refill_pending.store(true, Ordering::Release);
                    error!(attempts = attempt, error = %source, "coin collection left empty");
                    return Err(GameError::InvariantViolation { attempts: attempt, source });
                }
                Err(err) => {
                    warn!(attempt, max_attempts, error = %err, "coin refill failed, retrying");
                }
            }
        }
    }

    /// Finish a refill that gave up earlier. Another writer may have
    /// refilled in the meantime, in which case nothing is placed.
    async fn retry_pending_refill(&self) -> Result<(), GameError> {
        if !self.refill_pending() {
            return Ok(());
        }
        warn!("retrying coin refill that failed earlier");
        if self.ensure_coins().await?.is_none() {
            self.refill_pending.store(false, Ordering::Release);
        }
        Ok(())
    }

    async fn write_position(&self, name: &str, pos: Position) -> Result<(), StoreError> {
        let key = keys::player(name);
        let value = pos.to_string();
        match self.config.player_ttl {
            Some(ttl) => self.store.kv_set_with_expiry(&key, &value, ttl).await,
            None => self.store.kv_set(&key, &value).await,
        }
    }
}

fn decode_position(key: &str, raw: &str) -> Result<Position, StoreError> {
    raw.parse().map_err(|_| StoreError::Corrupt {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

fn decode_coin(cell: &str, raw: &str) -> Result<u32, StoreError> {
    raw.parse().map_err(|_| StoreError::Corrupt {
        key: format!("{}[{}]", keys::COINS, cell),
        value: raw.to_string(),
    })
}

// =============================================================================
// TESTS
// =============================================================================
