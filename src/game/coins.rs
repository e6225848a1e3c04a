//! Coin Distribution
//!
//! Lays out a fresh batch of coins: a random permutation of every cell,
//! the first `num_coins` cells taken, values assigned by rank through the
//! configured [`ValueTiers`].

use std::sync::{Mutex, PoisonError};
use tracing::info;

use crate::core::grid::{Grid, Position};
use crate::core::rng::DeterministicRng;
use crate::game::config::{GameConfig, ValueTiers};
use crate::store::{keys, Store, StoreResult};

/// One batch of coins, in rank order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoinLayout {
    coins: Vec<(Position, u32)>,
}

impl CoinLayout {
    /// Coins in rank order.
    pub fn coins(&self) -> &[(Position, u32)] {
        &self.coins
    }

    /// Number of coins.
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    /// True if the layout has no coins.
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Total value of all coins.
    pub fn total_value(&self) -> u64 {
        self.coins.iter().map(|(_, value)| u64::from(*value)).sum()
    }

    /// Store hash entries (`"x,y"` -> value).
    fn entries(&self) -> Vec<(String, String)> {
        self.coins
            .iter()
            .map(|(pos, value)| (pos.to_string(), value.to_string()))
            .collect()
    }
}

/// Coin placement policy.
#[derive(Clone, Debug)]
pub struct CoinDistributor {
    grid: Grid,
    num_coins: usize,
    tiers: ValueTiers,
}

impl CoinDistributor {
    /// Create a distributor for the configured grid and tiers.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            grid: config.grid(),
            num_coins: config.num_coins,
            tiers: config.value_tiers.clone(),
        }
    }

    /// Draw a new layout. Cells are distinct; values follow rank.
    pub fn layout(&self, rng: &mut DeterministicRng) -> CoinLayout {
        let coins = rng
            .permutation(self.grid.cell_count())
            .into_iter()
            .take(self.num_coins)
            .enumerate()
            .filter_map(|(rank, cell)| {
                let value = self.tiers.value_for_rank(rank)?;
                Some((self.grid.position_of(cell), value))
            })
            .collect();
        CoinLayout { coins }
    }

    /// Draw a layout and merge it into the coin hash in a single bulk write.
    ///
    /// Existing coins are never cleared first, so a failed write cannot
    /// leave an observable empty collection behind.
    pub async fn place_coins<S: Store>(
        &self,
        store: &S,
        rng: &Mutex<DeterministicRng>,
    ) -> StoreResult<CoinLayout> {
        let layout = {
            let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
            self.layout(&mut rng)
        };
        store.hash_bulk_set(keys::COINS, &layout.entries()).await?;
        info!(coins = layout.len(), total_value = layout.total_value(), "placed coins");
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use crate::store::MemoryStore;

    fn value_counts(layout: &CoinLayout) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for (_, value) in layout.coins() {
            *counts.entry(*value).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_layout_has_tiered_values() {
        let distributor = CoinDistributor::new(&GameConfig::default());
        let layout = distributor.layout(&mut DeterministicRng::new(1));

        assert_eq!(layout.len(), 100);
        assert_eq!(value_counts(&layout), BTreeMap::from([(1, 50), (2, 25), (5, 20), (10, 5)]));
        assert_eq!(layout.total_value(), 50 + 50 + 100 + 50);
    }

    #[test]
    fn test_layout_cells_are_distinct_and_on_grid() {
        let config = GameConfig::default();
        let grid = config.grid();
        let layout = CoinDistributor::new(&config).layout(&mut DeterministicRng::new(2));

        let cells: BTreeSet<Position> = layout.coins().iter().map(|(pos, _)| *pos).collect();
        assert_eq!(cells.len(), 100);
        assert!(cells.iter().all(|pos| grid.contains(*pos)));
    }

    #[test]
    fn test_layout_is_seed_deterministic() {
        let distributor = CoinDistributor::new(&GameConfig::default());
        let a = distributor.layout(&mut DeterministicRng::new(77));
        let b = distributor.layout(&mut DeterministicRng::new(77));
        assert_eq!(a, b);
    }

    #[test]
    fn test_layout_fills_small_grid_completely() {
        let config = GameConfig {
            width: 3,
            height: 2,
            num_coins: 6,
            value_tiers: ValueTiers(vec![
                crate::game::config::CoinTier { value: 1, count: 4 },
                crate::game::config::CoinTier { value: 10, count: 2 },
            ]),
            ..Default::default()
        };
        let layout = CoinDistributor::new(&config).layout(&mut DeterministicRng::new(3));
        let cells: BTreeSet<Position> = layout.coins().iter().map(|(pos, _)| *pos).collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(value_counts(&layout), BTreeMap::from([(1, 4), (10, 2)]));
    }

    #[tokio::test]
    async fn test_place_coins_merges_into_store() {
        let store = MemoryStore::new();
        store
            .hash_bulk_set(keys::COINS, &[("999,999".into(), "7".into())])
            .await
            .unwrap();

        let distributor = CoinDistributor::new(&GameConfig::default());
        let rng = Mutex::new(DeterministicRng::new(4));
        let layout = distributor.place_coins(&store, &rng).await.unwrap();

        assert_eq!(store.hash_len(keys::COINS).await.unwrap(), layout.len() + 1);
        let (pos, value) = layout.coins()[0];
        assert_eq!(
            store.hash_get(keys::COINS, &pos.to_string()).await.unwrap(),
            Some(value.to_string())
        );
    }
}
