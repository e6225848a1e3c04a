//! Coin Grid Game Server
//!
//! Loads configuration, seeds the coin collection and runs a short scripted
//! round against the in-process store.

use sha2::{Digest, Sha256};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use coin_grid::{
    VERSION,
    game::{Admission, GameConfig, GameState, MoveOutcome},
    network::{ClientMessage, Outbound, PlayerSession, ServerMessage},
    store::MemoryStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = GameConfig::from_env()?;

    info!("Coin Grid Server v{}", VERSION);
    info!("Grid: {}x{}", config.width, config.height);
    info!("Coins per batch: {}", config.num_coins);
    match config.rng_seed {
        Some(seed) => info!("RNG Seed: {}", seed),
        None => info!("RNG Seed: from entropy"),
    }

    let game = GameState::new(MemoryStore::new(), config)?;
    if let Some(layout) = game.ensure_coins().await? {
        info!("Placed {} coins worth {} points", layout.len(), layout.total_value());
    }

    demo_round(&game).await
}

/// Demo function to exercise the engine end to end.
async fn demo_round(game: &GameState<MemoryStore>) -> anyhow::Result<()> {
    info!("=== Starting Demo Round ===");

    let names = ["alice", "bob", "carol", "alice"];
    for name in names {
        match game.add_player(name).await? {
            Admission::Accepted => info!("Added player {}", name),
            Admission::Rejected(reason) => warn!("Rejected {}: {:?}", name, reason),
        }
    }

    // Walk each player in a square spiral
    let pattern = ["R", "R", "D", "D", "L", "L", "L", "U", "U", "U"];
    let mut collected = 0;
    let mut refills = 0;
    for round in 0..50 {
        for (i, name) in ["alice", "bob", "carol"].iter().enumerate() {
            let direction = pattern[(round + i * 3) % pattern.len()];
            if let MoveOutcome::Collected { value, score, refilled, .. } =
                game.move_player(direction, name).await?
            {
                info!("{} collected {} (score {})", name, value, score);
                collected += 1;
                if refilled {
                    refills += 1;
                }
            }
        }
    }
    info!("Coins collected: {}, refills: {}", collected, refills);

    // Drive a session the way a transport would
    let mut session = PlayerSession::new();
    let frames = [
        ClientMessage::Name { name: "dave".into() },
        ClientMessage::Move { direction: "D".into() },
    ];
    for frame in frames {
        for outbound in session.handle(game, frame).await? {
            match outbound {
                Outbound::Reply(ServerMessage::Welcome) => info!("Session welcomed"),
                Outbound::Reply(other) => info!("Session reply: {}", other.to_json()?),
                Outbound::Broadcast(message) => info!("Broadcast {} bytes", message.to_json()?.len()),
            }
        }
    }

    // Print final results
    info!("=== Round Results ===");
    let snapshot = game.snapshot().await?;
    for (rank, (name, score)) in snapshot.scores.iter().enumerate() {
        info!("#{}: {} - Score: {}", rank + 1, name, score);
    }
    if let Some((leader, score)) = snapshot.leader() {
        info!("Leader: {} with {}", leader, score);
    }
    info!("Coins on grid: {}", snapshot.coins.len());

    let digest = Sha256::digest(snapshot.to_bytes()?);
    info!("Snapshot Hash: {}", hex::encode(digest));

    Ok(())
}
