//! Headless match-3 runner (default binary).
//!
//! Runs the game loop at a fixed tick: applies commands from the TCP adapter,
//! plays queued animations through the reference player and streams an
//! observation whenever the state changes. With the adapter disabled
//! (`MATCH3_AI_DISABLED=1`) it plays itself, taking the first legal move each
//! time the board and its animations are at rest.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use match3::adapter::{apply_inbound, observation_line, Adapter, OutboundMessage};
use match3::core::{Game, GameConfig, GameSnapshot};
use match3::player::Player;
use match3::types::TICK_MS;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GameConfig::from_env();
    info!(
        width = config.width,
        height = config.height,
        flavors = config.flavor_count,
        seed = config.seed,
        "starting"
    );
    let mut game = Game::initialize(config)?;
    let adapter = Adapter::start_from_env()?;

    run(&mut game, adapter)
}

fn run(game: &mut Game, mut adapter: Option<Adapter>) -> Result<()> {
    let mut player = Player::new();
    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    let mut snapshot = GameSnapshot::default();
    let mut last_sent: Option<GameSnapshot> = None;
    let mut obs_seq = 0u64;

    loop {
        // Commands.
        if let Some(adapter) = adapter.as_mut() {
            while let Some(inbound) = adapter.try_recv() {
                let applied = apply_inbound(game, inbound);
                if applied.restarted {
                    player.reset();
                }
                for msg in applied.messages {
                    adapter.send(msg);
                }
            }
        } else if player.is_idle() && game.queue().is_idle() {
            autoplay(game)?;
        }

        // Animations.
        let elapsed = last_tick.elapsed();
        last_tick = Instant::now();
        let elapsed_ms = elapsed.as_millis().min(u32::MAX as u128) as u32;
        player.tick(game, elapsed_ms);

        // Observations.
        game.snapshot_into(&mut snapshot);
        if last_sent.as_ref() != Some(&snapshot) {
            if let Some(adapter) = adapter.as_ref() {
                obs_seq += 1;
                match observation_line(game, obs_seq) {
                    Some(line) => adapter.send(OutboundMessage::Broadcast { line }),
                    None => debug!("observation not serializable"),
                }
            }
            last_sent = Some(snapshot.clone());
        }

        let spent = last_tick.elapsed();
        if let Some(rest) = tick_duration.checked_sub(spent) {
            std::thread::sleep(rest);
        }
    }
}

/// Play the first legal move, or start over when there is none
fn autoplay(game: &mut Game) -> Result<()> {
    match game.legal_moves().first().copied() {
        Some(m) => {
            let outcome = game.request_swap(m.source, m.target);
            info!(
                source = m.source,
                target = m.target,
                steps = outcome.cascade.len(),
                score = game.score(),
                "autoplay move"
            );
        }
        None => {
            let seed = game.config().seed.wrapping_add(1);
            info!(seed, score = game.score(), "no legal moves, restarting");
            game.restart(seed)?;
        }
    }
    Ok(())
}
