//! Tavern Duel Demo
//!
//! Runs one full three-level match against the scripted opponent, with a
//! simple scripted "player" reacting to engine events. Useful for eyeing
//! the event stream and notification text end to end.

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tavern_duel::game::events::SlotView;
use tavern_duel::{spawn_match, GameConfig, GameEvent, Phase, PlayerIntent, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Tavern Duel v{}", VERSION);

    let mut config = GameConfig::default();
    // Keep the demo snappy
    config.npc.think_delay_ms = 200;

    let mut handle = spawn_match(config)?;

    let mut player_view: Vec<SlotView> = Vec::new();
    let mut npc_view: Vec<SlotView> = Vec::new();
    let mut draws_left: u32 = 3;

    while let Some(event) = handle.events.recv().await {
        match &event {
            GameEvent::Notification { message, .. } => {
                info!("» {message}");
                if message == "Select one of your cards to lock." {
                    // Lock the highest card we hold
                    let card = player_view
                        .iter()
                        .filter_map(|s| s.card)
                        .max_by_key(|c| c.value)
                        .map(|c| c.id);
                    if let Some(card) = card {
                        handle.intents.send(PlayerIntent::LockCard { card }).await?;
                    }
                } else if message == "Select one of NPC's cards to swap." {
                    // Go after the opponent's best card and hope it is unlocked
                    let card = npc_view
                        .iter()
                        .filter_map(|s| s.card)
                        .max_by_key(|c| c.value)
                        .map(|c| c.id);
                    if let Some(card) = card {
                        handle.intents.send(PlayerIntent::SwapCard { card }).await?;
                    }
                }
            }
            GameEvent::BoardUpdate { player, npc } => {
                player_view = player.clone();
                npc_view = npc.clone();
            }
            GameEvent::PhaseChanged { turn, phase } => {
                info!("--- Turn {turn}: {phase} ---");
                match phase {
                    Phase::DrawOrPass | Phase::DrawWithHint | Phase::FinalTurn => {
                        // Draw a few times per level, then coast
                        let intent = if draws_left > 0 {
                            draws_left -= 1;
                            PlayerIntent::Draw
                        } else {
                            PlayerIntent::Pass
                        };
                        handle.intents.send(intent).await?;
                    }
                    _ => {}
                }
            }
            GameEvent::ScoreUpdate {
                player_score,
                npc_score,
            } => {
                info!("Score: Player {player_score} / NPC {npc_score}");
            }
            GameEvent::LevelComplete { level } => {
                info!("=== Level {level} complete ===");
                draws_left = 3;
            }
            GameEvent::MatchComplete {
                player_score,
                npc_score,
            } => {
                info!("=== Match complete: Player {player_score} / NPC {npc_score} ===");
                break;
            }
        }
    }

    let scores = handle.task.await.context("Scheduler task panicked")??;
    match scores.leader() {
        Some(side) => info!("{side} wins by {}", scores.gap()),
        None => info!("Draw!"),
    }
    Ok(())
}
