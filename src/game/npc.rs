//! NPC Decision Policy
//!
//! The scripted opponent's ordinary draw-or-pass turn. The thinking delay
//! paces presentation only; the decision is a pure function of the two
//! scores and the configured threshold.

use tracing::{info, warn};

use crate::game::card::Side;
use crate::game::config::NpcConfig;
use crate::game::events::{EventSender, GameEvent};
use crate::game::state::{MatchError, MatchState};

/// True when the NPC should draw: it is behind the player, or still
/// below its score threshold.
pub fn decide_draw(npc_score: u32, player_score: u32, threshold: u32) -> bool {
    npc_score < player_score || npc_score < threshold
}

/// Run the NPC's draw-or-pass turn.
///
/// Sleeps for the configured thinking delay, decides, and on a draw
/// replaces the NPC's lowest-value card and records the drawn definition
/// for the next hint turn.
pub async fn take_turn(
    state: &mut MatchState,
    npc: &NpcConfig,
    events: &EventSender,
) -> Result<(), MatchError> {
    events.emit(GameEvent::notification("NPC is thinking..."));
    tokio::time::sleep(npc.think_delay()).await;

    if decide_draw(state.scores.npc, state.scores.player, npc.score_threshold) {
        let def = state.deck.draw(&mut state.rng)?;
        match state.board.replace_lowest(Side::Npc, &def) {
            Some(_) => {
                state.npc_last_draw = Some(def);
                info!(value = def.face_value, "NPC drew a card");
                events.emit(GameEvent::notification("NPC drew a card."));
            }
            None => {
                warn!(value = def.face_value, "Drawn card discarded, NPC side is empty");
            }
        }
    } else {
        state.npc_last_draw = None;
        info!("NPC passed the turn");
        events.emit(GameEvent::notification("NPC passed this turn."));
    }

    state.recompute_scores();
    events.emit(GameEvent::score_update(&state.scores));
    Ok(())
}
