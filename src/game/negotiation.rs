//! Swap-and-Lock Negotiation
//!
//! The turn-4 sub-protocol. The player locks one of their own cards and
//! names one of the NPC's cards to take; the NPC mirrors with its own
//! lock and its own pick from the player's top cards. The two halves of
//! the exchange resolve independently, and either may fail.
//!
//! Both player selections are awaited channel receives; the task suspends
//! until the matching intent arrives. Bounding a player who never answers
//! is the caller's concern.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::game::card::{CardInstance, CardInstanceId, Side};
use crate::game::events::{EventSender, GameEvent};
use crate::game::intent::PlayerIntent;
use crate::game::state::{MatchError, MatchState};

/// Run the negotiation phase to completion.
///
/// Returns the textual summary of what was exchanged and why any half
/// failed; the same text is emitted as a notification.
pub async fn run(
    state: &mut MatchState,
    intents: &mut mpsc::Receiver<PlayerIntent>,
    events: &EventSender,
) -> Result<String, MatchError> {
    events.emit(GameEvent::notification("Phase: Swap & Lock"));

    // Step 1: player locks one of their own cards
    events.emit(GameEvent::notification("Select one of your cards to lock."));
    let player_lock = await_lock_selection(state, intents, events).await?;
    state.board.lock_card(player_lock).ok();
    state.locked_card = Some(player_lock);

    // Step 2: NPC locks one of its own unlocked top-3, mirrored only
    // after the player's lock resolved
    npc_lock(state);

    // Step 3: player names an NPC card to take
    events.emit(GameEvent::notification("Select one of NPC's cards to swap."));
    let swap_target = await_swap_selection(state, intents, events).await?;
    state.swap_target = Some(swap_target);

    // Step 4: resolve both halves independently
    let mut summary = resolve_player_half(state, swap_target);
    summary.push_str(&resolve_npc_half(state));

    // Step 5: publish the outcome
    state.recompute_scores();
    events.emit(GameEvent::score_update(&state.scores));
    events.emit(GameEvent::notification(summary.clone()));
    info!(%summary, "Swap and lock resolved");

    Ok(summary)
}

/// Suspend until the player locks one of their own unlocked cards.
async fn await_lock_selection(
    state: &MatchState,
    intents: &mut mpsc::Receiver<PlayerIntent>,
    events: &EventSender,
) -> Result<CardInstanceId, MatchError> {
    loop {
        let intent = intents.recv().await.ok_or(MatchError::InputClosed)?;
        match intent {
            PlayerIntent::LockCard { card } => match state.board.find_card(card) {
                Some(c) if c.owner == Side::Player && !c.locked => {
                    info!(value = c.value, "Player locked a card");
                    return Ok(card);
                }
                Some(_) => {
                    warn!(?card, "Lock selection rejected: not an unlocked player card");
                    events.emit(GameEvent::notification(
                        "You can only lock one of your own unlocked cards.",
                    ));
                }
                None => {
                    warn!(?card, "Lock selection rejected: card not on the table");
                    events.emit(GameEvent::notification("That card is not on the table."));
                }
            },
            other => {
                warn!(kind = other.kind(), "Ignoring intent while waiting for lock selection");
                events.emit(GameEvent::notification("Select a card to lock first."));
            }
        }
    }
}

/// Suspend until the player names a card on the NPC's side.
///
/// Lock state is deliberately not checked here; picking the NPC's locked
/// card is allowed and fails at resolution.
async fn await_swap_selection(
    state: &MatchState,
    intents: &mut mpsc::Receiver<PlayerIntent>,
    events: &EventSender,
) -> Result<CardInstanceId, MatchError> {
    loop {
        let intent = intents.recv().await.ok_or(MatchError::InputClosed)?;
        match intent {
            PlayerIntent::SwapCard { card } => match state.board.find_card(card) {
                Some(c) if c.owner == Side::Npc => {
                    info!(value = c.value, "Player picked an NPC card to swap");
                    return Ok(card);
                }
                Some(_) => {
                    warn!(?card, "Swap selection rejected: not an NPC card");
                    events.emit(GameEvent::notification("Pick a card on the NPC's side."));
                }
                None => {
                    warn!(?card, "Swap selection rejected: card not on the table");
                    events.emit(GameEvent::notification("That card is not on the table."));
                }
            },
            PlayerIntent::LockCard { .. } => {
                // One lock per phase; the earlier selection stands
                warn!("Duplicate lock selection ignored");
                events.emit(GameEvent::notification("You already locked a card."));
            }
            other => {
                warn!(kind = other.kind(), "Ignoring intent while waiting for swap selection");
                events.emit(GameEvent::notification("Select an NPC card to swap first."));
            }
        }
    }
}

/// NPC locks one of its own unlocked cards, uniformly from its top-3 by
/// value (ties by slot index).
fn npc_lock(state: &mut MatchState) {
    let side_len = state.board.slots(Side::Npc).len();
    let candidates: Vec<CardInstance> = state
        .board
        .top_n_by_value(Side::Npc, side_len)
        .into_iter()
        .filter(|c| !c.locked)
        .take(3)
        .collect();

    let pick = state.rng.choose(&candidates).copied();
    match pick {
        Some(card) => {
            state.board.lock_card(card.id).ok();
            info!(value = card.value, "NPC locked a card");
        }
        None => warn!("NPC has no unlocked card to lock"),
    }
}

/// Player half: the selected NPC card, if still unlocked, swaps with the
/// player's current lowest-value unlocked card.
fn resolve_player_half(state: &mut MatchState, target_id: CardInstanceId) -> String {
    let target = match state.board.find_card(target_id).copied() {
        Some(c) => c,
        None => return "Player swap failed: no valid card found. ".to_string(),
    };
    if target.locked {
        return "Player swap failed: locked card selected. ".to_string();
    }

    let lowest = state
        .board
        .find_lowest_unlocked(Side::Player)
        .map(|c| (c.id, c.value));
    match lowest {
        Some((low_id, low_value)) => match state.board.swap(low_id, target_id) {
            Ok(()) => format!(
                "Player's card ({low_value}) swapped with NPC's card ({}). ",
                target.value
            ),
            Err(e) => {
                warn!("Player half failed: {e}");
                "Player swap failed: no valid card found. ".to_string()
            }
        },
        None => "Player swap failed: no valid card found. ".to_string(),
    }
}

/// NPC half: an independent exchange of the NPC's lowest unlocked card
/// for a uniform pick from the player's top-3 (locked or not; a locked
/// pick fails this half).
fn resolve_npc_half(state: &mut MatchState) -> String {
    let candidates = state.board.top_n_by_value(Side::Player, 3);
    let chosen = state.rng.choose(&candidates).copied();

    let chosen = match chosen {
        Some(c) => c,
        None => return "NPC swap failed: no valid card found.".to_string(),
    };
    if chosen.locked {
        info!(value = chosen.value, "NPC picked the player's locked card");
        return "NPC swap failed: locked card selected.".to_string();
    }

    let lowest = state
        .board
        .find_lowest_unlocked(Side::Npc)
        .map(|c| (c.id, c.value));
    match lowest {
        Some((low_id, low_value)) => match state.board.swap(low_id, chosen.id) {
            Ok(()) => format!(
                "NPC's card ({low_value}) swapped with Player's card ({}).",
                chosen.value
            ),
            Err(e) => {
                warn!("NPC half failed: {e}");
                "NPC swap failed: no valid card found.".to_string()
            }
        },
        None => "NPC swap failed: no valid card found.".to_string(),
    }
}
