//! Game Events
//!
//! State changes the presentation layer renders. The engine pushes these
//! on an event channel; it never calls into UI code.

use serde::{Serialize, Deserialize};
use tokio::sync::mpsc;
use tracing::debug;

use crate::game::board::SlotBoard;
use crate::game::card::{CardInstanceId, Side};
use crate::game::config::Phase;
use crate::game::score::ScoreBoard;

/// Default display time for transient notifications, in seconds.
pub const DEFAULT_NOTIFICATION_SECS: u32 = 3;

/// One card as the presentation layer sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    /// Instance id, usable in selection intents.
    pub id: CardInstanceId,
    /// Face value.
    pub value: u32,
    /// Locked for the current negotiation phase.
    pub locked: bool,
}

/// One slot as the presentation layer sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    /// Slot index within its side.
    pub index: usize,
    /// Occupying card, if any.
    pub card: Option<CardView>,
}

/// An event emitted by the rules engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Transient text for the player.
    Notification {
        /// Text to show.
        message: String,
        /// How long to show it, in seconds.
        duration_secs: u32,
    },

    /// Scores changed.
    ScoreUpdate {
        /// Player's score.
        player_score: u32,
        /// NPC's score.
        npc_score: u32,
    },

    /// A new phase was entered.
    PhaseChanged {
        /// Turn index within the level.
        turn: u32,
        /// Phase kind bound to that turn.
        phase: Phase,
    },

    /// A level finished.
    LevelComplete {
        /// The level that completed.
        level: u8,
    },

    /// All levels finished; the match is over.
    MatchComplete {
        /// Player's final score.
        player_score: u32,
        /// NPC's final score.
        npc_score: u32,
    },

    /// Snapshot of both sides' slots, emitted after every board
    /// mutation. This is how external collaborators learn card ids for
    /// selection intents.
    BoardUpdate {
        /// Player's slots in index order.
        player: Vec<SlotView>,
        /// NPC's slots in index order.
        npc: Vec<SlotView>,
    },
}

impl GameEvent {
    /// Notification with the default duration.
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
            duration_secs: DEFAULT_NOTIFICATION_SECS,
        }
    }

    /// Score update from the current score board.
    pub fn score_update(scores: &ScoreBoard) -> Self {
        Self::ScoreUpdate {
            player_score: scores.player,
            npc_score: scores.npc,
        }
    }

    /// Phase entry.
    pub fn phase_changed(turn: u32, phase: Phase) -> Self {
        Self::PhaseChanged { turn, phase }
    }

    /// Level completion.
    pub fn level_complete(level: u8) -> Self {
        Self::LevelComplete { level }
    }

    /// Match completion.
    pub fn match_complete(scores: &ScoreBoard) -> Self {
        Self::MatchComplete {
            player_score: scores.player,
            npc_score: scores.npc,
        }
    }

    /// Snapshot of the board.
    pub fn board_update(board: &SlotBoard) -> Self {
        let view = |side: Side| {
            board
                .slots(side)
                .iter()
                .map(|slot| SlotView {
                    index: slot.index,
                    card: slot.occupant.map(|c| CardView {
                        id: c.id,
                        value: c.value,
                        locked: c.locked,
                    }),
                })
                .collect()
        };
        Self::BoardUpdate {
            player: view(Side::Player),
            npc: view(Side::Npc),
        }
    }
}

/// Sending half of the event channel.
///
/// Emission never blocks and never fails the engine; a dropped receiver
/// just means nobody is rendering.
#[derive(Clone, Debug)]
pub struct EventSender(mpsc::UnboundedSender<GameEvent>);

impl EventSender {
    /// Create an event channel.
    pub fn channel() -> (EventSender, mpsc::UnboundedReceiver<GameEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSender(tx), rx)
    }

    /// Emit one event.
    pub fn emit(&self, event: GameEvent) {
        if self.0.send(event).is_err() {
            debug!("Event receiver dropped; event discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_channel_delivers() {
        let (tx, mut rx) = EventSender::channel();
        tx.emit(GameEvent::level_complete(1));
        assert_eq!(rx.try_recv().unwrap(), GameEvent::LevelComplete { level: 1 });
    }

    #[test]
    fn test_emit_after_receiver_drop_is_silent() {
        let (tx, rx) = EventSender::channel();
        drop(rx);
        tx.emit(GameEvent::level_complete(1));
    }

    #[test]
    fn test_notification_default_duration() {
        let event = GameEvent::notification("Final Turn!");
        assert_eq!(
            event,
            GameEvent::Notification {
                message: "Final Turn!".to_string(),
                duration_secs: 3,
            }
        );
    }

    #[test]
    fn test_score_update_snapshot() {
        let scores = ScoreBoard { player: 12, npc: 15 };
        assert_eq!(
            GameEvent::score_update(&scores),
            GameEvent::ScoreUpdate {
                player_score: 12,
                npc_score: 15,
            }
        );
    }
}
