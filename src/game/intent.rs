//! Player Intents
//!
//! Everything the outside world may ask of the engine. Intents are queued
//! on a channel and consumed only at the scheduler's suspension points;
//! an intent arriving when no suspension of its kind is active is
//! rejected, not buffered.
//!
//! The engine does not care how an intent was produced - a button, a
//! hover timer, or a scripted test all feed the same channel.

use serde::{Serialize, Deserialize};

use crate::game::card::CardInstanceId;

/// An input request from the external input-handling collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerIntent {
    /// Draw a card on a draw-or-pass turn.
    Draw,
    /// Pass on a draw-or-pass turn.
    Pass,
    /// Lock one of the player's own cards during swap-and-lock.
    LockCard {
        /// Card to lock.
        card: CardInstanceId,
    },
    /// Name an NPC card to swap for during swap-and-lock.
    SwapCard {
        /// NPC card to take.
        card: CardInstanceId,
    },
}

impl PlayerIntent {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PlayerIntent::Draw => "draw",
            PlayerIntent::Pass => "pass",
            PlayerIntent::LockCard { .. } => "lock_card",
            PlayerIntent::SwapCard { .. } => "swap_card",
        }
    }
}
