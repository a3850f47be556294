//! Game logic modules
//!
//! Everything here is deterministic given the match seed and the stream
//! of player intents. The scheduler is the only entry point that drives
//! the rest.

pub mod board;
pub mod card;
pub mod config;
pub mod deck;
pub mod events;
pub mod intent;
pub mod negotiation;
pub mod npc;
pub mod scheduler;
pub mod score;
pub mod state;
