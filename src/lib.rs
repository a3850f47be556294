//! # Tavern Duel
//!
//! Turn-based card duel engine: a human player against a scripted tavern
//! opponent, three levels of growing boards, deterministic from the
//! match seed.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TAVERN DUEL ENGINE                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Deterministic primitives                │
//! │  └── rng.rs        - Xorshift128+ PRNG and seed derivation   │
//! │                                                              │
//! │  game/             - Rules engine                            │
//! │  ├── card.rs       - Card definitions and instances          │
//! │  ├── config.rs     - Catalog, levels, phase table            │
//! │  ├── deck.rs       - Shuffled deck with auto-reset           │
//! │  ├── board.rs      - Slot board, swaps, lowest-card replace  │
//! │  ├── score.rs      - Score recomputation                     │
//! │  ├── events.rs     - Engine-to-UI event channel              │
//! │  ├── intent.rs     - Player input messages                   │
//! │  ├── npc.rs        - Scripted opponent policy                │
//! │  ├── negotiation.rs- Swap-and-lock phase                     │
//! │  └── scheduler.rs  - Turn/phase state machine                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Given the same match id, catalog, and intent stream, a match replays
//! identically: all shuffles and NPC picks come from a single seeded
//! Xorshift128+ stream, and nothing reads wall-clock time except the
//! presentation-only NPC thinking delay.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::rng::DeterministicRng;
pub use game::card::{CardDefinition, CardInstance, Side};
pub use game::config::{GameConfig, LevelConfig, Phase};
pub use game::events::{EventSender, GameEvent};
pub use game::intent::PlayerIntent;
pub use game::scheduler::{spawn_match, MatchHandle, TurnScheduler};
pub use game::score::ScoreBoard;
pub use game::state::{MatchError, MatchState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
