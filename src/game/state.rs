//! Match State
//!
//! Everything one level of the duel owns: deck, board, scores, RNG, and
//! the turn cursor. Created at level start, torn down and rebuilt on the
//! transition to the next level. The scheduler task has exclusive
//! ownership; no other context mutates it.

use tracing::info;

use crate::core::rng::DeterministicRng;
use crate::game::board::SlotBoard;
use crate::game::card::{CardDefinition, CardInstanceId, Side};
use crate::game::config::{ConfigError, LevelConfig, Phase};
use crate::game::deck::{Deck, DeckError};
use crate::game::score::ScoreBoard;

/// Mutable state of the level in progress.
#[derive(Clone, Debug)]
pub struct MatchState {
    /// Resolved configuration of the current level.
    pub level: LevelConfig,
    /// Turn index within the level, starting at 1.
    pub current_turn: u32,
    /// Phase currently being resolved, if a turn is active.
    pub phase: Option<Phase>,
    /// Set by the end-of-level transition.
    pub is_level_complete: bool,
    /// The slot board for this level.
    pub board: SlotBoard,
    /// The drawable deck for this level.
    pub deck: Deck,
    /// Current scores, recomputed after every mutation.
    pub scores: ScoreBoard,
    /// Seeded RNG; all shuffles and NPC picks come from here.
    pub rng: DeterministicRng,
    /// Definition of the NPC's most recent draw, for hint turns.
    /// Cleared when the NPC passes.
    pub npc_last_draw: Option<CardDefinition>,
    /// Player's lock selection; valid only during swap-and-lock.
    pub locked_card: Option<CardInstanceId>,
    /// Player's swap-target selection; valid only during swap-and-lock.
    pub swap_target: Option<CardInstanceId>,
}

impl MatchState {
    /// Build the state for a fresh level: new shuffled deck, both sides
    /// populated in slot order, scores recomputed.
    pub fn start_level(
        level: LevelConfig,
        catalog: &[CardDefinition],
        mut rng: DeterministicRng,
    ) -> Self {
        let mut deck = Deck::new(catalog.to_vec(), &mut rng);
        let mut board = SlotBoard::new(level.slots_per_side);

        board.populate(Side::Player, &mut deck, &mut rng);
        board.populate(Side::Npc, &mut deck, &mut rng);

        let mut scores = ScoreBoard::default();
        scores.recompute_all(&board);

        info!(
            level = level.level,
            player_score = scores.player,
            npc_score = scores.npc,
            "Level started"
        );

        Self {
            level,
            current_turn: 1,
            phase: None,
            is_level_complete: false,
            board,
            deck,
            scores,
            rng,
            npc_last_draw: None,
            locked_card: None,
            swap_target: None,
        }
    }

    /// Tear this level down and start the next one, carrying the RNG
    /// forward so the match stays a single deterministic sequence.
    pub fn advance_to(&mut self, level: LevelConfig, catalog: &[CardDefinition]) {
        let rng = self.rng.clone();
        *self = Self::start_level(level, catalog, rng);
    }

    /// Recompute both scores from the board.
    pub fn recompute_scores(&mut self) {
        self.scores.recompute_all(&self.board);
    }
}

/// Errors that abort a match.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// The intent channel closed; no further input can arrive.
    #[error("Player input channel closed")]
    InputClosed,

    /// The deck cannot produce cards (empty catalog).
    #[error(transparent)]
    Deck(#[from] DeckError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::GameConfig;

    fn state_for_level(level: u8) -> MatchState {
        let config = GameConfig::default();
        MatchState::start_level(
            config.level_config(level).unwrap(),
            &config.catalog,
            DeterministicRng::new(7),
        )
    }

    #[test]
    fn test_start_level_populates_both_sides() {
        let state = state_for_level(1);
        assert_eq!(state.board.cards(Side::Player).count(), 3);
        assert_eq!(state.board.cards(Side::Npc).count(), 3);
        assert_eq!(state.current_turn, 1);
        assert!(!state.is_level_complete);
        assert!(state.scores.player > 0);
    }

    #[test]
    fn test_advance_to_rebuilds_board() {
        let config = GameConfig::default();
        let mut state = state_for_level(1);
        state.advance_to(config.level_config(2).unwrap(), &config.catalog);

        assert_eq!(state.level.level, 2);
        assert_eq!(state.current_turn, 1);
        assert_eq!(state.board.cards(Side::Player).count(), 4);
        assert_eq!(state.board.cards(Side::Npc).count(), 4);
        assert!(state.locked_card.is_none());
        assert!(state.npc_last_draw.is_none());
    }

    #[test]
    fn test_start_level_is_deterministic() {
        let a = state_for_level(1);
        let b = state_for_level(1);

        let values_a: Vec<u32> = a.board.cards(Side::Player).map(|c| c.value).collect();
        let values_b: Vec<u32> = b.board.cards(Side::Player).map(|c| c.value).collect();
        assert_eq!(values_a, values_b);
        assert_eq!(a.scores, b.scores);
    }
}
