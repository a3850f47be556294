//! Score Tracking
//!
//! Scores are never adjusted incrementally; they are recomputed from
//! board contents after every mutating operation, so they cannot drift.

use serde::{Serialize, Deserialize};

use crate::game::board::SlotBoard;
use crate::game::card::Side;

/// Sum of values over all occupied slots of one side.
pub fn recompute(board: &SlotBoard, side: Side) -> u32 {
    board.cards(side).map(|c| c.value).sum()
}

/// Current scores for both sides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    /// Player's score.
    pub player: u32,
    /// NPC's score.
    pub npc: u32,
}

impl ScoreBoard {
    /// Recompute both sides from the board.
    pub fn recompute_all(&mut self, board: &SlotBoard) {
        self.player = recompute(board, Side::Player);
        self.npc = recompute(board, Side::Npc);
    }

    /// Score of one side.
    pub fn of(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player,
            Side::Npc => self.npc,
        }
    }

    /// Side currently ahead, `None` on a tie.
    pub fn leader(&self) -> Option<Side> {
        match self.player.cmp(&self.npc) {
            std::cmp::Ordering::Greater => Some(Side::Player),
            std::cmp::Ordering::Less => Some(Side::Npc),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Absolute score difference.
    pub fn gap(&self) -> u32 {
        self.player.abs_diff(self.npc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::CardDefinition;

    #[test]
    fn test_recompute_sums_occupied_slots() {
        let mut board = SlotBoard::new(3);
        board.place(Side::Player, 0, &CardDefinition::new(1, 2, 1));
        board.place(Side::Player, 2, &CardDefinition::new(2, 6, 1));
        board.place(Side::Npc, 0, &CardDefinition::new(3, 5, 1));

        // Slot 1 is empty and excluded
        assert_eq!(recompute(&board, Side::Player), 8);
        assert_eq!(recompute(&board, Side::Npc), 5);
    }

    #[test]
    fn test_leader_and_gap() {
        let mut scores = ScoreBoard { player: 12, npc: 15 };
        assert_eq!(scores.leader(), Some(Side::Npc));
        assert_eq!(scores.gap(), 3);

        scores.player = 15;
        assert_eq!(scores.leader(), None);
        assert_eq!(scores.gap(), 0);
    }

    #[test]
    fn test_recompute_after_replace_matches_delta() {
        let mut board = SlotBoard::new(3);
        for (i, v) in [2u32, 4, 6].iter().enumerate() {
            board.place(Side::Player, i, &CardDefinition::new(*v, *v, 1));
        }
        let before = recompute(&board, Side::Player);
        let outcome = board
            .replace_lowest(Side::Player, &CardDefinition::new(9, 9, 1))
            .unwrap();
        let after = recompute(&board, Side::Player);

        assert_eq!(before, 12);
        assert_eq!(after as i64, before as i64 + outcome.delta());
        assert_eq!(after, 19);
    }
}
