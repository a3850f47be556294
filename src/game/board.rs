//! Slot Board
//!
//! The fixed per-side array of slots for the active level and the card
//! instance occupying each slot. Slot order is stable and breaks every
//! value tie deterministically.

use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::core::rng::DeterministicRng;
use crate::game::card::{CardDefinition, CardInstance, CardInstanceId, Side};
use crate::game::deck::Deck;

/// A fixed position on one side of the table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Slot {
    /// Position within the side, 0-based.
    pub index: usize,
    /// Side the slot belongs to.
    pub side: Side,
    /// Card currently in the slot, if any.
    pub occupant: Option<CardInstance>,
}

/// Outcome of replacing the lowest card on a side.
#[derive(Clone, Copy, Debug)]
pub struct ReplaceOutcome {
    /// Value of the destroyed card.
    pub old_value: u32,
    /// Value of the replacement.
    pub new_value: u32,
    /// Id of the newly created instance.
    pub new_card: CardInstanceId,
}

impl ReplaceOutcome {
    /// Score delta caused by the replacement.
    pub fn delta(&self) -> i64 {
        self.new_value as i64 - self.old_value as i64
    }
}

/// Both sides' slots for the active level.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SlotBoard {
    player_slots: Vec<Slot>,
    npc_slots: Vec<Slot>,
    next_instance_id: u32,
}

impl SlotBoard {
    /// Create an empty board with `slots_per_side` slots on each side.
    pub fn new(slots_per_side: usize) -> Self {
        let make = |side: Side| {
            (0..slots_per_side)
                .map(|index| Slot {
                    index,
                    side,
                    occupant: None,
                })
                .collect()
        };
        Self {
            player_slots: make(Side::Player),
            npc_slots: make(Side::Npc),
            next_instance_id: 1,
        }
    }

    /// Slots of one side, in index order.
    pub fn slots(&self, side: Side) -> &[Slot] {
        match side {
            Side::Player => &self.player_slots,
            Side::Npc => &self.npc_slots,
        }
    }

    fn slots_mut(&mut self, side: Side) -> &mut [Slot] {
        match side {
            Side::Player => &mut self.player_slots,
            Side::Npc => &mut self.npc_slots,
        }
    }

    /// Occupied cards of one side, in slot order.
    pub fn cards(&self, side: Side) -> impl Iterator<Item = &CardInstance> {
        self.slots(side).iter().filter_map(|s| s.occupant.as_ref())
    }

    /// Place a card drawn from `definition` into a specific slot,
    /// destroying any previous occupant.
    pub fn place(
        &mut self,
        side: Side,
        index: usize,
        definition: &CardDefinition,
    ) -> CardInstanceId {
        let id = CardInstanceId(self.next_instance_id);
        self.next_instance_id += 1;
        let card = CardInstance::from_definition(id, definition, side);
        self.slots_mut(side)[index].occupant = Some(card);
        id
    }

    /// Draw cards for every slot on `side`, in index order.
    ///
    /// Stops early (logged, non-fatal) if the deck cannot supply enough
    /// cards; trailing slots stay empty and are excluded from scoring and
    /// selection. Returns the number of slots filled.
    pub fn populate(&mut self, side: Side, deck: &mut Deck, rng: &mut DeterministicRng) -> usize {
        let count = self.slots(side).len();
        for index in 0..count {
            match deck.draw(rng) {
                Ok(def) => {
                    self.place(side, index, &def);
                }
                Err(e) => {
                    warn!(%side, index, "Stopping populate early: {e}");
                    return index;
                }
            }
        }
        debug!(%side, count, "Populated side");
        count
    }

    /// Locate a card by instance id.
    pub fn find_card(&self, id: CardInstanceId) -> Option<&CardInstance> {
        self.player_slots
            .iter()
            .chain(self.npc_slots.iter())
            .filter_map(|s| s.occupant.as_ref())
            .find(|c| c.id == id)
    }

    fn find_slot_mut(&mut self, id: CardInstanceId) -> Option<&mut Slot> {
        self.player_slots
            .iter_mut()
            .chain(self.npc_slots.iter_mut())
            .find(|s| s.occupant.as_ref().is_some_and(|c| c.id == id))
    }

    fn position_of(&self, id: CardInstanceId) -> Option<(Side, usize)> {
        self.player_slots
            .iter()
            .chain(self.npc_slots.iter())
            .find(|s| s.occupant.is_some_and(|c| c.id == id))
            .map(|s| (s.side, s.index))
    }

    /// Mark a card as locked for the current negotiation phase.
    pub fn lock_card(&mut self, id: CardInstanceId) -> Result<(), BoardError> {
        let slot = self.find_slot_mut(id).ok_or(BoardError::CardNotFound(id))?;
        if let Some(card) = slot.occupant.as_mut() {
            card.locked = true;
        }
        Ok(())
    }

    /// Clear every lock flag. Called when the negotiation phase ends.
    pub fn clear_locks(&mut self) {
        for slot in self.player_slots.iter_mut().chain(self.npc_slots.iter_mut()) {
            if let Some(card) = slot.occupant.as_mut() {
                card.locked = false;
            }
        }
    }

    /// The unlocked card with the minimum value on `side`, ties broken by
    /// lowest slot index. `None` if every card is locked or absent.
    pub fn find_lowest_unlocked(&self, side: Side) -> Option<&CardInstance> {
        self.slots(side)
            .iter()
            .filter_map(|s| s.occupant.as_ref())
            .filter(|c| !c.locked)
            // Strict < keeps the earliest slot on ties
            .fold(None, |best: Option<&CardInstance>, card| match best {
                Some(b) if b.value <= card.value => Some(b),
                _ => Some(card),
            })
    }

    /// Up to `n` occupants of `side` sorted by descending value, ties
    /// broken by slot index ascending. Lock state is ignored here;
    /// callers filter when they need to.
    pub fn top_n_by_value(&self, side: Side, n: usize) -> Vec<CardInstance> {
        let mut cards: Vec<(usize, CardInstance)> = self
            .slots(side)
            .iter()
            .filter_map(|s| s.occupant.map(|c| (s.index, c)))
            .collect();
        cards.sort_by(|a, b| b.1.value.cmp(&a.1.value).then(a.0.cmp(&b.0)));
        cards.into_iter().take(n).map(|(_, c)| c).collect()
    }

    /// Destroy the lowest-value card on `side` (locked cards are eligible
    /// here, unlike swap) and put a card from `definition` in its slot.
    ///
    /// Returns `None` when the side has no cards at all.
    pub fn replace_lowest(
        &mut self,
        side: Side,
        definition: &CardDefinition,
    ) -> Option<ReplaceOutcome> {
        let target = self
            .slots(side)
            .iter()
            .filter_map(|s| s.occupant.as_ref().map(|c| (s.index, c.value)))
            .fold(None, |best: Option<(usize, u32)>, cur| match best {
                Some(b) if b.1 <= cur.1 => Some(b),
                _ => Some(cur),
            })?;

        let (index, old_value) = target;
        let new_card = self.place(side, index, definition);
        debug!(%side, index, old_value, new_value = definition.face_value, "Replaced lowest card");

        Some(ReplaceOutcome {
            old_value,
            new_value: definition.face_value,
            new_card,
        })
    }

    /// Exchange the slot occupancy of two cards from opposite sides.
    ///
    /// Fails without mutating anything if either card is locked, missing,
    /// or both belong to the same side.
    pub fn swap(&mut self, a: CardInstanceId, b: CardInstanceId) -> Result<(), BoardError> {
        let card_a = *self.find_card(a).ok_or(BoardError::CardNotFound(a))?;
        let card_b = *self.find_card(b).ok_or(BoardError::CardNotFound(b))?;

        if card_a.locked {
            return Err(BoardError::CardLocked(a));
        }
        if card_b.locked {
            return Err(BoardError::CardLocked(b));
        }
        if card_a.owner == card_b.owner {
            return Err(BoardError::SameSide);
        }

        // Both positions are resolved before either slot is written, so
        // the first write cannot redirect the second lookup
        let (side_a, index_a) = self.position_of(a).ok_or(BoardError::CardNotFound(a))?;
        let (side_b, index_b) = self.position_of(b).ok_or(BoardError::CardNotFound(b))?;

        // Each card moves to the other's slot and takes that slot's side
        let mut moved_a = card_a;
        let mut moved_b = card_b;
        moved_a.owner = side_b;
        moved_b.owner = side_a;

        self.slots_mut(side_a)[index_a].occupant = Some(moved_b);
        self.slots_mut(side_b)[index_b].occupant = Some(moved_a);

        debug!(
            a_value = card_a.value,
            b_value = card_b.value,
            "Swapped cards across the table"
        );
        Ok(())
    }
}

/// Board errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// No card with that id is on the board.
    #[error("Card {0:?} not found on the board")]
    CardNotFound(CardInstanceId),

    /// The card is locked for this negotiation phase.
    #[error("Card {0:?} is locked")]
    CardLocked(CardInstanceId),

    /// Both cards belong to the same side.
    #[error("Cannot swap two cards on the same side")]
    SameSide,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Board with fixed values per slot on each side.
    fn board_with(player: &[u32], npc: &[u32]) -> SlotBoard {
        let mut board = SlotBoard::new(player.len().max(npc.len()));
        for (i, &v) in player.iter().enumerate() {
            board.place(Side::Player, i, &CardDefinition::new(v, v, 1));
        }
        for (i, &v) in npc.iter().enumerate() {
            board.place(Side::Npc, i, &CardDefinition::new(v, v, 1));
        }
        board
    }

    fn id_of(board: &SlotBoard, side: Side, index: usize) -> CardInstanceId {
        board.slots(side)[index].occupant.unwrap().id
    }

    #[test]
    fn test_populate_fills_in_index_order() {
        let mut rng = DeterministicRng::new(1);
        let catalog = vec![CardDefinition::new(1, 4, 10)];
        let mut deck = Deck::new(catalog, &mut rng);
        let mut board = SlotBoard::new(3);

        let filled = board.populate(Side::Player, &mut deck, &mut rng);
        assert_eq!(filled, 3);
        assert_eq!(board.cards(Side::Player).count(), 3);
        assert!(board.cards(Side::Npc).next().is_none());
    }

    #[test]
    fn test_populate_stops_early_on_empty_catalog() {
        let mut rng = DeterministicRng::new(2);
        let mut deck = Deck::new(vec![], &mut rng);
        let mut board = SlotBoard::new(3);

        let filled = board.populate(Side::Player, &mut deck, &mut rng);
        assert_eq!(filled, 0);
        assert!(board.cards(Side::Player).next().is_none());
    }

    #[test]
    fn test_find_lowest_unlocked_ties_break_by_index() {
        let mut board = board_with(&[4, 2, 2], &[]);
        let lowest = board.find_lowest_unlocked(Side::Player).unwrap();
        assert_eq!(lowest.value, 2);
        assert_eq!(lowest.id, id_of(&board, Side::Player, 1));

        // Locking the winner moves the result to the next slot
        let id = lowest.id;
        board.lock_card(id).unwrap();
        let next = board.find_lowest_unlocked(Side::Player).unwrap();
        assert_eq!(next.id, id_of(&board, Side::Player, 2));
    }

    #[test]
    fn test_find_lowest_unlocked_none_when_all_locked() {
        let mut board = board_with(&[4, 2], &[]);
        for i in 0..2 {
            let id = id_of(&board, Side::Player, i);
            board.lock_card(id).unwrap();
        }
        assert!(board.find_lowest_unlocked(Side::Player).is_none());
    }

    #[test]
    fn test_top_n_by_value() {
        let board = board_with(&[3, 7, 7, 1], &[]);
        let top = board.top_n_by_value(Side::Player, 3);

        let values: Vec<u32> = top.iter().map(|c| c.value).collect();
        assert_eq!(values, vec![7, 7, 3]);
        // The tied 7s come out in slot order
        assert_eq!(top[0].id, id_of(&board, Side::Player, 1));
        assert_eq!(top[1].id, id_of(&board, Side::Player, 2));

        // n larger than the side returns everything
        assert_eq!(board.top_n_by_value(Side::Player, 10).len(), 4);
    }

    #[test]
    fn test_replace_lowest_targets_minimum() {
        let mut board = board_with(&[2, 4, 6], &[]);
        let outcome = board
            .replace_lowest(Side::Player, &CardDefinition::new(9, 9, 1))
            .unwrap();

        assert_eq!(outcome.old_value, 2);
        assert_eq!(outcome.new_value, 9);
        assert_eq!(outcome.delta(), 7);
        assert_eq!(board.slots(Side::Player)[0].occupant.unwrap().value, 9);
    }

    #[test]
    fn test_replace_lowest_includes_locked_cards() {
        let mut board = board_with(&[2, 4], &[]);
        let id = id_of(&board, Side::Player, 0);
        board.lock_card(id).unwrap();

        // Drawing always targets the true minimum, locked or not
        let outcome = board
            .replace_lowest(Side::Player, &CardDefinition::new(8, 8, 1))
            .unwrap();
        assert_eq!(outcome.old_value, 2);
    }

    #[test]
    fn test_replace_lowest_on_empty_side() {
        let mut board = SlotBoard::new(2);
        assert!(board
            .replace_lowest(Side::Player, &CardDefinition::new(1, 1, 1))
            .is_none());
    }

    #[test]
    fn test_swap_exchanges_slots_and_sides() {
        let mut board = board_with(&[2, 4], &[3, 5]);
        let a = id_of(&board, Side::Player, 0);
        let b = id_of(&board, Side::Npc, 1);

        board.swap(a, b).unwrap();

        let player_card = board.slots(Side::Player)[0].occupant.unwrap();
        let npc_card = board.slots(Side::Npc)[1].occupant.unwrap();
        assert_eq!(player_card.value, 5);
        assert_eq!(player_card.owner, Side::Player);
        assert_eq!(npc_card.value, 2);
        assert_eq!(npc_card.owner, Side::Npc);
    }

    #[test]
    fn test_swap_writes_both_slots() {
        // The player-side card names the first argument, the order used
        // by the negotiation resolution
        let mut board = board_with(&[2, 4], &[3, 5]);
        let a = id_of(&board, Side::Player, 0);
        let b = id_of(&board, Side::Npc, 0);

        board.swap(a, b).unwrap();

        assert_eq!(board.slots(Side::Player)[0].occupant.unwrap().id, b);
        assert_eq!(board.slots(Side::Npc)[0].occupant.unwrap().id, a);
        assert_eq!(board.slots(Side::Player)[0].occupant.unwrap().value, 3);
        assert_eq!(board.slots(Side::Npc)[0].occupant.unwrap().value, 2);

        // Every occupant's owner agrees with the slot it sits in
        for slot in board
            .slots(Side::Player)
            .iter()
            .chain(board.slots(Side::Npc).iter())
        {
            if let Some(card) = slot.occupant {
                assert_eq!(card.owner, slot.side);
            }
        }
    }

    #[test]
    fn test_swap_locked_fails_without_mutation() {
        let mut board = board_with(&[2], &[3]);
        let a = id_of(&board, Side::Player, 0);
        let b = id_of(&board, Side::Npc, 0);
        board.lock_card(b).unwrap();

        let err = board.swap(a, b).unwrap_err();
        assert_eq!(err, BoardError::CardLocked(b));
        assert_eq!(board.slots(Side::Player)[0].occupant.unwrap().value, 2);
        assert_eq!(board.slots(Side::Npc)[0].occupant.unwrap().value, 3);
    }

    #[test]
    fn test_swap_same_side_fails() {
        let board_setup = board_with(&[2, 4], &[]);
        let mut board = board_setup;
        let a = id_of(&board, Side::Player, 0);
        let b = id_of(&board, Side::Player, 1);
        assert_eq!(board.swap(a, b).unwrap_err(), BoardError::SameSide);
    }

    #[test]
    fn test_clear_locks() {
        let mut board = board_with(&[2], &[3]);
        let a = id_of(&board, Side::Player, 0);
        board.lock_card(a).unwrap();
        assert!(board.find_card(a).unwrap().locked);

        board.clear_locks();
        assert!(!board.find_card(a).unwrap().locked);
    }
}
