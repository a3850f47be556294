//! Card Model
//!
//! Definitions are immutable catalog entries; instances are the live
//! cards sitting in board slots. An instance is owned by exactly one slot
//! and is destroyed when replaced.

use serde::{Serialize, Deserialize};

/// Identifier of a card definition in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardDefinitionId(pub u32);

/// Identifier of a live card instance on the board.
///
/// Allocated from a per-match counter; external selection intents name
/// cards by this id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardInstanceId(pub u32);

/// Which side of the table a slot or card belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The human player.
    Player,
    /// The scripted opponent.
    Npc,
}

impl Side {
    /// The other side of the table.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Npc,
            Side::Npc => Side::Player,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Player => write!(f, "Player"),
            Side::Npc => write!(f, "NPC"),
        }
    }
}

/// Immutable catalog entry describing one kind of card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Catalog identifier.
    pub id: CardDefinitionId,
    /// Face value counted toward a side's score.
    pub face_value: u32,
    /// How many copies of this card a fresh deck contains.
    pub copies_per_deck: u32,
}

impl CardDefinition {
    /// Create a new definition.
    pub const fn new(id: u32, face_value: u32, copies_per_deck: u32) -> Self {
        Self {
            id: CardDefinitionId(id),
            face_value,
            copies_per_deck,
        }
    }
}

/// A live card occupying a board slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique instance identifier.
    pub id: CardInstanceId,
    /// The definition this card was drawn from.
    pub definition_id: CardDefinitionId,
    /// Face value, copied from the definition at draw time.
    pub value: u32,
    /// Side that currently holds the card.
    pub owner: Side,
    /// Locked cards are ineligible for swapping during the negotiation
    /// phase.
    pub locked: bool,
}

impl CardInstance {
    /// Materialize a drawn definition as a card on `owner`'s side.
    pub fn from_definition(id: CardInstanceId, definition: &CardDefinition, owner: Side) -> Self {
        Self {
            id,
            definition_id: definition.id,
            value: definition.face_value,
            owner,
            locked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Side::Player.opponent(), Side::Npc);
        assert_eq!(Side::Npc.opponent(), Side::Player);
    }

    #[test]
    fn test_instance_copies_value() {
        let def = CardDefinition::new(3, 7, 2);
        let card = CardInstance::from_definition(CardInstanceId(1), &def, Side::Player);

        assert_eq!(card.definition_id, CardDefinitionId(3));
        assert_eq!(card.value, 7);
        assert_eq!(card.owner, Side::Player);
        assert!(!card.locked);
    }
}
