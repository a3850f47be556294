//! Match Configuration
//!
//! The card catalog, per-level slot counts, the fixed turn/phase table,
//! and NPC tuning. Configuration is validated up front; an invalid level
//! index or an empty catalog is a fatal configuration error, never a
//! runtime one.

use std::time::Duration;

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

use crate::game::card::CardDefinition;

/// Lowest playable level.
pub const MIN_LEVEL: u8 = 1;
/// Highest playable level.
pub const MAX_LEVEL: u8 = 3;

/// The kind of turn the scheduler runs at a given turn index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Player chooses to draw a replacement card or pass.
    DrawOrPass,
    /// The swap-and-lock negotiation sub-protocol.
    SwapAndLock,
    /// Draw-or-pass preceded by a hint about the NPC's last draw.
    DrawWithHint,
    /// Level 3 only: the score gap is announced, no input required.
    ScoreReveal,
    /// Last turn of the level; plays like draw-or-pass.
    FinalTurn,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::DrawOrPass => write!(f, "Draw or Pass"),
            Phase::SwapAndLock => write!(f, "Swap & Lock"),
            Phase::DrawWithHint => write!(f, "Draw with Hint"),
            Phase::ScoreReveal => write!(f, "Score Reveal"),
            Phase::FinalTurn => write!(f, "Final Turn"),
        }
    }
}

/// Resolved configuration for one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Level index, 1 to 3.
    pub level: u8,
    /// Slots on each side of the table.
    pub slots_per_side: usize,
    /// Turns in this level (7, 8 or 10).
    pub turn_count: u32,
}

impl LevelConfig {
    /// Turn count fixed by the level table.
    pub fn standard_turn_count(level: u8) -> Option<u32> {
        match level {
            1 => Some(7),
            2 => Some(8),
            3 => Some(10),
            _ => None,
        }
    }

    /// Phase bound to a turn index of this level.
    ///
    /// Returns `None` once the turn index is past `turn_count`; the
    /// scheduler treats that as the level-complete transition.
    pub fn phase_for(&self, turn: u32) -> Option<Phase> {
        if turn == 0 || turn > self.turn_count {
            return None;
        }
        let phase = match (self.level, turn) {
            (_, 1..=3) => Phase::DrawOrPass,
            (_, 4) => Phase::SwapAndLock,
            (_, 5..=6) => Phase::DrawOrPass,
            (1, 7) => Phase::FinalTurn,
            (2, 7) => Phase::DrawWithHint,
            (2, 8) => Phase::FinalTurn,
            (3, 7) => Phase::DrawWithHint,
            (3, 8) => Phase::DrawOrPass,
            (3, 9) => Phase::ScoreReveal,
            (3, 10) => Phase::FinalTurn,
            _ => return None,
        };
        Some(phase)
    }
}

/// NPC tuning knobs.
///
/// The score threshold and the thinking delay are deliberately
/// configuration, not literals; the delay paces presentation and must not
/// change any decision.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NpcConfig {
    /// NPC draws while its score is below this, regardless of the player.
    pub score_threshold: u32,
    /// Simulated thinking time before the draw-or-pass decision.
    pub think_delay_ms: u64,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            score_threshold: 15,
            think_delay_ms: 2000,
        }
    }
}

impl NpcConfig {
    /// Thinking delay as a [`Duration`].
    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }
}

/// Full match configuration, consumed from external JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Card definition catalog.
    pub catalog: Vec<CardDefinition>,
    /// Slots per side for levels 1..=3, in order.
    pub slots_per_side: Vec<usize>,
    /// NPC tuning.
    #[serde(default)]
    pub npc: NpcConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        // Values 1..=10, three copies each, as in the stock deck
        let catalog = (1..=10)
            .map(|v| CardDefinition::new(v, v, 3))
            .collect();

        Self {
            catalog,
            slots_per_side: vec![3, 4, 5],
            npc: NpcConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Validate catalog and level table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        for def in &self.catalog {
            if def.copies_per_deck == 0 {
                return Err(ConfigError::ZeroCopies { id: def.id.0 });
            }
        }
        if self.slots_per_side.len() != MAX_LEVEL as usize {
            return Err(ConfigError::LevelTableSize {
                expected: MAX_LEVEL as usize,
                found: self.slots_per_side.len(),
            });
        }
        for (i, &slots) in self.slots_per_side.iter().enumerate() {
            if slots == 0 {
                return Err(ConfigError::NoSlots { level: i as u8 + 1 });
            }
        }
        Ok(())
    }

    /// Resolve the configuration for one level.
    pub fn level_config(&self, level: u8) -> Result<LevelConfig, ConfigError> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            return Err(ConfigError::InvalidLevel { level });
        }
        let turn_count = LevelConfig::standard_turn_count(level)
            .ok_or(ConfigError::InvalidLevel { level })?;
        Ok(LevelConfig {
            level,
            slots_per_side: self.slots_per_side[level as usize - 1],
            turn_count,
        })
    }

    /// SHA-256 digest of the catalog, used for seed derivation.
    pub fn catalog_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"TAVERN_DUEL_CATALOG_V1");
        for def in &self.catalog {
            hasher.update(def.id.0.to_le_bytes());
            hasher.update(def.face_value.to_le_bytes());
            hasher.update(def.copies_per_deck.to_le_bytes());
        }
        hasher.finalize().into()
    }
}

/// Configuration errors. All of these are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The card catalog is empty.
    #[error("Card catalog is empty")]
    EmptyCatalog,

    /// A catalog entry contributes no cards to the deck.
    #[error("Card definition {id} has copies_per_deck = 0")]
    ZeroCopies {
        /// Offending definition id.
        id: u32,
    },

    /// Level index outside 1..=3.
    #[error("Invalid level index {level} (valid: 1..=3)")]
    InvalidLevel {
        /// Requested level.
        level: u8,
    },

    /// Slot table does not cover every level.
    #[error("slots_per_side must list {expected} levels, found {found}")]
    LevelTableSize {
        /// Required entry count.
        expected: usize,
        /// Provided entry count.
        found: usize,
    },

    /// A level has no slots.
    #[error("Level {level} has slots_per_side = 0")]
    NoSlots {
        /// Offending level.
        level: u8,
    },

    /// Config file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.catalog.len(), 10);
    }

    #[test]
    fn test_turn_counts() {
        assert_eq!(LevelConfig::standard_turn_count(1), Some(7));
        assert_eq!(LevelConfig::standard_turn_count(2), Some(8));
        assert_eq!(LevelConfig::standard_turn_count(3), Some(10));
        assert_eq!(LevelConfig::standard_turn_count(4), None);
    }

    #[test]
    fn test_phase_table_level_1() {
        let level = GameConfig::default().level_config(1).unwrap();
        assert_eq!(level.phase_for(1), Some(Phase::DrawOrPass));
        assert_eq!(level.phase_for(3), Some(Phase::DrawOrPass));
        assert_eq!(level.phase_for(4), Some(Phase::SwapAndLock));
        assert_eq!(level.phase_for(5), Some(Phase::DrawOrPass));
        assert_eq!(level.phase_for(6), Some(Phase::DrawOrPass));
        assert_eq!(level.phase_for(7), Some(Phase::FinalTurn));
        assert_eq!(level.phase_for(8), None);
        assert_eq!(level.phase_for(0), None);
    }

    #[test]
    fn test_phase_table_level_2() {
        let level = GameConfig::default().level_config(2).unwrap();
        assert_eq!(level.phase_for(4), Some(Phase::SwapAndLock));
        assert_eq!(level.phase_for(7), Some(Phase::DrawWithHint));
        assert_eq!(level.phase_for(8), Some(Phase::FinalTurn));
        assert_eq!(level.phase_for(9), None);
    }

    #[test]
    fn test_phase_table_level_3() {
        let level = GameConfig::default().level_config(3).unwrap();
        assert_eq!(level.phase_for(7), Some(Phase::DrawWithHint));
        assert_eq!(level.phase_for(8), Some(Phase::DrawOrPass));
        assert_eq!(level.phase_for(9), Some(Phase::ScoreReveal));
        assert_eq!(level.phase_for(10), Some(Phase::FinalTurn));
        assert_eq!(level.phase_for(11), None);
    }

    #[test]
    fn test_invalid_level_rejected() {
        let config = GameConfig::default();
        assert!(matches!(
            config.level_config(0),
            Err(ConfigError::InvalidLevel { level: 0 })
        ));
        assert!(matches!(
            config.level_config(4),
            Err(ConfigError::InvalidLevel { level: 4 })
        ));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let config = GameConfig {
            catalog: vec![],
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyCatalog)));
    }

    #[test]
    fn test_zero_copies_rejected() {
        let config = GameConfig {
            catalog: vec![CardDefinition::new(1, 5, 0)],
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroCopies { id: 1 })
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let json = r#"{
            "catalog": [
                { "id": 1, "face_value": 1, "copies_per_deck": 3 }
            ],
            "slots_per_side": [3, 4, 5]
        }"#;
        let config = GameConfig::from_json_str(json).unwrap();
        assert_eq!(config.catalog.len(), 1);
        assert_eq!(config.npc.score_threshold, 15);
    }

    #[test]
    fn test_catalog_digest_changes_with_catalog() {
        let a = GameConfig::default();
        let mut b = GameConfig::default();
        b.catalog[0].face_value += 1;
        assert_ne!(a.catalog_digest(), b.catalog_digest());
    }
}
