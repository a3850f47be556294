//! Turn Scheduler
//!
//! The top-level state machine. A single async task owns all match state
//! and drives the per-level turn/phase table; player intents are consumed
//! only at suspension points, and everything the UI needs to render
//! leaves as events. No component other than this one advances the turn
//! counter.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::core::rng::DeterministicRng;
use crate::game::card::Side;
use crate::game::config::{ConfigError, GameConfig, Phase, MAX_LEVEL, MIN_LEVEL};
use crate::game::events::{EventSender, GameEvent};
use crate::game::intent::PlayerIntent;
use crate::game::negotiation;
use crate::game::npc;
use crate::game::score::ScoreBoard;
use crate::game::state::{MatchError, MatchState};

/// Value the hint turn compares the NPC's last draw against.
const HINT_THRESHOLD: u32 = 5;

/// Capacity of the intent channel created by [`spawn_match`].
const INTENT_CHANNEL_CAPACITY: usize = 16;

/// The match state machine.
pub struct TurnScheduler {
    config: GameConfig,
    match_id: [u8; 16],
    state: MatchState,
    intents: mpsc::Receiver<PlayerIntent>,
    events: EventSender,
}

impl TurnScheduler {
    /// Create a scheduler for a fresh match with a random match id.
    pub fn new(
        config: GameConfig,
        intents: mpsc::Receiver<PlayerIntent>,
        events: EventSender,
    ) -> Result<Self, ConfigError> {
        let match_id = *uuid::Uuid::new_v4().as_bytes();
        Self::with_match_id(config, match_id, intents, events)
    }

    /// Create a scheduler with a fixed match id.
    ///
    /// The RNG seed derives from the match id and the catalog, so a fixed
    /// id replays the exact same match.
    pub fn with_match_id(
        config: GameConfig,
        match_id: [u8; 16],
        intents: mpsc::Receiver<PlayerIntent>,
        events: EventSender,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = DeterministicRng::from_match_params(&match_id, &config.catalog_digest());
        let level = config.level_config(MIN_LEVEL)?;
        let state = MatchState::start_level(level, &config.catalog, rng);

        Ok(Self {
            config,
            match_id,
            state,
            intents,
            events,
        })
    }

    /// Match identifier.
    pub fn match_id(&self) -> &[u8; 16] {
        &self.match_id
    }

    /// Drive the match to completion. Returns the final scores.
    pub async fn run(mut self) -> Result<ScoreBoard, MatchError> {
        info!(match_id = %hex::encode(self.match_id), "Match started");
        self.events.emit(GameEvent::board_update(&self.state.board));
        self.events.emit(GameEvent::score_update(&self.state.scores));

        loop {
            while let Some(phase) = self.state.level.phase_for(self.state.current_turn) {
                self.state.phase = Some(phase);
                self.events
                    .emit(GameEvent::phase_changed(self.state.current_turn, phase));
                info!(
                    level = self.state.level.level,
                    turn = self.state.current_turn,
                    %phase,
                    "Turn started"
                );

                match phase {
                    Phase::DrawOrPass => self.player_then_npc_turn().await?,
                    Phase::DrawWithHint => {
                        self.emit_hint();
                        self.player_then_npc_turn().await?;
                    }
                    Phase::FinalTurn => {
                        self.events.emit(GameEvent::notification("Final Turn!"));
                        self.player_then_npc_turn().await?;
                    }
                    Phase::SwapAndLock => {
                        negotiation::run(&mut self.state, &mut self.intents, &self.events)
                            .await?;
                        // Locks are scoped to the negotiation phase
                        self.state.board.clear_locks();
                        self.state.locked_card = None;
                        self.state.swap_target = None;
                        self.events.emit(GameEvent::board_update(&self.state.board));
                    }
                    Phase::ScoreReveal => self.reveal_scores(),
                }

                self.state.phase = None;
                self.state.current_turn += 1;
            }

            if !self.end_level()? {
                return Ok(self.state.scores);
            }
        }
    }

    /// The turn index walked past the level's turn count: close the level
    /// and open the next one. Returns false when the match is over.
    fn end_level(&mut self) -> Result<bool, MatchError> {
        let completed = self.state.level.level;
        self.state.is_level_complete = true;
        info!(level = completed, "Level complete");
        self.events.emit(GameEvent::notification("Level Complete!"));
        self.events.emit(GameEvent::level_complete(completed));

        if completed >= MAX_LEVEL {
            info!(
                player_score = self.state.scores.player,
                npc_score = self.state.scores.npc,
                "Match complete"
            );
            self.events.emit(GameEvent::match_complete(&self.state.scores));
            return Ok(false);
        }

        let next = self.config.level_config(completed + 1)?;
        self.state.advance_to(next, &self.config.catalog);
        self.events.emit(GameEvent::board_update(&self.state.board));
        self.events.emit(GameEvent::score_update(&self.state.scores));
        Ok(true)
    }

    /// One ordinary turn: the player's draw-or-pass move, then the NPC's.
    async fn player_then_npc_turn(&mut self) -> Result<(), MatchError> {
        let drew = self.await_draw_or_pass().await?;
        if drew {
            let def = self.state.deck.draw(&mut self.state.rng)?;
            match self.state.board.replace_lowest(Side::Player, &def) {
                Some(_) => {
                    info!(value = def.face_value, "Player drew a card");
                    self.events.emit(GameEvent::notification("Player drew a card."));
                }
                None => {
                    warn!(value = def.face_value, "Drawn card discarded, player side is empty");
                }
            }
        } else {
            info!("Player passed the turn");
            self.events.emit(GameEvent::notification("Player passed the turn."));
        }
        self.state.recompute_scores();
        self.events.emit(GameEvent::score_update(&self.state.scores));
        self.events.emit(GameEvent::board_update(&self.state.board));

        npc::take_turn(&mut self.state, &self.config.npc, &self.events).await?;
        self.events.emit(GameEvent::board_update(&self.state.board));
        Ok(())
    }

    /// Suspend until the player chooses to draw (true) or pass (false).
    async fn await_draw_or_pass(&mut self) -> Result<bool, MatchError> {
        loop {
            let intent = self.intents.recv().await.ok_or(MatchError::InputClosed)?;
            match intent {
                PlayerIntent::Draw => return Ok(true),
                PlayerIntent::Pass => return Ok(false),
                other => {
                    warn!(kind = other.kind(), "Ignoring intent outside its phase");
                    self.events
                        .emit(GameEvent::notification("Draw or pass this turn."));
                }
            }
        }
    }

    /// Reveal a coarse comparison of the NPC's most recent draw against
    /// the hint threshold. Silent if the NPC has no recorded draw.
    fn emit_hint(&self) {
        if let Some(last) = self.state.npc_last_draw {
            let hint = if last.face_value > HINT_THRESHOLD {
                "5 > x"
            } else {
                "5 < x"
            };
            self.events
                .emit(GameEvent::notification(format!("NPC's card is {hint}")));
        }
    }

    /// Level 3 score-reveal turn: announce the gap and the leader, no
    /// input required.
    fn reveal_scores(&self) {
        let message = match self.state.scores.leader() {
            Some(side) => format!("Score gap: {}. {side} leads.", self.state.scores.gap()),
            None => "Scores are tied.".to_string(),
        };
        info!(%message, "Score reveal");
        self.events.emit(GameEvent::notification(message));
    }
}

/// Handle to a match running in a spawned task.
pub struct MatchHandle {
    /// Send player intents here.
    pub intents: mpsc::Sender<PlayerIntent>,
    /// Receive engine events here.
    pub events: mpsc::UnboundedReceiver<GameEvent>,
    /// The running scheduler task.
    pub task: tokio::task::JoinHandle<Result<ScoreBoard, MatchError>>,
}

/// Spawn a match on the current runtime and hand back its channels.
pub fn spawn_match(config: GameConfig) -> Result<MatchHandle, ConfigError> {
    let (intent_tx, intent_rx) = mpsc::channel(INTENT_CHANNEL_CAPACITY);
    let (event_tx, event_rx) = EventSender::channel();
    let scheduler = TurnScheduler::new(config, intent_rx, event_tx)?;
    let task = tokio::spawn(scheduler.run());

    Ok(MatchHandle {
        intents: intent_tx,
        events: event_rx,
        task,
    })
}
