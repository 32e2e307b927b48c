//! Game state tracking.
//!
//! The tracker is the single owner of the logical game: current placement,
//! side to move, full-move number and the placement last sent to the mirror.
//! Only confirmed inferences move the side and counter forward; every observed
//! change moves the placement forward, explained or not, so one bad frame can't
//! wedge the pipeline.

mod turn;

pub use turn::{PlayerToMoveAttribute, PreviousPositionParity, TurnDetector, TurnHints, TurnStrategy, TurnText};

use crate::codec::PositionRecord;
use crate::infer::{advance, infer, InferredMove};
use crate::types::{Color, FullMove, Placement};
use tracing::{debug, info, warn};

/// Logical game state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub placement: Placement,
    pub side_to_move: Color,
    pub fullmove: FullMove,
}

impl GameState {
    pub fn position(&self) -> PositionRecord {
        PositionRecord::new(self.placement, self.side_to_move, self.fullmove)
    }
}

/// Result of one observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Whether the observed placement differed from the tracked one
    pub changed: bool,
    /// The move that explains the change, if one was found
    pub inferred: Option<InferredMove>,
    /// Tracked position after the observation
    pub position: PositionRecord,
}

/// Owner of the logical game state
pub struct GameTracker {
    state: Option<GameState>,
    /// Placement of the last position handed out by `take_notification`
    last_notified: Option<Placement>,
    /// Side to move of the last notified position, kept across resets
    last_notified_side: Option<Color>,
    turn: TurnDetector,
}

impl Default for GameTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTracker {
    pub fn new() -> Self {
        Self::with_detector(TurnDetector::default())
    }

    pub fn with_detector(turn: TurnDetector) -> Self {
        Self {
            state: None,
            last_notified: None,
            last_notified_side: None,
            turn,
        }
    }

    /// Whether a first placement has been accepted
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn current_placement(&self) -> Option<&Placement> {
        self.state.as_ref().map(|s| &s.placement)
    }

    pub fn current_position(&self) -> Option<PositionRecord> {
        self.state.as_ref().map(GameState::position)
    }

    /// Forget the game, e.g. when the source board was torn down.
    ///
    /// The side of the last notified position survives so the next game can
    /// fall back on it when seeding the turn.
    pub fn reset(&mut self) {
        info!("tracker reset");
        self.state = None;
        self.last_notified = None;
    }

    /// Feed a newly settled placement
    pub fn observe(&mut self, placement: Placement, hints: &TurnHints) -> Observation {
        let Some(state) = self.state.as_mut() else {
            return self.initialize(placement, hints);
        };

        if state.placement == placement {
            return Observation { changed: false, inferred: None, position: state.position() };
        }

        let inferred = infer(&state.placement, state.side_to_move, state.fullmove, &placement);
        match inferred {
            Some(m) => {
                let (side, fullmove) = advance(state.side_to_move, state.fullmove);
                info!(mv = %m, side = ?side, fullmove, "move detected");
                state.side_to_move = side;
                state.fullmove = fullmove;
            }
            None => {
                warn!(
                    from = %state.placement,
                    to = %placement,
                    side = ?state.side_to_move,
                    "no legal move explains the new placement"
                );
            }
        }
        state.placement = placement;

        Observation { changed: true, inferred, position: state.position() }
    }

    fn initialize(&mut self, placement: Placement, hints: &TurnHints) -> Observation {
        let mut hints = hints.clone();
        if hints.previous_side.is_none() {
            hints.previous_side = self.last_notified_side;
        }
        let (side_to_move, by) = self.turn.detect(&hints);
        info!(placement = %placement, side = ?side_to_move, strategy = by, "tracking new game");

        let state = GameState { placement, side_to_move, fullmove: 1 };
        let position = state.position();
        self.state = Some(state);
        Observation { changed: true, inferred: None, position }
    }

    /// The current position, if it hasn't been handed out yet
    pub fn take_notification(&mut self) -> Option<PositionRecord> {
        let state = self.state.as_ref()?;
        if self.last_notified.as_ref() == Some(&state.placement) {
            debug!("position already notified");
            return None;
        }
        self.last_notified = Some(state.placement);
        self.last_notified_side = Some(state.side_to_move);
        Some(state.position())
    }
}
