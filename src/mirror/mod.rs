//! Mirror replay.
//!
//! Drives the mirror board from received messages: a move is replayed as a
//! pointer drag between square centres, a position is typed into the board's
//! position input. The mirror's orientation is held at a preferred side and
//! corrected after every action, whatever the action did to it.

use crate::codec::decompose;
use crate::config::MirrorConfig;
use crate::error::{MirrorError, MirrorResult};
use crate::infer::InferredMove;
use crate::transport::MirrorMessage;
use crate::types::{Orientation, Square};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

/// Screen placement of the mirror board
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    pub left: f64,
    pub top: f64,
    /// Width (and height) of the whole board
    pub size: f64,
}

impl BoardGeometry {
    #[inline]
    pub fn square_size(&self) -> f64 {
        self.size / 8.0
    }

    /// Centre of a square as drawn with the given orientation
    pub fn square_center(&self, sq: Square, orientation: Orientation) -> (f64, f64) {
        let file = sq.get_file().to_index() as f64;
        let rank = sq.get_rank().to_index() as f64;
        let (col, row) = match orientation {
            Orientation::White => (file, 7.0 - rank),
            Orientation::Black => (7.0 - file, rank),
        };
        let s = self.square_size();
        (self.left + col * s + s / 2.0, self.top + row * s + s / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
}

/// The mirror board as seen by the replay adapter
pub trait MirrorSurface {
    /// Board geometry, `None` when no board is on the page
    fn geometry(&self) -> Option<BoardGeometry>;
    fn orientation(&self) -> Orientation;
    fn flip(&mut self);
    fn dispatch(&mut self, event: PointerEvent);
    /// Put text into the position input
    fn set_position_input(&mut self, text: &str) -> MirrorResult<()>;
    /// Apply what was typed into the position input
    fn commit_position_input(&mut self) -> MirrorResult<()>;
}

/// Pointer drag that moves a piece between two squares
pub fn drag_sequence(geometry: &BoardGeometry, orientation: Orientation, m: &InferredMove) -> [PointerEvent; 3] {
    let (x1, y1) = geometry.square_center(m.from, orientation);
    let (x2, y2) = geometry.square_center(m.to, orientation);
    [
        PointerEvent { kind: PointerKind::Down, x: x1, y: y1 },
        PointerEvent { kind: PointerKind::Move, x: x2, y: y2 },
        PointerEvent { kind: PointerKind::Up, x: x2, y: y2 },
    ]
}

/// Replays messages onto a mirror surface
pub struct MirrorReplay<S: MirrorSurface> {
    surface: S,
    preference: Orientation,
}

impl<S: MirrorSurface> MirrorReplay<S> {
    /// Adopt whatever orientation the mirror currently shows
    pub fn new(surface: S) -> Self {
        let preference = surface.orientation();
        Self { surface, preference }
    }

    pub fn with_orientation(surface: S, preference: Orientation) -> Self {
        let mut replay = Self { surface, preference };
        replay.restore_orientation();
        replay
    }

    /// Hold the configured orientation, or the mirror's own when none is set
    pub fn from_config(surface: S, config: &MirrorConfig) -> Self {
        match config.start_orientation {
            Some(orientation) => Self::with_orientation(surface, orientation),
            None => Self::new(surface),
        }
    }

    pub fn preference(&self) -> Orientation {
        self.preference
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// A human changed the orientation on the mirror; hold that one from now on
    pub fn override_orientation(&mut self, orientation: Orientation) {
        info!(?orientation, "orientation preference changed");
        self.preference = orientation;
        self.restore_orientation();
    }

    pub fn apply(&mut self, msg: &MirrorMessage) -> MirrorResult<()> {
        match msg {
            MirrorMessage::Move { mv } => {
                let m = InferredMove::parse(mv).ok_or_else(|| MirrorError::BadMove(mv.clone()))?;
                self.replay_move(&m)
            }
            MirrorMessage::Position { position } => self.set_position(position),
        }
    }

    pub fn replay_move(&mut self, m: &InferredMove) -> MirrorResult<()> {
        self.adopt_override();
        let result = self.drag(m);
        self.restore_orientation();
        result
    }

    fn drag(&mut self, m: &InferredMove) -> MirrorResult<()> {
        let geometry = self.surface.geometry().ok_or(MirrorError::BoardMissing)?;
        let orientation = self.surface.orientation();
        debug!(mv = %m, ?orientation, "replaying move");
        if let Some(piece) = m.promotion {
            debug!(?piece, "drag can't choose a promotion piece, the next position settles it");
        }
        for event in drag_sequence(&geometry, orientation, m) {
            self.surface.dispatch(event);
        }
        Ok(())
    }

    pub fn set_position(&mut self, position: &str) -> MirrorResult<()> {
        self.adopt_override();
        let result = self.enter_position(position);
        self.restore_orientation();
        result
    }

    fn enter_position(&mut self, position: &str) -> MirrorResult<()> {
        decompose(position)?;
        self.surface.set_position_input(position)?;
        self.surface.commit_position_input()?;
        debug!(position, "position set");
        Ok(())
    }

    /// Orientation is restored after every action, so a mismatch seen before
    /// the next one was made by a human on the mirror
    fn adopt_override(&mut self) {
        let shown = self.surface.orientation();
        if shown != self.preference {
            info!(orientation = ?shown, "orientation changed on the mirror, holding it");
            self.preference = shown;
        }
    }

    fn restore_orientation(&mut self) {
        if self.surface.orientation() != self.preference {
            debug!(preference = ?self.preference, "orientation drifted, flipping back");
            self.surface.flip();
        }
    }

    /// Apply messages until the channel closes
    pub async fn serve(mut self, mut messages: UnboundedReceiver<MirrorMessage>) -> Self {
        while let Some(msg) = messages.recv().await {
            if let Err(e) = self.apply(&msg) {
                warn!(?msg, "mirror replay failed: {}", e);
            }
        }
        self
    }
}
