//! Board and move types shared by every stage of the mirror.
//!
//! Board, square and move types come straight from the `chess` crate so the
//! rules engine and the rest of the code agree on one representation. On top
//! of those sit the source board's raw encodings (`SquareCode`, two-letter
//! piece classes) and the mirror's own types (`Placement`, `Orientation`).

mod convert;
mod placement;

pub use convert::{piece_from_char, piece_from_class, piece_to_char, SquareCode};
pub use placement::{Placement, PlacementParseError, PlacedPiece};

pub use chess::{
    Board,
    ChessMove as Move,
    Square,
    Piece,
    Color,
    File,
    Rank,
    CastleRights,
    MoveGen,
    ALL_SQUARES,
};

/// Full-move counter, starts at 1 and increments after Black moves
pub type FullMove = u32;

/// Visual orientation of a board: which side is drawn at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    White,
    Black,
}

impl Orientation {
    /// The opposite orientation
    #[inline]
    pub const fn flipped(self) -> Self {
        match self {
            Orientation::White => Orientation::Black,
            Orientation::Black => Orientation::White,
        }
    }
}

/// Character used for a side in FEN (`w` / `b`)
#[inline]
pub const fn side_char(side: Color) -> char {
    match side {
        Color::White => 'w',
        Color::Black => 'b',
    }
}
