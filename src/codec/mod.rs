//! Position codec.
//!
//! Composes and decomposes the six-field FEN used on the wire between the
//! source and mirror contexts. The source never exposes castling rights,
//! en passant or the half-move clock, so those are always written as the
//! permissive defaults `KQkq - 0`.

use crate::error::MalformedPositionError;
use crate::types::{side_char, Board, CastleRights, Color, FullMove, Piece, Placement, Rank, Square};
use std::fmt;
use std::str::FromStr;

/// Castling field written on every composed position
pub const DEFAULT_CASTLING: &str = "KQkq";
/// En passant field written on every composed position
pub const DEFAULT_EN_PASSANT: &str = "-";

/// A decoded position record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRecord {
    pub placement: Placement,
    pub side_to_move: Color,
    pub castling: String,
    pub en_passant: String,
    pub halfmove: u32,
    pub fullmove: FullMove,
}

impl PositionRecord {
    /// A record with the permissive defaults for everything the source can't tell us
    pub fn new(placement: Placement, side_to_move: Color, fullmove: FullMove) -> Self {
        Self {
            placement,
            side_to_move,
            castling: DEFAULT_CASTLING.to_string(),
            en_passant: DEFAULT_EN_PASSANT.to_string(),
            halfmove: 0,
            fullmove: fullmove.max(1),
        }
    }

    /// Build a rules-engine board for this position.
    ///
    /// The castling field is narrowed to the rights the placement can still
    /// support (king and rook on their home squares); the rules engine refuses
    /// boards whose castling rights contradict the pieces. En passant is never
    /// passed on. Returns `None` when the engine rejects the position outright
    /// (missing kings, side not to move in check, ...).
    pub fn to_board(&self) -> Option<Board> {
        if !self.is_plausible() {
            return None;
        }
        let fen = format!(
            "{} {} {} - {} {}",
            self.placement,
            side_char(self.side_to_move),
            castling_field(self.supported_castling()),
            self.halfmove,
            self.fullmove,
        );
        Board::from_str(&fen).ok()
    }

    /// One king per side and no pawns on a back rank
    fn is_plausible(&self) -> bool {
        let mut kings = [0u8; 2];
        for (sq, piece, color) in self.placement.pieces() {
            match piece {
                Piece::King => kings[color.to_index()] += 1,
                Piece::Pawn if sq.get_rank() == Rank::First || sq.get_rank() == Rank::Eighth => return false,
                _ => {}
            }
        }
        kings == [1, 1]
    }

    /// Castling rights allowed by both the castling field and the placement
    fn supported_castling(&self) -> [CastleRights; 2] {
        [Color::White, Color::Black].map(|color| {
            let (king_side, queen_side) = match color {
                Color::White => ('K', 'Q'),
                Color::Black => ('k', 'q'),
            };
            let (home, king_rook, queen_rook) = match color {
                Color::White => (Square::E1, Square::H1, Square::A1),
                Color::Black => (Square::E8, Square::H8, Square::A8),
            };
            let has = |sq: Square, piece: Piece| self.placement.piece_on(sq) == Some((piece, color));

            if !has(home, Piece::King) {
                return CastleRights::NoRights;
            }
            let kingside = self.castling.contains(king_side) && has(king_rook, Piece::Rook);
            let queenside = self.castling.contains(queen_side) && has(queen_rook, Piece::Rook);
            match (kingside, queenside) {
                (true, true) => CastleRights::Both,
                (true, false) => CastleRights::KingSide,
                (false, true) => CastleRights::QueenSide,
                (false, false) => CastleRights::NoRights,
            }
        })
    }
}

impl fmt::Display for PositionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.placement,
            side_char(self.side_to_move),
            self.castling,
            self.en_passant,
            self.halfmove,
            self.fullmove
        )
    }
}

impl FromStr for PositionRecord {
    type Err = MalformedPositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decompose(s)
    }
}

fn castling_field([white, black]: [CastleRights; 2]) -> String {
    let mut s = String::new();
    if white.has_kingside() {
        s.push('K');
    }
    if white.has_queenside() {
        s.push('Q');
    }
    if black.has_kingside() {
        s.push('k');
    }
    if black.has_queenside() {
        s.push('q');
    }
    if s.is_empty() {
        s.push('-');
    }
    s
}

/// Compose the wire notation for a tracked position
pub fn compose(placement: &Placement, side_to_move: Color, fullmove: FullMove) -> String {
    PositionRecord::new(*placement, side_to_move, fullmove).to_string()
}

/// Decompose a position string.
///
/// Only placement and side to move are mandatory; any missing trailing field
/// takes its permissive default.
pub fn decompose(position: &str) -> Result<PositionRecord, MalformedPositionError> {
    let fields: Vec<&str> = position.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(MalformedPositionError::TooFewFields { found: fields.len() });
    }

    let placement: Placement = fields[0].parse()?;
    let side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(MalformedPositionError::SideToMove(other.to_string())),
    };

    let castling = fields.get(2).copied().unwrap_or(DEFAULT_CASTLING).to_string();
    let en_passant = fields.get(3).copied().unwrap_or(DEFAULT_EN_PASSANT).to_string();
    // The half-move clock isn't tracked, a garbled value is not worth failing over
    let halfmove = fields.get(4).and_then(|h| h.parse().ok()).unwrap_or(0);
    let fullmove = match fields.get(5) {
        Some(text) => match text.parse::<FullMove>() {
            Ok(n) if n >= 1 => n,
            _ => return Err(MalformedPositionError::FullMove(text.to_string())),
        },
        None => 1,
    };

    Ok(PositionRecord { placement, side_to_move, castling, en_passant, halfmove, fullmove })
}
