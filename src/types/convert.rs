//! Conversions between the source board's raw encodings and `chess` crate types.
//!
//! The source surface labels squares with a two-digit code (`square-52` is e2)
//! and pieces with a two-letter class (`wp`, `bk`, ...). FEN uses single
//! letters, upper case for White.

use chess::{Color, File, Piece, Rank, Square};
use std::fmt;

/// A source square code: tens digit is file+1, units digit is rank+1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SquareCode(pub u8);

impl SquareCode {
    /// Decode to (file, rank), both 0-based. `None` if either digit is out of 1..=8.
    #[inline]
    pub fn file_rank(self) -> Option<(usize, usize)> {
        let file = (self.0 / 10) as usize;
        let rank = (self.0 % 10) as usize;
        if (1..=8).contains(&file) && (1..=8).contains(&rank) {
            Some((file - 1, rank - 1))
        } else {
            None
        }
    }

    #[inline]
    pub fn to_square(self) -> Option<Square> {
        let (file, rank) = self.file_rank()?;
        Some(Square::make_square(Rank::from_index(rank), File::from_index(file)))
    }

    #[inline]
    pub fn from_square(sq: Square) -> Self {
        let file = sq.get_file().to_index() as u8;
        let rank = sq.get_rank().to_index() as u8;
        SquareCode((file + 1) * 10 + rank + 1)
    }

    /// Parse either a bare code (`"52"`) or a class token (`"square-52"`).
    pub fn parse(token: &str) -> Option<Self> {
        let digits = token.strip_prefix("square-").unwrap_or(token);
        if digits.len() != 2 {
            return None;
        }
        digits.parse::<u8>().ok().map(SquareCode)
    }
}

impl fmt::Display for SquareCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Decode a two-letter source piece class (`wp`, `bq`, ...).
#[inline]
pub fn piece_from_class(class: &str) -> Option<(Piece, Color)> {
    let mut chars = class.chars();
    let color = match chars.next()? {
        'w' => Color::White,
        'b' => Color::Black,
        _ => return None,
    };
    let piece = match chars.next()? {
        'p' => Piece::Pawn,
        'n' => Piece::Knight,
        'b' => Piece::Bishop,
        'r' => Piece::Rook,
        'q' => Piece::Queen,
        'k' => Piece::King,
        _ => return None,
    };
    if chars.next().is_some() {
        return None;
    }
    Some((piece, color))
}

/// FEN letter for a piece, upper case for White
#[inline]
pub const fn piece_to_char(piece: Piece, color: Color) -> char {
    let c = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    match color {
        Color::White => c.to_ascii_uppercase(),
        Color::Black => c,
    }
}

#[inline]
pub fn piece_from_char(c: char) -> Option<(Piece, Color)> {
    let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
    let piece = match c.to_ascii_lowercase() {
        'p' => Piece::Pawn,
        'n' => Piece::Knight,
        'b' => Piece::Bishop,
        'r' => Piece::Rook,
        'q' => Piece::Queen,
        'k' => Piece::King,
        _ => return None,
    };
    Some((piece, color))
}
