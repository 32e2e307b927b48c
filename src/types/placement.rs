//! Piece placement on an 8x8 board.

use super::convert::{piece_from_char, piece_to_char};
use chess::{Board, Color, File, Piece, Rank, Square, ALL_SQUARES};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A piece together with its owner
pub type PlacedPiece = (Piece, Color);

/// 8x8 grid of optional pieces, indexed `[rank][file]`, rank 0 = White's back rank.
///
/// Displays as the first field of a FEN string: ranks 8 down to 1, files a to h,
/// runs of empty squares collapsed to a digit.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    grid: [[Option<PlacedPiece>; 8]; 8],
}

/// Failure to read a FEN placement field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementParseError {
    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {rank} covers {files} files")]
    FileCount { rank: usize, files: usize },
    #[error("unexpected character '{0}'")]
    BadChar(char),
}

impl Placement {
    pub const fn empty() -> Self {
        Self { grid: [[None; 8]; 8] }
    }

    #[inline]
    pub fn get(&self, file: usize, rank: usize) -> Option<PlacedPiece> {
        self.grid[rank][file]
    }

    #[inline]
    pub fn set(&mut self, file: usize, rank: usize, piece: Option<PlacedPiece>) {
        self.grid[rank][file] = piece;
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<PlacedPiece> {
        self.get(sq.get_file().to_index(), sq.get_rank().to_index())
    }

    /// Read the placement of a rules-engine board
    pub fn from_board(board: &Board) -> Self {
        let mut placement = Self::empty();
        for sq in ALL_SQUARES {
            if let (Some(piece), Some(color)) = (board.piece_on(sq), board.color_on(sq)) {
                placement.set(sq.get_file().to_index(), sq.get_rank().to_index(), Some((piece, color)));
            }
        }
        placement
    }

    /// Iterate over occupied squares as `(square, piece, color)`
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece, Color)> + '_ {
        (0..8).flat_map(move |rank| {
            (0..8).filter_map(move |file| {
                self.grid[rank][file].map(|(piece, color)| {
                    (Square::make_square(Rank::from_index(rank), File::from_index(file)), piece, color)
                })
            })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.grid.iter().all(|rank| rank.iter().all(Option::is_none))
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.grid[rank][file] {
                    Some((piece, color)) => {
                        if empty > 0 {
                            write!(f, "{}", empty)?;
                            empty = 0;
                        }
                        write!(f, "{}", piece_to_char(piece, color))?;
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                write!(f, "{}", empty)?;
            }
            if rank > 0 {
                f.write_str("/")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Placement({})", self)
    }
}

impl FromStr for Placement {
    type Err = PlacementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ranks: Vec<&str> = s.split('/').collect();
        if ranks.len() != 8 {
            return Err(PlacementParseError::RankCount(ranks.len()));
        }

        let mut placement = Self::empty();
        for (i, text) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || skip > 8 {
                        return Err(PlacementParseError::BadChar(c));
                    }
                    file += skip as usize;
                } else {
                    let piece = piece_from_char(c).ok_or(PlacementParseError::BadChar(c))?;
                    if file < 8 {
                        placement.set(file, rank, Some(piece));
                    }
                    file += 1;
                }
                if file > 8 {
                    return Err(PlacementParseError::FileCount { rank: rank + 1, files: file });
                }
            }
            if file != 8 {
                return Err(PlacementParseError::FileCount { rank: rank + 1, files: file });
            }
        }
        Ok(placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    #[test]
    fn test_start_position_display() {
        let placement = Placement::from_board(&Board::default());
        assert_eq!(placement.to_string(), START);
    }

    #[test]
    fn test_parse_matches_board() {
        let parsed: Placement = START.parse().unwrap();
        assert_eq!(parsed, Placement::from_board(&Board::default()));
        assert_eq!(parsed.piece_on(Square::E1), Some((Piece::King, Color::White)));
        assert_eq!(parsed.piece_on(Square::D8), Some((Piece::Queen, Color::Black)));
        assert_eq!(parsed.piece_on(Square::E4), None);
    }

    #[test]
    fn test_empty_board() {
        let empty = Placement::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.to_string(), "8/8/8/8/8/8/8/8");
        assert_eq!("8/8/8/8/8/8/8/8".parse::<Placement>().unwrap(), empty);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("8/8/8".parse::<Placement>(), Err(PlacementParseError::RankCount(3)));
        assert!(matches!(
            "7/8/8/8/8/8/8/8".parse::<Placement>(),
            Err(PlacementParseError::FileCount { rank: 8, files: 7 })
        ));
        assert!(matches!(
            "ppppppppp/8/8/8/8/8/8/8".parse::<Placement>(),
            Err(PlacementParseError::FileCount { .. })
        ));
        assert_eq!("8/8/8/8/8/8/8/7x".parse::<Placement>(), Err(PlacementParseError::BadChar('x')));
    }

    #[test]
    fn test_pieces_iterator() {
        let placement: Placement = "4k3/8/8/8/8/8/8/4K3".parse().unwrap();
        let pieces: Vec<_> = placement.pieces().collect();
        assert_eq!(pieces, vec![
            (Square::E1, Piece::King, Color::White),
            (Square::E8, Piece::King, Color::Black),
        ]);
    }
}
