//! Move inference.
//!
//! The source only shows where pieces stand, so the move that was played has
//! to be recovered: enumerate every legal move from the previous position and
//! keep the first one whose resulting placement is the one now observed.

use crate::codec::PositionRecord;
use crate::types::{Board, Color, FullMove, Move, MoveGen, Piece, Placement, Square};
use std::fmt;
use std::str::FromStr;

/// A move recovered from two consecutive placements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferredMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl InferredMove {
    pub fn new(from: Square, to: Square, promotion: Option<Piece>) -> Self {
        Self { from, to, promotion }
    }

    /// Parse coordinate notation (e.g., "e2e4", "e7e8q") without a board
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.len() != 4 && text.len() != 5 {
            return None;
        }
        let from = Square::from_str(text.get(0..2)?).ok()?;
        let to = Square::from_str(text.get(2..4)?).ok()?;
        let promotion = match text.chars().nth(4) {
            None => None,
            Some(c) => Some(promotion_from_char(c)?),
        };
        Some(Self { from, to, promotion })
    }
}

impl From<Move> for InferredMove {
    fn from(m: Move) -> Self {
        Self::new(m.get_source(), m.get_dest(), m.get_promotion())
    }
}

/// Coordinate notation (e.g., "e2e4", "e7e8q")
impl fmt::Display for InferredMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "{}", promotion_char(promo))?;
        }
        Ok(())
    }
}

fn promotion_char(piece: Piece) -> char {
    match piece {
        Piece::Queen => 'q',
        Piece::Rook => 'r',
        Piece::Bishop => 'b',
        Piece::Knight => 'n',
        Piece::Pawn => 'p',
        Piece::King => 'k',
    }
}

fn promotion_from_char(c: char) -> Option<Piece> {
    match c {
        'q' | 'Q' => Some(Piece::Queen),
        'r' | 'R' => Some(Piece::Rook),
        'b' | 'B' => Some(Piece::Bishop),
        'n' | 'N' => Some(Piece::Knight),
        _ => None,
    }
}

/// Find the legal move for a coordinate string on the given board
pub fn parse_move(board: &Board, move_str: &str) -> Option<Move> {
    let wanted = InferredMove::parse(move_str)?;
    MoveGen::new_legal(board).find(|m| InferredMove::from(*m) == wanted)
}

/// Recover the move that turned `previous` into `next`.
///
/// Candidates come from the rules engine in its own enumeration order, which is
/// fixed for a given position; the first match wins. Returns `None` when no
/// single legal move explains the change, or when the previous position is one
/// the rules engine won't accept.
pub fn infer(
    previous: &Placement,
    side_to_move: Color,
    fullmove: FullMove,
    next: &Placement,
) -> Option<InferredMove> {
    let board = PositionRecord::new(*previous, side_to_move, fullmove).to_board()?;
    MoveGen::new_legal(&board)
        .find(|m| Placement::from_board(&board.make_move_new(*m)) == *next)
        .map(InferredMove::from)
}

/// Logical state after one confirmed ply: the side flips, and the full-move
/// number goes up once Black has replied.
#[inline]
pub const fn advance(side_to_move: Color, fullmove: FullMove) -> (Color, FullMove) {
    match side_to_move {
        Color::White => (Color::Black, fullmove),
        Color::Black => (Color::White, fullmove + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(text: &str) -> Placement {
        text.parse().unwrap()
    }

    fn after(previous: &str, side: Color, mv: &str) -> Placement {
        let record = PositionRecord::new(placement(previous), side, 1);
        let board = record.to_board().unwrap();
        let m = parse_move(&board, mv).unwrap();
        Placement::from_board(&board.make_move_new(m))
    }

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    #[test]
    fn test_infer_king_pawn_double_step() {
        let prev = placement(START);
        let next = placement("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
        let m = infer(&prev, Color::White, 1, &next).unwrap();
        assert_eq!(m, InferredMove::new(Square::E2, Square::E4, None));
        assert_eq!(m.to_string(), "e2e4");
        assert_eq!(advance(Color::White, 1), (Color::Black, 1));
    }

    #[test]
    fn test_fullmove_increments_after_black() {
        let (side, n) = advance(Color::White, 1);
        assert_eq!((side, n), (Color::Black, 1));
        let (side, n) = advance(side, n);
        assert_eq!((side, n), (Color::White, 2));
    }

    #[test]
    fn test_infer_wrong_side_not_found() {
        let prev = placement(START);
        let next = placement("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
        assert_eq!(infer(&prev, Color::Black, 1, &next), None);
    }

    #[test]
    fn test_infer_two_ply_jump_not_found() {
        let prev = placement(START);
        let next = placement("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR");
        assert_eq!(infer(&prev, Color::White, 1, &next), None);
    }

    #[test]
    fn test_infer_capture() {
        let prev = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR";
        let next = after(prev, Color::White, "e4d5");
        let m = infer(&placement(prev), Color::White, 2, &next).unwrap();
        assert_eq!(m.to_string(), "e4d5");
    }

    #[test]
    fn test_infer_castling() {
        let prev = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R";
        let next = placement("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R4RK1");
        let m = infer(&placement(prev), Color::White, 10, &next).unwrap();
        assert_eq!(m, InferredMove::new(Square::E1, Square::G1, None));

        let next = placement("2kr3r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R");
        let m = infer(&placement(prev), Color::Black, 10, &next).unwrap();
        assert_eq!(m.to_string(), "e8c8");
    }

    #[test]
    fn test_infer_promotion_picks_matching_piece() {
        let prev = "8/4P3/8/8/8/8/k7/4K3";
        let knight = placement("4N3/8/8/8/8/8/k7/4K3");
        let m = infer(&placement(prev), Color::White, 40, &knight).unwrap();
        assert_eq!(m.promotion, Some(Piece::Knight));
        assert_eq!(m.to_string(), "e7e8n");

        let queen = placement("4Q3/8/8/8/8/8/k7/4K3");
        let m = infer(&placement(prev), Color::White, 40, &queen).unwrap();
        assert_eq!(m.to_string(), "e7e8q");
    }

    #[test]
    fn test_infer_is_stable() {
        let prev = placement(START);
        let next = placement("rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R");
        let first = infer(&prev, Color::White, 1, &next);
        for _ in 0..5 {
            assert_eq!(infer(&prev, Color::White, 1, &next), first);
        }
        assert_eq!(first.unwrap().to_string(), "g1f3");
    }

    #[test]
    fn test_infer_illegal_previous_position() {
        let prev = placement("8/8/8/8/8/8/8/4K3");
        let next = placement("8/8/8/8/8/8/4K3/8");
        assert_eq!(infer(&prev, Color::White, 1, &next), None);
    }

    #[test]
    fn test_parse_move_text() {
        assert_eq!(
            InferredMove::parse("e7e8q"),
            Some(InferredMove::new(Square::E7, Square::E8, Some(Piece::Queen)))
        );
        assert_eq!(InferredMove::parse("e2e4").unwrap().promotion, None);
        assert_eq!(InferredMove::parse("e2"), None);
        assert_eq!(InferredMove::parse("e2e9"), None);
        assert_eq!(InferredMove::parse("e7e8x"), None);
    }

    #[test]
    fn test_parse_move_requires_legality() {
        let board = Board::default();
        assert!(parse_move(&board, "e2e4").is_some());
        assert!(parse_move(&board, "e2e5").is_none());
    }
}
