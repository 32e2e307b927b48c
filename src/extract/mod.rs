//! Board extraction.
//!
//! Turns a raw snapshot of the source surface into a [`Placement`]. A snapshot
//! is best-effort: entries whose square code or piece class can't be decoded
//! are dropped and the square reads as empty.

use crate::types::{piece_from_class, Placement, SquareCode};
use tracing::trace;

/// One scraped piece: the square code and the two-letter piece class
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RawPiece {
    pub code: SquareCode,
    pub class: String,
}

/// Unordered collection of scraped pieces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSnapshot {
    pub pieces: Vec<RawPiece>,
}

impl RawSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, code: u8, class: impl Into<String>) {
        self.pieces.push(RawPiece { code: SquareCode(code), class: class.into() });
    }

    /// Build from element class attributes such as `"piece wp square-52"`.
    ///
    /// Elements without a `square-NN` token are skipped. The piece token is the
    /// first two-letter token that isn't the square; if none decodes, the first
    /// two-letter token is kept so extraction can report it.
    pub fn from_class_lists<'a>(lists: impl IntoIterator<Item = &'a str>) -> Self {
        let mut snapshot = Self::new();
        for list in lists {
            let tokens: Vec<&str> = list.split_whitespace().collect();
            let code = match tokens.iter().find_map(|t| t.strip_prefix("square-").and_then(SquareCode::parse)) {
                Some(code) => code,
                None => {
                    trace!(classes = list, "element without square code");
                    continue;
                }
            };
            let candidates: Vec<&str> = tokens.iter().copied().filter(|t| t.len() == 2).collect();
            let class = candidates
                .iter()
                .copied()
                .find(|t| piece_from_class(t).is_some())
                .or_else(|| candidates.first().copied())
                .unwrap_or_default();
            snapshot.pieces.push(RawPiece { code, class: class.to_string() });
        }
        snapshot
    }

    /// Parse the line form `52:wp 54:bp ...`
    pub fn parse_pairs(text: &str) -> Self {
        let mut snapshot = Self::new();
        for token in text.split_whitespace() {
            let Some((code, class)) = token.split_once(':') else {
                trace!(token, "malformed snapshot token");
                continue;
            };
            match SquareCode::parse(code) {
                Some(code) => snapshot.pieces.push(RawPiece { code, class: class.to_string() }),
                None => trace!(token, "malformed square code"),
            }
        }
        snapshot
    }
}

impl FromIterator<(u8, String)> for RawSnapshot {
    fn from_iter<I: IntoIterator<Item = (u8, String)>>(iter: I) -> Self {
        Self {
            pieces: iter
                .into_iter()
                .map(|(code, class)| RawPiece { code: SquareCode(code), class })
                .collect(),
        }
    }
}

/// Extract the placement shown by a snapshot.
///
/// Entries are applied in sorted order so the result does not depend on the
/// order the surface reported them in; if two entries claim a square, the one
/// sorting last wins.
pub fn extract(snapshot: &RawSnapshot) -> Placement {
    let mut entries: Vec<&RawPiece> = snapshot.pieces.iter().collect();
    entries.sort();

    let mut placement = Placement::empty();
    for entry in entries {
        let Some((file, rank)) = entry.code.file_rank() else {
            trace!(code = %entry.code, "square code out of range");
            continue;
        };
        match piece_from_class(&entry.class) {
            Some(piece) => placement.set(file, rank, Some(piece)),
            None => trace!(code = %entry.code, class = %entry.class, "unrecognized piece class"),
        }
    }
    placement
}
