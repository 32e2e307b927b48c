//! Initial side-to-move detection.
//!
//! The source page doesn't state whose turn it is in any one reliable place.
//! `TurnDetector` runs an ordered list of strategies and takes the first
//! answer; when none answers, White is to move.

use crate::types::Color;

/// What the sensor could read about the turn, alongside the pieces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnHints {
    /// Value of a `player-to-move` style attribute, if the page has one
    pub player_to_move: Option<String>,
    /// Free text scraped near the board (labels, clocks, aria text)
    pub text: String,
    /// Side to move of the last position sent out, if any
    pub previous_side: Option<Color>,
}

impl TurnHints {
    pub fn none() -> Self {
        Self::default()
    }
}

/// One way of guessing the side to move
pub trait TurnStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn detect(&self, hints: &TurnHints) -> Option<Color>;
}

/// Reads an explicit `white` / `black` attribute
pub struct PlayerToMoveAttribute;

impl TurnStrategy for PlayerToMoveAttribute {
    fn name(&self) -> &'static str {
        "player-to-move attribute"
    }

    fn detect(&self, hints: &TurnHints) -> Option<Color> {
        match hints.player_to_move.as_deref()?.trim().to_ascii_lowercase().as_str() {
            "white" => Some(Color::White),
            "black" => Some(Color::Black),
            _ => None,
        }
    }
}

/// Looks for "white to move" / "black to move" in scraped text
pub struct TurnText;

impl TurnText {
    fn mentions(haystack: &str, side: &str) -> bool {
        if haystack.contains(&format!("{} to move", side)) || haystack.contains(&format!("{}-to-move", side)) {
            return true;
        }
        // "<side> ... to move" with the side as a whole word
        haystack
            .match_indices(side)
            .filter(|(i, _)| is_word_boundary(haystack, *i, side.len()))
            .any(|(i, _)| haystack[i + side.len()..].contains("to move"))
    }
}

fn is_word_boundary(haystack: &str, start: usize, len: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[start + len..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

impl TurnStrategy for TurnText {
    fn name(&self) -> &'static str {
        "turn text"
    }

    fn detect(&self, hints: &TurnHints) -> Option<Color> {
        let haystack = hints.text.to_lowercase();
        if Self::mentions(&haystack, "black") {
            Some(Color::Black)
        } else if Self::mentions(&haystack, "white") {
            Some(Color::White)
        } else {
            None
        }
    }
}

/// The opposite of the side that was to move in the last position sent out
pub struct PreviousPositionParity;

impl TurnStrategy for PreviousPositionParity {
    fn name(&self) -> &'static str {
        "previous position parity"
    }

    fn detect(&self, hints: &TurnHints) -> Option<Color> {
        hints.previous_side.map(|side| !side)
    }
}

/// Ordered strategy list with a White default
pub struct TurnDetector {
    strategies: Vec<Box<dyn TurnStrategy>>,
    default: Color,
}

impl TurnDetector {
    pub fn new(strategies: Vec<Box<dyn TurnStrategy>>) -> Self {
        Self { strategies, default: Color::White }
    }

    /// Returns the side to move and the name of the strategy that decided it
    pub fn detect(&self, hints: &TurnHints) -> (Color, &'static str) {
        self.strategies
            .iter()
            .find_map(|s| s.detect(hints).map(|side| (side, s.name())))
            .unwrap_or((self.default, "default"))
    }
}

impl Default for TurnDetector {
    fn default() -> Self {
        Self::new(vec![
            Box::new(PlayerToMoveAttribute),
            Box::new(TurnText),
            Box::new(PreviousPositionParity),
        ])
    }
}
