//! Mirror a chess game shown on one board onto another.
//!
//! The source board only exposes where pieces stand. This crate reads those
//! placements, works out which legal move produced each new one, and sends
//! the move (and the resulting position) to a mirror board.
//!
//! # Architecture
//! - `extract`: raw board snapshot to `Placement`
//! - `codec`: `Placement` plus turn and counters to and from FEN
//! - `infer`: the legal move that explains a placement change
//! - `tracker`: the logical game state and notification dedup
//! - `scheduler`: debounced + polled observation pipeline
//! - `transport`: wire messages and fan-out to mirror targets
//! - `mirror`: replaying messages onto a mirror surface
//! - `protocol`: the stdin/stdout driver used by the binary

pub mod codec;
pub mod config;
pub mod error;
pub mod extract;
pub mod infer;
pub mod mirror;
pub mod protocol;
pub mod scheduler;
pub mod tracker;
pub mod transport;
pub mod types;

pub use codec::{compose, decompose, PositionRecord};
pub use config::MirrorConfig;
pub use extract::{extract, RawSnapshot};
pub use infer::{infer, InferredMove};
pub use mirror::{MirrorReplay, MirrorSurface};
pub use scheduler::{BoardSensor, Scheduler, SharedSensor, Signal};
pub use tracker::{GameTracker, Observation, TurnHints};
pub use transport::{MirrorMessage, Relay};
pub use types::Placement;
