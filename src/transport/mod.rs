//! Messages between the source and mirror contexts.
//!
//! Delivery is fire-and-forget: a missing or failing mirror is logged and the
//! message dropped. Messages reach each target in the order they were sent.

use crate::error::{TransportError, TransportResult};
use crate::infer::InferredMove;
use crate::codec::PositionRecord;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, warn};

/// Wire messages
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum MirrorMessage {
    /// A single move in coordinate notation (`e2e4`, `e7e8q`)
    Move {
        #[serde(rename = "move")]
        mv: String,
    },
    /// A whole position in six-field FEN
    Position { position: String },
}

impl MirrorMessage {
    pub fn from_move(m: &InferredMove) -> Self {
        MirrorMessage::Move { mv: m.to_string() }
    }

    pub fn from_position(p: &PositionRecord) -> Self {
        MirrorMessage::Position { position: p.to_string() }
    }

    pub fn to_json(&self) -> TransportResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Something that can receive mirror messages
pub trait MirrorTarget: Send {
    /// Label used in logs
    fn name(&self) -> String;
    fn deliver(&mut self, msg: &MirrorMessage) -> TransportResult<()>;
}

/// Delivers into a tokio channel, e.g. to a mirror task in the same process
pub struct ChannelTarget {
    name: String,
    tx: UnboundedSender<MirrorMessage>,
}

impl ChannelTarget {
    pub fn new(name: impl Into<String>, tx: UnboundedSender<MirrorMessage>) -> Self {
        Self { name: name.into(), tx }
    }
}

impl MirrorTarget for ChannelTarget {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn deliver(&mut self, msg: &MirrorMessage) -> TransportResult<()> {
        self.tx.send(msg.clone()).map_err(|_| TransportError::TargetUnreachable {
            reason: format!("{} closed", self.name),
        })
    }
}

/// Writes one JSON object per line
pub struct WriterTarget<W: Write + Send> {
    name: String,
    out: W,
}

impl<W: Write + Send> WriterTarget<W> {
    pub fn new(name: impl Into<String>, out: W) -> Self {
        Self { name: name.into(), out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> MirrorTarget for WriterTarget<W> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn deliver(&mut self, msg: &MirrorMessage) -> TransportResult<()> {
        let line = msg.to_json()?;
        writeln!(self.out, "{}", line)
            .and_then(|_| self.out.flush())
            .map_err(|e| TransportError::TargetUnreachable { reason: e.to_string() })
    }
}

/// Fans every message out to all registered mirror targets
#[derive(Default)]
pub struct Relay {
    targets: Vec<Box<dyn MirrorTarget>>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_target(&mut self, target: Box<dyn MirrorTarget>) {
        self.targets.push(target);
    }

    pub fn with_target(mut self, target: impl MirrorTarget + 'static) -> Self {
        self.add_target(Box::new(target));
        self
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Send to every target; returns how many accepted it
    pub fn broadcast(&mut self, msg: &MirrorMessage) -> usize {
        if self.targets.is_empty() {
            let err = TransportError::TargetUnreachable { reason: "no mirror target registered".into() };
            warn!(?msg, "{}", err);
            return 0;
        }

        let mut delivered = 0;
        for target in &mut self.targets {
            match target.deliver(msg) {
                Ok(()) => {
                    debug!(target = %target.name(), ?msg, "delivered");
                    delivered += 1;
                }
                Err(e) => error!(target = %target.name(), ?msg, "delivery failed: {}", e),
            }
        }
        delivered
    }
}
