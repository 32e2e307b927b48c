//! Observation scheduling.
//!
//! Two triggers feed one pipeline:
//! - change signals (many per drag animation), debounced so a cycle only runs
//!   once the stream has been quiet for the quiescence window
//! - a fixed-interval poll, the backstop for bursts the signals missed; it
//!   compares placements first and only runs a cycle when something moved
//!
//! Both are multiplexed in a single task, so observe cycles never overlap.

mod debounce;

pub use debounce::Debounce;

use crate::codec::PositionRecord;
use crate::config::MirrorConfig;
use crate::extract::{extract, RawSnapshot};
use crate::tracker::{GameTracker, TurnHints};
use crate::transport::{MirrorMessage, Relay};
use crate::types::Placement;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Change-signal stream items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Something on the source board changed
    Changed,
    /// The source board element went away; the next board is a new game
    Detached,
    Shutdown,
}

/// Reads the source board
pub trait BoardSensor: Send {
    /// Current raw snapshot, `None` when no board is present
    fn snapshot(&mut self) -> Option<RawSnapshot>;

    fn turn_hints(&mut self) -> TurnHints {
        TurnHints::none()
    }
}

/// In-memory sensor whose readings are set from elsewhere (a driver loop or a test)
#[derive(Clone, Default)]
pub struct SharedSensor {
    inner: Arc<Mutex<SensorReading>>,
}

#[derive(Default)]
struct SensorReading {
    snapshot: Option<RawSnapshot>,
    hints: TurnHints,
}

impl SharedSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_snapshot(&self, snapshot: Option<RawSnapshot>) {
        self.inner.lock().snapshot = snapshot;
    }

    pub fn set_hints(&self, hints: TurnHints) {
        self.inner.lock().hints = hints;
    }

    pub fn update_hints(&self, f: impl FnOnce(&mut TurnHints)) {
        f(&mut self.inner.lock().hints);
    }
}

impl BoardSensor for SharedSensor {
    fn snapshot(&mut self) -> Option<RawSnapshot> {
        self.inner.lock().snapshot.clone()
    }

    fn turn_hints(&mut self) -> TurnHints {
        self.inner.lock().hints.clone()
    }
}

/// Where a cycle was triggered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Debounce,
    Poll,
}

/// Owner of the tracker and the single observe pipeline
pub struct Scheduler<S: BoardSensor> {
    sensor: S,
    tracker: GameTracker,
    relay: Relay,
    quiescence: Duration,
    poll_interval: Duration,
    published: watch::Sender<Option<PositionRecord>>,
    cycles: u64,
}

impl<S: BoardSensor> Scheduler<S> {
    pub fn new(sensor: S, relay: Relay, config: &MirrorConfig) -> Self {
        let (published, _) = watch::channel(None);
        Self {
            sensor,
            tracker: GameTracker::new(),
            relay,
            quiescence: config.quiescence(),
            poll_interval: config.poll_interval(),
            published,
            cycles: 0,
        }
    }

    /// Latest tracked position, updated after every cycle
    pub fn subscribe(&self) -> watch::Receiver<Option<PositionRecord>> {
        self.published.subscribe()
    }

    pub fn tracker(&self) -> &GameTracker {
        &self.tracker
    }

    /// Number of observe cycles run so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run until `Signal::Shutdown` or the signal stream closes
    pub async fn run(mut self, mut signals: UnboundedReceiver<Signal>) -> Self {
        let mut debounce = Debounce::new(self.quiescence);
        let mut poll = time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(quiescence = ?self.quiescence, poll = ?self.poll_interval, "scheduler started");

        loop {
            let deadline = debounce.deadline();
            tokio::select! {
                biased;

                signal = signals.recv() => match signal {
                    Some(Signal::Changed) => debounce.signal(Instant::now()),
                    Some(Signal::Detached) => {
                        debounce.clear();
                        self.tracker.reset();
                        self.publish();
                    }
                    Some(Signal::Shutdown) | None => break,
                },

                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if debounce.take_due(Instant::now()) {
                        self.cycle(Trigger::Debounce);
                    }
                }

                _ = poll.tick() => {
                    // A burst in progress will be handled when it settles
                    if !debounce.is_armed() {
                        self.cycle(Trigger::Poll);
                    }
                }
            }
        }

        info!(cycles = self.cycles, "scheduler stopped");
        self
    }

    fn cycle(&mut self, trigger: Trigger) {
        let Some(snapshot) = self.sensor.snapshot() else {
            if self.tracker.is_initialized() {
                info!("source board gone");
                self.tracker.reset();
                self.publish();
            }
            return;
        };
        let placement = extract(&snapshot);

        if trigger == Trigger::Poll && self.tracker.current_placement() == Some(&placement) {
            return;
        }
        self.observe(placement);
    }

    fn observe(&mut self, placement: Placement) {
        let hints = self.sensor.turn_hints();
        self.cycles += 1;
        let obs = self.tracker.observe(placement, &hints);
        debug!(cycle = self.cycles, changed = obs.changed, position = %obs.position, "observed");

        if let Some(m) = obs.inferred {
            self.relay.broadcast(&MirrorMessage::from_move(&m));
        }
        if let Some(position) = self.tracker.take_notification() {
            self.relay.broadcast(&MirrorMessage::from_position(&position));
        }
        self.publish();
    }

    fn publish(&self) {
        self.published.send_replace(self.tracker.current_position());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelTarget;
    use crate::types::{piece_to_char, side_char, SquareCode};
    use tokio::sync::mpsc;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";
    const E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR";

    fn snapshot_of(text: &str) -> RawSnapshot {
        let placement: Placement = text.parse().unwrap();
        let mut snap = RawSnapshot::new();
        for (sq, piece, color) in placement.pieces() {
            let letter = piece_to_char(piece, color).to_ascii_lowercase();
            snap.push(SquareCode::from_square(sq).0, format!("{}{}", side_char(color), letter));
        }
        snap
    }

    struct Harness {
        sensor: SharedSensor,
        signals: mpsc::UnboundedSender<Signal>,
        messages: mpsc::UnboundedReceiver<MirrorMessage>,
        handle: tokio::task::JoinHandle<Scheduler<SharedSensor>>,
    }

    fn spawn(initial: Option<&str>) -> Harness {
        let sensor = SharedSensor::new();
        sensor.set_snapshot(initial.map(snapshot_of));
        let (msg_tx, messages) = mpsc::unbounded_channel();
        let relay = Relay::new().with_target(ChannelTarget::new("test", msg_tx));
        let scheduler = Scheduler::new(sensor.clone(), relay, &MirrorConfig::default());
        let (signals, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(scheduler.run(rx));
        Harness { sensor, signals, messages, handle }
    }

    async fn settle(ms: u64) {
        time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_poll_initializes() {
        let mut h = spawn(Some(START));
        settle(10).await;
        h.signals.send(Signal::Shutdown).unwrap();
        let scheduler = h.handle.await.unwrap();
        assert_eq!(scheduler.cycles(), 1);
        assert_eq!(
            h.messages.try_recv().unwrap(),
            MirrorMessage::Position { position: format!("{} w KQkq - 0 1", START) }
        );
        assert!(h.messages.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_one_cycle() {
        let mut h = spawn(Some(START));
        settle(10).await;
        h.sensor.set_snapshot(Some(snapshot_of(E4)));
        for _ in 0..25 {
            h.signals.send(Signal::Changed).unwrap();
            settle(2).await;
        }
        settle(200).await;
        h.signals.send(Signal::Shutdown).unwrap();
        let scheduler = h.handle.await.unwrap();

        // One cycle for the initial read, one for the whole burst
        assert_eq!(scheduler.cycles(), 2);
        let _initial = h.messages.try_recv().unwrap();
        assert_eq!(h.messages.try_recv().unwrap(), MirrorMessage::Move { mv: "e2e4".into() });
        assert_eq!(
            h.messages.try_recv().unwrap(),
            MirrorMessage::Position { position: format!("{} b KQkq - 0 1", E4) }
        );
        assert!(h.messages.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_catches_missed_change() {
        let mut h = spawn(Some(START));
        settle(10).await;
        // No change signal at all
        h.sensor.set_snapshot(Some(snapshot_of(E4)));
        settle(600).await;
        h.signals.send(Signal::Shutdown).unwrap();
        let scheduler = h.handle.await.unwrap();

        assert_eq!(scheduler.cycles(), 2);
        let _initial = h.messages.try_recv().unwrap();
        assert_eq!(h.messages.try_recv().unwrap(), MirrorMessage::Move { mv: "e2e4".into() });
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_poll_skips_observe() {
        let h = spawn(Some(START));
        settle(3_000).await;
        h.signals.send(Signal::Shutdown).unwrap();
        let scheduler = h.handle.await.unwrap();
        assert_eq!(scheduler.cycles(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_board_then_detaches() {
        let h = spawn(None);
        settle(10).await;

        h.sensor.set_snapshot(Some(snapshot_of(START)));
        settle(600).await;
        h.sensor.set_snapshot(None);
        settle(600).await;
        h.signals.send(Signal::Shutdown).unwrap();
        let scheduler = h.handle.await.unwrap();
        assert_eq!(scheduler.cycles(), 1);
        assert!(!scheduler.tracker().is_initialized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_detach_signal_resets() {
        let h = spawn(Some(START));
        settle(10).await;
        h.signals.send(Signal::Detached).unwrap();
        settle(1).await;
        h.signals.send(Signal::Shutdown).unwrap();
        let scheduler = h.handle.await.unwrap();
        assert!(!scheduler.tracker().is_initialized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_published_position() {
        let sensor = SharedSensor::new();
        sensor.set_snapshot(Some(snapshot_of(START)));
        let scheduler = Scheduler::new(sensor.clone(), Relay::new(), &MirrorConfig::default());
        let mut rx = scheduler.subscribe();
        let (signals, signal_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(scheduler.run(signal_rx));

        rx.changed().await.unwrap();
        let position = rx.borrow().clone().unwrap();
        assert_eq!(position.to_string(), format!("{} w KQkq - 0 1", START));

        signals.send(Signal::Shutdown).unwrap();
        handle.await.unwrap();
    }
}
