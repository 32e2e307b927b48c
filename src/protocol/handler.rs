//! Line protocol handler and main loop.

use super::parser::{parse_command, Command};
use crate::codec::PositionRecord;
use crate::scheduler::{SharedSensor, Signal};
use crate::tracker::TurnHints;
use std::io::{self, BufRead, Write};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;
use tracing::debug;

/// Feeds the shared sensor from stdin commands and signals the scheduler
pub struct ProtocolHandler<W: Write> {
    sensor: SharedSensor,
    signals: UnboundedSender<Signal>,
    position: watch::Receiver<Option<PositionRecord>>,
    out: W,
    /// Debug mode enabled
    debug: bool,
    /// Should the driver quit
    quit: bool,
}

impl<W: Write> ProtocolHandler<W> {
    pub fn new(
        sensor: SharedSensor,
        signals: UnboundedSender<Signal>,
        position: watch::Receiver<Option<PositionRecord>>,
        out: W,
    ) -> Self {
        Self { sensor, signals, position, out, debug: false, quit: false }
    }

    /// Run the main loop (blocking) until `quit` or end of input
    pub fn run(&mut self, input: impl BufRead) {
        for line in input.lines() {
            match line {
                Ok(line) => {
                    if self.debug {
                        debug!("< {}", line);
                    }
                    self.handle_input(&line);
                    if self.quit {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Handle a single command line
    pub fn handle_input(&mut self, input: &str) {
        if input.trim().is_empty() {
            return;
        }
        match parse_command(input) {
            Command::Snapshot(snapshot) | Command::Classes(snapshot) => {
                self.sensor.set_snapshot(Some(snapshot));
                self.signal(Signal::Changed);
            }
            Command::Detach => {
                self.sensor.set_snapshot(None);
                self.signal(Signal::Detached);
            }
            Command::HintAttribute(value) => self.sensor.update_hints(|h| h.player_to_move = Some(value)),
            Command::HintText(text) => self.sensor.update_hints(|h| h.text = text),
            Command::HintClear => self.sensor.set_hints(TurnHints::none()),
            Command::Position => self.cmd_position(),
            Command::Debug(on) => self.debug = on,
            Command::Quit => {
                self.signal(Signal::Shutdown);
                self.quit = true;
            }
            Command::Unknown(s) => debug!("unknown command: {}", s),
        }
    }

    fn signal(&self, signal: Signal) {
        if self.signals.send(signal).is_err() {
            debug!(?signal, "scheduler gone");
        }
    }

    fn cmd_position(&mut self) {
        let line = match self.position.borrow().as_ref() {
            Some(position) => format!("position {}", position),
            None => "position none".to_string(),
        };
        self.send(&line);
    }

    /// Send a line to the output
    fn send(&mut self, msg: &str) {
        writeln!(self.out, "{}", msg).ok();
        self.out.flush().ok();
    }
}

/// Drive a handler from stdin
pub fn run_stdin<W: Write>(handler: &mut ProtocolHandler<W>) {
    let stdin = io::stdin();
    handler.run(stdin.lock());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::BoardSensor;
    use crate::types::Color;
    use tokio::sync::mpsc;

    fn handler() -> (ProtocolHandler<Vec<u8>>, mpsc::UnboundedReceiver<Signal>, watch::Sender<Option<PositionRecord>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (pos_tx, pos_rx) = watch::channel(None);
        (ProtocolHandler::new(SharedSensor::new(), tx, pos_rx, Vec::new()), rx, pos_tx)
    }

    #[test]
    fn test_snapshot_sets_sensor_and_signals() {
        let (mut h, mut rx, _pos) = handler();
        h.handle_input("snapshot 51:wk 58:bk");
        assert_eq!(rx.try_recv().unwrap(), Signal::Changed);
        let mut sensor = h.sensor.clone();
        assert_eq!(sensor.snapshot().unwrap().pieces.len(), 2);
    }

    #[test]
    fn test_detach_and_quit() {
        let (mut h, mut rx, _pos) = handler();
        h.handle_input("snapshot 51:wk 58:bk");
        h.handle_input("detach");
        h.handle_input("quit");
        assert_eq!(rx.try_recv().unwrap(), Signal::Changed);
        assert_eq!(rx.try_recv().unwrap(), Signal::Detached);
        assert_eq!(rx.try_recv().unwrap(), Signal::Shutdown);
        assert!(h.is_quit());
        let mut sensor = h.sensor.clone();
        assert!(sensor.snapshot().is_none());
    }

    #[test]
    fn test_hints() {
        let (mut h, _rx, _pos) = handler();
        h.handle_input("hint attr black");
        h.handle_input("hint text Black to move");
        let mut sensor = h.sensor.clone();
        let hints = sensor.turn_hints();
        assert_eq!(hints.player_to_move.as_deref(), Some("black"));
        assert_eq!(hints.text, "Black to move");
        h.handle_input("hint clear");
        assert_eq!(sensor.turn_hints(), TurnHints::none());
    }

    #[test]
    fn test_position_output() {
        let (mut h, _rx, pos) = handler();
        h.handle_input("position");
        let record = PositionRecord::new("4k3/8/8/8/8/8/8/4K3".parse().unwrap(), Color::Black, 3);
        pos.send_replace(Some(record));
        h.handle_input("position");
        let text = String::from_utf8(h.into_output()).unwrap();
        assert_eq!(text, "position none\nposition 4k3/8/8/8/8/8/8/4K3 b KQkq - 0 3\n");
    }

    #[test]
    fn test_run_stops_at_quit() {
        let (mut h, mut rx, _pos) = handler();
        h.run("snapshot 51:wk\nquit\nsnapshot 58:bk\n".as_bytes());
        assert_eq!(rx.try_recv().unwrap(), Signal::Changed);
        assert_eq!(rx.try_recv().unwrap(), Signal::Shutdown);
        assert!(rx.try_recv().is_err());
    }
}
