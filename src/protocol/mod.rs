//! Line protocol for driving the mirror from a terminal or a parent process.
//!
//! Commands arrive on stdin, one per line; mirror messages leave on stdout as
//! JSON lines. See `parser` for the command set.

mod parser;
mod handler;

pub use handler::{run_stdin, ProtocolHandler};
pub use parser::{parse_command, Command};

/// Driver identification
pub const DRIVER_NAME: &str = "chessmirror";
