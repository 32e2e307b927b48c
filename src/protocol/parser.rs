//! Line protocol command parser.

use crate::extract::RawSnapshot;

/// Parsed driver command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// "snapshot 51:wk 58:bk ..." - replace the board reading
    Snapshot(RawSnapshot),
    /// "classes piece wk square-51|piece bk square-58" - reading from raw class lists
    Classes(RawSnapshot),
    /// "detach" - the source board went away
    Detach,
    /// "hint attr <white|black>"
    HintAttribute(String),
    /// "hint text <free text>"
    HintText(String),
    /// "hint clear"
    HintClear,
    /// "position" - print the tracked position
    Position,
    /// "debug on/off"
    Debug(bool),
    /// "quit"
    Quit,
    /// Unknown command
    Unknown(String),
}

/// Parse one input line
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let (word, rest) = match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    };

    match word {
        "snapshot" => Command::Snapshot(RawSnapshot::parse_pairs(rest)),
        "classes" => Command::Classes(RawSnapshot::from_class_lists(rest.split('|'))),
        "detach" => Command::Detach,
        "hint" => parse_hint(rest).unwrap_or_else(|| Command::Unknown(input.to_string())),
        "position" => Command::Position,
        "debug" => Command::Debug(rest == "on"),
        "quit" => Command::Quit,
        _ => Command::Unknown(input.to_string()),
    }
}

fn parse_hint(rest: &str) -> Option<Command> {
    let (kind, value) = match rest.split_once(char::is_whitespace) {
        Some((kind, value)) => (kind, value.trim()),
        None => (rest, ""),
    };
    match kind {
        "attr" if !value.is_empty() => Some(Command::HintAttribute(value.to_string())),
        "text" => Some(Command::HintText(value.to_string())),
        "clear" => Some(Command::HintClear),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot() {
        match parse_command("snapshot 51:wk  58:bk") {
            Command::Snapshot(snap) => assert_eq!(snap.pieces.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_classes() {
        match parse_command("classes piece wk square-51|piece bk square-58|junk") {
            Command::Classes(snap) => assert_eq!(snap.pieces.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_hints() {
        assert_eq!(parse_command("hint attr black"), Command::HintAttribute("black".into()));
        assert_eq!(parse_command("hint text Black to move"), Command::HintText("Black to move".into()));
        assert_eq!(parse_command("hint clear"), Command::HintClear);
        assert_eq!(parse_command("hint attr"), Command::Unknown("hint attr".into()));
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("detach"), Command::Detach);
        assert_eq!(parse_command("  position  "), Command::Position);
        assert_eq!(parse_command("debug on"), Command::Debug(true));
        assert_eq!(parse_command("debug off"), Command::Debug(false));
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("go depth 3"), Command::Unknown("go depth 3".into()));
    }
}
