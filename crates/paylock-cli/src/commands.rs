//! Simulator commands read from stdin.

use std::str::FromStr;

use anyhow::{Context, bail};

/// One line of simulator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Pulse the coin line `n` times.
    Coin(u32),

    /// Feed one bill.
    Bill,

    /// Open the door.
    Open,

    /// Close the door.
    Close,

    /// Make the next `n` door sensor reads fail.
    Fault(usize),

    /// Print the machine state.
    Status,

    /// Print the command list.
    Help,

    /// Stop the simulator.
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            bail!("empty command");
        };
        let arg = words.next();
        if words.next().is_some() {
            bail!("too many arguments for '{name}'");
        }

        let command = match (name.to_ascii_lowercase().as_str(), arg) {
            ("coin", None) => Command::Coin(1),
            ("coin", Some(n)) => Command::Coin(
                n.parse()
                    .with_context(|| format!("invalid pulse count '{n}'"))?,
            ),
            ("bill", None) => Command::Bill,
            ("open", None) => Command::Open,
            ("close", None) => Command::Close,
            ("fault", None) => Command::Fault(1),
            ("fault", Some(n)) => Command::Fault(
                n.parse()
                    .with_context(|| format!("invalid read count '{n}'"))?,
            ),
            ("status", None) => Command::Status,
            ("help" | "?", None) => Command::Help,
            ("quit" | "exit", None) => Command::Quit,
            (_, Some(_)) if is_known(name) => bail!("'{name}' takes no argument"),
            _ => bail!("unknown command '{name}'"),
        };
        Ok(command)
    }
}

fn is_known(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "bill" | "open" | "close" | "status" | "help" | "?" | "quit" | "exit"
    )
}

pub const HELP: &str = "\
commands:
  coin [n]    pulse the coin line n times (default 1)
  bill        feed one bill
  open        open the door
  close       close the door
  fault [n]   fail the next n door sensor reads (default 1)
  status      show credit, outputs and display
  quit        stop the simulator";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cases = [
            ("coin", Command::Coin(1)),
            ("coin 5", Command::Coin(5)),
            ("  BILL ", Command::Bill),
            ("open", Command::Open),
            ("close", Command::Close),
            ("fault 3", Command::Fault(3)),
            ("status", Command::Status),
            ("?", Command::Help),
            ("exit", Command::Quit),
        ];
        for (line, expected) in cases {
            assert_eq!(line.parse::<Command>().unwrap(), expected, "{line}");
        }
    }

    #[test]
    fn test_parse_errors() {
        for line in ["", "dance", "coin many", "coin 1 2", "bill 2"] {
            assert!(line.parse::<Command>().is_err(), "{line:?} should fail");
        }
    }

    #[test]
    fn test_argument_error_message() {
        let err = "open now".parse::<Command>().unwrap_err();
        assert_eq!(err.to_string(), "'open' takes no argument");
    }
}
