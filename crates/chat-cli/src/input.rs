//! Input handling - turns terminal lines into messages and commands
//!
//! Enter submits. A line ending in `\` continues the message on the next
//! line, standing in for Shift+Enter. Lines starting with `/` are commands.

use thiserror::Error;

const CONTINUATION: char = '\\';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Unknown command: /{0} (try /help)")]
    UnknownCommand(String),

    #[error("/{0} needs a conversation number")]
    MissingIndex(&'static str),

    #[error("Not a valid number: {0}")]
    InvalidIndex(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    List,
    Show,
    Select(usize),
    Delete(usize),
    Rename { index: usize, title: Option<String> },
    Save(Option<String>),
    Copy(Option<usize>),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// A complete message to send
    Send(String),
    /// A command to run
    Command(Command),
    /// The line was continued; more input is needed
    Continue,
    /// Nothing to do (blank input)
    Empty,
    /// The command could not be parsed
    Invalid(InputError),
}

/// Accumulates continued lines into one message.
#[derive(Debug, Default)]
pub struct InputBuffer {
    lines: Vec<String>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a message is being continued across lines.
    pub fn is_continuing(&self) -> bool {
        !self.lines.is_empty()
    }

    pub fn push_line(&mut self, line: &str) -> InputAction {
        let line = line.trim_end_matches(['\r', '\n']);

        if !self.is_continuing() {
            if let Some(command) = line.trim().strip_prefix('/') {
                return match parse_command(command) {
                    Ok(command) => InputAction::Command(command),
                    Err(e) => InputAction::Invalid(e),
                };
            }
        }

        if let Some(head) = line.strip_suffix(CONTINUATION) {
            self.lines.push(head.to_string());
            return InputAction::Continue;
        }

        self.lines.push(line.to_string());
        let message = self.lines.join("\n");
        self.lines.clear();

        if message.trim().is_empty() {
            InputAction::Empty
        } else {
            InputAction::Send(message)
        }
    }
}

fn parse_index(name: &'static str, arg: Option<&str>) -> Result<usize, InputError> {
    let arg = arg.ok_or(InputError::MissingIndex(name))?;
    arg.parse()
        .map_err(|_| InputError::InvalidIndex(arg.to_string()))
}

fn optional_text(rest: Option<&str>) -> Option<String> {
    rest.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a command line without its leading `/`.
pub fn parse_command(line: &str) -> Result<Command, InputError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, Some(rest.trim())),
        None => (line, None),
    };
    let rest = rest.filter(|r| !r.is_empty());

    match name.to_ascii_lowercase().as_str() {
        "new" => Ok(Command::New),
        "list" | "ls" => Ok(Command::List),
        "show" => Ok(Command::Show),
        "select" | "open" => Ok(Command::Select(parse_index("select", rest)?)),
        "delete" | "rm" => Ok(Command::Delete(parse_index("delete", rest)?)),
        "rename" => {
            let (index, title) = match rest.map(|r| r.split_once(char::is_whitespace)) {
                Some(Some((index, title))) => (Some(index), Some(title)),
                Some(None) => (rest, None),
                None => (None, None),
            };
            Ok(Command::Rename {
                index: parse_index("rename", index)?,
                title: optional_text(title),
            })
        }
        "save" => Ok(Command::Save(optional_text(rest))),
        "copy" => match rest {
            Some(arg) => Ok(Command::Copy(Some(
                arg.parse()
                    .map_err(|_| InputError::InvalidIndex(arg.to_string()))?,
            ))),
            None => Ok(Command::Copy(None)),
        },
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(InputError::UnknownCommand(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_submits() {
        let mut buffer = InputBuffer::new();
        assert_eq!(buffer.push_line("Hi\n"), InputAction::Send("Hi".to_string()));
        assert!(!buffer.is_continuing());
    }

    #[test]
    fn test_continuation_builds_multiline_message() {
        let mut buffer = InputBuffer::new();

        assert_eq!(buffer.push_line("first\\"), InputAction::Continue);
        assert!(buffer.is_continuing());
        assert_eq!(buffer.push_line("/not a command\\"), InputAction::Continue);
        assert_eq!(
            buffer.push_line("last"),
            InputAction::Send("first\n/not a command\nlast".to_string())
        );
    }

    #[test]
    fn test_blank_input_is_not_sent() {
        let mut buffer = InputBuffer::new();
        assert_eq!(buffer.push_line("   "), InputAction::Empty);

        buffer.push_line("\\");
        assert_eq!(buffer.push_line(""), InputAction::Empty);
    }

    #[test]
    fn test_quit_commands() {
        let mut buffer = InputBuffer::new();
        assert_eq!(buffer.push_line("/quit"), InputAction::Command(Command::Quit));
        assert_eq!(buffer.push_line("/EXIT"), InputAction::Command(Command::Quit));
        assert_eq!(buffer.push_line("/q"), InputAction::Command(Command::Quit));
    }

    #[test]
    fn test_bare_quit_words_are_messages() {
        let mut buffer = InputBuffer::new();
        assert_eq!(buffer.push_line("exit"), InputAction::Send("exit".to_string()));
        assert_eq!(buffer.push_line("quit"), InputAction::Send("quit".to_string()));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("new"), Ok(Command::New));
        assert_eq!(parse_command("select 2"), Ok(Command::Select(2)));
        assert_eq!(parse_command("delete  3 "), Ok(Command::Delete(3)));
        assert_eq!(parse_command("save"), Ok(Command::Save(None)));
        assert_eq!(
            parse_command("save My chat"),
            Ok(Command::Save(Some("My chat".to_string())))
        );
        assert_eq!(parse_command("copy"), Ok(Command::Copy(None)));
        assert_eq!(parse_command("copy 4"), Ok(Command::Copy(Some(4))));
    }

    #[test]
    fn test_parse_rename() {
        assert_eq!(
            parse_command("rename 1 Greeting chat"),
            Ok(Command::Rename {
                index: 1,
                title: Some("Greeting chat".to_string())
            })
        );
        assert_eq!(
            parse_command("rename 2"),
            Ok(Command::Rename {
                index: 2,
                title: None
            })
        );
        assert_eq!(
            parse_command("rename"),
            Err(InputError::MissingIndex("rename"))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_command("frobnicate"),
            Err(InputError::UnknownCommand("frobnicate".to_string()))
        );
        assert_eq!(parse_command("select"), Err(InputError::MissingIndex("select")));
        assert_eq!(
            parse_command("delete two"),
            Err(InputError::InvalidIndex("two".to_string()))
        );
    }

    #[test]
    fn test_invalid_command_surfaces_as_action() {
        let mut buffer = InputBuffer::new();
        assert!(matches!(
            buffer.push_line("/select x"),
            InputAction::Invalid(InputError::InvalidIndex(_))
        ));
    }
}
