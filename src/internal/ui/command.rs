use thiserror::Error;

use crate::utils::text::is_displayable;

pub const COMMAND_PREFIX: char = ':';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("character {0:?} cannot be entered on the command line")]
    Unrepresentable(char),
}

/// Text typed after the command prefix, until Enter or Esc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    buffer: String,
}

impl CommandLine {
    pub fn new() -> Self {
        Self {
            buffer: COMMAND_PREFIX.to_string(),
        }
    }

    pub fn push(&mut self, c: char) -> Result<(), InputError> {
        if c == '\n' || !is_displayable(c) {
            return Err(InputError::Unrepresentable(c));
        }
        self.buffer.push(c);
        Ok(())
    }

    /// Removes the last typed character. Returns false once only the prefix
    /// was left, meaning the line should be abandoned.
    pub fn backspace(&mut self) -> bool {
        if self.buffer.len() <= COMMAND_PREFIX.len_utf8() {
            return false;
        }
        self.buffer.pop();
        true
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn commit(self) -> Option<LineCommand> {
        LineCommand::parse(&self.buffer)
    }
}

impl Default for CommandLine {
    fn default() -> Self {
        Self::new()
    }
}

/// A committed command line split into verb and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCommand {
    pub verb: String,
    pub args: Vec<String>,
}

impl LineCommand {
    /// Parses `":verb arg1 arg2"`; the prefix is optional. Blank lines give
    /// `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.strip_prefix(COMMAND_PREFIX).unwrap_or(line);
        let mut words = line.split_whitespace().map(str::to_string);
        let verb = words.next()?;
        Some(Self {
            verb,
            args: words.collect(),
        })
    }
}
