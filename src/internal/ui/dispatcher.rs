use crossterm::event::{KeyCode, KeyEvent};

use crate::internal::ui::app::Action;
use crate::internal::ui::command::{CommandLine, LineCommand};
use crate::internal::ui::keybindings::{KeyBindingContext, KeyBindingMap};

/// Outcome of feeding one key to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// A bound action, either stack-level or for the active page.
    Action(Action),
    /// A committed line command.
    Command(LineCommand),
    /// The key was consumed by the command line being typed.
    Pending,
    /// Nothing is bound to the key.
    Ignored,
}

/// Resolves keys in two tiers: stack-level bindings, then the active page's
/// table. While a command line is open every key edits it instead.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    bindings: KeyBindingMap,
    command_line: Option<CommandLine>,
}

impl CommandDispatcher {
    pub fn new(bindings: KeyBindingMap) -> Self {
        Self {
            bindings,
            command_line: None,
        }
    }

    pub fn dispatch(&mut self, key: &KeyEvent, context: KeyBindingContext) -> Dispatch {
        if self.command_line.is_some() {
            return self.edit_command_line(key);
        }

        match self.bindings.get_action(key, context) {
            Some(Action::EnterCommand) => {
                self.command_line = Some(CommandLine::new());
                Dispatch::Pending
            }
            Some(action) => Dispatch::Action(action),
            None => Dispatch::Ignored,
        }
    }

    fn edit_command_line(&mut self, key: &KeyEvent) -> Dispatch {
        match key.code {
            KeyCode::Enter => match self.command_line.take().and_then(CommandLine::commit) {
                Some(command) => Dispatch::Command(command),
                None => Dispatch::Ignored,
            },
            KeyCode::Esc => {
                self.command_line = None;
                Dispatch::Ignored
            }
            KeyCode::Backspace => {
                let keep = self
                    .command_line
                    .as_mut()
                    .is_some_and(CommandLine::backspace);
                if !keep {
                    self.command_line = None;
                }
                Dispatch::Pending
            }
            KeyCode::Char(c) => {
                if let Some(line) = self.command_line.as_mut()
                    && let Err(e) = line.push(c)
                {
                    tracing::debug!(error = %e, "ignoring command line input");
                }
                Dispatch::Pending
            }
            _ => Dispatch::Pending,
        }
    }

    /// Text of the command line being typed, prefix included.
    pub fn command_text(&self) -> Option<&str> {
        self.command_line.as_ref().map(CommandLine::text)
    }
}
