use crate::internal::ui::app::Action;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Binding table a key is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyBindingContext {
    Global,
    Listing,
    Detail,
    Thread,
}

/// Maps key events to actions
#[derive(Debug, Clone)]
pub struct KeyBindingMap {
    global: HashMap<KeyEvent, Action>,
    listing: HashMap<KeyEvent, Action>,
    detail: HashMap<KeyEvent, Action>,
    thread: HashMap<KeyEvent, Action>,
}

impl KeyBindingMap {
    /// Create a new empty keybinding map
    pub fn new() -> Self {
        Self {
            global: HashMap::new(),
            listing: HashMap::new(),
            detail: HashMap::new(),
            thread: HashMap::new(),
        }
    }

    fn map(&self, context: KeyBindingContext) -> &HashMap<KeyEvent, Action> {
        match context {
            KeyBindingContext::Global => &self.global,
            KeyBindingContext::Listing => &self.listing,
            KeyBindingContext::Detail => &self.detail,
            KeyBindingContext::Thread => &self.thread,
        }
    }

    fn map_mut(&mut self, context: KeyBindingContext) -> &mut HashMap<KeyEvent, Action> {
        match context {
            KeyBindingContext::Global => &mut self.global,
            KeyBindingContext::Listing => &mut self.listing,
            KeyBindingContext::Detail => &mut self.detail,
            KeyBindingContext::Thread => &mut self.thread,
        }
    }

    /// Get the action for a given key event in a specific context.
    /// Stack-level (global) bindings win over the page's own table.
    pub fn get_action(&self, key: &KeyEvent, context: KeyBindingContext) -> Option<Action> {
        let key = normalize_key(key);

        if let Some(action) = self.global.get(&key) {
            return Some(*action);
        }

        self.map(context).get(&key).copied()
    }

    /// Stack-level action bound to `key`, if any.
    pub fn global_action(&self, key: &KeyEvent) -> Option<Action> {
        self.global.get(&normalize_key(key)).copied()
    }

    /// Add a keybinding for a specific context
    pub fn add_binding(&mut self, context: KeyBindingContext, key: KeyEvent, action: Action) {
        self.map_mut(context).insert(normalize_key(&key), action);
    }

    /// Merge custom keybindings from configuration
    pub fn merge_config(&mut self, config: &crate::config::KeyBindingConfig) {
        let mut merge = |ctx: KeyBindingContext, bindings: &HashMap<String, Action>| {
            for (key_str, action) in bindings {
                if let Some(key_event) = parse_key_str(key_str) {
                    self.add_binding(ctx, key_event, *action);
                } else {
                    tracing::warn!("Invalid key string in config: {}", key_str);
                }
            }
        };

        merge(KeyBindingContext::Global, &config.global);
        merge(KeyBindingContext::Listing, &config.listing);
        merge(KeyBindingContext::Detail, &config.detail);
        merge(KeyBindingContext::Thread, &config.thread);
    }
}

impl Default for KeyBindingMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops event kind/state, and Shift on characters: the character itself
/// already carries the case, and terminals disagree on reporting Shift for
/// symbols such as ':'.
pub fn normalize_key(key: &KeyEvent) -> KeyEvent {
    let mut modifiers = key.modifiers;
    if let KeyCode::Char(_) = key.code {
        modifiers.remove(KeyModifiers::SHIFT);
    }
    KeyEvent::new(key.code, modifiers)
}

/// Parse a key string into a KeyEvent
/// Supported formats:
/// - Single char: "j", "k", "1"
/// - Special keys: "Enter", "Tab", "Esc", "Up", "Down", "Left", "Right",
///   "PageUp", "PageDown"
/// - With modifiers: "Ctrl+C", "Shift+Tab"
pub fn parse_key_str(key_str: &str) -> Option<KeyEvent> {
    let parts: Vec<&str> = key_str.split('+').collect();

    let mut modifiers = KeyModifiers::empty();
    let key_part = if parts.len() > 1 {
        // Has modifiers
        for modifier in &parts[..parts.len() - 1] {
            match modifier.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "alt" => modifiers |= KeyModifiers::ALT,
                _ => return None, // Invalid modifier
            }
        }
        parts[parts.len() - 1]
    } else {
        parts[0]
    };

    let code = match key_part {
        "Enter" => KeyCode::Enter,
        "Tab" => KeyCode::Tab,
        "Esc" => KeyCode::Esc,
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        "Backspace" => KeyCode::Backspace,
        "Delete" => KeyCode::Delete,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        s => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None, // Unknown key
            }
        }
    };

    Some(KeyEvent::new(code, modifiers))
}
