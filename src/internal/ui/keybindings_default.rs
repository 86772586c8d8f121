use crate::internal::models::SortOrder;
use crate::internal::ui::app::Action;
use crate::internal::ui::keybindings::{KeyBindingContext, KeyBindingMap};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Create default keybindings for the application
pub fn create_default_keybindings() -> KeyBindingMap {
    let mut map = KeyBindingMap::new();

    // Stack-level bindings (checked before any page table)
    add_global_bindings(&mut map);

    // Page-specific bindings
    add_listing_bindings(&mut map);
    add_detail_bindings(&mut map);
    add_thread_bindings(&mut map);

    map
}

fn add_global_bindings(map: &mut KeyBindingMap) {
    let ctx = KeyBindingContext::Global;

    map.add_binding(ctx, key('q'), Action::Quit);
    map.add_binding(ctx, key('r'), Action::Reload);
    map.add_binding(ctx, key(':'), Action::EnterCommand);

    // Back
    map.add_binding(ctx, key_code(KeyCode::Left), Action::Back);
    map.add_binding(ctx, key_code(KeyCode::Backspace), Action::Back);
}

fn add_sort_bindings(map: &mut KeyBindingMap, ctx: KeyBindingContext) {
    map.add_binding(ctx, key('h'), Action::Sort(SortOrder::Hot));
    map.add_binding(ctx, key('n'), Action::Sort(SortOrder::New));
    map.add_binding(ctx, key('t'), Action::Sort(SortOrder::Top));
}

fn add_listing_bindings(map: &mut KeyBindingMap) {
    let ctx = KeyBindingContext::Listing;

    // Navigation
    map.add_binding(ctx, key_code(KeyCode::Up), Action::NavigateUp);
    map.add_binding(ctx, key_code(KeyCode::Down), Action::NavigateDown);
    map.add_binding(ctx, key('k'), Action::NavigateUp);
    map.add_binding(ctx, key('j'), Action::NavigateDown);

    // Collections
    map.add_binding(ctx, key_code(KeyCode::PageDown), Action::NextCollection);
    map.add_binding(ctx, key_code(KeyCode::PageUp), Action::PrevCollection);

    // Open item
    map.add_binding(ctx, key_code(KeyCode::Right), Action::Open);
    map.add_binding(ctx, key_code(KeyCode::Enter), Action::Open);

    add_sort_bindings(map, ctx);
}

fn add_detail_bindings(map: &mut KeyBindingMap) {
    let ctx = KeyBindingContext::Detail;

    // Scrolling
    map.add_binding(ctx, key_code(KeyCode::PageDown), Action::ScrollDown);
    map.add_binding(ctx, key_code(KeyCode::PageUp), Action::ScrollUp);
    map.add_binding(ctx, key('j'), Action::ScrollDown);
    map.add_binding(ctx, key('k'), Action::ScrollUp);

    // Root comments
    map.add_binding(ctx, key_code(KeyCode::Right), Action::Open);
    map.add_binding(ctx, key_code(KeyCode::Enter), Action::Open);

    add_sort_bindings(map, ctx);
}

fn add_thread_bindings(map: &mut KeyBindingMap) {
    let ctx = KeyBindingContext::Thread;

    // Siblings
    map.add_binding(ctx, key_code(KeyCode::Up), Action::NavigateUp);
    map.add_binding(ctx, key_code(KeyCode::Down), Action::NavigateDown);

    // Scrolling
    map.add_binding(ctx, key_code(KeyCode::PageDown), Action::ScrollDown);
    map.add_binding(ctx, key_code(KeyCode::PageUp), Action::ScrollUp);
    map.add_binding(ctx, key('j'), Action::ScrollDown);
    map.add_binding(ctx, key('k'), Action::ScrollUp);

    // Replies
    map.add_binding(ctx, key_code(KeyCode::Right), Action::Open);
    map.add_binding(ctx, key_code(KeyCode::Enter), Action::Open);
}

// Helper functions

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::empty())
}

fn key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::empty())
}
