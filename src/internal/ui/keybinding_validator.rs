use crate::config::KeyBindingConfig;
use crate::internal::ui::app::Action;
use crate::internal::ui::keybindings::{KeyBindingMap, parse_key_str};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ConflictReport {
    pub description: String,
    pub keys: String,
    pub context: String,
}

/// Lists configured page bindings that can never fire because the same key
/// is bound at stack level in `bindings`, the merged defaults and overrides.
/// Keys are compared after parsing, so spelling differences do not matter.
pub fn detect_conflicts(bindings: &KeyBindingMap, config: &KeyBindingConfig) -> Vec<ConflictReport> {
    let mut conflicts = Vec::new();

    let mut check_context = |context_name: &str, page_bindings: &HashMap<String, Action>| {
        for (key, action) in page_bindings {
            let Some(event) = parse_key_str(key) else {
                continue;
            };
            if let Some(global_action) = bindings.global_action(&event)
                && global_action != *action
            {
                conflicts.push(ConflictReport {
                    description: format!(
                        "{} key '{}' is hidden by Global key (Global: {:?}, {}: {:?})",
                        context_name, key, global_action, context_name, action
                    ),
                    keys: key.clone(),
                    context: context_name.to_string(),
                });
            }
        }
    };

    check_context("Listing", &config.listing);
    check_context("Item Detail", &config.detail);
    check_context("Comment Thread", &config.thread);

    conflicts.sort_by(|a, b| (&a.context, &a.keys).cmp(&(&b.context, &b.keys)));
    conflicts
}
