//! Keyboard shortcuts
//!
//! Key chords are written like `Ctrl+Shift+Tab` and matched without regard
//! to case or modifier order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Something the user can trigger from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    NewTab,
    CloseTab,
    NextTab,
    PreviousTab,
    Reload,
    FocusAddressBar,
    ToggleDevTools,
    Back,
    Forward,
    Home,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

const DEFAULT_BINDINGS: &[(&str, Action)] = &[
    ("Ctrl+T", Action::NewTab),
    ("Ctrl+W", Action::CloseTab),
    ("Ctrl+Tab", Action::NextTab),
    ("Ctrl+Shift+Tab", Action::PreviousTab),
    ("F5", Action::Reload),
    ("Ctrl+R", Action::Reload),
    ("Ctrl+L", Action::FocusAddressBar),
    ("F12", Action::ToggleDevTools),
    ("Ctrl+Shift+I", Action::ToggleDevTools),
    ("Alt+Left", Action::Back),
    ("Alt+Right", Action::Forward),
    ("Alt+Home", Action::Home),
    ("Ctrl+Plus", Action::ZoomIn),
    ("Ctrl+=", Action::ZoomIn),
    ("Ctrl+Minus", Action::ZoomOut),
    ("Ctrl+0", Action::ZoomReset),
];

const MODIFIERS: [&str; 4] = ["ctrl", "alt", "shift", "meta"];

/// Canonical spelling of a key chord: lowercase, modifiers first in a fixed order.
pub fn normalize_keys(keys: &str) -> String {
    let mut modifiers = Vec::new();
    let mut rest = Vec::new();

    for part in keys.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        let part = part.to_lowercase();
        match MODIFIERS.iter().position(|m| *m == part) {
            Some(rank) => modifiers.push((rank, part)),
            None => rest.push(part),
        }
    }

    modifiers.sort();
    modifiers.dedup();

    modifiers
        .into_iter()
        .map(|(_, m)| m)
        .chain(rest)
        .collect::<Vec<_>>()
        .join("+")
}

/// Mapping from key chords to actions. A chord triggers at most one action;
/// an action may have several chords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Action>",
    into = "BTreeMap<String, Action>"
)]
pub struct Keymap {
    bindings: BTreeMap<String, Action>,
}

impl Keymap {
    /// A keymap with nothing bound
    pub fn empty() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Bind a chord, replacing whatever it triggered before.
    pub fn bind(&mut self, keys: &str, action: Action) -> Option<Action> {
        let keys = normalize_keys(keys);
        if keys.is_empty() {
            return None;
        }
        tracing::debug!(keys = %keys, action = ?action, "Bound key");
        self.bindings.insert(keys, action)
    }

    pub fn unbind(&mut self, keys: &str) -> Option<Action> {
        self.bindings.remove(&normalize_keys(keys))
    }

    pub fn action_for(&self, keys: &str) -> Option<Action> {
        self.bindings.get(&normalize_keys(keys)).copied()
    }

    /// Normalized chords bound to an action
    pub fn bindings_for(&self, action: Action) -> Vec<&str> {
        self.bindings
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(keys, _)| keys.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        let mut keymap = Self::empty();
        for (keys, action) in DEFAULT_BINDINGS {
            keymap.bind(keys, *action);
        }
        keymap
    }
}

impl From<BTreeMap<String, Action>> for Keymap {
    fn from(raw: BTreeMap<String, Action>) -> Self {
        let mut keymap = Self::empty();
        for (keys, action) in raw {
            keymap.bind(&keys, action);
        }
        keymap
    }
}

impl From<Keymap> for BTreeMap<String, Action> {
    fn from(keymap: Keymap) -> Self {
        keymap.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keys() {
        assert_eq!(normalize_keys("Ctrl+Shift+Tab"), "ctrl+shift+tab");
        assert_eq!(normalize_keys("shift + CTRL + tab"), "ctrl+shift+tab");
        assert_eq!(normalize_keys("F5"), "f5");
        assert_eq!(normalize_keys("Ctrl+="), "ctrl+=");
        assert_eq!(normalize_keys(""), "");
    }

    #[test]
    fn test_default_bindings() {
        let keymap = Keymap::default();

        assert_eq!(keymap.action_for("Ctrl+T"), Some(Action::NewTab));
        assert_eq!(keymap.action_for("ctrl+w"), Some(Action::CloseTab));
        assert_eq!(keymap.action_for("Ctrl+Tab"), Some(Action::NextTab));
        assert_eq!(keymap.action_for("Shift+Ctrl+Tab"), Some(Action::PreviousTab));
        assert_eq!(keymap.action_for("Ctrl+L"), Some(Action::FocusAddressBar));
        assert_eq!(keymap.action_for("Alt+Home"), Some(Action::Home));
        assert_eq!(keymap.action_for("Ctrl+0"), Some(Action::ZoomReset));
        assert_eq!(keymap.action_for("Ctrl+Q"), None);

        assert_eq!(keymap.bindings_for(Action::Reload), vec!["ctrl+r", "f5"]);
        assert_eq!(
            keymap.bindings_for(Action::ToggleDevTools),
            vec!["ctrl+shift+i", "f12"]
        );
        assert_eq!(keymap.bindings_for(Action::ZoomIn).len(), 2);
    }

    #[test]
    fn test_rebinding_replaces_previous_action() {
        let mut keymap = Keymap::default();

        let previous = keymap.bind("CTRL+t", Action::Reload);
        assert_eq!(previous, Some(Action::NewTab));
        assert_eq!(keymap.action_for("Ctrl+T"), Some(Action::Reload));
        assert!(keymap.bindings_for(Action::NewTab).is_empty());

        assert_eq!(keymap.unbind("Ctrl+T"), Some(Action::Reload));
        assert_eq!(keymap.action_for("Ctrl+T"), None);
    }

    #[test]
    fn test_deserialize_normalizes_keys() {
        let keymap: Keymap =
            serde_json::from_str(r#"{ "Alt+Shift+N": "new_tab", "F5": "reload" }"#).unwrap();

        assert_eq!(keymap.len(), 2);
        assert_eq!(keymap.action_for("shift+alt+n"), Some(Action::NewTab));

        let json = serde_json::to_value(&keymap).unwrap();
        assert_eq!(json["alt+shift+n"], "new_tab");
    }
}
