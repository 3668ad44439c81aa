use sketch_core::InteractionMode;
use std::cell::Cell;

/// Keyboard shortcuts handled while a sketch is mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    TogglePlay,
    TogglePanel,
    /// Enter the mode, or fall back to orbit if it is already active.
    ToggleMode(InteractionMode),
    SaveCamera,
    LoadCamera,
}

#[inline]
pub fn action_for_key(key: &str) -> Option<KeyAction> {
    match key {
        " " | "Spacebar" => Some(KeyAction::TogglePlay),
        "h" | "H" => Some(KeyAction::TogglePanel),
        "w" | "W" => Some(KeyAction::ToggleMode(InteractionMode::Wobble)),
        "r" | "R" => Some(KeyAction::ToggleMode(InteractionMode::RayCast)),
        "o" | "O" => Some(KeyAction::ToggleMode(InteractionMode::Orbit)),
        "s" | "S" => Some(KeyAction::SaveCamera),
        "l" | "L" => Some(KeyAction::LoadCamera),
        _ => None,
    }
}

/// Mode after pressing the toggle for `requested` while in `current`.
#[inline]
pub fn toggled_mode(current: InteractionMode, requested: InteractionMode) -> InteractionMode {
    if current == requested {
        InteractionMode::Orbit
    } else {
        requested
    }
}

/// Which mounted sketch keyboard shortcuts belong to. Listeners sit on the
/// document, so every mount sees every key; a sketch only acts while the
/// pointer is over its container or focus is inside it.
#[derive(Debug, Default)]
pub struct ShortcutScope {
    hovered: Cell<bool>,
}

impl ShortcutScope {
    pub fn enter(&self) {
        self.hovered.set(true);
    }

    pub fn leave(&self) {
        self.hovered.set(false);
    }

    #[inline]
    pub fn accepts(&self, focus_inside: bool) -> bool {
        focus_inside || self.hovered.get()
    }
}
