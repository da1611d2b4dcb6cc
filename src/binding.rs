use bitflags::bitflags;

use crate::action::Action;

bitflags! {
    /// Held keyboard modifier mask.
    ///
    /// Bindings match against this with exact equality: a binding on
    /// `SUPER` does not fire while `SUPER | SHIFT` is held.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
    }
}

/// Evdev key codes for the keys the shell binds by default.
pub mod keys {
    pub const ESC: u32 = 1;
    pub const G: u32 = 34;
    pub const LEFT: u32 = 105;
    pub const RIGHT: u32 = 106;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
    Side,
    Extra,
    Forward,
    Back,
    Task,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub u32);

#[derive(Clone, Debug)]
pub struct KeyBinding {
    pub id: BindingId,
    pub modifiers: Modifiers,
    pub key: u32,
    pub action: Action,
}

impl KeyBinding {
    pub fn matches(&self, modifiers: Modifiers, key: u32) -> bool {
        self.modifiers == modifiers && self.key == key
    }
}

#[derive(Clone, Debug)]
pub struct ButtonBinding {
    pub id: BindingId,
    pub modifiers: Modifiers,
    pub button: PointerButton,
    pub action: Action,
}

impl ButtonBinding {
    pub fn matches(&self, modifiers: Modifiers, button: PointerButton) -> bool {
        self.modifiers == modifiers && self.button == button
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_binding_requires_exact_modifiers() {
        let binding = KeyBinding {
            id: BindingId(0),
            modifiers: Modifiers::SUPER,
            key: keys::G,
            action: Action::ToggleDesktopGrid,
        };
        assert!(binding.matches(Modifiers::SUPER, keys::G));
        assert!(!binding.matches(Modifiers::SUPER | Modifiers::SHIFT, keys::G));
        assert!(!binding.matches(Modifiers::empty(), keys::G));
    }
}
