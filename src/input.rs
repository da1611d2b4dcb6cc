//! Raw input dispatch: the seam between seat events and shell policy.
//!
//! Events for a seat with an active grab are routed to the grab; anything
//! else goes through pointer focus tracking and binding dispatch.

use crate::binding::{Modifiers, PointerButton};
use crate::effects::desktop_grid;
use crate::seat::SeatId;
use crate::state::Shell;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

impl Shell {
    pub fn pointer_motion(&mut self, seat: SeatId, time: u32, x: f64, y: f64) {
        if self.comp.seat(seat).is_none() {
            tracing::warn!(seat = seat.0, "pointer motion for unknown seat");
            return;
        }

        if let Some(mut grab) = self.take_grab(seat) {
            let outcome = grab.motion(self, seat, time, x, y);
            self.finish_grab_dispatch(seat, grab, outcome);
            // Grabs poll focus themselves instead of focus tracking.
            self.dispatch_grab_focus(seat);
            return;
        }

        self.move_pointer(seat, x, y);
        self.refresh_pointer_focus(seat);
    }

    pub fn pointer_button(
        &mut self,
        seat: SeatId,
        time: u32,
        button: PointerButton,
        state: ButtonState,
    ) {
        if self.comp.seat(seat).is_none() {
            tracing::warn!(seat = seat.0, "pointer button for unknown seat");
            return;
        }

        if let Some(mut grab) = self.take_grab(seat) {
            let outcome = grab.button(self, seat, time, button, state);
            self.finish_grab_dispatch(seat, grab, outcome);
            return;
        }

        if state != ButtonState::Pressed {
            return;
        }
        let modifiers = self.seat_modifiers(seat);
        if let Some(action) = self.button_action_for(modifiers, button) {
            action.execute(self, seat);
        }
        // Delivering unmatched button events to the client under the
        // pointer is the protocol layer's job.
    }

    /// Key bindings dispatch even while a pointer grab is active; the
    /// kill grab's Escape abort depends on that.
    pub fn key(&mut self, seat: SeatId, _time: u32, key: u32, state: KeyState) {
        if self.comp.seat(seat).is_none() {
            tracing::warn!(seat = seat.0, "key event for unknown seat");
            return;
        }
        if state != KeyState::Pressed {
            return;
        }
        let modifiers = self.seat_modifiers(seat);
        if let Some(action) = self.key_action_for(modifiers, key) {
            action.execute(self, seat);
        }
    }

    pub fn set_keyboard_modifiers(&mut self, seat: SeatId, modifiers: Modifiers) {
        if let Some(seat) = self.comp.seat_mut(seat) {
            seat.keyboard.modifiers = modifiers;
        }
    }

    fn seat_modifiers(&self, seat: SeatId) -> Modifiers {
        self.comp
            .seat(seat)
            .map(|s| s.keyboard.modifiers)
            .unwrap_or_default()
    }

    /// Moves the pointer and handles output crossings, without touching
    /// focus. Grab `motion` handlers call this to keep the cursor
    /// moving while they own the seat.
    pub fn move_pointer(&mut self, seat: SeatId, x: f64, y: f64) {
        let entered = {
            let new_output = self.comp.output_at(x, y);
            let Some(s) = self.comp.seat_mut(seat) else {
                return;
            };
            s.pointer.x = x;
            s.pointer.y = y;
            if new_output != s.pointer.current_output {
                s.pointer.current_output = new_output;
                new_output
            } else {
                None
            }
        };
        if let Some(output) = entered {
            desktop_grid::pointer_entered(self, seat, output);
        }
    }

    /// Recomputes the pointer focus from the view under the cursor.
    /// Suspended while a grab is active: the grab's own `focus` polling
    /// replaces it.
    pub(crate) fn refresh_pointer_focus(&mut self, seat: SeatId) {
        let Some(s) = self.comp.seat(seat) else {
            return;
        };
        if s.pointer.grab_active {
            return;
        }
        let picked = self.comp.pick_view(s.pointer.x, s.pointer.y);
        if let Some(s) = self.comp.seat_mut(seat) {
            s.pointer.focus = picked;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::keys;
    use crate::config::Config;
    use crate::geometry::Rect;
    use crate::surface::SurfaceKind;

    #[test]
    fn motion_updates_focus_and_output() {
        let mut shell = Shell::new(Config::default());
        let output = shell.output_added(Rect::new(0, 0, 800, 600));
        shell.create_workspace();
        let seat = shell.comp.create_seat();
        let client = shell.client_connected(1000);
        let surface = shell.create_surface(client, SurfaceKind::Toplevel, 200, 200);
        shell.configure(surface);

        shell.pointer_motion(seat, 0, 100.0, 100.0);
        let pointer = &shell.comp.seat(seat).unwrap().pointer;
        assert_eq!(pointer.current_output, Some(output));
        let view = shell.comp.surface(surface).unwrap().view_for_output(output);
        assert_eq!(pointer.focus, view);

        shell.pointer_motion(seat, 1, 700.0, 500.0);
        assert_eq!(shell.comp.seat(seat).unwrap().pointer.focus, None);
    }

    #[test]
    fn first_matching_binding_wins() {
        let mut shell = Shell::new(Config::default());
        shell.output_added(Rect::new(0, 0, 800, 600));
        for _ in 0..2 {
            shell.create_workspace();
        }
        let seat = shell.comp.create_seat();
        // Two bindings on the same combo: registration order decides.
        shell.add_key_binding(
            Modifiers::CTRL,
            keys::G,
            crate::action::Action::NextWorkspace,
        );
        shell.add_key_binding(
            Modifiers::CTRL,
            keys::G,
            crate::action::Action::PrevWorkspace,
        );
        shell.set_keyboard_modifiers(seat, Modifiers::CTRL);
        shell.key(seat, 0, keys::G, KeyState::Pressed);
        let output = shell.comp.output_ids()[0];
        assert_eq!(
            shell.comp.output(output).unwrap().current_workspace,
            Some(crate::workspace::WorkspaceId(1)),
            "the earlier-registered next-workspace binding fired"
        );
    }

    #[test]
    fn key_release_does_not_dispatch() {
        let mut shell = Shell::new(Config::default());
        shell.output_added(Rect::new(0, 0, 800, 600));
        for _ in 0..2 {
            shell.create_workspace();
        }
        let seat = shell.comp.create_seat();
        shell.set_keyboard_modifiers(seat, Modifiers::CTRL);
        shell.key(seat, 0, keys::RIGHT, KeyState::Released);
        let output = shell.comp.output_ids()[0];
        assert_eq!(
            shell.comp.output(output).unwrap().current_workspace,
            Some(crate::workspace::WorkspaceId(0))
        );
    }
}
