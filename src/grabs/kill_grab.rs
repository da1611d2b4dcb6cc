use crate::binding::{BindingId, PointerButton};
use crate::grabs::{GrabOutcome, PointerGrab};
use crate::input::ButtonState;
use crate::seat::SeatId;
use crate::state::Shell;

/// Click-to-kill: the next button press picks the view under the cursor
/// and force-terminates the owning client's process, then the grab ends.
///
/// The shell's own process is never killed. A transient Escape binding
/// cancels the grab without killing anything; it is registered by
/// [`Shell::kill_surface`] and removed here when the grab ends.
pub struct KillGrab {
    abort_binding: BindingId,
}

impl KillGrab {
    pub fn new(abort_binding: BindingId) -> Self {
        Self { abort_binding }
    }
}

impl PointerGrab for KillGrab {
    fn motion(
        &mut self,
        shell: &mut Shell,
        seat: SeatId,
        _time: u32,
        x: f64,
        y: f64,
    ) -> GrabOutcome {
        shell.move_pointer(seat, x, y);
        GrabOutcome::Continue
    }

    fn button(
        &mut self,
        shell: &mut Shell,
        seat: SeatId,
        _time: u32,
        _button: PointerButton,
        state: ButtonState,
    ) -> GrabOutcome {
        if state != ButtonState::Pressed {
            return GrabOutcome::Continue;
        }

        let Some(pointer) = shell.comp.seat(seat).map(|s| (s.pointer.x, s.pointer.y)) else {
            return GrabOutcome::End;
        };
        // A miss ends the grab without killing anything.
        let Some(view) = shell.comp.pick_view(pointer.0, pointer.1) else {
            return GrabOutcome::End;
        };
        let pid = shell
            .comp
            .view(view)
            .and_then(|view| shell.comp.surface(view.surface))
            .and_then(|surface| shell.comp.client(surface.client))
            .map(|client| client.pid);

        if let Some(pid) = pid {
            if pid == shell.comp.own_pid() {
                tracing::debug!(pid, "refusing to kill own process");
            } else {
                tracing::info!(pid, "killing client under cursor");
                shell.terminate_process(pid);
            }
        }
        GrabOutcome::End
    }

    fn ended(&mut self, shell: &mut Shell, _seat: SeatId) {
        shell.remove_binding(self.abort_binding);
    }
}
