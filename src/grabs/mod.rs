pub mod kill_grab;
pub mod move_grab;

use crate::binding::PointerButton;
use crate::input::ButtonState;
use crate::seat::SeatId;
use crate::state::Shell;

pub use kill_grab::KillGrab;
pub use move_grab::MoveGrab;

/// What a grab callback wants to happen to the grab afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrabOutcome {
    Continue,
    End,
}

/// A modal claim on one seat's pointer.
///
/// While a grab is installed, every pointer event for its seat is routed
/// to these callbacks instead of the normal focus/binding dispatch, and
/// `focus` is polled after motion in place of pointer focus tracking.
///
/// Lifecycle contract: the seat's pointer slot owns the grab;
/// `ended` runs exactly once, when the grab leaves the slot. Callbacks
/// signal termination by returning [`GrabOutcome::End`] — they must not
/// call [`Shell::end_grab`] on their own seat, since the grab is out of
/// the slot while its callbacks run. External code (bindings, a
/// superseding grab) ends a grab through [`Shell::end_grab`].
pub trait PointerGrab {
    fn focus(&mut self, _shell: &mut Shell, _seat: SeatId) -> GrabOutcome {
        GrabOutcome::Continue
    }

    fn motion(&mut self, shell: &mut Shell, seat: SeatId, time: u32, x: f64, y: f64)
    -> GrabOutcome;

    fn button(
        &mut self,
        shell: &mut Shell,
        seat: SeatId,
        time: u32,
        button: PointerButton,
        state: ButtonState,
    ) -> GrabOutcome;

    fn ended(&mut self, _shell: &mut Shell, _seat: SeatId) {}
}
