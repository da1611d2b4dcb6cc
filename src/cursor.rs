use crate::seat::SeatId;

/// Cursor images a grab can request while it owns a pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorShape {
    Arrow,
    Move,
    Kill,
    Busy,
}

/// Front-end hook rendering grab-specific cursors.
///
/// The shell itself does not draw anything; whoever composes the shell
/// installs one of these so the UI can swap the cursor image while a
/// grab is active. Both calls are balanced: every `set_grab_cursor` is
/// followed by exactly one `unset_grab_cursor` for that seat when the
/// grab ends.
pub trait GrabCursorHandler {
    fn set_grab_cursor(&mut self, seat: SeatId, cursor: CursorShape);
    fn unset_grab_cursor(&mut self, seat: SeatId);
}
