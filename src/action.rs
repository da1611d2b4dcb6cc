use crate::effects::desktop_grid;
use crate::seat::SeatId;
use crate::state::Shell;

/// Everything a key or button binding can trigger.
///
/// Actions run synchronously inside binding dispatch, on behalf of the
/// seat whose event matched.
#[derive(Clone, Debug)]
pub enum Action {
    GiveFocus,
    RaiseLower,
    MoveSurface,
    KillSurface,
    NextWorkspace,
    PrevWorkspace,
    ToggleDesktopGrid,
    /// Ends the grab on a specific seat; registered transiently by grabs
    /// that want an abort key.
    CancelGrab(SeatId),
}

impl Action {
    pub fn execute(self, shell: &mut Shell, seat: SeatId) {
        match self {
            Action::GiveFocus => shell.give_focus(seat),
            Action::RaiseLower => shell.raise(seat),
            Action::MoveSurface => shell.move_surface(seat),
            Action::KillSurface => shell.kill_surface(seat),
            Action::NextWorkspace => {
                let Some(output) = shell.select_primary_output(Some(seat)) else {
                    return;
                };
                if let Err(err) = shell.activate_next_workspace(output) {
                    tracing::warn!("failed to switch to next workspace: {err}");
                }
            }
            Action::PrevWorkspace => {
                let Some(output) = shell.select_primary_output(Some(seat)) else {
                    return;
                };
                if let Err(err) = shell.activate_prev_workspace(output) {
                    tracing::warn!("failed to switch to previous workspace: {err}");
                }
            }
            Action::ToggleDesktopGrid => desktop_grid::run(shell, seat),
            Action::CancelGrab(target) => shell.end_grab(target),
        }
    }
}
