//! Desktop-grid overview: shrinks every workspace of an output into a
//! grid of cells so one can be picked with the pointer.
//!
//! While the grid is up, a grab owns the pointer: motion just moves the
//! cursor over the immobile miniatures, a button release picks the
//! workspace under the cursor, and leaving the gridded outputs drops the
//! grab. Each participating output keeps its pre-grid transforms in
//! `DesktopGridState` so terminating restores them exactly.

use std::collections::HashMap;

use crate::binding::PointerButton;
use crate::cursor::CursorShape;
use crate::geometry::Rect;
use crate::grabs::{GrabOutcome, PointerGrab};
use crate::input::ButtonState;
use crate::output::OutputId;
use crate::seat::SeatId;
use crate::state::Shell;
use crate::transform::Transform;
use crate::view::ViewId;
use crate::workspace::WorkspaceId;

/// Cell spacing as a fraction of the output size.
const MARGIN_DIVISOR: i32 = 20;

/// Per-output grid state, keyed by stable output ids and dropped when an
/// output goes away, so a removed output can never leave a dangling
/// entry behind.
#[derive(Default)]
pub struct DesktopGridState {
    active: HashMap<OutputId, HashMap<WorkspaceId, Transform>>,
}

impl DesktopGridState {
    pub fn is_active_on(&self, output: OutputId) -> bool {
        self.active.contains_key(&output)
    }

    pub fn is_active(&self) -> bool {
        !self.active.is_empty()
    }
}

/// Toggles the grid on the seat's primary output.
pub fn run(shell: &mut Shell, seat: SeatId) {
    let Some(output) = shell.select_primary_output(Some(seat)) else {
        tracing::debug!("desktop grid ignored, no output");
        return;
    };
    if shell.desktop_grid.active.contains_key(&output) {
        terminate(shell, output, None);
        shell.end_grab(seat);
        return;
    }
    if shell.workspaces().is_empty() {
        return;
    }
    let Some(geometry) = shell.comp.output(output).map(|out| out.geometry) else {
        return;
    };

    let margin_w = geometry.width / MARGIN_DIVISOR;
    let margin_h = geometry.height / MARGIN_DIVISOR;

    // Union of all logical grid cells, anchored at the origin.
    let workspace_count = shell.workspaces().len();
    let mut full_rect = Rect::default();
    for index in 0..workspace_count {
        let (gx, gy) = shell.workspaces[index].view_for_output(output).grid_pos;
        let cell = Rect::new(
            (gx + 2) * margin_w + gx * geometry.width,
            (gy + 2) * margin_h + gy * geometry.height,
            geometry.width,
            geometry.height,
        );
        full_rect = full_rect.union(&cell);
    }
    let full_rect = full_rect.anchored_at_origin();
    if full_rect.is_empty() {
        return;
    }

    // Uniform scale preserving the output's aspect ratio; the shorter
    // axis gets centered with letterbox margins.
    let rx = geometry.width as f64 / full_rect.width as f64;
    let ry = geometry.height as f64 / full_rect.height as f64;
    let r = rx.min(ry);
    let (full_w, full_h) = if rx > ry {
        let ratio = geometry.width as f64 / geometry.height as f64;
        (full_rect.height as f64 * ratio, full_rect.height as f64)
    } else {
        let ratio = geometry.height as f64 / geometry.width as f64;
        (full_rect.width as f64, full_rect.width as f64 * ratio)
    };
    let margin_x = (full_w - full_rect.width as f64) / 2.0 * r;
    let margin_y = (full_h - full_rect.height as f64) / 2.0 * r;
    let cell_w = r * geometry.width as f64;
    let cell_h = r * geometry.height as f64;

    let mut saved = HashMap::new();
    for index in 0..workspace_count {
        let workspace_id = WorkspaceId(index as u32);
        let (grid_pos, wsv_pos, original) = {
            let wsv = shell.workspaces[index].view_for_output(output);
            (wsv.grid_pos, wsv.pos, wsv.transform)
        };
        let (gx, gy) = (grid_pos.0 as f64, grid_pos.1 as f64);
        let px = (gx * geometry.width as f64 + (gx + 1.0) * margin_w as f64) * r;
        let py = (gy * geometry.height as f64 + (gy + 1.0) * margin_h as f64) * r;

        // The transform maps global coordinates, so the output origin is
        // factored out before scaling and back in afterwards.
        let tx = geometry.x as f64 + px + margin_x - wsv_pos.x - geometry.x as f64 * r;
        let ty = geometry.y as f64 + py + margin_y - wsv_pos.y - geometry.y as f64 * r;
        let transform = Transform::from_translation(tx, ty) * Transform::from_scale(r, r);
        let mask = Rect::new(
            geometry.x + (px + margin_x).round() as i32,
            geometry.y + (py + margin_y).round() as i32,
            cell_w.round() as i32,
            cell_h.round() as i32,
        );

        saved.insert(workspace_id, original);
        apply_workspace_transform(shell, workspace_id, output, transform, Some(mask));
    }
    shell.desktop_grid.active.insert(output, saved);
    tracing::info!(
        output = output.0,
        workspaces = workspace_count,
        scale = r,
        "desktop grid activated"
    );

    shell.start_grab(seat, Box::new(GridGrab), CursorShape::Arrow);
}

/// Restores the pre-grid transforms on `output` and, when a workspace
/// was picked, activates it there.
pub(crate) fn terminate(shell: &mut Shell, output: OutputId, chosen: Option<WorkspaceId>) {
    let Some(saved) = shell.desktop_grid.active.remove(&output) else {
        return;
    };
    for (workspace_id, original) in saved {
        apply_workspace_transform(shell, workspace_id, output, original, None);
    }
    if let Some(workspace) = chosen
        && let Err(err) = shell.activate_workspace(workspace, output)
    {
        tracing::warn!("failed to activate picked workspace: {err}");
    }
    shell.refresh_output_visibility(output);
    tracing::info!(output = output.0, chosen = ?chosen.map(|w| w.0), "desktop grid terminated");
}

/// While the grid is up on an output, any seat whose pointer enters it
/// joins in with its own grab.
pub(crate) fn pointer_entered(shell: &mut Shell, seat: SeatId, output: OutputId) {
    if !shell.desktop_grid.is_active_on(output) {
        return;
    }
    if shell.is_grab_active(seat) {
        return;
    }
    shell.start_grab(seat, Box::new(GridGrab), CursorShape::Arrow);
}

/// Output teardown drops the grid state immediately rather than waiting
/// for the grab to end; the views it referenced are already gone.
pub(crate) fn output_removed(shell: &mut Shell, output: OutputId) {
    if shell.desktop_grid.active.remove(&output).is_some() {
        tracing::debug!(output = output.0, "dropped desktop grid state for removed output");
    }
}

fn apply_workspace_transform(
    shell: &mut Shell,
    workspace: WorkspaceId,
    output: OutputId,
    transform: Transform,
    mask: Option<Rect>,
) {
    let Some(entry) = shell.workspaces.get_mut(workspace.index()) else {
        return;
    };
    let wsv = entry.view_for_output(output);
    wsv.set_transform(transform);
    match mask {
        Some(mask) => wsv.set_mask(mask),
        None => wsv.reset_mask(),
    }
    let member_views: Vec<ViewId> = wsv.views().collect();
    let gridded = mask.is_some();
    for view_id in member_views {
        if let Some(view) = shell.comp.view_mut(view_id) {
            view.transform = transform;
            if gridded {
                // Every workspace's miniatures are pickable in the grid.
                view.hidden = false;
            }
        }
    }
}

struct GridGrab;

impl PointerGrab for GridGrab {
    fn focus(&mut self, shell: &mut Shell, seat: SeatId) -> GrabOutcome {
        let Some((x, y)) = shell.comp.seat(seat).map(|s| (s.pointer.x, s.pointer.y)) else {
            return GrabOutcome::End;
        };
        let inside = shell.desktop_grid.active.keys().any(|output| {
            shell
                .comp
                .output(*output)
                .is_some_and(|out| out.contains(x, y))
        });
        if inside {
            GrabOutcome::Continue
        } else {
            GrabOutcome::End
        }
    }

    fn motion(
        &mut self,
        shell: &mut Shell,
        seat: SeatId,
        _time: u32,
        x: f64,
        y: f64,
    ) -> GrabOutcome {
        // The miniatures stay put; only the cursor moves.
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
        if state != ButtonState::Released {
            return GrabOutcome::Continue;
        }
        let Some((x, y)) = shell.comp.seat(seat).map(|s| (s.pointer.x, s.pointer.y)) else {
            return GrabOutcome::End;
        };
        // A release over nothing ends the grab as a harmless miss.
        let Some(view) = shell.comp.pick_view(x, y) else {
            return GrabOutcome::End;
        };
        let Some(output) = shell.comp.view(view).map(|v| v.output) else {
            return GrabOutcome::End;
        };
        let chosen = shell.workspaces().iter().find_map(|workspace| {
            workspace
                .existing_view_for_output(output)
                .filter(|wsv| wsv.owns_view(view))
                .map(|_| workspace.id)
        });
        match chosen {
            Some(workspace) => {
                terminate(shell, output, Some(workspace));
                GrabOutcome::End
            }
            None => GrabOutcome::Continue,
        }
    }

    fn ended(&mut self, _shell: &mut Shell, seat: SeatId) {
        tracing::debug!(seat = seat.0, "desktop grid grab ended");
    }
}
