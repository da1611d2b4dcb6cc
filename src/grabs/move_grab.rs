use crate::binding::PointerButton;
use crate::geometry::Point;
use crate::grabs::{GrabOutcome, PointerGrab};
use crate::input::ButtonState;
use crate::seat::SeatId;
use crate::state::Shell;
use crate::surface::SurfaceId;
use crate::view::ViewId;

/// Drags a surface with the pointer: all of its per-output views move by
/// the pointer delta, and the first button release ends the drag.
pub struct MoveGrab {
    surface: SurfaceId,
    start: Point,
    initial_surface_pos: (i32, i32),
    initial_view_pos: Vec<(ViewId, Point)>,
}

impl MoveGrab {
    pub fn new(
        surface: SurfaceId,
        start: Point,
        initial_surface_pos: (i32, i32),
        initial_view_pos: Vec<(ViewId, Point)>,
    ) -> Self {
        Self {
            surface,
            start,
            initial_surface_pos,
            initial_view_pos,
        }
    }
}

impl PointerGrab for MoveGrab {
    fn motion(
        &mut self,
        shell: &mut Shell,
        seat: SeatId,
        _time: u32,
        x: f64,
        y: f64,
    ) -> GrabOutcome {
        shell.move_pointer(seat, x, y);

        let dx = x - self.start.x;
        let dy = y - self.start.y;
        for (view_id, origin) in &self.initial_view_pos {
            if let Some(view) = shell.comp.view_mut(*view_id) {
                view.pos = Point::new(origin.x + dx, origin.y + dy);
            }
        }
        if let Some(surface) = shell.comp.surface_mut(self.surface) {
            surface.x = self.initial_surface_pos.0 + dx.round() as i32;
            surface.y = self.initial_surface_pos.1 + dy.round() as i32;
        }
        GrabOutcome::Continue
    }

    fn button(
        &mut self,
        _shell: &mut Shell,
        _seat: SeatId,
        _time: u32,
        _button: PointerButton,
        state: ButtonState,
    ) -> GrabOutcome {
        match state {
            ButtonState::Released => GrabOutcome::End,
            ButtonState::Pressed => GrabOutcome::Continue,
        }
    }

    fn ended(&mut self, _shell: &mut Shell, seat: SeatId) {
        tracing::debug!(seat = seat.0, surface = self.surface.0, "move grab ended");
    }
}
