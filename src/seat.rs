use crate::binding::Modifiers;
use crate::grabs::PointerGrab;
use crate::output::OutputId;
use crate::surface::SurfaceId;
use crate::view::ViewId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeatId(pub u32);

/// Pointer state for one seat.
///
/// `grab` is the slot owning the active grab object; `grab_active` stays
/// true for the whole lifetime of a grab, including the instants during
/// dispatch when the box is temporarily out of the slot.
pub struct Pointer {
    pub x: f64,
    pub y: f64,
    pub focus: Option<ViewId>,
    pub current_output: Option<OutputId>,
    pub(crate) grab: Option<Box<dyn PointerGrab>>,
    pub(crate) grab_active: bool,
}

impl Default for Pointer {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            focus: None,
            current_output: None,
            grab: None,
            grab_active: false,
        }
    }
}

impl Pointer {
    pub fn is_grab_active(&self) -> bool {
        self.grab_active
    }
}

#[derive(Default)]
pub struct Keyboard {
    pub focus: Option<SurfaceId>,
    pub modifiers: Modifiers,
}

/// One input focus domain: a pointer and a keyboard that move together.
pub struct Seat {
    pub id: SeatId,
    pub pointer: Pointer,
    pub keyboard: Keyboard,
}

impl Seat {
    pub fn new(id: SeatId) -> Self {
        Self {
            id,
            pointer: Pointer::default(),
            keyboard: Keyboard::default(),
        }
    }
}
