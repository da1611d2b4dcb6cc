use std::collections::BTreeMap;

use crate::output::OutputId;
use crate::view::ViewId;
use crate::workspace::WorkspaceId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u32);

/// A connected client, identified by its process id for the kill
/// interaction.
#[derive(Clone, Copy, Debug)]
pub struct Client {
    pub id: ClientId,
    pub pid: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    Toplevel,
    Transient,
    Popup,
}

/// A mapped client window, independent of any particular output.
pub struct Surface {
    pub id: SurfaceId,
    pub client: ClientId,
    pub kind: SurfaceKind,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub fullscreen: bool,
    pub mapped: bool,
    pub workspace: Option<WorkspaceId>,
    /// One view per output the surface is shown on.
    pub views: BTreeMap<OutputId, ViewId>,
}

impl Surface {
    pub fn new(id: SurfaceId, client: ClientId, kind: SurfaceKind, width: i32, height: i32) -> Self {
        Self {
            id,
            client,
            kind,
            x: 0,
            y: 0,
            width,
            height,
            fullscreen: false,
            mapped: false,
            workspace: None,
            views: BTreeMap::new(),
        }
    }

    pub fn view_for_output(&self, output: OutputId) -> Option<ViewId> {
        self.views.get(&output).copied()
    }
}
