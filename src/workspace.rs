use std::collections::{HashMap, HashSet};

use crate::geometry::{Point, Rect};
use crate::output::OutputId;
use crate::transform::Transform;
use crate::view::ViewId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceId(pub u32);

impl WorkspaceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The per-output placement of a workspace: where it sits in the desktop
/// grid and how it is currently transformed.
pub struct WorkspaceView {
    /// Logical grid cell, used by the desktop-grid overview layout.
    pub grid_pos: (i32, i32),
    /// Plain position of the workspace on its output (output-local).
    pub pos: Point,
    pub transform: Transform,
    pub mask: Option<Rect>,
    views: HashSet<ViewId>,
}

impl WorkspaceView {
    fn new(grid_pos: (i32, i32)) -> Self {
        Self {
            grid_pos,
            pos: Point::default(),
            transform: Transform::IDENTITY,
            mask: None,
            views: HashSet::new(),
        }
    }

    pub fn add_view(&mut self, view: ViewId) {
        self.views.insert(view);
    }

    pub fn remove_view(&mut self, view: ViewId) {
        self.views.remove(&view);
    }

    pub fn owns_view(&self, view: ViewId) -> bool {
        self.views.contains(&view)
    }

    pub fn views(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.views.iter().copied()
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn set_mask(&mut self, mask: Rect) {
        self.mask = Some(mask);
    }

    pub fn reset_mask(&mut self) {
        self.mask = None;
    }

    /// True when no effect currently distorts this workspace view.
    pub fn is_neutral(&self) -> bool {
        self.transform.is_identity() && self.mask.is_none()
    }
}

/// A virtual desktop: a set of surfaces, placed once per output it has
/// been shown on.
pub struct Workspace {
    pub id: WorkspaceId,
    pub active: bool,
    views: HashMap<OutputId, WorkspaceView>,
}

impl Workspace {
    pub fn new(id: WorkspaceId) -> Self {
        Self {
            id,
            active: false,
            views: HashMap::new(),
        }
    }

    /// The workspace view for `output`, created on first use.
    ///
    /// Workspaces are laid out in a single row; the grid position is the
    /// workspace index.
    pub fn view_for_output(&mut self, output: OutputId) -> &mut WorkspaceView {
        let grid_pos = (self.id.0 as i32, 0);
        self.views
            .entry(output)
            .or_insert_with(|| WorkspaceView::new(grid_pos))
    }

    pub fn existing_view_for_output(&self, output: OutputId) -> Option<&WorkspaceView> {
        self.views.get(&output)
    }

    pub fn has_view_for_output(&self, output: OutputId) -> bool {
        self.views.contains_key(&output)
    }

    pub fn drop_view_for_output(&mut self, output: OutputId) {
        self.views.remove(&output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_view_created_lazily() {
        let mut ws = Workspace::new(WorkspaceId(2));
        let output = OutputId(0);
        assert!(!ws.has_view_for_output(output));
        let wsv = ws.view_for_output(output);
        assert_eq!(wsv.grid_pos, (2, 0));
        assert!(wsv.is_neutral());
        assert!(ws.has_view_for_output(output));
    }

    #[test]
    fn transform_and_mask_reset_to_neutral() {
        let mut ws = Workspace::new(WorkspaceId(0));
        let wsv = ws.view_for_output(OutputId(1));
        wsv.set_transform(Transform::from_scale(0.5, 0.5));
        wsv.set_mask(Rect::new(0, 0, 10, 10));
        assert!(!wsv.is_neutral());
        wsv.set_transform(Transform::IDENTITY);
        wsv.reset_mask();
        assert!(wsv.is_neutral());
    }

    #[test]
    fn view_membership() {
        let mut ws = Workspace::new(WorkspaceId(0));
        let wsv = ws.view_for_output(OutputId(0));
        wsv.add_view(ViewId(5));
        assert!(wsv.owns_view(ViewId(5)));
        wsv.remove_view(ViewId(5));
        assert!(!wsv.owns_view(ViewId(5)));
        // Removing twice is harmless.
        wsv.remove_view(ViewId(5));
    }
}
