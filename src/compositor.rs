use std::collections::BTreeMap;

use crate::geometry::{Point, Rect};
use crate::layer::{Layer, LayerKind};
use crate::output::{Output, OutputId};
use crate::seat::{Seat, SeatId};
use crate::surface::{Client, ClientId, Surface, SurfaceId, SurfaceKind};
use crate::view::{View, ViewId};

/// The logical compositor registry: every output, seat, client, surface
/// and view, plus the four global stacking layers.
///
/// Everything is keyed by small monotonic ids, so iteration order is
/// creation order and all cross-references in the shell are ids rather
/// than pointers.
pub struct Compositor {
    outputs: BTreeMap<OutputId, Output>,
    seats: BTreeMap<SeatId, Seat>,
    clients: BTreeMap<ClientId, Client>,
    surfaces: BTreeMap<SurfaceId, Surface>,
    views: BTreeMap<ViewId, View>,
    background_layer: Layer,
    apps_layer: Layer,
    panels_layer: Layer,
    overlay_layer: Layer,
    serial: u32,
    own_pid: u32,
    next_output: u32,
    next_seat: u32,
    next_client: u32,
    next_surface: u32,
    next_view: u32,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            outputs: BTreeMap::new(),
            seats: BTreeMap::new(),
            clients: BTreeMap::new(),
            surfaces: BTreeMap::new(),
            views: BTreeMap::new(),
            background_layer: Layer::new(),
            apps_layer: Layer::new(),
            panels_layer: Layer::new(),
            overlay_layer: Layer::new(),
            serial: 0,
            own_pid: std::process::id(),
            next_output: 0,
            next_seat: 0,
            next_client: 0,
            next_surface: 0,
            next_view: 0,
        }
    }

    pub fn next_serial(&mut self) -> u32 {
        self.serial = self.serial.wrapping_add(1);
        self.serial
    }

    pub fn own_pid(&self) -> u32 {
        self.own_pid
    }

    // Outputs

    pub fn create_output(&mut self, geometry: Rect) -> OutputId {
        let id = OutputId(self.next_output);
        self.next_output += 1;
        self.outputs.insert(id, Output::new(id, geometry));
        id
    }

    pub fn remove_output(&mut self, id: OutputId) -> Option<Output> {
        self.outputs.remove(&id)
    }

    pub fn output(&self, id: OutputId) -> Option<&Output> {
        self.outputs.get(&id)
    }

    pub fn output_mut(&mut self, id: OutputId) -> Option<&mut Output> {
        self.outputs.get_mut(&id)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.outputs.values()
    }

    pub fn outputs_mut(&mut self) -> impl Iterator<Item = &mut Output> {
        self.outputs.values_mut()
    }

    pub fn output_ids(&self) -> Vec<OutputId> {
        self.outputs.keys().copied().collect()
    }

    pub fn output_at(&self, x: f64, y: f64) -> Option<OutputId> {
        self.outputs
            .values()
            .find(|output| output.contains(x, y))
            .map(|output| output.id)
    }

    // Seats

    pub fn create_seat(&mut self) -> SeatId {
        let id = SeatId(self.next_seat);
        self.next_seat += 1;
        self.seats.insert(id, Seat::new(id));
        id
    }

    pub fn seat(&self, id: SeatId) -> Option<&Seat> {
        self.seats.get(&id)
    }

    pub fn seat_mut(&mut self, id: SeatId) -> Option<&mut Seat> {
        self.seats.get_mut(&id)
    }

    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.values()
    }

    pub fn seat_ids(&self) -> Vec<SeatId> {
        self.seats.keys().copied().collect()
    }

    // Clients

    pub fn create_client(&mut self, pid: u32) -> ClientId {
        let id = ClientId(self.next_client);
        self.next_client += 1;
        self.clients.insert(id, Client { id, pid });
        id
    }

    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn remove_client(&mut self, id: ClientId) -> Option<Client> {
        self.clients.remove(&id)
    }

    // Surfaces

    pub fn create_surface(
        &mut self,
        client: ClientId,
        kind: SurfaceKind,
        width: i32,
        height: i32,
    ) -> SurfaceId {
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.surfaces
            .insert(id, Surface::new(id, client, kind, width, height));
        id
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces.get_mut(&id)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.values()
    }

    pub fn surface_ids(&self) -> Vec<SurfaceId> {
        self.surfaces.keys().copied().collect()
    }

    pub fn remove_surface(&mut self, id: SurfaceId) -> Option<Surface> {
        self.surfaces.remove(&id)
    }

    // Views

    pub fn create_view(&mut self, surface: SurfaceId, output: OutputId, pos: Point) -> ViewId {
        let id = ViewId(self.next_view);
        self.next_view += 1;
        self.views.insert(id, View::new(id, surface, output, pos));
        if let Some(surface) = self.surfaces.get_mut(&surface) {
            surface.views.insert(output, id);
        }
        id
    }

    /// Drops a view, unlinking it from its layer and surface. Safe to
    /// call for an already removed view.
    pub fn remove_view(&mut self, id: ViewId) {
        let Some(view) = self.views.remove(&id) else {
            return;
        };
        if let Some(kind) = view.layer {
            self.layer_mut(kind).remove(id);
        }
        if let Some(surface) = self.surfaces.get_mut(&view.surface) {
            surface.views.remove(&view.output);
        }
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.get(&id)
    }

    pub fn view_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.views.get_mut(&id)
    }

    pub fn views_on_output(&self, output: OutputId) -> Vec<ViewId> {
        self.views
            .values()
            .filter(|view| view.output == output)
            .map(|view| view.id)
            .collect()
    }

    // Layers

    pub fn layer(&self, kind: LayerKind) -> &Layer {
        match kind {
            LayerKind::Background => &self.background_layer,
            LayerKind::Apps => &self.apps_layer,
            LayerKind::Panels => &self.panels_layer,
            LayerKind::Overlay => &self.overlay_layer,
        }
    }

    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut Layer {
        match kind {
            LayerKind::Background => &mut self.background_layer,
            LayerKind::Apps => &mut self.apps_layer,
            LayerKind::Panels => &mut self.panels_layer,
            LayerKind::Overlay => &mut self.overlay_layer,
        }
    }

    /// Stacks a view into `kind`, unlinking it from its previous layer
    /// first so a view is never in two layers at once.
    pub fn stack_view(&mut self, view: ViewId, kind: LayerKind) {
        let Some(entry) = self.views.get_mut(&view) else {
            return;
        };
        let previous = entry.layer.take();
        if let Some(previous) = previous {
            self.layer_mut(previous).remove(view);
        }
        self.layer_mut(kind).add(view);
        if let Some(v) = self.views.get_mut(&view) {
            v.layer = Some(kind);
        }
    }

    pub fn unstack_view(&mut self, view: ViewId) {
        let Some(kind) = self.views.get_mut(&view).and_then(|v| v.layer.take()) else {
            return;
        };
        self.layer_mut(kind).remove(view);
    }

    pub fn raise_view_on_top(&mut self, view: ViewId) {
        if let Some(kind) = self.views.get(&view).and_then(|v| v.layer) {
            self.layer_mut(kind).raise_on_top(view);
        }
    }

    pub fn lower_view(&mut self, view: ViewId) {
        if let Some(kind) = self.views.get(&view).and_then(|v| v.layer) {
            self.layer_mut(kind).lower(view);
        }
    }

    pub fn is_top_view(&self, view: ViewId) -> bool {
        self.views
            .get(&view)
            .and_then(|v| v.layer)
            .is_some_and(|kind| self.layer(kind).top_view() == Some(view))
    }

    // Hit testing

    /// The topmost visible view under the given point, searching the
    /// layers top-down.
    pub fn pick_view(&self, x: f64, y: f64) -> Option<ViewId> {
        for kind in LayerKind::TOP_DOWN {
            for id in self.layer(kind).iter_front_to_back() {
                let Some(view) = self.views.get(&id) else {
                    continue;
                };
                if view.hidden {
                    continue;
                }
                if self.view_contains(view, x, y) {
                    return Some(id);
                }
            }
        }
        None
    }

    fn view_contains(&self, view: &View, x: f64, y: f64) -> bool {
        let Some(surface) = self.surfaces.get(&view.surface) else {
            return false;
        };
        let origin = view.transform.apply(view.pos);
        let width = surface.width as f64 * view.transform.sx;
        let height = surface.height as f64 * view.transform.sy;
        x >= origin.x && y >= origin.y && x < origin.x + width && y < origin.y + height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    fn compositor_with_surface() -> (Compositor, SurfaceId, ViewId) {
        let mut comp = Compositor::new();
        let output = comp.create_output(Rect::new(0, 0, 1920, 1080));
        let client = comp.create_client(4242);
        let surface = comp.create_surface(client, SurfaceKind::Toplevel, 400, 300);
        let view = comp.create_view(surface, output, Point::new(100.0, 100.0));
        comp.stack_view(view, LayerKind::Apps);
        (comp, surface, view)
    }

    #[test]
    fn pick_view_hits_topmost() {
        let (mut comp, surface, view) = compositor_with_surface();
        let output = comp.view(view).unwrap().output;
        let other = comp.create_view(surface, output, Point::new(100.0, 100.0));
        comp.stack_view(other, LayerKind::Apps);
        assert_eq!(comp.pick_view(150.0, 150.0), Some(other));
        comp.raise_view_on_top(view);
        assert_eq!(comp.pick_view(150.0, 150.0), Some(view));
        assert_eq!(comp.pick_view(50.0, 50.0), None);
    }

    #[test]
    fn pick_view_skips_hidden_views() {
        let (mut comp, _surface, view) = compositor_with_surface();
        comp.view_mut(view).unwrap().hidden = true;
        assert_eq!(comp.pick_view(150.0, 150.0), None);
    }

    #[test]
    fn pick_view_honors_transforms() {
        let (mut comp, _surface, view) = compositor_with_surface();
        // Shrink to a quarter and move to the origin corner.
        comp.view_mut(view).unwrap().transform =
            Transform::from_translation(0.0, 0.0) * Transform::from_scale(0.25, 0.25);
        // Untransformed position no longer hits.
        assert_eq!(comp.pick_view(300.0, 200.0), None);
        // 100 * 0.25 = 25, so the view now spans 25..125 on both axes.
        assert_eq!(comp.pick_view(30.0, 30.0), Some(view));
    }

    #[test]
    fn remove_view_unlinks_everything() {
        let (mut comp, surface, view) = compositor_with_surface();
        let output = comp.view(view).unwrap().output;
        comp.remove_view(view);
        assert!(comp.view(view).is_none());
        assert!(!comp.layer(LayerKind::Apps).contains(view));
        assert_eq!(comp.surface(surface).unwrap().view_for_output(output), None);
        // Idempotent.
        comp.remove_view(view);
    }

    #[test]
    fn stack_view_moves_between_layers() {
        let (mut comp, _surface, view) = compositor_with_surface();
        comp.stack_view(view, LayerKind::Panels);
        assert!(!comp.layer(LayerKind::Apps).contains(view));
        assert!(comp.layer(LayerKind::Panels).contains(view));
        assert_eq!(comp.view(view).unwrap().layer, Some(LayerKind::Panels));
    }
}
