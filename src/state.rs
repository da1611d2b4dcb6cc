use std::collections::HashMap;

use crate::action::Action;
use crate::binding::{
    BindingId, ButtonBinding, KeyBinding, Modifiers, PointerButton, keys,
};
use crate::compositor::Compositor;
use crate::config::Config;
use crate::cursor::{CursorShape, GrabCursorHandler};
use crate::effects::desktop_grid::{self, DesktopGridState};
use crate::geometry::{Point, Rect};
use crate::grabs::{GrabOutcome, KillGrab, MoveGrab, PointerGrab};
use crate::layer::LayerKind;
use crate::output::OutputId;
use crate::seat::SeatId;
use crate::surface::{ClientId, SurfaceId, SurfaceKind};
use crate::view::ViewId;
use crate::workspace::{Workspace, WorkspaceId};

/// The composition root: owns the compositor registry, the workspaces,
/// all bindings, the trusted-client registry and the grab plumbing.
///
/// Everything runs on the single compositor thread; event entry points
/// (`input.rs`) and the pager (`pager.rs`) are further `impl Shell`
/// blocks.
pub struct Shell {
    pub comp: Compositor,
    pub config: Config,
    pub(crate) workspaces: Vec<Workspace>,
    key_bindings: Vec<KeyBinding>,
    button_bindings: Vec<ButtonBinding>,
    next_binding: u32,
    trusted_clients: HashMap<String, Vec<ClientId>>,
    grab_cursor: Option<Box<dyn GrabCursorHandler>>,
    terminator: Box<dyn FnMut(u32)>,
    pub(crate) desktop_grid: DesktopGridState,
}

impl Shell {
    pub fn new(config: Config) -> Self {
        let mut shell = Self {
            comp: Compositor::new(),
            config,
            workspaces: Vec::new(),
            key_bindings: Vec::new(),
            button_bindings: Vec::new(),
            next_binding: 0,
            trusted_clients: HashMap::new(),
            grab_cursor: None,
            terminator: Box::new(default_terminator),
            desktop_grid: DesktopGridState::default(),
        };

        shell.add_button_binding(Modifiers::empty(), PointerButton::Left, Action::GiveFocus);
        shell.add_button_binding(Modifiers::empty(), PointerButton::Task, Action::RaiseLower);
        shell.add_button_binding(Modifiers::SUPER, PointerButton::Left, Action::MoveSurface);
        shell.add_key_binding(
            Modifiers::SUPER | Modifiers::CTRL,
            keys::ESC,
            Action::KillSurface,
        );
        shell.add_key_binding(Modifiers::CTRL, keys::RIGHT, Action::NextWorkspace);
        shell.add_key_binding(Modifiers::CTRL, keys::LEFT, Action::PrevWorkspace);
        shell.add_key_binding(Modifiers::SUPER, keys::G, Action::ToggleDesktopGrid);
        shell
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    /// Creates the next workspace. Outputs with no current workspace yet
    /// adopt it immediately, so an output never stays workspace-less
    /// once any workspace exists.
    pub fn create_workspace(&mut self) -> WorkspaceId {
        let id = WorkspaceId(self.workspaces.len() as u32);
        self.workspaces.push(Workspace::new(id));
        tracing::info!(workspace = id.0, "workspace created");
        for output in self.comp.output_ids() {
            let vacant = self
                .comp
                .output(output)
                .is_some_and(|out| out.current_workspace.is_none());
            if vacant && let Err(err) = self.activate_workspace(id, output) {
                tracing::warn!("failed to adopt new workspace: {err}");
            }
        }
        id
    }

    // Bindings

    pub fn add_key_binding(&mut self, modifiers: Modifiers, key: u32, action: Action) -> BindingId {
        let id = BindingId(self.next_binding);
        self.next_binding += 1;
        self.key_bindings.push(KeyBinding {
            id,
            modifiers,
            key,
            action,
        });
        id
    }

    pub fn add_button_binding(
        &mut self,
        modifiers: Modifiers,
        button: PointerButton,
        action: Action,
    ) -> BindingId {
        let id = BindingId(self.next_binding);
        self.next_binding += 1;
        self.button_bindings.push(ButtonBinding {
            id,
            modifiers,
            button,
            action,
        });
        id
    }

    pub fn remove_binding(&mut self, id: BindingId) {
        self.key_bindings.retain(|binding| binding.id != id);
        self.button_bindings.retain(|binding| binding.id != id);
    }

    /// First registered match wins; the action is cloned out so dispatch
    /// can mutate the binding tables.
    pub(crate) fn key_action_for(&self, modifiers: Modifiers, key: u32) -> Option<Action> {
        self.key_bindings
            .iter()
            .find(|binding| binding.matches(modifiers, key))
            .map(|binding| binding.action.clone())
    }

    pub(crate) fn button_action_for(
        &self,
        modifiers: Modifiers,
        button: PointerButton,
    ) -> Option<Action> {
        self.button_bindings
            .iter()
            .find(|binding| binding.matches(modifiers, button))
            .map(|binding| binding.action.clone())
    }

    // Outputs

    pub fn output_added(&mut self, geometry: Rect) -> OutputId {
        let id = self.comp.create_output(geometry);
        tracing::info!(output = id.0, ?geometry, "output added");
        if let Some(first) = self.workspaces.first().map(|ws| ws.id)
            && let Err(err) = self.activate_workspace(first, id)
        {
            tracing::warn!("failed to activate workspace on new output: {err}");
        }
        for surface in self.comp.surface_ids() {
            if self.comp.surface(surface).is_some_and(|s| s.mapped) {
                self.create_surface_view(surface, id);
            }
        }
        id
    }

    pub fn output_removed(&mut self, id: OutputId) {
        desktop_grid::output_removed(self, id);
        for view in self.comp.views_on_output(id) {
            self.drop_view(view);
        }
        for workspace in &mut self.workspaces {
            workspace.drop_view_for_output(id);
        }
        if self.comp.remove_output(id).is_none() {
            tracing::warn!(output = id.0, "removed unknown output");
            return;
        }
        self.refresh_workspace_active_flags();
        for seat in self.comp.seat_ids() {
            let mut left = false;
            if let Some(s) = self.comp.seat_mut(seat)
                && s.pointer.current_output == Some(id)
            {
                s.pointer.current_output = None;
                left = true;
            }
            if left {
                self.refresh_pointer_focus(seat);
            }
        }
        tracing::info!(output = id.0, "output removed");
    }

    pub fn lock(&mut self) {
        for output in self.comp.outputs_mut() {
            output.lock();
        }
    }

    pub fn unlock(&mut self) {
        for output in self.comp.outputs_mut() {
            output.unlock();
        }
    }

    /// Picks the output most seats are pointing at.
    ///
    /// Each output gets one vote per pointer inside its geometry (only
    /// `seat`'s pointer when one is given); ties keep the first-created
    /// candidate. No outputs means no winner, callers must cope.
    pub fn select_primary_output(&self, seat: Option<SeatId>) -> Option<OutputId> {
        let outputs = self.comp.output_ids();
        match outputs.len() {
            0 => return None,
            1 => return Some(outputs[0]),
            _ => {}
        }
        let seats: Vec<SeatId> = match seat {
            Some(seat) => vec![seat],
            None => self.comp.seat_ids(),
        };
        let mut best: Option<(OutputId, usize)> = None;
        for output in outputs {
            let Some(geometry) = self.comp.output(output).map(|out| out.geometry) else {
                continue;
            };
            let votes = seats
                .iter()
                .filter(|seat| {
                    self.comp
                        .seat(**seat)
                        .is_some_and(|s| geometry.contains(s.pointer.x, s.pointer.y))
                })
                .count();
            if best.is_none_or(|(_, most)| votes > most) {
                best = Some((output, votes));
            }
        }
        best.map(|(output, _)| output)
    }

    // Clients and surfaces

    pub fn client_connected(&mut self, pid: u32) -> ClientId {
        self.comp.create_client(pid)
    }

    /// Client teardown: drops its surfaces and any trusted-client
    /// entries, so the registry never holds a dangling client.
    pub fn client_disconnected(&mut self, client: ClientId) {
        for clients in self.trusted_clients.values_mut() {
            clients.retain(|entry| *entry != client);
        }
        for surface in self.comp.surface_ids() {
            if self
                .comp
                .surface(surface)
                .is_some_and(|s| s.client == client)
            {
                self.surface_destroyed(surface);
            }
        }
        self.comp.remove_client(client);
        tracing::info!(client = client.0, "client disconnected");
    }

    pub fn create_surface(
        &mut self,
        client: ClientId,
        kind: SurfaceKind,
        width: i32,
        height: i32,
    ) -> SurfaceId {
        self.comp.create_surface(client, kind, width, height)
    }

    /// First-commit placement: an unmapped, unassigned surface goes to
    /// the primary output's current workspace, and toplevels take the
    /// keyboard focus of every seat.
    pub fn configure(&mut self, surface: SurfaceId) {
        let Some((mapped, workspace, kind)) = self
            .comp
            .surface(surface)
            .map(|s| (s.mapped, s.workspace, s.kind))
        else {
            tracing::warn!(surface = surface.0, "configure for unknown surface");
            return;
        };
        if mapped || workspace.is_some() {
            return;
        }
        let Some(output) = self.select_primary_output(None) else {
            tracing::debug!(surface = surface.0, "no output, leaving surface unassigned");
            return;
        };
        let Some(current) = self.comp.output(output).and_then(|out| out.current_workspace)
        else {
            tracing::debug!(surface = surface.0, "primary output has no workspace yet");
            return;
        };

        if let Some(s) = self.comp.surface_mut(surface) {
            s.workspace = Some(current);
            s.mapped = true;
        }
        for output in self.comp.output_ids() {
            self.create_surface_view(surface, output);
        }
        tracing::info!(
            surface = surface.0,
            workspace = current.0,
            "surface configured"
        );

        if kind == SurfaceKind::Toplevel {
            for seat in self.comp.seat_ids() {
                self.activate(seat, surface);
            }
        }
    }

    pub(crate) fn create_surface_view(&mut self, surface: SurfaceId, output: OutputId) {
        let Some((x, y, workspace, exists)) = self.comp.surface(surface).map(|s| {
            (
                s.x,
                s.y,
                s.workspace,
                s.views.contains_key(&output),
            )
        }) else {
            return;
        };
        if exists {
            return;
        }
        let view = self
            .comp
            .create_view(surface, output, Point::new(x as f64, y as f64));
        self.comp.stack_view(view, LayerKind::Apps);
        if let Some(workspace) = workspace {
            let current = self
                .comp
                .output(output)
                .and_then(|out| out.current_workspace);
            if let Some(v) = self.comp.view_mut(view) {
                v.hidden = current != Some(workspace);
            }
            if let Some(entry) = self.workspaces.get_mut(workspace.index()) {
                entry.view_for_output(output).add_view(view);
            }
        }
    }

    pub fn surface_destroyed(&mut self, surface: SurfaceId) {
        let views: Vec<ViewId> = self
            .comp
            .surface(surface)
            .map(|s| s.views.values().copied().collect())
            .unwrap_or_default();
        for view in views {
            self.drop_view(view);
        }
        for seat in self.comp.seat_ids() {
            if let Some(s) = self.comp.seat_mut(seat)
                && s.keyboard.focus == Some(surface)
            {
                s.keyboard.focus = None;
            }
        }
        if self.comp.remove_surface(surface).is_some() {
            tracing::info!(surface = surface.0, "surface destroyed");
        }
    }

    /// Removes a view everywhere it is referenced: its layer, its
    /// workspace view, pointer focus, the view arena. Idempotent, since
    /// teardown can race with layer cleanup.
    pub(crate) fn drop_view(&mut self, view: ViewId) {
        let Some((surface, output)) = self.comp.view(view).map(|v| (v.surface, v.output)) else {
            return;
        };
        let workspace = self
            .comp
            .surface(surface)
            .and_then(|s| s.workspace);
        if let Some(workspace) = workspace
            && let Some(entry) = self.workspaces.get_mut(workspace.index())
            && entry.has_view_for_output(output)
        {
            entry.view_for_output(output).remove_view(view);
        }
        for seat in self.comp.seat_ids() {
            if let Some(s) = self.comp.seat_mut(seat)
                && s.pointer.focus == Some(view)
            {
                s.pointer.focus = None;
            }
        }
        self.comp.remove_view(view);
    }

    // Focus and stacking policy

    /// Gives `surface` the keyboard focus of `seat`.
    pub fn activate(&mut self, seat: SeatId, surface: SurfaceId) {
        let serial = self.comp.next_serial();
        let Some(s) = self.comp.seat_mut(seat) else {
            return;
        };
        s.keyboard.focus = Some(surface);
        tracing::debug!(seat = seat.0, surface = surface.0, serial, "surface activated");
    }

    /// Focus-on-click. Also raises the clicked surface on every output,
    /// unless that is configured away or the surface is fullscreen
    /// (raising a fullscreen surface would disrupt stacking for no
    /// visible gain).
    pub(crate) fn give_focus(&mut self, seat: SeatId) {
        let Some(s) = self.comp.seat(seat) else {
            return;
        };
        if s.pointer.is_grab_active() {
            return;
        }
        let Some(view) = self.comp.pick_view(s.pointer.x, s.pointer.y) else {
            return;
        };
        let Some(surface) = self.comp.view(view).map(|v| v.surface) else {
            return;
        };
        self.activate(seat, surface);

        if self.config.separate_raise {
            return;
        }
        let Some(s) = self.comp.surface(surface) else {
            return;
        };
        if s.fullscreen {
            return;
        }
        let views: Vec<ViewId> = s.views.values().copied().collect();
        for view in views {
            self.comp.raise_view_on_top(view);
        }
    }

    /// Raise/lower toggle on the pointer-focused surface, applied per
    /// output: a topmost view is lowered, anything else is raised.
    pub(crate) fn raise(&mut self, seat: SeatId) {
        let Some(s) = self.comp.seat(seat) else {
            return;
        };
        if s.pointer.is_grab_active() {
            return;
        }
        let Some(focus) = s.pointer.focus else {
            return;
        };
        let Some(surface) = self.comp.view(focus).map(|v| v.surface) else {
            return;
        };
        let Some(s) = self.comp.surface(surface) else {
            return;
        };
        if s.fullscreen {
            return;
        }
        let views: Vec<ViewId> = s.views.values().copied().collect();
        for view in views {
            if self.comp.is_top_view(view) {
                self.comp.lower_view(view);
            } else {
                self.comp.raise_view_on_top(view);
            }
        }
    }

    /// Starts an interactive move of the pointer-focused surface.
    pub(crate) fn move_surface(&mut self, seat: SeatId) {
        let Some(s) = self.comp.seat(seat) else {
            return;
        };
        if s.pointer.is_grab_active() {
            return;
        }
        let Some(focus) = s.pointer.focus else {
            return;
        };
        let start = Point::new(s.pointer.x, s.pointer.y);
        let Some(surface) = self.comp.view(focus).map(|v| v.surface) else {
            return;
        };
        let Some(s) = self.comp.surface(surface) else {
            return;
        };
        let origin = (s.x, s.y);
        let view_ids: Vec<ViewId> = s.views.values().copied().collect();
        let initial: Vec<(ViewId, Point)> = view_ids
            .into_iter()
            .filter_map(|id| self.comp.view(id).map(|view| (id, view.pos)))
            .collect();
        let grab = MoveGrab::new(surface, start, origin, initial);
        self.start_grab(seat, Box::new(grab), CursorShape::Move);
    }

    /// Starts the click-to-kill interaction. The pointer focus is
    /// cleared first so the kill cursor captures every following button
    /// press.
    pub(crate) fn kill_surface(&mut self, seat: SeatId) {
        if self.comp.seat(seat).is_none() {
            return;
        }
        let abort = self.add_key_binding(Modifiers::empty(), keys::ESC, Action::CancelGrab(seat));
        if let Some(s) = self.comp.seat_mut(seat) {
            s.pointer.focus = None;
        }
        self.start_grab(seat, Box::new(KillGrab::new(abort)), CursorShape::Kill);
    }

    // Trusted clients

    pub fn add_trusted_client(&mut self, capability: &str, client: ClientId) {
        self.trusted_clients
            .entry(capability.to_owned())
            .or_default()
            .push(client);
        tracing::info!(capability, client = client.0, "trusted client registered");
    }

    /// Linear scan; trusted clients per capability stay in the single
    /// digits.
    pub fn is_client_trusted(&self, capability: &str, client: ClientId) -> bool {
        self.trusted_clients
            .get(capability)
            .is_some_and(|clients| clients.contains(&client))
    }

    // Injected host hooks

    pub fn set_grab_cursor_handler(&mut self, handler: Box<dyn GrabCursorHandler>) {
        self.grab_cursor = Some(handler);
    }

    pub fn set_process_terminator(&mut self, terminator: Box<dyn FnMut(u32)>) {
        self.terminator = terminator;
    }

    pub(crate) fn terminate_process(&mut self, pid: u32) {
        (self.terminator)(pid);
    }

    // Grab plumbing

    pub fn is_grab_active(&self, seat: SeatId) -> bool {
        self.comp
            .seat(seat)
            .is_some_and(|s| s.pointer.is_grab_active())
    }

    /// Installs a grab on a seat. A seat already grabbing has its old
    /// grab fully ended first; nesting does not exist.
    pub fn start_grab(&mut self, seat: SeatId, grab: Box<dyn PointerGrab>, cursor: CursorShape) {
        if self.comp.seat(seat).is_none() {
            tracing::warn!(seat = seat.0, "grab start on unknown seat");
            return;
        }
        self.end_grab(seat);
        if let Some(handler) = self.grab_cursor.as_mut() {
            handler.set_grab_cursor(seat, cursor);
        }
        if let Some(s) = self.comp.seat_mut(seat) {
            s.pointer.grab = Some(grab);
            s.pointer.grab_active = true;
        }
        tracing::debug!(seat = seat.0, ?cursor, "grab started");
        self.dispatch_grab_focus(seat);
    }

    /// Ends a seat's grab, if any: `ended` fires exactly once, the grab
    /// cursor is unset and normal focus tracking resumes.
    pub fn end_grab(&mut self, seat: SeatId) {
        let Some(s) = self.comp.seat_mut(seat) else {
            return;
        };
        let Some(mut grab) = s.pointer.grab.take() else {
            return;
        };
        s.pointer.grab_active = false;
        grab.ended(self, seat);
        if let Some(handler) = self.grab_cursor.as_mut() {
            handler.unset_grab_cursor(seat);
        }
        tracing::debug!(seat = seat.0, "grab ended");
        self.refresh_pointer_focus(seat);
    }

    pub(crate) fn take_grab(&mut self, seat: SeatId) -> Option<Box<dyn PointerGrab>> {
        self.comp.seat_mut(seat)?.pointer.grab.take()
    }

    pub(crate) fn dispatch_grab_focus(&mut self, seat: SeatId) {
        let Some(mut grab) = self.take_grab(seat) else {
            return;
        };
        let outcome = grab.focus(self, seat);
        self.finish_grab_dispatch(seat, grab, outcome);
    }

    /// Puts a dispatched grab back into its slot, or retires it when the
    /// callback asked to end or something replaced it mid-dispatch.
    pub(crate) fn finish_grab_dispatch(
        &mut self,
        seat: SeatId,
        mut grab: Box<dyn PointerGrab>,
        outcome: GrabOutcome,
    ) {
        match outcome {
            GrabOutcome::Continue => {
                let vacant = self
                    .comp
                    .seat(seat)
                    .is_some_and(|s| s.pointer.grab.is_none() && s.pointer.grab_active);
                if vacant {
                    if let Some(s) = self.comp.seat_mut(seat) {
                        s.pointer.grab = Some(grab);
                    }
                } else {
                    grab.ended(self, seat);
                }
            }
            GrabOutcome::End => {
                if let Some(s) = self.comp.seat_mut(seat) {
                    s.pointer.grab_active = false;
                }
                grab.ended(self, seat);
                if let Some(handler) = self.grab_cursor.as_mut() {
                    handler.unset_grab_cursor(seat);
                }
                tracing::debug!(seat = seat.0, "grab ended");
                self.refresh_pointer_focus(seat);
            }
        }
    }
}

/// Default process terminator. SIGKILL, because the target of the kill
/// interaction is assumed unresponsive to anything gentler.
fn default_terminator(pid: u32) {
    let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGKILL) };
    if rc != 0 {
        tracing::warn!(pid, "failed to deliver SIGKILL");
    }
}
