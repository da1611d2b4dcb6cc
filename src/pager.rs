//! Workspace activation per output.
//!
//! The pager is the only code that moves an output's current-workspace
//! pointer; everything else (bindings, the desktop grid, configure) goes
//! through it so the deactivate/activate sequencing stays in one place.

use crate::errors::{Result, ShellError};
use crate::output::OutputId;
use crate::state::Shell;
use crate::workspace::WorkspaceId;

impl Shell {
    /// Makes `workspace` the current workspace of `output`.
    ///
    /// Returns whether a transition actually happened: activating the
    /// workspace that is already current is a no-op and produces no
    /// deactivate/activate pair.
    pub fn activate_workspace(
        &mut self,
        workspace: WorkspaceId,
        output: OutputId,
    ) -> Result<bool> {
        if workspace.index() >= self.workspaces.len() {
            return Err(ShellError::InvalidWorkspace(workspace.index()));
        }
        let Some(out) = self.comp.output(output) else {
            return Err(ShellError::UnknownOutput(output));
        };
        let previous = out.current_workspace;
        if previous == Some(workspace) {
            return Ok(false);
        }

        if let Some(out) = self.comp.output_mut(output) {
            out.current_workspace = Some(workspace);
        }
        // First time this workspace is shown on this output: materialize
        // its placement.
        if let Some(entry) = self.workspaces.get_mut(workspace.index()) {
            entry.view_for_output(output);
        }
        self.refresh_workspace_active_flags();
        self.refresh_output_visibility(output);

        tracing::info!(
            output = output.0,
            workspace = workspace.0,
            previous = ?previous.map(|w| w.0),
            "workspace activated"
        );
        Ok(true)
    }

    pub fn activate_next_workspace(&mut self, output: OutputId) -> Result<()> {
        self.step_workspace(output, 1)
    }

    pub fn activate_prev_workspace(&mut self, output: OutputId) -> Result<()> {
        self.step_workspace(output, -1)
    }

    fn step_workspace(&mut self, output: OutputId, delta: i32) -> Result<()> {
        let count = self.workspaces.len();
        if count < 2 {
            return Ok(());
        }
        let Some(out) = self.comp.output(output) else {
            return Err(ShellError::UnknownOutput(output));
        };
        let current = out.current_workspace.map_or(0, WorkspaceId::index);
        let target = (current as i32 + delta).rem_euclid(count as i32) as u32;
        self.activate_workspace(WorkspaceId(target), output)?;
        Ok(())
    }

    /// A workspace is active while it is current on at least one output.
    pub(crate) fn refresh_workspace_active_flags(&mut self) {
        let shown: Vec<WorkspaceId> = self
            .comp
            .outputs()
            .filter_map(|output| output.current_workspace)
            .collect();
        for workspace in &mut self.workspaces {
            workspace.active = shown.contains(&workspace.id);
        }
    }

    /// Views of surfaces on a non-current workspace are hidden on that
    /// output.
    pub(crate) fn refresh_output_visibility(&mut self, output: OutputId) {
        let current = self
            .comp
            .output(output)
            .and_then(|out| out.current_workspace);
        for view_id in self.comp.views_on_output(output) {
            let workspace = self
                .comp
                .view(view_id)
                .map(|view| view.surface)
                .and_then(|surface| self.comp.surface(surface))
                .and_then(|surface| surface.workspace);
            if let Some(view) = self.comp.view_mut(view_id) {
                view.hidden = workspace != current;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::geometry::Rect;
    use crate::state::Shell;
    use crate::workspace::WorkspaceId;

    fn shell_with_workspaces(count: usize) -> (Shell, crate::output::OutputId) {
        let mut shell = Shell::new(Config::default());
        let output = shell.output_added(Rect::new(0, 0, 1920, 1080));
        for _ in 0..count {
            shell.create_workspace();
        }
        (shell, output)
    }

    #[test]
    fn first_workspace_adopted_by_output() {
        let (shell, output) = shell_with_workspaces(2);
        assert_eq!(
            shell.comp.output(output).unwrap().current_workspace,
            Some(WorkspaceId(0))
        );
        assert!(shell.workspaces()[0].active);
        assert!(!shell.workspaces()[1].active);
    }

    #[test]
    fn activation_is_idempotent() {
        let (mut shell, output) = shell_with_workspaces(3);
        assert!(shell.activate_workspace(WorkspaceId(1), output).unwrap());
        assert!(!shell.activate_workspace(WorkspaceId(1), output).unwrap());
        assert_eq!(
            shell.comp.output(output).unwrap().current_workspace,
            Some(WorkspaceId(1))
        );
    }

    #[test]
    fn next_then_prev_round_trips() {
        let (mut shell, output) = shell_with_workspaces(3);
        shell.activate_workspace(WorkspaceId(1), output).unwrap();
        shell.activate_next_workspace(output).unwrap();
        assert_eq!(
            shell.comp.output(output).unwrap().current_workspace,
            Some(WorkspaceId(2))
        );
        shell.activate_prev_workspace(output).unwrap();
        assert_eq!(
            shell.comp.output(output).unwrap().current_workspace,
            Some(WorkspaceId(1))
        );
    }

    #[test]
    fn stepping_wraps_around() {
        let (mut shell, output) = shell_with_workspaces(3);
        shell.activate_workspace(WorkspaceId(2), output).unwrap();
        shell.activate_next_workspace(output).unwrap();
        assert_eq!(
            shell.comp.output(output).unwrap().current_workspace,
            Some(WorkspaceId(0))
        );
        shell.activate_prev_workspace(output).unwrap();
        assert_eq!(
            shell.comp.output(output).unwrap().current_workspace,
            Some(WorkspaceId(2))
        );
    }

    #[test]
    fn stepping_with_one_workspace_is_a_noop() {
        let (mut shell, output) = shell_with_workspaces(1);
        shell.activate_next_workspace(output).unwrap();
        assert_eq!(
            shell.comp.output(output).unwrap().current_workspace,
            Some(WorkspaceId(0))
        );
    }

    #[test]
    fn invalid_workspace_is_rejected() {
        let (mut shell, output) = shell_with_workspaces(1);
        assert!(shell.activate_workspace(WorkspaceId(5), output).is_err());
    }

    #[test]
    fn active_flag_respects_multiple_outputs() {
        let (mut shell, first) = shell_with_workspaces(2);
        let second = shell.output_added(Rect::new(1920, 0, 1920, 1080));
        // Both outputs start on workspace 0.
        shell.activate_workspace(WorkspaceId(1), first).unwrap();
        assert!(shell.workspaces()[0].active, "still current on second");
        assert!(shell.workspaces()[1].active);
        shell.activate_workspace(WorkspaceId(1), second).unwrap();
        assert!(!shell.workspaces()[0].active);
    }
}
