/// Runtime policy knobs.
///
/// The shell has no config file of its own; the handful of toggles it
/// honors come from the environment so the session manager can set them.
#[derive(Clone, Debug)]
pub struct Config {
    /// When set, a focus click no longer raises the clicked surface and
    /// raising stays bound to its own button.
    pub separate_raise: bool,
    /// Number of workspaces the demo session creates.
    pub workspace_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            separate_raise: false,
            workspace_count: 4,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            separate_raise: env_flag("SHRIKE_SEPARATE_RAISE"),
            workspace_count: std::env::var("SHRIKE_WORKSPACES")
                .ok()
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .filter(|count| *count > 0)
                .unwrap_or(defaults.workspace_count),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|raw| {
            let value = raw.trim();
            !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
        })
        .unwrap_or(false)
}
