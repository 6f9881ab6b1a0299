use serde::{Deserialize, Serialize};

/// Which screen the host should show at startup.
///
/// The state starts at [`AppState::Fetch`] and moves forward exactly once, to
/// either [`AppState::Supplementary`] or [`AppState::Final`]. Both of those
/// are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    /// Still waiting on the readiness check. Shown as a loading screen.
    #[default]
    Fetch,
    /// Rich (web) content should be shown.
    Supplementary,
    /// Static fallback screen.
    Final,
}

impl AppState {
    /// Returns `true` once no further transitions are allowed.
    pub fn is_terminal(self) -> bool {
        !matches!(self, AppState::Fetch)
    }
}
