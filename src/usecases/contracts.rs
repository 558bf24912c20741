use anyhow::Result;

use crate::domain::sort_policy::SortMode;

/// Persisted home of the user's chat list sort mode.
pub trait SettingsGateway {
    fn load_sort_mode(&self) -> Result<SortMode>;
    fn save_sort_mode(&mut self, mode: SortMode) -> Result<()>;
}
