use anyhow::{bail, Result};

use crate::{
    domain::sort_policy::SortMode,
    infra::{config::AppConfig, contracts::ConfigAdapter},
    usecases::contracts::SettingsGateway,
};

#[derive(Debug, Clone, Default)]
pub struct StubConfigAdapter;

impl ConfigAdapter for StubConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        Ok(AppConfig::default())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySettingsGateway {
    pub current: SortMode,
    pub saved: Vec<SortMode>,
    fail_on_save: bool,
}

impl InMemorySettingsGateway {
    pub fn with_mode(mode: SortMode) -> Self {
        Self {
            current: mode,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_on_save: true,
            ..Self::default()
        }
    }
}

impl SettingsGateway for InMemorySettingsGateway {
    fn load_sort_mode(&self) -> Result<SortMode> {
        Ok(self.current)
    }

    fn save_sort_mode(&mut self, mode: SortMode) -> Result<()> {
        if self.fail_on_save {
            bail!("settings storage is read-only");
        }

        self.current = mode;
        self.saved.push(mode);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_settings_remember_last_saved_mode() {
        let mut settings = InMemorySettingsGateway::with_mode(SortMode::Recency);

        settings
            .save_sort_mode(SortMode::UnreadFirst)
            .expect("save must succeed");

        assert_eq!(
            settings.load_sort_mode().expect("load must succeed"),
            SortMode::UnreadFirst
        );
        assert_eq!(settings.saved, vec![SortMode::UnreadFirst]);
    }
}
