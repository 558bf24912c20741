use crate::infra::{config::AppConfig, settings_store::TomlSettingsGateway};

#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub settings: TomlSettingsGateway,
}

impl AppContext {
    pub fn new(config: AppConfig, settings: TomlSettingsGateway) -> Self {
        Self { config, settings }
    }
}
