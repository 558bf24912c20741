use std::path::Path;

use crate::{
    infra::{
        self, config::FileConfigAdapter, contracts::ConfigAdapter, error::AppError,
        settings_store::TomlSettingsGateway,
    },
    usecases::context::AppContext,
};

pub fn bootstrap(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let context = build_context(config_path)?;
    infra::logging::init(&context.config.logging)?;

    Ok(context)
}

fn build_context(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    build_context_with(&FileConfigAdapter::new(config_path), config_path)
}

fn build_context_with(
    config_adapter: &dyn ConfigAdapter,
    config_path: Option<&Path>,
) -> Result<AppContext, AppError> {
    let config = config_adapter.load().map_err(AppError::Other)?;

    Ok(AppContext::new(config, TomlSettingsGateway::new(config_path)))
}
