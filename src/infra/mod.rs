//! Infrastructure layer: adapters for config, settings storage and snapshot files.

pub mod config;
pub mod contracts;
pub mod error;
pub mod logging;
pub mod settings_store;
pub mod snapshot;
#[cfg(test)]
pub mod stubs;

/// Returns the infra module name for smoke checks.
pub fn module_name() -> &'static str {
    "infra"
}
