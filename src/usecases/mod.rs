//! Use case layer: application workflows and orchestration.

pub mod bootstrap;
pub mod chat_list;
pub mod context;
pub mod contracts;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
