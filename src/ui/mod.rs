//! UI layer: read-only rendering of the ordered chat list.

pub mod list_view;

/// Returns the UI module name for smoke checks.
pub fn module_name() -> &'static str {
    "ui"
}
