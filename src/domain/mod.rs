//! Domain layer: conversations, sort policies and the ordered chat list.

pub mod conversation;
pub mod events;
pub mod ordered_list;
pub mod sort_policy;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
