pub mod confirm;
pub mod status_resolver;
pub mod validation;

pub use confirm::{AssumeYes, Confirm, TerminalConfirm};
pub use status_resolver::{resolve_exam, resolve_statuses, Transition};
