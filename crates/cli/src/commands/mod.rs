//! Command implementations.

mod autoreply;
mod history;
mod preview;
mod send;
mod validate;

pub use autoreply::run_autoreply;
pub use history::run_history;
pub use preview::run_preview;
pub use send::run_send;
pub use validate::run_validate;
