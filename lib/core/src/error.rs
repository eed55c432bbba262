//! Shared `Result` alias.
//!
//! Every crate in the workspace reports failures as `rootcause::Report<E>`
//! over its own error enum (`TriggerError`, `CliError`). Binaries wrap
//! library reports with `.context()` so the trigger failure stays attached
//! as the cause.

use rootcause::Report;

/// `Result` over a rootcause [`Report`] with context type `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
