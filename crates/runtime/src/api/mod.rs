//! Client-facing API surface: the session handle, the provider seam,
//! and the unified error type.
mod errors;
mod handle;
mod providers;

pub use errors::{Result, RuntimeError};
pub use handle::SessionHandle;
pub use providers::IntentProvider;
