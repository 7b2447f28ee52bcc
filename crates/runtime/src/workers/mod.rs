//! Background workers.
mod session;

pub use session::{Command, SessionWorker};
