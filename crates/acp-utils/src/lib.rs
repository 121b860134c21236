//! Shared infrastructure for the acp workspace: error taxonomy, atomic file
//! writes, structured logging setup, and run-id slugging.

pub mod atomic_write;
pub mod error;
pub mod logging;
pub mod slug;

pub use error::{AcpError, ErrorCategory, UserFriendlyError};
