//! chatkeep-app library root.
//!
//! The conversation handler plus the configuration and client bootstrap used
//! by the `chatkeep` binary. Exposed as a library so integration tests can
//! drive turns without a terminal.

pub mod aws;
pub mod config;
pub mod error;
pub mod handler;
pub mod locks;
