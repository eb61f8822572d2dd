//! cahbot - Cards Against Humanity game glue for chat channels
//!
//! Pack autocomplete for the `create` command plus the per-channel session
//! registry that `create`, `end` and `kick` operate on.
//! The main binary is a local REPL in `main.rs`.

pub mod catalog;
pub mod commands;
pub mod completion;
pub mod config;
pub mod paths;
pub mod session;
pub mod state;
