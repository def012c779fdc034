//! `tts-mod` CLI library.
//!
//! Exposes the argument definitions, command implementations and runtime
//! helpers of the `tts-mod` binary so they can be tested directly.
//!
//! # Commands
//!
//! - `unpack <savegame>` - Unpack a savegame into the project directory
//! - `repack [output]` - Pack the project directory into a savegame
//! - `fmt` - Rewrite the project directory in canonical form

pub mod cli;
pub mod commands;
pub mod exit;
pub mod runner;

pub use cli::{Cli, Commands};
pub use exit::ExitCode;
pub use runner::{execute_command, init_logging};
