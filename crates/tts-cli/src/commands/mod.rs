//! Command implementations for the `tts-mod` CLI.
//!
//! Each command loads the project configuration from the unpacked directory,
//! runs one operation of `tts-savegame` and reports the outcome as an
//! [`ExitCode`](crate::ExitCode).

pub mod common;
pub mod fmt;
pub mod repack;
pub mod unpack;
