//! CLI argument definitions and parsing.
//!
//! Defines the command-line interface structure using clap:
//! - `Cli` - Main CLI entry point
//! - `Commands` - Available subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default location of the repacked savegame.
pub const DEFAULT_OUTPUT: &str = "build/packed-savegame.json";

/// Tabletop Simulator mod tool.
///
/// Unpacks savegames into a directory tree that works well with version
/// control, and packs the tree back into a savegame Tabletop Simulator can
/// load.
#[derive(Parser, Debug)]
#[command(name = "tts-mod")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the unpacked savegame
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub dir: PathBuf,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Unpack a savegame into the project directory.
    ///
    /// Existing files are updated in place; objects, scripts and modules
    /// that are no longer part of the savegame are removed.
    ///
    /// # Examples
    ///
    /// ```bash
    /// tts-mod unpack ~/Documents/My\ Games/Tabletop\ Simulator/Saves/TS_Save_1.json
    /// ```
    Unpack {
        /// Savegame JSON file to unpack
        savegame: PathBuf,
    },

    /// Pack the project directory into a savegame.
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Write build/packed-savegame.json
    /// tts-mod repack
    ///
    /// # Write straight into the saves folder
    /// tts-mod repack ~/Documents/My\ Games/Tabletop\ Simulator/Saves/TS_Save_2.json
    /// ```
    Repack {
        /// Output file (parent directories are created)
        #[arg(default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },

    /// Normalize the project directory.
    ///
    /// Repacks the tree and unpacks the result in place, which rewrites
    /// every file in canonical form.
    Fmt,
}
