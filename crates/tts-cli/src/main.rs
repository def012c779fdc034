//! Tabletop Simulator mod tool.
//!
//! # Examples
//!
//! ```bash
//! # Unpack a savegame into the current directory
//! tts-mod unpack ~/Documents/My\ Games/Tabletop\ Simulator/Saves/TS_Save_1.json
//!
//! # Pack it back into build/packed-savegame.json
//! tts-mod repack
//! ```

use anyhow::Result;
use clap::Parser;
use tts_cli::{Cli, ExitCode, execute_command, init_logging};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    let exit_code = match execute_command(cli.command, &cli.dir) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::for_error(&e)
        }
    };

    std::process::exit(exit_code.as_i32());
}
