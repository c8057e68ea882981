//! Lua annotation generator - command-line tool for annotating Lua modules.
//!
//! Scans Lua files for module-table assignments, function declarations and
//! existing doc tags, then writes LuaLS `---@class` / `---@field` headers.
//!
//! # Usage
//!
//! ```bash
//! lua-annotgen --path <FILE_OR_DIR> [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Annotate every file of a plugin in place:
//! ```bash
//! lua-annotgen --path ./lua/myplugin
//! ```
//!
//! Preview the result without writing:
//! ```bash
//! lua-annotgen --path ./lua/myplugin/init.lua --dry-run
//! ```
//!
//! Write header-only `.annot.lua` files into another directory:
//! ```bash
//! lua-annotgen --path ./lua --annot --out ./annotations
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use lua_annotgen::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    // Successful runs stay silent unless verbose
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("lua-annotgen starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Annotation run completed");

    Ok(())
}
