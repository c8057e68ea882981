//! Lua annotation generator - LuaLS annotations inferred from Lua module conventions.
//!
//! This library scans Lua source files line by line and derives `---@module`,
//! `---@brief`, `---@desc`, `---@class` and `---@field` annotations for the
//! module table `M`. It does not parse Lua: a handful of one-line patterns
//! (`M.name = ...`, `function M.name(...)`, existing `---@` tags) carry the
//! whole inference.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Collects the `.lua` files to process
//! 2. [`analyzer`] - Line state machine producing the module header and fields
//! 3. [`naming`] - Default module paths and class names from file locations
//! 4. [`type_registry`] - Optional set of class names declared in `types/` directories
//! 5. [`renderer`] - Turns the model back into annotation lines
//! 6. [`writer`] - Merges headers into file content and writes the output
//! 7. [`serializer`] - JSON / YAML dumps of the model
//!
//! # Example Usage
//!
//! ```no_run
//! use lua_annotgen::{
//!     analyzer::{Analyzer, ScanOptions},
//!     renderer::RenderMode,
//!     scanner::FileScanner,
//!     writer::{merge_with_file_content, write_file, WriteOptions},
//! };
//! use std::path::PathBuf;
//!
//! let files = FileScanner::new(PathBuf::from("./lua")).scan().unwrap();
//!
//! let options = ScanOptions::default();
//! let analyzer = Analyzer::new(options, None);
//! let mode = RenderMode::from(&options);
//! let write_options = WriteOptions { dry_run: true, ..WriteOptions::default() };
//!
//! for file in &files {
//!     let mut annotations = analyzer.analyze_file(file).unwrap();
//!     merge_with_file_content(&mut annotations, mode);
//!     for line in write_file(&annotations, &write_options, mode).unwrap() {
//!         println!("{}", line);
//!     }
//! }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod analyzer;
pub mod cli;
pub mod error;
pub mod model;
pub mod naming;
pub mod renderer;
pub mod scanner;
pub mod serializer;
pub mod type_registry;
pub mod writer;
