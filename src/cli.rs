use crate::analyzer::{Analyzer, ScanOptions};
use crate::error::Error;
use crate::renderer::RenderMode;
use crate::scanner::FileScanner;
use crate::serializer::{serialize_json, serialize_yaml};
use crate::type_registry::TypeRegistry;
use crate::writer::{merge_with_file_content, write_file, WriteOptions};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, error, info};
use std::path::{Path, PathBuf};

/// Lua annotation generator - derive LuaLS class and field annotations from Lua modules
#[derive(Parser, Debug)]
#[command(name = "lua-annotgen")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to a .lua file or a directory to scan recursively
    #[arg(long = "path", value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Write output to this directory instead of in place (base file name is kept)
    #[arg(long = "out", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Do not write to disk, print the output instead
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write only the annotation header, as <name>.annot.lua
    #[arg(long = "annot")]
    pub annot: bool,

    /// Render a single class instead of a definition class plus instance class
    #[arg(long = "inline")]
    pub inline: bool,

    /// Ignore ---@overload tags
    #[arg(long = "no-overloads")]
    pub no_overloads: bool,

    /// Type plain fields after classes declared in types/ directories
    #[arg(long = "global-types")]
    pub global_types: bool,

    /// Root searched for types/ directories (implies --global-types)
    #[arg(long = "types-root", value_name = "DIR")]
    pub types_root: Option<PathBuf>,

    /// Output format; json and yaml print the scanned model and never write files
    #[arg(short = 'f', long = "format", value_enum, default_value = "annot")]
    pub output_format: OutputFormat,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Annotated Lua
    Annot,
    /// JSON dump of the scanned model
    Json,
    /// YAML dump of the scanned model
    Yaml,
}

impl CliArgs {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            emit_overloads: !self.no_overloads,
            split_definition_class: !self.inline,
            resolve_global_types: self.global_types || self.types_root.is_some(),
        }
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            dry_run: self.dry_run,
            out_dir: self.out_dir.clone(),
            annot_only: self.annot,
        }
    }

    /// Directory the global type registry is built from.
    fn registry_root(&self, path: &Path) -> PathBuf {
        if let Some(root) = &self.types_root {
            return root.clone();
        }
        if path.is_dir() {
            return path.to_path_buf();
        }
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    let Some(path) = &args.path else {
        return Err(Error::InvalidArgument("--path is required".to_string()).into());
    };

    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    info!("Path: {}", path.display());
    if let Some(ref out) = args.out_dir {
        info!("Output directory: {}", out.display());
    }
    debug!("Scan options: {:?}", args.scan_options());

    Ok(args)
}

/// Run the main workflow
///
/// Discovery failures abort the run; a file that cannot be analyzed or
/// written is reported and skipped.
pub fn run(args: CliArgs) -> Result<()> {
    let path = args
        .path
        .clone()
        .ok_or_else(|| Error::InvalidArgument("--path is required".to_string()))?;

    // Step 1: Collect Lua files
    let files = FileScanner::new(path.clone())
        .scan()
        .with_context(|| format!("Error while walking path {}", path.display()))?;
    info!("Found {} Lua files", files.len());

    // Step 2: Build the global type registry once, if requested
    let options = args.scan_options();
    let registry = if options.resolve_global_types {
        let root = args.registry_root(&path);
        let registry = TypeRegistry::scan(&root);
        info!("Collected {} global types from {}", registry.len(), root.display());
        Some(registry)
    } else {
        None
    };

    let analyzer = Analyzer::new(options, registry.as_ref());
    let mode = RenderMode::from(&options);
    let write_options = args.write_options();

    // Step 3: Analyze, merge and write each file
    let mut failed = 0usize;
    for file in &files {
        if let Err(e) = process_file(file, &analyzer, mode, &write_options, args.output_format) {
            error!("{:#}", e);
            failed += 1;
        }
    }

    info!(
        "Processed {} files ({} failed)",
        files.len() - failed,
        failed
    );
    Ok(())
}

fn process_file(
    file: &Path,
    analyzer: &Analyzer,
    mode: RenderMode,
    write_options: &WriteOptions,
    format: OutputFormat,
) -> Result<()> {
    let mut annotations = analyzer
        .analyze_file(file)
        .with_context(|| format!("Failed to analyze {}", file.display()))?;

    let dump = match format {
        OutputFormat::Annot => None,
        OutputFormat::Json => Some(serialize_json(&annotations)?),
        OutputFormat::Yaml => Some(serialize_yaml(&annotations)?),
    };
    if let Some(dump) = dump {
        println!("-- {} --", file.display());
        println!("{}", dump);
        return Ok(());
    }

    merge_with_file_content(&mut annotations, mode);

    let lines = write_file(&annotations, write_options, mode)
        .with_context(|| format!("Failed to write {}", file.display()))?;

    if write_options.dry_run {
        println!("-- {} --", file.display());
        for line in &lines {
            println!("{}", line);
        }
    }

    Ok(())
}
