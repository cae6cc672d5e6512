// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for s2doc.
//!
//! This binary provides the `s2doc` command for converting YAML domain
//! models to Markdown documentation.

use lexopt::prelude::*;
use log::{debug, info};
use s2doc::check::check;
use s2doc::convert::{ConvertError, Model};
use s2doc::parser;
use s2doc::renderer::RenderOptions;
use snafu::{OptionExt, ensure, prelude::*};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

/// Where to write the rendered output.
#[derive(Clone)]
enum OutputTarget {
    /// Write each file to the specified directory.
    Directory(PathBuf),
    /// Write to stdout.
    Stdout,
}

#[allow(clippy::struct_excessive_bools)]
struct Cli {
    input: Vec<PathBuf>,
    output: OutputTarget,
    render: RenderOptions,
    check: bool,
    verbose: bool,
    quiet: bool,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("at least one input file or directory is required"))]
    NoInputFiles,

    #[snafu(display("cannot output multiple files to stdout"))]
    MultipleFilesToStdout,

    #[snafu(display("failed to create output directory {}: {source}", path.display()))]
    CreateOutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to parse {}: {source}", path.display()))]
    ParseFile {
        path: PathBuf,
        source: parser::ParseError,
    },

    #[snafu(display("unable to convert {}: {source}", path.display()))]
    Convert { path: PathBuf, source: ConvertError },

    #[snafu(display("check found {count} problem(s)"))]
    CheckFailed { count: usize },

    #[snafu(display("invalid input filename {}: no file stem", path.display()))]
    InvalidFilename { path: PathBuf },

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Process exit status for this error.
    const fn exit_code(&self) -> u8 {
        match self {
            Self::ParseFile { .. } => 1,
            Self::ParseArgs { .. }
            | Self::NoInputFiles
            | Self::MultipleFilesToStdout
            | Self::Convert {
                source: ConvertError::UnknownSchema,
                ..
            } => 2,
            Self::Convert { .. } | Self::CheckFailed { .. } => 3,
            Self::CreateOutputDir { .. }
            | Self::ReadFile { .. }
            | Self::InvalidFilename { .. }
            | Self::WriteFile { .. } => 4,
        }
    }
}

fn print_help() {
    println!(
        "\
{name} {version}
Convert YAML domain models to Markdown documentation

Usage: {name} [OPTIONS] <INPUT>...

Arguments:
  <INPUT>...  Input YAML files or directories containing them

Options:
  -o, --output <OUTPUT>     Output directory (default: .), or - for stdout
      --diagram-cap <N>     Max nodes per diagram collection (default: 10)
      --edge-cap <N>        Max example edges per relationship (default: 5)
      --no-diagrams         Omit Mermaid diagrams
      --check               Report duplicate ids and dangling references

Other options:
  -v, --verbose             Debug logging
  -q, --quiet               Suppress progress messages
  -n, --dry-run             Show what would be processed without writing
  -f, --force               Overwrite existing output files
  -h, --help                Print help
  -V, --version             Print version

Supported schemas:
  - Domain Stories (narrative scenarios with actors, commands and events)
  - Strategic DDD (domains, bounded contexts, context mappings)
  - Tactical DDD (aggregates, entities, value objects, services)
  - Data Engineering (pipelines, datasets, contracts, lineage)",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // Show help if no arguments provided
    if std::env::args().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut input = Vec::new();
    let mut output = OutputTarget::Directory(PathBuf::from("."));
    let mut render = RenderOptions::default();
    let mut check = false;
    let mut verbose = false;
    let mut quiet = false;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => {
                let val: PathBuf = parser.value()?.parse()?;
                output = if val == Path::new("-") {
                    OutputTarget::Stdout
                } else {
                    OutputTarget::Directory(val)
                };
            }
            Long("diagram-cap") => {
                let val: usize = parser
                    .value()?
                    .parse()
                    .map_err(|_| "diagram-cap must be a positive number")?;
                if val == 0 {
                    return Err("diagram-cap must be at least 1".into());
                }
                render.caps.max_nodes = val;
            }
            Long("edge-cap") => {
                render.caps.max_edges = parser
                    .value()?
                    .parse()
                    .map_err(|_| "edge-cap must be a number")?;
            }
            Long("no-diagrams") => render.diagrams = false,
            Long("check") => check = true,
            Short('v') | Long("verbose") => verbose = true,
            Short('q') | Long("quiet") => quiet = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Short('f') | Long("force") => force = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) => input.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli {
        input,
        output,
        render,
        check,
        verbose,
        quiet,
        dry_run,
        force,
    })
}

/// Logging goes to stderr. `RUST_LOG` takes precedence over the flags.
fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;
    init_logging(&cli);

    ensure!(!cli.input.is_empty(), NoInputFilesSnafu);

    // Collect all input files first
    let files = collect_input_files(&cli.input);
    debug!(files = files.len(), caps:? = cli.render.caps; "collected inputs");

    if cli.check {
        return check_files(&files);
    }

    match &cli.output {
        OutputTarget::Stdout => {
            ensure!(files.len() == 1, MultipleFilesToStdoutSnafu);
            process_to_stdout(&files[0], &cli)?;
        }
        OutputTarget::Directory(dir) => {
            if !cli.dry_run {
                std::fs::create_dir_all(dir).context(CreateOutputDirSnafu { path: dir })?;
            }
            for file in &files {
                process_file(file, dir, &cli)?;
            }
        }
    }

    Ok(())
}

/// Collects all YAML files from the given inputs (files and directories).
/// Directory entries are sorted so batch output order is reproducible.
fn collect_input_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| {
                    e.file_type().is_file()
                        && e.path()
                            .extension()
                            .is_some_and(|ext| ext == "yaml" || ext == "yml")
                })
            {
                files.push(entry.path().to_path_buf());
            }
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Reads, parses and detects one input.
fn load(input: &Path) -> Result<Model, Error> {
    let yaml = std::fs::read_to_string(input).context(ReadFileSnafu { path: input })?;
    let document = parser::parse_document(&yaml).context(ParseFileSnafu { path: input })?;
    let model = Model::load(&document).context(ConvertSnafu { path: input })?;
    info!(path:? = input, kind = model.kind().description(); "loaded document");
    Ok(model)
}

/// Lints every input, printing findings to stdout.
fn check_files(files: &[PathBuf]) -> Result<(), Error> {
    let mut count = 0;
    for file in files {
        let findings = check(&load(file)?);
        for finding in &findings {
            println!("{}: {finding}", file.display());
        }
        count += findings.len();
    }
    ensure!(count == 0, CheckFailedSnafu { count });
    Ok(())
}

/// Processes a single file and outputs to stdout.
fn process_to_stdout(input: &Path, cli: &Cli) -> Result<(), Error> {
    if cli.dry_run {
        eprintln!("Would output {}", input.display());
        return Ok(());
    }

    let markdown = load(input)?.render(&cli.render);
    print!("{markdown}");
    Ok(())
}

/// Processes a single file and writes to the output directory.
///
/// The output name depends on the document: tactical models are named after
/// their bounded context, so the input is loaded before the name is known.
fn process_file(input: &Path, out_dir: &Path, cli: &Cli) -> Result<(), Error> {
    let model = load(input)?;
    let out_name = match model.output_name() {
        Some(name) => name,
        None => input
            .file_stem()
            .context(InvalidFilenameSnafu { path: input })?
            .to_string_lossy()
            .into_owned(),
    };
    let out_path = out_dir.join(format!("{out_name}.md"));

    // Handle dry-run mode
    if cli.dry_run {
        eprintln!("Would write {}", out_path.display());
        return Ok(());
    }

    // Check if output exists and handle overwrite
    if out_path.exists() && !cli.force {
        eprintln!(
            "Skipping {} (already exists, use --force to overwrite)",
            out_path.display()
        );
        return Ok(());
    }

    let markdown = model.render(&cli.render);
    std::fs::write(&out_path, &markdown).context(WriteFileSnafu { path: &out_path })?;

    if !cli.quiet {
        eprintln!("Wrote {}", out_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_failure_class() {
        let unknown = Error::Convert {
            path: PathBuf::from("a.yaml"),
            source: ConvertError::UnknownSchema,
        };
        assert_eq!(unknown.exit_code(), 2);
        assert_eq!(Error::CheckFailed { count: 1 }.exit_code(), 3);
        assert_eq!(
            Error::InvalidFilename {
                path: PathBuf::from("..")
            }
            .exit_code(),
            4
        );
    }

    #[test]
    fn collects_yaml_files_from_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yml"), "").unwrap();
        std::fs::write(dir.path().join("a.yaml"), "").unwrap();
        std::fs::write(dir.path().join("notes.md"), "").unwrap();

        let files = collect_input_files(&[dir.path().to_path_buf()]);
        let names: Vec<_> = files
            .iter()
            .filter_map(|f| f.file_name()?.to_str())
            .collect();
        assert_eq!(names, ["a.yaml", "b.yml"]);
    }
}
