//! svg_guard - Validate or sanitize SVG files.
//!
//! This tool checks SVG files against the security policy, printing one line
//! per file and one line per violation. Directories are walked recursively
//! and every `*.svg` file inside is checked.
//!
//! # Usage
//!
//! ```bash
//! svg_guard [OPTIONS] <PATH>...
//! ```
//!
//! # Examples
//!
//! ```bash
//! # Check a single upload
//! svg_guard avatar.svg
//!
//! # Check a directory with 4 threads
//! svg_guard -j 4 /srv/uploads
//!
//! # Sanitize into another directory, allowing https images
//! svg_guard --sanitize --allow-https --output-dir clean/ icons/
//!
//! # Accept custom elements and attributes
//! svg_guard --extra-elements cursor --extra-attributes horiz-adv-x font.svg
//! ```
//!
//! The exit status is 1 when any file is not accepted unchanged.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use rayon::prelude::*;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use safe_svg_rs::policy::{PolicyCatalog, StylePolicy};
use safe_svg_rs::reader::ReaderConfig;
use safe_svg_rs::validation::{SvgValidator, ValidationOptions, ValidationOutcome};
use safe_svg_rs::walker::ValidationMode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Validate or sanitize SVG files.
#[derive(Parser, Debug)]
#[command(name = "svg_guard")]
#[command(version = VERSION)]
#[command(about = "Validate or sanitize SVG files against a security policy")]
#[command(long_about = "Parses each SVG file defensively and checks every element, \
    attribute and reference against an allow/deny policy. Directories are walked \
    recursively for *.svg files.")]
struct Args {
    /// Files or directories to check
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Remove offending elements and attributes instead of only rejecting
    #[arg(short, long)]
    sanitize: bool,

    /// Write accepted and sanitized documents to this directory
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Allow https: references
    #[arg(long)]
    allow_https: bool,

    /// Allow data: references to PNG, JPEG, GIF and WebP images
    #[arg(long)]
    allow_data_images: bool,

    /// Allow screened CSS in style attributes and elements
    #[arg(long)]
    allow_style: bool,

    /// Additional elements to allow (comma-separated)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    extra_elements: Vec<String>,

    /// Additional attributes to allow (comma-separated, e.g. 'horiz-adv-x,xlink:title')
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    extra_attributes: Vec<String>,

    /// Maximum input size in bytes
    #[arg(long, value_name = "BYTES")]
    max_size: Option<usize>,

    /// Number of file-processing threads to run
    #[arg(short, long, default_value = "1")]
    jobs: usize,

    /// Follow symbolic links when walking directories
    #[arg(long)]
    follow_links: bool,
}

/// A file to check and the input root it was found under.
struct Input {
    root: PathBuf,
    path: PathBuf,
}

impl Input {
    /// Path of the output file relative to the output directory
    fn relative(&self) -> PathBuf {
        match self.path.strip_prefix(&self.root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => self
                .path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output.svg")),
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("SVG_GUARD_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn build_catalog(args: &Args) -> safe_svg_rs::Result<PolicyCatalog> {
    let mut builder = PolicyCatalog::builder()
        .with_additional_elements(&args.extra_elements)?
        .with_additional_attributes(&args.extra_attributes)?;

    if args.allow_https {
        builder = builder.allow_uri_scheme("https")?;
    }
    if args.allow_data_images {
        builder = builder.allow_data_images();
    }
    if args.allow_style {
        builder = builder.with_style_policy(StylePolicy::Screened);
    }
    Ok(builder.build())
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}

/// Expands the command line paths into the list of files to check.
fn collect_inputs(args: &Args) -> Vec<Input> {
    let mut inputs = Vec::new();

    for root in &args.paths {
        if !root.is_dir() {
            inputs.push(Input {
                root: root.parent().map(Path::to_path_buf).unwrap_or_default(),
                path: root.clone(),
            });
            continue;
        }

        let walker = WalkDir::new(root)
            .follow_links(args.follow_links)
            .sort_by_file_name();
        for entry in walker {
            match entry {
                Ok(e) if e.file_type().is_file() && is_svg(e.path()) => inputs.push(Input {
                    root: root.clone(),
                    path: e.path().to_path_buf(),
                }),
                Ok(_) => {}
                Err(e) => warn!("error walking directory: {}", e),
            }
        }
    }

    inputs
}

fn write_output(dir: &Path, input: &Input, svg: &[u8]) -> io::Result<()> {
    let target = dir.join(input.relative());
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, svg)
}

fn report<W: Write>(out: &mut W, path: &Path, outcome: &ValidationOutcome) -> io::Result<()> {
    writeln!(out, "{}: {}", path.display(), outcome.kind())?;
    for violation in outcome.violations() {
        writeln!(out, "  {}", violation)?;
    }
    if let Some(error) = outcome.error() {
        writeln!(out, "  {}", error)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.debug);

    if args.jobs == 0 {
        eprintln!("Error: jobs must be at least 1");
        std::process::exit(2);
    }

    let catalog = match build_catalog(&args) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let mut reader = ReaderConfig::new();
    if let Some(max_size) = args.max_size {
        reader = reader.with_max_input_size(max_size);
    }
    let mode = if args.sanitize {
        ValidationMode::SanitizeInPlace
    } else {
        ValidationMode::RejectOnViolation
    };
    let options = ValidationOptions::new()
        .with_mode(mode)
        .with_reader_config(reader)
        .with_policy(catalog);
    let validator = SvgValidator::with_options(&options);

    let inputs = collect_inputs(&args);
    debug!(files = inputs.len(), jobs = args.jobs, "collected inputs");

    let outcomes: Vec<ValidationOutcome> = if args.jobs > 1 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.jobs)
            .build_global()
            .ok();

        inputs
            .par_iter()
            .map(|input| validator.validate_file(&input.path))
            .collect()
    } else {
        inputs
            .iter()
            .map(|input| validator.validate_file(&input.path))
            .collect()
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let mut all_valid = true;

    for (input, outcome) in inputs.iter().zip(&outcomes) {
        report(&mut handle, &input.path, outcome)?;
        all_valid &= outcome.is_valid();

        if let (Some(dir), Some(svg)) = (&args.output_dir, outcome.sanitized_document()) {
            write_output(dir, input, svg)?;
        }
    }
    handle.flush()?;

    if !all_valid {
        std::process::exit(1);
    }
    Ok(())
}
