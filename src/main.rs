//! modeldoc — dump the mapping metadata of annotated Rust model structs.
//!
//! Supports two modes:
//!
//! - **stdin mode**: `modeldoc < src/order.rs`
//! - **file mode**: `modeldoc -o docs/models -f markdown src/models/*.rs`

mod render;

use anyhow::{Context, Result};
use clap::Parser;
use modeldoc::{source, ClassInfo, ModelClass, Record};
use std::collections::HashSet;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "modeldoc",
    about = "Extract serializer metadata from @-annotated Rust model structs"
)]
struct Cli {
    /// Input files (glob patterns supported). If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory (required when files are given)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: json (default), markdown
    #[arg(short = 'f', long, default_value = "json")]
    format: String,

    /// Namespace for every model. Defaults to the file's module name;
    /// the root namespace in stdin mode.
    #[arg(short = 'n', long)]
    namespace: Option<String>,

    /// Log descriptor building to stderr. RUST_LOG overrides.
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.files.is_empty() {
        return stdin_mode(&cli);
    }

    file_mode(&cli)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "modeldoc=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .without_time()
        .init();
}

/// stdin mode: read one source from stdin, write descriptors to stdout.
fn stdin_mode(cli: &Cli) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let namespace = cli.namespace.as_deref().unwrap_or("");
    let models = build_models(source::parse(&input, namespace), "<stdin>");
    let renderer = render::create_renderer(&cli.format)?;
    print!("{}", renderer.render(&models)?);
    Ok(())
}

/// file mode: one output file per source file that declares models.
fn file_mode(cli: &Cli) -> Result<()> {
    let output_dir = cli
        .output
        .as_deref()
        .context("--output is required when files are given")?;

    let renderer = render::create_renderer(&cli.format)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    for path in expand_globs(&cli.files)? {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let namespace = match cli.namespace {
            Some(ref ns) => ns.clone(),
            None => derive_namespace(&path),
        };
        let source_name = path.to_string_lossy();
        let models = build_models(source::parse(&content, &namespace), &source_name);
        // Skip files without usable models (e.g. lib.rs, error.rs)
        if models.is_empty() {
            debug!("no models in {}", path.display());
            continue;
        }

        let out_path = output_dir.join(format!(
            "{}.{}",
            derive_output_name(&path),
            renderer.file_extension()
        ));
        fs::write(&out_path, renderer.render(&models)?)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
    }

    Ok(())
}

/// Describe every scanned struct. Structs that cannot be described (no
/// named fields) are reported and left out.
///
/// Each descriptor is built from its own scanned class, so structs that
/// share a name (e.g. in sibling inline modules) are all kept.
fn build_models(classes: Vec<ClassInfo>, source_name: &str) -> Vec<ModelClass> {
    let mut seen = HashSet::new();
    let mut models = Vec::new();
    for class in classes {
        let name = class.qualified_name();
        if !seen.insert(name.clone()) {
            warn!("{}: duplicate model name {}", source_name, name);
        }
        match ModelClass::build(&Record::new(Arc::new(class))) {
            Ok(model) => models.push(model),
            Err(e) => warn!("{}: skipping {}: {}", source_name, name, e),
        }
    }
    models
}

/// Expand CLI arguments into a sorted list of `.rs` sources.
///
/// Plain files are taken as given. Directories contribute their `.rs`
/// files (non-recursive); anything else is treated as a glob pattern.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            files.extend(rust_sources_in(path)?);
        } else {
            let matches = glob_rust_sources(pattern)?;
            if matches.is_empty() {
                warn!("no files matched: {}", pattern);
            }
            files.extend(matches);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_rust_source(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "rs")
}

fn rust_sources_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;
    Ok(entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| is_rust_source(p))
        .collect())
}

/// Glob matches that are `.rs` files. Unreadable entries are skipped.
fn glob_rust_sources(pattern: &str) -> Result<Vec<PathBuf>> {
    Ok(glob::glob(pattern)
        .with_context(|| format!("invalid glob pattern: {}", pattern))?
        .flatten()
        .filter(|p| is_rust_source(p))
        .collect())
}

/// Module name of a source file: "src/shop/order.rs" → "order",
/// "src/shop/mod.rs" → "shop".
fn derive_namespace(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    match stem {
        "mod" | "lib" | "main" => path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .filter(|s| *s != "src")
            .unwrap_or("")
            .to_string(),
        _ => stem.to_string(),
    }
}

/// Output file name (without extension): "src/order.rs" → "order",
/// "src/shop/mod.rs" → "shop".
fn derive_output_name(path: &Path) -> String {
    match derive_namespace(path) {
        name if name.is_empty() => path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default(),
        name => name,
    }
}
