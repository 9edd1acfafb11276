//! md2sv CLI - Markdown to Svelte transpiler.
//!
//! Reads Markdown from files (or stdin) and writes Svelte components.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, bail};
use clap::Parser;
use md2sv_core::ParseOptions;
use md2sv_svelte::{Processor, ProcessorBuilder, Smartypants};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

/// Transpile Markdown with raw Svelte directives into Svelte components.
#[derive(Parser, Debug)]
#[command(name = "md2sv", version, about)]
struct Cli {
    /// Markdown files to transpile. Reads stdin when empty.
    inputs: Vec<PathBuf>,

    /// Output file (single input or stdin only). `-` writes to stdout.
    #[arg(short, long, conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Directory for `<name>.svelte` outputs. Defaults to next to each input.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Enable GFM (tables, task lists, strikethrough, autolinks).
    #[arg(long)]
    gfm: bool,

    /// Enable `$` and `$$` math.
    #[arg(long)]
    math: bool,

    /// Typographic quotes, dashes, and ellipses in text.
    #[arg(long)]
    smartypants: bool,

    /// JSON file with parse options. Flags are applied on top.
    #[arg(long, env = "MD2SV_CONFIG")]
    config: Option<PathBuf>,

    /// Worker threads for several inputs. Defaults to one per core.
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Keep going after a file fails.
    #[arg(long)]
    continue_on_error: bool,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // --verbose enables DEBUG, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let processor = build_processor(cli)?;

    if cli.inputs.is_empty() {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read stdin")?;
        let output = processor
            .process(&source)
            .context("Failed to transpile stdin")?;
        return write_output(cli.output.as_deref(), &output);
    }

    if cli.output.is_some() && cli.inputs.len() > 1 {
        bail!("--output takes a single input; use --out-dir for several");
    }
    if let Some(dir) = &cli.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let pool = match cli.jobs {
        Some(jobs) => Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .context("Failed to build thread pool")?,
        ),
        None => None,
    };

    let failed = AtomicUsize::new(0);
    let transpile = |input: &PathBuf| -> Result<()> {
        let result = transpile_file(&processor, cli, input);
        if let Err(err) = &result {
            failed.fetch_add(1, Ordering::Relaxed);
            log::error!("{err:#}");
        }
        result
    };

    if cli.continue_on_error {
        let run_all = || cli.inputs.par_iter().for_each(|input| {
            let _ = transpile(input);
        });
        match &pool {
            Some(pool) => pool.install(run_all),
            None => run_all(),
        }
        let failed = failed.load(Ordering::Relaxed);
        if failed > 0 {
            bail!("{} of {} files failed", failed, cli.inputs.len());
        }
        return Ok(());
    }

    let run_until_error = || cli.inputs.par_iter().try_for_each(transpile);
    match &pool {
        Some(pool) => pool.install(run_until_error),
        None => run_until_error(),
    }
}

fn build_processor(cli: &Cli) -> Result<Processor> {
    let options = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str::<ParseOptions>(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => ParseOptions::default(),
    };

    let gfm = cli.gfm;
    let math = cli.math;
    let mut builder = ProcessorBuilder::new()
        .options(options)
        .pre_document(move |options: &mut ParseOptions| {
            options.gfm |= gfm;
            options.math |= math;
        });
    if cli.smartypants {
        builder = builder.post_document(Smartypants);
    }
    Ok(builder.build())
}

fn transpile_file(processor: &Processor, cli: &Cli, input: &Path) -> Result<()> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let output = processor
        .process(&source)
        .with_context(|| format!("Failed to transpile {}", input.display()))?;

    let target = match (&cli.output, &cli.out_dir) {
        (Some(output), _) => output.clone(),
        (None, Some(dir)) => dir.join(svelte_name(input)),
        (None, None) => input.with_extension("svelte"),
    };
    write_output(Some(target.as_path()), &output)?;
    log::info!("Transpiled {} to {}", input.display(), target.display());
    Ok(())
}

fn svelte_name(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    Path::new(stem).with_extension("svelte")
}

fn write_output(target: Option<&Path>, output: &str) -> Result<()> {
    match target {
        Some(path) if path != Path::new("-") => std::fs::write(path, output)
            .with_context(|| format!("Failed to write {}", path.display())),
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .context("Failed to write stdout")?;
            stdout.flush().context("Failed to write stdout")
        }
    }
}
