//! CLI command implementations

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rayon::prelude::*;

use stepgraph_ai::{create_provider, MetadataProvider};
use stepgraph_render::RenderContext;

use crate::processor::{FileProcessor, Outcome};

#[derive(clap::Args)]
pub struct ProcessArgs {
    /// Folder containing STEP files
    #[arg(long)]
    pub input: PathBuf,

    /// Folder to save output files
    #[arg(long)]
    pub output: PathBuf,

    /// Process all files, including artifacts that already exist
    #[arg(long)]
    pub process_all: bool,

    /// Generate assembly metadata using OpenAI
    #[arg(long)]
    pub generate_metadata: bool,

    /// Generate metadata from part images when the names carry no signal
    #[arg(long, requires = "images", requires = "generate_metadata")]
    pub images_metadata: bool,

    /// Write processing_log.txt in the output folder
    #[arg(long)]
    pub log: bool,

    /// Generate the assembly (part proximity) graph
    #[arg(long)]
    pub assembly: bool,

    /// Save the assembly graph as a static SVG (requires --assembly)
    #[arg(long, requires = "assembly")]
    pub save_svg: bool,

    /// Save the assembly graph as interactive HTML (requires --assembly)
    #[arg(long, requires = "assembly")]
    pub save_html: bool,

    /// Generate the hierarchical (shell/face/edge) graph
    #[arg(long)]
    pub hierarchical: bool,

    /// Skip candidate pairs whose parts share the same name
    #[arg(long)]
    pub no_self_connections: bool,

    /// Write per-file statistics JSON
    #[arg(long)]
    pub stats: bool,

    /// Save wireframe images of the parts
    #[arg(long)]
    pub images: bool,

    /// Run without a display attached
    #[arg(long)]
    pub headless: bool,

    /// Worker threads (defaults to half the available cores)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Use all available cores
    #[arg(long)]
    pub max_performance: bool,
}

pub async fn process(args: ProcessArgs) -> anyhow::Result<()> {
    validate(&args)?;
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("creating output folder {}", args.output.display()))?;

    let files = scan_step_files(&args.input)?;
    if files.is_empty() {
        tracing::warn!("no STEP files found in {}", args.input.display());
        println!("No STEP files found in {}", args.input.display());
        return Ok(());
    }

    let workers = worker_count(&args);
    tracing::info!(files = files.len(), workers, "starting batch");
    println!("Processing {} files using {} workers", files.len(), workers);

    let provider: Option<Arc<dyn MetadataProvider>> = if args.generate_metadata {
        Some(Arc::from(create_provider("openai", None)?))
    } else {
        None
    };

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, finishing current work");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("building worker pool")?;

    let multi = MultiProgress::new();
    let overall = multi.add(ProgressBar::new(files.len() as u64));
    overall.set_style(
        ProgressStyle::default_bar()
            .template("Overall  [{bar:40}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=> "),
    );

    let handle = tokio::runtime::Handle::current();
    let options = Arc::new(args);
    let outcomes: Vec<Outcome> = {
        let options = Arc::clone(&options);
        let cancel = Arc::clone(&cancel);
        let multi = multi.clone();
        let overall = overall.clone();
        tokio::task::spawn_blocking(move || {
            pool.install(|| {
                files
                    .par_iter()
                    .map_init(
                        || RenderContext::new(options.headless),
                        |ctx, path| {
                            let outcome = FileProcessor::new(path, &options).run(
                                ctx,
                                &handle,
                                provider.as_deref(),
                                &cancel,
                                &multi,
                            );
                            overall.inc(1);
                            outcome
                        },
                    )
                    .collect()
            })
        })
        .await?
    };
    overall.finish_and_clear();

    for outcome in &outcomes {
        println!("{}", outcome.message());
    }
    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, Outcome::Failed { .. }))
        .count();
    tracing::info!(
        total = outcomes.len(),
        failed,
        "finished processing all files"
    );
    if cancel.load(Ordering::Relaxed) {
        println!("Process interrupted by user. Exiting gracefully...");
    }
    Ok(())
}

fn validate(args: &ProcessArgs) -> anyhow::Result<()> {
    if args.generate_metadata && std::env::var("OPENAI_API_KEY").unwrap_or_default().is_empty() {
        anyhow::bail!("OpenAI API key not found in environment variables");
    }
    if !args.input.is_dir() {
        anyhow::bail!("input folder not found: {}", args.input.display());
    }
    Ok(())
}

/// All .step/.stp files directly inside the input folder, sorted.
fn scan_step_files(input: &std::path::Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input)
        .with_context(|| format!("reading input folder {}", input.display()))?
    {
        let path = entry?.path();
        let is_step = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .is_some_and(|ext| ext == "step" || ext == "stp");
        if path.is_file() && is_step {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn worker_count(args: &ProcessArgs) -> usize {
    let cores = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);
    if let Some(n) = args.workers {
        return n.max(1);
    }
    if args.max_performance {
        cores
    } else {
        (cores / 2).max(1)
    }
}
