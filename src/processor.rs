//! Per-file processing pipeline: decode, build graphs, write artifacts.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use stepgraph_ai::MetadataProvider;
use stepgraph_core::{
    build_assembly_graph, build_hierarchy_graph, valid_parts, write_assembly_graphml,
    write_hierarchy_graphml, AssemblyConfig, AssemblyGraph, GraphStats, HierarchyGraph, Part,
    Shape,
};
use stepgraph_render::{html::write_assembly_html, svg::write_assembly_svg, RenderContext};
use stepgraph_step::{BrepShape, StepDocument};

use crate::commands::ProcessArgs;

/// Result of processing one file, turned into a status line at the end
/// of the batch.
#[derive(Debug)]
pub enum Outcome {
    Processed { file: String },
    Skipped { file: String },
    Interrupted { file: String },
    Failed { file: String, error: String },
}

impl Outcome {
    pub fn message(&self) -> String {
        match self {
            Outcome::Processed { file } => format!(" {file} processed successfully"),
            Outcome::Skipped { file } => {
                format!(" {file} artifacts already exist, skipping")
            }
            Outcome::Interrupted { file } => format!(" {file} interrupted before completion"),
            Outcome::Failed { file, error } => format!(" Error processing {file}: {error}"),
        }
    }
}

/// Processes a single STEP file into the artifacts selected on the
/// command line. Each artifact lands in `<output>/<stem>/` and is
/// skipped individually when it already exists (unless --process-all).
pub struct FileProcessor<'a> {
    path: &'a Path,
    args: &'a ProcessArgs,
    filename: String,
    subfolder: PathBuf,
    stem: String,
}

impl<'a> FileProcessor<'a> {
    pub fn new(path: &'a Path, args: &'a ProcessArgs) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let subfolder = args.output.join(&stem);
        Self {
            path,
            args,
            filename,
            subfolder,
            stem,
        }
    }

    pub fn run(
        &self,
        ctx: &RenderContext,
        handle: &tokio::runtime::Handle,
        provider: Option<&dyn MetadataProvider>,
        cancel: &AtomicBool,
        progress: &MultiProgress,
    ) -> Outcome {
        if cancel.load(Ordering::Relaxed) {
            return Outcome::Interrupted {
                file: self.filename.clone(),
            };
        }
        match self.try_run(ctx, handle, provider, cancel, progress) {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!(file = %self.filename, %error, "processing failed");
                Outcome::Failed {
                    file: self.filename.clone(),
                    error: format!("{error:#}"),
                }
            }
        }
    }

    fn try_run(
        &self,
        ctx: &RenderContext,
        handle: &tokio::runtime::Handle,
        provider: Option<&dyn MetadataProvider>,
        cancel: &AtomicBool,
        progress: &MultiProgress,
    ) -> anyhow::Result<Outcome> {
        tracing::info!(file = %self.filename, "reading STEP file");
        let doc = StepDocument::read(self.path)
            .with_context(|| format!("decoding {}", self.filename))?;
        let parts = valid_parts(doc.parts);
        std::fs::create_dir_all(&self.subfolder)
            .with_context(|| format!("creating {}", self.subfolder.display()))?;

        let mut produced = 0usize;

        // Rendering and metadata failures degrade to a missing artifact,
        // they never fail the file.
        let images_dir = self.subfolder.join("images");
        if self.args.images {
            match self.render_images(ctx, &parts, &doc.root, &images_dir) {
                Ok(n) => produced += n,
                Err(error) => {
                    tracing::warn!(file = %self.filename, %error, "image rendering failed");
                }
            }
        }

        let mut assembly: Option<AssemblyGraph> = None;
        if self.args.assembly {
            let graphml_path = self.artifact("assembly.graphml");
            let svg_path = self.artifact("assembly.svg");
            let html_path = self.artifact("assembly.html");
            let need_graphml = self.missing(&graphml_path);
            let need_svg = self.args.save_svg && self.missing(&svg_path);
            let need_html = self.args.save_html && self.missing(&html_path);

            if need_graphml || need_svg || need_html || self.args.stats {
                tracing::info!(file = %self.filename, parts = parts.len(), "creating assembly graph");
                let graph = self.build_assembly(&parts, cancel, progress);
                if cancel.load(Ordering::Relaxed) {
                    return Ok(Outcome::Interrupted {
                        file: self.filename.clone(),
                    });
                }
                if need_graphml {
                    let mut w = BufWriter::new(File::create(&graphml_path)?);
                    write_assembly_graphml(&graph, &mut w)?;
                    produced += 1;
                }
                if need_svg {
                    let mut w = BufWriter::new(File::create(&svg_path)?);
                    write_assembly_svg(&mut w, &graph)?;
                    produced += 1;
                }
                if need_html {
                    let images = self.args.images.then_some(images_dir.as_path());
                    let mut w = BufWriter::new(File::create(&html_path)?);
                    write_assembly_html(&mut w, &graph, images)?;
                    produced += 1;
                }
                assembly = Some(graph);
            } else {
                tracing::info!(file = %self.filename, "assembly artifacts already exist, skipping");
            }
        }

        let mut hierarchy: Option<HierarchyGraph> = None;
        if self.args.hierarchical {
            let path = self.artifact("hierarchical.graphml");
            if self.missing(&path) || self.args.stats {
                tracing::info!(file = %self.filename, "creating hierarchical graph");
                let shells = doc.root.shell_topology();
                let graph = build_hierarchy_graph(&shells);
                if self.missing(&path) {
                    let mut w = BufWriter::new(File::create(&path)?);
                    write_hierarchy_graphml(&graph, &mut w)?;
                    produced += 1;
                }
                hierarchy = Some(graph);
            } else {
                tracing::info!(file = %self.filename, "hierarchical graph already exists, skipping");
            }
        }

        if self.args.stats {
            let path = self.artifact("stats.json");
            if self.missing(&path) {
                let stats = GraphStats::gather(&parts, assembly.as_ref(), hierarchy.as_ref());
                let w = BufWriter::new(File::create(&path)?);
                stats.write_json(w)?;
                produced += 1;
            }
        }

        if let Some(provider) = provider {
            match self.generate_metadata(handle, provider, &parts, &images_dir) {
                Ok(n) => produced += n,
                Err(error) => {
                    tracing::warn!(file = %self.filename, %error, "metadata generation failed");
                }
            }
        }

        tracing::info!(file = %self.filename, produced, "finished processing");
        if produced == 0 {
            Ok(Outcome::Skipped {
                file: self.filename.clone(),
            })
        } else {
            Ok(Outcome::Processed {
                file: self.filename.clone(),
            })
        }
    }

    fn build_assembly(
        &self,
        parts: &[Part<BrepShape>],
        cancel: &AtomicBool,
        progress: &MultiProgress,
    ) -> AssemblyGraph {
        // Upper bound: spatial pruning usually evaluates far fewer pairs.
        let total = (parts.len() * parts.len().saturating_sub(1) / 2) as u64;
        let pb = progress.add(ProgressBar::new(total));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:>24} [{bar:30}] {pos}/{len} pairs")
                .unwrap()
                .progress_chars("=> "),
        );
        pb.set_prefix(self.filename.clone());

        let config = AssemblyConfig {
            no_self_connections: self.args.no_self_connections,
        };
        let graph = build_assembly_graph(parts, &config, &mut || {
            pb.inc(1);
            !cancel.load(Ordering::Relaxed)
        });
        if cancel.load(Ordering::Relaxed) {
            pb.abandon();
        } else {
            pb.finish_and_clear();
        }
        graph
    }

    fn render_images(
        &self,
        ctx: &RenderContext,
        parts: &[Part<BrepShape>],
        root: &BrepShape,
        images_dir: &Path,
    ) -> anyhow::Result<usize> {
        std::fs::create_dir_all(images_dir)?;
        let mut produced = 0;
        for part in parts {
            let path = images_dir.join(format!("{}.png", sanitize(&part.name)));
            if !self.missing(&path) {
                continue;
            }
            ctx.save_wireframe(part.shape.vertices(), part.shape.segments(), &path)
                .with_context(|| format!("rendering {}", part.name))?;
            produced += 1;
        }
        let assembly_view = images_dir.join("assembly.png");
        if self.missing(&assembly_view) {
            ctx.save_wireframe(root.vertices(), root.segments(), &assembly_view)
                .context("rendering assembly view")?;
            produced += 1;
        }
        Ok(produced)
    }

    fn generate_metadata(
        &self,
        handle: &tokio::runtime::Handle,
        provider: &dyn MetadataProvider,
        parts: &[Part<BrepShape>],
        images_dir: &Path,
    ) -> anyhow::Result<usize> {
        // Tiny assemblies carry too little signal to be worth a call.
        if parts.len() <= 3 {
            return Ok(0);
        }
        let path = self.artifact("metadata.json");
        if !self.missing(&path) {
            return Ok(0);
        }

        tracing::info!(file = %self.filename, "generating metadata");
        let names: Vec<String> = parts.iter().map(|p| p.name.clone()).collect();
        let mut metadata = handle.block_on(provider.from_part_names(&self.filename, &names))?;

        if metadata.is_none() && self.args.images_metadata {
            tracing::info!(file = %self.filename, "part names uninformative, trying images");
            let images = load_part_images(images_dir)?;
            if !images.is_empty() {
                metadata = handle.block_on(provider.from_images(&self.filename, &images))?;
            }
        }

        match metadata {
            Some(metadata) => {
                let w = BufWriter::new(File::create(&path)?);
                serde_json::to_writer_pretty(w, &metadata)?;
                Ok(1)
            }
            None => {
                tracing::info!(file = %self.filename, "no usable metadata generated");
                Ok(0)
            }
        }
    }

    fn artifact(&self, suffix: &str) -> PathBuf {
        self.subfolder.join(format!("{}_{suffix}", self.stem))
    }

    /// Whether an artifact still needs to be produced.
    fn missing(&self, path: &Path) -> bool {
        self.args.process_all || !path.exists()
    }
}

/// Part names become file names; keep them path-safe.
fn sanitize(name: &str) -> String {
    name.replace(['/', '\\', ':'], "_")
}

/// Up to eight rendered part views, enough signal without blowing up
/// the request size.
fn load_part_images(images_dir: &Path) -> anyhow::Result<Vec<Vec<u8>>> {
    let mut paths: Vec<PathBuf> = match std::fs::read_dir(images_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "png"))
            .collect(),
        Err(_) => return Ok(Vec::new()),
    };
    paths.sort();
    paths
        .into_iter()
        .take(8)
        .map(|p| std::fs::read(&p).with_context(|| format!("reading {}", p.display())))
        .collect()
}
