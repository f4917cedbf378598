//! kgsaint CLI - knowledge-graph data preparation from the command line.
//!
//! A dataset lives in `<data-dir>/<dataset>/` as two whitespace-delimited
//! integer tables, `ratings_final.txt` (`user item label`) and `kg_final.txt`
//! (`head relation tail`).
//!
//! # Usage
//!
//! ```bash
//! # Counts and graph statistics
//! kgsaint stats --data-dir data --dataset movie
//!
//! # Parse the text tables and (re)write the binary caches
//! kgsaint cache --dataset movie
//!
//! # Write train/eval/test rating tables
//! kgsaint split --dataset movie -o out/ --train-ratio 0.8
//!
//! # COO adjacency, or fixed-width sampled neighbors
//! kgsaint adjacency --dataset movie -o adj.tsv
//! kgsaint adjacency --dataset movie -o adj.tsv --width 8 --seed 7
//!
//! # Everything at once, driven by a JSON config
//! kgsaint prepare --config pipeline.json -o out/
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::ProgressBar;
use kgsaint_core::algo::adjacency::Adjacency;
use kgsaint_core::formats::Tsv;
use kgsaint_core::pipeline;
use kgsaint_core::{
    renumber_ratings, renumber_triples, split_ratings, DataSource, DatasetSplit, Flattening,
    KnowledgeGraph, PipelineConfig, RecordKind,
};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kgsaint")]
#[command(
    about = "Knowledge-graph data preparation for sampled GNN recommenders",
    long_about = None
)]
struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show user/item counts and knowledge graph statistics
    Stats {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Parse both text tables and rewrite their binary caches
    Cache {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Split ratings into train/eval/test tables
    Split {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        ratios: SplitArgs,

        /// Output directory (train.tsv, eval.tsv, test.tsv)
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// Flatten the knowledge graph adjacency
    Adjacency {
        #[command(flatten)]
        data: DataArgs,

        /// Sample this many neighbors per entity instead of writing COO
        #[arg(long)]
        width: Option<usize>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run the whole pipeline and write every artifact
    Prepare {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        ratios: SplitArgs,

        /// Sample this many neighbors per entity instead of writing COO
        #[arg(long)]
        width: Option<usize>,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,
    },
}

/// Where the data lives; flags override values from `--config`.
#[derive(Args)]
struct DataArgs {
    /// JSON pipeline config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root directory holding one sub-directory per dataset
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Dataset name
    #[arg(short, long)]
    dataset: Option<String>,

    /// Neither read nor write the binary cache
    #[arg(long)]
    no_cache: bool,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct SplitArgs {
    /// Fraction of ratings sent to eval
    #[arg(long)]
    eval_ratio: Option<f64>,

    /// Fraction of ratings sent to test
    #[arg(long)]
    test_ratio: Option<f64>,

    /// Fraction of the train remainder kept
    #[arg(long)]
    train_ratio: Option<f64>,
}

impl DataArgs {
    fn to_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dataset) = &self.dataset {
            config.dataset = dataset.clone();
        }
        if self.no_cache {
            config.use_cache = false;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        Ok(config)
    }
}

impl SplitArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(r) = self.eval_ratio {
            config.split.eval_ratio = r;
        }
        if let Some(r) = self.test_ratio {
            config.split.test_ratio = r;
        }
        if let Some(r) = self.train_ratio {
            config.split.train_ratio = r;
        }
    }
}

fn apply_width(config: &mut PipelineConfig, width: Option<usize>) {
    if let Some(width) = width {
        config.flattening = Flattening::FixedWidth { width };
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Stats { data } => cmd_stats(&data.to_config()?),
        Commands::Cache { data } => cmd_cache(&data.to_config()?),
        Commands::Split {
            data,
            ratios,
            output_dir,
        } => {
            let mut config = data.to_config()?;
            ratios.apply(&mut config);
            cmd_split(&config, &output_dir)
        }
        Commands::Adjacency {
            data,
            width,
            output,
        } => {
            let mut config = data.to_config()?;
            apply_width(&mut config, width);
            cmd_adjacency(&config, &output)
        }
        Commands::Prepare {
            data,
            ratios,
            width,
            output_dir,
        } => {
            let mut config = data.to_config()?;
            ratios.apply(&mut config);
            apply_width(&mut config, width);
            cmd_prepare(&config, &output_dir)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_graph(source: &DataSource) -> Result<KnowledgeGraph> {
    let start = Instant::now();
    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Loading knowledge graph of '{}'...", source.dataset()));

    let path = source.text_path(RecordKind::KnowledgeGraph);
    let table = source
        .load_kg()
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let triples = renumber_triples(&table).context("Failed to renumber triples")?;
    let kg = KnowledgeGraph::build(&triples).context("Failed to build knowledge graph")?;

    pb.finish_with_message(format!("Loaded in {:.2?}", start.elapsed()));
    Ok(kg)
}

fn cmd_stats(config: &PipelineConfig) -> Result<()> {
    let source = config.source();
    let path = source.text_path(RecordKind::Ratings);
    let table = source
        .load_ratings()
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let ratings = renumber_ratings(&table).context("Failed to renumber ratings")?;
    let kg = load_graph(&source)?;
    let stats = kg.stats();

    println!("Dataset Statistics");
    println!("==================");
    println!("Dataset:        {}", source.dataset());
    println!("Users:          {}", ratings.n_user());
    println!("Items:          {}", ratings.n_item());
    println!("Ratings:        {}", ratings.ratings().len());
    println!("Entities:       {}", stats.entity_count);
    println!("Relations:      {}", stats.relation_count);
    println!("Triples:        {}", stats.triple_count);
    println!("Adjacency:      {}", stats.edge_count);
    println!("Max degree:     {}", stats.max_degree);
    println!("Avg degree:     {:.2}", stats.avg_degree);

    Ok(())
}

fn cmd_cache(config: &PipelineConfig) -> Result<()> {
    let source = config.source();
    for kind in [RecordKind::Ratings, RecordKind::KnowledgeGraph] {
        let path = source
            .refresh_cache(kind)
            .with_context(|| format!("Failed to cache {} records", kind))?;
        println!("Cached {} -> {}", kind, path.display());
    }
    Ok(())
}

fn cmd_split(config: &PipelineConfig, output_dir: &Path) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let source = config.source();
    let path = source.text_path(RecordKind::Ratings);
    let table = source
        .load_ratings()
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let ratings = renumber_ratings(&table).context("Failed to renumber ratings")?;

    let mut rng = XorShiftRng::seed_from_u64(config.seed);
    let split = split_ratings(ratings.ratings(), &config.split, &mut rng)?;

    write_split(&split, output_dir)
}

fn cmd_adjacency(config: &PipelineConfig, output: &Path) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let kg = load_graph(&config.source())?;

    let start = Instant::now();
    let pb = ProgressBar::new_spinner();
    pb.set_message("Flattening adjacency...");
    let mut rng = XorShiftRng::seed_from_u64(config.seed);
    let adjacency = config.flattening.flatten(&kg, &mut rng)?;
    pb.finish_with_message(format!("Flattened in {:.2?}", start.elapsed()));

    write_adjacency(&adjacency, output)
}

fn cmd_prepare(config: &PipelineConfig, output_dir: &Path) -> Result<()> {
    let start = Instant::now();
    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Preparing '{}'...", config.dataset));
    let data = pipeline::prepare(config).context("Failed to prepare dataset")?;
    pb.finish_with_message(format!("Prepared in {:.2?}", start.elapsed()));

    write_split(&data.split, output_dir)?;
    write_adjacency(&data.adjacency, &output_dir.join("adjacency.tsv"))?;

    println!("Users:          {}", data.n_user);
    println!("Items:          {}", data.n_item);
    println!("Entities:       {}", data.n_entity.saturating_sub(1));
    println!("Relations:      {}", data.n_relation);
    Ok(())
}

fn write_split(split: &DatasetSplit, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    for (name, ratings) in split.partitions() {
        let path = output_dir.join(format!("{name}.tsv"));
        let mut writer = create(&path)?;
        Tsv::write_ratings(ratings, &mut writer)?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{:<6} {:>8} ratings -> {}", name, ratings.len(), path.display());
    }
    Ok(())
}

fn write_adjacency(adjacency: &Adjacency, output: &Path) -> Result<()> {
    let mut writer = create(output)?;
    match adjacency {
        Adjacency::Coo(coo) => {
            Tsv::write_coo(coo, &mut writer)?;
            info!(edges = coo.len(), "wrote coo adjacency");
        }
        Adjacency::Sampled(sampled) => {
            Tsv::write_sampled(sampled, &mut writer)?;
            info!(
                rows = sampled.row_count(),
                width = sampled.width(),
                "wrote sampled adjacency"
            );
        }
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Adjacency -> {}", output.display());
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
