use anyhow::Context;
use clap::{Parser, Subcommand};
use fiesta::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Embed Four Job Fiesta parties and pick diverse sets of them
#[derive(Parser, Debug)]
#[command(name = "fiesta")]
#[command(about = "Embed Four Job Fiesta parties and pick diverse sets of them", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate every legal party of a rule variant and save the embeddings
    Embed {
        /// Job catalog CSV
        #[arg(short, long)]
        catalog: PathBuf,

        /// Rule variant: Regular, Typhoon, Volcano or Meteor
        #[arg(short, long, default_value = "Regular")]
        variant: String,

        /// Output file (.csv for CSV, anything else for a binary snapshot)
        #[arg(short, long)]
        out: PathBuf,

        /// Equipment weight in (0, 1]
        #[arg(long, default_value_t = 1.0)]
        equipment_weight: f32,

        /// Job to down-weight in the membership block (repeatable)
        #[arg(long = "special")]
        special: Vec<String>,

        /// Append the scaled stats block
        #[arg(long)]
        stats: bool,

        /// Keep parties that repeat a job
        #[arg(long)]
        duplicates: bool,

        /// Basic job every character falls back to
        #[arg(long, default_value = "Freelancer")]
        basic_job: String,
    },

    /// Run selection trials over saved embeddings
    Select {
        /// Embeddings file written by `embed`
        #[arg(short, long)]
        embeddings: PathBuf,

        /// Parties per trial
        #[arg(short, long, default_value_t = 10)]
        count: usize,

        /// Number of trials
        #[arg(short, long, default_value_t = 1)]
        trials: usize,

        /// Starting distance threshold
        #[arg(long, default_value_t = 1.0)]
        eps: f32,

        /// Selection strategy: diversity or random
        #[arg(long, default_value = "diversity")]
        strategy: String,

        /// Base seed; trial t uses seed + t
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Worker threads (0 = one per core)
        #[arg(long, default_value_t = 0)]
        workers: usize,

        /// Include pairwise distance matrices
        #[arg(long)]
        matrix: bool,

        /// Write JSON results here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting fiesta v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Embed {
            catalog,
            variant,
            out,
            equipment_weight,
            special,
            stats,
            duplicates,
            basic_job,
        } => {
            let options = CatalogOptions::default().with_basic_job(basic_job);
            let catalog = load_catalog(&catalog, &options)
                .with_context(|| format!("loading catalog {:?}", catalog))?;
            let variant: RuleVariant = variant.parse()?;

            let parties = enumerate_parties(&catalog, variant, duplicates);
            info!(variant = %variant, parties = parties.len(), "enumerated parties");

            let params = EmbeddingParams::default()
                .with_equipment_weight(equipment_weight)
                .with_special_jobs(special)
                .with_stats(if stats { StatsBlock::Auto } else { StatsBlock::Disabled });
            let embedder = PartyEmbedder::new(&catalog, &params)?;
            let embeddings = embedder.embed_all(&parties)?;

            save_embeddings(&out, &embeddings)
                .with_context(|| format!("saving embeddings to {:?}", out))?;
            info!(dim = embedder.dim(), "Embeddings written to {:?}", out);
        }
        Command::Select {
            embeddings,
            count,
            trials,
            eps,
            strategy,
            seed,
            workers,
            matrix,
            out,
        } => {
            let pool = load_embeddings(&embeddings)
                .with_context(|| format!("loading embeddings {:?}", embeddings))?;
            let config = TrialConfig::default()
                .with_count(count)
                .with_trials(trials)
                .with_eps(eps)
                .with_selector(strategy.parse()?)
                .with_matrix(matrix)
                .with_seed(seed)
                .with_workers(workers);

            let results = run_trials(&pool, &config, &CancellationToken::new())?;

            match out {
                Some(path) => {
                    let mut writer = BufWriter::new(File::create(&path)?);
                    serde_json::to_writer_pretty(&mut writer, &results)?;
                    writer.flush()?;
                    info!("Trial results written to {:?}", path);
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut writer = stdout.lock();
                    serde_json::to_writer_pretty(&mut writer, &results)?;
                    writeln!(writer)?;
                }
            }
        }
    }

    Ok(())
}
