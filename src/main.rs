use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueHint};
use nock::storage::{dump_parquet, rdf_format_from_name};
use nock::Partition;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about, version, name = "nock")]
/// Convert property graphs between CSV, Parquet and RDF
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a Parquet file
    LoadParq {
        #[command(flatten)]
        common: CommonArgs,
        /// Print the Parquet file metadata and exit
        #[arg(long)]
        dump: bool,
    },
    /// Load a CSV file
    LoadCsv {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Load an RDF file
    ///
    /// Here --format names the input serialization; --save-rdf writes the
    /// same serialization.
    LoadRdf {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Input file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    file: PathBuf,
    /// Emit nodes, relations and edges in sorted order
    #[arg(long)]
    sort: bool,
    /// Log at debug level and print the loaded partition
    #[arg(long)]
    debug: bool,
    /// Write the partition as CSV
    #[arg(long, value_hint = ValueHint::FilePath)]
    save_csv: Option<PathBuf>,
    /// Write the partition as Parquet
    #[arg(long, value_hint = ValueHint::FilePath)]
    save_parq: Option<PathBuf>,
    /// Write the RDF projection of the partition
    #[arg(long, value_hint = ValueHint::FilePath)]
    save_rdf: Option<PathBuf>,
    /// RDF format: an extension like "ttl", "nt", "rdf" or a MIME type
    #[arg(long, default_value = "ttl")]
    format: String,
}

impl Command {
    fn common(&self) -> &CommonArgs {
        match self {
            Self::LoadParq { common, .. } | Self::LoadCsv { common } | Self::LoadRdf { common } => {
                common
            }
        }
    }
}

fn init_tracing(debug: bool) -> Result<()> {
    let level = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(io::stderr)
        .init();

    Ok(())
}

async fn save_all(part: &Partition, common: &CommonArgs) -> Result<()> {
    if common.debug {
        let mut out = io::stdout().lock();
        part.dump_data(&mut out)?;
        out.flush()?;
    }

    if let Some(path) = &common.save_csv {
        part.save_file_csv(path, common.sort)?;
    }

    if let Some(path) = &common.save_parq {
        part.save_file_parquet(path, common.sort).await?;
    }

    if let Some(path) = &common.save_rdf {
        let format = rdf_format_from_name(&common.format)?;
        part.save_file_rdf(path, format, common.sort)?;
    }

    Ok(())
}

async fn run(command: &Command) -> Result<()> {
    let mut part = Partition::new(0);

    match command {
        Command::LoadParq { common, dump: true } => {
            let mut out = io::stdout().lock();
            dump_parquet(&common.file, &mut out)?;
            return Ok(());
        }
        Command::LoadParq { common, .. } => part.load_parquet(&common.file).await?,
        Command::LoadCsv { common } => part.load_csv(&common.file)?,
        Command::LoadRdf { common } => {
            let format = rdf_format_from_name(&common.format)
                .with_context(|| format!("Cannot read {}", common.file.display()))?;
            part.load_rdf(&common.file, format)?;
        }
    }

    info!(
        nodes = part.num_nodes(),
        edges = part.num_edges(),
        relations = part.relations().len(),
        "partition loaded"
    );

    save_all(&part, command.common()).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.command.common().debug)?;

    run(&cli.command).await
}
