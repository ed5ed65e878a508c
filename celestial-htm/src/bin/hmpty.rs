use celestial_htm::conesearch::{ConeSearchParams, ConeSearchPlanner, ConeSearchResult, PlannerConfig};
use celestial_htm::mesh::{self, Mesh, MeshCache};
use celestial_htm::store::{IndexerConfig, MemoryTable, TrixelIndexer};
use celestial_htm::Coordinates;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Parser)]
#[command(name = "hmpty")]
#[command(about = "HTM trixel ids, table indexing and cone searches")]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the trixel id of a position
    Htmid {
        /// Mesh depth (0-25)
        depth: u8,
        /// Right ascension (degrees, or HMS e.g. 10:20:30, 10h20m30s)
        ra: String,
        /// Declination (degrees, or DMS e.g. -45:30:15, -45d30m15s)
        dec: String,
    },
    /// Add trixel id columns to a JSON table
    Index {
        /// Path to the table file
        table: PathBuf,
        /// Recompute ids for rows that already have them
        #[arg(long)]
        force: bool,
        /// Depths to populate
        #[arg(long, value_delimiter = ',', default_value = "16,13,10")]
        depths: Vec<u8>,
        /// Rows per batch
        #[arg(long, default_value = "2500")]
        batch_size: usize,
    },
    /// Cone search an indexed JSON table
    Search {
        /// Path to the table file
        table: PathBuf,
        /// Right ascension (degrees, or HMS)
        ra: String,
        /// Declination (degrees, or DMS)
        dec: String,
        /// Search radius in arcseconds
        radius: f64,
        /// Return only the closest match
        #[arg(long)]
        nearest: bool,
        /// Drop rows whose fetched columns repeat an earlier result
        #[arg(long)]
        distinct: bool,
        /// Extra columns to print ("*" for all)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
        /// Planner configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print query timing
        #[arg(long)]
        timing: bool,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Htmid { depth, ra, dec } => {
            let mesh = Mesh::new(depth)?;
            let coords = Coordinates::parse(&[ra], &[dec])?;
            for id in mesh.lookup(&coords) {
                println!("{} {}", id, mesh::name(id)?);
            }
        }
        Commands::Index {
            table,
            force,
            depths,
            batch_size,
        } => {
            let mut store = MemoryTable::open(&table)?;
            let indexer = TrixelIndexer::new(IndexerConfig {
                depths,
                batch_size,
                force,
            })?;
            let summary = indexer.index(&mut store)?;
            store.save(&table)?;
            println!(
                "Indexed {} rows of '{}' in {} batches",
                summary.rows, store.name, summary.batches
            );
        }
        Commands::Search {
            table,
            ra,
            dec,
            radius,
            nearest,
            distinct,
            columns,
            config,
            timing,
            format,
        } => {
            let store = MemoryTable::open(&table)?;
            let config = match config {
                Some(path) => load_config(&path)?,
                None => PlannerConfig::default(),
            };

            let params = ConeSearchParams {
                centers: Coordinates::parse(&[ra], &[dec])?,
                radius_arcsec: radius,
                columns: columns.clone(),
                nearest_only: nearest,
                distinct,
            };

            let start = if timing { Some(Instant::now()) } else { None };

            let planner = ConeSearchPlanner::new(config, Arc::new(MeshCache::new()));
            let results = planner.search(&store, &params)?;

            if let Some(start_time) = start {
                let elapsed = start_time.elapsed();
                eprintln!(
                    "Query completed in {:.2} ms",
                    elapsed.as_secs_f64() * 1000.0
                );
            }

            match format {
                OutputFormat::Table => print_table(&results),
                OutputFormat::Json => print_json(&results)?,
                OutputFormat::Csv => print_csv(&results, &columns),
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<PlannerConfig> {
    let file = File::open(path)
        .map_err(|e| anyhow::anyhow!("Cannot open planner config {:?}: {}", path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn print_table(results: &[ConeSearchResult]) {
    for (i, result) in results.iter().enumerate() {
        let extra: Vec<String> = result
            .row
            .columns
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        println!(
            "{:4}: {:>12} RA={:.6}° Dec={:+.6}° Sep={:.3}\" {}",
            i + 1,
            result.row.key.to_string(),
            result.row.ra,
            result.row.dec,
            result.sep_deg * 3600.0,
            extra.join(" ")
        );
    }

    if results.is_empty() {
        println!("No rows found within the search radius.");
    } else {
        println!("\nTotal results: {}", results.len());
    }
}

fn print_json(results: &[ConeSearchResult]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}

fn print_csv(results: &[ConeSearchResult], columns: &[String]) {
    let names: Vec<String> = match results.first() {
        Some(r) if columns.iter().any(|c| c == "*") => r.row.columns.keys().cloned().collect(),
        _ => columns.to_vec(),
    };

    let mut header = vec!["center", "key", "ra_deg", "dec_deg", "sep_deg"].join(",");
    for name in &names {
        header.push(',');
        header.push_str(name);
    }
    println!("{}", header);

    for r in results {
        let mut line = format!(
            "{},{},{},{},{}",
            r.center, r.row.key, r.row.ra, r.row.dec, r.sep_deg
        );
        for name in &names {
            line.push(',');
            if let Some(v) = r.row.columns.get(name) {
                line.push_str(&v.to_string());
            }
        }
        println!("{}", line);
    }
}
