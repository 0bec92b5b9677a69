use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use rdf_xform::config::{StoreConfig, TransformConfig, DEFAULT_BUFFER_SIZE, DEFAULT_REGISTRY_URL};
use rdf_xform::emitter::NQuadsEmitter;
use rdf_xform::jobs::{load_update_scripts, read_split_jobs, run_updates};
use rdf_xform::pipeline::{Pipeline, TransformReport};
use rdf_xform::registry::PrefixRegistry;
use rdf_xform::store::sparql::SparqlStore;
use rdf_xform::transform::{Expand, ExpandMode, RowTransformer, Split};
use rdf_xform::Error;

/// Expand and split literal values in a SPARQL triple store.
#[derive(Parser)]
#[command(name = "rdf-xform", version, about)]
struct Cli {
    /// SPARQL query endpoint URL.
    #[arg(short, long, value_name = "URL", env = "SPARQL_ENDPOINT")]
    endpoint: String,

    /// SPARQL update endpoint URL [default: the query endpoint].
    #[arg(long, value_name = "URL", env = "SPARQL_UPDATE_ENDPOINT")]
    update_endpoint: Option<String>,

    /// Username for HTTP basic auth.
    #[arg(short, long, env = "SPARQL_USERNAME")]
    username: Option<String>,

    /// Password for HTTP basic auth.
    #[arg(short, long, env = "SPARQL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Write all output triples to this graph instead of their source graph.
    #[arg(short = 'g', long, value_name = "IRI")]
    output_graph: Option<String>,

    /// Number of buffered triples that triggers a write.
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// HTTP request timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    timeout: u64,

    /// Write output as N-Quads to FILE ('-' for stdout) instead of the store.
    /// The store is only read and nothing is deleted. Not allowed with update.
    #[arg(long, value_name = "FILE")]
    dry_run: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output.
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Expand literal identifiers into IRIs or cross-references.
    Expand {
        /// Class whose instances are transformed.
        #[arg(long, value_name = "IRI")]
        class: String,

        /// Property whose values are transformed.
        #[arg(long, value_name = "IRI")]
        property: String,

        /// IRI prefix to prepend, or 'infer' to resolve through the prefix registry.
        /// Without it values are re-emitted as plain literals.
        #[arg(long, value_name = "PREFIX|infer")]
        uri_expansion: Option<String>,

        /// Namespace for the derived x-<prefix> / x-ref predicates.
        #[arg(long, value_name = "IRI")]
        predicate_prefix: Option<String>,

        /// Prefix context document URL.
        #[arg(long, value_name = "URL", default_value = DEFAULT_REGISTRY_URL)]
        registry: String,

        /// Read the prefix context document from a local file instead.
        #[arg(long, value_name = "FILE", conflicts_with = "registry")]
        registry_file: Option<PathBuf>,

        /// Delete the original statements after writing.
        #[arg(short, long)]
        delete: bool,
    },
    /// Split delimited literals into one statement per fragment.
    Split {
        /// Class whose instances are transformed.
        #[arg(long, value_name = "IRI")]
        class: String,

        /// Property whose values are transformed.
        #[arg(long, value_name = "IRI")]
        property: String,

        /// Delimiter character.
        #[arg(long, value_name = "CHAR")]
        delimiter: char,

        /// Quote character protecting embedded delimiters.
        #[arg(long, value_name = "CHAR")]
        quote: Option<char>,

        /// Delete the original statements after writing.
        #[arg(short, long)]
        delete: bool,
    },
    /// Run the splits listed in a tab-separated file (class, property, delimiter).
    SplitFile {
        /// Path to the job file.
        file: PathBuf,
    },
    /// Execute SPARQL updates from a YAML file, a query file, or a directory of .rq/.sparql files.
    Update {
        /// Path to the update script(s).
        input: PathBuf,
    },
}

fn init_tracing(cli: &Cli) {
    // --quiet silences everything, --verbose honours RUST_LOG or shows info,
    // otherwise only warnings reach stderr.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn open_dry_run(path: &Path) -> io::Result<NQuadsEmitter<Box<dyn Write>>> {
    let writer: Box<dyn Write> = if path == Path::new("-") {
        Box::new(BufWriter::new(io::stdout().lock()))
    } else {
        Box::new(BufWriter::new(File::create(path)?))
    };
    Ok(NQuadsEmitter::new(writer))
}

fn execute(
    pipeline: &Pipeline<'_>,
    transformer: &dyn RowTransformer,
    dry_run: Option<&mut NQuadsEmitter<Box<dyn Write>>>,
) -> rdf_xform::Result<TransformReport> {
    match dry_run {
        Some(emitter) => pipeline.run_into(transformer, emitter),
        None => pipeline.run(transformer),
    }
}

fn summarize(quiet: bool, transformer: &dyn RowTransformer, report: &TransformReport) {
    if !quiet {
        eprintln!(
            "{}: {} rows, {} triples written in {} batches{}",
            transformer.name(),
            report.rows,
            report.writes.triples_written,
            report.writes.writes,
            if report.deleted { ", originals deleted" } else { "" }
        );
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut store_config = StoreConfig::new(&cli.endpoint);
    store_config.update_endpoint = cli.update_endpoint.clone();
    store_config.username = cli.username.clone();
    store_config.password = cli.password.clone();
    store_config.http.request_timeout_secs = cli.timeout;
    let http = store_config.http.clone();
    let store = SparqlStore::new(store_config);

    let config = TransformConfig {
        output_graph: cli.output_graph.clone(),
        buffer_size: cli.buffer_size,
    };
    let pipeline = Pipeline::new(&store, &config);

    // update scripts always go straight to the store
    if cli.dry_run.is_some() && matches!(cli.command, Command::Update { .. }) {
        return Err(Error::Config("--dry-run cannot be combined with update".into()).into());
    }
    let mut dry_run = cli.dry_run.as_deref().map(open_dry_run).transpose()?;

    match cli.command {
        Command::Expand {
            class,
            property,
            uri_expansion,
            predicate_prefix,
            registry,
            registry_file,
            delete,
        } => {
            let mode = ExpandMode::from_option(uri_expansion.as_deref(), || match &registry_file {
                Some(path) => PrefixRegistry::from_file(path),
                None => PrefixRegistry::load(&registry, &http),
            })?;
            let mut expand = Expand::new(class, property, mode).with_delete(delete);
            if let Some(prefix) = predicate_prefix {
                expand = expand.with_predicate_prefix(prefix);
            }
            let report = execute(&pipeline, &expand, dry_run.as_mut())?;
            summarize(cli.quiet, &expand, &report);
        }
        Command::Split {
            class,
            property,
            delimiter,
            quote,
            delete,
        } => {
            let split = Split::new(class, property, delimiter)
                .with_quote(quote)
                .with_delete(delete);
            let report = execute(&pipeline, &split, dry_run.as_mut())?;
            summarize(cli.quiet, &split, &report);
        }
        Command::SplitFile { file } => {
            // Jobs touch overlapping data, so they run strictly in file order.
            for job in read_split_jobs(&file)? {
                let split = job.transformer();
                let report = execute(&pipeline, &split, dry_run.as_mut())?;
                summarize(cli.quiet, &split, &report);
            }
        }
        Command::Update { input } => {
            let queries = load_update_scripts(&input)?;
            let executed = run_updates(&store, &queries)?;
            if !cli.quiet {
                eprintln!("update: executed {executed} queries");
            }
        }
    }

    if let Some(emitter) = dry_run.as_mut() {
        emitter.flush()?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
