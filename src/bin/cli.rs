//! PageKV CLI
//!
//! Export sorted key/value data into a store and query it.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use pagekv::{Cursor, Store, StoreConfig, WriterConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// PageKV CLI
#[derive(Parser, Debug)]
#[command(name = "pagekv-cli")]
#[command(about = "Read-only sorted key-value store on a page-indexed container")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a sorted, tab-separated key/value file into a new store directory
    Export {
        /// Input file with one `key<TAB>value` per line, sorted by key
        #[arg(short, long)]
        input: PathBuf,

        /// Destination directory (must not exist)
        #[arg(short, long)]
        output: PathBuf,

        /// Target page size in KB
        #[arg(short = 'p', long, default_value = "64")]
        page_kb: usize,
    },

    /// Get a value by key
    Get {
        /// Store directory or container file
        store: PathBuf,

        /// The key to get
        key: String,
    },

    /// List every entry whose key starts with a prefix
    Prefix {
        /// Store directory or container file
        store: PathBuf,

        /// The key prefix
        prefix: String,
    },

    /// List entries with start <= key < end
    Range {
        /// Store directory or container file
        store: PathBuf,

        /// Inclusive start key
        start: String,

        /// Exclusive end key; omit for no upper bound
        end: Option<String>,
    },

    /// Show container statistics
    Info {
        /// Store directory or container file
        store: PathBuf,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,pagekv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args.command) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(command: Commands) -> pagekv::Result<()> {
    match command {
        Commands::Export {
            input,
            output,
            page_kb,
        } => {
            let config = WriterConfig::builder()
                .page_size_bytes(page_kb * 1024)
                .build();
            let lines = BufReader::new(File::open(&input)?).lines();
            let summary = pagekv::export_to_dir(lines.map(parse_line), &output, &config)?;
            println!(
                "exported {} rows ({} bytes)",
                summary.rows, summary.bytes_written
            );
        }
        Commands::Get { store, key } => {
            let store = open_store(&store)?;
            match store.reader().get(key.as_bytes())? {
                Some(value) => println!("{}", String::from_utf8_lossy(&value)),
                None => {
                    println!("(not found)");
                    process::exit(2);
                }
            }
        }
        Commands::Prefix { store, prefix } => {
            let store = open_store(&store)?;
            let cursor = store.reader().prefix_iterator(prefix.as_bytes());
            print_entries(cursor)?;
        }
        Commands::Range { store, start, end } => {
            let store = open_store(&store)?;
            let end = end.as_deref().map(str::as_bytes);
            let cursor = store.reader().range_iterator(start.as_bytes(), end);
            print_entries(cursor)?;
        }
        Commands::Info { store } => {
            let store = open_store(&store)?;
            match store.container() {
                Some(container) => {
                    println!("created_by: {}", container.created_by().unwrap_or("-"));
                    println!("bytes:      {}", container.len());
                    println!("rows:       {}", container.num_rows());
                    println!("row_groups: {}", container.metadata().num_row_groups());
                    println!("key pages:  {}", container.page_index().num_pages());
                }
                None => println!("empty store"),
            }
        }
    }

    Ok(())
}

/// Open a store directory (with sidecar) or a bare container file
fn open_store(path: &Path) -> pagekv::Result<Store> {
    if path.is_dir() {
        Store::open_dir(path)
    } else {
        Store::open(&StoreConfig::for_path(path))
    }
}

/// Split a `key<TAB>value` line
fn parse_line(line: io::Result<String>) -> io::Result<(String, String)> {
    let line = line?;
    match line.split_once('\t') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("missing tab separator in line {:?}", line),
        )),
    }
}

fn print_entries(mut cursor: Cursor<'_>) -> pagekv::Result<()> {
    while let Some((key, value)) = cursor.current() {
        println!(
            "{}\t{}",
            String::from_utf8_lossy(key),
            String::from_utf8_lossy(value)
        );
        cursor.next();
    }
    cursor.close();
    match cursor.take_error() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
