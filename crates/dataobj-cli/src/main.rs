//! `dataobj` CLI: format, check and query JSON documents through the data tree.
//!
//! ## Usage
//!
//! ```sh
//! # Re-encode JSON in the fixture format (stdin → stdout)
//! echo '{"name":"Alice","age":30}' | dataobj format
//!
//! # Compact output with keys sorted, file to file
//! dataobj format --compact --sort -i data.json -o data.min.json
//!
//! # Read only the first document of a stream separated by '#'
//! dataobj format --stopper '#' -i stream.txt
//!
//! # Validate a document
//! dataobj check -i data.json
//!
//! # Print the node at a dot-separated path
//! dataobj get pre.0x095e.balance -i filler.json
//!
//! # Node counts and depth
//! dataobj stats -i data.json
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dataobj_core::{read_stream, DataObject, DataType, DecodeOptions};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dataobj",
    version,
    about = "Format, check and query JSON documents through the dataobj tree"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-encode a document (pretty by default)
    Format {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Write compact JSON without whitespace
        #[arg(long)]
        compact: bool,
        /// Order object keys while reading
        #[arg(long)]
        sort: bool,
        /// Characters that end the document when met between tokens
        #[arg(long)]
        stopper: Option<String>,
    },
    /// Decode a document and report whether it is well-formed
    Check {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Characters that end the document when met between tokens
        #[arg(long)]
        stopper: Option<String>,
    },
    /// Print the node at a dot-separated path of keys and array positions
    Get {
        /// Path such as `result.items.0.name` (empty for the root)
        path: String,
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Show node counts per kind and the maximum depth
    Stats {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Format {
            input,
            output,
            compact,
            sort,
            stopper,
        } => {
            let options = DecodeOptions {
                stopper: stopper.unwrap_or_default(),
                autosort: sort,
            };
            let tree = read_tree(input.as_deref(), &options)?;
            let mut text = tree.as_json(!compact, true);
            text.push('\n');
            write_output(output.as_deref(), &text)?;
        }
        Commands::Check { input, stopper } => {
            let options = DecodeOptions {
                stopper: stopper.unwrap_or_default(),
                ..DecodeOptions::default()
            };
            let tree = read_tree(input.as_deref(), &options)?;
            info!(kind = %tree.kind(), children = tree.len(), "document is well-formed");
            println!("ok");
        }
        Commands::Get { path, input } => {
            let tree = read_tree(input.as_deref(), &DecodeOptions::default())?;
            let node = resolve_path(&tree, &path)?;
            match node.as_string() {
                Ok(s) => println!("{s}"),
                Err(_) => println!("{}", node.as_json(true, true)),
            }
        }
        Commands::Stats { input } => {
            let tree = read_tree(input.as_deref(), &DecodeOptions::default())?;
            let stats = Stats::collect(&tree);
            println!("Nodes:      {}", stats.total());
            println!("Objects:    {}", stats.objects);
            println!("Arrays:     {}", stats.arrays);
            println!("Strings:    {}", stats.strings);
            println!("Integers:   {}", stats.integers);
            println!("Booleans:   {}", stats.bools);
            println!("Nulls:      {}", stats.nulls);
            println!("Max depth:  {}", stats.max_depth);
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

fn open_input(path: Option<&str>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to read file: {}", path))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// Stream the input through the reader until the document is complete.
fn read_tree(path: Option<&str>, options: &DecodeOptions) -> Result<DataObject> {
    let source = path.unwrap_or("<stdin>");
    let input = open_input(path)?;
    let tree = read_stream(input, options)
        .with_context(|| format!("Failed to decode JSON from {}", source))?;
    debug!(source, kind = %tree.kind(), "document read");
    Ok(tree)
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

/// Walk `path` (`a.b.0.c`) from `root`. Segments index arrays by position and
/// objects by key; an empty path is the root itself.
fn resolve_path<'a>(root: &'a DataObject, path: &str) -> Result<&'a DataObject> {
    let mut node = root;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        node = match node.kind() {
            DataType::Array => {
                let pos: usize = segment
                    .parse()
                    .with_context(|| format!("'{}' is not an array position", segment))?;
                node.at(pos)?
            }
            DataType::Object => node.at_key(segment)?,
            kind => bail!("Cannot descend into {} value at '{}'", kind, segment),
        };
    }
    Ok(node)
}

#[derive(Debug, Default)]
struct Stats {
    objects: usize,
    arrays: usize,
    strings: usize,
    integers: usize,
    bools: usize,
    nulls: usize,
    uninitialized: usize,
    max_depth: usize,
}

impl Stats {
    fn collect(root: &DataObject) -> Self {
        let mut stats = Stats::default();
        stats.visit(root, 0);
        stats
    }

    fn visit(&mut self, node: &DataObject, depth: usize) {
        self.max_depth = self.max_depth.max(depth);
        match node.kind() {
            DataType::Object => self.objects += 1,
            DataType::Array => self.arrays += 1,
            DataType::String => self.strings += 1,
            DataType::Integer => self.integers += 1,
            DataType::Bool => self.bools += 1,
            DataType::Null => self.nulls += 1,
            DataType::Uninitialized => self.uninitialized += 1,
        }
        for child in node.children() {
            self.visit(child, depth + 1);
        }
    }

    fn total(&self) -> usize {
        self.objects
            + self.arrays
            + self.strings
            + self.integers
            + self.bools
            + self.nulls
            + self.uninitialized
    }
}
