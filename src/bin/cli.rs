//! bloomd CLI Client
//!
//! Command-line interface for interacting with a bloomd server.

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use bloomd_client::config::parse_server_addr;
use bloomd_client::{BloomdClient, Config, CreateOptions, FilterRecord, Result};

/// bloomd CLI
#[derive(Parser, Debug)]
#[command(name = "bloomd-cli")]
#[command(about = "CLI for the bloomd filter server")]
#[command(version)]
struct Args {
    /// Server address (host:port)
    #[arg(short, long, default_value = "localhost:8673")]
    server: String,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Connect timeout in milliseconds (0 = OS default)
    #[arg(long, default_value = "5000")]
    connect_timeout_ms: u64,

    /// Send deadline in milliseconds (0 = none)
    #[arg(long, default_value = "1000")]
    write_timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a filter
    Create {
        /// Filter name
        filter: String,

        /// Initial capacity
        #[arg(long)]
        capacity: Option<u64>,

        /// False positive probability
        #[arg(long)]
        prob: Option<f64>,

        /// Keep the filter in memory only
        #[arg(long)]
        in_memory: Option<bool>,
    },

    /// Delete a filter
    Drop { filter: String },

    /// Unload a filter from memory
    Close { filter: String },

    /// Remove a closed filter from the server
    Clear { filter: String },

    /// Flush a filter to disk
    Flush { filter: String },

    /// List filters
    List {
        /// Only filters starting with this prefix
        prefix: Option<String>,
    },

    /// Show filter counters
    Info { filter: String },

    /// Check whether a value may be present
    Check { filter: String, value: String },

    /// Add a value
    Set { filter: String, value: String },

    /// Add several values
    Bulk {
        filter: String,
        #[arg(required = true)]
        items: Vec<String>,
    },

    /// Check several values
    Multi {
        filter: String,
        #[arg(required = true)]
        items: Vec<String>,
    },

    /// True if any of the values may be present
    Any { filter: String, items: Vec<String> },

    /// True if all of the values may be present
    All { filter: String, items: Vec<String> },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,bloomd_client=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let (host, port) = parse_server_addr(&args.server)?;

    let config = Config::builder()
        .host(host)
        .port(port)
        .connect_timeout_ms(args.connect_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    let mut client = BloomdClient::new(config)?;
    let json = args.json;

    match args.command {
        Commands::Create {
            filter,
            capacity,
            prob,
            in_memory,
        } => {
            let options = CreateOptions {
                capacity,
                probability: prob,
                in_memory,
            };
            print_value(json, &client.create_filter(&filter, options)?)
        }
        Commands::Drop { filter } => print_value(json, &client.drop_filter(&filter)?),
        Commands::Close { filter } => print_value(json, &client.close_filter(&filter)?),
        Commands::Clear { filter } => print_value(json, &client.clear_filter(&filter)?),
        Commands::Flush { filter } => print_value(json, &client.flush_filter(&filter)?),
        Commands::List { prefix } => {
            let records = client.list_filters(prefix.as_deref())?;
            if json {
                print_json(&records);
            } else {
                print_records(&records);
            }
        }
        Commands::Info { filter } => {
            let info = client.info(&filter)?;
            if json {
                print_json(&info);
            } else if info.is_empty() {
                println!("filter {} does not exist", filter);
            } else {
                for (key, value) in &info {
                    println!("{} {}", key, value);
                }
            }
        }
        Commands::Check { filter, value } => print_value(json, &client.check(&filter, &value)?),
        Commands::Set { filter, value } => print_value(json, &client.set(&filter, &value)?),
        Commands::Bulk { filter, items } => {
            let statuses = client.bulk(&filter, &items)?;
            if json {
                print_json(&statuses);
            } else {
                for (item, status) in statuses.iter() {
                    println!("{} {}", item, status);
                }
            }
        }
        Commands::Multi { filter, items } => {
            let statuses = client.multi(&filter, &items)?;
            if json {
                print_json(&statuses);
            } else {
                for (item, status) in statuses.iter() {
                    println!("{} {}", item, status);
                }
            }
        }
        Commands::Any { filter, items } => print_value(json, &client.any(&filter, &items)?),
        Commands::All { filter, items } => print_value(json, &client.all(&filter, &items)?),
    }

    client.disconnect();
    Ok(())
}

fn print_value<T: Serialize + std::fmt::Display>(json: bool, value: &T) {
    if json {
        print_json(value);
    } else {
        println!("{}", value);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(out) => println!("{}", out),
        Err(e) => tracing::error!("Failed to render JSON: {}", e),
    }
}

fn print_records(records: &[FilterRecord]) {
    for record in records {
        println!(
            "{} {} {} {} {}",
            record.name, record.probability, record.size, record.capacity, record.items
        );
    }
}
