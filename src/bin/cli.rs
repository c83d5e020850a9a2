//! topic-cli
//!
//! Command-line interface for querying Topic servers.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use topic_client::directory::RenderedField;
use topic_client::network::STATUS_QUERY;
use topic_client::{ClientConfig, ServerDirectory, ServerEntry, Target, TopicClient};
use tracing_subscriber::{fmt, EnvFilter};

/// Topic protocol CLI
#[derive(Parser, Debug)]
#[command(name = "topic-cli")]
#[command(about = "Query live status from Topic protocol game servers")]
#[command(version)]
struct Args {
    /// Exchange timeout in milliseconds
    #[arg(short, long, default_value = "10000")]
    timeout_ms: u64,

    /// Log protocol activity
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a raw query to host:port
    Query {
        /// Server host name or IP
        host: String,

        /// Server port
        port: u16,

        /// Query text ('?' is added when missing)
        #[arg(default_value = STATUS_QUERY)]
        query: String,
    },

    /// Show the status of a server from the directory
    Status {
        /// Server alias
        alias: String,

        /// Server directory file (JSON)
        #[arg(short, long, default_value = "servers.json")]
        directory: PathBuf,
    },

    /// Show the status of every server in the directory
    StatusAll {
        /// Server directory file (JSON)
        #[arg(short, long, default_value = "servers.json")]
        directory: PathBuf,
    },
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "info,topic_client=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::builder().timeout_ms(args.timeout_ms).build();
    let client = TopicClient::new(config);

    if let Err(e) = run(&client, args.command) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(client: &TopicClient, command: Commands) -> topic_client::Result<()> {
    match command {
        Commands::Query { host, port, query } => {
            let response = client.query(&host, port, &query)?;
            println!("{}", response);
        }
        Commands::Status { alias, directory } => {
            let directory = ServerDirectory::load(directory)?;
            let entry = directory.lookup(&alias)?;
            let response = client.status(entry)?;
            print_status(entry, &entry.render(&response));
        }
        Commands::StatusAll { directory } => {
            let directory = ServerDirectory::load(directory)?;
            let entries: Vec<&ServerEntry> = directory.iter().map(|(_, entry)| entry).collect();
            let targets: Vec<Target> = entries.iter().map(|entry| Target::from(*entry)).collect();

            let results = client.query_many(&targets, STATUS_QUERY);
            for (entry, result) in entries.iter().zip(results) {
                match result {
                    Ok(response) => print_status(entry, &entry.render(&response)),
                    Err(e) => println!("{}\n  unreachable: {}", entry.name, e),
                }
            }
        }
    }
    Ok(())
}

fn print_status(entry: &ServerEntry, fields: &[RenderedField]) {
    println!("{}", entry.name);
    for field in fields {
        println!("  {}: {}", field.name, field.value);
    }
}
