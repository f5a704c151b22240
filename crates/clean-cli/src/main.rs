//! Clean CLI - serve the extraction endpoint or extract articles once

use clap::{Parser, Subcommand};
use clean::config::{DEFAULT_HOST, DEFAULT_MAX_URLS, DEFAULT_PORT};
use clean::{result_schema, Collector, RequestError, ServerConfig};
use std::io::{self, Write};
use std::time::Duration;
use tracing::error;

/// Clean - fetch articles and extract their title, text, image, date and authors
#[derive(Parser, Debug)]
#[command(name = "clean")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print the JSON Schema of one result record
    #[arg(long)]
    schema: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, env = "CLEAN_HOST", default_value = DEFAULT_HOST)]
        host: String,

        /// Port to listen on
        #[arg(long, short, env = "CLEAN_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Maximum number of URLs per request
        #[arg(long, env = "CLEAN_MAX_URLS", default_value_t = DEFAULT_MAX_URLS)]
        max_urls: usize,

        /// Per-article deadline in seconds, 0 disables it
        #[arg(long, env = "CLEAN_TIMEOUT_SECS", default_value_t = 30)]
        timeout_secs: u64,

        /// Custom User-Agent
        #[arg(long)]
        user_agent: Option<String>,
    },
    /// Extract one or more URLs and print the results as JSON
    Extract {
        /// URLs to extract
        #[arg(required = true)]
        urls: Vec<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Maximum number of URLs accepted
        #[arg(long, env = "CLEAN_MAX_URLS", default_value_t = DEFAULT_MAX_URLS)]
        max_urls: usize,

        /// Per-article deadline in seconds, 0 disables it
        #[arg(long, env = "CLEAN_TIMEOUT_SECS", default_value_t = 30)]
        timeout_secs: u64,

        /// Custom User-Agent
        #[arg(long)]
        user_agent: Option<String>,
    },
}

/// Log to stderr so `extract` output stays clean JSON
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "clean=info,clean_cli=info,tower_http=info".into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.schema {
        writeln_safe(&to_json(&result_schema(), true));
        std::process::exit(0);
    }

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            max_urls,
            timeout_secs,
            user_agent,
        }) => {
            init_tracing();
            let config = build_config(
                ServerConfig::builder().host(host).port(port),
                max_urls,
                timeout_secs,
                user_agent,
            );
            if let Err(e) = clean::run_server(config).await {
                error!(error = %e, "Server failed");
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Extract {
            urls,
            pretty,
            max_urls,
            timeout_secs,
            user_agent,
        }) => {
            init_tracing();
            let config = build_config(ServerConfig::builder(), max_urls, timeout_secs, user_agent);
            run_extract(&config, &urls, pretty).await;
        }
        None => {
            eprintln!("Usage: clean serve");
            eprintln!("   or: clean extract <URL>...");
            eprintln!("   or: clean --help");
            std::process::exit(1);
        }
    }
}

fn build_config(
    builder: clean::ServerConfigBuilder,
    max_urls: usize,
    timeout_secs: u64,
    user_agent: Option<String>,
) -> ServerConfig {
    let mut builder = builder
        .max_urls(max_urls)
        .task_timeout(task_timeout(timeout_secs));
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    builder.build()
}

fn task_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

async fn run_extract(config: &ServerConfig, urls: &[String], pretty: bool) {
    if urls.len() > config.max_urls() {
        let body = vec![RequestError::new(format!(
            "Max {} URLs allowed",
            config.max_urls()
        ))];
        writeln_safe(&to_json(&body, pretty));
        std::process::exit(1);
    }

    let collector = Collector::new(config.fetch_options().clone());
    match collector.collect(urls).await {
        Ok(results) => writeln_safe(&to_json(&results, pretty)),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> String {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        std::process::exit(1);
    })
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
