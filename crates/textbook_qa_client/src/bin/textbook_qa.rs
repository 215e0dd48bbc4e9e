//! textbook-qa: command-line client for the textbook Q&A backend.
//! Asks a single question (positional argument or first stdin line) and
//! prints the answer with its sources. `--health` probes the service,
//! `--ingest [path]` triggers document indexing.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use textbook_qa_client::{config, ChatClient, IngestRequest, IngestStatus};

enum Mode {
    Ask,
    Health,
    Ingest,
}

struct CliArgs {
    config_override: Option<String>,
    mode: Mode,
    /// Question in ask mode, source path override in ingest mode.
    positional: Option<String>,
}

fn parse_args() -> CliArgs {
    let mut parsed = CliArgs {
        config_override: None,
        mode: Mode::Ask,
        positional: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => parsed.config_override = args.next(),
            "--health" => parsed.mode = Mode::Health,
            "--ingest" => parsed.mode = Mode::Ingest,
            _ if parsed.positional.is_none() => parsed.positional = Some(arg),
            _ => {}
        }
    }
    parsed
}

fn resolve_config_path(override_path: Option<&str>) -> Option<PathBuf> {
    // 1. --config <path> flag
    if let Some(p) = override_path {
        return Some(PathBuf::from(p));
    }
    // 2. TEXTBOOK_QA_CONFIG env var
    if let Ok(val) = std::env::var("TEXTBOOK_QA_CONFIG") {
        return Some(PathBuf::from(val));
    }
    // 3. Default path (~/.textbook-qa/config.yaml)
    config::default_config_path()
}

/// Load config when a file is present; a missing file means defaults.
fn load_config(path: Option<&PathBuf>) -> config::Config {
    let Some(path) = path else {
        return config::Config::default();
    };
    if !path.exists() {
        return config::Config::default();
    }
    match config::load(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!(
                "Error: failed to load config from {}: {}",
                path.display(),
                e
            );
            process::exit(1);
        }
    }
}

fn build_client(cfg: &config::Config) -> ChatClient {
    let base_url = std::env::var("TEXTBOOK_QA_API_URL")
        .ok()
        .or_else(|| cfg.api.base_url.clone())
        .unwrap_or_else(|| textbook_qa_client::DEFAULT_BASE_URL.to_string());
    let timeout_secs = cfg
        .api
        .timeout_secs
        .unwrap_or(textbook_qa_client::DEFAULT_TIMEOUT_SECS);

    match ChatClient::builder()
        .base_url(base_url)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: failed to create client: {}", e);
            process::exit(1);
        }
    }
}

fn read_question(positional: Option<String>) -> String {
    if let Some(q) = positional {
        return q;
    }
    // First stdin line.
    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line).unwrap_or(0);
    line.trim().to_string()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    let config_path = resolve_config_path(args.config_override.as_deref());
    let cfg = load_config(config_path.as_ref());
    let client = build_client(&cfg);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to create runtime: {}", e);
            process::exit(1);
        });

    rt.block_on(async {
        match args.mode {
            Mode::Ask => run_ask(&client, args.positional).await,
            Mode::Health => run_health(&client).await,
            Mode::Ingest => run_ingest(&client, &cfg, args.positional).await,
        }
    });
}

async fn run_ask(client: &ChatClient, positional: Option<String>) {
    let question = read_question(positional);
    if question.is_empty() {
        eprintln!("Error: no question provided");
        process::exit(1);
    }

    // One-shot invocation: no conversation to correlate, let the backend
    // assign a session id.
    let response = match client.ask(&question, None).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: query failed: {}", e);
            process::exit(1);
        }
    };

    println!("{}", response.answer);
    if !response.sources.is_empty() {
        println!("\nSources:");
        for source in &response.sources {
            let title = if source.source_file.is_empty() {
                "Source"
            } else {
                source.source_file.as_str()
            };
            println!("  {}", title);
        }
    }
}

async fn run_health(client: &ChatClient) {
    match client.health().await {
        Ok(health) => println!("{}: {}", health.service, health.status),
        Err(e) => {
            eprintln!("Error: health check failed: {}", e);
            process::exit(1);
        }
    }
}

async fn run_ingest(
    client: &ChatClient,
    cfg: &config::Config,
    path_override: Option<String>,
) {
    let mut request = IngestRequest::default();
    if let Some(p) = &cfg.ingest.source_path {
        request.source_path = p.clone();
    }
    if let Some(size) = cfg.ingest.chunk_size {
        request.chunk_size = size;
    }
    if let Some(overlap) = cfg.ingest.chunk_overlap {
        request.chunk_overlap = overlap;
    }
    if let Some(p) = path_override {
        request.source_path = p;
    }

    let response = match client.ingest(&request).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: ingest failed: {}", e);
            process::exit(1);
        }
    };

    let outcome = match response.status {
        IngestStatus::Success => "succeeded",
        IngestStatus::Processing => "processing",
        IngestStatus::Error => "failed",
    };
    println!(
        "Ingest {}: {} files, {} chunks",
        outcome, response.processed_files, response.total_chunks
    );
    if !response.message.is_empty() {
        println!("{}", response.message);
    }
    for error in &response.errors {
        eprintln!("  {}", error);
    }
    if response.status == IngestStatus::Error {
        process::exit(1);
    }
}
