use clap::Parser;
use formrule::persist::{self, FileStore};
use formrule::prelude::*;
use itertools::Itertools;
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Replays field changes against a form configuration and prints the outcome
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the form configuration JSON file
    config_path: Option<String>,

    /// A change event as `field=json`, e.g. `country="DE"` or `newsletter=true`.
    /// May be repeated; events are applied in order.
    #[arg(short = 's', long = "set", value_name = "FIELD=VALUE")]
    changes: Vec<String>,

    /// Actually call the endpoints of `populateOptions` rules
    #[arg(short, long)]
    fetch: bool,

    /// Timeout for option requests, in milliseconds
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Directory to save the resulting form record into
    #[arg(long, value_name = "DIR")]
    save: Option<String>,

    /// Run in interactive mode to be prompted for changes
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

/// Answers every request with nothing, used when `--fetch` is not given.
struct OfflineSource;

#[async_trait::async_trait]
impl OptionSource for OfflineSource {
    async fn fetch(&self, request: &FetchRequest) -> Option<Value> {
        println!(
            "  (skipped) {} {} {:?}",
            request.api_config.method, request.api_config.url, request.params
        );
        None
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("Warning: failed to install log subscriber: {}", e);
    }

    let cli = Cli::parse();

    let config_path = cli.config_path.clone().unwrap_or_else(|| {
        if cli.human {
            prompt_for_input("Enter form config path", Some("data/form.json"))
        } else {
            exit_with_error("Config path is required in non-interactive mode.")
        }
    });

    let load_start = Instant::now();
    let config_json = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read config file '{}': {}",
            &config_path, e
        ))
    });
    let config = FormConfig::from_json(&config_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid form config: {}", e)));
    println!(
        "Loaded {} field(s) and {} rule(s) in {:?}",
        config.fields.len(),
        config.rules.len(),
        load_start.elapsed()
    );

    let source: Arc<dyn OptionSource> = if cli.fetch {
        let http = HttpOptionSource::builder()
            .timeout(Duration::from_millis(cli.timeout_ms))
            .build()
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
        Arc::new(http)
    } else {
        Arc::new(OfflineSource)
    };

    let mut store = FormStore::new(config, source);

    if cli.human {
        run_interactive(&mut store).await;
    } else {
        for change in &cli.changes {
            let (field, value) = parse_change(change)
                .unwrap_or_else(|| exit_with_error(&format!("Invalid change '{}'", change)));
            apply_change(&mut store, &field, value).await;
        }
    }

    print_state(&store);

    if let Some(dir) = cli.save {
        let mut file_store = FileStore::new(&dir);
        let mut record = store.snapshot();
        persist::save(&mut file_store, &mut record)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to save form: {}", e)));
        println!("\nSaved form record to '{}'", dir);
    }
}

async fn apply_change(store: &mut FormStore, field: &str, value: Value) {
    println!("\n> {} = {}", field, value);
    let dispatched = store.dispatch_change(field, value);
    for index in &dispatched.applied {
        println!("  rule #{}: {}", index, store.config().rules[*index]);
    }
    if dispatched.applied.is_empty() {
        println!("  no rule fired");
    }
    store.settle().await;
}

/// Splits `field=json`. A value that is not valid JSON is taken as a string.
fn parse_change(raw: &str) -> Option<(String, Value)> {
    let (field, value) = raw.split_once('=')?;
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    let value = serde_json::from_str(value.trim())
        .unwrap_or_else(|_| Value::String(value.trim().to_string()));
    Some((field.to_string(), value))
}

fn print_state(store: &FormStore) {
    let state = store.state();
    println!("\n--- Form State ---");
    for field in &store.config().fields {
        let value = state
            .value(&field.id)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let flags = [
            state.is_visible(&field.id).then_some("visible"),
            state.is_disabled(&field.id).then_some("disabled"),
        ]
        .into_iter()
        .flatten()
        .join(", ");
        println!("{:<16} {:<24} [{}]", field.id, value, flags);

        let options = store.options(&field.id);
        if !options.is_empty() {
            println!(
                "{:<16} options: {}",
                "",
                options
                    .iter()
                    .map(|o| format!("{}={}", o.label, o.value))
                    .join(", ")
            );
        }
    }
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
async fn run_interactive(store: &mut FormStore) {
    println!("--- formrule Interactive Mode ---");
    println!("Enter changes as field=value, an empty line to finish.");
    loop {
        let line = prompt_for_input("change", None);
        if line.is_empty() {
            break;
        }
        match parse_change(&line) {
            Some((field, value)) => apply_change(store, &field, value).await,
            None => println!("Invalid change. Use field=value."),
        }
    }
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    let _ = io::stdout().flush();

    if io::stdin().read_line(&mut line).is_err() {
        exit_with_error("Failed to read line");
    }
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
