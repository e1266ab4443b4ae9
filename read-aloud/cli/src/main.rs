//! Read Aloud CLI - read text aloud with Google Cloud Text-to-Speech

mod prompt;

use std::io::{self, Read};
use std::process::exit;

use clap::{Parser, Subcommand};
use owo_colors::{OwoColorize, Stream};
use read_aloud::{
    AudioSink, Background, ClickInfo, EncodedAudio, FileStore, MENU_ITEMS, OptionsPage,
    PlaybackError, ReadOutcome, SavedOptions, SystemAudio, TtsClient, UserNotifier,
};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Maximum number of bytes read from stdin.
const STDIN_LIMIT: u64 = 10_000;

#[derive(Parser)]
#[command(name = "read-aloud")]
#[command(about = "Read text aloud with Google Cloud Text-to-Speech", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read text aloud (reads from stdin if no text is given)
    Read {
        /// Text to read
        #[arg(value_name = "TEXT")]
        text: Vec<String>,

        /// Print the audio as a data URI instead of playing it
        #[arg(long)]
        data_uri: bool,
    },

    /// Show or edit the saved options
    Options {
        /// Print the rendered options form as HTML
        #[arg(long, conflicts_with = "set")]
        html: bool,

        /// Set an option without prompting (repeatable: --set apiKey=... --set voice=...)
        #[arg(long, value_name = "NAME=VALUE", value_parser = parse_key_val)]
        set: Vec<(String, String)>,
    },

    /// List the voices available to the saved API key
    Voices,

    /// List the context-menu entries
    Menu,
}

/// Parses a `NAME=VALUE` pair. The value may be empty.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    if name.is_empty() {
        return Err(format!("missing option name in '{s}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Reads the text to speak from stdin.
fn read_from_stdin() -> io::Result<String> {
    let mut buffer = String::new();
    io::stdin().take(STDIN_LIMIT).read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Prints alerts to stderr.
struct TerminalNotifier;

impl UserNotifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        eprintln!(
            "{}",
            message.if_supports_color(Stream::Stderr, |text| text.red().bold().to_string())
        );
    }
}

/// Prints the audio as a `data:` URI instead of playing it.
struct DataUriSink;

impl AudioSink for DataUriSink {
    async fn play(&self, audio: &EncodedAudio) -> Result<(), PlaybackError> {
        println!("{}", audio.data_uri());
        Ok(())
    }
}

fn open_store() -> FileStore {
    FileStore::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        exit(1);
    })
}

fn open_tts() -> TtsClient {
    TtsClient::new().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        exit(1);
    })
}

async fn read_text<A: AudioSink>(text: String, audio: A) -> ReadOutcome {
    let background = Background::new(open_store(), open_tts(), audio, TerminalNotifier);
    let click = ClickInfo::read_selection(text);
    background
        .dispatch(&click)
        .await
        .unwrap_or_else(|| ReadOutcome::Failed("unhandled menu item".to_string()))
}

async fn run_options(html: bool, set: Vec<(String, String)>) {
    let store = open_store();

    if !set.is_empty() {
        let values: SavedOptions = set.into_iter().collect();
        if let Err(e) = read_aloud::save_options(&store, values).await {
            eprintln!("Error: {}", e);
            exit(1);
        }
        println!("Options saved to {}", store.path().display());
        return;
    }

    let mut page = OptionsPage::new(store, open_tts());
    let form = match page.render().await {
        Ok(form) => form.clone(),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    if html {
        println!("{}", form.to_html());
        return;
    }

    let edited = match prompt::edit_form(&form) {
        Ok(Some(edited)) => edited,
        Ok(None) => {
            println!("Cancelled, nothing saved");
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    match page.submit(&edited).await {
        Ok(values) => {
            tracing::info!(fields = values.len(), "Options saved");
            println!("Options saved to {}", page.store().path().display());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}

async fn run_voices() {
    let store = open_store();
    let api_key = match read_aloud::api_key(&store).await {
        Ok(key) if !key.is_empty() => key,
        Ok(_) => {
            eprintln!("Error: {}", read_aloud::ReadError::MissingApiKey);
            exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    match open_tts().available_voices(&api_key).await {
        Ok(mut voices) => {
            voices.sort_by(|a, b| a.name.cmp(&b.name));
            for voice in voices {
                println!(
                    "{}\t{}\t{}",
                    voice.name,
                    voice.ssml_gender,
                    voice.language_codes.join(",")
                );
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}

/// Initialize tracing subscriber based on verbosity and output format
fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            // Default: WARN only, alerts already go to stderr
            0 => "warn".to_string(),
            1 => "warn,read_aloud=info".to_string(),
            2 => "info,read_aloud=debug".to_string(),
            _ => "debug,read_aloud=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.json);

    match cli.command {
        Commands::Read { text, data_uri } => {
            let text = if text.is_empty() {
                match read_from_stdin() {
                    Ok(t) if !t.trim().is_empty() => t,
                    Ok(_) => {
                        eprintln!("Error: No input provided");
                        eprintln!("Usage: read-aloud read <text> or echo \"text\" | read-aloud read");
                        exit(1);
                    }
                    Err(e) => {
                        eprintln!("Error reading from stdin: {}", e);
                        exit(1);
                    }
                }
            } else {
                text.join(" ")
            };

            let outcome = if data_uri {
                read_text(text, DataUriSink).await
            } else {
                read_text(text, SystemAudio).await
            };

            if let ReadOutcome::Failed(_) = outcome {
                // The notifier has already printed the message
                exit(1);
            }
        }

        Commands::Options { html, set } => run_options(html, set).await,

        Commands::Voices => run_voices().await,

        Commands::Menu => {
            for item in MENU_ITEMS {
                println!("{}\t{}\t{}", item.id, item.title, item.contexts.join(","));
            }
        }
    }
}
