//! Mimic CLI
//!
//! Usage:
//!   mimic                          # Terminal game (default)
//!   mimic --play --seed 7          # Reproducible target sequence
//!   mimic --serve --addr 0.0.0.0:3000  # HTTP + WebSocket API
//!   mimic --json                   # JSON lines output

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tokio::sync::mpsc;

use mimic::config::GameConfig;
use mimic::core::{run_server, spawn_session, GameInput, RemoteDetector, TerminalDisplay, TerminalMode};
use mimic::types::{DetectorEvent, EmojiCode, Face, FrameResult, GameStatus, UserCommand};
use mimic::{EMOJI_CATALOG, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "mimic",
    version = VERSION,
    about = "Mimic the emoji - match the target with your face before time runs out",
    long_about = "Mimic shows a target emoji and scores a point whenever the face\n\
                  detector reports the same dominant emoji within the round.\n\n\
                  Modes:\n  \
                  --play   Terminal game: each line you type is one detector frame\n  \
                  --serve  HTTP + WebSocket API for a browser-side detector\n\n\
                  In the terminal game, type an emoji (😃) or its name (smiley),\n\
                  an empty line for a frame without a face, or start / stop /\n\
                  reset / quit."
)]
struct Args {
    /// Terminal game (default mode)
    #[arg(short, long, conflicts_with = "serve")]
    play: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long)]
    addr: Option<String>,

    /// Round length in milliseconds (default: 6000)
    #[arg(long)]
    round_ms: Option<u64>,

    /// Seed for a reproducible target sequence
    #[arg(long)]
    seed: Option<u64>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output as JSON lines
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show per-frame results and face overlays
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_tracing(&config.log_filter);

    if args.serve {
        run_server(config).await.context("API server failed")
    } else {
        run_play(config, &args).await
    }
}

/// File values first, then command line overrides
fn load_config(args: &Args) -> anyhow::Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => GameConfig::default(),
    };

    if let Some(addr) = &args.addr {
        config.addr = addr.clone();
    }
    if let Some(round_ms) = args.round_ms {
        config.round_duration_ms = round_ms;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Logs go to stderr so stdout stays clean for game output
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

/// One line of player input
#[derive(Debug, PartialEq)]
enum PlayLine {
    Quit,
    Command(UserCommand),
    Frame(FrameResult),
}

fn parse_play_line(line: &str, timestamp: f64) -> PlayLine {
    let line = line.trim();
    if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
        return PlayLine::Quit;
    }
    if let Ok(command) = line.parse::<UserCommand>() {
        return PlayLine::Command(command);
    }
    if line.is_empty() {
        return PlayLine::Frame(FrameResult::new(vec![], timestamp));
    }

    let glyph = EmojiCode::from_name(line)
        .and_then(|code| code.glyph())
        .unwrap_or_else(|| line.to_string());
    PlayLine::Frame(FrameResult::new(vec![Face::with_emoji(glyph)], timestamp))
}

/// Run the terminal game
async fn run_play(config: GameConfig, args: &Args) -> anyhow::Result<()> {
    let mode = if args.json {
        TerminalMode::Json
    } else if args.no_color {
        TerminalMode::Plain
    } else {
        TerminalMode::Color
    };

    if mode != TerminalMode::Json {
        print_header(&config, mode == TerminalMode::Plain);
    }

    let display = TerminalDisplay::new(mode, args.verbose);
    let (handle, task) = spawn_session(&config, RemoteDetector::local(), Box::new(display));
    handle
        .request(GameInput::Command(UserCommand::Start))
        .await
        .context("starting detector")?;

    // stdin blocks; read it on its own thread
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let started = std::time::Instant::now();
    prompt(mode);
    while let Some(line) = line_rx.recv().await {
        let input = match parse_play_line(&line, started.elapsed().as_secs_f64()) {
            PlayLine::Quit => break,
            PlayLine::Command(command) => GameInput::Command(command),
            PlayLine::Frame(frame) => GameInput::Detector(DetectorEvent::FrameResult(frame)),
        };
        let status = handle.request(input).await.context("game session closed")?;
        print_status(&status, mode);
        prompt(mode);
    }

    let final_status = handle.status();
    handle
        .request(GameInput::Shutdown)
        .await
        .context("stopping game session")?;
    task.await.context("game session panicked")?;

    if mode != TerminalMode::Json {
        println!("\nGame over. {}", final_status.score);
    }
    Ok(())
}

fn print_header(config: &GameConfig, no_color: bool) {
    let title = format!("  Mimic v{} - match the emoji", VERSION);
    if no_color {
        println!("========================================");
        println!("{}", title);
        println!("========================================");
    } else {
        println!("{}", "========================================".bold());
        println!("{}", title.bold());
        println!("{}", "========================================".bold());
    }
    println!(
        "Rounds last {:.1}s. Type an emoji or its name, empty line = no face.",
        config.round_duration_ms as f64 / 1000.0
    );
    let names: Vec<String> = EMOJI_CATALOG
        .iter()
        .map(|c| {
            let code = EmojiCode(*c);
            format!("{} {}", code, code.name().unwrap_or("?"))
        })
        .collect();
    println!("Catalog: {}", names.join(", "));
    println!("Commands: start, stop, reset, quit");
    println!();
}

fn prompt(mode: TerminalMode) {
    if mode == TerminalMode::Json {
        return;
    }
    print!("> ");
    let _ = io::stdout().flush();
}

fn print_status(status: &GameStatus, mode: TerminalMode) {
    match mode {
        TerminalMode::Json => match serde_json::to_string(status) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::warn!("failed to encode status: {}", e),
        },
        TerminalMode::Plain | TerminalMode::Color => {
            let Some(reason) = status.last_reason else { return };
            let line = format!(
                "  {} | {} | {:.1}s left",
                reason.description(),
                status.score,
                status.remaining_ms as f64 / 1000.0
            );
            if mode == TerminalMode::Color {
                println!("{}", line.dimmed());
            } else {
                println!("{}", line);
            }
        }
    }
}
