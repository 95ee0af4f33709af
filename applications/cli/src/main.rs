/// ymusic - play tracks through a headless mpv engine
use anyhow::Context;
use clap::{Parser, ValueEnum};
use crossbeam_channel::{select, tick, unbounded, Receiver};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ymusic_cli::{
    config::AppConfig,
    orchestrator::{track_from_location, POLL_INTERVAL},
    DirectResolver, Orchestrator, Outcome, PlayerControl, UserCommand,
};
use ymusic_mpv::{EventStream, Player};
use ymusic_playback::{PlaybackQueue, RepeatMode};

#[derive(Parser)]
#[command(name = "ymusic")]
#[command(about = "Terminal music player driving a headless mpv engine", long_about = None)]
struct Cli {
    /// Files or URLs to queue, in order
    #[arg(required = true)]
    tracks: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Position in the queue to start from
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Start with shuffle enabled
    #[arg(short, long)]
    shuffle: bool,

    /// Initial repeat mode (overrides the config file)
    #[arg(short, long, value_enum)]
    repeat: Option<RepeatArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum RepeatArg {
    Off,
    All,
    One,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Off => RepeatMode::Off,
            RepeatArg::All => RepeatMode::All,
            RepeatArg::One => RepeatMode::One,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the status line owns stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ymusic=info,ymusic_cli=info,ymusic_mpv=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let mut queue = PlaybackQueue::new();
    queue.set(
        cli.tracks.iter().map(String::as_str).map(track_from_location).collect(),
        cli.start,
    );
    if cli.shuffle || config.playback.shuffle {
        queue.toggle_shuffle();
    }
    queue.set_repeat_mode(cli.repeat.map_or(config.playback.repeat, RepeatMode::from));

    let (player, events) = Player::new(config.engine.clone());
    player
        .start()
        .with_context(|| format!("Failed to start {}", config.engine.binary.display()))?;

    let mut orchestrator = Orchestrator::new(player, queue, DirectResolver);
    let result = run(&mut orchestrator, &events);
    orchestrator.shutdown();

    println!();
    result
}

fn run<P: PlayerControl>(
    orchestrator: &mut Orchestrator<P>,
    events: &EventStream,
) -> anyhow::Result<()> {
    orchestrator.play_current()?;

    let input = spawn_stdin_reader()?;
    let ticker = tick(POLL_INTERVAL);
    let mut stdout = io::stdout();

    loop {
        select! {
            recv(input) -> line => {
                let Ok(line) = line else {
                    tracing::info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<UserCommand>() {
                    Ok(command) => match orchestrator.handle_command(command) {
                        Ok(Outcome::Continue) => {}
                        Ok(Outcome::Show(text)) => writeln!(stdout, "\n{text}")?,
                        Ok(Outcome::Quit) => break,
                        Err(e) => tracing::warn!("Command failed: {e:#}"),
                    },
                    Err(e) => writeln!(stdout, "\n{e}")?,
                }
            }
            recv(events.receiver()) -> event => {
                let Ok(event) = event else {
                    tracing::warn!("Engine event stream closed");
                    break;
                };
                if let Err(e) = orchestrator.handle_event(&event) {
                    tracing::warn!("Failed to handle engine event: {e:#}");
                }
            }
            recv(ticker) -> _ => {
                if let Some(status) = orchestrator.poll_status() {
                    write!(stdout, "\r{status:<80}")?;
                    stdout.flush()?;
                }
            }
        }
    }

    Ok(())
}

/// Forward stdin lines to a channel so they can be selected on
fn spawn_stdin_reader() -> io::Result<Receiver<String>> {
    let (sender, receiver) = unbounded();
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if sender.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(receiver)
}
