use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use pomo::config::{Config, config_path};
use pomo::entry::parse_manual_input;
use pomo::error::{Error, Result};
use pomo::format::format_remaining;
use pomo::hooks::Hooks;
use pomo::scheduler::IntervalTicker;
use pomo::session::Session;
use pomo::sound::{Alert, Silent, SystemBell, default_sound_path};
use pomo::timer::{Countdown, Mode};
use pomo::ui;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file, defaults to ~/.config/pomo/config.json
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the timer (the default)
    Start(StartArgs),
    /// Print the config file location and its effective contents
    Config,
}

#[derive(Args, Debug, Default)]
struct StartArgs {
    /// Work length: 25m, 30s, 1m30s, 1h or a bare number of minutes
    #[arg(short, long, value_parser = parse_duration)]
    work: Option<Duration>,

    /// Grace length before each break
    #[arg(short, long, value_parser = parse_duration)]
    grace: Option<Duration>,

    /// Break length
    #[arg(short = 'b', long = "break", value_parser = parse_duration)]
    rest: Option<Duration>,

    /// Time for the first countdown as HHMMSS, like manual entry
    #[arg(long)]
    time: Option<String>,

    #[arg(short, long)]
    topic: Option<String>,

    /// Count down once and stop instead of cycling
    #[arg(long)]
    single: bool,

    #[arg(long)]
    no_sound: bool,

    /// Alert sound file
    #[arg(long)]
    sound: Option<PathBuf>,
}

fn too_large() -> Error {
    Error::Duration("Duration too large".to_string())
}

fn parse_duration(input: &str) -> Result<Duration> {
    let input = input.trim().to_lowercase();

    // a bare number means minutes
    if let Ok(minutes) = input.parse::<u64>() {
        if minutes == 0 {
            return Err(Error::Duration("Duration must be greater than 0".to_string()));
        }
        return minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(too_large);
    }

    let mut total_seconds = 0u64;
    let mut current_number = String::new();

    for ch in input.chars() {
        if ch.is_ascii_digit() {
            current_number.push(ch);
        } else if matches!(ch, 'h' | 'm' | 's') {
            if current_number.is_empty() {
                return Err(Error::Duration(
                    "Use formats like: 25m, 30s, 1m30s".to_string(),
                ));
            }
            let number: u64 = current_number
                .parse()
                .map_err(|_| Error::Duration(format!("Invalid number: {}", current_number)))?;
            let seconds = match ch {
                'h' => number.checked_mul(3600),
                'm' => number.checked_mul(60),
                _ => Some(number),
            };
            total_seconds = seconds
                .and_then(|seconds| total_seconds.checked_add(seconds))
                .ok_or_else(too_large)?;
            current_number.clear();
        } else if !ch.is_whitespace() {
            return Err(Error::Duration(format!(
                "Invalid character '{}'. Use formats like: 25m, 30s, 1m30s",
                ch
            )));
        }
    }

    if !current_number.is_empty() {
        return Err(Error::Duration(
            "Duration must end with 'h', 'm' or 's'".to_string(),
        ));
    }
    if total_seconds == 0 {
        return Err(Error::Duration("Duration must be greater than 0".to_string()));
    }
    Ok(Duration::from_secs(total_seconds))
}

fn start(config: Config, args: StartArgs) -> Result<()> {
    let mut durations = config.durations();
    if let Some(work) = args.work {
        durations.work = work;
    }
    if let Some(grace) = args.grace {
        durations.grace = grace;
    }
    if let Some(rest) = args.rest {
        durations.rest = rest;
    }
    let mode = if args.single { Mode::Single } else { Mode::Cycle };

    let mut countdown = Countdown::new(durations, mode);
    if let Some(time) = &args.time {
        countdown.set_remaining(parse_manual_input(time)?);
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    let topic = args.topic.unwrap_or(config.topic);
    if args.no_sound {
        launch(countdown, Silent, config.hooks, topic, &interrupted)
    } else {
        let sound = args.sound.or(config.sound).or_else(default_sound_path);
        let bell = SystemBell::load(sound.as_deref());
        launch(countdown, bell, config.hooks, topic, &interrupted)
    }
}

fn launch<A: Alert>(
    countdown: Countdown,
    alert: A,
    hooks: Hooks,
    topic: String,
    interrupted: &AtomicBool,
) -> Result<()> {
    let mut session = Session::new(countdown, IntervalTicker::new(), alert, hooks, topic);
    ui::run(&mut session, interrupted)?;

    println!(
        "🍅 Stopped in {} with {} left",
        session.state().as_str().to_lowercase(),
        format_remaining(session.countdown().remaining())
    );
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let path = cli.config.unwrap_or_else(config_path);
    let config = Config::load(&path);

    match cli.command.unwrap_or(Commands::Start(StartArgs::default())) {
        Commands::Start(args) => start(config, args),
        Commands::Config => {
            println!("{}", path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
