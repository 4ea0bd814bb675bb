use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use chrono::{Days, FixedOffset};
use clap::{Parser, Subcommand};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{mpsc, Mutex},
    time::Instant,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deepwork::{
    repositories::http::HttpSessionStore,
    timer::{spawn_ticker, FinishKind, SharedTimer, Timer, TimerEvent, TimerSignal},
    tracker::SessionTracker,
    views::{
        self,
        activity::{render_weekly, weekly_hours, ActivityCalendar},
        duration::format_seconds,
        filter::DayFilter,
        table::SessionTable,
    },
};

/// Terminal client for the deep-work session API.
#[derive(Parser)]
#[command(name = "focus", version, about)]
struct Cli {
    /// Base URL of the session API.
    #[arg(long, env = "DEEPWORK_API_URL", default_value = "http://127.0.0.1:3000")]
    api_url: String,

    /// UTC offset in minutes used for day bucketing. Defaults to the local offset.
    #[arg(long, env = "DEEPWORK_UTC_OFFSET_MINUTES", allow_hyphen_values = true)]
    utc_offset_minutes: Option<i32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a focus session and run the timer until it expires.
    Start {
        #[arg(long)]
        tag: String,
        #[arg(long)]
        description: String,
        /// Timer length in minutes (1 to 1440).
        #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u64).range(1..=1440))]
        minutes: u64,
    },
    /// Show the session table and activity calendar.
    List {
        /// today, yesterday or all
        #[arg(long, default_value = "all")]
        filter: DayFilter,
        /// Number of days shown in the activity calendar.
        #[arg(long, default_value_t = 14)]
        days: u64,
    },
    /// Change the description of the most recent session.
    Edit { id: i64, description: String },
    /// Delete a session.
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let offset = match cli.utc_offset_minutes {
        Some(minutes) => FixedOffset::east_opt(minutes * 60)
            .ok_or_else(|| anyhow!("UTC offset out of range: {} minutes", minutes))?,
        None => views::local_offset(),
    };

    let mut tracker = SessionTracker::new(HttpSessionStore::new(cli.api_url));
    tracker.load().await.context("Failed to load sessions")?;

    match cli.command {
        Command::Start {
            tag,
            description,
            minutes,
        } => run_session(&mut tracker, &tag, &description, minutes).await?,
        Command::List { filter, days } => print_overview(&tracker, filter, days, &offset),
        Command::Edit { id, description } => {
            let session = tracker.edit_description(id, &description).await?;
            println!("Session {} is now \"{}\"", session.id, session.description);
        }
        Command::Delete { id } => {
            tracker.delete_session(id).await?;
            println!("Session {} deleted", id);
        }
    }

    Ok(())
}

async fn run_session(
    tracker: &mut SessionTracker<HttpSessionStore>,
    tag: &str,
    description: &str,
    minutes: u64,
) -> Result<()> {
    let duration = Duration::from_secs(minutes.saturating_mul(60));
    let timer: SharedTimer = Arc::new(Mutex::new(Timer::new(duration)));
    timer.lock().await.start(duration, Instant::now())?;

    let session = tracker.start_session(tag, description).await?;
    println!("Session {} started: [{}] {}", session.id, session.tag, session.description);
    println!("Commands: p = pause, r = resume, d = done (Ctrl-C also ends the session)");

    let (tx, signals) = mpsc::unbounded_channel();
    let ticker = spawn_ticker(timer.clone(), Duration::from_secs(1), tx);
    let outcome = wait_for_finish(&timer, signals).await;
    ticker.abort();
    eprintln!();

    // The session is closed even when the timer loop failed.
    let event = match outcome {
        Ok(event) => event,
        Err(e) => {
            if let Some(event) = timer.lock().await.done(Instant::now()) {
                tracker.complete_session(event.elapsed_seconds()).await?;
            }
            return Err(e);
        }
    };

    if event.kind == FinishKind::Expired {
        println!("\u{7}Time is up!");
    }
    match tracker.complete_session(event.elapsed_seconds()).await? {
        Some(done) => println!(
            "Session {} completed, {} focused",
            done.id,
            format_seconds(done.focused.unwrap_or(0))
        ),
        None => println!("No session in progress"),
    }
    Ok(())
}

async fn wait_for_finish(
    timer: &SharedTimer,
    mut signals: mpsc::UnboundedReceiver<TimerSignal>,
) -> Result<TimerEvent> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Some(TimerSignal::Tick(remaining)) => {
                    eprint!("\r⏳ {}   ", clock_face(remaining));
                }
                Some(TimerSignal::Finished(event)) => return Ok(event),
                None => return Err(anyhow!("timer stopped unexpectedly")),
            },
            line = input.next_line(), if stdin_open => {
                let Some(command) = line? else {
                    stdin_open = false;
                    continue;
                };
                let mut guard = timer.lock().await;
                let now = Instant::now();
                let outcome = match command.trim() {
                    "p" => guard.pause(now).map(|_| None),
                    "r" => guard.resume(now).map(|_| None),
                    "d" => Ok(guard.done(now)),
                    _ => Ok(None),
                };
                match outcome {
                    Ok(Some(event)) => return Ok(event),
                    Ok(None) => {}
                    Err(e) => eprintln!("\n{}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if let Some(event) = timer.lock().await.done(Instant::now()) {
                    return Ok(event);
                }
            }
        }
    }
}

fn print_overview(
    tracker: &SessionTracker<HttpSessionStore>,
    filter: DayFilter,
    days: u64,
    offset: &FixedOffset,
) {
    let today = views::today(offset);
    let table = SessionTable::new(
        tracker.sessions(),
        filter,
        today,
        offset,
        tracker.editable_session_id(),
    );

    if table.is_empty() {
        println!("No sessions ({})", filter);
    } else {
        print!("{}", table.render());
    }

    let calendar = ActivityCalendar::from_sessions(tracker.sessions(), offset);
    let from = today
        .checked_sub_days(Days::new(days.saturating_sub(1)))
        .unwrap_or(today);
    println!("\nActivity");
    print!("{}", calendar.render(from, today));

    println!("\nHours per weekday");
    print!("{}", render_weekly(&weekly_hours(tracker.sessions(), offset)));
}

fn clock_face(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(minutes: &str) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from([
            "focus", "start", "--tag", "Work", "--description", "report", "--minutes", minutes,
        ])
    }

    #[test]
    fn start_minutes_are_bounded() {
        assert!(parse("0").is_err());
        assert!(parse("1441").is_err());
        assert!(parse("18446744073709551615").is_err());

        let cli = parse("25").unwrap();
        assert!(matches!(cli.command, Command::Start { minutes: 25, .. }));
    }

    #[test]
    fn start_defaults_to_ninety_minutes() {
        let cli = Cli::try_parse_from(["focus", "start", "--tag", "Work", "--description", "report"])
            .unwrap();
        assert!(matches!(cli.command, Command::Start { minutes: 90, .. }));
    }
}
