use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::cli::error::{resolve_member, user_error};
use crate::cli::output::{
    display_report, render_display, render_stage_roster, render_status, render_team_roster,
    stage_roster, status_report, team_roster,
};
use crate::cli::watch::run_watch;
use crate::db::DbConnection;
use crate::engine::wrap_index;
use crate::models::{RoundMode, Rotation, Stage, Team, ViewMode, DEFAULT_ROUND_MINUTES};
use crate::repo::SnapshotRepo;
use crate::snapshot::{decode_token, encode_token, normalize, share_url};
use crate::utils::date::{format_start_now, now_ms, parse_instant_expr, parse_local_datetime};

#[derive(Parser)]
#[command(name = "rota")]
#[command(about = "Stage rotation tracker - rotates teams through stages round by round")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the rotation display (the default command)
    Show {
        /// Group by stage
        #[arg(long, conflicts_with = "teams")]
        stages: bool,
        /// Group by team
        #[arg(long)]
        teams: bool,
        /// Evaluate at a given local time instead of now (e.g., "2026-03-01T09:30")
        #[arg(long)]
        at: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Redraw the display on a timer
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value_t = 1)]
        interval: u64,
        /// Group by stage
        #[arg(long, conflicts_with = "teams")]
        stages: bool,
        /// Group by team
        #[arg(long)]
        teams: bool,
    },
    /// Show the round summary and warnings
    Status {
        /// Evaluate at a given local time instead of now
        #[arg(long)]
        at: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Team roster commands
    Team {
        #[command(subcommand)]
        subcommand: TeamCommands,
    },
    /// Stage roster commands
    Stage {
        #[command(subcommand)]
        subcommand: StageCommands,
    },
    /// Change rotation settings
    Set {
        #[command(subcommand)]
        subcommand: SetCommands,
    },
    /// Print a share token for the current rotation
    Share {
        /// Base URL to embed the token in
        #[arg(long)]
        base: Option<String>,
    },
    /// Replace the rotation from a token, URL, JSON file, or "-" for stdin
    Import {
        /// Share token, URL containing one, path to a JSON snapshot, or "-"
        source: String,
    },
    /// Print the rotation snapshot as JSON
    Export {
        /// Pretty-print instead of compact one-line output
        #[arg(long)]
        pretty: bool,
    },
    /// Discard the rotation and start over with defaults
    Reset {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TeamCommands {
    /// List teams and their starting stages
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Rename a team
    Rename {
        /// Team number (1-based) or exact name
        team: String,
        /// New name
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        name: Vec<String>,
    },
    /// Move a team's starting stage
    Start {
        /// Team number (1-based) or exact name
        team: String,
        /// Stage number (1-based) or exact name
        stage: String,
    },
}

#[derive(Subcommand)]
pub enum StageCommands {
    /// List stages and their supervisors
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Rename a stage
    Rename {
        /// Stage number (1-based) or exact name
        stage: String,
        /// New name
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        name: Vec<String>,
    },
    /// Assign a supervisor to a stage (no name clears it)
    Supervisor {
        /// Stage number (1-based) or exact name
        stage: String,
        /// Supervisor name, omit to clear
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        name: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum SetCommands {
    /// Switch between scheduled and manual rounds
    Mode {
        /// "scheduled" or "manual"
        mode: String,
    },
    /// Pin the manual round (1-based, wraps around)
    Round {
        round: String,
    },
    /// Set the schedule start time ("now", a local time, or "none" to clear)
    Start {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        time: Vec<String>,
    },
    /// Set the round length in minutes
    Length {
        minutes: String,
    },
    /// Choose which grouping the display leads with
    View {
        /// "stages" or "teams"
        view: String,
    },
}

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print()?;
            return Ok(());
        }
    };

    // Bare `rota` renders the display.
    let command = cli.command.unwrap_or(Commands::Show {
        stages: false,
        teams: false,
        at: None,
        json: false,
    });
    handle_command(command)
}

fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Show {
            stages,
            teams,
            at,
            json,
        } => handle_show(stages, teams, at, json),
        Commands::Watch {
            interval,
            stages,
            teams,
        } => handle_watch(interval, stages, teams),
        Commands::Status { at, json } => handle_status(at, json),
        Commands::Team { subcommand } => handle_team(subcommand),
        Commands::Stage { subcommand } => handle_stage(subcommand),
        Commands::Set { subcommand } => handle_set(subcommand),
        Commands::Share { base } => handle_share(base),
        Commands::Import { source } => handle_import(source),
        Commands::Export { pretty } => handle_export(pretty),
        Commands::Reset { yes } => handle_reset(yes),
    }
}

/// Resolve `--at` into epoch milliseconds, defaulting to the wall clock.
fn resolve_at(at: Option<String>) -> i64 {
    match at {
        None => now_ms(),
        Some(expr) => match parse_instant_expr(&expr) {
            Some(ms) => ms,
            None => user_error(&format!(
                "Invalid time expression: '{}'. Expected a local time like 2026-03-01T09:30.",
                expr
            )),
        },
    }
}

/// Normalize an edited rotation and persist it, returning the stored form.
///
/// Edits built through the `with_*` methods are already well formed, so the
/// normalization pass is a backstop; anything it had to heal is logged.
fn commit_edit(conn: &Connection, rotation: Rotation) -> Rotation {
    let value = serde_json::to_value(&rotation).expect("rotation serializes");
    let normalized = normalize(&value);
    if !normalized.is_clean() {
        log::debug!("edit healed fields: {}", normalized.defaulted.join(", "));
    }
    SnapshotRepo::save(conn, &normalized.rotation);
    normalized.rotation
}

fn handle_show(stages: bool, teams: bool, at: Option<String>, json: bool) -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let rotation = SnapshotRepo::load(&conn)?;
    let at_ms = resolve_at(at);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&display_report(&rotation, at_ms))?
        );
    } else {
        let view = if teams {
            ViewMode::Teams
        } else if stages {
            ViewMode::Stages
        } else {
            rotation.view
        };
        print!("{}", render_display(&rotation, at_ms, view));
    }
    Ok(())
}

fn handle_watch(interval: u64, stages: bool, teams: bool) -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let view = if teams {
        Some(ViewMode::Teams)
    } else if stages {
        Some(ViewMode::Stages)
    } else {
        None
    };
    run_watch(&conn, interval, view)
}

fn handle_status(at: Option<String>, json: bool) -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let rotation = SnapshotRepo::load(&conn)?;
    let at_ms = resolve_at(at);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status_report(&rotation, at_ms))?
        );
    } else {
        print!("{}", render_status(&rotation, at_ms));
    }
    Ok(())
}

fn handle_team(cmd: TeamCommands) -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let rotation = SnapshotRepo::load(&conn)?;

    match cmd {
        TeamCommands::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&team_roster(&rotation))?);
            } else {
                print!("{}", render_team_roster(&rotation));
            }
            Ok(())
        }
        TeamCommands::Rename { team, name } => {
            let index = match resolve_member("team", &rotation.team_names(), &team) {
                Ok(index) => index,
                Err(e) => user_error(&e),
            };
            let joined = name.join(" ");
            let trimmed = joined.trim();
            let new_name = if trimmed.is_empty() {
                let fallback = Team::default_name(index);
                println!("Blank name, using '{}'.", fallback);
                fallback
            } else {
                trimmed.to_string()
            };
            let rotation = commit_edit(&conn, rotation.with_team_name(index, new_name));
            println!("Renamed team {} to '{}'", index + 1, rotation.teams[index].name);
            Ok(())
        }
        TeamCommands::Start { team, stage } => {
            let index = match resolve_member("team", &rotation.team_names(), &team) {
                Ok(index) => index,
                Err(e) => user_error(&e),
            };
            let offset = match resolve_member("stage", &rotation.stage_names(), &stage) {
                Ok(offset) => offset,
                Err(e) => user_error(&e),
            };
            let rotation = commit_edit(&conn, rotation.with_team_offset(index, offset as i64));
            println!(
                "Team {} now starts at stage {}.",
                index + 1,
                rotation.teams[index].start_offset + 1
            );
            Ok(())
        }
    }
}

fn handle_stage(cmd: StageCommands) -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let rotation = SnapshotRepo::load(&conn)?;

    match cmd {
        StageCommands::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&stage_roster(&rotation))?);
            } else {
                print!("{}", render_stage_roster(&rotation));
            }
            Ok(())
        }
        StageCommands::Rename { stage, name } => {
            let index = match resolve_member("stage", &rotation.stage_names(), &stage) {
                Ok(index) => index,
                Err(e) => user_error(&e),
            };
            let joined = name.join(" ");
            let trimmed = joined.trim();
            let new_name = if trimmed.is_empty() {
                let fallback = Stage::default_name(index);
                println!("Blank name, using '{}'.", fallback);
                fallback
            } else {
                trimmed.to_string()
            };
            let rotation = commit_edit(&conn, rotation.with_stage_name(index, new_name));
            println!(
                "Renamed stage {} to '{}'",
                index + 1,
                rotation.stages[index].name
            );
            Ok(())
        }
        StageCommands::Supervisor { stage, name } => {
            let index = match resolve_member("stage", &rotation.stage_names(), &stage) {
                Ok(index) => index,
                Err(e) => user_error(&e),
            };
            let joined = name.join(" ");
            let supervisor = joined.trim().to_string();
            if supervisor.is_empty() {
                commit_edit(&conn, rotation.with_stage_supervisor(index, None));
                println!("Cleared the supervisor for stage {}.", index + 1);
            } else {
                commit_edit(
                    &conn,
                    rotation.with_stage_supervisor(index, Some(supervisor.clone())),
                );
                println!("Stage {} supervisor is now {}.", index + 1, supervisor);
            }
            Ok(())
        }
    }
}

fn handle_set(cmd: SetCommands) -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let rotation = SnapshotRepo::load(&conn)?;

    match cmd {
        SetCommands::Mode { mode } => {
            let parsed = match RoundMode::from_str(mode.trim()) {
                Some(parsed) => parsed,
                None => user_error(&format!(
                    "Invalid mode: '{}'. Expected 'scheduled' or 'manual'.",
                    mode
                )),
            };
            let rotation = commit_edit(&conn, rotation.with_mode(parsed));
            match rotation.round_mode {
                RoundMode::Manual => println!(
                    "Mode set to manual (round {}).",
                    rotation.manual_round_index + 1
                ),
                RoundMode::Scheduled => {
                    println!("Mode set to scheduled.");
                    if rotation.schedule_start.is_none() {
                        println!("No start time is set; the round stays at 1 until 'rota set start'.");
                    }
                }
            }
            Ok(())
        }
        SetCommands::Round { round } => {
            let count = rotation.stage_count;
            let value: i64 = match round.trim().parse() {
                Ok(value) => value,
                Err(_) => user_error(&format!(
                    "Invalid round number: '{}'. Round must be a number.",
                    round
                )),
            };
            let wrapped = wrap_index(value - 1, count);
            if value < 1 || value > count as i64 {
                println!(
                    "Round {} is outside 1-{}; wrapping to {}.",
                    value,
                    count,
                    wrapped + 1
                );
            }
            let rotation = commit_edit(&conn, rotation.with_manual_round(wrapped as i64));
            println!("Manual round set to {}.", rotation.manual_round_index + 1);
            if rotation.round_mode == RoundMode::Scheduled {
                println!("Note: scheduled mode is active; this takes effect after 'rota set mode manual'.");
            }
            Ok(())
        }
        SetCommands::Start { time } => {
            let joined = time.join(" ");
            let expr = joined.trim();
            if expr.is_empty() || expr == "none" {
                commit_edit(&conn, rotation.with_schedule_start(None));
                println!("Cleared the schedule start.");
                return Ok(());
            }
            let stamp = if expr == "now" {
                format_start_now()
            } else {
                expr.to_string()
            };
            let parses = parse_local_datetime(&stamp).is_some();
            let rotation = commit_edit(&conn, rotation.with_schedule_start(Some(stamp)));
            match &rotation.schedule_start {
                Some(start) if parses => println!("Schedule starts at {}.", start),
                Some(start) => println!(
                    "Stored '{}', but it does not parse as a local time; the round stays at 1 until it does.",
                    start
                ),
                None => println!("Cleared the schedule start."),
            }
            Ok(())
        }
        SetCommands::Length { minutes } => {
            let value: f64 = match minutes.trim().parse() {
                Ok(value) => value,
                Err(_) => user_error(&format!(
                    "Invalid round length: '{}'. Length must be a number of minutes.",
                    minutes
                )),
            };
            let length = if !value.is_finite() || value == 0.0 {
                println!(
                    "Round length '{}' is not usable; using the default {} minutes.",
                    minutes.trim(),
                    DEFAULT_ROUND_MINUTES
                );
                DEFAULT_ROUND_MINUTES
            } else if value < 1.0 {
                println!("Round length below 1 minute; clamping to 1.");
                1.0
            } else {
                value
            };
            let rotation = commit_edit(&conn, rotation.with_round_length(length));
            println!("Round length set to {} min.", rotation.round_length_minutes);
            Ok(())
        }
        SetCommands::View { view } => {
            let parsed = match ViewMode::from_str(view.trim()) {
                Some(parsed) => parsed,
                None => user_error(&format!(
                    "Invalid view: '{}'. Expected 'stages' or 'teams'.",
                    view
                )),
            };
            let rotation = commit_edit(&conn, rotation.with_view(parsed));
            println!("Default view set to {}.", rotation.view.as_str());
            Ok(())
        }
    }
}

fn handle_share(base: Option<String>) -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let rotation = SnapshotRepo::load(&conn)?;

    match base {
        Some(base) => println!("{}", share_url(&base, &rotation)),
        None => println!("{}", encode_token(&rotation)),
    }
    Ok(())
}

fn handle_import(source: String) -> Result<()> {
    use std::io::Read;

    let conn = DbConnection::connect().context("Failed to connect to database")?;

    let text = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        buffer
    } else if std::path::Path::new(&source).exists() {
        std::fs::read_to_string(&source)
            .with_context(|| format!("Failed to read {}", source))?
    } else {
        source
    };

    let trimmed = text.trim();
    let normalized = if trimmed.starts_with('{') {
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(value) => normalize(&value),
            Err(e) => user_error(&format!("Invalid snapshot JSON: {}", e)),
        }
    } else {
        match decode_token(trimmed) {
            Ok(normalized) => normalized,
            Err(e) => user_error(&format!("Invalid share token: {}", e)),
        }
    };

    if !normalized.is_clean() {
        println!(
            "Repaired fields during import: {}",
            normalized.defaulted.join(", ")
        );
    }
    SnapshotRepo::save(&conn, &normalized.rotation);
    println!(
        "Imported rotation with {} stages.",
        normalized.rotation.stage_count
    );
    Ok(())
}

fn handle_export(pretty: bool) -> Result<()> {
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let rotation = SnapshotRepo::load(&conn)?;

    if pretty {
        println!("{}", serde_json::to_string_pretty(&rotation)?);
    } else {
        println!("{}", serde_json::to_string(&rotation)?);
    }
    Ok(())
}

fn handle_reset(yes: bool) -> Result<()> {
    use std::io::{self, Write};

    let conn = DbConnection::connect().context("Failed to connect to database")?;

    if !yes {
        print!("Reset the rotation to defaults? (y/n): ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input != "y" && input != "yes" {
            println!("Cancelled.");
            return Ok(());
        }
    }

    SnapshotRepo::save(&conn, &Rotation::default());
    println!("Rotation reset to defaults.");
    Ok(())
}
