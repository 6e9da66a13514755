// Output formatting utilities

use serde::Serialize;
use std::io::IsTerminal;

use crate::engine::{
    active_round, assignment_for_round, check, next_round, Assignment, StageSlot, Warning,
};
use crate::models::{RoundMode, Rotation, ViewMode};
use crate::utils::date::format_local;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_FG_GREEN: &str = "\x1b[32m";
const ANSI_FG_YELLOW: &str = "\x1b[33m";

/// Placeholder for an empty slot or missing value.
const EMPTY_MARK: &str = "—";
/// Marker for a stage holding more than one team.
const COLLISION_MARK: &str = "⚠ collision";

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate for reliable detection, with fallback to
/// the COLUMNS environment variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

/// Apply bold formatting if in TTY mode
fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

fn color_if_tty(text: &str, color: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", color, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Text shown for a stage's occupant.
fn slot_text(rotation: &Rotation, slot: StageSlot) -> String {
    match slot {
        StageSlot::Empty => EMPTY_MARK.to_string(),
        StageSlot::Collision => COLLISION_MARK.to_string(),
        StageSlot::Team(index) => rotation
            .teams
            .get(index)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| EMPTY_MARK.to_string()),
    }
}

/// Render a left-aligned table with a separator line, shrinking the
/// widest column when the terminal is narrow. Widths count characters,
/// not bytes, so multi-byte names line up.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let terminal_width = get_terminal_width();
    let total = |w: &[usize]| w.iter().sum::<usize>() + w.len().saturating_sub(1);
    while total(&widths) > terminal_width {
        let widest = widths
            .iter()
            .enumerate()
            .max_by_key(|(_, w)| **w)
            .map(|(idx, _)| idx);
        match widest {
            Some(idx) if widths[idx] > 8 => widths[idx] -= 1,
            _ => break,
        }
    }

    let clip = |text: &str, width: usize| -> String {
        if text.chars().count() <= width {
            text.to_string()
        } else {
            let kept: String = text.chars().take(width.saturating_sub(2)).collect();
            format!("{}..", kept)
        }
    };

    let mut output = String::new();
    for (idx, header) in headers.iter().enumerate() {
        output.push_str(&format!("{:<width$}", header, width = widths[idx]));
        if idx < headers.len() - 1 {
            output.push(' ');
        }
    }
    output.push('\n');
    for (idx, width) in widths.iter().enumerate() {
        output.push_str(&"─".repeat(*width));
        if idx < widths.len() - 1 {
            output.push(' ');
        }
    }
    output.push('\n');

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let clipped = clip(cell, widths[idx]);
            output.push_str(&format!("{:<width$}", clipped, width = widths[idx]));
            if idx < row.len() - 1 {
                output.push(' ');
            }
        }
        output.push('\n');
    }
    output
}

fn join_display_numbers(indexes: &[usize]) -> String {
    indexes
        .iter()
        .map(|i| (i + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One line per consistency finding, plus the all-clear line when the
/// starting layout is sound.
pub fn render_warning_lines(rotation: &Rotation, now_ms: i64) -> String {
    let tty = is_tty();
    let warnings = check(rotation, now_ms);
    let mut lines = String::new();

    if !warnings
        .iter()
        .any(|w| matches!(w, Warning::DuplicateStartOffsets { .. }))
    {
        lines.push_str(&color_if_tty(
            "Rotation looks good: each team has a unique starting stage.",
            ANSI_FG_GREEN,
            tty,
        ));
        lines.push('\n');
    }

    for warning in &warnings {
        let text = match warning {
            Warning::DuplicateStartOffsets { offsets } => format!(
                "Warning: duplicate starting stages ({}). Two teams will share a stage every round.",
                join_display_numbers(offsets)
            ),
            Warning::InactiveSchedule => {
                "Warning: scheduled mode is on but the start time is empty or invalid. The round stays at 1."
                    .to_string()
            }
            Warning::LiveCollision { stages } => format!(
                "Warning: collision this round on stage {}. Fix the starting stages.",
                join_display_numbers(stages)
            ),
        };
        lines.push_str(&color_if_tty(&text, ANSI_FG_YELLOW, tty));
        lines.push('\n');
    }
    lines
}

/// The round/mode summary lines shown under the warnings.
pub fn render_status_lines(rotation: &Rotation, now_ms: i64) -> String {
    let tty = is_tty();
    let round = active_round(rotation, now_ms);
    let next = next_round(rotation, round);

    let mut lines = String::new();
    lines.push_str(&bold_if_tty(
        &format!(
            "Round {} of {} (next: {})",
            round + 1,
            rotation.stage_count,
            next + 1
        ),
        tty,
    ));
    lines.push('\n');

    let mut details = format!(
        "Mode: {} | Round length: {} min",
        rotation.round_mode.label(),
        rotation.round_length_minutes
    );
    if rotation.round_mode == RoundMode::Scheduled {
        if let Some(start) = &rotation.schedule_start {
            details.push_str(&format!(" | Start: {}", start));
        }
    }
    details.push_str(&format!(" | Time: {}", format_local(now_ms)));
    lines.push_str(&details);
    lines.push('\n');
    lines
}

fn stage_table(rotation: &Rotation, now: &Assignment, next: &Assignment) -> String {
    let rows: Vec<Vec<String>> = rotation
        .stages
        .iter()
        .enumerate()
        .map(|(idx, stage)| {
            vec![
                (idx + 1).to_string(),
                stage.name.clone(),
                stage
                    .supervisor_name
                    .clone()
                    .unwrap_or_else(|| EMPTY_MARK.to_string()),
                slot_text(rotation, now.team_at_stage[idx]),
                slot_text(rotation, next.team_at_stage[idx]),
            ]
        })
        .collect();
    render_table(&["#", "Stage", "Supervisor", "Now", "Next"], &rows)
}

fn team_table(rotation: &Rotation, now: &Assignment, next: &Assignment) -> String {
    let stage_label = |stage: usize| -> String {
        let name = rotation
            .stages
            .get(stage)
            .map(|s| s.name.as_str())
            .unwrap_or(EMPTY_MARK);
        format!("{} (#{})", name, stage + 1)
    };
    let rows: Vec<Vec<String>> = rotation
        .teams
        .iter()
        .enumerate()
        .map(|(idx, team)| {
            vec![
                (idx + 1).to_string(),
                team.name.clone(),
                stage_label(now.stage_of_team[idx]),
                stage_label(next.stage_of_team[idx]),
            ]
        })
        .collect();
    render_table(&["#", "Team", "Now", "Next"], &rows)
}

/// The full display: warnings, round summary, then the chosen view.
pub fn render_display(rotation: &Rotation, now_ms: i64, view: ViewMode) -> String {
    let round = active_round(rotation, now_ms);
    let now = assignment_for_round(rotation, round);
    let next = assignment_for_round(rotation, next_round(rotation, round));

    let mut output = String::new();
    output.push_str(&render_warning_lines(rotation, now_ms));
    output.push_str(&render_status_lines(rotation, now_ms));
    output.push('\n');
    output.push_str(&match view {
        ViewMode::Stages => stage_table(rotation, &now, &next),
        ViewMode::Teams => team_table(rotation, &now, &next),
    });
    output
}

/// The `status` command body: summary lines plus warnings.
pub fn render_status(rotation: &Rotation, now_ms: i64) -> String {
    let mut output = render_status_lines(rotation, now_ms);
    output.push_str(&render_warning_lines(rotation, now_ms));
    output
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotReport {
    pub team: Option<String>,
    pub collision: bool,
}

impl SlotReport {
    fn from_slot(rotation: &Rotation, slot: StageSlot) -> Self {
        match slot {
            StageSlot::Empty => SlotReport {
                team: None,
                collision: false,
            },
            StageSlot::Collision => SlotReport {
                team: None,
                collision: true,
            },
            StageSlot::Team(index) => SlotReport {
                team: rotation.teams.get(index).map(|t| t.name.clone()),
                collision: false,
            },
        }
    }
}

/// Stage-centric view of one round pair, 1-based numbering throughout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    pub number: usize,
    pub name: String,
    pub supervisor_name: Option<String>,
    pub now: SlotReport,
    pub next: SlotReport,
}

/// Team-centric view of one round pair, 1-based numbering throughout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamReport {
    pub number: usize,
    pub name: String,
    pub start_stage: usize,
    pub now_stage: usize,
    pub next_stage: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum WarningReport {
    DuplicateStartOffsets { stages: Vec<usize> },
    InactiveSchedule,
    LiveCollision { stages: Vec<usize> },
}

impl From<&Warning> for WarningReport {
    fn from(warning: &Warning) -> Self {
        let bump = |xs: &[usize]| xs.iter().map(|x| x + 1).collect();
        match warning {
            Warning::DuplicateStartOffsets { offsets } => WarningReport::DuplicateStartOffsets {
                stages: bump(offsets),
            },
            Warning::InactiveSchedule => WarningReport::InactiveSchedule,
            Warning::LiveCollision { stages } => WarningReport::LiveCollision {
                stages: bump(stages),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayReport {
    pub round: usize,
    pub next_round: usize,
    pub stage_count: usize,
    pub round_mode: String,
    pub view: String,
    pub round_length_minutes: f64,
    pub schedule_start: Option<String>,
    pub stages: Vec<StageReport>,
    pub teams: Vec<TeamReport>,
    pub warnings: Vec<WarningReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub round: usize,
    pub next_round: usize,
    pub stage_count: usize,
    pub round_mode: String,
    pub view: String,
    pub local_time: String,
    pub warnings: Vec<WarningReport>,
}

/// Machine-readable form of the full display.
pub fn display_report(rotation: &Rotation, now_ms: i64) -> DisplayReport {
    let round = active_round(rotation, now_ms);
    let next = next_round(rotation, round);
    let now = assignment_for_round(rotation, round);
    let upcoming = assignment_for_round(rotation, next);

    let stages = rotation
        .stages
        .iter()
        .enumerate()
        .map(|(idx, stage)| StageReport {
            number: idx + 1,
            name: stage.name.clone(),
            supervisor_name: stage.supervisor_name.clone(),
            now: SlotReport::from_slot(rotation, now.team_at_stage[idx]),
            next: SlotReport::from_slot(rotation, upcoming.team_at_stage[idx]),
        })
        .collect();

    let teams = rotation
        .teams
        .iter()
        .enumerate()
        .map(|(idx, team)| TeamReport {
            number: idx + 1,
            name: team.name.clone(),
            start_stage: team.start_offset + 1,
            now_stage: now.stage_of_team[idx] + 1,
            next_stage: upcoming.stage_of_team[idx] + 1,
        })
        .collect();

    DisplayReport {
        round: round + 1,
        next_round: next + 1,
        stage_count: rotation.stage_count,
        round_mode: rotation.round_mode.as_str().to_string(),
        view: rotation.view.as_str().to_string(),
        round_length_minutes: rotation.round_length_minutes,
        schedule_start: rotation.schedule_start.clone(),
        stages,
        teams,
        warnings: check(rotation, now_ms)
            .iter()
            .map(WarningReport::from)
            .collect(),
    }
}

/// Machine-readable form of the `status` summary.
pub fn status_report(rotation: &Rotation, now_ms: i64) -> StatusReport {
    let round = active_round(rotation, now_ms);
    StatusReport {
        round: round + 1,
        next_round: next_round(rotation, round) + 1,
        stage_count: rotation.stage_count,
        round_mode: rotation.round_mode.as_str().to_string(),
        view: rotation.view.as_str().to_string(),
        local_time: format_local(now_ms),
        warnings: check(rotation, now_ms)
            .iter()
            .map(WarningReport::from)
            .collect(),
    }
}

/// Roster listing row for `team list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRosterRow {
    pub number: usize,
    pub name: String,
    pub start_stage: usize,
}

/// Roster listing row for `stage list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRosterRow {
    pub number: usize,
    pub name: String,
    pub supervisor_name: Option<String>,
}

pub fn team_roster(rotation: &Rotation) -> Vec<TeamRosterRow> {
    rotation
        .teams
        .iter()
        .enumerate()
        .map(|(idx, team)| TeamRosterRow {
            number: idx + 1,
            name: team.name.clone(),
            start_stage: team.start_offset + 1,
        })
        .collect()
}

pub fn stage_roster(rotation: &Rotation) -> Vec<StageRosterRow> {
    rotation
        .stages
        .iter()
        .enumerate()
        .map(|(idx, stage)| StageRosterRow {
            number: idx + 1,
            name: stage.name.clone(),
            supervisor_name: stage.supervisor_name.clone(),
        })
        .collect()
}

pub fn render_team_roster(rotation: &Rotation) -> String {
    let rows: Vec<Vec<String>> = team_roster(rotation)
        .into_iter()
        .map(|row| {
            let start = rotation
                .stages
                .get(row.start_stage - 1)
                .map(|s| format!("{} (#{})", s.name, row.start_stage))
                .unwrap_or_else(|| format!("#{}", row.start_stage));
            vec![row.number.to_string(), row.name, start]
        })
        .collect();
    render_table(&["#", "Team", "Starts at"], &rows)
}

pub fn render_stage_roster(rotation: &Rotation) -> String {
    let rows: Vec<Vec<String>> = stage_roster(rotation)
        .into_iter()
        .map(|row| {
            vec![
                row.number.to_string(),
                row.name,
                row.supervisor_name
                    .unwrap_or_else(|| EMPTY_MARK.to_string()),
            ]
        })
        .collect();
    render_table(&["#", "Stage", "Supervisor"], &rows)
}
