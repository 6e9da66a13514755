use std::collections::BTreeMap;

use crate::engine::{active_round, assignment_for_round};
use crate::models::{RoundMode, Rotation};
use crate::utils::date::parse_local_datetime;

/// A consistency finding worth telling the user about
///
/// Findings are pure data; turning them into text belongs to the
/// presentation layer. Stage indexes are 0-based here and shifted for
/// display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Two or more teams share each of these starting stages (ascending).
    DuplicateStartOffsets { offsets: Vec<usize> },
    /// Scheduled mode is on but the start instant is missing or
    /// unparseable, so the round never advances past the first.
    InactiveSchedule,
    /// The active round puts more than one team on each of these stages
    /// (ascending).
    LiveCollision { stages: Vec<usize> },
}

/// Derive the warning report for the given instant.
///
/// Stateless and idempotent: the same rotation and instant always produce
/// the same findings, and a finding disappears the moment its cause does.
pub fn check(rotation: &Rotation, now_ms: i64) -> Vec<Warning> {
    let mut warnings = Vec::new();

    let mut offset_counts: BTreeMap<usize, usize> = BTreeMap::new();
    for team in &rotation.teams {
        *offset_counts.entry(team.start_offset).or_insert(0) += 1;
    }
    let duplicated: Vec<usize> = offset_counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(offset, _)| *offset)
        .collect();
    if !duplicated.is_empty() {
        warnings.push(Warning::DuplicateStartOffsets { offsets: duplicated });
    }

    if rotation.round_mode == RoundMode::Scheduled
        && rotation
            .schedule_start
            .as_deref()
            .and_then(parse_local_datetime)
            .is_none()
    {
        warnings.push(Warning::InactiveSchedule);
    }

    let assignment = assignment_for_round(rotation, active_round(rotation, now_ms));
    let collision_stages = assignment.collision_stages();
    if !collision_stages.is_empty() {
        warnings.push(Warning::LiveCollision {
            stages: collision_stages,
        });
    }

    warnings
}
