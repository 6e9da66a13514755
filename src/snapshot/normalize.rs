use serde_json::Value;

use crate::engine::wrap_index;
use crate::models::{
    RoundMode, Rotation, Stage, Team, ViewMode, DEFAULT_ROUND_MINUTES, DEFAULT_STAGE_COUNT,
    MAX_STAGE_COUNT,
};

/// Outcome of coercing an untrusted snapshot
///
/// `defaulted` names every field path that had to fall back to a default
/// or be clamped; an empty list means the input was already fully valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub rotation: Rotation,
    pub defaulted: Vec<String>,
}

impl Normalized {
    pub fn is_clean(&self) -> bool {
        self.defaulted.is_empty()
    }
}

/// Coerce any JSON value into a valid `Rotation`.
///
/// Total over its input: never fails and never panics. Missing or
/// malformed pieces fall back to their defaults field by field, and each
/// repair is recorded in the result. The output always satisfies the
/// `Rotation` invariants, so running the result through again is a no-op.
pub fn normalize(value: &Value) -> Normalized {
    let mut defaulted = Vec::new();

    let map = match value.as_object() {
        Some(map) => map,
        None => {
            defaulted.push("$".to_string());
            return Normalized {
                rotation: Rotation::default(),
                defaulted,
            };
        }
    };

    let stage_count = match coerce_number(map.get("stageCount")) {
        Some(n) if n.trunc() >= 1.0 && n.trunc() <= MAX_STAGE_COUNT as f64 => n.trunc() as usize,
        _ => {
            defaulted.push("stageCount".to_string());
            DEFAULT_STAGE_COUNT
        }
    };

    let round_mode = match map
        .get("roundMode")
        .and_then(Value::as_str)
        .and_then(RoundMode::from_str)
    {
        Some(mode) => mode,
        None => {
            defaulted.push("roundMode".to_string());
            RoundMode::Scheduled
        }
    };

    let round_length_minutes = match coerce_number(map.get("roundLengthMinutes")) {
        Some(v) if v != 0.0 => {
            if v < 1.0 {
                defaulted.push("roundLengthMinutes".to_string());
                1.0
            } else {
                v
            }
        }
        _ => {
            defaulted.push("roundLengthMinutes".to_string());
            DEFAULT_ROUND_MINUTES
        }
    };

    let schedule_start = match map.get("scheduleStart") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Some(_) => {
            defaulted.push("scheduleStart".to_string());
            None
        }
    };

    let manual_round_index = match coerce_number(map.get("manualRoundIndex")) {
        Some(v) => wrap_index(v.trunc() as i64, stage_count),
        None => {
            defaulted.push("manualRoundIndex".to_string());
            0
        }
    };

    let view = match map
        .get("view")
        .and_then(Value::as_str)
        .and_then(ViewMode::from_str)
    {
        Some(view) => view,
        None => {
            defaulted.push("view".to_string());
            ViewMode::Stages
        }
    };

    let teams = match map.get("teams").and_then(Value::as_array) {
        Some(list) if list.len() == stage_count => list
            .iter()
            .enumerate()
            .map(|(i, raw)| coerce_team(raw, i, stage_count, &mut defaulted))
            .collect(),
        _ => {
            // Wrong length means the list no longer matches the stage
            // count; it is rebuilt wholesale rather than patched.
            defaulted.push("teams".to_string());
            (0..stage_count).map(Team::with_defaults).collect()
        }
    };

    let stages = match map.get("stages").and_then(Value::as_array) {
        Some(list) if list.len() == stage_count => list
            .iter()
            .enumerate()
            .map(|(i, raw)| coerce_stage(raw, i, &mut defaulted))
            .collect(),
        _ => {
            defaulted.push("stages".to_string());
            (0..stage_count).map(Stage::with_defaults).collect()
        }
    };

    Normalized {
        rotation: Rotation {
            stage_count,
            round_mode,
            round_length_minutes,
            schedule_start,
            manual_round_index,
            view,
            teams,
            stages,
        },
        defaulted,
    }
}

/// Numeric coercion: accepts JSON numbers and numeric strings. Anything
/// else, including NaN and infinities, reads as no value.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn coerce_team(raw: &Value, index: usize, stage_count: usize, defaulted: &mut Vec<String>) -> Team {
    let map = raw.as_object();
    let name = match map.and_then(|m| m.get("name")).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => {
            defaulted.push(format!("teams[{}].name", index));
            Team::default_name(index)
        }
    };
    let start_offset = match coerce_number(map.and_then(|m| m.get("startOffset"))) {
        Some(v) => wrap_index(v.trunc() as i64, stage_count),
        None => {
            defaulted.push(format!("teams[{}].startOffset", index));
            0
        }
    };
    Team { name, start_offset }
}

fn coerce_stage(raw: &Value, index: usize, defaulted: &mut Vec<String>) -> Stage {
    let map = raw.as_object();
    let name = match map.and_then(|m| m.get("name")).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => {
            defaulted.push(format!("stages[{}].name", index));
            Stage::default_name(index)
        }
    };
    let supervisor_name = match map.and_then(|m| m.get("supervisorName")) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Some(_) => {
            defaulted.push(format!("stages[{}].supervisorName", index));
            None
        }
    };
    Stage {
        name,
        supervisor_name,
    }
}
