use crate::engine::wrap_index;
use crate::models::{RoundMode, Rotation};
use crate::utils::date::parse_local_datetime;

/// The active round index in `[0, stage_count)` for the given instant.
///
/// Manual mode ignores the clock entirely and wraps the pinned index.
/// Scheduled mode counts whole rounds elapsed since the start instant and
/// wraps them into the cycle; a missing, unparseable or future start pins
/// the round to 0.
pub fn active_round(rotation: &Rotation, now_ms: i64) -> usize {
    let n = rotation.stage_count;
    if rotation.round_mode == RoundMode::Manual {
        return wrap_index(rotation.manual_round_index as i64, n);
    }

    let start = match rotation.schedule_start.as_deref().and_then(parse_local_datetime) {
        Some(start) => start,
        None => return 0,
    };
    let elapsed_ms = now_ms - start.timestamp_millis();
    if elapsed_ms < 0 {
        return 0;
    }

    let round_length_ms = rotation.round_length_minutes * 60_000.0;
    if round_length_ms <= 0.0 {
        return 0;
    }
    let elapsed_rounds = (elapsed_ms as f64 / round_length_ms).floor() as i64;
    wrap_index(elapsed_rounds, n)
}

/// The round after `round`, wrapping at the end of the cycle.
pub fn next_round(rotation: &Rotation, round: usize) -> usize {
    wrap_index(round as i64 + 1, rotation.stage_count)
}
